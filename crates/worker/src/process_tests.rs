use super::*;
use crate::test_support::FakeHubClient;
use outpost_core::{
    ExecutionGroupId, FakeClock, HttpMethod, JobId, JobStatus, PlanId, ResponseFormat, TargetEntry,
};
use outpost_engine::{BroadcastEmitter, FakeHttpClient, HttpResponseSpec};
use outpost_secrets::providers::env::EnvProvider;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

fn job_with_plan(plan: outpost_core::Plan) -> QueueJob {
    QueueJob {
        id: JobId::new(),
        queue_name: "execute-plan".into(),
        location: "local".into(),
        payload: JobPayload::ExecutePlan {
            plan_id: plan.id.clone().unwrap_or_else(PlanId::new),
            run_id: RunId::new(),
            execution_group_id: ExecutionGroupId::new(),
            location: "local".into(),
            plan,
        },
        status: JobStatus::Pending,
        attempts: 0,
        max_attempts: 3,
        priority: 0,
        scheduled_for_ms: 0,
        created_at_ms: 0,
        locked_until_ms: None,
        last_error: None,
    }
}

fn plan_with_variable_base() -> outpost_core::Plan {
    outpost_core::Plan {
        id: None,
        organization: "acme".into(),
        project: "checkout".into(),
        environment: "prod".into(),
        name: "webhook-check".into(),
        version: "1.0".into(),
        frequency: None,
        locations: vec![],
        nodes: vec![outpost_core::Node::HttpRequest {
            id: "n1".into(),
            method: HttpMethod::Get,
            base: json!({"$variable": {"key": "api-service"}}),
            path: "/health".into(),
            headers: HashMap::new(),
            body: None,
            response_format: ResponseFormat::Json,
        }],
        edges: vec![],
    }
}

fn executor_with_ok_response(
    url: &str,
) -> PlanExecutor<FakeHttpClient, FakeClock, BroadcastEmitter> {
    let http = FakeHttpClient::new();
    http.stub(
        url,
        HttpResponseSpec { status: 200, headers: HashMap::new(), body: r#"{"ok":true}"#.into() },
    );
    PlanExecutor::new(http, FakeClock::new(), BroadcastEmitter::new(8))
}

#[tokio::test]
async fn process_job_resolves_target_and_succeeds() {
    let hub = FakeHubClient::with_target(
        "api-service",
        TargetEntry { base_url: "https://api.acme.com".into(), headers: HashMap::new() },
    );
    let clock = FakeClock::new();
    let secrets = SecretRegistry::new(clock);
    let executor = executor_with_ok_response("https://api.acme.com/health");

    let job = job_with_plan(plan_with_variable_base());
    let results = process_job(&job, &executor, &secrets, &hub).await.unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].status, NodeResultStatus::Passed);
    assert_eq!(hub.statuses(), vec![RunStatus::Running, RunStatus::Completed]);
}

#[tokio::test]
async fn process_job_marks_failed_status_when_a_node_fails() {
    let hub = FakeHubClient::default();
    let clock = FakeClock::new();
    let secrets = SecretRegistry::new(clock.clone());
    // No target registered: the engine can't resolve the `$variable` base,
    // so the one HTTP_REQUEST node fails rather than the job erroring out.
    let http = FakeHttpClient::new();
    let executor = PlanExecutor::new(http, clock, BroadcastEmitter::new(8));

    let job = job_with_plan(plan_with_variable_base());
    let results = process_job(&job, &executor, &secrets, &hub).await.unwrap();

    assert_eq!(results[0].status, NodeResultStatus::Failed);
    assert_eq!(hub.statuses(), vec![RunStatus::Running, RunStatus::Failed]);
}

#[tokio::test]
async fn process_job_propagates_a_hub_patch_failure() {
    let hub = FakeHubClient::default();
    hub.set_fail_patches(true);
    let clock = FakeClock::new();
    let secrets = SecretRegistry::new(clock);
    let executor = executor_with_ok_response("https://api.acme.com/health");

    let job = job_with_plan(plan_with_variable_base());
    let err = process_job(&job, &executor, &secrets, &hub).await.unwrap_err();
    assert!(matches!(err, ProcessError::Hub(_)));
}

#[tokio::test]
async fn process_job_resolves_secrets_alongside_targets() {
    std::env::set_var("OUTPOST_TEST_WORKER_TOKEN", "s3cr3t");
    let hub = FakeHubClient::with_target(
        "api-service",
        TargetEntry { base_url: "https://api.acme.com".into(), headers: HashMap::new() },
    );
    let clock = FakeClock::new();
    let mut secrets = SecretRegistry::new(clock);
    secrets.register(Arc::new(EnvProvider)).unwrap();

    let mut plan = plan_with_variable_base();
    if let outpost_core::Node::HttpRequest { headers, .. } = &mut plan.nodes[0] {
        headers.insert(
            "Authorization".to_string(),
            outpost_core::HeaderValue::Secret {
                secret: outpost_core::SecretRef {
                    provider: "env".into(),
                    reference: "OUTPOST_TEST_WORKER_TOKEN".into(),
                    version: None,
                    field: None,
                },
            },
        );
    }

    let executor = executor_with_ok_response("https://api.acme.com/health");
    let job = job_with_plan(plan);
    let results = process_job(&job, &executor, &secrets, &hub).await.unwrap();

    assert_eq!(results[0].status, NodeResultStatus::Passed);
    std::env::remove_var("OUTPOST_TEST_WORKER_TOKEN");
}
