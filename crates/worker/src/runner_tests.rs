use super::*;
use crate::test_support::FakeHubClient;
use outpost_core::{FakeClock, HttpMethod, JobPayload, Plan, ResponseFormat, RunStatus, TargetEntry};
use outpost_engine::{BroadcastEmitter, FakeHttpClient, HttpResponseSpec};
use outpost_queue::InMemoryJobQueue;
use serde_json::json;
use std::collections::HashMap;

fn plan_with_variable_base(name: &str) -> Plan {
    Plan {
        id: None,
        organization: "acme".into(),
        project: "checkout".into(),
        environment: "prod".into(),
        name: name.into(),
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

async fn push_execute_plan_job(queue: &InMemoryJobQueue, plan: Plan) {
    queue
        .push(outpost_core::QueueJob {
            id: outpost_core::JobId::new(),
            queue_name: "execute-plan".into(),
            location: "local".into(),
            payload: JobPayload::ExecutePlan {
                plan_id: outpost_core::PlanId::new(),
                run_id: outpost_core::RunId::new(),
                execution_group_id: outpost_core::ExecutionGroupId::new(),
                location: "local".into(),
                plan,
            },
            status: outpost_core::JobStatus::Pending,
            attempts: 0,
            max_attempts: 3,
            priority: 0,
            scheduled_for_ms: 0,
            created_at_ms: 0,
            locked_until_ms: None,
            last_error: None,
        })
        .await
        .unwrap();
}

fn config() -> WorkerConfig {
    WorkerConfig {
        location: "local".into(),
        queue_name: "execute-plan".into(),
        empty_delay: Duration::from_millis(5),
        max_empty_delay: Duration::from_millis(20),
        visibility_timeout: Duration::from_secs(60),
    }
}

#[tokio::test]
async fn worker_loop_exits_promptly_on_shutdown() {
    let queue: Arc<dyn JobQueue> = Arc::new(InMemoryJobQueue::new());
    let clock = FakeClock::new();
    let secrets = Arc::new(SecretRegistry::new(clock.clone()));
    let executor =
        Arc::new(PlanExecutor::new(FakeHttpClient::new(), clock.clone(), BroadcastEmitter::new(8)));
    let hub = Arc::new(FakeHubClient::default());
    let (tx, rx) = tokio::sync::watch::channel(false);

    let handle =
        tokio::spawn(run_worker_loop(queue, executor, secrets, hub, clock, config(), rx));

    tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("worker loop should exit promptly")
        .unwrap();
}

#[tokio::test]
async fn worker_loop_dequeues_executes_and_acks_a_job() {
    let queue = Arc::new(InMemoryJobQueue::new());
    push_execute_plan_job(&queue, plan_with_variable_base("webhook-check")).await;

    let clock = FakeClock::new();
    let secrets = Arc::new(SecretRegistry::new(clock.clone()));
    let http = FakeHttpClient::new();
    http.stub(
        "https://api.acme.com/health",
        HttpResponseSpec { status: 200, headers: HashMap::new(), body: r#"{"ok":true}"#.into() },
    );
    let executor = Arc::new(PlanExecutor::new(http, clock.clone(), BroadcastEmitter::new(8)));
    let hub = Arc::new(FakeHubClient::with_target(
        "api-service",
        TargetEntry { base_url: "https://api.acme.com".into(), headers: HashMap::new() },
    ));
    let (tx, rx) = tokio::sync::watch::channel(false);

    let queue_dyn: Arc<dyn JobQueue> = queue.clone();
    let handle = tokio::spawn(run_worker_loop(
        queue_dyn,
        executor,
        secrets,
        hub.clone(),
        clock,
        config(),
        rx,
    ));

    tokio::time::sleep(Duration::from_millis(50)).await;
    tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(1), handle).await.unwrap().unwrap();

    assert_eq!(hub.statuses(), vec![RunStatus::Running, RunStatus::Completed]);
}

#[tokio::test]
async fn worker_loop_fails_the_job_when_processing_errors() {
    let queue = Arc::new(InMemoryJobQueue::new());
    push_execute_plan_job(&queue, plan_with_variable_base("no-target")).await;

    let clock = FakeClock::new();
    let secrets = Arc::new(SecretRegistry::new(clock.clone()));
    let hub = Arc::new(FakeHubClient::default());
    hub.set_fail_patches(true);
    let executor =
        Arc::new(PlanExecutor::new(FakeHttpClient::new(), clock.clone(), BroadcastEmitter::new(8)));
    let (tx, rx) = tokio::sync::watch::channel(false);

    let queue_dyn: Arc<dyn JobQueue> = queue.clone();
    let handle = tokio::spawn(run_worker_loop(
        queue_dyn,
        executor,
        secrets,
        hub,
        clock.clone(),
        config(),
        rx,
    ));

    tokio::time::sleep(Duration::from_millis(50)).await;
    tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(1), handle).await.unwrap().unwrap();

    // Dead queue.fail reschedules with backoff rather than leaving the job
    // immediately re-claimable, even though every hub PATCH in this run failed.
    let immediately_claimable =
        queue.dequeue("execute-plan", "local", clock.epoch_ms(), 60_000).await.unwrap();
    assert!(immediately_claimable.is_none());
}
