use super::*;
use crate::test_support::{FakePlanRepository, FakeRunRepository};
use outpost_core::{Frequency, FrequencyUnit, RunId, TriggeredBy};
use outpost_queue::InMemoryJobQueue;

fn settings() -> SchedulerSettings {
    SchedulerSettings { execute_plan_queue: "execute-plan".to_string(), default_max_attempts: 3 }
}

fn plan_with_frequency(name: &str, every: u32, locations: Vec<&str>) -> Plan {
    Plan {
        id: None,
        organization: "acme".into(),
        project: "checkout".into(),
        environment: "prod".into(),
        name: name.into(),
        version: "1.0".into(),
        frequency: Some(Frequency { every, unit: FrequencyUnit::Minute }),
        locations: locations.into_iter().map(String::from).collect(),
        nodes: vec![],
        edges: vec![],
    }
}

#[tokio::test]
async fn is_due_when_plan_has_never_run() {
    let runs = FakeRunRepository::default();
    let mut plan = plan_with_frequency("webhook-check", 5, vec![]);
    plan.id = Some(PlanId::new());
    assert!(is_due(&runs, &plan, 1_000).await.unwrap());
}

#[tokio::test]
async fn is_due_false_before_interval_elapses() {
    let runs = FakeRunRepository::default();
    let mut plan = plan_with_frequency("webhook-check", 5, vec![]);
    plan.id = Some(PlanId::new());

    runs.create(&Run {
        id: RunId::new(),
        plan_id: plan.id.unwrap(),
        execution_group_id: ExecutionGroupId::new(),
        location: "local".into(),
        environment: "prod".into(),
        status: RunStatus::Completed,
        triggered_by: TriggeredBy::Schedule,
        started_at_ms: 0,
        completed_at_ms: Some(100),
        duration_ms: Some(100),
        success: Some(true),
        errors: vec![],
        results: vec![],
    })
    .await
    .unwrap();

    let five_minutes_ms = 5 * 60 * 1_000;
    assert!(!is_due(&runs, &plan, five_minutes_ms - 1).await.unwrap());
    assert!(is_due(&runs, &plan, five_minutes_ms).await.unwrap());
}

#[tokio::test]
async fn is_due_false_without_a_frequency() {
    let runs = FakeRunRepository::default();
    let mut plan = plan_with_frequency("webhook-check", 5, vec![]);
    plan.frequency = None;
    plan.id = Some(PlanId::new());
    assert!(!is_due(&runs, &plan, 1_000).await.unwrap());
}

#[tokio::test]
async fn dispatch_due_plans_fans_out_one_run_per_listed_location() {
    let plans = FakePlanRepository::default();
    let runs = FakeRunRepository::default();
    let queue = InMemoryJobQueue::new();

    let plan =
        plans.seed(plan_with_frequency("multi-region-check", 1, vec!["us-east-1", "eu-west-1"]));

    let dispatched = dispatch_due_plans(&plans, &runs, &queue, &settings(), 1_000).await.unwrap();

    assert_eq!(dispatched.len(), 2);
    let mut locations: Vec<&str> = dispatched.iter().map(|r| r.location.as_str()).collect();
    locations.sort();
    assert_eq!(locations, vec!["eu-west-1", "us-east-1"]);
    assert_eq!(dispatched[0].execution_group_id, dispatched[1].execution_group_id);
    assert!(dispatched.iter().all(|r| r.status == RunStatus::Pending));
    assert!(dispatched.iter().all(|r| r.plan_id == plan.id.unwrap()));
}

#[tokio::test]
async fn dispatch_due_plans_uses_local_for_empty_locations() {
    let plans = FakePlanRepository::default();
    let runs = FakeRunRepository::default();
    let queue = InMemoryJobQueue::new();

    plans.seed(plan_with_frequency("single-region-check", 1, vec![]));

    let dispatched = dispatch_due_plans(&plans, &runs, &queue, &settings(), 1_000).await.unwrap();

    assert_eq!(dispatched.len(), 1);
    assert_eq!(dispatched[0].location, "local");
}

#[tokio::test]
async fn dispatch_due_plans_skips_plans_without_frequency() {
    let plans = FakePlanRepository::default();
    let runs = FakeRunRepository::default();
    let queue = InMemoryJobQueue::new();

    let mut plan = plan_with_frequency("no-schedule", 1, vec![]);
    plan.frequency = None;
    plans.seed(plan);

    let dispatched = dispatch_due_plans(&plans, &runs, &queue, &settings(), 1_000).await.unwrap();
    assert!(dispatched.is_empty());
}

#[tokio::test]
async fn dispatch_due_plans_skips_a_plan_not_yet_due() {
    let plans = FakePlanRepository::default();
    let runs = FakeRunRepository::default();
    let queue = InMemoryJobQueue::new();

    let plan = plans.seed(plan_with_frequency("already-ran-recently", 10, vec![]));
    runs.create(&Run {
        id: RunId::new(),
        plan_id: plan.id.unwrap(),
        execution_group_id: ExecutionGroupId::new(),
        location: "local".into(),
        environment: "prod".into(),
        status: RunStatus::Completed,
        triggered_by: TriggeredBy::Schedule,
        started_at_ms: 1_000,
        completed_at_ms: Some(1_500),
        duration_ms: Some(500),
        success: Some(true),
        errors: vec![],
        results: vec![],
    })
    .await
    .unwrap();

    let dispatched = dispatch_due_plans(&plans, &runs, &queue, &settings(), 1_500).await.unwrap();
    assert!(dispatched.is_empty());
}

#[tokio::test]
async fn dispatched_job_payload_snapshots_the_plan() {
    let plans = FakePlanRepository::default();
    let runs = FakeRunRepository::default();
    let queue = InMemoryJobQueue::new();

    plans.seed(plan_with_frequency("snapshot-check", 1, vec![]));
    dispatch_due_plans(&plans, &runs, &queue, &settings(), 1_000).await.unwrap();

    let job = queue.dequeue("execute-plan", "local", 1_000, 60_000).await.unwrap().unwrap();
    let JobPayload::ExecutePlan { plan, .. } = job.payload;
    assert_eq!(plan.name, "snapshot-check");
}
