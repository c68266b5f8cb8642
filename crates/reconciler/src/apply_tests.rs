use super::*;
use crate::client::HubClientError;
use outpost_core::{Frequency, FrequencyUnit, Plan, PlanId, SCHEMA_VERSION};
use parking_lot::Mutex;

fn plan(name: &str) -> Plan {
    Plan {
        id: None,
        organization: "acme".into(),
        project: "checkout".into(),
        environment: "prod".into(),
        name: name.into(),
        version: SCHEMA_VERSION.into(),
        frequency: Some(Frequency { every: 10, unit: FrequencyUnit::Minute }),
        locations: vec![],
        nodes: vec![],
        edges: vec![],
    }
}

#[derive(Default)]
struct RecordingClient {
    fail_create: Mutex<Option<String>>,
    calls: Mutex<Vec<String>>,
}

#[async_trait::async_trait]
impl HubPlanClient for RecordingClient {
    async fn create_plan(&self, plan: &Plan) -> Result<Plan, HubClientError> {
        self.calls.lock().push(format!("create:{}", plan.name));
        if let Some(name) = self.fail_create.lock().as_ref() {
            if name == &plan.name {
                return Err(HubClientError::Rejected { status: 409, message: "conflict".into() });
            }
        }
        let mut created = plan.clone();
        created.id = Some(PlanId::new());
        Ok(created)
    }

    async fn update_plan(&self, remote_id: &PlanId, plan: &Plan) -> Result<Plan, HubClientError> {
        self.calls.lock().push(format!("update:{}:{}", remote_id, plan.name));
        let mut updated = plan.clone();
        updated.id = Some(remote_id.clone());
        Ok(updated)
    }

    async fn delete_plan(&self, remote_id: &PlanId) -> Result<(), HubClientError> {
        self.calls.lock().push(format!("delete:{remote_id}"));
        Ok(())
    }

    async fn list_plans(&self, _project: &str, _environment: &str) -> Result<Vec<Plan>, HubClientError> {
        Ok(vec![])
    }
}

#[tokio::test]
async fn apply_dispatches_each_action_kind() {
    let client = RecordingClient::default();
    let remote_id = PlanId::new();
    let actions = vec![
        PlanAction::Create(plan("a")),
        PlanAction::Update { remote_id: remote_id.clone(), plan: plan("b") },
        PlanAction::Delete { remote_id: remote_id.clone(), name: "c".into() },
        PlanAction::Noop { name: "d".into() },
    ];

    let outcome = apply(&client, &actions, false).await;

    assert_eq!(outcome.applied, vec!["a".to_string(), "b".to_string(), "c".to_string()]);
    assert!(outcome.errors.is_empty());
}

#[tokio::test]
async fn apply_aggregates_per_action_errors_instead_of_aborting() {
    let client = RecordingClient::default();
    *client.fail_create.lock() = Some("bad".to_string());
    let actions = vec![PlanAction::Create(plan("bad")), PlanAction::Create(plan("good"))];

    let outcome = apply(&client, &actions, false).await;

    assert_eq!(outcome.applied, vec!["good".to_string()]);
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(outcome.errors[0].name, "bad");
}

#[tokio::test]
async fn dry_run_performs_no_writes_and_returns_empty_outcome() {
    let client = RecordingClient::default();
    let actions = vec![PlanAction::Create(plan("a")), PlanAction::Noop { name: "b".into() }];

    let outcome = apply(&client, &actions, true).await;

    assert_eq!(outcome, ApplyOutcome::default());
    assert!(client.calls.lock().is_empty());
}
