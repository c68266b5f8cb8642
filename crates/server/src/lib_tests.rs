use super::*;
use crate::test_support::{FakePlanRepository, FakeRunRepository, FakeTargetConfigRepository};
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use outpost_core::{FakeClock, Frequency, FrequencyUnit, SCHEMA_VERSION};
use outpost_queue::InMemoryJobQueue;
use outpost_registry::AgentRegistry;
use serde_json::{json, Value};
use std::collections::HashSet;
use tower::ServiceExt;

fn test_state(auth_mode: AuthMode) -> Arc<AppState<FakeClock>> {
    Arc::new(AppState {
        plans: Arc::new(FakePlanRepository::default()),
        runs: Arc::new(FakeRunRepository::default()),
        targets: Arc::new(FakeTargetConfigRepository::default()),
        queue: Arc::new(InMemoryJobQueue::new()),
        registry: Arc::new(AgentRegistry::new()),
        clock: FakeClock::new(),
        auth_mode,
        execute_plan_queue: "execute-plan".into(),
        default_max_attempts: 3,
    })
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), 1_000_000).await.unwrap();
    let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, body)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
}

fn plan_body(name: &str, locations: Vec<&str>) -> Value {
    json!({
        "organization": "acme",
        "project": "checkout",
        "environment": "prod",
        "name": name,
        "version": SCHEMA_VERSION,
        "frequency": { "every": 5, "unit": "MINUTE" },
        "locations": locations,
        "nodes": [],
        "edges": [],
    })
}

#[tokio::test]
async fn create_plan_rejects_unregistered_location() {
    let state = test_state(AuthMode::None);
    let app = router(state);
    let (status, body) =
        send(app, json_request("POST", "/plan", plan_body("hc", vec!["mars-1"]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("unregistered locations"));
}

#[tokio::test]
async fn create_plan_rejects_empty_locations_with_no_agents() {
    let state = test_state(AuthMode::None);
    let app = router(state);
    let (status, _) = send(app, json_request("POST", "/plan", plan_body("hc", vec![]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_plan_then_list_round_trips() {
    let state = test_state(AuthMode::None);
    state.registry.register("agent-1".into(), "us-east-1".into(), None, 0).unwrap();
    let app = router(state);

    let (status, body) =
        send(app.clone(), json_request("POST", "/plan", plan_body("hc", vec!["us-east-1"]))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["id"].as_str().unwrap().starts_with("pln-"));

    let (status, body) =
        send(app, get_request("/plan?projectId=checkout&environment=prod")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["name"], "hc");
}

#[tokio::test]
async fn create_plan_rejects_one_with_a_preset_id() {
    let state = test_state(AuthMode::None);
    state.registry.register("agent-1".into(), "us-east-1".into(), None, 0).unwrap();
    let app = router(state);
    let mut body = plan_body("hc", vec!["us-east-1"]);
    body["id"] = json!("pln-alreadyset0000000000");
    let (status, _) = send(app, json_request("POST", "/plan", body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn trigger_by_plan_id_creates_a_pending_run_per_location() {
    let state = test_state(AuthMode::None);
    state.registry.register("agent-1".into(), "us-east-1".into(), None, 0).unwrap();
    state.registry.register("agent-2".into(), "eu-west-1".into(), None, 0).unwrap();
    let app = router(state.clone());

    let (_, created) = send(
        app.clone(),
        json_request("POST", "/plan", plan_body("hc", vec!["us-east-1", "eu-west-1"])),
    )
    .await;
    let plan_id = created["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        app,
        json_request("POST", &format!("/runs/trigger-by-plan-id/{plan_id}"), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "PENDING");

    let runs = state.runs.list(outpost_storage::RunFilter::default()).await.unwrap();
    assert_eq!(runs.len(), 2);
}

#[tokio::test]
async fn patch_run_rejects_illegal_transition() {
    let state = test_state(AuthMode::None);
    state.registry.register("agent-1".into(), "us-east-1".into(), None, 0).unwrap();
    let app = router(state.clone());

    let (_, created) =
        send(app.clone(), json_request("POST", "/plan", plan_body("hc", vec!["us-east-1"]))).await;
    let plan_id = created["data"]["id"].as_str().unwrap().to_string();
    let (_, run) = send(
        app.clone(),
        json_request("POST", &format!("/runs/trigger-by-plan-id/{plan_id}"), json!({})),
    )
    .await;
    let run_id = run["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        app,
        json_request("PATCH", &format!("/runs/{run_id}"), json!({ "status": "COMPLETED" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn agent_register_heartbeat_and_list() {
    let state = test_state(AuthMode::None);
    let app = router(state);

    let (status, body) = send(
        app.clone(),
        json_request("POST", "/agents/register", json!({ "name": "agent-1", "location": "us-east-1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let agent_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) =
        send(app.clone(), json_request("POST", &format!("/agents/{agent_id}/heartbeat"), json!({})))
            .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, body) = send(app, get_request("/agents?location=us-east-1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn target_config_put_get_delete_round_trips() {
    let state = test_state(AuthMode::None);
    let app = router(state);
    let uri = "/config/acme/prod/targets/api-service";

    let (status, _) = send(
        app.clone(),
        json_request("PUT", uri, json!({ "base_url": "https://api.acme.com", "headers": {} })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(app.clone(), get_request(uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["base_url"], "https://api.acme.com");

    let (status, _) = send(
        app.clone(),
        Request::builder().method("DELETE").uri(uri).body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(app, get_request(uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn api_key_mode_rejects_missing_bearer_token() {
    let mut keys = HashSet::new();
    keys.insert("secret-key".to_string());
    let state = test_state(AuthMode::ApiKey(keys));
    let app = router(state);
    let (status, _) = send(app, get_request("/agents")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn api_key_mode_accepts_a_valid_bearer_token() {
    let mut keys = HashSet::new();
    keys.insert("secret-key".to_string());
    let state = test_state(AuthMode::ApiKey(keys));
    let app = router(state);
    let req = Request::builder()
        .method("GET")
        .uri("/agents")
        .header("authorization", "Bearer secret-key")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(app, req).await;
    assert_eq!(status, StatusCode::OK);
}
