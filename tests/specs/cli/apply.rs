//! `outpost-cli apply` specs reachable without a live hub: local plan
//! loading failures and missing configuration.

use crate::prelude::*;

#[test]
fn apply_without_hub_url_fails() {
    let dir = tempfile::tempdir().unwrap();
    cli()
        .args(&["apply", dir.path().to_str().unwrap()])
        .env_remove("HUB_URL")
        .env_remove("OUTPOST_AUTH_TOKEN")
        .fails_with(1)
        .stderr_has("HUB_URL");
}

#[test]
fn apply_against_a_missing_directory_fails() {
    cli()
        .args(&["apply", "/nonexistent/plans", "--hub-url", "http://localhost:9"])
        .fails_with(1)
        .stderr_has("failed to load plans");
}

#[test]
fn apply_rejects_malformed_plan_documents() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("broken.json"), "{ not json").unwrap();

    cli()
        .args(&["apply", dir.path().to_str().unwrap(), "--hub-url", "http://localhost:9"])
        .fails_with(1)
        .stderr_has("broken.json");
}
