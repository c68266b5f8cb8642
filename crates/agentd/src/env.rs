// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the agent process (spec §6).

use std::time::Duration;

/// The location this agent serves plans for. Required.
pub fn agent_location() -> Result<String, anyhow::Error> {
    std::env::var("AGENT_LOCATION").map_err(|_| anyhow::anyhow!("AGENT_LOCATION must be set"))
}

/// Base URL of the hub this agent reports run status to. Required.
pub fn hub_url() -> Result<String, anyhow::Error> {
    std::env::var("HUB_URL").map_err(|_| anyhow::anyhow!("HUB_URL must be set"))
}

/// `DATABASE_URL` — the agent dequeues directly from the shared job queue,
/// the same backend the hub writes to.
pub fn database_url() -> Result<String, anyhow::Error> {
    std::env::var("DATABASE_URL").map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))
}

/// `QUEUE_BACKEND` — only `postgres` is implemented.
pub fn queue_backend() -> String {
    std::env::var("QUEUE_BACKEND").unwrap_or_else(|_| "postgres".to_string())
}

/// `QUEUE_POLL_INTERVAL` in milliseconds — the worker loop's initial
/// empty-queue backoff, default 1000.
pub fn queue_poll_interval() -> Duration {
    std::env::var("QUEUE_POLL_INTERVAL")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_millis(1_000))
}

/// `QUEUE_MAX_POLL_INTERVAL` in milliseconds — the worker loop's backoff
/// ceiling, default 30000.
pub fn queue_max_poll_interval() -> Duration {
    std::env::var("QUEUE_MAX_POLL_INTERVAL")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_millis(30_000))
}

/// `HEARTBEAT_ENABLED`, default `true`.
pub fn heartbeat_enabled() -> bool {
    std::env::var("HEARTBEAT_ENABLED").ok().map(|v| v != "false" && v != "0").unwrap_or(true)
}

/// `HEARTBEAT_INTERVAL_SECONDS`, default 30.
pub fn heartbeat_interval() -> Duration {
    std::env::var("HEARTBEAT_INTERVAL_SECONDS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(Duration::from_secs(30))
}

/// `SECRET_PROVIDERS` — comma-separated provider names to register at
/// startup, e.g. `env,vault`. Empty by default (no provider registered).
pub fn secret_providers() -> Vec<String> {
    std::env::var("SECRET_PROVIDERS")
        .unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// `VAULT_ADDR`/`VAULT_MOUNT`/`VAULT_TOKEN` — read only when `vault` is
/// listed in `SECRET_PROVIDERS`.
pub fn vault_config() -> Result<(String, String, String), anyhow::Error> {
    let addr = std::env::var("VAULT_ADDR").map_err(|_| anyhow::anyhow!("VAULT_ADDR must be set"))?;
    let mount = std::env::var("VAULT_MOUNT").unwrap_or_else(|_| "secret".to_string());
    let token =
        std::env::var("VAULT_TOKEN").map_err(|_| anyhow::anyhow!("VAULT_TOKEN must be set"))?;
    Ok((addr, mount, token))
}

/// `CLOUD_SECRETS_URL`/`CLOUD_SECRETS_AUTH_HEADER` — read only when `cloud`
/// is listed in `SECRET_PROVIDERS`.
pub fn cloud_secrets_config() -> Result<(String, Option<String>), anyhow::Error> {
    let url = std::env::var("CLOUD_SECRETS_URL")
        .map_err(|_| anyhow::anyhow!("CLOUD_SECRETS_URL must be set"))?;
    let auth_header = std::env::var("CLOUD_SECRETS_AUTH_HEADER").ok();
    Ok((url, auth_header))
}
