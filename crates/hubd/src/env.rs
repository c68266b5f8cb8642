// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the hub process (spec §6).

use outpost_server::AuthMode;
use std::collections::HashSet;
use std::time::Duration;

/// Postgres connection string. Required.
pub fn database_url() -> Result<String, anyhow::Error> {
    std::env::var("DATABASE_URL").map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))
}

/// `REPOSITORY_BACKEND` — only `postgres` is implemented.
pub fn repository_backend() -> String {
    std::env::var("REPOSITORY_BACKEND").unwrap_or_else(|_| "postgres".to_string())
}

/// `JOBQUEUE_BACKEND` — only `postgres` is implemented.
pub fn jobqueue_backend() -> String {
    std::env::var("JOBQUEUE_BACKEND").unwrap_or_else(|_| "postgres".to_string())
}

/// `SCHEDULER_ENABLED`, default `true`. Set to `false` to run a hub that
/// only serves HTTP and dispatches manually-triggered runs.
pub fn scheduler_enabled() -> bool {
    std::env::var("SCHEDULER_ENABLED").ok().map(|v| v != "false" && v != "0").unwrap_or(true)
}

/// `SCHEDULER_TICK_INTERVAL` in milliseconds, default 30000.
pub fn scheduler_tick_interval() -> Duration {
    std::env::var("SCHEDULER_TICK_INTERVAL")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(30))
}

/// `AGENT_MONITORING_INTERVAL_SECONDS`, default 30.
pub fn agent_monitoring_interval() -> Duration {
    std::env::var("AGENT_MONITORING_INTERVAL_SECONDS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(Duration::from_secs(30))
}

/// `AGENT_HEARTBEAT_TIMEOUT_SECONDS`, default 60.
pub fn agent_heartbeat_timeout_ms() -> u64 {
    std::env::var("AGENT_HEARTBEAT_TIMEOUT_SECONDS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(60)
        * 1000
}

/// Visibility-timeout sweep interval (ambient, ms), default 30000.
pub fn visibility_sweep_interval() -> Duration {
    std::env::var("VISIBILITY_SWEEP_INTERVAL")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(30))
}

/// Visibility timeout itself (ambient, ms), default 5 minutes.
pub fn visibility_timeout_ms() -> u64 {
    std::env::var("VISIBILITY_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(5 * 60 * 1000)
}

/// HTTP bind address (ambient — not in spec's env table, but every
/// deployment needs one). Default `0.0.0.0:8080`.
pub fn bind_addr() -> String {
    std::env::var("HUBD_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string())
}

/// Queue partition every scheduled/triggered execution job is pushed to.
pub fn execute_plan_queue() -> String {
    "execute-plan".to_string()
}

/// Default `maxAttempts` for a job that does not specify one (spec §4.D).
pub fn default_max_attempts() -> u32 {
    3
}

/// `AUTH_MODE` (`none` | `api-key` | `oidc`) plus the mode's own settings,
/// assembled into the one value the server actually wants at startup.
pub async fn auth_mode() -> Result<AuthMode, anyhow::Error> {
    match std::env::var("AUTH_MODE").unwrap_or_else(|_| "none".to_string()).as_str() {
        "none" => Ok(AuthMode::None),
        "api-key" => {
            let keys: HashSet<String> = std::env::var("AUTH_API_KEYS")
                .unwrap_or_default()
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if keys.is_empty() {
                anyhow::bail!("AUTH_MODE=api-key requires AUTH_API_KEYS");
            }
            Ok(AuthMode::ApiKey(keys))
        }
        "oidc" => {
            let issuer = std::env::var("AUTH_OIDC_ISSUER")
                .map_err(|_| anyhow::anyhow!("AUTH_MODE=oidc requires AUTH_OIDC_ISSUER"))?;
            let audience = std::env::var("AUTH_OIDC_AUDIENCE").ok();
            let validator = outpost_server::auth::OidcValidator::fetch(&issuer, audience)
                .await
                .map_err(|e| anyhow::anyhow!("failed to fetch OIDC JWKS from {issuer}: {e}"))?;
            Ok(AuthMode::Oidc(validator))
        }
        other => anyhow::bail!("unknown AUTH_MODE: {other}"),
    }
}
