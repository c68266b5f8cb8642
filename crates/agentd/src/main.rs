// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The agent process: registers with the hub, runs the poll-ack-fail job
//! loop against the shared job queue, and heartbeats until SIGTERM/SIGINT
//! (spec §6 exit codes: `0` clean shutdown, `1` fatal).

mod env;
mod registration;

use anyhow::Context;
use outpost_core::SystemClock;
use outpost_engine::{BroadcastEmitter, PlanExecutor, ReqwestHttpClient};
use outpost_queue::PostgresJobQueue;
use outpost_secrets::providers::{CloudSecretStoreProvider, EnvProvider, VaultKvProvider};
use outpost_secrets::SecretRegistry;
use outpost_worker::{run_worker_loop, ReqwestHubClient, WorkerConfig};
use registration::AgentClient;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let location = env::agent_location()?;
    let hub_url = env::hub_url()?;
    if env::queue_backend() != "postgres" {
        anyhow::bail!("only the postgres queue backend is implemented");
    }

    let database_url = env::database_url()?;
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to job queue database")?;
    let queue: Arc<dyn outpost_queue::JobQueue> = Arc::new(PostgresJobQueue::new(pool));

    let clock = SystemClock;
    let mut secrets = SecretRegistry::new(clock.clone());
    for provider in env::secret_providers() {
        match provider.as_str() {
            "env" => secrets.register(Arc::new(EnvProvider))?,
            "vault" => {
                let (addr, mount, token) = env::vault_config()?;
                secrets.register(Arc::new(VaultKvProvider::new(addr, mount, token)))?;
            }
            "cloud" => {
                let (url, auth_header) = env::cloud_secrets_config()?;
                secrets.register(Arc::new(CloudSecretStoreProvider::new(url, auth_header)))?;
            }
            other => anyhow::bail!("unknown secret provider: {other}"),
        }
    }
    let secrets = Arc::new(secrets);

    let executor = Arc::new(PlanExecutor::new(
        ReqwestHttpClient::new(),
        clock.clone(),
        BroadcastEmitter::new(256),
    ));

    let hub_client = Arc::new(ReqwestHubClient::new(hub_url.clone(), None));
    let agent_client = Arc::new(AgentClient::new(hub_url));

    let agent = agent_client
        .register(&format!("outpost-agentd-{location}"), &location)
        .await
        .context("failed to register with hub")?;
    tracing::info!(agent_id = %agent.id, %location, "registered with hub");

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

    if env::heartbeat_enabled() {
        let agent_id = agent.id.clone();
        let client = agent_client.clone();
        let interval = env::heartbeat_interval();
        let mut heartbeat_shutdown = shutdown_rx.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(e) = client.heartbeat(&agent_id).await {
                            tracing::warn!(error = %e, %agent_id, "heartbeat failed");
                        }
                    }
                    _ = heartbeat_shutdown.changed() => {
                        if *heartbeat_shutdown.borrow() {
                            break;
                        }
                    }
                }
            }
        });
    }

    let worker_config = WorkerConfig {
        location: location.clone(),
        queue_name: "execute-plan".to_string(),
        empty_delay: env::queue_poll_interval(),
        max_empty_delay: env::queue_max_poll_interval(),
        visibility_timeout: Duration::from_secs(5 * 60),
    };

    let worker_handle = tokio::spawn(run_worker_loop(
        queue,
        executor,
        secrets,
        hub_client,
        clock,
        worker_config,
        shutdown_rx,
    ));

    shutdown_signal().await;
    tracing::info!("shutdown signal received, draining worker loop");
    let _ = shutdown_tx.send(true);
    let _ = worker_handle.await;

    agent_client.deregister(&agent.id).await;

    Ok(())
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("install ctrl-c handler should not fail");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("install sigterm handler should not fail")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
