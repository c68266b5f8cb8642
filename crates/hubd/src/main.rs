// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The hub process: wires storage, queue, agent registry, scheduler, and
//! HTTP surface together, then serves until SIGTERM/SIGINT (spec §6 exit
//! codes: `0` clean shutdown, `1` fatal).

mod env;

use anyhow::Context;
use outpost_core::SystemClock;
use outpost_queue::{PostgresJobQueue, SweepConfig};
use outpost_registry::{AgentRegistry, StalenessConfig};
use outpost_scheduler::{SchedulerConfig, SchedulerSettings};
use outpost_server::{router, HubState};
use outpost_storage::{
    PostgresPlanRepository, PostgresRunRepository, PostgresTargetConfigRepository,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let database_url = env::database_url()?;
    if env::repository_backend() != "postgres" || env::jobqueue_backend() != "postgres" {
        anyhow::bail!("only the postgres repository/queue backend is implemented");
    }
    let auth_mode = env::auth_mode().await?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
        .context("failed to connect to database")?;
    tracing::info!("connected to database");

    let clock = SystemClock;
    let plans = Arc::new(PostgresPlanRepository::new(pool.clone()));
    let runs = Arc::new(PostgresRunRepository::new(pool.clone()));
    let targets = Arc::new(PostgresTargetConfigRepository::new(pool.clone()));
    let queue = Arc::new(PostgresJobQueue::new(pool.clone()));
    let registry = Arc::new(AgentRegistry::new());

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

    if env::scheduler_enabled() {
        let scheduler_config = SchedulerConfig {
            tick_interval: env::scheduler_tick_interval(),
            settings: SchedulerSettings {
                execute_plan_queue: env::execute_plan_queue(),
                default_max_attempts: env::default_max_attempts(),
            },
        };
        tokio::spawn(outpost_scheduler::run_scheduler_loop(
            plans.clone(),
            runs.clone(),
            queue.clone(),
            clock.clone(),
            scheduler_config,
            shutdown_rx.clone(),
        ));
        tracing::info!("scheduler enabled");
    } else {
        tracing::info!("scheduler disabled (SCHEDULER_ENABLED=false)");
    }

    tokio::spawn(outpost_registry::run_staleness_sweep_loop(
        registry.clone(),
        clock.clone(),
        StalenessConfig {
            check_interval: env::agent_monitoring_interval(),
            staleness_threshold_ms: env::agent_heartbeat_timeout_ms(),
        },
        shutdown_rx.clone(),
    ));

    tokio::spawn(outpost_queue::run_sweep_loop(
        queue.clone(),
        clock.clone(),
        SweepConfig { interval: env::visibility_sweep_interval() },
        shutdown_rx.clone(),
    ));

    let state = Arc::new(HubState {
        plans,
        runs,
        targets,
        queue,
        registry,
        clock,
        auth_mode,
        execute_plan_queue: env::execute_plan_queue(),
        default_max_attempts: env::default_max_attempts(),
    });

    let app = router(state);
    let bind_addr = env::bind_addr();
    let listener =
        tokio::net::TcpListener::bind(&bind_addr).await.context("failed to bind hub listener")?;
    tracing::info!(%bind_addr, "outpost-hubd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_tx))
        .await
        .context("hub server exited with error")?;

    Ok(())
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

/// Waits for SIGTERM/SIGINT, then flips the shared shutdown watch so every
/// background loop (scheduler, sweeps) finishes its current iteration
/// before the process exits (spec §5).
async fn shutdown_signal(shutdown_tx: tokio::sync::watch::Sender<bool>) {
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

    tracing::info!("shutdown signal received, draining background loops");
    let _ = shutdown_tx.send(true);
}
