// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The agent worker loop (spec §4.F): poll-ack-fail with doubling
//! empty-queue backoff, cadence styled on the same interval/shutdown-channel
//! shape as `outpost_queue::sweep` and `outpost_scheduler::tick`, except the
//! "interval" here is itself state (`current`) that grows on every empty
//! poll and resets on every dequeued job.

use crate::hub_client::HubClient;
use crate::process::{mark_run_failed, process_job};
use outpost_core::{Clock, JobPayload};
use outpost_engine::{EventEmitter, HttpClientAdapter, PlanExecutor};
use outpost_queue::JobQueue;
use outpost_secrets::SecretRegistry;
use std::sync::Arc;
use std::time::Duration;

pub struct WorkerConfig {
    pub location: String,
    pub queue_name: String,
    pub empty_delay: Duration,
    pub max_empty_delay: Duration,
    pub visibility_timeout: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            location: "local".to_string(),
            queue_name: "execute-plan".to_string(),
            empty_delay: Duration::from_millis(1_000),
            max_empty_delay: Duration::from_millis(30_000),
            visibility_timeout: Duration::from_secs(5 * 60),
        }
    }
}

/// Polls `queue` for `config.location` until `shutdown` fires. A job in
/// flight is always allowed to finish: `shutdown` is only checked between
/// iterations and during the empty-queue sleep (spec §5 "an in-flight job is
/// allowed to complete before the process exits").
#[allow(clippy::too_many_arguments)]
pub async fn run_worker_loop<H, C, E, Hc>(
    queue: Arc<dyn JobQueue>,
    executor: Arc<PlanExecutor<H, C, E>>,
    secrets: Arc<SecretRegistry<C>>,
    hub: Arc<Hc>,
    clock: C,
    config: WorkerConfig,
    mut shutdown: tokio::sync::watch::Receiver<bool>,
) where
    H: HttpClientAdapter + 'static,
    C: Clock + 'static,
    E: EventEmitter + 'static,
    Hc: HubClient + 'static,
{
    let mut current = config.empty_delay;

    loop {
        if *shutdown.borrow() {
            break;
        }

        let dequeued = queue
            .dequeue(
                &config.queue_name,
                &config.location,
                clock.epoch_ms(),
                config.visibility_timeout.as_millis() as u64,
            )
            .await;

        match dequeued {
            Ok(Some(job)) => {
                current = config.empty_delay;
                let job_id = job.id.clone();
                match process_job(&job, executor.as_ref(), secrets.as_ref(), hub.as_ref()).await {
                    Ok(_) => {
                        if let Err(e) = queue.ack(&job_id).await {
                            tracing::warn!(error = %e, %job_id, "failed to ack completed job");
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, %job_id, "job processing failed");
                        let JobPayload::ExecutePlan { run_id, .. } = &job.payload;
                        mark_run_failed(hub.as_ref(), run_id).await;
                        if let Err(fail_err) =
                            queue.fail(&job_id, clock.epoch_ms(), e.to_string()).await
                        {
                            tracing::warn!(error = %fail_err, %job_id, "failed to mark job failed");
                        }
                    }
                }
            }
            Ok(None) => {
                tokio::select! {
                    _ = tokio::time::sleep(current) => {}
                    _ = shutdown.changed() => {
                        if *shutdown.borrow() {
                            break;
                        }
                    }
                }
                current = std::cmp::min(current * 2, config.max_empty_delay);
            }
            Err(e) => {
                tracing::warn!(error = %e, "worker loop dequeue failed");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
        }
    }

    tracing::info!(location = %config.location, "worker loop shutting down");
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
