// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The scheduler's tick loop, cadence styled on the teacher's interval-driven
//! engine runtime monitor (also the shape `outpost_queue::sweep` and
//! `outpost_registry::sweep` follow for their own background loops).

use crate::dispatch::{dispatch_due_plans, SchedulerSettings};
use outpost_core::Clock;
use outpost_queue::JobQueue;
use outpost_storage::{PlanRepository, RunRepository};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub struct SchedulerConfig {
    pub tick_interval: Duration,
    pub settings: SchedulerSettings,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(30),
            settings: SchedulerSettings {
                execute_plan_queue: "execute-plan".to_string(),
                default_max_attempts: 3,
            },
        }
    }
}

/// Runs `_tick` every `config.tick_interval` until `shutdown` fires. Ticks
/// never overlap: if a previous tick is still running when the next interval
/// elapses, that interval is a no-op (spec §4.E) — modeled with an
/// `AtomicBool` guard rather than skipping the timer itself, since
/// `tokio::time::interval` has no "busy" concept of its own.
pub async fn run_scheduler_loop<C: Clock + 'static>(
    plans: Arc<dyn PlanRepository>,
    runs: Arc<dyn RunRepository>,
    queue: Arc<dyn JobQueue>,
    clock: C,
    config: SchedulerConfig,
    mut shutdown: tokio::sync::watch::Receiver<bool>,
) {
    let in_flight = Arc::new(AtomicBool::new(false));
    let mut ticker = tokio::time::interval(config.tick_interval);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if in_flight.swap(true, Ordering::SeqCst) {
                    tracing::debug!("scheduler tick skipped, previous tick still in flight");
                    continue;
                }
                let now_ms = clock.epoch_ms();
                match dispatch_due_plans(plans.as_ref(), runs.as_ref(), queue.as_ref(), &config.settings, now_ms).await {
                    Ok(dispatched) if !dispatched.is_empty() => {
                        tracing::info!(count = dispatched.len(), "dispatched due plans");
                    }
                    Ok(_) => {}
                    Err(e) => tracing::warn!(error = %e, "scheduler tick failed"),
                }
                in_flight.store(false, Ordering::SeqCst);
            }
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    tracing::info!("scheduler loop shutting down");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "tick_tests.rs"]
mod tests;
