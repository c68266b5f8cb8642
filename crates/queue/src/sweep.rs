// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Background visibility-timeout sweep: periodically reclaims jobs whose
//! worker died mid-processing without acking or failing them (spec §4.D,
//! recommended-but-optional).

use crate::queue_trait::JobQueue;
use outpost_core::Clock;
use std::sync::Arc;
use std::time::Duration;

pub struct SweepConfig {
    pub interval: Duration,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self { interval: Duration::from_secs(30) }
    }
}

/// Run the sweep loop until `shutdown` fires. Intended to be spawned as a
/// background task from `outpost-hubd`'s main.
pub async fn run_sweep_loop<C: Clock + 'static>(
    queue: Arc<dyn JobQueue>,
    clock: C,
    config: SweepConfig,
    mut shutdown: tokio::sync::watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(config.interval);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match queue.release_expired(clock.epoch_ms()).await {
                    Ok(released) if released > 0 => {
                        tracing::info!(released, "swept expired job locks");
                    }
                    Ok(_) => {}
                    Err(e) => tracing::warn!(error = %e, "visibility sweep failed"),
                }
            }
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    tracing::info!("visibility sweep loop shutting down");
                    break;
                }
            }
        }
    }
}
