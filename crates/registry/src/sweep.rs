// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Background staleness sweep, cadence styled on the teacher's timer-driven
//! engine runtime monitor.

use crate::registry::AgentRegistry;
use outpost_core::Clock;
use std::sync::Arc;
use std::time::Duration;

pub struct StalenessConfig {
    pub check_interval: Duration,
    pub staleness_threshold_ms: u64,
}

impl Default for StalenessConfig {
    fn default() -> Self {
        Self { check_interval: Duration::from_secs(15), staleness_threshold_ms: 60_000 }
    }
}

pub async fn run_staleness_sweep_loop<C: Clock + 'static>(
    registry: Arc<AgentRegistry>,
    clock: C,
    config: StalenessConfig,
    mut shutdown: tokio::sync::watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(config.check_interval);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let swept = registry.sweep_stale(clock.epoch_ms(), config.staleness_threshold_ms);
                if swept > 0 {
                    tracing::info!(swept, "marked agents stale");
                }
            }
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    tracing::info!("staleness sweep loop shutting down");
                    break;
                }
            }
        }
    }
}
