// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The durable job queue (spec §4.D): a `(queueName, location)`-partitioned
//! work queue with at-least-once, visibility-timeout based dispatch.

pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod queue_trait;
pub mod sweep;

pub use memory::InMemoryJobQueue;
#[cfg(feature = "postgres")]
pub use postgres::PostgresJobQueue;
pub use queue_trait::{JobQueue, QueueError};
pub use sweep::{run_sweep_loop, SweepConfig};
