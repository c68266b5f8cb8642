// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The durable job queue's storage-agnostic surface (spec §4.D).

use async_trait::async_trait;
use outpost_core::JobId;
use outpost_core::QueueJob;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("job not found: {0}")]
    NotFound(String),
    #[error("queue backend error: {0}")]
    Backend(String),
}

/// A `(queueName, location)`-partitioned durable job queue.
///
/// `dequeue` must be safe under concurrent workers: two callers racing for
/// the same partition never receive the same job (spec §8.6).
#[async_trait]
pub trait JobQueue: Send + Sync {
    async fn push(&self, job: QueueJob) -> Result<(), QueueError>;

    /// Atomically claim the next eligible job in `queue_name`/`location`,
    /// marking it in-progress with a lock that expires at `now_ms +
    /// visibility_timeout_ms` unless acked or failed first.
    async fn dequeue(
        &self,
        queue_name: &str,
        location: &str,
        now_ms: u64,
        visibility_timeout_ms: u64,
    ) -> Result<Option<QueueJob>, QueueError>;

    async fn ack(&self, job_id: &JobId) -> Result<(), QueueError>;

    /// Mark a claimed job failed; the implementation re-enqueues it with
    /// backoff or dead-letters it once `max_attempts` is exhausted.
    async fn fail(&self, job_id: &JobId, now_ms: u64, error: String) -> Result<(), QueueError>;

    /// Release jobs whose visibility lock expired without an ack/fail
    /// (crashed worker). Returns the number of jobs released back to
    /// `Pending`.
    async fn release_expired(&self, now_ms: u64) -> Result<usize, QueueError>;
}
