// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process job queue. Used by `outpost-agentd` (single-process, no
//! shared Postgres needed locally) and by every queue-consuming crate's
//! tests, the way the teacher keeps an in-memory `MaterializedState` ahead
//! of any persistence backend.

use crate::queue_trait::{JobQueue, QueueError};
use async_trait::async_trait;
use outpost_core::{JobId, JobStatus, QueueJob};
use parking_lot::Mutex;
use std::collections::HashMap;

pub struct InMemoryJobQueue {
    jobs: Mutex<HashMap<JobId, QueueJob>>,
}

impl InMemoryJobQueue {
    pub fn new() -> Self {
        Self { jobs: Mutex::new(HashMap::new()) }
    }
}

impl Default for InMemoryJobQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl JobQueue for InMemoryJobQueue {
    async fn push(&self, job: QueueJob) -> Result<(), QueueError> {
        self.jobs.lock().insert(job.id.clone(), job);
        Ok(())
    }

    async fn dequeue(
        &self,
        queue_name: &str,
        location: &str,
        now_ms: u64,
        visibility_timeout_ms: u64,
    ) -> Result<Option<QueueJob>, QueueError> {
        let mut jobs = self.jobs.lock();
        let candidate_id = jobs
            .values()
            .filter(|j| {
                j.queue_name == queue_name
                    && j.location == location
                    && j.status.is_dequeue_eligible()
                    && j.scheduled_for_ms <= now_ms
            })
            .min_by_key(|j| (std::cmp::Reverse(j.priority), j.scheduled_for_ms, j.created_at_ms))
            .map(|j| j.id.clone());

        let Some(id) = candidate_id else {
            return Ok(None);
        };
        let job = jobs.get_mut(&id).expect("candidate id came from this map");
        job.status = JobStatus::Running;
        job.attempts += 1;
        job.locked_until_ms = Some(now_ms + visibility_timeout_ms);
        Ok(Some(job.clone()))
    }

    async fn ack(&self, job_id: &JobId) -> Result<(), QueueError> {
        let mut jobs = self.jobs.lock();
        let job = jobs.get_mut(job_id).ok_or_else(|| QueueError::NotFound(job_id.to_string()))?;
        job.status = JobStatus::Completed;
        job.locked_until_ms = None;
        Ok(())
    }

    async fn fail(&self, job_id: &JobId, now_ms: u64, error: String) -> Result<(), QueueError> {
        let mut jobs = self.jobs.lock();
        let job = jobs.get_mut(job_id).ok_or_else(|| QueueError::NotFound(job_id.to_string()))?;
        job.last_error = Some(error);
        job.locked_until_ms = None;
        if job.is_exhausted() {
            job.status = JobStatus::Failed;
        } else {
            job.status = JobStatus::Retrying;
            job.scheduled_for_ms = now_ms + QueueJob::backoff_seconds(job.attempts) * 1_000;
        }
        Ok(())
    }

    async fn release_expired(&self, now_ms: u64) -> Result<usize, QueueError> {
        let mut jobs = self.jobs.lock();
        let mut released = 0;
        for job in jobs.values_mut() {
            if job.status == JobStatus::Running
                && job.locked_until_ms.map(|t| t <= now_ms).unwrap_or(false)
            {
                job.status = JobStatus::Pending;
                job.locked_until_ms = None;
                released += 1;
            }
        }
        Ok(released)
    }
}
