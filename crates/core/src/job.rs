// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable job queue entities (spec §3, §4.D).
//!
//! `QueueJob` is the envelope every row in the queue table carries, the way
//! `oj_core::job::JobConfig` wraps a `StepStatus`/outcome pair generically
//! over whatever the step actually runs; here the payload is the handful of
//! job kinds this system dispatches rather than an open-ended step tree.

use crate::plan::{Plan, PlanId};
use crate::run::{ExecutionGroupId, RunId};
use serde::{Deserialize, Serialize};

crate::define_id! {
    pub struct JobId("job-");
}

/// The one job kind a hub dispatches today: run a plan's DAG at a location.
/// Shaped as an enum (not a bare struct) so a future job kind is additive.
///
/// Carries the full plan document as it existed at schedule time, not just
/// `plan_id`: a plan edited after a job is enqueued must not change the
/// in-flight job's behavior (spec §4.E.2).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobPayload {
    ExecutePlan {
        plan_id: PlanId,
        run_id: RunId,
        execution_group_id: ExecutionGroupId,
        location: String,
        plan: Plan,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Retrying,
}

crate::simple_display! {
    JobStatus {
        Pending => "PENDING",
        Running => "RUNNING",
        Completed => "COMPLETED",
        Failed => "FAILED",
        Retrying => "RETRYING",
    }
}

impl JobStatus {
    /// Dequeue eligibility predicate (spec §4.D): a job is pickable up fresh
    /// or after a backoff-rescheduled retry.
    pub fn is_dequeue_eligible(self) -> bool {
        matches!(self, JobStatus::Pending | JobStatus::Retrying)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueJob {
    pub id: JobId,
    pub queue_name: String,
    pub location: String,
    pub payload: JobPayload,
    pub status: JobStatus,
    pub attempts: u32,
    pub max_attempts: u32,
    pub priority: i32,
    pub scheduled_for_ms: u64,
    pub created_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked_until_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl QueueJob {
    /// Exponential backoff capped at an hour: `min(2^attempts, 3600)` seconds
    /// (spec §4.D).
    pub fn backoff_seconds(attempts: u32) -> u64 {
        let capped_exp = attempts.min(12); // 2^12 = 4096 > 3600, saturates anyway
        (1u64 << capped_exp).min(3_600)
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempts >= self.max_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_plan() -> Plan {
        Plan {
            id: None,
            organization: "acme".into(),
            project: "checkout".into(),
            environment: "prod".into(),
            name: "webhook-check".into(),
            version: "1.0".into(),
            frequency: None,
            locations: vec![],
            nodes: vec![],
            edges: vec![],
        }
    }

    fn job() -> QueueJob {
        QueueJob {
            id: JobId::new(),
            queue_name: "execute-plan".into(),
            location: "local".into(),
            payload: JobPayload::ExecutePlan {
                plan_id: PlanId::new(),
                run_id: RunId::new(),
                execution_group_id: ExecutionGroupId::new(),
                location: "local".into(),
                plan: minimal_plan(),
            },
            status: JobStatus::Pending,
            attempts: 0,
            max_attempts: 5,
            priority: 0,
            scheduled_for_ms: 0,
            created_at_ms: 0,
            locked_until_ms: None,
            last_error: None,
        }
    }

    #[test]
    fn backoff_doubles_until_the_cap() {
        assert_eq!(QueueJob::backoff_seconds(0), 1);
        assert_eq!(QueueJob::backoff_seconds(1), 2);
        assert_eq!(QueueJob::backoff_seconds(6), 64);
    }

    #[test]
    fn backoff_saturates_at_one_hour() {
        assert_eq!(QueueJob::backoff_seconds(20), 3_600);
    }

    #[test]
    fn is_exhausted_once_attempts_reach_max() {
        let mut j = job();
        j.attempts = 5;
        assert!(j.is_exhausted());
    }

    #[test]
    fn is_not_exhausted_below_max() {
        let j = job();
        assert!(!j.is_exhausted());
    }
}
