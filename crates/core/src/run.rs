// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A run: one execution of a plan at a particular location (spec §3, §8).

use crate::plan::PlanId;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Server-assigned run identifier.
    pub struct RunId("run-");
}

/// Correlates the sibling runs created by a single schedule tick or manual
/// trigger when a plan fans out across `locations` (spec §9, open question).
crate::define_id! {
    pub struct ExecutionGroupId("xgr-");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

crate::simple_display! {
    RunStatus {
        Pending => "PENDING",
        Running => "RUNNING",
        Completed => "COMPLETED",
        Failed => "FAILED",
    }
}

impl RunStatus {
    /// A run's status only ever moves forward through `PENDING -> RUNNING ->
    /// (COMPLETED | FAILED)`; there is no cancellation mid-flight.
    pub fn can_transition_to(self, next: RunStatus) -> bool {
        use RunStatus::*;
        matches!((self, next), (Pending, Running) | (Running, Completed) | (Running, Failed))
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RunStatus::Completed | RunStatus::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TriggeredBy {
    Schedule,
    Manual { principal: String },
    Reconciler,
}

/// The per-node outcome recorded once a run finishes (or partially finishes).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeResult {
    pub node_id: String,
    pub status: NodeResultStatus,
    pub started_at_ms: u64,
    pub completed_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_body: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeResultStatus {
    Passed,
    Failed,
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub id: RunId,
    pub plan_id: PlanId,
    pub execution_group_id: ExecutionGroupId,
    pub location: String,
    pub environment: String,
    pub status: RunStatus,
    pub triggered_by: TriggeredBy,
    pub started_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub results: Vec<NodeResult>,
}

impl Run {
    /// Apply a status transition, rejecting anything that would move the
    /// run backwards.
    pub fn transition(&mut self, next: RunStatus, now_ms: u64) -> Result<(), RunTransitionError> {
        if !self.status.can_transition_to(next) {
            return Err(RunTransitionError::Illegal { from: self.status, to: next });
        }
        self.status = next;
        if next.is_terminal() {
            self.completed_at_ms = Some(now_ms);
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RunTransitionError {
    #[error("illegal run status transition: {from} -> {to}")]
    Illegal { from: RunStatus, to: RunStatus },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_run() -> Run {
        Run {
            id: RunId::new(),
            plan_id: PlanId::new(),
            execution_group_id: ExecutionGroupId::new(),
            location: "local".into(),
            environment: "prod".into(),
            status: RunStatus::Pending,
            triggered_by: TriggeredBy::Schedule,
            started_at_ms: 0,
            completed_at_ms: None,
            duration_ms: None,
            success: None,
            errors: vec![],
            results: vec![],
        }
    }

    #[test]
    fn transition_pending_to_running_is_allowed() {
        let mut run = new_run();
        assert!(run.transition(RunStatus::Running, 100).is_ok());
        assert_eq!(run.status, RunStatus::Running);
        assert_eq!(run.completed_at_ms, None);
    }

    #[test]
    fn transition_to_terminal_status_sets_completed_at() {
        let mut run = new_run();
        run.transition(RunStatus::Running, 100).unwrap();
        run.transition(RunStatus::Completed, 200).unwrap();
        assert_eq!(run.completed_at_ms, Some(200));
    }

    #[test]
    fn transition_cannot_move_backwards() {
        let mut run = new_run();
        run.transition(RunStatus::Running, 100).unwrap();
        run.transition(RunStatus::Completed, 200).unwrap();
        let err = run.transition(RunStatus::Running, 300).unwrap_err();
        assert_eq!(
            err,
            RunTransitionError::Illegal { from: RunStatus::Completed, to: RunStatus::Running }
        );
    }

    #[test]
    fn transition_cannot_skip_running() {
        let mut run = new_run();
        let err = run.transition(RunStatus::Completed, 100).unwrap_err();
        assert_eq!(
            err,
            RunTransitionError::Illegal { from: RunStatus::Pending, to: RunStatus::Completed }
        );
    }

    #[test]
    fn pending_cannot_be_cancelled() {
        let mut run = new_run();
        let err = run.transition(RunStatus::Failed, 50).unwrap_err();
        assert_eq!(
            err,
            RunTransitionError::Illegal { from: RunStatus::Pending, to: RunStatus::Failed }
        );
    }
}
