// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Turns a plan into one or more enqueued execution jobs. Shared by the
//! manual-trigger route; the scheduler crate's tick loop performs the
//! equivalent for due plans on its own schedule (spec §4.E, §9 open question
//! on multi-location fan-out).

use crate::error::AppError;
use crate::state::AppState;
use outpost_core::{
    Clock, ExecutionGroupId, JobId, JobPayload, JobStatus, Plan, QueueJob, Run, RunId, RunStatus,
    TriggeredBy,
};
use std::sync::Arc;

/// Plans with no declared `locations` run at the single literal location
/// `"local"` rather than fanning out to every online agent (Open Question
/// decision: ambiguous between single-process and multi-agent fan-out
/// modes, so this implementation always picks the deterministic one).
fn locations_for(plan: &Plan) -> Vec<String> {
    if plan.locations.is_empty() {
        vec!["local".to_string()]
    } else {
        plan.locations.clone()
    }
}

/// Creates one `Run` + `QueueJob` per resolved location and persists/enqueues
/// both. Returns the created runs.
pub async fn dispatch_plan<C: Clock>(
    state: &Arc<AppState<C>>,
    plan: &Plan,
    triggered_by: TriggeredBy,
) -> Result<Vec<Run>, AppError> {
    let plan_id = plan.id.ok_or_else(|| AppError::Validation("plan has no id".into()))?;
    let execution_group_id = ExecutionGroupId::new();
    let now_ms = state.clock.epoch_ms();

    let mut runs = Vec::new();
    for location in locations_for(plan) {
        let run = Run {
            id: RunId::new(),
            plan_id,
            execution_group_id,
            location: location.clone(),
            environment: plan.environment.clone(),
            status: RunStatus::Pending,
            triggered_by: triggered_by.clone(),
            started_at_ms: now_ms,
            completed_at_ms: None,
            duration_ms: None,
            success: None,
            errors: Vec::new(),
            results: Vec::new(),
        };
        state.runs.create(&run).await?;

        let job = QueueJob {
            id: JobId::new(),
            queue_name: state.execute_plan_queue.clone(),
            location: location.clone(),
            payload: JobPayload::ExecutePlan {
                plan_id,
                run_id: run.id,
                execution_group_id,
                location,
                plan: plan.clone(),
            },
            status: JobStatus::Pending,
            attempts: 0,
            max_attempts: state.default_max_attempts,
            priority: 0,
            scheduled_for_ms: now_ms,
            created_at_ms: now_ms,
            locked_until_ms: None,
            last_error: None,
        };
        state.queue.push(job).await?;
        runs.push(run);
    }
    Ok(runs)
}
