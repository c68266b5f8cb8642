// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Due-plan discovery and job dispatch (spec §4.E._tick). Mirrors
//! `outpost_server::dispatch::dispatch_plan`'s run-creation/enqueue shape for
//! the scheduler's own schedule-triggered path, since a manual trigger and a
//! scheduled tick end up doing the same thing to the same two stores.

use outpost_core::{
    ExecutionGroupId, JobId, JobStatus, JobPayload, Plan, PlanId, QueueJob, Run, RunId, RunStatus,
    TriggeredBy,
};
use outpost_queue::{JobQueue, QueueError};
use outpost_storage::{PlanFilter, PlanRepository, RunFilter, RunRepository, StorageError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Queue(#[from] QueueError),
}

/// Queue partition and attempt budget a scheduled job is enqueued with.
pub struct SchedulerSettings {
    pub execute_plan_queue: String,
    pub default_max_attempts: u32,
}

/// Empty `locations` resolves to the single literal location `"local"`
/// rather than every currently-online agent (Open Question decision, spec
/// §9): keeps single-process/dev-mode scheduling deterministic.
fn locations_for(plan: &Plan) -> Vec<String> {
    if plan.locations.is_empty() {
        vec!["local".to_string()]
    } else {
        plan.locations.clone()
    }
}

async fn last_started_at_ms(
    runs: &dyn RunRepository,
    plan_id: PlanId,
) -> Result<Option<u64>, SchedulerError> {
    let existing =
        runs.list(RunFilter { plan_id: Some(plan_id), limit: i64::MAX, offset: 0 }).await?;
    Ok(existing.iter().map(|r| r.started_at_ms).max())
}

/// A plan is due when it declares a `frequency` and either has never run or
/// its interval has elapsed since the run with the latest `started_at_ms`
/// (spec §4.E.1). Plans without a `frequency` are never scheduler-triggered.
pub async fn is_due(
    runs: &dyn RunRepository,
    plan: &Plan,
    now_ms: u64,
) -> Result<bool, SchedulerError> {
    let Some(frequency) = plan.frequency else {
        return Ok(false);
    };
    let Some(plan_id) = plan.id else {
        return Ok(false);
    };
    let interval_ms = frequency.unit.as_duration(frequency.every).as_millis() as u64;
    match last_started_at_ms(runs, plan_id).await? {
        None => Ok(true),
        Some(last) => Ok(last.saturating_add(interval_ms) <= now_ms),
    }
}

/// Allocates an `executionGroupId`, creates one `Run(PENDING, SCHEDULE)` per
/// resolved location, and enqueues the matching job carrying a snapshot of
/// `plan` taken now so a later edit cannot mutate this in-flight dispatch
/// (spec §4.E.2).
async fn dispatch_plan(
    runs: &dyn RunRepository,
    queue: &dyn JobQueue,
    settings: &SchedulerSettings,
    plan: &Plan,
    now_ms: u64,
) -> Result<Vec<Run>, SchedulerError> {
    let plan_id = plan.id.expect("is_due only admits plans with an id");
    let execution_group_id = ExecutionGroupId::new();

    let mut created = Vec::new();
    for location in locations_for(plan) {
        let run = Run {
            id: RunId::new(),
            plan_id,
            execution_group_id,
            location: location.clone(),
            environment: plan.environment.clone(),
            status: RunStatus::Pending,
            triggered_by: TriggeredBy::Schedule,
            started_at_ms: now_ms,
            completed_at_ms: None,
            duration_ms: None,
            success: None,
            errors: Vec::new(),
            results: Vec::new(),
        };
        runs.create(&run).await?;

        let job = QueueJob {
            id: JobId::new(),
            queue_name: settings.execute_plan_queue.clone(),
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
            max_attempts: settings.default_max_attempts,
            priority: 0,
            scheduled_for_ms: now_ms,
            created_at_ms: now_ms,
            locked_until_ms: None,
            last_error: None,
        };
        queue.push(job).await?;
        created.push(run);
    }
    Ok(created)
}

/// One scheduler tick (spec §4.E._tick): find every due plan, dispatch it,
/// and return the runs created. Plans are queried un-paginated since the
/// whole due set must be evaluated in a single tick.
pub async fn dispatch_due_plans(
    plans: &dyn PlanRepository,
    runs: &dyn RunRepository,
    queue: &dyn JobQueue,
    settings: &SchedulerSettings,
    now_ms: u64,
) -> Result<Vec<Run>, SchedulerError> {
    let all_plans = plans.list(PlanFilter { limit: i64::MAX, ..Default::default() }).await?;
    let mut dispatched = Vec::new();
    for plan in all_plans {
        if plan.frequency.is_none() {
            continue;
        }
        if is_due(runs, &plan, now_ms).await? {
            dispatched.extend(dispatch_plan(runs, queue, settings, &plan, now_ms).await?);
        }
    }
    Ok(dispatched)
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
