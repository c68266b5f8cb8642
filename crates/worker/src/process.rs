// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Processing for a single dequeued job: the status callbacks, secret and
//! target resolution, and engine dispatch `§4.F` describes as one step.

use crate::hub_client::{HubClient, HubClientError};
use crate::target_keys::collect_variable_keys;
use outpost_core::{
    Clock, JobPayload, NodeResult, NodeResultStatus, QueueJob, RunId, RunStatus, TargetConfig,
    TargetScope,
};
use outpost_engine::{EngineError, EventEmitter, HttpClientAdapter, PlanExecutor};
use outpost_secrets::{resolve_secrets_in_plan, SecretRegistry, SecretRegistryError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error(transparent)]
    Hub(#[from] HubClientError),
    #[error(transparent)]
    Secrets(#[from] SecretRegistryError),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Runs a job's plan to completion, PATCHing the run record to `RUNNING`
/// before dispatch and to its terminal status after (spec §4.C "status
/// callbacks", §4.F). Any failure here — including a failed status PATCH —
/// is the "thrown exception" the worker loop's outer catch handles.
pub async fn process_job<H, C, E, Hc>(
    job: &QueueJob,
    executor: &PlanExecutor<H, C, E>,
    secrets: &SecretRegistry<C>,
    hub: &Hc,
) -> Result<Vec<NodeResult>, ProcessError>
where
    H: HttpClientAdapter,
    C: Clock + 'static,
    E: EventEmitter,
    Hc: HubClient,
{
    let JobPayload::ExecutePlan { plan, run_id, .. } = &job.payload;

    hub.patch_run_status(run_id, RunStatus::Running, None, None, &[], &[]).await?;

    let resolved = resolve_secrets_in_plan(plan, secrets).await?;

    let mut target_config =
        TargetConfig::new(TargetScope::new(plan.organization.clone(), plan.environment.clone()));
    for key in collect_variable_keys(plan) {
        if let Some(entry) = hub.get_target(&plan.organization, &plan.environment, &key).await? {
            target_config.targets.insert(key, entry);
        }
    }

    let results = executor
        .execute(plan, run_id, &resolved.headers, &resolved.bodies, &target_config)
        .await?;

    let success = !results.iter().any(|r| r.status == NodeResultStatus::Failed);
    let final_status = if success { RunStatus::Completed } else { RunStatus::Failed };
    let errors: Vec<String> = results.iter().filter_map(|r| r.error.clone()).collect();
    let duration_ms = total_duration_ms(&results);
    hub.patch_run_status(run_id, final_status, Some(duration_ms), Some(success), &errors, &results)
        .await?;

    Ok(results)
}

/// Wall-clock span across every node result, from the earliest start to the
/// latest completion (spec §8 scenario 1 expects `duration_ms > 0`).
fn total_duration_ms(results: &[NodeResult]) -> u64 {
    let started = results.iter().map(|r| r.started_at_ms).min();
    let completed = results.iter().map(|r| r.completed_at_ms).max();
    match (started, completed) {
        (Some(start), Some(end)) => end.saturating_sub(start),
        _ => 0,
    }
}

/// Best-effort terminal PATCH used by the worker loop's catch-all; failure
/// here is logged, never propagated (spec §4.F).
pub async fn mark_run_failed<Hc: HubClient>(hub: &Hc, run_id: &RunId) {
    if let Err(e) =
        hub.patch_run_status(run_id, RunStatus::Failed, None, Some(false), &[], &[]).await
    {
        tracing::warn!(error = %e, %run_id, "best-effort run-failed patch also failed");
    }
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
