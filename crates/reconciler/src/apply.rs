// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Walks a computed diff and performs the HTTP calls, aggregating per-action
//! errors instead of aborting on the first failure (spec §4.H).

use crate::client::HubPlanClient;
use crate::diff::PlanAction;

#[derive(Debug, Clone, PartialEq)]
pub struct ApplyError {
    pub name: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplyOutcome {
    pub applied: Vec<String>,
    pub errors: Vec<ApplyError>,
}

/// Apply every non-noop action in `actions`. `dry_run` short-circuits every
/// write into a log line and returns an empty outcome.
pub async fn apply(
    client: &dyn HubPlanClient,
    actions: &[PlanAction],
    dry_run: bool,
) -> ApplyOutcome {
    if dry_run {
        for action in actions {
            if !matches!(action, PlanAction::Noop { .. }) {
                tracing::info!(name = action.name(), action = ?action_kind(action), "dry run: would apply");
            }
        }
        return ApplyOutcome::default();
    }

    let mut outcome = ApplyOutcome::default();
    for action in actions {
        match action {
            PlanAction::Noop { .. } => {}
            PlanAction::Create(plan) => match client.create_plan(plan).await {
                Ok(_) => outcome.applied.push(plan.name.clone()),
                Err(e) => outcome.errors.push(ApplyError { name: plan.name.clone(), message: e.to_string() }),
            },
            PlanAction::Update { remote_id, plan } => match client.update_plan(remote_id, plan).await {
                Ok(_) => outcome.applied.push(plan.name.clone()),
                Err(e) => outcome.errors.push(ApplyError { name: plan.name.clone(), message: e.to_string() }),
            },
            PlanAction::Delete { remote_id, name } => match client.delete_plan(remote_id).await {
                Ok(()) => outcome.applied.push(name.clone()),
                Err(e) => outcome.errors.push(ApplyError { name: name.clone(), message: e.to_string() }),
            },
        }
    }
    outcome
}

fn action_kind(action: &PlanAction) -> &'static str {
    match action {
        PlanAction::Create(_) => "create",
        PlanAction::Update { .. } => "update",
        PlanAction::Delete { .. } => "delete",
        PlanAction::Noop { .. } => "noop",
    }
}

#[cfg(test)]
#[path = "apply_tests.rs"]
mod tests;
