// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pure diff: match local plans to remote plans by name within
//! `(organization, project, environment)`, then classify each as a
//! create/update/delete/noop action (spec §4.H).
//!
//! Restructured from the teacher's effectful "snapshot, compute actions,
//! dispatch through an event channel" shape
//! (`crates/daemon/src/lifecycle/reconcile.rs`) into a pure function: there
//! is no event-sourced state machine here for actions to feed into, so
//! `compute_diff` just returns the action list for `apply` to walk.

use crate::hash::content_hash;
use outpost_core::{Plan, PlanId, PlanScope};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub enum PlanAction {
    Create(Plan),
    Update { remote_id: PlanId, plan: Plan },
    Delete { remote_id: PlanId, name: String },
    Noop { name: String },
}

impl PlanAction {
    pub fn name(&self) -> &str {
        match self {
            PlanAction::Create(plan) => &plan.name,
            PlanAction::Update { plan, .. } => &plan.name,
            PlanAction::Delete { name, .. } => name,
            PlanAction::Noop { name } => name,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffSummary {
    pub creates: usize,
    pub updates: usize,
    pub deletes: usize,
    pub noops: usize,
}

fn scope_of(plan: &Plan) -> PlanScope {
    PlanScope::new(&plan.organization, &plan.project, &plan.environment, &plan.name)
}

/// `id` stripped before hashing: it is server-assigned and never present on
/// the local side, so it must not participate in drift detection.
fn plan_hash(plan: &Plan) -> String {
    let mut value = serde_json::to_value(plan).unwrap_or_default();
    if let Some(obj) = value.as_object_mut() {
        obj.remove("id");
    }
    content_hash(&value)
}

/// Diff `local` against `remote`, matching by name within
/// `(organization, project, environment)`. When `include_deletions` is
/// true, remote plans with no local counterpart become `Delete` actions.
pub fn compute_diff(local: &[Plan], remote: &[Plan], include_deletions: bool) -> Vec<PlanAction> {
    let remote_by_scope: HashMap<PlanScope, &Plan> =
        remote.iter().map(|p| (scope_of(p), p)).collect();

    let mut actions = Vec::with_capacity(local.len());
    for plan in local {
        let scope = scope_of(plan);
        match remote_by_scope.get(&scope) {
            None => actions.push(PlanAction::Create(plan.clone())),
            Some(remote_plan) => {
                if plan_hash(plan) == plan_hash(remote_plan) {
                    actions.push(PlanAction::Noop { name: plan.name.clone() });
                } else {
                    let remote_id = remote_plan
                        .id
                        .clone()
                        .expect("remote plans are always server-assigned an id");
                    actions.push(PlanAction::Update { remote_id, plan: plan.clone() });
                }
            }
        }
    }

    if include_deletions {
        let local_scopes: std::collections::HashSet<PlanScope> =
            local.iter().map(scope_of).collect();
        for plan in remote {
            if !local_scopes.contains(&scope_of(plan)) {
                if let Some(remote_id) = plan.id.clone() {
                    actions.push(PlanAction::Delete { remote_id, name: plan.name.clone() });
                }
            }
        }
    }

    actions
}

pub fn summarize(actions: &[PlanAction]) -> DiffSummary {
    let mut summary = DiffSummary::default();
    for action in actions {
        match action {
            PlanAction::Create(_) => summary.creates += 1,
            PlanAction::Update { .. } => summary.updates += 1,
            PlanAction::Delete { .. } => summary.deletes += 1,
            PlanAction::Noop { .. } => summary.noops += 1,
        }
    }
    summary
}

#[cfg(test)]
#[path = "diff_tests.rs"]
mod tests;
