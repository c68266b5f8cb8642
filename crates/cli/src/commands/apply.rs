// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `outpost-cli apply` — diff a local plan set against what the hub has
//! stored and reconcile it (spec §4.H).

use crate::exit_error::ExitError;
use clap::Args;
use outpost_core::Plan;
use outpost_reconciler::{apply, compute_diff, summarize, ReqwestHubPlanClient};
use std::collections::BTreeSet;
use std::path::PathBuf;

#[derive(Args)]
pub struct ApplyArgs {
    /// Directory of plan documents (`*.json`) to reconcile against the hub.
    pub path: PathBuf,
    /// Hub base URL. Defaults to `$HUB_URL`.
    #[arg(long)]
    pub hub_url: Option<String>,
    /// Bearer token sent as `Authorization: Bearer <token>`. Defaults to
    /// `$OUTPOST_AUTH_TOKEN`.
    #[arg(long)]
    pub auth_token: Option<String>,
    /// Also delete remote plans with no local counterpart.
    #[arg(long)]
    pub include_deletions: bool,
    /// Compute and print the diff without applying it. Exits `2` if there
    /// are pending changes.
    #[arg(long)]
    pub dry_run: bool,
}

fn load_local_plans(dir: &std::path::Path) -> anyhow::Result<Vec<Plan>> {
    let mut plans = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let contents = std::fs::read_to_string(&path)?;
        let plan: Plan = serde_json::from_str(&contents)
            .map_err(|e| anyhow::anyhow!("{}: {e}", path.display()))?;
        plans.push(plan);
    }
    Ok(plans)
}

#[cfg(test)]
#[path = "apply_tests.rs"]
mod tests;

pub async fn run(args: ApplyArgs) -> Result<(), ExitError> {
    let hub_url = args
        .hub_url
        .or_else(|| std::env::var("HUB_URL").ok())
        .ok_or_else(|| ExitError::new(1, "--hub-url or HUB_URL must be set"))?;
    let auth_header = args
        .auth_token
        .or_else(|| std::env::var("OUTPOST_AUTH_TOKEN").ok())
        .map(|token| ("Authorization".to_string(), format!("Bearer {token}")));

    let local = load_local_plans(&args.path)
        .map_err(|e| ExitError::new(1, format!("failed to load plans from {}: {e}", args.path.display())))?;

    let client = ReqwestHubPlanClient::new(hub_url, auth_header);

    let scopes: BTreeSet<(String, String)> =
        local.iter().map(|p| (p.project.clone(), p.environment.clone())).collect();
    let mut remote = Vec::new();
    for (project, environment) in scopes {
        let fetched = client
            .list_plans(&project, &environment)
            .await
            .map_err(|e| ExitError::new(1, format!("failed to list remote plans: {e}")))?;
        remote.extend(fetched);
    }

    let actions = compute_diff(&local, &remote, args.include_deletions);
    let summary = summarize(&actions);
    println!(
        "{} create, {} update, {} delete, {} noop",
        summary.creates, summary.updates, summary.deletes, summary.noops
    );

    let has_changes = summary.creates > 0 || summary.updates > 0 || summary.deletes > 0;

    let outcome = apply(&client, &actions, args.dry_run).await;
    if !outcome.errors.is_empty() {
        for error in &outcome.errors {
            eprintln!("error applying {}: {}", error.name, error.message);
        }
        return Err(ExitError::new(1, format!("{} plan(s) failed to apply", outcome.errors.len())));
    }

    if !args.dry_run {
        for name in &outcome.applied {
            println!("applied: {name}");
        }
    } else if has_changes {
        return Err(ExitError::new(2, "dry run: pending changes"));
    }

    Ok(())
}
