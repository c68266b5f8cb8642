// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `outpost-cli trigger` — manually fire a plan (spec §4.I
//! `POST /runs/trigger-by-plan-id/:planId`).

use crate::client::OpsClient;
use crate::exit_error::ExitError;
use clap::Args;

#[derive(Args)]
pub struct TriggerArgs {
    /// Plan id to trigger (`pln-...`).
    pub plan_id: String,
    /// Environment to run in.
    pub environment: String,
    /// Hub base URL. Defaults to `$HUB_URL`.
    #[arg(long)]
    pub hub_url: Option<String>,
    /// Bearer token sent as `Authorization: Bearer <token>`. Defaults to
    /// `$OUTPOST_AUTH_TOKEN`.
    #[arg(long)]
    pub auth_token: Option<String>,
}

pub async fn run(args: TriggerArgs) -> Result<(), ExitError> {
    let hub_url = args
        .hub_url
        .or_else(|| std::env::var("HUB_URL").ok())
        .ok_or_else(|| ExitError::new(1, "--hub-url or HUB_URL must be set"))?;
    let auth_header = args
        .auth_token
        .or_else(|| std::env::var("OUTPOST_AUTH_TOKEN").ok())
        .map(|token| ("Authorization".to_string(), format!("Bearer {token}")));

    let client = OpsClient::new(hub_url, auth_header);
    let run = client
        .trigger_run(&args.plan_id, &args.environment)
        .await
        .map_err(|e| ExitError::new(1, format!("failed to trigger run: {e}")))?;

    println!("run {} ({}) location={} status={}", run.id, run.plan_id, run.location, run.status);
    Ok(())
}
