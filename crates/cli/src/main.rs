// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thin ops CLI against a running hub: reconcile local plans (`apply`),
//! manually fire a run (`trigger`), and inspect the agent registry
//! (`agents`). Exit codes per spec §6: `0` success, `1` generic failure, `2`
//! `apply --dry-run` found pending changes.

mod client;
mod commands;
mod exit_error;

use clap::{Parser, Subcommand};
use commands::agents::AgentsArgs;
use commands::apply::ApplyArgs;
use commands::trigger::TriggerArgs;

#[derive(Parser)]
#[command(name = "outpost-cli")]
#[command(about = "Operational CLI for the Outpost hub")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Diff local plans against the hub and reconcile them.
    Apply(ApplyArgs),
    /// Manually fire a run for a plan.
    Trigger(TriggerArgs),
    /// Inspect the agent registry.
    Agents(AgentsArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Apply(args) => commands::apply::run(args).await,
        Command::Trigger(args) => commands::trigger::run(args).await,
        Command::Agents(args) => commands::agents::run(args).await,
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(err.code);
    }
}
