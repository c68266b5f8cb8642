// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `outpost-cli agents` — inspect the hub's agent registry (spec §4.G,
//! §4.I).

use crate::client::OpsClient;
use crate::exit_error::ExitError;
use clap::{Args, Subcommand};

#[derive(Args)]
pub struct AgentsArgs {
    #[command(subcommand)]
    pub command: AgentsCommand,
}

#[derive(Subcommand)]
pub enum AgentsCommand {
    /// List registered agents.
    List {
        /// Filter by location.
        #[arg(long)]
        location: Option<String>,
        /// Filter by status (`ONLINE`, `STALE`, `DEREGISTERED`).
        #[arg(long)]
        status: Option<String>,
    },
    /// List the distinct set of registered locations.
    Locations,
}

fn client_config() -> Result<(String, Option<(String, String)>), ExitError> {
    let hub_url = std::env::var("HUB_URL")
        .map_err(|_| ExitError::new(1, "HUB_URL must be set"))?;
    let auth_header = std::env::var("OUTPOST_AUTH_TOKEN")
        .ok()
        .map(|token| ("Authorization".to_string(), format!("Bearer {token}")));
    Ok((hub_url, auth_header))
}

pub async fn run(args: AgentsArgs) -> Result<(), ExitError> {
    let (hub_url, auth_header) = client_config()?;
    let client = OpsClient::new(hub_url, auth_header);

    match args.command {
        AgentsCommand::List { location, status } => {
            let agents = client
                .list_agents(location.as_deref(), status.as_deref())
                .await
                .map_err(|e| ExitError::new(1, format!("failed to list agents: {e}")))?;
            for agent in agents {
                println!(
                    "{} name={} location={} status={}",
                    agent.id, agent.name, agent.location, agent.status
                );
            }
        }
        AgentsCommand::Locations => {
            let locations = client
                .list_locations()
                .await
                .map_err(|e| ExitError::new(1, format!("failed to list locations: {e}")))?;
            for location in locations {
                println!("{location}");
            }
        }
    }
    Ok(())
}
