// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The agent's poll-ack-fail job loop (spec §4.F): dequeues execution jobs,
//! resolves secrets and target variables, runs the engine, and PATCHes run
//! status back to the hub.

pub mod hub_client;
pub mod process;
pub mod runner;
pub mod target_keys;

#[cfg(test)]
mod test_support;

pub use hub_client::{HubClient, HubClientError, ReqwestHubClient};
pub use process::{mark_run_failed, process_job, ProcessError};
pub use runner::{run_worker_loop, WorkerConfig};
pub use target_keys::collect_variable_keys;
