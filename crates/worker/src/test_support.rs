// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory [`HubClient`] double shared by `process` and `runner` tests.

use crate::hub_client::{HubClient, HubClientError};
use outpost_core::{NodeResult, RunId, RunStatus, TargetEntry};
use parking_lot::Mutex;
use std::collections::HashMap;

#[derive(Default)]
pub struct FakeHubClient {
    targets: Mutex<HashMap<String, TargetEntry>>,
    patches: Mutex<Vec<(RunId, RunStatus)>>,
    fail_patches: Mutex<bool>,
}

impl FakeHubClient {
    pub fn with_target(key: &str, entry: TargetEntry) -> Self {
        let hub = Self::default();
        hub.targets.lock().insert(key.to_string(), entry);
        hub
    }

    pub fn set_fail_patches(&self, fail: bool) {
        *self.fail_patches.lock() = fail;
    }

    pub fn statuses(&self) -> Vec<RunStatus> {
        self.patches.lock().iter().map(|(_, s)| *s).collect()
    }
}

#[async_trait::async_trait]
impl HubClient for FakeHubClient {
    async fn patch_run_status(
        &self,
        run_id: &RunId,
        status: RunStatus,
        _duration_ms: Option<u64>,
        _success: Option<bool>,
        _errors: &[String],
        _results: &[NodeResult],
    ) -> Result<(), HubClientError> {
        if *self.fail_patches.lock() {
            return Err(HubClientError::Transport("simulated outage".into()));
        }
        self.patches.lock().push((run_id.clone(), status));
        Ok(())
    }

    async fn get_target(
        &self,
        _organization: &str,
        _environment: &str,
        target_key: &str,
    ) -> Result<Option<TargetEntry>, HubClientError> {
        Ok(self.targets.lock().get(target_key).cloned())
    }
}
