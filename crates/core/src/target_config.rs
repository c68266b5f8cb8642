// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Target configuration: the `(organization, environment)`-scoped map a
//! `$variable` marker's `key` resolves against (spec §3, §6).

use crate::scope::TargetScope;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetEntry {
    pub base_url: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetConfig {
    pub scope: TargetScope,
    pub targets: HashMap<String, TargetEntry>,
}

impl TargetConfig {
    pub fn new(scope: TargetScope) -> Self {
        Self { scope, targets: HashMap::new() }
    }

    pub fn resolve(&self, key: &str) -> Option<&TargetEntry> {
        self.targets.get(key)
    }
}
