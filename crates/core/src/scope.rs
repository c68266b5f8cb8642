// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Plan identity scoping: `(organization, project, environment, name)`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The tuple a plan's human-readable name is unique within.
///
/// A plan's server-assigned `id` is immutable; `PlanScope` is what the
/// reconciler and the `by-name` lookup route use to find "the same plan"
/// across local/remote and across edits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlanScope {
    pub organization: String,
    pub project: String,
    pub environment: String,
    pub name: String,
}

impl PlanScope {
    pub fn new(
        organization: impl Into<String>,
        project: impl Into<String>,
        environment: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            organization: organization.into(),
            project: project.into(),
            environment: environment.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for PlanScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.organization, self.project, self.environment, self.name
        )
    }
}

/// Key a per-`(organization, environment)` target map is stored under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetScope {
    pub organization: String,
    pub environment: String,
}

impl TargetScope {
    pub fn new(organization: impl Into<String>, environment: impl Into<String>) -> Self {
        Self {
            organization: organization.into(),
            environment: environment.into(),
        }
    }
}

impl fmt::Display for TargetScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.organization, self.environment)
    }
}
