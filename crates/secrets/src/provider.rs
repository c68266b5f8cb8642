// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The [`SecretProvider`] adapter trait: one narrow async method per
//! backend, the way `oj_adapters::agent::AgentAdapter` keeps a single
//! process-supervision concern behind one trait rather than leaking backend
//! specifics into callers.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SecretProviderError {
    #[error("secret not found: {0}")]
    NotFound(String),
    #[error("secret provider unavailable: {0}")]
    Unavailable(String),
    #[error("malformed secret payload: {0}")]
    Malformed(String),
}

/// A backend a `$secret` marker's `provider` field can name.
///
/// Implementations fetch and return the raw secret payload; field
/// extraction (`SecretRef::field`) and caching happen in [`crate::registry::SecretRegistry`],
/// not here, so every provider only has to answer "what is this secret."
#[async_trait]
pub trait SecretProvider: Send + Sync {
    /// The name plans reference this provider by in `$secret.provider`.
    fn name(&self) -> &str;

    /// Fetch the secret payload. A scalar secret returns a JSON string; a
    /// structured secret (e.g. a key/value bundle) returns a JSON object
    /// that `field` can index into.
    async fn get(
        &self,
        reference: &str,
        version: Option<&str>,
    ) -> Result<Value, SecretProviderError>;
}
