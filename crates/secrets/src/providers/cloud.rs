// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A generic REST-fronted secret store provider. Talks to whatever gateway
//! sits in front of the org's managed secret store (AWS Secrets Manager,
//! GCP Secret Manager, etc. behind an internal proxy) over plain HTTPS, the
//! way `VaultKvProvider` talks to Vault's KV HTTP API.

use crate::provider::{SecretProvider, SecretProviderError};
use async_trait::async_trait;
use serde_json::Value;

pub struct CloudSecretStoreProvider {
    base_url: String,
    auth_header: Option<String>,
    client: reqwest::Client,
}

impl CloudSecretStoreProvider {
    pub fn new(base_url: impl Into<String>, auth_header: Option<String>) -> Self {
        Self { base_url: base_url.into(), auth_header, client: reqwest::Client::new() }
    }
}

#[async_trait]
impl SecretProvider for CloudSecretStoreProvider {
    fn name(&self) -> &str {
        "cloud"
    }

    async fn get(
        &self,
        reference: &str,
        version: Option<&str>,
    ) -> Result<Value, SecretProviderError> {
        let mut url = format!("{}/secrets/{}", self.base_url.trim_end_matches('/'), reference);
        if let Some(version) = version {
            url.push_str(&format!("?version={version}"));
        }

        let mut request = self.client.get(&url);
        if let Some(auth) = &self.auth_header {
            request = request.header("authorization", auth);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SecretProviderError::Unavailable(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(SecretProviderError::NotFound(reference.to_string()));
        }
        if !response.status().is_success() {
            return Err(SecretProviderError::Unavailable(format!(
                "cloud secret store returned {}",
                response.status()
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| SecretProviderError::Malformed(e.to_string()))
    }
}
