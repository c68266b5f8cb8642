// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HashiCorp Vault KV v2 secret provider: `GET {base}/v1/{mount}/data/{ref}`.

use crate::provider::{SecretProvider, SecretProviderError};
use async_trait::async_trait;
use serde_json::Value;

pub struct VaultKvProvider {
    base_url: String,
    mount: String,
    token: String,
    client: reqwest::Client,
}

impl VaultKvProvider {
    pub fn new(base_url: impl Into<String>, mount: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            mount: mount.into(),
            token: token.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl SecretProvider for VaultKvProvider {
    fn name(&self) -> &str {
        "vault-kv"
    }

    async fn get(
        &self,
        reference: &str,
        version: Option<&str>,
    ) -> Result<Value, SecretProviderError> {
        let mut url = format!(
            "{}/v1/{}/data/{}",
            self.base_url.trim_end_matches('/'),
            self.mount,
            reference.trim_start_matches('/'),
        );
        if let Some(version) = version {
            url.push_str(&format!("?version={version}"));
        }

        let response = self
            .client
            .get(&url)
            .header("X-Vault-Token", &self.token)
            .send()
            .await
            .map_err(|e| SecretProviderError::Unavailable(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(SecretProviderError::NotFound(reference.to_string()));
        }
        if !response.status().is_success() {
            return Err(SecretProviderError::Unavailable(format!(
                "vault returned {}",
                response.status()
            )));
        }

        let body: Value =
            response.json().await.map_err(|e| SecretProviderError::Malformed(e.to_string()))?;

        body.get("data")
            .and_then(|d| d.get("data"))
            .cloned()
            .ok_or_else(|| {
                SecretProviderError::Malformed("missing data.data in vault response".to_string())
            })
    }
}
