// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reads secrets straight out of the process environment. Mostly useful for
//! local development and integration tests — `reference` is an env var name.

use crate::provider::{SecretProvider, SecretProviderError};
use async_trait::async_trait;
use serde_json::Value;

pub struct EnvProvider;

#[async_trait]
impl SecretProvider for EnvProvider {
    fn name(&self) -> &str {
        "env"
    }

    async fn get(
        &self,
        reference: &str,
        _version: Option<&str>,
    ) -> Result<Value, SecretProviderError> {
        std::env::var(reference)
            .map(Value::String)
            .map_err(|_| SecretProviderError::NotFound(reference.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_reads_an_existing_env_var() {
        std::env::set_var("OUTPOST_TEST_SECRET_ENV", "shh");
        let provider = EnvProvider;
        let v = provider.get("OUTPOST_TEST_SECRET_ENV", None).await.unwrap();
        assert_eq!(v, Value::String("shh".into()));
        std::env::remove_var("OUTPOST_TEST_SECRET_ENV");
    }

    #[tokio::test]
    async fn get_errors_on_missing_env_var() {
        let provider = EnvProvider;
        let err = provider.get("OUTPOST_TEST_SECRET_ENV_MISSING", None).await.unwrap_err();
        assert!(matches!(err, SecretProviderError::NotFound(_)));
    }
}
