// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The provider registry plans' `$secret` markers resolve through.

use crate::cache::TtlCache;
use crate::provider::{SecretProvider, SecretProviderError};
use outpost_core::{Clock, SecretRef};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Default cache lifetime for resolved secrets (spec §3).
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Error)]
pub enum SecretRegistryError {
    #[error("secret provider already registered: {0}")]
    DuplicateProvider(String),
    #[error("unknown secret provider: {0}")]
    UnknownProvider(String),
    #[error(transparent)]
    Provider(#[from] SecretProviderError),
    #[error("secret has no field {field:?} in payload from provider {provider}")]
    MissingField { provider: String, field: String },
}

type DedupKey = (String, String, Option<String>, Option<String>);

pub struct SecretRegistry<C: Clock> {
    providers: HashMap<String, Arc<dyn SecretProvider>>,
    cache: TtlCache<DedupKey, Value, C>,
}

impl<C: Clock> SecretRegistry<C> {
    pub fn new(clock: C) -> Self {
        Self::with_ttl(clock, DEFAULT_TTL)
    }

    pub fn with_ttl(clock: C, ttl: Duration) -> Self {
        Self { providers: HashMap::new(), cache: TtlCache::new(clock, ttl) }
    }

    pub fn register(
        &mut self,
        provider: Arc<dyn SecretProvider>,
    ) -> Result<(), SecretRegistryError> {
        let name = provider.name().to_string();
        if self.providers.contains_key(&name) {
            return Err(SecretRegistryError::DuplicateProvider(name));
        }
        self.providers.insert(name, provider);
        Ok(())
    }

    /// Resolve one secret reference, serving from cache when possible.
    pub async fn resolve(&self, secret_ref: &SecretRef) -> Result<Value, SecretRegistryError> {
        let key = secret_ref.dedup_key();
        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached);
        }

        let provider = self
            .providers
            .get(&secret_ref.provider)
            .ok_or_else(|| SecretRegistryError::UnknownProvider(secret_ref.provider.clone()))?;

        let payload =
            provider.get(&secret_ref.reference, secret_ref.version.as_deref()).await?;
        let value = match &secret_ref.field {
            Some(field) => payload
                .get(field)
                .cloned()
                .ok_or_else(|| SecretRegistryError::MissingField {
                    provider: secret_ref.provider.clone(),
                    field: field.clone(),
                })?,
            None => payload,
        };

        self.cache.insert(key, value.clone());
        Ok(value)
    }

    /// Resolve several secret references, deduplicating identical lookups
    /// (same provider/ref/version/field) to a single provider call.
    pub async fn resolve_many(
        &self,
        secret_refs: &[SecretRef],
    ) -> Result<HashMap<DedupKey, Value>, SecretRegistryError> {
        let mut results = HashMap::new();
        for secret_ref in secret_refs {
            let key = secret_ref.dedup_key();
            if results.contains_key(&key) {
                continue;
            }
            let value = self.resolve(secret_ref).await?;
            results.insert(key, value);
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use outpost_core::FakeClock;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProvider {
        name: String,
        calls: AtomicUsize,
        payload: Value,
    }

    #[async_trait]
    impl SecretProvider for CountingProvider {
        fn name(&self) -> &str {
            &self.name
        }

        async fn get(
            &self,
            _reference: &str,
            _version: Option<&str>,
        ) -> Result<Value, SecretProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.payload.clone())
        }
    }

    fn secret_ref(field: Option<&str>) -> SecretRef {
        SecretRef {
            provider: "env".into(),
            reference: "TOKEN".into(),
            version: None,
            field: field.map(String::from),
        }
    }

    #[tokio::test]
    async fn register_rejects_duplicate_provider_name() {
        let clock = FakeClock::new();
        let mut registry = SecretRegistry::new(clock);
        let provider = Arc::new(CountingProvider {
            name: "env".into(),
            calls: AtomicUsize::new(0),
            payload: json!("x"),
        });
        registry.register(provider.clone()).unwrap();
        let err = registry.register(provider).unwrap_err();
        assert!(matches!(err, SecretRegistryError::DuplicateProvider(n) if n == "env"));
    }

    #[tokio::test]
    async fn resolve_extracts_field_from_structured_payload() {
        let clock = FakeClock::new();
        let mut registry = SecretRegistry::new(clock);
        registry
            .register(Arc::new(CountingProvider {
                name: "env".into(),
                calls: AtomicUsize::new(0),
                payload: json!({"password": "hunter2"}),
            }))
            .unwrap();

        let value = registry.resolve(&secret_ref(Some("password"))).await.unwrap();
        assert_eq!(value, json!("hunter2"));
    }

    #[tokio::test]
    async fn resolve_caches_repeat_lookups() {
        let clock = FakeClock::new();
        let mut registry = SecretRegistry::new(clock);
        let provider = Arc::new(CountingProvider {
            name: "env".into(),
            calls: AtomicUsize::new(0),
            payload: json!("secret-value"),
        });
        registry.register(provider.clone()).unwrap();

        registry.resolve(&secret_ref(None)).await.unwrap();
        registry.resolve(&secret_ref(None)).await.unwrap();
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn resolve_many_dedupes_identical_references() {
        let clock = FakeClock::new();
        let mut registry = SecretRegistry::new(clock);
        let provider = Arc::new(CountingProvider {
            name: "env".into(),
            calls: AtomicUsize::new(0),
            payload: json!("v"),
        });
        registry.register(provider.clone()).unwrap();

        let refs = vec![secret_ref(None), secret_ref(None)];
        let results = registry.resolve_many(&refs).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn resolve_errors_on_unknown_provider() {
        let clock = FakeClock::new();
        let registry = SecretRegistry::new(clock);
        let err = registry.resolve(&secret_ref(None)).await.unwrap_err();
        assert!(matches!(err, SecretRegistryError::UnknownProvider(n) if n == "env"));
    }

    #[tokio::test]
    async fn resolve_errors_on_missing_field() {
        let clock = FakeClock::new();
        let mut registry = SecretRegistry::new(clock);
        registry
            .register(Arc::new(CountingProvider {
                name: "env".into(),
                calls: AtomicUsize::new(0),
                payload: json!({"username": "alice"}),
            }))
            .unwrap();

        let err = registry.resolve(&secret_ref(Some("password"))).await.unwrap_err();
        assert!(matches!(err, SecretRegistryError::MissingField { .. }));
    }
}
