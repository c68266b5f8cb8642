// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deep secret substitution over a plan's headers and bodies.
//!
//! `$variable` markers are left untouched here — those are the execution
//! engine's job once a target location is known. This only ever replaces
//! `$secret` markers with resolved literal JSON.

use crate::registry::{SecretRegistry, SecretRegistryError};
use outpost_core::{Clock, HeaderValue, MarkerValue, Node, Plan};
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

/// Recursively resolve every `$secret` marker found in `value`, returning an
/// equivalent tree with secrets spliced in as literals. Hand-boxed rather
/// than `#[async_recursion]` since this is the only recursive async call in
/// the crate.
pub fn resolve_secrets_in_value<'a, C: Clock + 'static>(
    value: &'a Value,
    registry: &'a SecretRegistry<C>,
) -> Pin<Box<dyn Future<Output = Result<Value, SecretRegistryError>> + Send + 'a>> {
    Box::pin(async move {
        match MarkerValue::classify(value) {
            Ok(MarkerValue::Secret(secret_ref)) => registry.resolve(&secret_ref).await,
            Ok(MarkerValue::Variable(_)) => Ok(value.clone()),
            Ok(MarkerValue::Literal(Value::Object(map))) => {
                let mut resolved = serde_json::Map::with_capacity(map.len());
                for (k, v) in map {
                    let r = resolve_secrets_in_value(&v, registry).await?;
                    resolved.insert(k, r);
                }
                Ok(Value::Object(resolved))
            }
            Ok(MarkerValue::Literal(Value::Array(items))) => {
                let mut resolved = Vec::with_capacity(items.len());
                for item in items {
                    resolved.push(resolve_secrets_in_value(&item, registry).await?);
                }
                Ok(Value::Array(resolved))
            }
            Ok(MarkerValue::Literal(other)) => Ok(other),
            Err(e) => Err(SecretRegistryError::Provider(
                crate::provider::SecretProviderError::Malformed(e.to_string()),
            )),
        }
    })
}

async fn resolve_header_value<C: Clock + 'static>(
    header: &HeaderValue,
    registry: &SecretRegistry<C>,
) -> Result<String, SecretRegistryError> {
    match header {
        HeaderValue::Literal(s) => Ok(s.clone()),
        HeaderValue::Secret { secret } => {
            let resolved = registry.resolve(secret).await?;
            Ok(resolved.as_str().map(str::to_string).unwrap_or_else(|| resolved.to_string()))
        }
    }
}

/// Resolve every `$secret` marker in every `HTTP_REQUEST` node's headers and
/// body, returning the flattened `(node_id, header_name) -> value` map and
/// `(node_id) -> resolved body` map the engine dispatches with.
pub struct ResolvedSecrets {
    pub headers: HashMap<String, HashMap<String, String>>,
    pub bodies: HashMap<String, Value>,
}

pub async fn resolve_secrets_in_plan<C: Clock + 'static>(
    plan: &Plan,
    registry: &SecretRegistry<C>,
) -> Result<ResolvedSecrets, SecretRegistryError> {
    let mut headers = HashMap::new();
    let mut bodies = HashMap::new();

    for node in &plan.nodes {
        if let Node::HttpRequest { id, headers: node_headers, body, .. } = node {
            let mut resolved_headers = HashMap::with_capacity(node_headers.len());
            for (name, value) in node_headers {
                resolved_headers.insert(name.clone(), resolve_header_value(value, registry).await?);
            }
            headers.insert(id.clone(), resolved_headers);

            if let Some(body) = body {
                bodies.insert(id.clone(), resolve_secrets_in_value(body, registry).await?);
            }
        }
    }

    Ok(ResolvedSecrets { headers, bodies })
}
