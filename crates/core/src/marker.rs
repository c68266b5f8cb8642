// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Secret and variable markers embedded in plan headers/bodies (spec §3, §6).
//!
//! A marker is a sealed variant over `secret | variable | literal` so the
//! substitution traversals in `outpost-secrets` and `outpost-engine` are
//! total pattern matches rather than ad-hoc structural peeking at
//! `serde_json::Value` (spec §9 "Dynamic tagged content").

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `{"$secret": {"provider", "ref", "version"?, "field"?}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretRef {
    pub provider: String,
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl SecretRef {
    /// Dedup/cache key: a secret is the same lookup iff all four fields match.
    pub fn dedup_key(&self) -> (String, String, Option<String>, Option<String>) {
        (
            self.provider.clone(),
            self.reference.clone(),
            self.version.clone(),
            self.field.clone(),
        )
    }
}

/// `{"$variable": {"key", "template"?}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableRef {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
}

impl VariableRef {
    /// Splice a resolved target value into `template` at the `${key}`
    /// placeholder, or return the value unchanged when there is no template.
    pub fn splice(&self, resolved_value: &str) -> String {
        match &self.template {
            Some(template) => template.replace(&format!("${{{}}}", self.key), resolved_value),
            None => resolved_value.to_string(),
        }
    }
}

/// A JSON subtree position that is either a secret marker, a variable
/// marker, or ordinary literal JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkerValue {
    Secret(SecretRef),
    Variable(VariableRef),
    Literal(Value),
}

impl MarkerValue {
    /// Classify a `serde_json::Value`, recognizing `$secret`/`$variable`
    /// wrapper objects and treating everything else as a literal.
    pub fn classify(value: &Value) -> Result<MarkerValue, MarkerError> {
        if let Value::Object(map) = value {
            if let Some(inner) = map.get("$secret") {
                let secret: SecretRef = serde_json::from_value(inner.clone())
                    .map_err(|e| MarkerError::Malformed(format!("$secret: {e}")))?;
                return Ok(MarkerValue::Secret(secret));
            }
            if let Some(inner) = map.get("$variable") {
                let variable: VariableRef = serde_json::from_value(inner.clone())
                    .map_err(|e| MarkerError::Malformed(format!("$variable: {e}")))?;
                return Ok(MarkerValue::Variable(variable));
            }
        }
        Ok(MarkerValue::Literal(value.clone()))
    }

    pub fn is_marker(&self) -> bool {
        !matches!(self, MarkerValue::Literal(_))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MarkerError {
    #[error("malformed marker: {0}")]
    Malformed(String),
}
