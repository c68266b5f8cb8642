// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Assertion evaluation: resolve an `AssertionSpec`'s path against earlier
//! nodes' recorded responses, then test it with the predicate.

use outpost_core::{Predicate, PredicateKind};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;

/// `path[0]` names the node whose response this reads; the remaining
/// segments index into that response's JSON value (object keys, or decimal
/// array indices).
pub fn resolve_path<'a>(
    node_responses: &'a HashMap<String, Value>,
    path: &[String],
) -> Option<&'a Value> {
    let (node_id, rest) = path.split_first()?;
    let mut current = node_responses.get(node_id)?;
    for segment in rest {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

fn is_empty(value: Option<&Value>) -> bool {
    match value {
        None => true,
        Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(a)) => a.is_empty(),
        Some(Value::Object(o)) => o.is_empty(),
        Some(_) => false,
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    value.as_f64()
}

fn as_str(value: &Value) -> Option<&str> {
    value.as_str()
}

fn contains(value: Option<&Value>, expected: Option<&Value>) -> bool {
    match (value, expected) {
        (Some(Value::String(s)), Some(Value::String(needle))) => s.contains(needle.as_str()),
        (Some(Value::Array(items)), Some(expected)) => items.contains(expected),
        _ => false,
    }
}

/// Evaluate `predicate` against the resolved value, returning `true` when
/// the assertion passes.
pub fn evaluate(predicate: &Predicate, value: Option<&Value>) -> bool {
    match predicate.kind {
        PredicateKind::IsNull => matches!(value, None | Some(Value::Null)),
        PredicateKind::IsNotNull => !matches!(value, None | Some(Value::Null)),
        PredicateKind::IsTrue => matches!(value, Some(Value::Bool(true))),
        PredicateKind::IsFalse => matches!(value, Some(Value::Bool(false))),
        PredicateKind::IsEmpty => is_empty(value),
        PredicateKind::IsNotEmpty => !is_empty(value),
        PredicateKind::Eq => value == predicate.expected.as_ref(),
        PredicateKind::Ne => value != predicate.expected.as_ref(),
        PredicateKind::Gt | PredicateKind::Lt | PredicateKind::Ge | PredicateKind::Le => {
            let (Some(actual), Some(expected)) = (value, predicate.expected.as_ref()) else {
                return false;
            };
            let (Some(a), Some(b)) = (as_f64(actual), as_f64(expected)) else {
                return false;
            };
            match a.partial_cmp(&b) {
                Some(Ordering::Greater) => {
                    matches!(predicate.kind, PredicateKind::Gt | PredicateKind::Ge)
                }
                Some(Ordering::Less) => {
                    matches!(predicate.kind, PredicateKind::Lt | PredicateKind::Le)
                }
                Some(Ordering::Equal) => {
                    matches!(predicate.kind, PredicateKind::Ge | PredicateKind::Le)
                }
                None => false,
            }
        }
        PredicateKind::Contains => contains(value, predicate.expected.as_ref()),
        PredicateKind::NotContains => !contains(value, predicate.expected.as_ref()),
        PredicateKind::StartsWith => {
            let (Some(actual), Some(expected)) = (value, predicate.expected.as_ref()) else {
                return false;
            };
            matches!((as_str(actual), as_str(expected)), (Some(a), Some(b)) if a.starts_with(b))
        }
        PredicateKind::EndsWith => {
            let (Some(actual), Some(expected)) = (value, predicate.expected.as_ref()) else {
                return false;
            };
            matches!((as_str(actual), as_str(expected)), (Some(a), Some(b)) if a.ends_with(b))
        }
    }
}
