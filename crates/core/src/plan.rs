// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The plan document model (spec §3, §4.A).
//!
//! A [`Plan`] is pure data plus a [`validate`](Plan::validate) function; it
//! has no side effects of its own. Schema version is pinned at `"1.0"` the
//! way `oj_core::job::JobConfig` pins a small literal set of known fields
//! rather than an open-ended schema.

use crate::marker::MarkerValue;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

pub const SCHEMA_VERSION: &str = "1.0";
pub const START: &str = "__START__";
pub const END: &str = "__END__";

crate::define_id! {
    /// Server-assigned, immutable plan identifier.
    pub struct PlanId("pln-");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
    Connect,
    Trace,
}

crate::simple_display! {
    HttpMethod {
        Get => "GET",
        Post => "POST",
        Put => "PUT",
        Delete => "DELETE",
        Patch => "PATCH",
        Head => "HEAD",
        Options => "OPTIONS",
        Connect => "CONNECT",
        Trace => "TRACE",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResponseFormat {
    Json,
    Xml,
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FrequencyUnit {
    Minute,
    Hour,
    Day,
}

impl FrequencyUnit {
    pub fn as_duration(&self, every: u32) -> std::time::Duration {
        let secs = match self {
            FrequencyUnit::Minute => 60,
            FrequencyUnit::Hour => 3_600,
            FrequencyUnit::Day => 86_400,
        };
        std::time::Duration::from_secs(secs * every as u64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frequency {
    pub every: u32,
    pub unit: FrequencyUnit,
}

/// A header value is either a literal string or a `$secret` marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HeaderValue {
    Secret {
        #[serde(rename = "$secret")]
        secret: crate::marker::SecretRef,
    },
    Literal(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PredicateKind {
    IsNull,
    IsNotNull,
    IsTrue,
    IsFalse,
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
    IsEmpty,
    IsNotEmpty,
}

impl PredicateKind {
    /// Whether this predicate compares against an `expected` operand.
    ///
    /// Spec §3 groups `IS_EMPTY`/`IS_NOT_EMPTY` with the binary predicates,
    /// but neither takes an operand in practice — they test the resolved
    /// value itself. Only the comparison predicates need `expected`.
    pub fn requires_expected(&self) -> bool {
        matches!(
            self,
            PredicateKind::Eq
                | PredicateKind::Ne
                | PredicateKind::Gt
                | PredicateKind::Lt
                | PredicateKind::Ge
                | PredicateKind::Le
                | PredicateKind::Contains
                | PredicateKind::NotContains
                | PredicateKind::StartsWith
                | PredicateKind::EndsWith
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    #[serde(rename = "type")]
    pub kind: PredicateKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<Value>,
}

/// One assertion: a path into an earlier node's response, evaluated with `predicate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssertionSpec {
    /// Rooted at `{node_id}.{segment...}` — the first segment names the
    /// HTTP_REQUEST node whose response this assertion reads.
    pub path: Vec<String>,
    pub predicate: Predicate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Node {
    #[serde(rename = "HTTP_REQUEST")]
    HttpRequest {
        id: String,
        method: HttpMethod,
        /// Either a literal base URL or a `{"$variable": {...}}` marker,
        /// resolved by the target resolver before the request is sent.
        base: Value,
        path: String,
        #[serde(default)]
        headers: HashMap<String, HeaderValue>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        body: Option<Value>,
        response_format: ResponseFormat,
    },
    #[serde(rename = "WAIT")]
    Wait { id: String, duration_ms: u64 },
    #[serde(rename = "ASSERTION")]
    Assertion { id: String, assertions: Vec<AssertionSpec> },
}

impl Node {
    pub fn id(&self) -> &str {
        match self {
            Node::HttpRequest { id, .. } => id,
            Node::Wait { id, .. } => id,
            Node::Assertion { id, .. } => id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<PlanId>,
    pub organization: String,
    pub project: String,
    pub environment: String,
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<Frequency>,
    #[serde(default)]
    pub locations: Vec<String>,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    UnknownVersion(String),
    DuplicateNodeId(String),
    ReservedNodeId(String),
    DanglingEdgeEndpoint(String),
    Cycle,
    Unreachable(String),
    NoPathToEnd(String),
    InvalidFrequency,
    MalformedMarker(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::UnknownVersion(v) => write!(f, "unknown plan version: {v}"),
            ValidationError::DuplicateNodeId(id) => write!(f, "duplicate node id: {id}"),
            ValidationError::ReservedNodeId(id) => write!(f, "node id is reserved: {id}"),
            ValidationError::DanglingEdgeEndpoint(id) => {
                write!(f, "edge references unknown node: {id}")
            }
            ValidationError::Cycle => write!(f, "plan graph contains a cycle"),
            ValidationError::Unreachable(id) => {
                write!(f, "node not reachable from {START}: {id}")
            }
            ValidationError::NoPathToEnd(id) => write!(f, "no path from {id} to {END}"),
            ValidationError::InvalidFrequency => {
                write!(f, "frequency.every must be a positive integer")
            }
            ValidationError::MalformedMarker(msg) => write!(f, "malformed marker: {msg}"),
        }
    }
}

impl Plan {
    /// Validate schema shape, graph reachability, node id uniqueness,
    /// edge-endpoint existence, and marker well-formedness (spec §4.A).
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.version != SCHEMA_VERSION {
            errors.push(ValidationError::UnknownVersion(self.version.clone()));
        }

        if let Some(freq) = &self.frequency {
            if freq.every == 0 {
                errors.push(ValidationError::InvalidFrequency);
            }
        }

        let mut seen_ids: HashSet<&str> = HashSet::new();
        for node in &self.nodes {
            let id = node.id();
            if id == START || id == END {
                errors.push(ValidationError::ReservedNodeId(id.to_string()));
            }
            if !seen_ids.insert(id) {
                errors.push(ValidationError::DuplicateNodeId(id.to_string()));
            }
        }

        let known: HashSet<&str> = seen_ids
            .iter()
            .copied()
            .chain([START, END])
            .collect();
        for edge in &self.edges {
            if !known.contains(edge.from.as_str()) {
                errors.push(ValidationError::DanglingEdgeEndpoint(edge.from.clone()));
            }
            if !known.contains(edge.to.as_str()) {
                errors.push(ValidationError::DanglingEdgeEndpoint(edge.to.clone()));
            }
        }

        self.check_markers(&mut errors);

        // Graph-shape checks only make sense once ids/edges are well-formed.
        if errors.is_empty() {
            self.check_graph_shape(&mut errors);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn check_markers(&self, errors: &mut Vec<ValidationError>) {
        for node in &self.nodes {
            if let Node::HttpRequest { base, body, .. } = node {
                if let Err(e) = MarkerValue::classify(base) {
                    errors.push(ValidationError::MalformedMarker(e.to_string()));
                }
                if let Some(body) = body {
                    walk_and_check(body, errors);
                }
            }
        }
    }

    fn check_graph_shape(&self, errors: &mut Vec<ValidationError>) {
        let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
        for edge in &self.edges {
            adjacency.entry(&edge.from).or_default().push(&edge.to);
        }

        // Cycle detection via DFS with a recursion-stack marker.
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            InProgress,
            Done,
        }
        let mut marks: HashMap<&str, Mark> = HashMap::new();
        let mut has_cycle = false;
        fn visit<'a>(
            node: &'a str,
            adjacency: &HashMap<&'a str, Vec<&'a str>>,
            marks: &mut HashMap<&'a str, Mark>,
            has_cycle: &mut bool,
        ) {
            if *has_cycle {
                return;
            }
            match marks.get(node) {
                Some(Mark::InProgress) => {
                    *has_cycle = true;
                    return;
                }
                Some(Mark::Done) => return,
                None => {}
            }
            marks.insert(node, Mark::InProgress);
            if let Some(next) = adjacency.get(node) {
                for &n in next {
                    visit(n, adjacency, marks, has_cycle);
                }
            }
            marks.insert(node, Mark::Done);
        }
        visit(START, &adjacency, &mut marks, &mut has_cycle);
        if has_cycle {
            errors.push(ValidationError::Cycle);
            return;
        }

        // Reachability from __START__.
        let mut reachable: HashSet<&str> = HashSet::new();
        let mut stack = vec![START];
        while let Some(n) = stack.pop() {
            if reachable.insert(n) {
                if let Some(next) = adjacency.get(n) {
                    stack.extend(next.iter().copied());
                }
            }
        }
        for node in &self.nodes {
            if !reachable.contains(node.id()) {
                errors.push(ValidationError::Unreachable(node.id().to_string()));
            }
        }

        // Every node has a path to __END__: reverse reachability from END.
        let mut reverse: HashMap<&str, Vec<&str>> = HashMap::new();
        for edge in &self.edges {
            reverse.entry(&edge.to).or_default().push(&edge.from);
        }
        let mut can_reach_end: HashSet<&str> = HashSet::new();
        let mut stack = vec![END];
        while let Some(n) = stack.pop() {
            if can_reach_end.insert(n) {
                if let Some(prev) = reverse.get(n) {
                    stack.extend(prev.iter().copied());
                }
            }
        }
        for node in &self.nodes {
            if !can_reach_end.contains(node.id()) {
                errors.push(ValidationError::NoPathToEnd(node.id().to_string()));
            }
        }
    }
}

fn walk_and_check(value: &Value, errors: &mut Vec<ValidationError>) {
    match MarkerValue::classify(value) {
        Ok(MarkerValue::Literal(Value::Object(map))) => {
            for v in map.values() {
                walk_and_check(v, errors);
            }
        }
        Ok(MarkerValue::Literal(Value::Array(items))) => {
            for v in items {
                walk_and_check(v, errors);
            }
        }
        Ok(_) => {}
        Err(e) => errors.push(ValidationError::MalformedMarker(e.to_string())),
    }
}

#[cfg(test)]
#[path = "plan_tests.rs"]
mod tests;
