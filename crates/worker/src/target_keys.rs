// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Finds which target keys a plan actually needs before fetching any of
//! them, the same up-front shape `outpost_secrets::resolve` uses for
//! `$secret` markers — except here the source of truth is one `$variable`
//! marker per `HTTP_REQUEST` node's `base`, not an arbitrary subtree.

use outpost_core::{MarkerValue, Node, Plan};
use std::collections::BTreeSet;

/// Distinct `$variable` keys referenced by any node's `base` field, in a
/// stable order so callers get deterministic fetch ordering.
pub fn collect_variable_keys(plan: &Plan) -> BTreeSet<String> {
    let mut keys = BTreeSet::new();
    for node in &plan.nodes {
        if let Node::HttpRequest { base, .. } = node {
            if let Ok(MarkerValue::Variable(var_ref)) = MarkerValue::classify(base) {
                keys.insert(var_ref.key);
            }
        }
    }
    keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use outpost_core::{HttpMethod, ResponseFormat};
    use serde_json::json;
    use std::collections::HashMap;

    fn http_node(id: &str, base: serde_json::Value) -> Node {
        Node::HttpRequest {
            id: id.into(),
            method: HttpMethod::Get,
            base,
            path: "/health".into(),
            headers: HashMap::new(),
            body: None,
            response_format: ResponseFormat::Json,
        }
    }

    fn plan(nodes: Vec<Node>) -> Plan {
        Plan {
            id: None,
            organization: "acme".into(),
            project: "checkout".into(),
            environment: "prod".into(),
            name: "webhook-check".into(),
            version: "1.0".into(),
            frequency: None,
            locations: vec![],
            nodes,
            edges: vec![],
        }
    }

    #[test]
    fn ignores_literal_bases() {
        let p = plan(vec![http_node("n1", json!("https://example.com"))]);
        assert!(collect_variable_keys(&p).is_empty());
    }

    #[test]
    fn collects_variable_marker_keys() {
        let p = plan(vec![
            http_node("n1", json!({"$variable": {"key": "api-service"}})),
            http_node("n2", json!({"$variable": {"key": "billing-service"}})),
        ]);
        let keys = collect_variable_keys(&p);
        assert_eq!(keys.len(), 2);
        assert!(keys.contains("api-service"));
        assert!(keys.contains("billing-service"));
    }

    #[test]
    fn dedupes_repeated_keys_across_nodes() {
        let p = plan(vec![
            http_node("n1", json!({"$variable": {"key": "api-service"}})),
            http_node("n2", json!({"$variable": {"key": "api-service"}})),
        ]);
        assert_eq!(collect_variable_keys(&p).len(), 1);
    }
}
