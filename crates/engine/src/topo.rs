// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Topological ordering of a plan's DAG. `Plan::validate` already rejects
//! cycles; this assumes a validated plan and only has to pick a
//! deterministic order among the remaining freedom, breaking ties by edge
//! insertion order the way the teacher's action tracker preserves
//! declaration order rather than introducing an arbitrary second sort key.

use outpost_core::{Node, Plan, END, START};
use std::collections::{HashMap, VecDeque};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TopoError {
    #[error("plan graph contains a cycle")]
    Cycle,
}

/// Returns node ids (excluding the `__START__`/`__END__` sentinels) in an
/// order where every node appears after all of its predecessors.
pub fn topological_order(plan: &Plan) -> Result<Vec<String>, TopoError> {
    let mut in_degree: HashMap<&str, usize> = HashMap::new();
    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut all_nodes: Vec<&str> = vec![START];
    all_nodes.extend(plan.nodes.iter().map(Node::id));
    all_nodes.push(END);

    for &id in &all_nodes {
        in_degree.entry(id).or_insert(0);
    }
    for edge in &plan.edges {
        adjacency.entry(edge.from.as_str()).or_default().push(edge.to.as_str());
        *in_degree.entry(edge.to.as_str()).or_insert(0) += 1;
    }

    // Kahn's algorithm; queue is a VecDeque so ties resolve in edge
    // insertion order (FIFO) rather than reversed or arbitrary.
    let mut queue: VecDeque<&str> = VecDeque::new();
    queue.push_back(START);

    let mut order = Vec::with_capacity(all_nodes.len());
    let mut visited = 0usize;

    while let Some(node) = queue.pop_front() {
        visited += 1;
        if node != START && node != END {
            order.push(node.to_string());
        }
        if let Some(next) = adjacency.get(node) {
            for &n in next {
                let degree = in_degree.get_mut(n).expect("edge endpoint was registered");
                *degree -= 1;
                if *degree == 0 {
                    queue.push_back(n);
                }
            }
        }
    }

    if visited != all_nodes.len() {
        return Err(TopoError::Cycle);
    }
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use outpost_core::{Edge, Frequency, FrequencyUnit, HttpMethod, ResponseFormat};
    use serde_json::json;
    use std::collections::HashMap as StdHashMap;

    fn http_node(id: &str) -> Node {
        Node::HttpRequest {
            id: id.to_string(),
            method: HttpMethod::Get,
            base: json!("https://example.com"),
            path: "/".into(),
            headers: StdHashMap::new(),
            body: None,
            response_format: ResponseFormat::Json,
        }
    }

    fn plan(nodes: Vec<Node>, edges: Vec<Edge>) -> Plan {
        Plan {
            id: None,
            organization: "acme".into(),
            project: "p".into(),
            environment: "prod".into(),
            name: "n".into(),
            version: "1.0".into(),
            frequency: Some(Frequency { every: 1, unit: FrequencyUnit::Minute }),
            locations: vec![],
            nodes,
            edges,
        }
    }

    #[test]
    fn topological_order_respects_a_diamond_shaped_dag() {
        let p = plan(
            vec![http_node("a"), http_node("b"), http_node("c"), http_node("d")],
            vec![
                Edge { from: START.into(), to: "a".into() },
                Edge { from: "a".into(), to: "b".into() },
                Edge { from: "a".into(), to: "c".into() },
                Edge { from: "b".into(), to: "d".into() },
                Edge { from: "c".into(), to: "d".into() },
                Edge { from: "d".into(), to: END.into() },
            ],
        );
        let order = topological_order(&p).unwrap();
        assert_eq!(order[0], "a");
        assert_eq!(order[3], "d");
        assert!(order.iter().position(|n| n == "b").unwrap() < order.iter().position(|n| n == "d").unwrap());
        assert!(order.iter().position(|n| n == "c").unwrap() < order.iter().position(|n| n == "d").unwrap());
    }

    #[test]
    fn topological_order_breaks_ties_by_edge_insertion_order() {
        let p = plan(
            vec![http_node("a"), http_node("b")],
            vec![
                Edge { from: START.into(), to: "b".into() },
                Edge { from: START.into(), to: "a".into() },
                Edge { from: "a".into(), to: END.into() },
                Edge { from: "b".into(), to: END.into() },
            ],
        );
        let order = topological_order(&p).unwrap();
        assert_eq!(order, vec!["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn topological_order_detects_cycles() {
        let p = plan(
            vec![http_node("a"), http_node("b")],
            vec![
                Edge { from: START.into(), to: "a".into() },
                Edge { from: "a".into(), to: "b".into() },
                Edge { from: "b".into(), to: "a".into() },
                Edge { from: "b".into(), to: END.into() },
            ],
        );
        assert_eq!(topological_order(&p).unwrap_err(), TopoError::Cycle);
    }

    #[test]
    fn topological_order_handles_empty_plan() {
        let p = plan(vec![], vec![Edge { from: START.into(), to: END.into() }]);
        assert_eq!(topological_order(&p).unwrap(), Vec::<String>::new());
    }
}
