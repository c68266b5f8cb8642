// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runs a validated plan's DAG against resolved headers/bodies and a target
//! config, producing one [`NodeResult`] per node in topological order.
//!
//! Structured like `oj_engine::executor::Executor`: a public `execute`
//! wraps a private `execute_inner` with a tracing span and elapsed-time
//! logging, generic over the adapters/clock it needs rather than trait
//! objects baked in.

use crate::assert::{evaluate, resolve_path};
use crate::error::EngineError;
use crate::events::{EngineEvent, EventEmitter};
use crate::http_client::{HttpClientAdapter, HttpClientError, HttpRequestSpec};
use crate::topo::topological_order;
use outpost_core::{Clock, MarkerValue, Node, NodeResult, NodeResultStatus, Plan, RunId, TargetConfig};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::Instrument;

const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

pub struct PlanExecutor<H, C, E>
where
    H: HttpClientAdapter,
    C: Clock,
    E: EventEmitter,
{
    http_client: H,
    clock: C,
    emitter: E,
}

impl<H, C, E> PlanExecutor<H, C, E>
where
    H: HttpClientAdapter,
    C: Clock,
    E: EventEmitter,
{
    pub fn new(http_client: H, clock: C, emitter: E) -> Self {
        Self { http_client, clock, emitter }
    }

    pub async fn execute(
        &self,
        plan: &Plan,
        run_id: &RunId,
        resolved_headers: &HashMap<String, HashMap<String, String>>,
        resolved_bodies: &HashMap<String, Value>,
        target_config: &TargetConfig,
    ) -> Result<Vec<NodeResult>, EngineError> {
        let span = tracing::info_span!("plan.execute", %run_id, plan = %plan.name);
        async {
            let start = std::time::Instant::now();
            let result = self
                .execute_inner(plan, run_id, resolved_headers, resolved_bodies, target_config)
                .await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(results) => {
                    tracing::info!(nodes = results.len(), elapsed_ms, "plan execution finished")
                }
                Err(e) => tracing::error!(error = %e, elapsed_ms, "plan execution failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn execute_inner(
        &self,
        plan: &Plan,
        run_id: &RunId,
        resolved_headers: &HashMap<String, HashMap<String, String>>,
        resolved_bodies: &HashMap<String, Value>,
        target_config: &TargetConfig,
    ) -> Result<Vec<NodeResult>, EngineError> {
        self.emitter
            .emit(EngineEvent::RunStarted {
                run_id: run_id.clone(),
                plan_id: plan.id.clone().unwrap_or_default(),
            })
            .await;

        let order = topological_order(plan)?;
        let nodes_by_id: HashMap<&str, &Node> =
            plan.nodes.iter().map(|n| (n.id(), n)).collect();

        let mut node_responses: HashMap<String, Value> = HashMap::new();
        let mut results = Vec::with_capacity(order.len());

        for node_id in &order {
            let node = nodes_by_id.get(node_id.as_str()).expect("topo order only lists known ids");

            self.emitter
                .emit(EngineEvent::NodeStarted { run_id: run_id.clone(), node_id: node_id.clone() })
                .await;

            let result = match node {
                Node::HttpRequest { id, method, base, path, response_format, .. } => {
                    self.execute_http_node(
                        id,
                        *method,
                        base,
                        path,
                        *response_format,
                        resolved_headers.get(id),
                        resolved_bodies.get(id),
                        target_config,
                        &mut node_responses,
                    )
                    .await?
                }
                Node::Wait { id, duration_ms } => {
                    let started_at_ms = self.clock.epoch_ms();
                    tokio::time::sleep(Duration::from_millis(*duration_ms)).await;
                    NodeResult {
                        node_id: id.clone(),
                        status: NodeResultStatus::Passed,
                        started_at_ms,
                        completed_at_ms: self.clock.epoch_ms(),
                        status_code: None,
                        response_body: None,
                        error: None,
                    }
                }
                Node::Assertion { id, assertions } => {
                    let started_at_ms = self.clock.epoch_ms();
                    let mut failures = Vec::new();
                    for assertion in assertions {
                        let value = resolve_path(&node_responses, &assertion.path);
                        if !evaluate(&assertion.predicate, value) {
                            failures.push(format!("{}: predicate failed", assertion.path.join(".")));
                        }
                    }
                    NodeResult {
                        node_id: id.clone(),
                        status: if failures.is_empty() {
                            NodeResultStatus::Passed
                        } else {
                            NodeResultStatus::Failed
                        },
                        started_at_ms,
                        completed_at_ms: self.clock.epoch_ms(),
                        status_code: None,
                        response_body: None,
                        error: if failures.is_empty() { None } else { Some(failures.join("; ")) },
                    }
                }
            };

            self.emitter
                .emit(EngineEvent::NodeCompleted {
                    run_id: run_id.clone(),
                    node_id: node_id.clone(),
                    status: result.status,
                })
                .await;
            results.push(result);
        }

        Ok(results)
    }

    #[allow(clippy::too_many_arguments)]
    async fn execute_http_node(
        &self,
        id: &str,
        method: outpost_core::HttpMethod,
        base: &Value,
        path: &str,
        response_format: outpost_core::ResponseFormat,
        headers: Option<&HashMap<String, String>>,
        body: Option<&Value>,
        target_config: &TargetConfig,
        node_responses: &mut HashMap<String, Value>,
    ) -> Result<NodeResult, EngineError> {
        let started_at_ms = self.clock.epoch_ms();

        let (base_url, mut merged_headers) = match self.resolve_base(id, base, target_config)? {
            (url, extra_headers) => (url, extra_headers),
        };
        if let Some(headers) = headers {
            merged_headers.extend(headers.clone());
        }

        let url = format!("{}{}", base_url.trim_end_matches('/'), path);
        let request = HttpRequestSpec {
            method: method.to_string(),
            url,
            headers: merged_headers,
            body: body.cloned(),
            timeout: DEFAULT_HTTP_TIMEOUT,
        };

        match self.http_client.send(request).await {
            Ok(response) => {
                let parsed = parse_response_body(&response.body, response_format);
                node_responses.insert(id.to_string(), parsed.clone());
                Ok(NodeResult {
                    node_id: id.to_string(),
                    status: NodeResultStatus::Passed,
                    started_at_ms,
                    completed_at_ms: self.clock.epoch_ms(),
                    status_code: Some(response.status),
                    response_body: Some(parsed),
                    error: None,
                })
            }
            Err(e) => Ok(NodeResult {
                node_id: id.to_string(),
                status: NodeResultStatus::Failed,
                started_at_ms,
                completed_at_ms: self.clock.epoch_ms(),
                status_code: None,
                response_body: None,
                error: Some(match &e {
                    HttpClientError::Timeout(d) => format!("request timed out after {d:?}"),
                    HttpClientError::Transport(msg) => msg.clone(),
                }),
            }),
        }
    }

    fn resolve_base(
        &self,
        node_id: &str,
        base: &Value,
        target_config: &TargetConfig,
    ) -> Result<(String, HashMap<String, String>), EngineError> {
        match MarkerValue::classify(base) {
            Ok(MarkerValue::Literal(Value::String(s))) => Ok((s, HashMap::new())),
            Ok(MarkerValue::Variable(var_ref)) => {
                let entry = target_config
                    .resolve(&var_ref.key)
                    .ok_or_else(|| EngineError::UnresolvedVariable(var_ref.key.clone()))?;
                Ok((var_ref.splice(&entry.base_url), entry.headers.clone()))
            }
            Ok(_) => Err(EngineError::MalformedBase(
                node_id.to_string(),
                "base must be a literal string or $variable marker".to_string(),
            )),
            Err(e) => Err(EngineError::MalformedBase(node_id.to_string(), e.to_string())),
        }
    }
}

fn parse_response_body(body: &str, format: outpost_core::ResponseFormat) -> Value {
    match format {
        outpost_core::ResponseFormat::Json => {
            serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
        }
        outpost_core::ResponseFormat::Xml | outpost_core::ResponseFormat::Text => {
            serde_json::json!({ "text": body })
        }
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
