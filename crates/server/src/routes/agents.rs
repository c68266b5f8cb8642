// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `/agents` routes (spec §4.I, §4.G).

use crate::error::AppError;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use outpost_core::{Agent, AgentId, AgentStatus, Clock};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn router<C: Clock + 'static>() -> Router<Arc<AppState<C>>> {
    Router::new()
        .route("/agents/register", post(register))
        .route("/agents/:id/heartbeat", post(heartbeat))
        .route("/agents/:id", axum::routing::delete(deregister))
        .route("/agents", get(list_agents))
        .route("/agents/locations", get(list_locations))
}

#[derive(Debug, Serialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
    name: String,
    location: String,
    #[serde(default)]
    version: Option<String>,
}

async fn register<C: Clock>(
    State(state): State<Arc<AppState<C>>>,
    Json(body): Json<RegisterBody>,
) -> Result<Json<Envelope<Agent>>, AppError> {
    let now_ms = state.clock.epoch_ms();
    let agent = state.registry.register(body.name, body.location, body.version, now_ms)?;
    Ok(Json(Envelope { data: agent }))
}

#[derive(Debug, Serialize)]
struct SuccessBody {
    success: bool,
}

async fn heartbeat<C: Clock>(
    State(state): State<Arc<AppState<C>>>,
    Path(id): Path<String>,
) -> Result<Json<SuccessBody>, AppError> {
    let now_ms = state.clock.epoch_ms();
    state.registry.heartbeat(&AgentId::from_string(id), now_ms)?;
    Ok(Json(SuccessBody { success: true }))
}

async fn deregister<C: Clock>(
    State(state): State<Arc<AppState<C>>>,
    Path(id): Path<String>,
) -> Result<Json<SuccessBody>, AppError> {
    state.registry.deregister(&AgentId::from_string(id))?;
    Ok(Json(SuccessBody { success: true }))
}

#[derive(Debug, Deserialize)]
pub struct ListAgentsQuery {
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

fn parse_status(s: &str) -> Result<AgentStatus, AppError> {
    Ok(match s {
        "ONLINE" => AgentStatus::Online,
        "STALE" => AgentStatus::Stale,
        "DEREGISTERED" => AgentStatus::Deregistered,
        other => return Err(AppError::Validation(format!("unknown agent status: {other}"))),
    })
}

async fn list_agents<C: Clock>(
    State(state): State<Arc<AppState<C>>>,
    Query(query): Query<ListAgentsQuery>,
) -> Result<Json<Envelope<Vec<Agent>>>, AppError> {
    let status = query.status.as_deref().map(parse_status).transpose()?;
    let agents = state
        .registry
        .list_agents()
        .into_iter()
        .filter(|a| query.location.as_deref().map_or(true, |l| a.location == l))
        .filter(|a| status.map_or(true, |s| a.status == s))
        .collect();
    Ok(Json(Envelope { data: agents }))
}

async fn list_locations<C: Clock>(
    State(state): State<Arc<AppState<C>>>,
) -> Json<Envelope<Vec<String>>> {
    Json(Envelope { data: state.registry.registered_locations() })
}
