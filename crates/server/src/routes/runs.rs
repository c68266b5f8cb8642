// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `/runs` routes (spec §4.I): listing, manual trigger, and the worker's
//! status-update PATCH.

use crate::dispatch::dispatch_plan;
use crate::error::AppError;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use outpost_core::{Clock, NodeResult, PlanId, Run, RunId, RunStatus, TriggeredBy};
use outpost_storage::RunFilter;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn router<C: Clock + 'static>() -> Router<Arc<AppState<C>>> {
    Router::new()
        .route("/runs/trigger-by-plan-id/:plan_id", post(trigger_by_plan_id))
        .route("/runs", get(list_runs))
        .route("/runs/:id", get(get_run).patch(patch_run))
}

#[derive(Debug, Serialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
pub struct TriggerBody {
    #[serde(default)]
    #[allow(dead_code)]
    environment: Option<String>,
}

async fn trigger_by_plan_id<C: Clock>(
    State(state): State<Arc<AppState<C>>>,
    Path(plan_id): Path<String>,
    Json(_body): Json<TriggerBody>,
) -> Result<Json<Envelope<Run>>, AppError> {
    let plan_id = PlanId::from_string(plan_id);
    let plan = state.plans.get(&plan_id).await?;
    let runs = dispatch_plan(&state, &plan, TriggeredBy::Manual { principal: "api".into() }).await?;
    let run = runs
        .into_iter()
        .next()
        .ok_or_else(|| AppError::Backend("dispatch produced no runs".into()))?;
    Ok(Json(Envelope { data: run }))
}

#[derive(Debug, Deserialize)]
pub struct ListRunsQuery {
    #[serde(rename = "planId", default)]
    plan_id: Option<String>,
    #[serde(default = "default_limit")]
    limit: i64,
    #[serde(default)]
    offset: i64,
}

fn default_limit() -> i64 {
    50
}

async fn list_runs<C: Clock>(
    State(state): State<Arc<AppState<C>>>,
    Query(query): Query<ListRunsQuery>,
) -> Result<Json<Envelope<Vec<Run>>>, AppError> {
    let runs = state
        .runs
        .list(RunFilter {
            plan_id: query.plan_id.map(PlanId::from_string),
            limit: query.limit,
            offset: query.offset,
        })
        .await?;
    Ok(Json(Envelope { data: runs }))
}

async fn get_run<C: Clock>(
    State(state): State<Arc<AppState<C>>>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<Run>>, AppError> {
    let run = state.runs.get(&RunId::from_string(id)).await?;
    Ok(Json(Envelope { data: run }))
}

#[derive(Debug, Deserialize)]
pub struct PatchRunBody {
    status: String,
    #[serde(default)]
    duration_ms: Option<u64>,
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    errors: Vec<String>,
    #[serde(default)]
    results: Vec<NodeResult>,
}

fn parse_status(s: &str) -> Result<RunStatus, AppError> {
    Ok(match s {
        "PENDING" => RunStatus::Pending,
        "RUNNING" => RunStatus::Running,
        "COMPLETED" => RunStatus::Completed,
        "FAILED" => RunStatus::Failed,
        other => return Err(AppError::Validation(format!("unknown run status: {other}"))),
    })
}

/// Worker status update. Reuses [`Run::transition`] to enforce the same
/// monotonic lattice the worker loop relies on, rejecting any PATCH that
/// would move a run backwards or skip `RUNNING` (spec §5).
async fn patch_run<C: Clock>(
    State(state): State<Arc<AppState<C>>>,
    Path(id): Path<String>,
    Json(body): Json<PatchRunBody>,
) -> Result<Json<Envelope<Run>>, AppError> {
    let id = RunId::from_string(id);
    let mut run = state.runs.get(&id).await?;
    let next = parse_status(&body.status)?;
    let now_ms = state.clock.epoch_ms();
    run.transition(next, now_ms).map_err(|e| AppError::Validation(e.to_string()))?;
    run.duration_ms = body.duration_ms;
    run.success = body.success;
    run.errors = body.errors;
    run.results = body.results;
    state.runs.patch(&id, &run).await?;
    Ok(Json(Envelope { data: run }))
}
