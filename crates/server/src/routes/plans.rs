// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `/plan` routes (spec §4.I).

use crate::error::AppError;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use outpost_core::{Clock, Plan, PlanId};
use outpost_storage::PlanFilter;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn router<C: Clock + 'static>() -> Router<Arc<AppState<C>>> {
    Router::new()
        .route("/plan", post(create_plan).get(list_plans))
        .route("/plan/by-name", get(get_plan_by_name))
        .route("/plan/:id", axum::routing::put(update_plan).delete(delete_plan))
}

#[derive(Debug, Serialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
pub struct ListPlansQuery {
    #[serde(rename = "projectId", default)]
    project_id: Option<String>,
    #[serde(default)]
    environment: Option<String>,
    #[serde(default = "default_limit")]
    limit: i64,
    #[serde(default)]
    offset: i64,
}

fn default_limit() -> i64 {
    50
}

async fn create_plan<C: Clock>(
    State(state): State<Arc<AppState<C>>>,
    Json(plan): Json<Plan>,
) -> Result<Json<Envelope<Plan>>, AppError> {
    if plan.id.is_some() {
        return Err(AppError::Validation("new plans must not carry an id".into()));
    }
    plan.validate().map_err(|errors| {
        AppError::Validation(errors.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))
    })?;

    if !plan.locations.is_empty() {
        let registered = state.registry.registered_locations();
        let unknown: Vec<&String> =
            plan.locations.iter().filter(|l| !registered.contains(l)).collect();
        if !unknown.is_empty() {
            return Err(AppError::Validation(format!(
                "unregistered locations: {}",
                unknown.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(", ")
            )));
        }
    } else if state.registry.registered_locations().is_empty() {
        return Err(AppError::Validation(
            "plan has no locations and no agents are registered".into(),
        ));
    }

    let created = state.plans.create(&plan).await?;
    Ok(Json(Envelope { data: created }))
}

async fn list_plans<C: Clock>(
    State(state): State<Arc<AppState<C>>>,
    Query(query): Query<ListPlansQuery>,
) -> Result<Json<Envelope<Vec<Plan>>>, AppError> {
    let plans = state
        .plans
        .list(PlanFilter {
            project: query.project_id,
            environment: query.environment,
            limit: query.limit,
            offset: query.offset,
        })
        .await?;
    Ok(Json(Envelope { data: plans }))
}

#[derive(Debug, Deserialize)]
pub struct PlanByNameQuery {
    #[serde(rename = "organizationId")]
    organization_id: String,
    #[serde(rename = "projectId")]
    project_id: String,
    environment: String,
    name: String,
    /// Only `"latest"` is meaningful today: this store keeps no version
    /// history to migrate from, so any value returns the current document.
    #[serde(default)]
    #[allow(dead_code)]
    version: Option<String>,
}

async fn get_plan_by_name<C: Clock>(
    State(state): State<Arc<AppState<C>>>,
    Query(query): Query<PlanByNameQuery>,
) -> Result<Json<Envelope<Plan>>, AppError> {
    let plan = state
        .plans
        .get_by_name(&query.organization_id, &query.project_id, &query.environment, &query.name)
        .await?;
    Ok(Json(Envelope { data: plan }))
}

async fn update_plan<C: Clock>(
    State(state): State<Arc<AppState<C>>>,
    Path(id): Path<String>,
    Json(plan): Json<Plan>,
) -> Result<Json<Envelope<Plan>>, AppError> {
    plan.validate().map_err(|errors| {
        AppError::Validation(errors.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))
    })?;
    let id = PlanId::from_string(id);
    let updated = state.plans.update(&id, &plan).await?;
    Ok(Json(Envelope { data: updated }))
}

async fn delete_plan<C: Clock>(
    State(state): State<Arc<AppState<C>>>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<bool>>, AppError> {
    let id = PlanId::from_string(id);
    state.plans.delete(&id).await?;
    Ok(Json(Envelope { data: true }))
}
