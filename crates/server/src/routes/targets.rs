// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `/config/:organizationId/:environment/targets/:targetKey` (spec §4.I):
//! per-key CRUD over a `(organization, environment)`'s target map.

use crate::error::AppError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use outpost_core::{Clock, TargetEntry, TargetScope};
use serde::Serialize;
use std::sync::Arc;

pub fn router<C: Clock + 'static>() -> Router<Arc<AppState<C>>> {
    Router::new().route(
        "/config/:organization_id/:environment/targets/:target_key",
        get(get_target).put(put_target).delete(delete_target),
    )
}

#[derive(Debug, Serialize)]
struct Envelope<T> {
    data: T,
}

async fn get_target<C: Clock>(
    State(state): State<Arc<AppState<C>>>,
    Path((organization_id, environment, target_key)): Path<(String, String, String)>,
) -> Result<Json<Envelope<TargetEntry>>, AppError> {
    let scope = TargetScope::new(organization_id, environment);
    let config = state.targets.get(&scope).await?;
    let entry = config
        .resolve(&target_key)
        .cloned()
        .ok_or_else(|| AppError::NotFound(target_key))?;
    Ok(Json(Envelope { data: entry }))
}

async fn put_target<C: Clock>(
    State(state): State<Arc<AppState<C>>>,
    Path((organization_id, environment, target_key)): Path<(String, String, String)>,
    Json(entry): Json<TargetEntry>,
) -> Result<Json<Envelope<TargetEntry>>, AppError> {
    let scope = TargetScope::new(organization_id, environment);
    let mut config = state.targets.get(&scope).await?;
    config.targets.insert(target_key, entry.clone());
    state.targets.upsert(&config).await?;
    Ok(Json(Envelope { data: entry }))
}

#[derive(Debug, Serialize)]
struct SuccessBody {
    success: bool,
}

async fn delete_target<C: Clock>(
    State(state): State<Arc<AppState<C>>>,
    Path((organization_id, environment, target_key)): Path<(String, String, String)>,
) -> Result<Json<SuccessBody>, AppError> {
    let scope = TargetScope::new(organization_id, environment);
    let mut config = state.targets.get(&scope).await?;
    if config.targets.remove(&target_key).is_none() {
        return Err(AppError::NotFound(target_key));
    }
    state.targets.upsert(&config).await?;
    Ok(Json(SuccessBody { success: true }))
}
