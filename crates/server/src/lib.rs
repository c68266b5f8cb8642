// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The hub's HTTP surface (spec §4.I): plan CRUD, run listing/trigger/patch,
//! agent register/heartbeat, and target-config CRUD, all behind the
//! configured authentication mode. Enriched from `ob-poc`'s axum route
//! modules — the teacher speaks a custom length-prefixed IPC protocol
//! (`oj-wire`) over a Unix socket, not HTTP.

pub mod auth;
pub mod dispatch;
pub mod error;
pub mod routes;
pub mod state;

use auth::require_auth;
use axum::middleware;
use axum::Router;
use outpost_core::Clock;
use state::AppState;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub use auth::{AuthMode, Principal};
pub use error::AppError;
pub use state::AppState as HubState;

#[cfg(test)]
mod test_support;

/// Builds the full router: every route under the configured auth gate, plus
/// request tracing. The caller binds this to a listener (see `outpost-hubd`).
pub fn router<C: Clock + 'static>(state: Arc<AppState<C>>) -> Router {
    Router::new()
        .merge(routes::plans::router())
        .merge(routes::runs::router())
        .merge(routes::agents::router())
        .merge(routes::targets::router())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
