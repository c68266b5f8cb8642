// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Executes a validated plan's DAG on an agent: resolves `$variable` bases
//! against a target config, dispatches HTTP_REQUEST/WAIT/ASSERTION nodes in
//! topological order, and reports per-node results (spec §4.C).

pub mod assert;
pub mod error;
pub mod events;
pub mod executor;
pub mod http_client;
pub mod topo;

pub use error::EngineError;
pub use events::{BroadcastEmitter, DurableEmitter, DurableEventError, DurableEventSink, EngineEvent, EventEmitter};
pub use executor::PlanExecutor;
pub use http_client::{HttpClientAdapter, HttpClientError, HttpRequestSpec, HttpResponseSpec, ReqwestHttpClient};
pub use topo::{topological_order, TopoError};

#[cfg(any(test, feature = "test-support"))]
pub use http_client::FakeHttpClient;
