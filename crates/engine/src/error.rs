// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::topo::TopoError;
use thiserror::Error;

/// Errors that abort an entire run before or during dispatch. Per-node HTTP
/// failures are not engine errors; they are recorded as a failed
/// [`outpost_core::NodeResult`] so the rest of the run's bookkeeping (and the
/// remaining DAG, marked skipped) still completes.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid plan graph: {0}")]
    InvalidGraph(#[from] TopoError),
    #[error("target variable {0:?} has no resolved base URL")]
    UnresolvedVariable(String),
    #[error("malformed base marker on node {0}: {1}")]
    MalformedBase(String, String),
}
