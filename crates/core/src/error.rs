// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared error taxonomy (spec §7).
//!
//! Every subsystem crate defines its own `thiserror` error enum for its own
//! failure modes; this one exists so HTTP handlers and job-processing code
//! can map *any* of them onto the handful of categories the outside world
//! sees (validation / auth / not-found / transport / assertion / secret
//! resolution / job processing).

use serde::Serialize;
use thiserror::Error;

/// Taxonomy category, used to pick an HTTP status code and a retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    Validation,
    Auth,
    NotFound,
    Transport,
    Assertion,
    SecretResolution,
    JobProcessing,
    Fatal,
}

crate::simple_display! {
    ErrorCategory {
        Validation => "VALIDATION",
        Auth => "AUTH",
        NotFound => "NOT_FOUND",
        Transport => "TRANSPORT",
        Assertion => "ASSERTION",
        SecretResolution => "SECRET_RESOLUTION",
        JobProcessing => "JOB_PROCESSING",
        Fatal => "FATAL",
    }
}

/// Top-level error type shared across crates for anything that needs to be
/// reported back to a caller as `{error: string}` plus an HTTP status.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("auth error: {0}")]
    Auth(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("secret resolution error: {0}")]
    SecretResolution(String),
    #[error("job processing error: {0}")]
    JobProcessing(String),
    #[error("fatal error: {0}")]
    Fatal(String),
}

impl CoreError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CoreError::Validation(_) => ErrorCategory::Validation,
            CoreError::Auth(_) => ErrorCategory::Auth,
            CoreError::NotFound(_) => ErrorCategory::NotFound,
            CoreError::Transport(_) => ErrorCategory::Transport,
            CoreError::SecretResolution(_) => ErrorCategory::SecretResolution,
            CoreError::JobProcessing(_) => ErrorCategory::JobProcessing,
            CoreError::Fatal(_) => ErrorCategory::Fatal,
        }
    }

    /// HTTP status code this error should surface as (spec §7).
    pub fn status_code(&self) -> u16 {
        match self {
            CoreError::Validation(_) => 400,
            CoreError::Auth(_) => 401,
            CoreError::NotFound(_) => 404,
            CoreError::Transport(_) => 502,
            CoreError::SecretResolution(_) => 500,
            CoreError::JobProcessing(_) => 500,
            CoreError::Fatal(_) => 500,
        }
    }

    /// Whether this error category is retryable at the job-processing layer.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CoreError::JobProcessing(_) | CoreError::Transport(_))
    }
}
