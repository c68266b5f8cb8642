// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Domain model shared by every other crate in this workspace: plan
//! documents, runs, agents, queue jobs, secret/variable markers, and the
//! small ambient pieces (`Clock`, ID newtypes, the error taxonomy) they all
//! build on.

pub mod macros;

pub mod agent;
pub mod clock;
pub mod error;
pub mod id;
pub mod job;
pub mod marker;
pub mod plan;
pub mod run;
pub mod scope;
pub mod target_config;

pub use agent::{Agent, AgentId, AgentStatus};
pub use clock::{Clock, FakeClock, SystemClock};
pub use error::{CoreError, ErrorCategory};
pub use id::IdBuf;
pub use job::{JobId, JobPayload, JobStatus, QueueJob};
pub use marker::{MarkerError, MarkerValue, SecretRef, VariableRef};
pub use plan::{
    AssertionSpec, Edge, Frequency, FrequencyUnit, HeaderValue, HttpMethod, Node, Plan, PlanId,
    Predicate, PredicateKind, ResponseFormat, ValidationError, END, SCHEMA_VERSION, START,
};
pub use run::{ExecutionGroupId, NodeResult, NodeResultStatus, Run, RunId, RunStatus, TriggeredBy};
pub use scope::{PlanScope, TargetScope};
pub use target_config::{TargetConfig, TargetEntry};
