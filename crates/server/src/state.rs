// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared state every route handler sees, wired once at startup the way
//! `ob-poc`'s route modules take a `PgPool`/`Arc<...>` via `State`.

use crate::auth::AuthMode;
use outpost_core::Clock;
use outpost_queue::JobQueue;
use outpost_registry::AgentRegistry;
use outpost_storage::{PlanRepository, RunRepository, TargetConfigRepository};
use std::sync::Arc;

/// Agent liveness is served from [`outpost_registry::AgentRegistry`] (an
/// in-memory map with its own staleness sweep) rather than
/// `outpost_storage::AgentRepository`: the registry already implements
/// every operation this surface's `/agents` routes need, and keeping one
/// source of truth per route family avoids the hub reading stale data from
/// whichever of the two was not just written.
pub struct AppState<C: Clock> {
    pub plans: Arc<dyn PlanRepository>,
    pub runs: Arc<dyn RunRepository>,
    pub targets: Arc<dyn TargetConfigRepository>,
    pub queue: Arc<dyn JobQueue>,
    pub registry: Arc<AgentRegistry>,
    pub clock: C,
    pub auth_mode: AuthMode,
    /// Queue partition every scheduled/triggered execution job is pushed to.
    pub execute_plan_queue: String,
    pub default_max_attempts: u32,
}
