// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent registry entity (spec §3, §4.G).

use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Server-assigned agent identifier, distinct from the agent's self-reported name.
    pub struct AgentId("agt-");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgentStatus {
    Online,
    Stale,
    Deregistered,
}

crate::simple_display! {
    AgentStatus {
        Online => "ONLINE",
        Stale => "STALE",
        Deregistered => "DEREGISTERED",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub location: String,
    pub status: AgentStatus,
    pub registered_at_ms: u64,
    pub last_heartbeat_at_ms: u64,
    #[serde(default)]
    pub version: Option<String>,
}

impl Agent {
    /// An agent is stale once `last_heartbeat_at_ms` is further in the past
    /// than `staleness_threshold_ms` (spec §8.4).
    pub fn is_stale(&self, now_ms: u64, staleness_threshold_ms: u64) -> bool {
        now_ms.saturating_sub(self.last_heartbeat_at_ms) > staleness_threshold_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent(last_heartbeat_at_ms: u64) -> Agent {
        Agent {
            id: AgentId::new(),
            name: "agent-1".into(),
            location: "us-east-1".into(),
            status: AgentStatus::Online,
            registered_at_ms: 0,
            last_heartbeat_at_ms,
            version: Some("0.1.0".into()),
        }
    }

    #[test]
    fn agent_is_stale_past_threshold() {
        let a = agent(1_000);
        assert!(a.is_stale(62_000, 60_000));
    }

    #[test]
    fn agent_is_not_stale_within_threshold() {
        let a = agent(1_000);
        assert!(!a.is_stale(30_000, 60_000));
    }

    #[test]
    fn agent_is_not_stale_exactly_at_threshold() {
        let a = agent(0);
        assert!(!a.is_stale(60_000, 60_000));
    }
}
