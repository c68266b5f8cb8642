// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent registry: tracks which agents are known to the hub, where they run,
//! and whether they are still sending heartbeats (spec §3, §4.G).

use outpost_core::{Agent, AgentId, AgentStatus};
use parking_lot::Mutex;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("agent not found: {0}")]
    NotFound(String),
    #[error("agent already registered: {0}")]
    AlreadyRegistered(String),
}

pub struct AgentRegistry {
    agents: Mutex<HashMap<AgentId, Agent>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self { agents: Mutex::new(HashMap::new()) }
    }

    pub fn register(
        &self,
        name: String,
        location: String,
        version: Option<String>,
        now_ms: u64,
    ) -> Result<Agent, RegistryError> {
        let mut agents = self.agents.lock();
        if agents.values().any(|a| a.name == name && a.status != AgentStatus::Deregistered) {
            return Err(RegistryError::AlreadyRegistered(name));
        }
        let agent = Agent {
            id: AgentId::new(),
            name,
            location,
            status: AgentStatus::Online,
            registered_at_ms: now_ms,
            last_heartbeat_at_ms: now_ms,
            version,
        };
        agents.insert(agent.id.clone(), agent.clone());
        Ok(agent)
    }

    pub fn heartbeat(&self, agent_id: &AgentId, now_ms: u64) -> Result<(), RegistryError> {
        let mut agents = self.agents.lock();
        let agent =
            agents.get_mut(agent_id).ok_or_else(|| RegistryError::NotFound(agent_id.to_string()))?;
        agent.last_heartbeat_at_ms = now_ms;
        agent.status = AgentStatus::Online;
        Ok(())
    }

    pub fn deregister(&self, agent_id: &AgentId) -> Result<(), RegistryError> {
        let mut agents = self.agents.lock();
        let agent =
            agents.get_mut(agent_id).ok_or_else(|| RegistryError::NotFound(agent_id.to_string()))?;
        agent.status = AgentStatus::Deregistered;
        Ok(())
    }

    pub fn list_agents(&self) -> Vec<Agent> {
        let mut agents: Vec<Agent> = self.agents.lock().values().cloned().collect();
        agents.sort_by(|a, b| a.name.cmp(&b.name));
        agents
    }

    /// Distinct locations with at least one online agent, used to validate
    /// a plan's `locations` against what's actually available.
    pub fn registered_locations(&self) -> Vec<String> {
        let agents = self.agents.lock();
        let mut locations: Vec<String> = agents
            .values()
            .filter(|a| a.status == AgentStatus::Online)
            .map(|a| a.location.clone())
            .collect();
        locations.sort();
        locations.dedup();
        locations
    }

    /// Mark every agent whose last heartbeat is older than
    /// `staleness_threshold_ms` as `STALE` (spec §8.4). Returns how many
    /// transitioned.
    pub fn sweep_stale(&self, now_ms: u64, staleness_threshold_ms: u64) -> usize {
        let mut agents = self.agents.lock();
        let mut swept = 0;
        for agent in agents.values_mut() {
            if agent.status == AgentStatus::Online
                && agent.is_stale(now_ms, staleness_threshold_ms)
            {
                agent.status = AgentStatus::Stale;
                swept += 1;
            }
        }
        swept
    }
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::new()
    }
}
