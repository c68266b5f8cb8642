// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thin client for the hub's `/agents` surface (spec §4.G, §6): register at
//! startup, heartbeat on an interval, deregister on shutdown. Grounded on
//! the same narrow-adapter-over-`reqwest` shape as
//! `outpost_worker::hub_client::ReqwestHubClient`.

use outpost_core::{Agent, AgentId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("hub request failed: {0}")]
    Transport(String),
    #[error("hub rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
}

pub struct AgentClient {
    hub_url: String,
    client: reqwest::Client,
}

impl AgentClient {
    pub fn new(hub_url: impl Into<String>) -> Self {
        Self { hub_url: hub_url.into(), client: reqwest::Client::new() }
    }

    pub async fn register(&self, name: &str, location: &str) -> Result<Agent, RegistrationError> {
        let url = format!("{}/agents/register", self.hub_url);
        let body = serde_json::json!({ "name": name, "location": location });
        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| RegistrationError::Transport(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(RegistrationError::Rejected { status: status.as_u16(), message });
        }
        #[derive(serde::Deserialize)]
        struct Envelope {
            data: Agent,
        }
        let envelope: Envelope =
            response.json().await.map_err(|e| RegistrationError::Transport(e.to_string()))?;
        Ok(envelope.data)
    }

    pub async fn heartbeat(&self, agent_id: &AgentId) -> Result<(), RegistrationError> {
        let url = format!("{}/agents/{}/heartbeat", self.hub_url, agent_id);
        let response = self
            .client
            .post(url)
            .send()
            .await
            .map_err(|e| RegistrationError::Transport(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(RegistrationError::Rejected { status: status.as_u16(), message });
        }
        Ok(())
    }

    /// Best-effort: a failed deregister just leaves the agent to be swept
    /// stale by the hub's own registry sweep.
    pub async fn deregister(&self, agent_id: &AgentId) {
        let url = format!("{}/agents/{}", self.hub_url, agent_id);
        if let Err(e) = self.client.delete(url).send().await {
            tracing::warn!(error = %e, %agent_id, "best-effort deregister failed");
        }
    }
}
