// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Client for the hub surface `outpost-reconciler`'s `HubPlanClient` doesn't
//! cover (run triggering, agent listing) — same narrow-adapter-over-`reqwest`
//! shape as `outpost_reconciler::client::ReqwestHubPlanClient`.

use outpost_core::{Agent, Run};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OpsClientError {
    #[error("hub request failed: {0}")]
    Transport(String),
    #[error("hub rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
}

pub struct OpsClient {
    base_url: String,
    auth_header: Option<(String, String)>,
    client: reqwest::Client,
}

#[derive(serde::Deserialize)]
struct Envelope<T> {
    data: T,
}

impl OpsClient {
    pub fn new(base_url: impl Into<String>, auth_header: Option<(String, String)>) -> Self {
        Self { base_url: base_url.into(), auth_header, client: reqwest::Client::new() }
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth_header {
            Some((name, value)) => builder.header(name, value),
            None => builder,
        }
    }

    async fn into_envelope<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, OpsClientError> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(OpsClientError::Rejected { status: status.as_u16(), message });
        }
        let envelope: Envelope<T> =
            response.json().await.map_err(|e| OpsClientError::Transport(e.to_string()))?;
        Ok(envelope.data)
    }

    pub async fn trigger_run(
        &self,
        plan_id: &str,
        environment: &str,
    ) -> Result<Run, OpsClientError> {
        let url = format!("{}/runs/trigger-by-plan-id/{}", self.base_url, plan_id);
        let body = serde_json::json!({ "environment": environment });
        let response = self
            .request(self.client.post(url))
            .json(&body)
            .send()
            .await
            .map_err(|e| OpsClientError::Transport(e.to_string()))?;
        Self::into_envelope(response).await
    }

    pub async fn list_agents(
        &self,
        location: Option<&str>,
        status: Option<&str>,
    ) -> Result<Vec<Agent>, OpsClientError> {
        let mut url = format!("{}/agents?", self.base_url);
        if let Some(location) = location {
            url.push_str(&format!("location={location}&"));
        }
        if let Some(status) = status {
            url.push_str(&format!("status={status}&"));
        }
        let response = self
            .request(self.client.get(url))
            .send()
            .await
            .map_err(|e| OpsClientError::Transport(e.to_string()))?;
        Self::into_envelope(response).await
    }

    pub async fn list_locations(&self) -> Result<Vec<String>, OpsClientError> {
        let url = format!("{}/agents/locations", self.base_url);
        let response = self
            .request(self.client.get(url))
            .send()
            .await
            .map_err(|e| OpsClientError::Transport(e.to_string()))?;
        Self::into_envelope(response).await
    }
}
