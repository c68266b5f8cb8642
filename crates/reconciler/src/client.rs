// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The hub's plan CRUD surface, kept behind a trait so `apply` never touches
//! `reqwest` directly — the same narrow-adapter shape as
//! `outpost_engine::HttpClientAdapter`.

use async_trait::async_trait;
use outpost_core::{Plan, PlanId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HubClientError {
    #[error("hub request failed: {0}")]
    Transport(String),
    #[error("hub rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
}

#[async_trait]
pub trait HubPlanClient: Send + Sync {
    async fn create_plan(&self, plan: &Plan) -> Result<Plan, HubClientError>;
    async fn update_plan(&self, remote_id: &PlanId, plan: &Plan) -> Result<Plan, HubClientError>;
    async fn delete_plan(&self, remote_id: &PlanId) -> Result<(), HubClientError>;
    /// All plans currently stored for a project/environment, used by `apply`
    /// to diff the local plan set against what the hub already has.
    async fn list_plans(&self, project: &str, environment: &str) -> Result<Vec<Plan>, HubClientError>;
}

pub struct ReqwestHubPlanClient {
    base_url: String,
    auth_header: Option<(String, String)>,
    client: reqwest::Client,
}

impl ReqwestHubPlanClient {
    pub fn new(base_url: impl Into<String>, auth_header: Option<(String, String)>) -> Self {
        Self { base_url: base_url.into(), auth_header, client: reqwest::Client::new() }
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth_header {
            Some((name, value)) => builder.header(name, value),
            None => builder,
        }
    }

    async fn into_plan(response: reqwest::Response) -> Result<Plan, HubClientError> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(HubClientError::Rejected { status: status.as_u16(), message });
        }
        #[derive(serde::Deserialize)]
        struct Envelope {
            data: Plan,
        }
        let envelope: Envelope = response
            .json()
            .await
            .map_err(|e| HubClientError::Transport(e.to_string()))?;
        Ok(envelope.data)
    }
}

#[async_trait]
impl HubPlanClient for ReqwestHubPlanClient {
    async fn create_plan(&self, plan: &Plan) -> Result<Plan, HubClientError> {
        let url = format!("{}/plan", self.base_url);
        let response = self
            .request(self.client.post(url).json(plan))
            .send()
            .await
            .map_err(|e| HubClientError::Transport(e.to_string()))?;
        Self::into_plan(response).await
    }

    async fn update_plan(&self, remote_id: &PlanId, plan: &Plan) -> Result<Plan, HubClientError> {
        let url = format!("{}/plan/{}", self.base_url, remote_id);
        let response = self
            .request(self.client.put(url).json(plan))
            .send()
            .await
            .map_err(|e| HubClientError::Transport(e.to_string()))?;
        Self::into_plan(response).await
    }

    async fn delete_plan(&self, remote_id: &PlanId) -> Result<(), HubClientError> {
        let url = format!("{}/plan/{}", self.base_url, remote_id);
        let response = self
            .request(self.client.delete(url))
            .send()
            .await
            .map_err(|e| HubClientError::Transport(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(HubClientError::Rejected { status: status.as_u16(), message });
        }
        Ok(())
    }

    async fn list_plans(&self, project: &str, environment: &str) -> Result<Vec<Plan>, HubClientError> {
        let url = format!("{}/plan?projectId={}&environment={}&limit=1000", self.base_url, project, environment);
        let response = self
            .request(self.client.get(url))
            .send()
            .await
            .map_err(|e| HubClientError::Transport(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(HubClientError::Rejected { status: status.as_u16(), message });
        }
        #[derive(serde::Deserialize)]
        struct Envelope {
            data: Vec<Plan>,
        }
        let envelope: Envelope =
            response.json().await.map_err(|e| HubClientError::Transport(e.to_string()))?;
        Ok(envelope.data)
    }
}
