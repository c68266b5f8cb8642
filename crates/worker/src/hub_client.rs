// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The hub surface a worker calls back into: run status PATCHes and
//! per-key target lookups, kept behind a trait the same way
//! `outpost_reconciler::client::HubPlanClient` keeps plan CRUD off of
//! `apply` — so the job-processing path never touches `reqwest` directly.

use async_trait::async_trait;
use outpost_core::{NodeResult, RunId, RunStatus, TargetEntry};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HubClientError {
    #[error("hub request failed: {0}")]
    Transport(String),
    #[error("hub rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
}

#[async_trait]
pub trait HubClient: Send + Sync {
    /// `PATCH /runs/:id` (spec §4.F, §4.I): status plus the wire-documented
    /// `duration_ms`/`success`/`errors` fields and the per-node results.
    #[allow(clippy::too_many_arguments)]
    async fn patch_run_status(
        &self,
        run_id: &RunId,
        status: RunStatus,
        duration_ms: Option<u64>,
        success: Option<bool>,
        errors: &[String],
        results: &[NodeResult],
    ) -> Result<(), HubClientError>;

    /// `GET /config/:organizationId/:environment/targets/:targetKey`; a
    /// missing key is not an error, the target resolver just has nothing
    /// for it.
    async fn get_target(
        &self,
        organization: &str,
        environment: &str,
        target_key: &str,
    ) -> Result<Option<TargetEntry>, HubClientError>;
}

pub struct ReqwestHubClient {
    base_url: String,
    auth_header: Option<(String, String)>,
    client: reqwest::Client,
}

impl ReqwestHubClient {
    pub fn new(base_url: impl Into<String>, auth_header: Option<(String, String)>) -> Self {
        Self { base_url: base_url.into(), auth_header, client: reqwest::Client::new() }
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth_header {
            Some((name, value)) => builder.header(name, value),
            None => builder,
        }
    }
}

#[derive(Debug, Serialize)]
struct PatchRunBody<'a> {
    status: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    success: Option<bool>,
    errors: &'a [String],
    results: &'a [NodeResult],
}

#[async_trait]
impl HubClient for ReqwestHubClient {
    async fn patch_run_status(
        &self,
        run_id: &RunId,
        status: RunStatus,
        duration_ms: Option<u64>,
        success: Option<bool>,
        errors: &[String],
        results: &[NodeResult],
    ) -> Result<(), HubClientError> {
        let url = format!("{}/runs/{}", self.base_url, run_id);
        let body = PatchRunBody { status: &status.to_string(), duration_ms, success, errors, results };
        let response = self
            .request(self.client.patch(url).json(&body))
            .send()
            .await
            .map_err(|e| HubClientError::Transport(e.to_string()))?;

        let status_code = response.status();
        if !status_code.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(HubClientError::Rejected { status: status_code.as_u16(), message });
        }
        Ok(())
    }

    async fn get_target(
        &self,
        organization: &str,
        environment: &str,
        target_key: &str,
    ) -> Result<Option<TargetEntry>, HubClientError> {
        let url = format!("{}/config/{}/{}/targets/{}", self.base_url, organization, environment, target_key);
        let response = self
            .request(self.client.get(url))
            .send()
            .await
            .map_err(|e| HubClientError::Transport(e.to_string()))?;

        let status_code = response.status();
        if status_code == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status_code.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(HubClientError::Rejected { status: status_code.as_u16(), message });
        }

        #[derive(serde::Deserialize)]
        struct Envelope {
            data: TargetEntry,
        }
        let envelope: Envelope =
            response.json().await.map_err(|e| HubClientError::Transport(e.to_string()))?;
        Ok(Some(envelope.data))
    }
}
