// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The narrow adapter trait `HTTP_REQUEST` nodes dispatch through — one
//! `send` method, the way `oj_adapters::agent::AgentAdapter` keeps each
//! backend behind a single-purpose trait rather than leaking `reqwest`
//! specifics into the executor.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct HttpRequestSpec {
    pub method: String,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: Option<serde_json::Value>,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct HttpResponseSpec {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

#[derive(Debug, Error)]
pub enum HttpClientError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("transport error: {0}")]
    Transport(String),
}

#[async_trait]
pub trait HttpClientAdapter: Send + Sync {
    async fn send(&self, request: HttpRequestSpec) -> Result<HttpResponseSpec, HttpClientError>;
}

pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self { client: reqwest::Client::new() }
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClientAdapter for ReqwestHttpClient {
    async fn send(&self, request: HttpRequestSpec) -> Result<HttpResponseSpec, HttpClientError> {
        let method = reqwest::Method::from_bytes(request.method.as_bytes())
            .map_err(|e| HttpClientError::Transport(e.to_string()))?;

        let mut builder = self.client.request(method, &request.url).timeout(request.timeout);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                HttpClientError::Timeout(request.timeout)
            } else {
                HttpClientError::Transport(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.to_string(), v.to_string())))
            .collect();
        let body = response.text().await.map_err(|e| HttpClientError::Transport(e.to_string()))?;

        Ok(HttpResponseSpec { status, headers, body })
    }
}

/// Scripted fake for deterministic engine tests.
#[cfg(any(test, feature = "test-support"))]
pub struct FakeHttpClient {
    responses: parking_lot::Mutex<HashMap<String, Result<HttpResponseSpec, HttpClientError>>>,
}

#[cfg(any(test, feature = "test-support"))]
impl FakeHttpClient {
    pub fn new() -> Self {
        Self { responses: parking_lot::Mutex::new(HashMap::new()) }
    }

    pub fn stub(&self, url: impl Into<String>, response: HttpResponseSpec) {
        self.responses.lock().insert(url.into(), Ok(response));
    }

    pub fn stub_error(&self, url: impl Into<String>, error: HttpClientError) {
        self.responses.lock().insert(url.into(), Err(error));
    }
}

#[cfg(any(test, feature = "test-support"))]
impl Default for FakeHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "test-support"))]
#[async_trait]
impl HttpClientAdapter for FakeHttpClient {
    async fn send(&self, request: HttpRequestSpec) -> Result<HttpResponseSpec, HttpClientError> {
        let mut responses = self.responses.lock();
        match responses.remove(&request.url) {
            Some(result) => result,
            None => Err(HttpClientError::Transport(format!("no stub for {}", request.url))),
        }
    }
}
