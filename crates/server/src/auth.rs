// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Three authentication modes set by config (spec §6): `none` (public),
//! `api-key` (a static Bearer-token set), `oidc` (JWT validated against an
//! issuer's JWKS). Whichever mode is active, a successful request carries a
//! [`Principal`] injected into the request extensions, the way
//! `sem_os_server`'s JWT middleware injects one after `decode`.

use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;

use crate::state::AppState;
use outpost_core::Clock;

/// The authenticated caller. `organization_id` and `roles` are empty for
/// `none`/`api-key` modes, which carry no such claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: String,
    pub organization_id: String,
    pub roles: Vec<String>,
}

impl Principal {
    pub fn anonymous() -> Self {
        Self { user_id: "anonymous".into(), organization_id: String::new(), roles: Vec::new() }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

#[derive(Debug, Deserialize)]
struct OidcClaims {
    sub: String,
    #[serde(default)]
    org_id: Option<String>,
    #[serde(default)]
    organization_id: Option<String>,
    #[serde(default)]
    roles: Vec<String>,
}

pub struct OidcValidator {
    jwks: JwkSet,
    audience: Option<String>,
}

impl OidcValidator {
    /// Fetches the issuer's JWKS once at startup (`{issuer}/.well-known/jwks.json`).
    pub async fn fetch(issuer: &str, audience: Option<String>) -> Result<Self, reqwest::Error> {
        let url = format!("{}/.well-known/jwks.json", issuer.trim_end_matches('/'));
        let jwks: JwkSet = reqwest::get(url).await?.json().await?;
        Ok(Self { jwks, audience })
    }

    fn decode(&self, token: &str) -> Result<OidcClaims, String> {
        let header = decode_header(token).map_err(|e| e.to_string())?;
        let kid = header.kid.ok_or("token header has no kid")?;
        let jwk = self.jwks.find(&kid).ok_or("no matching JWK for kid")?;
        let decoding_key = DecodingKey::from_jwk(jwk).map_err(|e| e.to_string())?;

        let mut validation = Validation::new(header.alg.unwrap_or(Algorithm::RS256));
        if let Some(aud) = &self.audience {
            validation.set_audience(&[aud]);
        } else {
            validation.validate_aud = false;
        }

        let data = decode::<OidcClaims>(token, &decoding_key, &validation).map_err(|e| e.to_string())?;
        Ok(data.claims)
    }
}

pub enum AuthMode {
    None,
    ApiKey(HashSet<String>),
    Oidc(OidcValidator),
}

fn unauthorized(message: impl Into<String>) -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": message.into() }))).into_response()
}

fn bearer_token(req: &Request) -> Option<&str> {
    req.headers().get(header::AUTHORIZATION)?.to_str().ok()?.strip_prefix("Bearer ")
}

/// Axum middleware: authenticates per `state.auth_mode` and injects a
/// [`Principal`] into the request extensions for handlers to read.
pub async fn require_auth<C: Clock + 'static>(
    State(state): State<Arc<AppState<C>>>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let principal = match &state.auth_mode {
        AuthMode::None => Principal::anonymous(),
        AuthMode::ApiKey(keys) => {
            let token = bearer_token(&req).ok_or_else(|| unauthorized("missing bearer token"))?;
            if !keys.contains(token) {
                return Err(unauthorized("invalid api key"));
            }
            Principal { user_id: "api-key".into(), organization_id: String::new(), roles: Vec::new() }
        }
        AuthMode::Oidc(validator) => {
            let token = bearer_token(&req).ok_or_else(|| unauthorized("missing bearer token"))?;
            let claims = validator.decode(token).map_err(|e| {
                tracing::warn!(error = %e, "oidc token validation failed");
                unauthorized(format!("invalid token: {e}"))
            })?;
            Principal {
                user_id: claims.sub,
                organization_id: claims.org_id.or(claims.organization_id).unwrap_or_default(),
                roles: claims.roles,
            }
        }
    };

    req.extensions_mut().insert(principal);
    Ok(next.run(req).await)
}
