//! OAuth 2.0 token introspection transport (RFC 7662).
//!
//! A single `POST` with a form-encoded `token` field, HTTP Basic auth when
//! client credentials are configured, and a hard 5-second budget. One
//! attempt, no retry: an introspection outage must surface immediately so
//! the authentication layer can apply its failure mode.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::OauthConfig;
use crate::error::AuthError;

/// Request timeout for the introspection call.
pub const INTROSPECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Decoded introspection response body.
///
/// Only the fields the gateway acts on; anything else the authorization
/// server includes is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct IntrospectionResponse {
    /// Whether the token is currently active.
    pub active: bool,
    /// Token expiry as epoch seconds, when the server reports one.
    #[serde(default)]
    pub exp: Option<i64>,
}

/// Introspection seam so tests can count or stub calls without a network.
#[async_trait]
pub trait Introspector: Send + Sync {
    async fn introspect(&self, token: &str) -> Result<IntrospectionResponse, AuthError>;
}

/// HTTP introspection client.
///
/// `Clone`-free by design: the auth layer owns exactly one and shares it
/// behind an `Arc`.
pub struct IntrospectionClient {
    client: Client,
    config: OauthConfig,
}

impl IntrospectionClient {
    /// Build a client for the configured introspection endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidEndpoint`] when the URL is empty or not
    /// parseable, and [`AuthError::ClientBuild`] when the HTTP client cannot
    /// be constructed.
    pub fn new(config: OauthConfig) -> Result<Self, AuthError> {
        if config.introspection_url.is_empty() {
            return Err(AuthError::InvalidEndpoint {
                url: config.introspection_url.clone(),
                reason: "endpoint is empty".to_string(),
            });
        }
        if let Err(e) = reqwest::Url::parse(&config.introspection_url) {
            return Err(AuthError::InvalidEndpoint {
                url: config.introspection_url.clone(),
                reason: e.to_string(),
            });
        }

        let client = Client::builder()
            .timeout(INTROSPECTION_TIMEOUT)
            .connect_timeout(INTROSPECTION_TIMEOUT)
            .build()
            .map_err(|e| AuthError::ClientBuild {
                reason: e.to_string(),
            })?;

        Ok(Self { client, config })
    }

    fn classify_error(&self, error: reqwest::Error) -> AuthError {
        if error.is_timeout() {
            AuthError::IntrospectionTimeout {
                url: self.config.introspection_url.clone(),
                timeout_secs: INTROSPECTION_TIMEOUT.as_secs(),
            }
        } else {
            AuthError::IntrospectionConnectionFailed {
                url: self.config.introspection_url.clone(),
                reason: error.to_string(),
            }
        }
    }
}

#[async_trait]
impl Introspector for IntrospectionClient {
    async fn introspect(&self, token: &str) -> Result<IntrospectionResponse, AuthError> {
        let mut request = self
            .client
            .post(&self.config.introspection_url)
            .form(&[("token", token)]);

        // Basic auth only when both halves of the credential are present.
        if let (Some(client_id), Some(client_secret)) =
            (&self.config.client_id, &self.config.client_secret)
        {
            request = request.basic_auth(client_id, Some(client_secret));
        }

        let response = request.send().await.map_err(|e| self.classify_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::IntrospectionStatus {
                status: status.as_u16(),
            });
        }

        let body: IntrospectionResponse =
            response
                .json()
                .await
                .map_err(|e| AuthError::IntrospectionParse {
                    reason: e.to_string(),
                })?;

        debug!(active = body.active, has_exp = body.exp.is_some(), "token introspection complete");
        Ok(body)
    }
}
