//! HTTP client for the gateway's health and provenance endpoints.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::GatewayError;

use super::jsonrpc::{JsonRpcRequest, JsonRpcResponse};

/// Tool name exposed by the gateway for per-session provenance reports.
pub const PROVENANCE_REPORT_TOOL: &str = "rlm.provenance.report";

/// Gateway client configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL of the gateway (e.g. "http://localhost:8080").
    pub base_url: String,
    /// API key presented as a bearer token on every request.
    pub api_key: Option<String>,
    /// Budget for the health probe.
    pub health_timeout: Duration,
    /// Budget for the provenance report call.
    pub provenance_timeout: Duration,
    /// TCP/TLS connect budget.
    pub connect_timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: None,
            health_timeout: Duration::from_secs(5),
            provenance_timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
        }
    }
}

impl GatewayConfig {
    /// Config with the given base URL and defaults for everything else.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Apply environment overrides to the request budgets.
    ///
    /// # Environment Variables
    ///
    /// - `RLMGATE_HEALTH_TIMEOUT_SECS` (default: 5)
    /// - `RLMGATE_PROVENANCE_TIMEOUT_SECS` (default: 10)
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidConfig`] when a variable is set but
    /// does not parse as an integer.
    pub fn apply_env_overrides(mut self) -> Result<Self, GatewayError> {
        if let Some(secs) = env_secs("RLMGATE_HEALTH_TIMEOUT_SECS")? {
            self.health_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = env_secs("RLMGATE_PROVENANCE_TIMEOUT_SECS")? {
            self.provenance_timeout = Duration::from_secs(secs);
        }
        Ok(self)
    }
}

fn env_secs(name: &str) -> Result<Option<u64>, GatewayError> {
    match std::env::var(name) {
        Ok(value) => value
            .parse()
            .map(Some)
            .map_err(|_| GatewayError::InvalidConfig {
                name: name.to_string(),
                value,
            }),
        Err(_) => Ok(None),
    }
}

/// Decoded inner payload of the provenance report tool.
#[derive(Debug, Deserialize)]
struct ProvenancePayload {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    provenance_graph: Option<Value>,
}

/// Pooled client for the gateway's HTTP surface.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    client: Client,
    config: GatewayConfig,
    /// Pre-computed endpoint URLs.
    health_url: String,
    mcp_url: String,
}

impl GatewayClient {
    /// Build a client for the configured gateway.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidUrl`] when the base URL is empty or
    /// unparseable, and [`GatewayError::ClientBuild`] when the HTTP client
    /// cannot be constructed.
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        if config.base_url.is_empty() {
            return Err(GatewayError::InvalidUrl {
                url: config.base_url.clone(),
                reason: "base URL is empty".to_string(),
            });
        }
        if let Err(e) = reqwest::Url::parse(&config.base_url) {
            return Err(GatewayError::InvalidUrl {
                url: config.base_url.clone(),
                reason: e.to_string(),
            });
        }

        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .tcp_nodelay(true)
            .build()
            .map_err(|e| GatewayError::ClientBuild {
                reason: e.to_string(),
            })?;

        let base = config.base_url.trim_end_matches('/');
        let health_url = format!("{base}/health");
        let mcp_url = format!("{base}/mcp");

        Ok(Self {
            client,
            config,
            health_url,
            mcp_url,
        })
    }

    /// Gateway base URL this client talks to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Probe the gateway health endpoint.
    ///
    /// Success iff the gateway answers HTTP 200 within the budget; anything
    /// else — other statuses included — is an error for the caller to record.
    pub async fn health(&self) -> Result<(), GatewayError> {
        let mut request = self
            .client
            .get(&self.health_url)
            .timeout(self.config.health_timeout);
        if let Some(api_key) = &self.config.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| self.classify_error(e, &self.health_url, self.config.health_timeout))?;

        let status = response.status();
        if status == StatusCode::OK {
            debug!(url = %self.health_url, "gateway healthy");
            Ok(())
        } else {
            Err(GatewayError::Unhealthy {
                status: status.as_u16(),
            })
        }
    }

    /// Fetch the provenance graph recorded for a session.
    ///
    /// Returns `Ok(Some(graph))` when the tool reports success,
    /// `Ok(None)` when it answers with a well-formed non-success payload,
    /// and an error for transport, status, or envelope failures.
    pub async fn provenance_report(
        &self,
        session_id: &str,
    ) -> Result<Option<Value>, GatewayError> {
        let rpc = JsonRpcRequest::tool_call(
            PROVENANCE_REPORT_TOOL,
            serde_json::json!({"session_id": session_id}),
        );

        let mut request = self
            .client
            .post(&self.mcp_url)
            .timeout(self.config.provenance_timeout)
            .json(&rpc);
        if let Some(api_key) = &self.config.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| self.classify_error(e, &self.mcp_url, self.config.provenance_timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Status {
                status: status.as_u16(),
                url: self.mcp_url.clone(),
            });
        }

        let envelope: JsonRpcResponse =
            response
                .json()
                .await
                .map_err(|e| GatewayError::MalformedResponse {
                    reason: e.to_string(),
                })?;

        if let Some(error) = envelope.error {
            return Err(GatewayError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        let text = envelope
            .tool_text()
            .ok_or_else(|| GatewayError::MalformedResponse {
                reason: "tool result carries no content".to_string(),
            })?;

        let payload: ProvenancePayload =
            serde_json::from_str(text).map_err(|e| GatewayError::MalformedResponse {
                reason: format!("inner payload is not valid JSON: {e}"),
            })?;

        if payload.success {
            Ok(payload.provenance_graph)
        } else {
            warn!(session_id, "gateway reported non-success provenance payload");
            Ok(None)
        }
    }

    fn classify_error(
        &self,
        error: reqwest::Error,
        url: &str,
        timeout: Duration,
    ) -> GatewayError {
        if error.is_timeout() {
            GatewayError::Timeout {
                url: url.to_string(),
                timeout_secs: timeout.as_secs(),
            }
        } else {
            GatewayError::ConnectionFailed {
                url: url.to_string(),
                reason: error.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_budgets() {
        let config = GatewayConfig::default();
        assert_eq!(config.health_timeout, Duration::from_secs(5));
        assert_eq!(config.provenance_timeout, Duration::from_secs(10));
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_client_rejects_empty_url() {
        let result = GatewayClient::new(GatewayConfig::default());
        assert!(matches!(result, Err(GatewayError::InvalidUrl { .. })));
    }

    #[test]
    fn test_client_rejects_unparseable_url() {
        let result = GatewayClient::new(GatewayConfig::with_base_url("not-a-url"));
        assert!(matches!(result, Err(GatewayError::InvalidUrl { .. })));
    }

    #[test]
    fn test_endpoint_urls_precomputed() {
        let client = GatewayClient::new(GatewayConfig::with_base_url("http://gw:8080/"))
            .expect("client builds");
        assert_eq!(client.health_url, "http://gw:8080/health");
        assert_eq!(client.mcp_url, "http://gw:8080/mcp");
    }

    mod env_overrides {
        use super::*;
        use serial_test::serial;

        /// Saves and restores env var state around a test.
        struct EnvVarGuard {
            vars: Vec<(&'static str, Option<String>)>,
        }

        impl EnvVarGuard {
            fn new(names: &[&'static str]) -> Self {
                let vars = names
                    .iter()
                    .map(|&name| (name, std::env::var(name).ok()))
                    .collect();
                Self { vars }
            }
        }

        impl Drop for EnvVarGuard {
            fn drop(&mut self) {
                for (name, original) in &self.vars {
                    match original {
                        Some(value) => std::env::set_var(name, value),
                        None => std::env::remove_var(name),
                    }
                }
            }
        }

        const VARS: &[&str] = &[
            "RLMGATE_HEALTH_TIMEOUT_SECS",
            "RLMGATE_PROVENANCE_TIMEOUT_SECS",
        ];

        #[test]
        #[serial]
        fn test_no_overrides_keeps_defaults() {
            let _guard = EnvVarGuard::new(VARS);
            for name in VARS {
                std::env::remove_var(name);
            }

            let config = GatewayConfig::with_base_url("http://gw:8080")
                .apply_env_overrides()
                .expect("defaults apply");
            assert_eq!(config.health_timeout, Duration::from_secs(5));
            assert_eq!(config.provenance_timeout, Duration::from_secs(10));
        }

        #[test]
        #[serial]
        fn test_overrides_replace_budgets() {
            let _guard = EnvVarGuard::new(VARS);
            std::env::set_var("RLMGATE_HEALTH_TIMEOUT_SECS", "2");
            std::env::set_var("RLMGATE_PROVENANCE_TIMEOUT_SECS", "30");

            let config = GatewayConfig::with_base_url("http://gw:8080")
                .apply_env_overrides()
                .expect("overrides apply");
            assert_eq!(config.health_timeout, Duration::from_secs(2));
            assert_eq!(config.provenance_timeout, Duration::from_secs(30));
        }

        #[test]
        #[serial]
        fn test_invalid_override_is_an_error() {
            let _guard = EnvVarGuard::new(VARS);
            std::env::set_var("RLMGATE_HEALTH_TIMEOUT_SECS", "not-a-number");
            std::env::remove_var("RLMGATE_PROVENANCE_TIMEOUT_SECS");

            let result = GatewayConfig::with_base_url("http://gw:8080").apply_env_overrides();
            assert!(matches!(result, Err(GatewayError::InvalidConfig { .. })));
        }
    }
}
