//! Inbound request authentication for the gateway.
//!
//! Two modes, chosen by configuration:
//!
//! - **OAuth introspection** — when an introspection endpoint is configured
//!   it wins regardless of API-key presence. Verdicts are cached per token
//!   and re-checked once the server-reported expiry passes.
//! - **Static API key** — exact match, compared in constant time.
//!
//! With neither configured the gateway is open: every token validates,
//! including an absent one. Introspection outages are resolved by the
//! configured [`FailureMode`]; the default denies (fail-closed).

pub mod cache;
pub mod introspection;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use subtle::ConstantTimeEq;
use tracing::{debug, warn};

use crate::error::AuthError;
use cache::{TokenCache, TokenValidation};
use introspection::{Introspector, IntrospectionClient};

/// OAuth introspection endpoint configuration.
#[derive(Debug, Clone)]
pub struct OauthConfig {
    /// Introspection endpoint URL (RFC 7662).
    pub introspection_url: String,
    /// Client identifier for HTTP Basic auth, if the server requires one.
    pub client_id: Option<String>,
    /// Client secret paired with `client_id`.
    pub client_secret: Option<String>,
}

/// What an introspection transport failure means for the request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailureMode {
    /// Deny the request when the introspection endpoint is unreachable.
    #[default]
    FailClosed,
    /// Allow the request when the introspection endpoint is unreachable.
    FailOpen,
}

/// Authentication configuration. Immutable after construction.
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    /// Static API key; ignored when `oauth` is set.
    pub api_key: Option<String>,
    /// OAuth introspection settings; takes precedence over `api_key`.
    pub oauth: Option<OauthConfig>,
    /// Introspection-outage policy.
    pub failure_mode: FailureMode,
}

/// Discovery view of the OAuth configuration. Never carries the secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OauthMetadata {
    pub oauth_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub introspection_endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
}

enum AuthMode {
    Open,
    ApiKey(String),
    Oauth {
        config: OauthConfig,
        introspector: Arc<dyn Introspector>,
    },
}

/// Validates inbound bearer tokens.
pub struct GatewayAuth {
    mode: AuthMode,
    failure_mode: FailureMode,
    cache: TokenCache,
}

impl GatewayAuth {
    /// Build the validator from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error only when OAuth is configured and the introspection
    /// client cannot be constructed (bad endpoint URL, client build failure).
    pub fn new(config: AuthConfig) -> Result<Self, AuthError> {
        let mode = match (config.oauth, config.api_key) {
            (Some(oauth), _) => {
                let introspector: Arc<dyn Introspector> =
                    Arc::new(IntrospectionClient::new(oauth.clone())?);
                AuthMode::Oauth {
                    config: oauth,
                    introspector,
                }
            }
            (None, Some(api_key)) => AuthMode::ApiKey(api_key),
            (None, None) => AuthMode::Open,
        };

        Ok(Self {
            mode,
            failure_mode: config.failure_mode,
            cache: TokenCache::new(),
        })
    }

    /// Build an OAuth-mode validator with a caller-supplied introspector.
    ///
    /// Used by tests to count introspection calls without a network.
    pub fn with_introspector(
        oauth: OauthConfig,
        introspector: Arc<dyn Introspector>,
        failure_mode: FailureMode,
    ) -> Self {
        Self {
            mode: AuthMode::Oauth {
                config: oauth,
                introspector,
            },
            failure_mode,
            cache: TokenCache::new(),
        }
    }

    /// Validate a bearer token.
    ///
    /// `None` and `Some("")` are both treated as an absent token. The OAuth
    /// path never issues a network call for absent tokens or live cache hits.
    pub async fn validate(&self, token: Option<&str>) -> bool {
        match &self.mode {
            AuthMode::Open => true,
            AuthMode::ApiKey(expected) => match token {
                Some(presented) => {
                    bool::from(presented.as_bytes().ct_eq(expected.as_bytes()))
                }
                None => false,
            },
            AuthMode::Oauth { introspector, .. } => {
                let presented = match token {
                    Some(t) if !t.is_empty() => t,
                    _ => return false,
                };
                self.validate_oauth(presented, introspector.as_ref(), Utc::now())
                    .await
            }
        }
    }

    async fn validate_oauth(
        &self,
        token: &str,
        introspector: &dyn Introspector,
        now: DateTime<Utc>,
    ) -> bool {
        if let Some(cached) = self.cache.get(token, now) {
            debug!(active = cached.active, "token validated from cache");
            return cached.active;
        }

        match introspector.introspect(token).await {
            Ok(response) => {
                let expires_at = response
                    .exp
                    .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0));
                if response.active {
                    self.cache.insert(
                        token,
                        TokenValidation {
                            active: true,
                            expires_at,
                        },
                    );
                }
                response.active
            }
            Err(e) => match self.failure_mode {
                FailureMode::FailClosed => {
                    warn!(error = %e, "token introspection failed; denying request (fail-closed)");
                    false
                }
                FailureMode::FailOpen => {
                    warn!(error = %e, "token introspection failed; allowing request (fail-open)");
                    true
                }
            },
        }
    }

    /// Discovery metadata for the configured auth mode.
    #[must_use]
    pub fn oauth_metadata(&self) -> OauthMetadata {
        match &self.mode {
            AuthMode::Oauth { config, .. } => OauthMetadata {
                oauth_enabled: true,
                introspection_endpoint: Some(config.introspection_url.clone()),
                client_id: config.client_id.clone(),
            },
            _ => OauthMetadata {
                oauth_enabled: false,
                introspection_endpoint: None,
                client_id: None,
            },
        }
    }

    /// Number of cached token verdicts (diagnostics only).
    #[must_use]
    pub fn cached_tokens(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use introspection::IntrospectionResponse;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Stub introspector that counts calls and replays a fixed response.
    struct CountingIntrospector {
        calls: AtomicUsize,
        active: bool,
        exp: Option<i64>,
        fail: bool,
    }

    impl CountingIntrospector {
        fn active(exp: Option<i64>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                active: true,
                exp,
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                active: false,
                exp: None,
                fail: true,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Introspector for CountingIntrospector {
        async fn introspect(&self, _token: &str) -> Result<IntrospectionResponse, AuthError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AuthError::IntrospectionStatus { status: 503 });
            }
            Ok(IntrospectionResponse {
                active: self.active,
                exp: self.exp,
            })
        }
    }

    fn oauth_config() -> OauthConfig {
        OauthConfig {
            introspection_url: "http://localhost:9000/introspect".to_string(),
            client_id: Some("gateway".to_string()),
            client_secret: Some("s3cret".to_string()),
        }
    }

    fn oauth_auth(introspector: Arc<CountingIntrospector>, mode: FailureMode) -> GatewayAuth {
        GatewayAuth::with_introspector(oauth_config(), introspector, mode)
    }

    #[tokio::test]
    async fn test_open_gateway_accepts_everything() {
        let auth = GatewayAuth::new(AuthConfig::default()).expect("open config builds");
        assert!(auth.validate(None).await);
        assert!(auth.validate(Some("anything")).await);
        assert!(auth.validate(Some("")).await);
    }

    #[tokio::test]
    async fn test_api_key_exact_match_only() {
        let auth = GatewayAuth::new(AuthConfig {
            api_key: Some("secret".to_string()),
            ..AuthConfig::default()
        })
        .expect("api key config builds");

        assert!(auth.validate(Some("secret")).await);
        assert!(!auth.validate(Some("wrong")).await);
        assert!(!auth.validate(Some("secret ")).await);
        assert!(!auth.validate(None).await);
    }

    #[test]
    fn test_oauth_wins_over_api_key() {
        let auth = GatewayAuth::new(AuthConfig {
            api_key: Some("secret".to_string()),
            oauth: Some(oauth_config()),
            failure_mode: FailureMode::FailClosed,
        })
        .expect("combined config builds");

        assert!(
            auth.oauth_metadata().oauth_enabled,
            "OAuth must take precedence when both modes are configured"
        );
    }

    #[tokio::test]
    async fn test_oauth_absent_token_denied_without_network() {
        let introspector = Arc::new(CountingIntrospector::active(None));
        let auth = oauth_auth(introspector.clone(), FailureMode::FailClosed);

        assert!(!auth.validate(None).await);
        assert!(!auth.validate(Some("")).await);
        assert_eq!(introspector.calls(), 0);
    }

    #[tokio::test]
    async fn test_oauth_cache_suppresses_second_introspection() {
        let exp = (Utc::now() + chrono::Duration::hours(1)).timestamp();
        let introspector = Arc::new(CountingIntrospector::active(Some(exp)));
        let auth = oauth_auth(introspector.clone(), FailureMode::FailClosed);

        assert!(auth.validate(Some("tok")).await);
        assert!(auth.validate(Some("tok")).await);
        assert_eq!(introspector.calls(), 1, "second call must hit the cache");
    }

    #[tokio::test]
    async fn test_oauth_expired_entry_reintrospects() {
        let exp = (Utc::now() - chrono::Duration::seconds(5)).timestamp();
        let introspector = Arc::new(CountingIntrospector::active(Some(exp)));
        let auth = oauth_auth(introspector.clone(), FailureMode::FailClosed);

        assert!(auth.validate(Some("tok")).await);
        assert!(auth.validate(Some("tok")).await);
        assert_eq!(
            introspector.calls(),
            2,
            "already-expired entry must not be served from cache"
        );
    }

    #[tokio::test]
    async fn test_inactive_verdict_is_not_cached() {
        let introspector = Arc::new(CountingIntrospector {
            calls: AtomicUsize::new(0),
            active: false,
            exp: None,
            fail: false,
        });
        let auth = oauth_auth(introspector.clone(), FailureMode::FailClosed);

        assert!(!auth.validate(Some("revoked")).await);
        assert!(!auth.validate(Some("revoked")).await);
        assert_eq!(introspector.calls(), 2, "inactive tokens are re-checked");
        assert_eq!(auth.cached_tokens(), 0);
    }

    #[tokio::test]
    async fn test_introspection_outage_fail_closed() {
        let introspector = Arc::new(CountingIntrospector::failing());
        let auth = oauth_auth(introspector, FailureMode::FailClosed);
        assert!(!auth.validate(Some("tok")).await);
    }

    #[tokio::test]
    async fn test_introspection_outage_fail_open() {
        let introspector = Arc::new(CountingIntrospector::failing());
        let auth = oauth_auth(introspector, FailureMode::FailOpen);
        assert!(auth.validate(Some("tok")).await);
    }

    #[test]
    fn test_metadata_never_exposes_secret() {
        let auth = GatewayAuth::with_introspector(
            oauth_config(),
            Arc::new(CountingIntrospector::active(None)),
            FailureMode::FailClosed,
        );

        let metadata = auth.oauth_metadata();
        assert!(metadata.oauth_enabled);
        assert_eq!(
            metadata.introspection_endpoint.as_deref(),
            Some("http://localhost:9000/introspect")
        );
        assert_eq!(metadata.client_id.as_deref(), Some("gateway"));

        let json = serde_json::to_string(&metadata).expect("metadata serializes");
        assert!(!json.contains("s3cret"));
    }

    #[test]
    fn test_metadata_for_api_key_mode() {
        let auth = GatewayAuth::new(AuthConfig {
            api_key: Some("secret".to_string()),
            ..AuthConfig::default()
        })
        .expect("api key config builds");

        let metadata = auth.oauth_metadata();
        assert!(!metadata.oauth_enabled);
        assert_eq!(metadata.introspection_endpoint, None);
        assert_eq!(metadata.client_id, None);
    }
}
