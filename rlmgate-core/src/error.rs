//! Error types shared across the library.
//!
//! Transport failures are classified into timeout/connection/status variants
//! so callers can decide whether a failure is an outage or a rejection.
//! Detection heuristics have no error type: absence of a match is a normal
//! outcome, not a failure.

use thiserror::Error;

/// Errors from the OAuth token introspection path.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The introspection endpoint URL is empty or not a valid absolute URL.
    #[error("invalid introspection endpoint '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },

    /// The HTTP client could not be constructed.
    #[error("failed to build introspection client: {reason}")]
    ClientBuild { reason: String },

    /// The introspection request timed out.
    #[error("token introspection timed out after {timeout_secs}s ({url})")]
    IntrospectionTimeout { url: String, timeout_secs: u64 },

    /// The introspection endpoint could not be reached.
    #[error("failed to connect to introspection endpoint {url}: {reason}")]
    IntrospectionConnectionFailed { url: String, reason: String },

    /// The introspection endpoint answered with a non-2xx status.
    #[error("introspection endpoint returned HTTP {status}")]
    IntrospectionStatus { status: u16 },

    /// The introspection response body was not the expected JSON shape.
    #[error("malformed introspection response: {reason}")]
    IntrospectionParse { reason: String },
}

/// Errors from the gateway health/provenance client.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The gateway base URL is empty or not a valid absolute URL.
    #[error("invalid gateway URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The HTTP client could not be constructed.
    #[error("failed to build gateway client: {reason}")]
    ClientBuild { reason: String },

    /// An environment override holds an unusable value.
    #[error("{name} must be a valid integer, got: '{value}'")]
    InvalidConfig { name: String, value: String },

    /// A gateway request timed out.
    #[error("gateway request timed out after {timeout_secs}s ({url})")]
    Timeout { url: String, timeout_secs: u64 },

    /// The gateway could not be reached.
    #[error("failed to connect to gateway {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    /// The health endpoint answered with something other than HTTP 200.
    #[error("gateway health endpoint returned HTTP {status}")]
    Unhealthy { status: u16 },

    /// A non-health gateway request answered with a non-2xx status.
    #[error("gateway returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    /// The gateway answered with a JSON-RPC error object.
    #[error("gateway returned JSON-RPC error {code}: {message}")]
    Rpc { code: i32, message: String },

    /// The response body did not match the expected envelope.
    #[error("malformed gateway response: {reason}")]
    MalformedResponse { reason: String },
}
