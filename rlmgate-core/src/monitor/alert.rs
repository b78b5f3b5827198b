//! Alert records produced by the bypass monitor.
//!
//! Alerts are immutable once recorded and append-only in the monitor's log;
//! they serialize losslessly so reports can be persisted and replayed.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Classification of a recorded alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    /// Gateway health probe failed or answered non-200.
    GatewayUnreachable,
    /// The canary token appeared outside gateway-mediated channels.
    CanaryTokenLeak,
    /// Scanned text contained a direct file-access code pattern.
    DirectFileAccess,
    /// The sentinel canary file's mtime moved forward.
    CanaryFileModified,
}

impl AlertType {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GatewayUnreachable => "gateway_unreachable",
            Self::CanaryTokenLeak => "canary_token_leak",
            Self::DirectFileAccess => "direct_file_access",
            Self::CanaryFileModified => "canary_file_modified",
        }
    }
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alert severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded bypass alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BypassAlert {
    pub timestamp: DateTime<Utc>,
    pub alert_type: AlertType,
    pub severity: Severity,
    pub message: String,
    /// Free-form structured context (urls, match labels, mtimes, ...).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub details: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canary_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provenance: Option<Value>,
}

impl BypassAlert {
    /// New alert stamped with the current time.
    #[must_use]
    pub fn new(alert_type: AlertType, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            alert_type,
            severity,
            message: message.into(),
            details: BTreeMap::new(),
            canary_token: None,
            file_path: None,
            provenance: None,
        }
    }

    #[must_use]
    pub fn with_detail(mut self, key: impl Into<String>, value: Value) -> Self {
        self.details.insert(key.into(), value);
        self
    }

    #[must_use]
    pub fn with_canary_token(mut self, token: impl Into<String>) -> Self {
        self.canary_token = Some(token.into());
        self
    }

    #[must_use]
    pub fn with_file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_provenance(mut self, provenance: Value) -> Self {
        self.provenance = Some(provenance);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
        assert!(Severity::High < Severity::Critical);
    }

    #[test]
    fn test_alert_type_snake_case_serialization() {
        let json = serde_json::to_string(&AlertType::GatewayUnreachable).expect("serializes");
        assert_eq!(json, "\"gateway_unreachable\"");
    }

    #[test]
    fn test_alert_round_trip_is_lossless() {
        let alert = BypassAlert::new(
            AlertType::CanaryTokenLeak,
            Severity::Critical,
            "canary token observed in tool output",
        )
        .with_detail("context", json!("session sess-9"))
        .with_detail("detector", json!("canary_token"))
        .with_canary_token("RLM_CANARY_42")
        .with_file_path("/workspace/.rlm_canary_token.txt")
        .with_provenance(json!({"spans": []}));

        let encoded = serde_json::to_string(&alert).expect("alert serializes");
        let decoded: BypassAlert = serde_json::from_str(&encoded).expect("alert deserializes");
        assert_eq!(alert, decoded);
    }

    #[test]
    fn test_minimal_alert_round_trip() {
        let alert = BypassAlert::new(
            AlertType::GatewayUnreachable,
            Severity::High,
            "gateway health check failed",
        );

        let encoded = serde_json::to_string(&alert).expect("alert serializes");
        // Empty/absent optionals are omitted from the wire form entirely.
        assert!(!encoded.contains("details"));
        assert!(!encoded.contains("canary_token"));
        assert!(!encoded.contains("file_path"));
        assert!(!encoded.contains("provenance"));

        let decoded: BypassAlert = serde_json::from_str(&encoded).expect("alert deserializes");
        assert_eq!(alert, decoded);
    }
}
