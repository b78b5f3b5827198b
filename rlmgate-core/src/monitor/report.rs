//! Aggregated monitoring report.
//!
//! A report is a snapshot derived from the alert log; generating one never
//! mutates monitor state.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::alert::BypassAlert;

/// How many of the most recent alerts a report carries.
pub const RECENT_ALERT_LIMIT: usize = 10;

/// Snapshot of monitor state at one point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringReport {
    /// When the snapshot was taken.
    pub timestamp: DateTime<Utc>,
    /// Total alerts recorded since the monitor started.
    pub total_alerts: u64,
    /// Alert counts keyed by alert type.
    pub alert_counts: BTreeMap<String, u64>,
    /// Per-session provenance-poll counters.
    pub session_stats: BTreeMap<String, u64>,
    /// The last [`RECENT_ALERT_LIMIT`] alerts, oldest first.
    pub recent_alerts: Vec<BypassAlert>,
    /// Alert counts keyed by severity.
    pub severity_breakdown: BTreeMap<String, u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::alert::{AlertType, Severity};

    #[test]
    fn test_report_serializes_expected_fields() {
        let report = MonitoringReport {
            timestamp: Utc::now(),
            total_alerts: 1,
            alert_counts: BTreeMap::from([("gateway_unreachable".to_string(), 1)]),
            session_stats: BTreeMap::new(),
            recent_alerts: vec![BypassAlert::new(
                AlertType::GatewayUnreachable,
                Severity::High,
                "gateway health check failed",
            )],
            severity_breakdown: BTreeMap::from([("high".to_string(), 1)]),
        };

        let value = serde_json::to_value(&report).expect("report serializes");
        let object = value.as_object().expect("report is an object");
        let keys: Vec<&str> = object.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec![
                "alert_counts",
                "recent_alerts",
                "session_stats",
                "severity_breakdown",
                "timestamp",
                "total_alerts",
            ]
        );
    }

    #[test]
    fn test_report_round_trip() {
        let report = MonitoringReport {
            timestamp: Utc::now(),
            total_alerts: 0,
            alert_counts: BTreeMap::new(),
            session_stats: BTreeMap::from([("sess-1".to_string(), 3)]),
            recent_alerts: Vec::new(),
            severity_breakdown: BTreeMap::new(),
        };

        let encoded = serde_json::to_string(&report).expect("report serializes");
        let decoded: MonitoringReport = serde_json::from_str(&encoded).expect("report parses");
        assert_eq!(decoded.session_stats.get("sess-1"), Some(&3));
    }
}
