//! The bypass monitor: shared alert state plus the two polling loops.
//!
//! Two workers run concurrently against one monitor — a cooperative task
//! polling gateway health and a blocking worker polling the sentinel file's
//! mtime. Every alert write goes through [`BypassMonitor::record_alert`],
//! which owns the log mutex, so the loops never race each other's state.
//! Cancellation is cooperative via a `watch` channel; because the log is
//! append-only, stopping mid-cycle always leaves reportable state.

pub mod alert;
pub mod report;
pub mod sentinel;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde_json::{Value, json};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::detect::{CanaryDetector, Detector, FileAccessDetector, FindingKind};
use crate::gateway::GatewayClient;

pub use alert::{AlertType, BypassAlert, Severity};
pub use report::{MonitoringReport, RECENT_ALERT_LIMIT};

/// Slice length for the blocking poller's sleep, so cancellation is
/// observed promptly even with long intervals.
const BLOCKING_SLEEP_SLICE: Duration = Duration::from_millis(200);

/// Owns alert state and runs the bypass-detection loops.
pub struct BypassMonitor {
    detectors: Vec<Box<dyn Detector>>,
    gateway: Option<GatewayClient>,
    canary_token: Option<String>,
    alerts: Mutex<Vec<BypassAlert>>,
    alert_counts: DashMap<AlertType, u64>,
    session_stats: DashMap<String, u64>,
    total_alerts: AtomicU64,
}

impl BypassMonitor {
    /// Monitor with the standard detector set: canary tripwire (when a
    /// token is configured) and the direct-file-access scanner.
    #[must_use]
    pub fn new(canary_token: Option<String>) -> Self {
        let detectors: Vec<Box<dyn Detector>> = vec![
            Box::new(CanaryDetector::new(canary_token.clone())),
            Box::new(FileAccessDetector::new()),
        ];

        Self {
            detectors,
            gateway: None,
            canary_token,
            alerts: Mutex::new(Vec::new()),
            alert_counts: DashMap::new(),
            session_stats: DashMap::new(),
            total_alerts: AtomicU64::new(0),
        }
    }

    /// Attach a gateway client for the health/provenance polls.
    #[must_use]
    pub fn with_gateway(mut self, gateway: GatewayClient) -> Self {
        self.gateway = Some(gateway);
        self
    }

    /// Register an additional detector.
    #[must_use]
    pub fn with_detector(mut self, detector: Box<dyn Detector>) -> Self {
        self.detectors.push(detector);
        self
    }

    /// Append an alert to the log, bump counters, and emit one console line
    /// tagged by severity. Returns the recorded alert.
    pub fn record_alert(&self, alert: BypassAlert) -> BypassAlert {
        {
            let mut log = self.alerts.lock().expect("alert log lock poisoned");
            log.push(alert.clone());
            *self.alert_counts.entry(alert.alert_type).or_insert(0) += 1;
            self.total_alerts.fetch_add(1, Ordering::AcqRel);
        }

        match alert.severity {
            Severity::Critical | Severity::High => {
                error!(
                    alert_type = %alert.alert_type,
                    severity = %alert.severity,
                    "{}",
                    alert.message
                );
            }
            Severity::Medium => {
                warn!(
                    alert_type = %alert.alert_type,
                    severity = %alert.severity,
                    "{}",
                    alert.message
                );
            }
            Severity::Low => {
                info!(
                    alert_type = %alert.alert_type,
                    severity = %alert.severity,
                    "{}",
                    alert.message
                );
            }
        }

        alert
    }

    /// Probe gateway health; a failed probe is recorded as a high-severity
    /// alert and absorbed, never propagated.
    pub async fn check_gateway_health(&self) -> bool {
        let Some(gateway) = &self.gateway else {
            return false;
        };

        match gateway.health().await {
            Ok(()) => true,
            Err(e) => {
                self.record_alert(
                    BypassAlert::new(
                        AlertType::GatewayUnreachable,
                        Severity::High,
                        format!("gateway health check failed: {e}"),
                    )
                    .with_detail("gateway_url", json!(gateway.base_url())),
                );
                false
            }
        }
    }

    /// Fetch the provenance graph for a session.
    ///
    /// Absence — transport failure, bad envelope, or a non-success payload —
    /// is returned as `None` without raising an alert; the caller decides
    /// what missing provenance means.
    pub async fn check_provenance(&self, session_id: &str) -> Option<Value> {
        let gateway = self.gateway.as_ref()?;
        *self
            .session_stats
            .entry(session_id.to_string())
            .or_insert(0) += 1;

        match gateway.provenance_report(session_id).await {
            Ok(graph) => graph,
            Err(e) => {
                debug!(session_id, error = %e, "provenance fetch failed");
                None
            }
        }
    }

    /// Run all detectors over `text`; canary findings become critical
    /// alerts, file-access findings high ones. Never fails.
    pub fn analyze_text_for_bypass(&self, text: &str, context: &str) -> Vec<BypassAlert> {
        let mut alerts = Vec::new();

        for detector in &self.detectors {
            for finding in detector.scan(text) {
                let alert = match finding.kind {
                    FindingKind::CanaryLeak => {
                        let mut alert = BypassAlert::new(
                            AlertType::CanaryTokenLeak,
                            Severity::Critical,
                            format!("canary token observed outside the gateway ({context})"),
                        )
                        .with_detail("context", json!(context))
                        .with_detail("detector", json!(detector.name()));
                        if let Some(token) = &self.canary_token {
                            alert = alert.with_canary_token(token.clone());
                        }
                        alert
                    }
                    FindingKind::DirectFileAccess => BypassAlert::new(
                        AlertType::DirectFileAccess,
                        Severity::High,
                        format!("{} ({context})", finding.message),
                    )
                    .with_detail("context", json!(context))
                    .with_detail("detector", json!(detector.name())),
                };
                alerts.push(self.record_alert(alert));
            }
        }

        alerts
    }

    /// Gateway polling loop: health check, then sleep, until cancelled.
    ///
    /// Per-session provenance correlation hooks in here once the gateway
    /// starts reporting active sessions; until then health is the only poll.
    pub async fn monitor_gateway_sessions(
        &self,
        poll_interval: Duration,
        mut shutdown: watch::Receiver<bool>,
    ) {
        info!(interval_secs = poll_interval.as_secs(), "gateway monitor started");

        loop {
            let healthy = self.check_gateway_health().await;
            debug!(healthy, "gateway poll complete");

            tokio::select! {
                biased;
                _ = shutdown.changed() => {
                    debug!("gateway monitor: shutdown signal, stopping");
                    break;
                }
                _ = tokio::time::sleep(poll_interval) => {}
            }
        }
    }

    /// Sentinel-file polling loop on a blocking worker.
    ///
    /// Any observed mtime increase on the canary file is itself proof of
    /// unmediated access and is recorded as a critical alert. The loop
    /// continues until cancelled.
    pub async fn monitor_file_changes(
        self: Arc<Self>,
        watch_dir: PathBuf,
        poll_interval: Duration,
        shutdown: watch::Receiver<bool>,
    ) {
        let monitor = Arc::clone(&self);
        let handle = tokio::task::spawn_blocking(move || {
            let canary_path = sentinel::canary_file_path(&watch_dir);
            info!(
                path = %canary_path.display(),
                interval_secs = poll_interval.as_secs(),
                "sentinel file monitor started"
            );
            monitor.file_poll_loop(&canary_path, poll_interval, shutdown);
        });
        if handle.await.is_err() {
            error!("sentinel file monitor worker panicked");
        }
    }

    fn file_poll_loop(
        &self,
        canary_path: &Path,
        poll_interval: Duration,
        shutdown: watch::Receiver<bool>,
    ) {
        let mut last_seen = sentinel::modified_at(canary_path);

        'poll: loop {
            let mut remaining = poll_interval;
            while !remaining.is_zero() {
                if *shutdown.borrow() {
                    debug!("sentinel monitor: shutdown signal, stopping");
                    break 'poll;
                }
                let slice = remaining.min(BLOCKING_SLEEP_SLICE);
                std::thread::sleep(slice);
                remaining = remaining.saturating_sub(slice);
            }

            let current = sentinel::modified_at(canary_path);
            if let (Some(previous), Some(observed)) = (last_seen, current) {
                if observed > previous {
                    self.record_alert(
                        BypassAlert::new(
                            AlertType::CanaryFileModified,
                            Severity::Critical,
                            "sentinel canary file modified outside the gateway",
                        )
                        .with_file_path(canary_path)
                        .with_detail("previous_mtime", mtime_json(previous))
                        .with_detail("observed_mtime", mtime_json(observed)),
                    );
                }
            }
            if current.is_some() {
                last_seen = current;
            }
        }
    }

    /// Snapshot of the current alert state. Never mutates the log.
    #[must_use]
    pub fn generate_report(&self) -> MonitoringReport {
        let log = self.alerts.lock().expect("alert log lock poisoned");

        let recent_start = log.len().saturating_sub(RECENT_ALERT_LIMIT);
        let recent_alerts = log[recent_start..].to_vec();

        let mut severity_breakdown: BTreeMap<String, u64> = BTreeMap::new();
        for recorded in log.iter() {
            *severity_breakdown
                .entry(recorded.severity.to_string())
                .or_insert(0) += 1;
        }

        let alert_counts = self
            .alert_counts
            .iter()
            .map(|entry| (entry.key().to_string(), *entry.value()))
            .collect();
        let session_stats = self
            .session_stats
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect();

        MonitoringReport {
            timestamp: Utc::now(),
            total_alerts: log.len() as u64,
            alert_counts,
            session_stats,
            recent_alerts,
            severity_breakdown,
        }
    }

    /// Total alerts recorded so far.
    #[must_use]
    pub fn total_alerts(&self) -> u64 {
        self.total_alerts.load(Ordering::Acquire)
    }
}

fn mtime_json(mtime: std::time::SystemTime) -> Value {
    json!(DateTime::<Utc>::from(mtime).to_rfc3339())
}
