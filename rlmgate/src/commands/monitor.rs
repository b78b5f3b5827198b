//! `rlmgate monitor` — the long-running bypass monitor.
//!
//! Spawns the loops the selected mode asks for, waits for Ctrl-C, then
//! stops both cooperatively and emits the final report. The alert log is
//! append-only, so an interrupt at any point leaves consistent state to
//! report.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{error, info, warn};

use rlmgate_core::gateway::{GatewayClient, GatewayConfig};
use rlmgate_core::monitor::sentinel;
use rlmgate_core::monitor::{BypassMonitor, MonitoringReport};

use crate::cli::MonitorArgs;
use crate::error::CliError;

/// Run the monitor until interrupted. Returns the process exit code.
pub async fn run(args: &MonitorArgs) -> Result<i32, CliError> {
    let plan = args.plan().map_err(CliError::Usage)?;

    // The canary token comes from the flag, or failing that from the
    // sentinel file inside the watched workspace.
    let canary_token = plan.canary_token.clone().or_else(|| {
        plan.watch_dir
            .as_deref()
            .and_then(|dir| sentinel::read_canary_token(&sentinel::canary_file_path(dir)))
    });
    if canary_token.is_none() {
        warn!("no canary token configured; leak detection is disabled");
    }

    let mut monitor = BypassMonitor::new(canary_token);
    if let Some(target) = &plan.gateway {
        let config = GatewayConfig {
            api_key: Some(target.api_key.clone()),
            ..GatewayConfig::with_base_url(&target.base_url)
        }
        .apply_env_overrides()?;
        monitor = monitor.with_gateway(GatewayClient::new(config)?);
    }
    let monitor = Arc::new(monitor);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut workers = Vec::new();

    if plan.gateway.is_some() {
        let worker = Arc::clone(&monitor);
        let shutdown = shutdown_rx.clone();
        let interval = plan.interval;
        workers.push(tokio::spawn(async move {
            worker.monitor_gateway_sessions(interval, shutdown).await;
        }));
    }

    if let Some(watch_dir) = plan.watch_dir.clone() {
        let worker = Arc::clone(&monitor);
        let shutdown = shutdown_rx.clone();
        let interval = plan.interval;
        workers.push(tokio::spawn(async move {
            worker.monitor_file_changes(watch_dir, interval, shutdown).await;
        }));
    }

    info!(mode = args.mode.as_str(), "bypass monitor running; Ctrl-C to stop");
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for interrupt");
    }
    info!("interrupt received; stopping monitors");

    let _ = shutdown_tx.send(true);
    for worker in workers {
        let _ = worker.await;
    }

    let report = monitor.generate_report();
    print_report(&report);

    if let Some(path) = &plan.output {
        let json =
            serde_json::to_string_pretty(&report).map_err(|e| CliError::WriteReport {
                path: path.clone(),
                reason: e.to_string(),
            })?;
        std::fs::write(path, json).map_err(|e| CliError::WriteReport {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        info!(path = %path.display(), "monitoring report written");
    }

    Ok(0)
}

/// Human-readable report, printed after shutdown.
fn print_report(report: &MonitoringReport) {
    println!("── bypass monitoring report ─────────────────────────────");
    println!("generated:    {}", report.timestamp.to_rfc3339());
    println!("total alerts: {}", report.total_alerts);

    if !report.alert_counts.is_empty() {
        println!("by type:");
        for (alert_type, count) in &report.alert_counts {
            println!("  {alert_type}: {count}");
        }
    }
    if !report.severity_breakdown.is_empty() {
        println!("by severity:");
        for (severity, count) in &report.severity_breakdown {
            println!("  {severity}: {count}");
        }
    }
    if !report.session_stats.is_empty() {
        println!("sessions polled:");
        for (session_id, count) in &report.session_stats {
            println!("  {session_id}: {count}");
        }
    }
    if !report.recent_alerts.is_empty() {
        println!("recent alerts:");
        for alert in &report.recent_alerts {
            println!(
                "  [{}] {} {}",
                alert.severity,
                alert.timestamp.to_rfc3339(),
                alert.message
            );
        }
    }
}
