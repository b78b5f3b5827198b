//! CLI argument types for `rlmgate monitor` and `rlmgate provenance`.
//!
//! These types are defined separately from `main.rs` so that integration
//! tests can construct and validate them directly.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, ValueEnum};

// ─────────────────────────────────────────────────────────────────────────────
// Monitor Subcommand Args
// ─────────────────────────────────────────────────────────────────────────────

/// Arguments for `rlmgate monitor`.
///
/// Which flags are required depends on `--mode`; the conditional checks live
/// in [`MonitorArgs::plan`] rather than in clap so the usage errors can name
/// the offending mode.
#[derive(Args, Debug)]
pub struct MonitorArgs {
    /// Gateway base URL (required in gateway/both modes).
    #[arg(long)]
    pub gateway_url: Option<String>,

    /// API key sent to the gateway as a bearer token (required in
    /// gateway/both modes).
    #[arg(long)]
    pub api_key: Option<String>,

    /// Workspace directory holding the sentinel canary file (required in
    /// file/both modes).
    #[arg(long)]
    pub watch_dir: Option<PathBuf>,

    /// Canary token to scan for; defaults to the token in the sentinel file.
    #[arg(long)]
    pub canary_token: Option<String>,

    /// Which polling loops to run.
    #[arg(long, value_enum, default_value = "both")]
    pub mode: MonitorMode,

    /// Polling interval in seconds for both loops.
    #[arg(long, default_value_t = 30)]
    pub interval: u64,

    /// Write the final monitoring report JSON to this path.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(long)]
    pub verbose: bool,
}

/// Which polling loops the monitor runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum MonitorMode {
    /// Gateway health/session polling only.
    Gateway,
    /// Sentinel-file polling only.
    File,
    /// Both loops.
    Both,
}

impl MonitorMode {
    #[must_use]
    pub fn wants_gateway(self) -> bool {
        matches!(self, Self::Gateway | Self::Both)
    }

    #[must_use]
    pub fn wants_file(self) -> bool {
        matches!(self, Self::File | Self::Both)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gateway => "gateway",
            Self::File => "file",
            Self::Both => "both",
        }
    }
}

/// Validated monitor run plan derived from the raw args.
#[derive(Debug, Clone)]
pub struct MonitorPlan {
    pub gateway: Option<GatewayTarget>,
    pub watch_dir: Option<PathBuf>,
    pub canary_token: Option<String>,
    pub interval: Duration,
    pub output: Option<PathBuf>,
}

/// Gateway connection parameters for the polling loop.
#[derive(Debug, Clone)]
pub struct GatewayTarget {
    pub base_url: String,
    pub api_key: String,
}

impl MonitorArgs {
    /// Check the mode-dependent flag requirements and build the run plan.
    ///
    /// # Errors
    ///
    /// Returns a usage message when a flag required by the selected mode is
    /// missing.
    pub fn plan(&self) -> Result<MonitorPlan, String> {
        let gateway = if self.mode.wants_gateway() {
            let base_url = self.gateway_url.clone().ok_or_else(|| {
                format!("--gateway-url is required for mode '{}'", self.mode.as_str())
            })?;
            let api_key = self.api_key.clone().ok_or_else(|| {
                format!("--api-key is required for mode '{}'", self.mode.as_str())
            })?;
            Some(GatewayTarget { base_url, api_key })
        } else {
            None
        };

        let watch_dir = if self.mode.wants_file() {
            Some(self.watch_dir.clone().ok_or_else(|| {
                format!("--watch-dir is required for mode '{}'", self.mode.as_str())
            })?)
        } else {
            None
        };

        Ok(MonitorPlan {
            gateway,
            watch_dir,
            canary_token: self.canary_token.clone(),
            interval: Duration::from_secs(self.interval),
            output: self.output.clone(),
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Provenance Subcommand Args
// ─────────────────────────────────────────────────────────────────────────────

/// Arguments for `rlmgate provenance`.
#[derive(Args, Debug)]
pub struct ProvenanceArgs {
    /// Path to the recorded provenance document (PROVENANCE.json).
    #[arg(long)]
    pub provenance: PathBuf,

    /// Path to the change list under review (CHANGES.json).
    #[arg(long)]
    pub changes: PathBuf,

    /// Fail (exit 1) when the gate produces any warnings.
    #[arg(long)]
    pub strict: bool,

    /// Enable debug logging.
    #[arg(long)]
    pub verbose: bool,
}
