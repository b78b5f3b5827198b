//! `rlmgate` CLI entry point.
//!
//! Dispatches to `monitor` (long-running bypass monitor) or `provenance`
//! (CI gate) subcommands.

use clap::{Parser, Subcommand};

use rlmgate::cli::{MonitorArgs, ProvenanceArgs};
use rlmgate::commands;

// ─────────────────────────────────────────────────────────────────────────────
// CLI Definitions
// ─────────────────────────────────────────────────────────────────────────────

/// rlmgate: bypass monitoring and provenance verification for RLM
/// gateway-mediated access.
#[derive(Parser)]
#[command(name = "rlmgate", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the bypass monitor until interrupted.
    Monitor(MonitorArgs),
    /// Verify a change list against recorded provenance (CI gate).
    Provenance(ProvenanceArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Entry Point
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let code = match cli.command {
        Commands::Monitor(args) => {
            init_tracing(args.verbose);
            match commands::monitor::run(&args).await {
                Ok(code) => code,
                Err(e) => {
                    tracing::error!(error = %e, "monitor failed");
                    eprintln!("rlmgate monitor: {e}");
                    1
                }
            }
        }
        Commands::Provenance(args) => {
            init_tracing(args.verbose);
            match commands::provenance::run(&args) {
                Ok(code) => code,
                Err(e) => {
                    tracing::error!(error = %e, "provenance gate failed");
                    eprintln!("rlmgate provenance: {e}");
                    1
                }
            }
        }
    };

    std::process::exit(code);
}

// ─────────────────────────────────────────────────────────────────────────────
// Tracing Init
// ─────────────────────────────────────────────────────────────────────────────

/// Initialise tracing subscriber with stderr output.
///
/// When `verbose` is true, sets filter to `debug`. Otherwise, respects the
/// `RUST_LOG` environment variable, defaulting to `info`.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
