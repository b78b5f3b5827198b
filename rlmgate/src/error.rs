//! CLI-level error types.
//!
//! Everything here is fatal: the error is printed to stderr and the process
//! exits non-zero. Transient transport failures never reach this layer —
//! the monitor absorbs them as alerts or absence.

use std::path::PathBuf;

use thiserror::Error;

use rlmgate_core::error::GatewayError;

#[derive(Debug, Error)]
pub enum CliError {
    /// A flag required by the selected mode is missing.
    #[error("{0}")]
    Usage(String),

    /// An input file could not be read.
    #[error("failed to read {}: {reason}", path.display())]
    ReadInput { path: PathBuf, reason: String },

    /// An input file is not valid JSON of the expected shape.
    #[error("invalid JSON in {}: {reason}", path.display())]
    InvalidJson { path: PathBuf, reason: String },

    /// The monitoring report could not be written.
    #[error("failed to write report to {}: {reason}", path.display())]
    WriteReport { path: PathBuf, reason: String },

    /// Gateway client configuration or construction failed.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}
