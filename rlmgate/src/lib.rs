//! CLI surfaces for the RLM gateway trust tooling.
//!
//! Two subcommands over `rlmgate-core`:
//!
//! - `rlmgate monitor` — long-running bypass monitor (gateway health and/or
//!   sentinel-file polling) with a final report on interrupt.
//! - `rlmgate provenance` — CI gate verifying a change list against
//!   recorded provenance, with `--strict` deciding whether warnings fail
//!   the build.

pub mod cli;
pub mod commands;
pub mod error;
