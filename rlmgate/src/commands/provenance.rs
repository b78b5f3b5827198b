//! `rlmgate provenance` — the CI gate.
//!
//! Loads the two JSON documents, runs the pure check, prints the textual
//! report, and maps `--strict` onto the exit code. Missing or malformed
//! inputs are configuration errors: fatal, exit 1, no retry.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;

use rlmgate_core::provenance::{self, ChangeRecord, ProvenanceDocument};

use crate::cli::ProvenanceArgs;
use crate::error::CliError;

/// Run the gate. Returns the process exit code.
pub fn run(args: &ProvenanceArgs) -> Result<i32, CliError> {
    let provenance: ProvenanceDocument = load_json(&args.provenance)?;
    let changes: Vec<ChangeRecord> = load_json(&args.changes)?;

    let outcome = provenance::check(&provenance, &changes);

    println!(
        "provenance gate: {} span(s) against {} change(s)",
        provenance.spans.len(),
        changes.len()
    );
    for warning in &outcome.warnings {
        println!("  warning: {warning}");
    }

    let failed = !outcome.success || (args.strict && !outcome.warnings.is_empty());
    if failed {
        println!(
            "provenance gate: FAILED ({} warning(s), strict mode)",
            outcome.warnings.len()
        );
        Ok(1)
    } else if outcome.warnings.is_empty() {
        println!("provenance gate: PASSED");
        Ok(0)
    } else {
        println!(
            "provenance gate: PASSED with {} warning(s)",
            outcome.warnings.len()
        );
        Ok(0)
    }
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let contents = fs::read_to_string(path).map_err(|e| CliError::ReadInput {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    serde_json::from_str(&contents).map_err(|e| CliError::InvalidJson {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
