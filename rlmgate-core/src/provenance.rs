//! CI-time provenance gate.
//!
//! Cross-checks a list of changed files against the provenance spans the
//! gateway recorded while the work was done. The check is pure detection:
//! it never mutates its inputs, never fails on a mismatch, and always
//! reports `success` — whether warnings fail the build is a policy decision
//! that belongs to the CLI's `--strict` flag, not to the verifier.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One recorded unit of gateway-mediated access to a file.
///
/// Only `file_path` matters to the gate; other recorded fields are carried
/// through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvenanceSpan {
    pub file_path: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// The recorded provenance document (`PROVENANCE.json`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProvenanceDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provenance_graph: Option<Value>,
    #[serde(default)]
    pub spans: Vec<ProvenanceSpan>,
}

/// One modified file under review (`CHANGES.json` entry).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub file: String,
}

/// Result of a gate run. `success` is unconditionally true; warnings are
/// advisory and the strict policy lives at the CLI boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct GateOutcome {
    pub success: bool,
    pub warnings: Vec<String>,
}

fn normalize(path: &str) -> &str {
    path.trim_start_matches('/')
}

/// A change is covered by a span on exact match, or when either normalized
/// path is a suffix of the other — tolerating one side being recorded
/// absolute and the other repo-relative.
fn covers(span_path: &str, change_path: &str) -> bool {
    span_path == change_path
        || change_path.ends_with(span_path)
        || span_path.ends_with(change_path)
}

/// Verify `changes` against the recorded provenance.
///
/// One warning per uncovered change (new files legitimately lack prior
/// provenance, so this is informational), plus one warning when spans exist
/// but the change list is empty — provenance with no matching activity may
/// have been fabricated.
#[must_use]
pub fn check(provenance: &ProvenanceDocument, changes: &[ChangeRecord]) -> GateOutcome {
    let span_paths: BTreeSet<&str> = provenance
        .spans
        .iter()
        .map(|span| normalize(&span.file_path))
        .filter(|path| !path.is_empty())
        .collect();

    let mut warnings = Vec::new();

    for change in changes {
        let change_path = normalize(&change.file);
        let covered = span_paths
            .iter()
            .any(|span_path| covers(span_path, change_path));
        if !covered {
            warnings.push(format!(
                "changed file has no recorded provenance: {}",
                change.file
            ));
        }
    }

    if !provenance.spans.is_empty() && changes.is_empty() {
        warnings.push(
            "provenance spans recorded but the change list is empty".to_string(),
        );
    }

    GateOutcome {
        success: true,
        warnings,
    }
}
