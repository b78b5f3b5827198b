//! Direct file-access pattern detection.
//!
//! Flags code that reaches the filesystem without going through the
//! gateway's tools: literal-path `open()` calls, whole-file content reads,
//! and path-segment joins. A heuristic signal, not a proof — false
//! positives and negatives are expected.

use std::sync::LazyLock;

use regex::Regex;

use super::{Detector, Finding, FindingKind};

/// Pattern table: (label, regex source). Labels end up in alert details.
const PATTERNS: &[(&str, &str)] = &[
    ("literal-path open", r#"open\s*\(\s*["'][^"']+["']"#),
    ("file content read", r"\.read\s*\(\s*\)"),
    ("file text read", r"\.read_text\s*\("),
    ("file bytes read", r"\.read_bytes\s*\("),
    ("path segment join", r"os\.path\.join\s*\("),
    ("path construction", r"pathlib\.Path\s*\("),
    ("open context manager", r"with\s+open\b"),
];

static COMPILED: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    PATTERNS
        .iter()
        .map(|(label, source)| {
            (
                *label,
                Regex::new(source).expect("hardcoded file-access pattern compiles"),
            )
        })
        .collect()
});

/// Fixed-pattern scanner for code that touches files directly.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileAccessDetector;

impl FileAccessDetector {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// True iff any pattern in the table matches `text`.
    #[must_use]
    pub fn matches(&self, text: &str) -> bool {
        COMPILED.iter().any(|(_, re)| re.is_match(text))
    }

    fn first_match(&self, text: &str) -> Option<&'static str> {
        COMPILED
            .iter()
            .find(|(_, re)| re.is_match(text))
            .map(|(label, _)| *label)
    }
}

impl Detector for FileAccessDetector {
    fn name(&self) -> &'static str {
        "direct_file_access"
    }

    fn scan(&self, text: &str) -> Vec<Finding> {
        match self.first_match(text) {
            Some(label) => vec![Finding {
                kind: FindingKind::DirectFileAccess,
                message: format!("{label} pattern in scanned text"),
            }],
            None => Vec::new(),
        }
    }
}
