//! Canary-token leak detection.
//!
//! The canary is a secret sentinel value that only ever travels through
//! gateway-mediated channels. Seeing it anywhere else is proof of a bypass,
//! which makes this the one detector whose findings are not heuristic.

use super::{Detector, Finding, FindingKind};

/// Substring tripwire for a configured canary token.
#[derive(Debug, Clone)]
pub struct CanaryDetector {
    token: Option<String>,
}

impl CanaryDetector {
    /// Empty tokens are treated as unconfigured: an empty needle would match
    /// every haystack.
    #[must_use]
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token.filter(|t| !t.is_empty()),
        }
    }

    /// True iff the configured canary token occurs in `text`.
    #[must_use]
    pub fn matches(&self, text: &str) -> bool {
        self.token.as_deref().is_some_and(|t| text.contains(t))
    }
}

impl Detector for CanaryDetector {
    fn name(&self) -> &'static str {
        "canary_token"
    }

    fn scan(&self, text: &str) -> Vec<Finding> {
        if self.matches(text) {
            vec![Finding {
                kind: FindingKind::CanaryLeak,
                message: "canary token present in scanned text".to_string(),
            }]
        } else {
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_substring() {
        let detector = CanaryDetector::new(Some("ABC123".to_string()));
        assert!(detector.matches("prefix ABC123 suffix"));
        assert!(detector.matches("ABC123"));
    }

    #[test]
    fn test_no_match_without_occurrence() {
        let detector = CanaryDetector::new(Some("ABC123".to_string()));
        assert!(!detector.matches("abc123"));
        assert!(!detector.matches(""));
    }

    #[test]
    fn test_unconfigured_never_fires() {
        let detector = CanaryDetector::new(None);
        assert!(!detector.matches("anything at all"));
        assert!(detector.scan("anything at all").is_empty());
    }

    #[test]
    fn test_empty_token_treated_as_unconfigured() {
        let detector = CanaryDetector::new(Some(String::new()));
        assert!(!detector.matches("text"));
    }

    #[test]
    fn test_scan_produces_single_finding() {
        let detector = CanaryDetector::new(Some("SENTINEL_42".to_string()));
        let findings = detector.scan("leaked: SENTINEL_42 and SENTINEL_42 again");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, FindingKind::CanaryLeak);
    }
}
