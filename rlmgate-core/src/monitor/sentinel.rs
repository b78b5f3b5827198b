//! Sentinel canary file helpers.
//!
//! The watched workspace carries a canary file whose only legitimate access
//! path is through the gateway. The file holds a single `Token: <TOKEN>`
//! line; any mtime movement on it is evidence of unmediated access.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::SystemTime;

use regex::Regex;

/// File name of the sentinel canary inside the watched workspace.
pub const CANARY_FILE_NAME: &str = ".rlm_canary_token.txt";

static CANARY_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Token:\s*([A-Z0-9_]+)").expect("hardcoded canary pattern compiles"));

/// Path of the sentinel canary file inside `watch_dir`.
#[must_use]
pub fn canary_file_path(watch_dir: &Path) -> PathBuf {
    watch_dir.join(CANARY_FILE_NAME)
}

/// Extract the canary token from the sentinel file's contents.
#[must_use]
pub fn parse_canary_token(contents: &str) -> Option<String> {
    CANARY_LINE
        .captures(contents)
        .map(|captures| captures[1].to_string())
}

/// Read and parse the sentinel file; `None` when unreadable or malformed.
#[must_use]
pub fn read_canary_token(path: &Path) -> Option<String> {
    fs::read_to_string(path)
        .ok()
        .and_then(|contents| parse_canary_token(&contents))
}

/// Modification time of `path`; `None` when the file is missing or the
/// platform withholds mtimes.
#[must_use]
pub fn modified_at(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).ok().and_then(|meta| meta.modified().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_token_line() {
        assert_eq!(
            parse_canary_token("Token: RLM_CANARY_42\n"),
            Some("RLM_CANARY_42".to_string())
        );
    }

    #[test]
    fn test_parse_tolerates_surrounding_text() {
        assert_eq!(
            parse_canary_token("# sentinel\nToken:ABC_1\n"),
            Some("ABC_1".to_string())
        );
    }

    #[test]
    fn test_parse_rejects_lowercase_token() {
        // Lowercase characters end the token: only the uppercase run counts.
        assert_eq!(parse_canary_token("Token: abc"), None);
    }

    #[test]
    fn test_parse_rejects_missing_line() {
        assert_eq!(parse_canary_token("no token here"), None);
    }

    #[test]
    fn test_read_missing_file() {
        assert_eq!(read_canary_token(Path::new("/nonexistent/canary")), None);
        assert_eq!(modified_at(Path::new("/nonexistent/canary")), None);
    }

    #[test]
    fn test_read_from_tempdir() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = canary_file_path(dir.path());
        std::fs::write(&path, "Token: CANARY_TOKEN_7\n").expect("write canary");

        assert_eq!(
            read_canary_token(&path),
            Some("CANARY_TOKEN_7".to_string())
        );
        assert!(modified_at(&path).is_some());
    }
}
