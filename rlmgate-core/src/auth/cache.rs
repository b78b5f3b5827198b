//! Per-token cache of OAuth introspection results.
//!
//! An entry without an expiry stays valid indefinitely; an entry with one is
//! valid while `now < expires_at`. Expired entries are evicted on lookup so
//! the caller re-introspects instead of trusting a stale verdict.

use chrono::{DateTime, Utc};
use dashmap::DashMap;

/// Cached outcome of a single token introspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenValidation {
    /// Whether the authorization server reported the token as active.
    pub active: bool,
    /// Expiry reported by the server (`exp` claim), if any.
    pub expires_at: Option<DateTime<Utc>>,
}

impl TokenValidation {
    /// Whether this cached result may still be served at `now`.
    #[must_use]
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            None => true,
            Some(expires_at) => now < expires_at,
        }
    }
}

/// Concurrent token → validation cache.
#[derive(Debug, Default)]
pub struct TokenCache {
    entries: DashMap<String, TokenValidation>,
}

impl TokenCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a live cached validation for `token`.
    ///
    /// An expired entry is removed and `None` is returned, which forces the
    /// caller back to the introspection endpoint.
    pub fn get(&self, token: &str, now: DateTime<Utc>) -> Option<TokenValidation> {
        {
            let entry = self.entries.get(token)?;
            if entry.is_live(now) {
                return Some(entry.clone());
            }
        }
        // Guard dropped above; removing while holding it would deadlock.
        self.entries.remove(token);
        None
    }

    /// Store a validation result for `token`, replacing any previous entry.
    pub fn insert(&self, token: impl Into<String>, validation: TokenValidation) {
        self.entries.insert(token.into(), validation);
    }

    /// Number of cached entries, live or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn validation(active: bool, expires_at: Option<DateTime<Utc>>) -> TokenValidation {
        TokenValidation { active, expires_at }
    }

    #[test]
    fn test_entry_without_expiry_never_expires() {
        let cache = TokenCache::new();
        let now = Utc::now();
        cache.insert("tok", validation(true, None));

        let hit = cache.get("tok", now + Duration::days(365));
        assert_eq!(hit, Some(validation(true, None)));
    }

    #[test]
    fn test_entry_live_before_expiry() {
        let cache = TokenCache::new();
        let now = Utc::now();
        cache.insert("tok", validation(true, Some(now + Duration::seconds(60))));

        assert!(cache.get("tok", now).is_some());
    }

    #[test]
    fn test_expired_entry_is_evicted() {
        let cache = TokenCache::new();
        let now = Utc::now();
        cache.insert("tok", validation(true, Some(now - Duration::seconds(1))));

        assert!(cache.get("tok", now).is_none());
        assert!(cache.is_empty(), "expired entry should have been removed");
    }

    #[test]
    fn test_expiry_boundary_is_exclusive() {
        let cache = TokenCache::new();
        let now = Utc::now();
        cache.insert("tok", validation(true, Some(now)));

        // now == expires_at means expired: validity requires now < expires_at.
        assert!(cache.get("tok", now).is_none());
    }

    #[test]
    fn test_unknown_token_misses() {
        let cache = TokenCache::new();
        assert!(cache.get("unknown", Utc::now()).is_none());
    }

    #[test]
    fn test_insert_replaces_previous_entry() {
        let cache = TokenCache::new();
        let now = Utc::now();
        cache.insert("tok", validation(true, None));
        cache.insert("tok", validation(false, None));

        assert_eq!(cache.get("tok", now), Some(validation(false, None)));
        assert_eq!(cache.len(), 1);
    }
}
