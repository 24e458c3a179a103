//! Revocation registry for session tokens.
//!
//! Tokens are stateless, so logout works by remembering the exact token
//! string until its natural expiry would have rejected it anyway. The
//! registry is consulted by the verifier before any cryptographic check.

use chrono::Utc;
use dashmap::DashMap;

/// Process-wide set of revoked tokens.
///
/// Entries are keyed by the raw token string and carry the token's expiry
/// timestamp; entries past their expiry are swept on each insert, keeping
/// the set bounded by the number of live sessions.
#[derive(Debug, Default)]
pub struct RevocationList {
    revoked: DashMap<String, i64>,
}

impl RevocationList {
    /// Create an empty revocation list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Revoke a token until `expires_at` (Unix timestamp). Idempotent.
    pub fn revoke(&self, token: &str, expires_at: i64) {
        self.purge_expired(Utc::now().timestamp());
        self.revoked.insert(token.to_string(), expires_at);
    }

    /// Check whether a token has been revoked.
    pub fn is_revoked(&self, token: &str) -> bool {
        self.revoked.contains_key(token)
    }

    /// Drop entries whose token would be rejected as expired anyway.
    pub fn purge_expired(&self, now: i64) {
        self.revoked.retain(|_, expires_at| *expires_at > now);
    }

    /// Number of currently revoked tokens.
    pub fn len(&self) -> usize {
        self.revoked.len()
    }

    /// Whether no tokens are revoked.
    pub fn is_empty(&self) -> bool {
        self.revoked.is_empty()
    }
}
