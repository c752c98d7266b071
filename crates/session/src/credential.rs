//! Bearer credential with absolute expiry.
//!
//! A credential is an opaque token plus the UTC instant it stops being
//! valid. Expiry is persisted as epoch milliseconds so the stored form
//! survives restarts without reinterpreting the original TTL.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// An opaque bearer token and its absolute expiry.
///
/// Invariant: a credential whose expiry is not strictly in the future is
/// treated as absent by the session store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Opaque bearer token sent in the `Authorization` header.
    pub token: String,

    /// Absolute expiration timestamp (UTC).
    pub expires_at: DateTime<Utc>,
}

impl Credential {
    /// Create a credential from a token and its lifetime in seconds.
    ///
    /// The TTL comes straight from backend responses, so lifetimes that
    /// overflow the timestamp range are clamped instead of trusted: an
    /// unrepresentably large TTL saturates to the far future, an
    /// unrepresentably negative one to the far past (already expired).
    #[must_use]
    pub fn new(token: impl Into<String>, ttl_seconds: i64) -> Self {
        let expires_at = Duration::try_seconds(ttl_seconds)
            .and_then(|ttl| Utc::now().checked_add_signed(ttl))
            .unwrap_or(if ttl_seconds >= 0 {
                DateTime::<Utc>::MAX_UTC
            } else {
                DateTime::<Utc>::MIN_UTC
            });
        Self { token: token.into(), expires_at }
    }

    /// Rebuild a credential from its persisted form.
    ///
    /// Returns `None` when the stored millisecond timestamp is outside
    /// the representable range (a corrupt entry).
    #[must_use]
    pub fn from_expiry_millis(token: impl Into<String>, expiry_millis: i64) -> Option<Self> {
        let expires_at = Utc.timestamp_millis_opt(expiry_millis).single()?;
        Some(Self { token: token.into(), expires_at })
    }

    /// Expiry as epoch milliseconds, the persisted representation.
    #[must_use]
    pub fn expiry_millis(&self) -> i64 {
        self.expires_at.timestamp_millis()
    }

    /// Whether the credential has already expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// Remaining lifetime; negative once expired.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.expires_at - Utc::now()
    }

    /// Whether the credential is still alive but will expire within the
    /// given threshold.
    ///
    /// This is the refresh window check: true iff
    /// `0 < expires_at - now < threshold`.
    #[must_use]
    pub fn expires_within(&self, threshold: Duration) -> bool {
        let remaining = self.remaining();
        remaining > Duration::zero() && remaining < threshold
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for credential expiry arithmetic.
    use super::*;

    #[test]
    fn new_credential_is_not_expired() {
        let credential = Credential::new("abc", 86_400);
        assert!(!credential.is_expired());
        assert_eq!(credential.token, "abc");
    }

    #[test]
    fn negative_ttl_is_expired() {
        let credential = Credential::new("abc", -10);
        assert!(credential.is_expired());
    }

    /// A lifetime outside the representable timestamp range must clamp,
    /// not panic: the TTL is backend-supplied and cannot be trusted.
    #[test]
    fn extreme_ttls_clamp_instead_of_overflowing() {
        let far_future = Credential::new("abc", i64::MAX);
        assert!(!far_future.is_expired());
        assert_eq!(far_future.expires_at, DateTime::<Utc>::MAX_UTC);

        let far_past = Credential::new("abc", i64::MIN);
        assert!(far_past.is_expired());
        assert_eq!(far_past.expires_at, DateTime::<Utc>::MIN_UTC);
    }

    /// Validates the refresh window boundaries: a credential well inside
    /// its lifetime is outside the window, one close to expiry is inside,
    /// and an expired one is outside.
    #[test]
    fn expires_within_refresh_window() {
        let threshold = Duration::seconds(300);

        let fresh = Credential::new("t", 86_400);
        assert!(!fresh.expires_within(threshold));

        let closing = Credential::new("t", 60);
        assert!(closing.expires_within(threshold));

        let expired = Credential::new("t", -1);
        assert!(!expired.expires_within(threshold));
    }

    #[test]
    fn expiry_millis_roundtrip() {
        let credential = Credential::new("abc", 3600);
        let millis = credential.expiry_millis();

        let restored = Credential::from_expiry_millis("abc", millis)
            .expect("persisted millis should be representable");
        assert_eq!(restored.token, credential.token);
        // Sub-millisecond precision is lost in the persisted form.
        assert_eq!(restored.expiry_millis(), millis);
    }

    #[test]
    fn from_expiry_millis_rejects_out_of_range() {
        assert!(Credential::from_expiry_millis("abc", i64::MAX).is_none());
    }
}
