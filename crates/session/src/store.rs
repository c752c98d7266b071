//! Session store: credential lifecycle over a storage backend.
//!
//! Owns the three fixed entries the TranslateCloud frontend persists:
//! the bearer token, its absolute expiry (epoch milliseconds), and the
//! cached user profile JSON. Expired or corrupt entries are treated as
//! an absent session; `is_valid` additionally clears a detected-expired
//! entry so later reads stay consistent.

use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, info, warn};

use crate::credential::Credential;
use crate::error::SessionError;
use crate::storage::StorageBackend;

/// Persisted entry names. Fixed so existing sessions survive upgrades.
const TOKEN_KEY: &str = "translatecloud_token";
const EXPIRY_KEY: &str = "translatecloud_token_expiry";
const PROFILE_KEY: &str = "translatecloud_user";

/// Remaining lifetime below which a proactive refresh is signalled.
pub const DEFAULT_REFRESH_THRESHOLD_SECS: i64 = 300;

/// Client-side session state: one bearer credential plus a cached
/// profile blob.
///
/// Construct one per application and share it; all methods take `&self`.
pub struct SessionStore {
    storage: Arc<dyn StorageBackend>,
    refresh_threshold: Duration,
}

impl SessionStore {
    /// Create a store over the given backend with the default 5-minute
    /// refresh threshold.
    #[must_use]
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self { storage, refresh_threshold: Duration::seconds(DEFAULT_REFRESH_THRESHOLD_SECS) }
    }

    /// Override the refresh threshold.
    #[must_use]
    pub fn with_refresh_threshold(mut self, threshold: Duration) -> Self {
        self.refresh_threshold = threshold;
        self
    }

    /// Persist a token and its computed absolute expiry.
    ///
    /// # Errors
    /// Returns [`SessionError::Storage`] when the backend rejects the
    /// write; the caller should surface this to the user.
    pub async fn set(&self, token: &str, ttl_seconds: i64) -> Result<(), SessionError> {
        let credential = Credential::new(token, ttl_seconds);

        self.storage.set(TOKEN_KEY, token).await?;
        self.storage.set(EXPIRY_KEY, &credential.expiry_millis().to_string()).await?;

        info!(ttl_seconds, "session credential stored");
        Ok(())
    }

    /// Return the stored token, or `None` when storage is empty, the
    /// entry is corrupt, or the credential has expired.
    ///
    /// Read failures degrade to `None` rather than propagating.
    pub async fn get(&self) -> Option<String> {
        self.read_credential().await.filter(|c| !c.is_expired()).map(|c| c.token)
    }

    /// Remove token, expiry, and cached profile. Idempotent.
    ///
    /// # Errors
    /// Returns [`SessionError::Storage`] when the backend rejects a
    /// deletion.
    pub async fn clear(&self) -> Result<(), SessionError> {
        self.storage.remove(TOKEN_KEY).await?;
        self.storage.remove(EXPIRY_KEY).await?;
        self.storage.remove(PROFILE_KEY).await?;

        info!("session cleared");
        Ok(())
    }

    /// Whether a token exists and the current time is strictly before
    /// its stored expiry.
    ///
    /// Side effect: a detected-expired entry is cleared during the
    /// check, so a subsequent [`get`](Self::get) observes an empty
    /// store.
    pub async fn is_valid(&self) -> bool {
        match self.read_credential().await {
            Some(credential) if !credential.is_expired() => true,
            Some(_) => {
                debug!("stored credential expired, clearing session");
                if let Err(e) = self.clear().await {
                    warn!(error = %e, "failed to clear expired session");
                }
                false
            }
            None => false,
        }
    }

    /// Whether the credential is alive but inside the refresh window.
    ///
    /// Signals that the caller should re-authenticate soon; this method
    /// never performs the renewal itself.
    pub async fn needs_refresh(&self) -> bool {
        match self.read_credential().await {
            Some(credential) => credential.expires_within(self.refresh_threshold),
            None => false,
        }
    }

    /// Persist the user profile blob alongside the credential.
    ///
    /// # Errors
    /// Returns [`SessionError::Storage`] on write failure.
    pub async fn set_profile(&self, profile: &serde_json::Value) -> Result<(), SessionError> {
        let raw = serde_json::to_string(profile)?;
        self.storage.set(PROFILE_KEY, &raw).await
    }

    /// Return the cached profile, or `None` when absent or unreadable.
    pub async fn profile(&self) -> Option<serde_json::Value> {
        let raw = match self.storage.get(PROFILE_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "profile read failed, treating as absent");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(error = %e, "stored profile is corrupt, treating as absent");
                None
            }
        }
    }

    /// Read the persisted credential, including an expired one.
    ///
    /// `None` covers: empty storage, read failure, and a corrupt expiry
    /// entry. Callers decide how to treat expiry.
    async fn read_credential(&self) -> Option<Credential> {
        let token = match self.storage.get(TOKEN_KEY).await {
            Ok(Some(token)) => token,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "token read failed, treating session as absent");
                return None;
            }
        };

        let raw_expiry = match self.storage.get(EXPIRY_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "expiry read failed, treating session as absent");
                return None;
            }
        };

        let millis = match raw_expiry.parse::<i64>() {
            Ok(millis) => millis,
            Err(_) => {
                warn!("stored expiry is not a timestamp, treating session as absent");
                return None;
            }
        };

        Credential::from_expiry_millis(token, millis)
    }
}
