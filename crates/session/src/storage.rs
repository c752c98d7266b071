//! Pluggable key/value storage backends for session state.
//!
//! The session store persists three fixed entries (token, expiry,
//! profile) through the [`StorageBackend`] trait. Two implementations
//! ship with the crate:
//!
//! - [`KeyringStorage`]: platform credential store (macOS Keychain,
//!   Windows Credential Manager, Linux Secret Service)
//! - [`MemoryStorage`]: in-process map for tests and ephemeral sessions

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use crate::error::SessionError;

/// Abstraction over keyed secret storage.
///
/// Implementations must be safe to share across tasks; each method is a
/// single get/set/remove of one string entry. `remove` of a missing key
/// is not an error.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Read an entry, returning `None` when the key is absent.
    async fn get(&self, key: &str) -> Result<Option<String>, SessionError>;

    /// Write an entry, overwriting any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), SessionError>;

    /// Delete an entry; succeeds when the key does not exist.
    async fn remove(&self, key: &str) -> Result<(), SessionError>;
}

/// Storage backend backed by the platform credential store.
///
/// Entries are namespaced by a service name so multiple environments
/// (or test runs) do not collide.
pub struct KeyringStorage {
    service: String,
}

impl KeyringStorage {
    /// Create a backend storing entries under the given service name.
    #[must_use]
    pub fn new(service: impl Into<String>) -> Self {
        Self { service: service.into() }
    }

    /// The keychain service name entries are stored under.
    #[must_use]
    pub fn service(&self) -> &str {
        &self.service
    }

    fn entry(&self, key: &str) -> Result<keyring::Entry, SessionError> {
        keyring::Entry::new(&self.service, key).map_err(|e| SessionError::Storage(e.to_string()))
    }
}

#[async_trait]
impl StorageBackend for KeyringStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(SessionError::Storage(e.to_string())),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), SessionError> {
        debug!(service = %self.service, key = %key, "storing keyring entry");
        self.entry(key)?.set_password(value).map_err(|e| SessionError::Storage(e.to_string()))
    }

    async fn remove(&self, key: &str) -> Result<(), SessionError> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(SessionError::Storage(e.to_string())),
        }
    }
}

/// In-memory storage backend for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create an empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the backend holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl StorageBackend for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self.entries.read().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), SessionError> {
        self.entries.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), SessionError> {
        self.entries.write().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for storage backends. Keyring coverage stops at
    //! construction; exercising the real platform store is not
    //! deterministic on CI hosts.
    use super::*;

    #[tokio::test]
    async fn memory_storage_roundtrip() {
        let storage = MemoryStorage::new();

        storage.set("k", "v").await.unwrap();
        assert_eq!(storage.get("k").await.unwrap(), Some("v".to_string()));

        storage.remove("k").await.unwrap();
        assert_eq!(storage.get("k").await.unwrap(), None);
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn memory_storage_remove_is_idempotent() {
        let storage = MemoryStorage::new();
        storage.remove("missing").await.unwrap();
        storage.remove("missing").await.unwrap();
    }

    #[test]
    fn keyring_storage_keeps_service_name() {
        let storage = KeyringStorage::new("TranslateCloudTest");
        assert_eq!(storage.service(), "TranslateCloudTest");
    }
}
