//! Integration tests for the session store lifecycle.
//!
//! **Coverage:**
//! - Full login-shaped lifecycle: set → get → profile → clear
//! - Expiry invariant: a past-expiry credential reads as absent
//! - Refresh-window signalling with a custom threshold
//! - Concurrent readers over a shared store

use std::sync::Arc;

use chrono::Duration;
use translatecloud_session::{MemoryStorage, SessionStore};

fn store() -> SessionStore {
    SessionStore::new(Arc::new(MemoryStorage::new()))
}

#[tokio::test]
async fn login_logout_lifecycle() {
    let store = store();

    store.set("bearer-token", 86_400).await.unwrap();
    store
        .set_profile(&serde_json::json!({"email": "user@example.com"}))
        .await
        .unwrap();

    assert!(store.is_valid().await);
    assert_eq!(store.get().await.as_deref(), Some("bearer-token"));
    assert!(store.profile().await.is_some());

    store.clear().await.unwrap();

    assert!(!store.is_valid().await);
    assert_eq!(store.get().await, None);
    assert_eq!(store.profile().await, None);
}

#[tokio::test]
async fn re_authentication_replaces_credential() {
    let store = store();

    store.set("first", 3600).await.unwrap();
    store.set("second", 3600).await.unwrap();

    assert_eq!(store.get().await.as_deref(), Some("second"));
}

#[tokio::test]
async fn past_expiry_reads_as_absent() {
    let store = store();

    store.set("stale", -60).await.unwrap();

    assert!(!store.is_valid().await);
    assert_eq!(store.get().await, None);
}

#[tokio::test]
async fn custom_refresh_threshold_widens_window() {
    let storage = Arc::new(MemoryStorage::new());
    let store =
        SessionStore::new(storage).with_refresh_threshold(Duration::seconds(7200));

    // One hour of lifetime left is inside a two-hour window.
    store.set("token", 3600).await.unwrap();
    assert!(store.needs_refresh().await);
}

#[tokio::test]
async fn concurrent_readers_share_one_session() {
    let store = Arc::new(store());
    store.set("shared", 3600).await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let store = store.clone();
        handles.push(tokio::spawn(async move { store.get().await }));
    }

    for handle in handles {
        assert_eq!(handle.await.unwrap().as_deref(), Some("shared"));
    }
}
