//! Bearer-credential session management for TranslateCloud clients.
//!
//! This crate owns the client-side session: an opaque bearer token, its
//! absolute expiry, and the cached user profile blob, persisted as three
//! fixed key/value entries in a pluggable storage backend.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │   SessionStore   │  Lifecycle: set / get / clear / is_valid / needs_refresh
//! └────────┬─────────┘
//!          │
//!          └──► StorageBackend   (KeyringStorage, MemoryStorage)
//! ```
//!
//! Storage reads are best-effort: a failed or corrupt read degrades to
//! "no session" rather than propagating. Writes surface a
//! [`SessionError`] so the caller can tell the user their session could
//! not be saved.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod credential;
pub mod error;
pub mod storage;
pub mod store;

pub use credential::Credential;
pub use error::SessionError;
pub use storage::{KeyringStorage, MemoryStorage, StorageBackend};
pub use store::{SessionStore, DEFAULT_REFRESH_THRESHOLD_SECS};
