//! TranslateCloud HTTP client.
//!
//! Talks to the TranslateCloud backend with the request contract the
//! product frontends rely on: JSON by default, bearer tokens read from
//! the session store, a hard per-attempt timeout, classified errors,
//! and linear-backoff retry for transient failures.
//!
//! # Architecture
//!
//! ```text
//! AuthService ──► ApiClient ──► reqwest
//!      │              │
//!      │              ├── SessionStore (bearer lookup, 401 clearing)
//!      │              └── SessionEventSender (expiry / logout signals)
//!      └── SessionStore (persist tokens + profile)
//! ```
//!
//! Hosts construct a [`SessionStore`](translatecloud_session::SessionStore),
//! an [`ApiClient`], and optionally an [`AuthService`], then listen on a
//! [`session_event_channel`] to react when the session expires or the
//! user logs out.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod request;

pub use auth::{AuthResponse, AuthService};
pub use client::{ApiClient, ApiClientBuilder, Payload};
pub use config::{ApiClientConfig, DEFAULT_BASE_URL};
pub use error::{ApiError, ErrorCategory, TIMEOUT_STATUS};
pub use events::{session_event_channel, SessionEvent, SessionEventReceiver, SessionEventSender};
pub use request::RequestDescriptor;
