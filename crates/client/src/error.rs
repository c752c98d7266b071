//! Classified API errors with retry metadata.
//!
//! Every failure surfaced by the client carries an HTTP status (or a
//! sentinel: timeouts map to 408, pure network failures to no status at
//! all), a message suitable for direct display, and the structured
//! details when the backend returned a JSON error body.

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use translatecloud_session::SessionError;

/// Categories of API errors, used to drive retry decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// 401 - session is no longer accepted; forces logout
    Auth,
    /// 429 - retryable with backoff
    RateLimit,
    /// 5xx - retryable
    Server,
    /// Other 4xx - non-retryable
    Client,
    /// Connection-level failure, no status - retryable
    Network,
    /// Wall-clock timeout, sentinel status 408 - non-retryable
    Timeout,
    /// Response body could not be decoded - non-retryable
    Decode,
    /// Session storage failure - non-retryable
    Storage,
    /// Local misconfiguration - non-retryable
    Config,
}

/// API operation errors.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend rejected the credential (HTTP 401).
    #[error("authentication required: {message}")]
    Auth { message: String, details: Option<Value> },

    /// The backend throttled the request (HTTP 429).
    #[error("rate limited: {message}")]
    RateLimit { message: String, details: Option<Value> },

    /// Backend failure (HTTP 5xx).
    #[error("server error {status}: {message}")]
    Server { status: u16, message: String, details: Option<Value> },

    /// Request was rejected (remaining 4xx and other non-success codes).
    #[error("request rejected ({status}): {message}")]
    Client { status: u16, message: String, details: Option<Value> },

    /// Connection-level failure before a status was received.
    #[error("network error: {0}")]
    Network(String),

    /// The wall-clock timeout elapsed before a response arrived.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// A successful response carried a body the caller's type could not
    /// be decoded from.
    #[error("invalid response body: {0}")]
    Decode(String),

    /// Session storage failed while the client was reading or clearing
    /// the credential.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The client itself is misconfigured.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Sentinel status reported for timeouts.
pub const TIMEOUT_STATUS: u16 = 408;

impl ApiError {
    /// The HTTP status associated with this error.
    ///
    /// `None` for pure network failures and local errors; timeouts
    /// report the 408 sentinel.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Auth { .. } => Some(401),
            Self::RateLimit { .. } => Some(429),
            Self::Server { status, .. } | Self::Client { status, .. } => Some(*status),
            Self::Timeout(_) => Some(TIMEOUT_STATUS),
            Self::Network(_) | Self::Decode(_) | Self::Session(_) | Self::Config(_) => None,
        }
    }

    /// The message extracted from the response body, for errors that
    /// carry one.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Auth { message, .. }
            | Self::RateLimit { message, .. }
            | Self::Server { message, .. }
            | Self::Client { message, .. } => Some(message),
            _ => None,
        }
    }

    /// Structured details parsed from a JSON error body, when available.
    #[must_use]
    pub fn details(&self) -> Option<&Value> {
        match self {
            Self::Auth { details, .. }
            | Self::RateLimit { details, .. }
            | Self::Server { details, .. }
            | Self::Client { details, .. } => details.as_ref(),
            _ => None,
        }
    }

    /// Error category for this error.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Auth { .. } => ErrorCategory::Auth,
            Self::RateLimit { .. } => ErrorCategory::RateLimit,
            Self::Server { .. } => ErrorCategory::Server,
            Self::Client { .. } => ErrorCategory::Client,
            Self::Network(_) => ErrorCategory::Network,
            Self::Timeout(_) => ErrorCategory::Timeout,
            Self::Decode(_) => ErrorCategory::Decode,
            Self::Session(_) => ErrorCategory::Storage,
            Self::Config(_) => ErrorCategory::Config,
        }
    }

    /// Whether this failure is transient and worth another attempt.
    ///
    /// A failure is retryable iff it carries no status (network), the
    /// status is >= 500, or the status is 429. Everything else,
    /// including the 408 timeout sentinel, surfaces immediately.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Network | ErrorCategory::RateLimit | ErrorCategory::Server
        )
    }

    /// Classify a non-success HTTP response into an error value.
    pub(crate) fn from_status(status: u16, message: String, details: Option<Value>) -> Self {
        match status {
            401 => Self::Auth { message, details },
            429 => Self::RateLimit { message, details },
            500..=599 => Self::Server { status, message, details },
            _ => Self::Client { status, message, details },
        }
    }
}
