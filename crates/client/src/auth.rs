//! Authentication flows built on the API client.
//!
//! Login and signup exchange credentials for a bearer token, persist it
//! in the session store together with the user profile, and logout
//! clears the store and notifies the host.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, instrument, warn};
use translatecloud_session::SessionStore;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::events::{SessionEvent, SessionEventSender};

/// Fallback token lifetime when the backend omits `expires_in`.
const DEFAULT_TOKEN_TTL_SECS: i64 = 86_400;

/// Token response returned by the login and signup endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    /// Bearer token, absent when signup does not auto-login.
    pub access_token: Option<String>,
    /// Token lifetime in seconds.
    pub expires_in: Option<i64>,
    /// Profile of the authenticated user.
    pub user: Option<Value>,
}

/// User-facing authentication operations.
pub struct AuthService {
    client: Arc<ApiClient>,
    session: Arc<SessionStore>,
    events: Option<SessionEventSender>,
}

impl AuthService {
    /// Create the service over a shared client and session store.
    #[must_use]
    pub fn new(client: Arc<ApiClient>, session: Arc<SessionStore>) -> Self {
        Self { client, session, events: None }
    }

    /// Supply the host's session event channel sender.
    #[must_use]
    pub fn with_events(mut self, events: SessionEventSender) -> Self {
        self.events = Some(events);
        self
    }

    /// Authenticate with email and password and persist the session.
    ///
    /// # Errors
    /// Propagates request failures; a backend response without an access
    /// token surfaces as [`ApiError::Decode`].
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let response: AuthResponse = self
            .client
            .post("/api/users/login", &json!({ "email": email, "password": password }))
            .await?;

        let token = response.access_token.as_deref().ok_or_else(|| {
            ApiError::Decode("login response did not include an access token".to_string())
        })?;

        self.persist(token, response.expires_in, response.user.as_ref()).await?;
        info!(email, "login succeeded");
        Ok(response)
    }

    /// Register a new account, logging in when the backend returns a
    /// token with the signup response.
    ///
    /// # Errors
    /// Propagates request and session persistence failures.
    #[instrument(skip(self, details))]
    pub async fn signup(&self, details: &Value) -> Result<AuthResponse, ApiError> {
        let response: AuthResponse = self.client.post("/api/users/signup", details).await?;

        if let Some(token) = response.access_token.as_deref() {
            self.persist(token, response.expires_in, response.user.as_ref()).await?;
            info!("signup succeeded with immediate login");
        } else {
            info!("signup succeeded, login required");
        }

        Ok(response)
    }

    /// Clear the session and notify the host.
    ///
    /// # Errors
    /// Returns storage errors from clearing the session store.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), ApiError> {
        self.session.clear().await?;
        if let Some(events) = &self.events {
            if events.send(SessionEvent::LoggedOut).is_err() {
                warn!("session event receiver dropped");
            }
        }
        info!("logged out");
        Ok(())
    }

    /// Fetch the authenticated user's profile from the backend and
    /// refresh the cached copy.
    ///
    /// # Errors
    /// Propagates request failures.
    #[instrument(skip(self))]
    pub async fn current_user(&self) -> Result<Value, ApiError> {
        let profile: Value = self.client.get("/api/users/me").await?;

        // Cache refresh is best effort, the fetched profile is still valid.
        if let Err(err) = self.session.set_profile(&profile).await {
            warn!(error = %err, "failed to cache user profile");
        }

        Ok(profile)
    }

    /// Whether a non-expired credential is currently stored.
    pub async fn is_authenticated(&self) -> bool {
        self.session.is_valid().await
    }

    /// Whether the stored credential is inside its refresh window.
    pub async fn needs_refresh(&self) -> bool {
        self.session.needs_refresh().await
    }

    async fn persist(
        &self,
        token: &str,
        expires_in: Option<i64>,
        user: Option<&Value>,
    ) -> Result<(), ApiError> {
        let ttl = expires_in.unwrap_or(DEFAULT_TOKEN_TTL_SECS);
        self.session.set(token, ttl).await?;

        if let Some(profile) = user {
            if let Err(err) = self.session.set_profile(profile).await {
                warn!(error = %err, "failed to cache user profile");
            }
        }

        Ok(())
    }
}
