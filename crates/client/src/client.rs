//! HTTP API client with timeout, error classification, and retry.
//!
//! Wraps `reqwest` with the frontend request contract: JSON defaults,
//! bearer attachment from the session store, a wall-clock timeout per
//! attempt, classified failures, and linear-backoff retry for transient
//! ones. A 401 clears the session store and notifies the host through
//! the session event channel before the error is surfaced.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};
use translatecloud_session::SessionStore;
use url::Url;

use crate::config::ApiClientConfig;
use crate::error::ApiError;
use crate::events::{SessionEvent, SessionEventSender};
use crate::request::RequestDescriptor;

/// Body of a successful response.
///
/// JSON when the response content-type indicates it, raw text
/// otherwise, and empty for bodyless statuses (204/205 or a zero-length
/// body).
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Parsed JSON body.
    Json(Value),
    /// Raw body for non-JSON content types.
    Text(String),
    /// No body.
    Empty,
}

impl Payload {
    /// The JSON body, when there is one.
    #[must_use]
    pub fn into_json(self) -> Option<Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Text(_) | Self::Empty => None,
        }
    }

    /// The raw text body, when there is one.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(raw) => Some(raw),
            Self::Json(_) | Self::Empty => None,
        }
    }

    /// Decode the payload into a caller-supplied type.
    ///
    /// An empty payload decodes as JSON `null`, which covers `()` and
    /// `Option<T>` targets.
    ///
    /// # Errors
    /// Returns [`ApiError::Decode`] when the body does not match `T`.
    pub fn deserialize<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        let value = match self {
            Self::Json(value) => value,
            Self::Text(raw) => serde_json::from_str(&raw)
                .map_err(|e| ApiError::Decode(format!("failed to decode response: {e}")))?,
            Self::Empty => Value::Null,
        };

        serde_json::from_value(value)
            .map_err(|e| ApiError::Decode(format!("failed to decode response: {e}")))
    }
}

/// API client for the TranslateCloud backend.
///
/// Construct one at application start and share it; every method takes
/// `&self` and concurrent in-flight requests are independent.
pub struct ApiClient {
    http: reqwest::Client,
    session: Arc<SessionStore>,
    config: ApiClientConfig,
    events: Option<SessionEventSender>,
}

impl ApiClient {
    /// Create a client over the given session store.
    ///
    /// # Errors
    /// Returns [`ApiError::Config`] when the underlying HTTP client
    /// cannot be constructed.
    pub fn new(config: ApiClientConfig, session: Arc<SessionStore>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, session, config, events: None })
    }

    /// Create a builder for fluent configuration.
    #[must_use]
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// The session store this client reads credentials from.
    #[must_use]
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &ApiClientConfig {
        &self.config
    }

    /// Execute a request descriptor and return the classified outcome.
    ///
    /// Transient failures (no status, 5xx, 429) are retried up to the
    /// configured total number of tries with linear backoff: the n-th
    /// retry waits `n * retry_base_delay`. A 401 clears the session
    /// store, emits [`SessionEvent::Expired`], and surfaces immediately.
    ///
    /// # Errors
    /// Returns the classified [`ApiError`] once retries are exhausted or
    /// the failure is not retryable.
    #[instrument(skip(self, descriptor), fields(method = %descriptor.method(), path = %descriptor.path()))]
    pub async fn execute(&self, descriptor: RequestDescriptor) -> Result<Payload, ApiError> {
        let url = descriptor.build_url(&self.config.base_url)?;
        let attempts = self.config.max_attempts.max(1);

        for attempt in 1..=attempts {
            debug!(attempt, %url, "sending request");

            match self.try_once(&descriptor, &url).await {
                Ok(payload) => return Ok(payload),
                Err(err) if err.is_retryable() && attempt < attempts => {
                    let delay = self.config.retry_base_delay.saturating_mul(attempt as u32);
                    warn!(
                        attempt,
                        total = attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "transient failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }

        Err(ApiError::Config("request loop exhausted without producing a result".to_string()))
    }

    /// Execute a descriptor and decode the payload into `T`.
    ///
    /// # Errors
    /// Propagates [`execute`](Self::execute) failures plus decode errors.
    pub async fn request<T: DeserializeOwned>(
        &self,
        descriptor: RequestDescriptor,
    ) -> Result<T, ApiError> {
        self.execute(descriptor).await?.deserialize()
    }

    /// GET a path and decode the JSON response.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request(RequestDescriptor::get(path)).await
    }

    /// POST a JSON body and decode the response.
    pub async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.request(RequestDescriptor::post(path).json(body)?).await
    }

    /// PUT a JSON body and decode the response.
    pub async fn put<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.request(RequestDescriptor::put(path).json(body)?).await
    }

    /// PATCH a JSON body and decode the response.
    pub async fn patch<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.request(RequestDescriptor::patch(path).json(body)?).await
    }

    /// DELETE a path and decode the response.
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request(RequestDescriptor::delete(path)).await
    }

    /// Whether the backend is reachable and healthy.
    ///
    /// # Errors
    /// Returns an error only for transport-level failures; a non-success
    /// status reads as `Ok(false)`.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<bool, ApiError> {
        match self.execute(RequestDescriptor::get("/health")).await {
            Ok(_) => Ok(true),
            Err(err) if err.status().is_some() => {
                warn!(status = ?err.status(), "health check returned non-success status");
                Ok(false)
            }
            Err(err) => {
                warn!(error = %err, "health check failed");
                Err(err)
            }
        }
    }

    /// One attempt: build headers, attach the bearer, race the network
    /// call against the timeout, and classify the outcome.
    async fn try_once(
        &self,
        descriptor: &RequestDescriptor,
        url: &Url,
    ) -> Result<Payload, ApiError> {
        let token = self.session.get().await;
        let headers = self.build_headers(descriptor, token)?;
        let mut request =
            self.http.request(descriptor.method().clone(), url.clone()).headers(headers);

        if descriptor.method() != &Method::GET {
            if let Some(body) = descriptor.body() {
                request = request.json(body);
            }
        }

        let response = match tokio::time::timeout(self.config.timeout, request.send()).await {
            Ok(Ok(response)) => response,
            Ok(Err(err)) => return Err(classify_transport(&err, self.config.timeout)),
            Err(_) => return Err(ApiError::Timeout(self.config.timeout)),
        };

        let status = response.status();
        debug!(%status, "received response");

        if status.is_success() {
            return read_success(response).await;
        }

        let err = classify_failure(response).await;

        if matches!(err, ApiError::Auth { .. }) {
            info!("credential rejected by backend, clearing session");
            if let Err(clear_err) = self.session.clear().await {
                warn!(error = %clear_err, "failed to clear rejected session");
            }
            self.emit(SessionEvent::Expired);
        }

        Err(err)
    }

    /// Default JSON content type, caller overrides on top, bearer last.
    fn build_headers(
        &self,
        descriptor: &RequestDescriptor,
        token: Option<String>,
    ) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        for (name, value) in descriptor.headers() {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ApiError::Config(format!("invalid header name {name}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| ApiError::Config(format!("invalid header value: {e}")))?;
            headers.insert(name, value);
        }

        if let Some(token) = token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| ApiError::Config(format!("invalid bearer token: {e}")))?;
            headers.insert(AUTHORIZATION, value);
        }

        Ok(headers)
    }

    pub(crate) fn emit(&self, event: SessionEvent) {
        if let Some(events) = &self.events {
            if events.send(event).is_err() {
                debug!(?event, "session event receiver dropped");
            }
        }
    }
}

fn classify_transport(err: &reqwest::Error, timeout: Duration) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout(timeout)
    } else {
        ApiError::Network(err.to_string())
    }
}

fn content_type_is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.contains("application/json"))
}

async fn read_success(response: Response) -> Result<Payload, ApiError> {
    let status = response.status();
    if status == StatusCode::NO_CONTENT || status == StatusCode::RESET_CONTENT {
        return Ok(Payload::Empty);
    }

    let is_json = content_type_is_json(response.headers());
    let raw = response
        .text()
        .await
        .map_err(|e| ApiError::Network(format!("failed to read response body: {e}")))?;

    if raw.is_empty() {
        return Ok(Payload::Empty);
    }

    if is_json {
        serde_json::from_str(&raw)
            .map(Payload::Json)
            .map_err(|e| ApiError::Decode(format!("response claimed JSON but failed to parse: {e}")))
    } else {
        Ok(Payload::Text(raw))
    }
}

/// Classify a non-success response, preferring a structured message
/// from a JSON `detail` or `message` field over the raw body, and the
/// raw body over a generic `HTTP <status>: <reason>` string.
async fn classify_failure(response: Response) -> ApiError {
    let status = response.status();
    let generic =
        format!("HTTP {}: {}", status.as_u16(), status.canonical_reason().unwrap_or("unknown"));

    let is_json = content_type_is_json(response.headers());
    let raw = response.text().await.unwrap_or_default();

    let (message, details) = if is_json {
        match serde_json::from_str::<Value>(&raw) {
            Ok(body) => {
                let message = body
                    .get("detail")
                    .and_then(Value::as_str)
                    .or_else(|| body.get("message").and_then(Value::as_str))
                    .map_or(generic, str::to_string);
                (message, Some(body))
            }
            Err(_) => (if raw.is_empty() { generic } else { raw }, None),
        }
    } else if raw.is_empty() {
        (generic, None)
    } else {
        (raw, None)
    };

    ApiError::from_status(status.as_u16(), message, details)
}

/// Builder for [`ApiClient`].
#[derive(Default)]
pub struct ApiClientBuilder {
    config: Option<ApiClientConfig>,
    session: Option<Arc<SessionStore>>,
    events: Option<SessionEventSender>,
}

impl ApiClientBuilder {
    /// Set the client configuration.
    #[must_use]
    pub fn config(mut self, config: ApiClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the session store.
    #[must_use]
    pub fn session(mut self, session: Arc<SessionStore>) -> Self {
        self.session = Some(session);
        self
    }

    /// Supply the host's session event channel sender.
    #[must_use]
    pub fn events(mut self, events: SessionEventSender) -> Self {
        self.events = Some(events);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    /// Returns [`ApiError::Config`] when the session store is missing or
    /// the HTTP client cannot be constructed.
    pub fn build(self) -> Result<ApiClient, ApiError> {
        let config = self.config.unwrap_or_default();
        let session = self
            .session
            .ok_or_else(|| ApiError::Config("session store not set".to_string()))?;

        let mut client = ApiClient::new(config, session)?;
        client.events = self.events;
        Ok(client)
    }
}
