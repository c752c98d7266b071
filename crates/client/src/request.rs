//! Request descriptors.
//!
//! A descriptor captures everything about one outgoing call: method,
//! path, query parameters (absent values dropped), optional JSON body,
//! and header overrides. Descriptors are ephemeral: built per call and
//! consumed by [`ApiClient::execute`](crate::ApiClient::execute).

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::error::ApiError;

/// Description of a single outgoing API request.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<Value>,
    headers: Vec<(String, String)>,
}

impl RequestDescriptor {
    /// Create a descriptor for an arbitrary method and path.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), query: Vec::new(), body: None, headers: Vec::new() }
    }

    /// GET request for the given path.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// POST request for the given path.
    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// PUT request for the given path.
    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    /// PATCH request for the given path.
    #[must_use]
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    /// DELETE request for the given path.
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Append a query parameter.
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Append a query parameter when the value is present; `None` is
    /// dropped entirely rather than encoded as an empty string.
    #[must_use]
    pub fn query_opt(self, key: impl Into<String>, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    /// Attach a JSON body.
    ///
    /// # Errors
    /// Returns [`ApiError::Decode`] when the value cannot be serialized.
    pub fn json<B: Serialize>(mut self, body: &B) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::Decode(format!("failed to serialize request body: {e}")))?;
        self.body = Some(value);
        Ok(self)
    }

    /// Attach an already-constructed JSON body.
    #[must_use]
    pub fn json_value(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Override or add a request header. Later entries win over the
    /// client's defaults.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub(crate) fn method(&self) -> &Method {
        &self.method
    }

    pub(crate) fn path(&self) -> &str {
        &self.path
    }

    pub(crate) fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub(crate) fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Assemble the full URL from the client's base URL, the path, and
    /// the accumulated query pairs.
    pub(crate) fn build_url(&self, base_url: &str) -> Result<Url, ApiError> {
        let joined = format!("{}{}", base_url, self.path);
        let mut url = Url::parse(&joined)
            .map_err(|e| ApiError::Config(format!("invalid request URL {joined}: {e}")))?;

        if !self.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.query {
                pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }
}
