//! Request client for OpenAI-compatible APIs
//!
//! A [`Client`] owns the API key, base URL, default timeout, one reusable
//! transport handle, and the last error message. Requests are blocking and
//! single-shot: build headers, pick the verb, perform, collect the body.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::buffer::ResponseBuffer;
use crate::engine::{self, EngineLease};
use crate::error::{EngineError, RequestError};
use crate::transport::{Connector, Method, PreparedRequest, Transport, UreqConnector};

/// Base URL used when none has been configured
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Stored client settings
#[derive(Debug, Default)]
pub struct ClientConfig {
    api_key: Option<SecretString>,
    base_url: Option<String>,
    /// Seconds; zero or negative means no default
    timeout_secs: i64,
}

/// A completed HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: u16,
    body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, body: Vec<u8>) -> Self {
        Self { status, body }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn into_body(self) -> Vec<u8> {
        self.body
    }

    /// Body as text, replacing invalid UTF-8
    pub fn text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.body)
    }
}

/// Pick the timeout for a call
///
/// A positive per-call override wins, otherwise the stored default applies.
/// A non-positive result means no timeout.
pub fn effective_timeout(override_secs: i64, default_secs: i64) -> Option<Duration> {
    let secs = if override_secs > 0 {
        override_secs
    } else {
        default_secs
    };
    u64::try_from(secs)
        .ok()
        .filter(|&s| s > 0)
        .map(Duration::from_secs)
}

/// Header list for a call: JSON content type, plus bearer auth when a
/// non-empty key is set
pub fn build_headers(api_key: Option<&SecretString>) -> Vec<(String, String)> {
    let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
    if let Some(key) = api_key.map(|k| k.expose_secret().as_str())
        && !key.is_empty()
    {
        headers.push(("Authorization".to_string(), format!("Bearer {key}")));
    }
    headers
}

/// Blocking OpenAI-compatible request client
pub struct Client<C: Connector = UreqConnector> {
    connector: C,
    config: ClientConfig,
    handle: Option<C::Handle>,
    last_error: Option<String>,
    lease: Option<EngineLease>,
}

impl Client<UreqConnector> {
    /// Client backed by the shared `ureq` engine
    pub fn new() -> Self {
        Self::with_connector(UreqConnector)
    }
}

impl Default for Client<UreqConnector> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Connector> Client<C> {
    pub fn with_connector(connector: C) -> Self {
        Self {
            connector,
            config: ClientConfig::default(),
            handle: None,
            last_error: None,
            lease: None,
        }
    }

    /// Store the API key and bring up the engine and the reusable handle
    ///
    /// The base URL falls back to [`DEFAULT_BASE_URL`] if unset. On repeat
    /// calls only the key changes. If the handle can't be opened, requests
    /// fall back to a temporary handle each.
    pub fn init(&mut self, api_key: Option<&str>) -> Result<(), EngineError> {
        self.config.api_key = api_key.map(|k| SecretString::new(k.to_string()));
        if self.config.base_url.is_none() {
            self.config.base_url = Some(DEFAULT_BASE_URL.to_string());
        }

        if self.lease.is_none() {
            self.lease = Some(engine::acquire()?);
        }

        if self.handle.is_none() {
            match self.connector.connect() {
                Ok(handle) => self.handle = Some(handle),
                Err(e) => warn!("could not open reusable handle: {e}"),
            }
        }
        Ok(())
    }

    /// Replace the base URL; `None` clears it
    pub fn set_base_url(&mut self, base_url: Option<&str>) {
        self.config.base_url = base_url.map(str::to_string);
    }

    /// Default timeout in seconds for calls that don't pass one
    pub fn set_timeout(&mut self, seconds: i64) {
        self.config.timeout_secs = seconds;
    }

    pub fn base_url(&self) -> Option<&str> {
        self.config.base_url.as_deref()
    }

    pub fn timeout(&self) -> i64 {
        self.config.timeout_secs
    }

    pub fn has_api_key(&self) -> bool {
        self.config
            .api_key
            .as_ref()
            .is_some_and(|k| !k.expose_secret().is_empty())
    }

    /// Whether a reusable handle is held
    pub fn has_handle(&self) -> bool {
        self.handle.is_some()
    }

    /// Error from the most recent request, `None` if it succeeded
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Absolute URL for an API path under the base URL
    pub fn endpoint(&self, path: &str) -> String {
        let base = self.base_url().unwrap_or(DEFAULT_BASE_URL);
        format!(
            "{}/{}",
            base.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Release the key, base URL, error, handle, and engine lease
    ///
    /// The engine itself stops once no other lease holder remains. The default
    /// timeout is kept.
    pub fn cleanup(&mut self) {
        self.config.api_key = None;
        self.config.base_url = None;
        self.last_error = None;
        self.handle = None;
        self.lease = None;
        debug!("client cleaned up");
    }

    /// Perform one blocking request
    ///
    /// `method` follows [`Method::parse`]: GET sends no body, everything else
    /// sends `body` (empty if `None`). A positive `timeout_override` replaces
    /// the stored default for this call.
    ///
    /// Non-2xx statuses are returned as a [`Response`]; only failures to
    /// complete the exchange are errors. Either way the outcome is mirrored in
    /// [`last_error`](Self::last_error).
    pub fn request_with_status(
        &mut self,
        method: Option<&str>,
        url: Option<&str>,
        body: Option<&str>,
        timeout_override: i64,
    ) -> Result<Response, RequestError> {
        self.last_error = None;

        let result = self.execute(method, url, body, timeout_override);
        if let Err(e) = &result {
            warn!("request failed: {e}");
            self.last_error = Some(e.to_string());
        }
        result
    }

    fn prepare(
        &self,
        method: Option<&str>,
        url: &str,
        body: Option<&str>,
        timeout_override: i64,
    ) -> PreparedRequest {
        let method = Method::parse(method);
        let body = method
            .sends_body()
            .then(|| body.unwrap_or_default().to_string());
        PreparedRequest {
            method,
            url: url.to_string(),
            headers: build_headers(self.config.api_key.as_ref()),
            body,
            timeout: effective_timeout(timeout_override, self.config.timeout_secs),
        }
    }

    fn execute(
        &mut self,
        method: Option<&str>,
        url: Option<&str>,
        body: Option<&str>,
        timeout_override: i64,
    ) -> Result<Response, RequestError> {
        let url = url.ok_or(RequestError::MissingUrl)?;
        let request = self.prepare(method, url, body, timeout_override);

        let mut temporary = None;
        let handle = match self.handle.as_mut() {
            Some(handle) => handle,
            None => temporary.insert(
                self.connector
                    .connect()
                    .map_err(RequestError::HandleInit)?,
            ),
        };

        handle.reset();
        let mut buffer = ResponseBuffer::new();
        let status = handle.perform(&request, &mut buffer)?;
        debug!(
            method = %request.method,
            url = %request.url,
            status,
            bytes = buffer.len(),
            "request complete"
        );

        Ok(Response::new(status, buffer.into_bytes()))
    }
}
