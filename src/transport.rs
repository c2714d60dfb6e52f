//! Transport handles
//!
//! A [`Connector`] opens handles; a [`Transport`] handle performs one request at
//! a time and streams the body into a [`ResponseBuffer`]. The `ureq` backed
//! implementation shares the engine's agent, tests plug in their own.

use std::io::Read;
use std::time::Duration;

use tracing::debug;

use crate::buffer::ResponseBuffer;
use crate::engine;
use crate::error::{EngineError, TransportError};

const READ_CHUNK_SIZE: usize = 16 * 1024;

/// HTTP verb for a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    /// Any other verb, sent verbatim with the body attached
    Custom(String),
}

impl Method {
    /// Resolve a caller-supplied method name
    ///
    /// `GET` and `POST` match case-insensitively. A missing or empty name means
    /// `POST`.
    pub fn parse(method: Option<&str>) -> Self {
        match method.map(str::trim) {
            None | Some("") => Self::Post,
            Some(m) if m.eq_ignore_ascii_case("GET") => Self::Get,
            Some(m) if m.eq_ignore_ascii_case("POST") => Self::Post,
            Some(m) => Self::Custom(m.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Custom(m) => m,
        }
    }

    /// Everything except GET carries a body
    pub fn sends_body(&self) -> bool {
        !matches!(self, Self::Get)
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fully resolved options for a single call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    /// `None` exactly when the method is GET
    pub body: Option<String>,
    pub timeout: Option<Duration>,
}

impl PreparedRequest {
    /// First header value with the given name (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A reusable session that performs requests
pub trait Transport {
    /// Drop any option state left over from the previous call
    fn reset(&mut self) {}

    /// Perform the request, appending the body to `sink`
    ///
    /// Returns the HTTP status code. Received data that cannot be buffered must
    /// abort the transfer with [`TransportError::WriteAborted`].
    fn perform(
        &mut self,
        request: &PreparedRequest,
        sink: &mut ResponseBuffer,
    ) -> Result<u16, TransportError>;
}

/// Opens transport handles
pub trait Connector {
    type Handle: Transport;

    fn connect(&self) -> Result<Self::Handle, TransportError>;
}

/// Opens handles onto the shared `ureq` engine
#[derive(Debug, Clone, Copy, Default)]
pub struct UreqConnector;

impl Connector for UreqConnector {
    type Handle = UreqHandle;

    fn connect(&self) -> Result<UreqHandle, TransportError> {
        let agent = match engine::shared_agent() {
            Ok(agent) => agent,
            Err(EngineError::NotInitialized) => {
                debug!("engine not running, using a standalone agent");
                engine::build_agent()
            }
            Err(e) => return Err(TransportError::Connect(e)),
        };
        Ok(UreqHandle { agent })
    }
}

/// `ureq` session handle
///
/// Every request is built from scratch out of the [`PreparedRequest`], so there
/// is no option state to carry between calls.
#[derive(Clone)]
pub struct UreqHandle {
    agent: ureq::Agent,
}

impl UreqHandle {
    fn run<B: ureq::AsSendBody>(
        &self,
        request: &PreparedRequest,
        body: B,
    ) -> Result<ureq::http::Response<ureq::Body>, TransportError> {
        let mut builder = ureq::http::Request::builder()
            .method(request.method.as_str())
            .uri(request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let http_request = builder
            .body(body)
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;

        let http_request = self
            .agent
            .configure_request(http_request)
            .timeout_global(request.timeout)
            .build();

        Ok(self.agent.run(http_request)?)
    }
}

impl Transport for UreqHandle {
    fn perform(
        &mut self,
        request: &PreparedRequest,
        sink: &mut ResponseBuffer,
    ) -> Result<u16, TransportError> {
        let response = match &request.body {
            Some(body) if request.method.sends_body() => self.run(request, body.as_bytes())?,
            _ => self.run(request, ())?,
        };

        let status = response.status().as_u16();
        let mut reader = response.into_body().into_reader();
        let mut chunk = vec![0u8; READ_CHUNK_SIZE];
        loop {
            let n = reader.read(&mut chunk)?;
            if n == 0 {
                break;
            }
            sink.append(&chunk[..n]).map_err(|_| TransportError::WriteAborted)?;
        }

        Ok(status)
    }
}
