//! Error types for the engine guard, transports, and request client

use thiserror::Error;

/// Failures of the process-wide engine guard
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("engine state lock poisoned")]
    Poisoned,

    #[error("engine not initialized")]
    NotInitialized,
}

/// Failures reported by a transport handle
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("handle init failed: {0}")]
    Connect(#[source] EngineError),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("{0}")]
    Http(#[from] ureq::Error),

    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),

    /// Received data could not be buffered
    #[error("failed writing received data to buffer")]
    WriteAborted,
}

/// Failures of [`Client::request_with_status`](crate::Client::request_with_status)
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("request url missing")]
    MissingUrl,

    #[error("transport init failed: {0}")]
    HandleInit(#[source] TransportError),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

impl RequestError {
    /// Whether the request reached the transport layer at all
    pub fn reached_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
