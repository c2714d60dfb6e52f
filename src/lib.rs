pub mod buffer;
pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod openai;
pub mod transport;

pub use buffer::ResponseBuffer;
pub use cli::{Cli, Commands};
pub use client::{Client, DEFAULT_BASE_URL, Response, build_headers, effective_timeout};
pub use config::Settings;
pub use error::{EngineError, RequestError, TransportError};
pub use openai::{ApiError, ChatCompletion, ChatMessage, ChatRequest, Model};
pub use transport::{Connector, Method, PreparedRequest, Transport, UreqConnector, UreqHandle};
pub use commands::{cmd_chat, cmd_models, cmd_request};
