//! Typed helpers for the OpenAI endpoints the builtins call
//!
//! `GET /models` doubles as a preflight check; `POST /chat/completions` is the
//! actual question/answer round trip.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::client::{Client, Response};
use crate::error::RequestError;
use crate::transport::Connector;

/// Errors from the typed API helpers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error("API returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Failed to parse API response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("API response contained no choices")]
    EmptyCompletion,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Model {
    pub id: String,
    #[serde(default)]
    pub owned_by: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ModelList {
    data: Vec<Model>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletion {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

impl ChatCompletion {
    /// Text of the first choice
    pub fn content(&self) -> Result<&str, ApiError> {
        self.choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or(ApiError::EmptyCompletion)
    }
}

/// `{"error": {"message": ...}}`
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Turn a non-2xx response into [`ApiError::Status`]
fn check_status(response: Response) -> Result<Response, ApiError> {
    if response.is_success() {
        return Ok(response);
    }
    let message = match response.json::<ErrorEnvelope>() {
        Ok(envelope) => envelope.error.message,
        Err(_) => response.text().trim().to_string(),
    };
    Err(ApiError::Status {
        status: response.status(),
        message,
    })
}

/// List the models the endpoint serves
pub fn list_models<C: Connector>(client: &mut Client<C>) -> Result<Vec<Model>, ApiError> {
    let url = client.endpoint("models");
    let response = client.request_with_status(Some("GET"), Some(&url), None, 0)?;
    let list: ModelList = check_status(response)?.json()?;
    Ok(list.data)
}

/// Run one chat completion
pub fn chat_completion<C: Connector>(
    client: &mut Client<C>,
    request: &ChatRequest,
) -> Result<ChatCompletion, ApiError> {
    let url = client.endpoint("chat/completions");
    let body = serde_json::to_string(request)?;
    let response = client.request_with_status(Some("POST"), Some(&url), Some(&body), 0)?;
    Ok(check_status(response)?.json()?)
}
