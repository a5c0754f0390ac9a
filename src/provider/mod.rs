//! Provider abstraction for the inference gateway
//!
//! A unified streaming/non-streaming chat interface over a local model
//! backend. Streamed output arrives as an ordered sequence of text deltas
//! that concatenate left-to-right into the full completion; chunk
//! boundaries carry no meaning.

mod ollama;

pub use ollama::OllamaProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Message role in a chat transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// A chat message; ordered sequences of these form a transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// One chat completion request
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub temperature: f32,
}

/// Events emitted by a streaming completion
#[derive(Debug)]
pub enum StreamEvent {
    /// A fragment of generated text, in emission order
    TextDelta(String),
    /// The stream finished cleanly
    Done,
    /// The stream failed mid-flight
    Error(String),
}

/// Gateway failure taxonomy. Not retried at this layer.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("cannot connect to Ollama at {0}. Is Ollama running?")]
    Unavailable(String),

    #[error("request timed out")]
    Timeout,

    #[error("API error {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("network error: {0}")]
    Network(String),
}

/// Unified provider trait for chat backends
#[async_trait]
pub trait Provider: Send + Sync {
    /// Provider name for logging
    fn name(&self) -> &'static str;

    /// Create a chat completion and return the full text
    async fn chat(&self, request: ChatRequest) -> Result<String, GatewayError>;

    /// Create a streaming chat completion
    async fn chat_stream(
        &self,
        request: ChatRequest,
    ) -> Result<mpsc::Receiver<StreamEvent>, GatewayError>;
}
