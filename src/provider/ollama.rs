//! Ollama chat endpoint client
//!
//! Talks to a local Ollama server at `POST {base}/api/chat`. Streamed
//! responses are NDJSON: one JSON object per line, each carrying a
//! `message.content` delta, terminated by an object with `done: true`.

use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::mpsc;

use super::{ChatRequest, GatewayError, Message, Provider, StreamEvent};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Normalize the base URL by stripping trailing slashes and a /v1 suffix
fn normalize_base_url(url: &str) -> String {
    let mut url = url.trim_end_matches('/').to_string();
    if url.ends_with("/v1") {
        url.truncate(url.len() - 3);
    }
    url
}

/// Check if a URL points to a local address (localhost, 127.0.0.1, [::1])
fn is_local_url(url: &str) -> bool {
    match url::Url::parse(url) {
        Ok(parsed) => match parsed.host() {
            Some(url::Host::Domain(d)) => d == "localhost",
            Some(url::Host::Ipv4(ip)) => ip.is_loopback(),
            Some(url::Host::Ipv6(ip)) => ip.is_loopback(),
            None => true, // No host (e.g. unix socket) — treat as local
        },
        Err(_) => true, // Can't parse — don't warn on malformed URLs
    }
}

/// Ollama API client (local model server, no auth)
pub struct OllamaProvider {
    base_url: String,
    http: reqwest::Client,
}

impl OllamaProvider {
    /// Create a client against an Ollama base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        let normalized = normalize_base_url(&base_url.into());

        if !is_local_url(&normalized) {
            tracing::warn!(
                "OLLAMA_HOST points to non-local address '{}'. For security, consider using localhost.",
                normalized
            );
        }

        Self {
            base_url: normalized,
            http: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    async fn send(
        &self,
        request: &ChatRequest,
        stream: bool,
    ) -> Result<reqwest::Response, GatewayError> {
        let body = OllamaChatRequest {
            model: &request.model,
            messages: &request.messages,
            options: OllamaOptions {
                temperature: request.temperature,
            },
            stream,
        };

        let url = format!("{}/api/chat", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::Timeout
                } else if e.is_connect() {
                    GatewayError::Unavailable(self.base_url.clone())
                } else {
                    GatewayError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Api { status, body });
        }

        Ok(response)
    }
}

#[async_trait::async_trait]
impl Provider for OllamaProvider {
    fn name(&self) -> &'static str {
        "ollama"
    }

    async fn chat(&self, request: ChatRequest) -> Result<String, GatewayError> {
        let response = self.send(&request, false).await?;
        let chunk: OllamaChatChunk = response
            .json()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))?;
        Ok(chunk.message.content)
    }

    async fn chat_stream(
        &self,
        request: ChatRequest,
    ) -> Result<mpsc::Receiver<StreamEvent>, GatewayError> {
        let response = self.send(&request, true).await?;

        let (tx, rx) = mpsc::channel(100);
        tokio::spawn(pump_ndjson(response, tx));

        Ok(rx)
    }
}

/// Decode the NDJSON body and forward deltas to the channel
async fn pump_ndjson(response: reqwest::Response, tx: mpsc::Sender<StreamEvent>) {
    let mut stream = response.bytes_stream();
    let mut decoder = NdjsonDecoder::new();

    while let Some(chunk) = stream.next().await {
        let chunk = match chunk {
            Ok(c) => c,
            Err(e) => {
                let _ = tx.send(StreamEvent::Error(e.to_string())).await;
                return;
            }
        };

        for line in decoder.push(&chunk) {
            let parsed: OllamaChatChunk = match serde_json::from_str(&line) {
                Ok(p) => p,
                Err(e) => {
                    let _ = tx
                        .send(StreamEvent::Error(format!("bad stream chunk: {}", e)))
                        .await;
                    return;
                }
            };

            if !parsed.message.content.is_empty() {
                if tx
                    .send(StreamEvent::TextDelta(parsed.message.content))
                    .await
                    .is_err()
                {
                    return; // receiver dropped
                }
            }

            if parsed.done {
                let _ = tx.send(StreamEvent::Done).await;
                return;
            }
        }
    }

    // Stream ended without a done marker; treat as complete anyway
    let _ = tx.send(StreamEvent::Done).await;
}

/// NDJSON line decoder with buffering
///
/// Handles partial chunks and extracts complete lines. Buffer is bounded
/// to prevent unbounded memory growth from malformed streams.
#[derive(Debug, Default)]
struct NdjsonDecoder {
    buffer: String,
}

impl NdjsonDecoder {
    const MAX_BUFFER_SIZE: usize = 1024 * 1024;

    fn new() -> Self {
        Self {
            buffer: String::new(),
        }
    }

    /// Push a chunk of bytes and extract complete non-empty lines
    fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.push_str(&String::from_utf8_lossy(chunk));

        if self.buffer.len() > Self::MAX_BUFFER_SIZE {
            tracing::warn!(
                "stream buffer exceeded {}KB limit, truncating",
                Self::MAX_BUFFER_SIZE / 1024
            );
            let keep_from = self.buffer.len() - (Self::MAX_BUFFER_SIZE / 2);
            self.buffer = self.buffer[keep_from..].to_string();
        }

        let mut lines = Vec::new();
        while let Some(pos) = self.buffer.find('\n') {
            let line = self.buffer[..pos].trim().to_string();
            self.buffer = self.buffer[pos + 1..].to_string();
            if !line.is_empty() {
                lines.push(line);
            }
        }
        lines
    }
}

// ============================================================================
// Ollama API types
// ============================================================================

#[derive(Debug, Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    options: OllamaOptions,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct OllamaChatChunk {
    #[serde(default)]
    message: OllamaChunkMessage,
    #[serde(default)]
    done: bool,
}

#[derive(Debug, Default, Deserialize)]
struct OllamaChunkMessage {
    #[serde(default)]
    content: String,
}
