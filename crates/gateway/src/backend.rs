//! Transport layer for the reasoning service.
//!
//! The gateway itself is transport-agnostic: it drives any
//! [`ReasoningBackend`], which turns one prompt into one free-form text
//! completion. The production backend speaks JSON over HTTP; tests swap in
//! scripted mocks.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Errors a backend can report for a single completion attempt.
///
/// `Throttled` is the one variant the gateway treats specially (cooldown plus
/// one retry); everything else fails the call immediately.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("throttled by reasoning service")]
    Throttled,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("reasoning service error: {0}")]
    Service(String),
}

/// One prompt in, one text completion out.
#[async_trait]
pub trait ReasoningBackend: Send + Sync {
    async fn complete(
        &self,
        prompt: &str,
        temperature: f32,
        max_output_tokens: u32,
    ) -> Result<String, BackendError>;
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    prompt: &'a str,
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    text: String,
}

/// HTTP backend for the reasoning service.
///
/// Posts `{prompt, temperature, max_output_tokens}` to the configured
/// endpoint and expects `{"text": "..."}` back. HTTP 429 is the throttling
/// signal; all other failure shapes are opaque to callers.
pub struct HttpBackend {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpBackend {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ReasoningBackend for HttpBackend {
    async fn complete(
        &self,
        prompt: &str,
        temperature: f32,
        max_output_tokens: u32,
    ) -> Result<String, BackendError> {
        debug!(
            "Sending completion request to {} ({} prompt bytes)",
            self.endpoint,
            prompt.len()
        );

        let mut request = self.client.post(&self.endpoint).json(&CompletionRequest {
            prompt,
            temperature,
            max_output_tokens,
        });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(BackendError::Throttled);
        }
        if !response.status().is_success() {
            return Err(BackendError::Service(format!(
                "status {}",
                response.status()
            )));
        }

        let body: CompletionResponse = response
            .json()
            .await
            .map_err(|e| BackendError::Service(format!("malformed response body: {e}")))?;

        Ok(body.text.trim().to_string())
    }
}
