//! Core `CompletionClient` trait and `ApiClient` implementation.
//!
//! `ApiClient` calls any OpenAI-compatible `/v1/chat/completions` endpoint
//! (OpenAI, Azure-style proxies, Ollama in OpenAI mode, vLLM, ...).  All
//! connection details come from [`LlmConfig`]; nothing is hardcoded.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::LlmConfig;

// ---------------------------------------------------------------------------
// LlmError
// ---------------------------------------------------------------------------

/// Errors that can occur while asking the model for a verdict.
#[derive(Debug, Error)]
pub enum LlmError {
    /// No API credential was configured, so no request was sent.
    #[error("no API key configured (set OPENAI_API_KEY or llm.api_key)")]
    MissingApiKey,

    /// The endpoint rejected the credential.
    #[error("authentication rejected by LLM endpoint (HTTP {0})")]
    Auth(u16),

    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("LLM request timed out")]
    Timeout,

    /// The endpoint answered with a non-success status.
    #[error("LLM endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The HTTP response could not be parsed as expected JSON.
    #[error("failed to parse LLM response: {0}")]
    Parse(String),

    /// The LLM returned a response with no usable text content.
    #[error("LLM returned an empty response")]
    EmptyResponse,

    /// The completion text did not contain a recognisable decision.
    #[error("could not find a decision in LLM response: {0:?}")]
    NoDecision(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// CompletionClient trait
// ---------------------------------------------------------------------------

/// Async seam between the judge and a text-generation backend.
///
/// Implementors must be `Send + Sync` so they can be shared as
/// `Arc<dyn CompletionClient>`.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send a system + user message pair and return the completion text.
    async fn complete(&self, system: &str, user: &str) -> Result<String, LlmError>;

    /// Model identifier, used in log lines.
    fn model(&self) -> &str;
}

// ---------------------------------------------------------------------------
// ApiClient
// ---------------------------------------------------------------------------

/// Calls an OpenAI-compatible `/v1/chat/completions` endpoint.
pub struct ApiClient {
    client: reqwest::Client,
    config: LlmConfig,
}

impl ApiClient {
    /// Build an `ApiClient` from application config.
    ///
    /// The HTTP client carries the per-request timeout from
    /// `config.timeout_secs`.  A default client is used if the builder fails.
    pub fn from_config(config: &LlmConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl CompletionClient for ApiClient {
    /// Returns [`LlmError::MissingApiKey`] without touching the network when
    /// no credential is configured.
    async fn complete(&self, system: &str, user: &str) -> Result<String, LlmError> {
        let key = self.config.api_key().ok_or(LlmError::MissingApiKey)?;

        let body = serde_json::json!({
            "model":       self.config.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user",   "content": user   }
            ],
            "temperature": self.config.temperature,
            "max_tokens":  self.config.max_tokens
        });

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(LlmError::Auth(status.as_u16()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        let content = json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or(LlmError::EmptyResponse)?
            .trim()
            .to_string();

        if content.is_empty() {
            return Err(LlmError::EmptyResponse);
        }

        Ok(content)
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

// ---------------------------------------------------------------------------
// MockClient (tests only)
// ---------------------------------------------------------------------------

/// Canned completion backend for pipeline tests; never touches the network.
#[cfg(test)]
pub struct MockClient {
    answer: Option<String>,
}

#[cfg(test)]
impl MockClient {
    /// Always answers with `answer`.
    pub fn ok(answer: &str) -> Self {
        Self {
            answer: Some(answer.to_string()),
        }
    }

    /// Always fails with a transport error.
    pub fn failing() -> Self {
        Self { answer: None }
    }
}

#[cfg(test)]
#[async_trait]
impl CompletionClient for MockClient {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String, LlmError> {
        self.answer
            .clone()
            .ok_or_else(|| LlmError::Request("simulated transport error".into()))
    }

    fn model(&self) -> &str {
        "mock"
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
