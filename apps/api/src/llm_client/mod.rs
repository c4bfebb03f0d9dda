//! Completion client — the single point of entry for all chat-completion calls.
//!
//! ARCHITECTURAL RULE: No other module may call the completion provider directly.
//! All LLM interactions MUST go through `CompletionService`.
//!
//! One attempt per call. Failures are classified and handed back to the
//! enricher, which decides whether to surface or recover.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

/// Classification of a failed completion call, derived from the provider's status signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Auth,
    RateLimit,
    Upstream,
    Unknown,
}

#[derive(Debug, Clone, Error)]
#[error("completion failed ({kind:?}): {message}")]
pub struct CompletionFailure {
    pub kind: FailureKind,
    pub message: String,
    /// Set when the call was cut off by the outbound timeout.
    pub timed_out: bool,
}

impl CompletionFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            timed_out: false,
        }
    }

    /// Maps an HTTP status from the provider onto a failure class.
    pub fn from_status(status: StatusCode, message: impl Into<String>) -> Self {
        let kind = match status.as_u16() {
            401 | 403 => FailureKind::Auth,
            429 => FailureKind::RateLimit,
            _ => FailureKind::Upstream,
        };
        Self::new(kind, message)
    }

    fn from_transport(err: reqwest::Error) -> Self {
        Self {
            kind: FailureKind::Unknown,
            timed_out: err.is_timeout(),
            message: err.to_string(),
        }
    }
}

/// Output of a single completion call. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionResult {
    pub raw_text: String,
    pub token_limit_applied: u32,
}

/// Seam between the enricher and the completion provider.
/// Carried as `Arc<dyn CompletionService>` so tests can inject a stub.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        max_tokens: u32,
    ) -> Result<CompletionResult, CompletionFailure>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl ChatResponse {
    /// Text of the first choice, if the provider returned any.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: String,
}

/// Chat-completion client over HTTP. Built once at startup and shared.
#[derive(Clone)]
pub struct CompletionClient {
    client: Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl CompletionClient {
    pub fn new(api_url: String, api_key: String, model: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build completion HTTP client")?;

        Ok(Self {
            client,
            api_url,
            api_key,
            model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CompletionService for CompletionClient {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        max_tokens: u32,
    ) -> Result<CompletionResult, CompletionFailure> {
        let request_body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            max_tokens,
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                warn!("Completion request failed in transport: {e}");
                CompletionFailure::from_transport(e)
            })?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = provider_error_message(&body);
            warn!("Completion API returned {status}: {message}");
            return Err(CompletionFailure::from_status(status, message));
        }

        let chat: ChatResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                CompletionFailure::from_transport(e)
            } else {
                CompletionFailure::new(
                    FailureKind::Upstream,
                    format!("malformed completion response: {e}"),
                )
            }
        })?;

        if let Some(usage) = &chat.usage {
            debug!(
                "Completion succeeded: prompt_tokens={}, completion_tokens={}, max_tokens={}",
                usage.prompt_tokens, usage.completion_tokens, max_tokens
            );
        }

        let raw_text = chat
            .text()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                CompletionFailure::new(FailureKind::Upstream, "completion returned no content")
            })?
            .to_string();

        Ok(CompletionResult {
            raw_text,
            token_limit_applied: max_tokens,
        })
    }
}

/// Pulls `error.message` out of a provider error body, falling back to the raw body.
fn provider_error_message(body: &str) -> String {
    serde_json::from_str::<ProviderError>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string())
}
