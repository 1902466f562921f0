use std::time::Duration;

use async_trait::async_trait;
use genai::chat::{ChatMessage, ChatOptions, ChatRequest};
use genai::{Client, webc};
use reqwest::StatusCode;
use tracing::{debug, warn};

use super::{Generator, LlmError};
use crate::constants::DEFAULT_LLM_TIMEOUT_MS;

pub const DEFAULT_LLM_MODEL: &str = "qwen2.5:3b";

pub const SYSTEM_PROMPT: &str = "You are a helpful research assistant. \
Your goal is to answer the question using ONLY the provided evidence. \
You must not use outside knowledge.";

const TEMPERATURE: f64 = 0.1;
const MAX_TOKENS: u32 = 1024;

#[derive(Debug, Clone)]
pub struct GenaiGeneratorConfig {
    /// Model name; `genai` resolves the provider from it.
    pub model: String,
    pub timeout: Duration,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl Default for GenaiGeneratorConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_LLM_MODEL.to_string(),
            timeout: Duration::from_millis(DEFAULT_LLM_TIMEOUT_MS),
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        }
    }
}

impl GenaiGeneratorConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Generator backed by any provider `genai` supports (Ollama, OpenAI, Anthropic, ...).
pub struct GenaiGenerator {
    client: Client,
    config: GenaiGeneratorConfig,
}

impl GenaiGenerator {
    pub fn new(config: GenaiGeneratorConfig) -> Self {
        Self {
            client: Client::default(),
            config,
        }
    }

    pub fn config(&self) -> &GenaiGeneratorConfig {
        &self.config
    }

    fn request(&self, prompt: &str) -> ChatRequest {
        ChatRequest::new(vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(prompt),
        ])
    }

    fn options(&self) -> ChatOptions {
        ChatOptions::default()
            .with_temperature(self.config.temperature)
            .with_max_tokens(self.config.max_tokens)
    }
}

#[async_trait]
impl Generator for GenaiGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let options = self.options();
        let call = self
            .client
            .exec_chat(&self.config.model, self.request(prompt), Some(&options));

        let response = tokio::time::timeout(self.config.timeout, call)
            .await
            .map_err(|_| LlmError::Timeout {
                timeout_ms: self.config.timeout.as_millis() as u64,
            })?
            .map_err(|e| {
                let error = classify_error(&self.config.model, e);
                warn!(
                    model = %self.config.model,
                    transient = error.is_transient(),
                    error = %error,
                    "Generation failed"
                );
                error
            })?;

        let text = response.first_text().unwrap_or_default().trim().to_string();
        debug!(model = %self.config.model, chars = text.len(), "Generation complete");

        if text.is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        Ok(text)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

/// Sorts a `genai` failure into a retryable [`LlmError::Provider`] or a fatal
/// [`LlmError::Unavailable`].
///
/// Rate limits, server-side statuses and replies that could not be decoded are
/// retryable. Connection failures, auth errors and unknown models are not.
pub(crate) fn classify_error(model: &str, error: genai::Error) -> LlmError {
    let transient = match &error {
        genai::Error::WebModelCall { webc_error, .. }
        | genai::Error::WebAdapterCall { webc_error, .. } => is_transient_webc(webc_error),
        genai::Error::NoChatResponse { .. }
        | genai::Error::InvalidJsonResponseElement { .. }
        | genai::Error::ChatResponse { .. }
        | genai::Error::StreamParse { .. }
        | genai::Error::WebStream { .. }
        | genai::Error::JsonValueExt(_)
        | genai::Error::SerdeJson(_) => true,
        _ => false,
    };

    let message = error.to_string();
    if transient {
        LlmError::Provider {
            model: model.to_string(),
            message,
        }
    } else {
        LlmError::Unavailable {
            model: model.to_string(),
            message,
        }
    }
}

fn is_transient_webc(error: &webc::Error) -> bool {
    match error {
        webc::Error::ResponseFailedStatus { status, .. } => is_retryable_status(*status),
        webc::Error::ResponseFailedNotJson { .. } | webc::Error::JsonValueExt(_) => true,
        webc::Error::Reqwest(e) => {
            !e.is_connect() && (e.is_timeout() || e.is_decode() || e.is_body())
        }
        _ => false,
    }
}

pub(crate) fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
        || status.is_server_error()
}
