use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::error::EmbeddingError;
use super::similarity::normalize_in_place;
use super::Embedder;
use crate::constants::DEFAULT_EMBEDDER_TIMEOUT_MS;

/// Default embedding model requested from Ollama.
pub const DEFAULT_EMBED_MODEL: &str = "all-minilm";

#[derive(Debug, Clone)]
pub struct OllamaEmbedderConfig {
    /// Base URL, e.g. `http://127.0.0.1:11434`.
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl OllamaEmbedderConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            model: DEFAULT_EMBED_MODEL.to_string(),
            timeout: Duration::from_millis(DEFAULT_EMBEDDER_TIMEOUT_MS),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/api/embed", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

/// Embedder backed by an Ollama-compatible HTTP endpoint.
#[derive(Debug, Clone)]
pub struct OllamaEmbedder {
    config: OllamaEmbedderConfig,
    http: HttpClient,
}

impl OllamaEmbedder {
    pub fn new(config: OllamaEmbedderConfig) -> Result<Self, EmbeddingError> {
        if config.base_url.trim().is_empty() {
            return Err(EmbeddingError::InvalidConfig {
                reason: "base_url cannot be empty".to_string(),
            });
        }
        if config.model.trim().is_empty() {
            return Err(EmbeddingError::InvalidConfig {
                reason: "model cannot be empty".to_string(),
            });
        }

        let http = HttpClient::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| EmbeddingError::InvalidConfig {
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self { config, http })
    }

    pub fn config(&self) -> &OllamaEmbedderConfig {
        &self.config
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let url = self.config.endpoint();
        debug!(url = %url, count = texts.len(), model = %self.config.model, "Requesting embeddings");

        let request = EmbedRequest {
            model: &self.config.model,
            input: texts,
        };

        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                if e.is_timeout() {
                    EmbeddingError::Timeout {
                        timeout_ms: self.config.timeout.as_millis() as u64,
                    }
                } else {
                    warn!(url = %url, error = %e, "Embedding request failed");
                    EmbeddingError::from(e)
                }
            })?;

        let body: EmbedResponse =
            response
                .json()
                .await
                .map_err(|e| EmbeddingError::InvalidResponse {
                    reason: e.to_string(),
                })?;

        if body.embeddings.len() != texts.len() {
            return Err(EmbeddingError::CountMismatch {
                expected: texts.len(),
                actual: body.embeddings.len(),
            });
        }

        Ok(body
            .embeddings
            .into_iter()
            .map(|mut v| {
                normalize_in_place(&mut v);
                v
            })
            .collect())
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
