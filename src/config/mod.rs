//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `CITEGUARD_*` environment variables.

pub mod error;

#[cfg(test)]
mod tests;

pub use error::ConfigError;

use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::answer::{AnswerMode, OrchestratorConfig};
use crate::confidence::ConfidenceConfig;
use crate::constants::{
    DEFAULT_ATTRIBUTION_THRESHOLD, DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_EMBEDDER_TIMEOUT_MS,
    DEFAULT_LLM_TIMEOUT_MS, DEFAULT_MAX_ATTEMPTS, DEFAULT_MIN_DISTINCT_PAPERS,
    DEFAULT_MIN_EVIDENCE, DEFAULT_MIN_RESPONSE_CHARS, DEFAULT_PRECISION_THRESHOLD,
    DEFAULT_RETRIEVER_TIMEOUT_MS, DEFAULT_RRF_K, DEFAULT_TOP_K,
};
use crate::refusal::RefusalPolicy;
use crate::verify::AttributionConfig;

/// Default dense retrieval service used when `CITEGUARD_RETRIEVER_URL` is not set.
pub const DEFAULT_RETRIEVER_URL: &str = "http://localhost:8000";

/// Pipeline configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Dense retrieval service. Default: `http://localhost:8000`.
    pub retriever_url: String,

    /// Sparse retrieval service; enables hybrid RRF retrieval when set.
    pub sparse_retriever_url: Option<String>,

    /// Ollama-compatible embedding endpoint. The hashing embedder is used when unset.
    pub embedder_url: Option<String>,

    pub embed_model: String,

    /// Generation model, resolved to a provider by `genai`.
    pub llm_model: String,

    /// Directory of `{paper_id}.json` chunk files. Retrieved text is used as-is when unset.
    pub chunks_dir: Option<PathBuf>,

    pub top_k: usize,
    pub retriever_timeout: Duration,
    pub llm_timeout: Duration,
    pub embedder_timeout: Duration,

    pub attribution_threshold: f32,
    pub confidence_threshold: f32,
    pub precision_threshold: f32,
    pub min_distinct_papers: usize,
    pub min_evidence: usize,
    pub max_attempts: usize,
    pub rrf_k: usize,
    pub answer_mode: AnswerMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            retriever_url: DEFAULT_RETRIEVER_URL.to_string(),
            sparse_retriever_url: None,
            embedder_url: None,
            embed_model: crate::embedding::DEFAULT_EMBED_MODEL.to_string(),
            llm_model: crate::llm::DEFAULT_LLM_MODEL.to_string(),
            chunks_dir: None,
            top_k: DEFAULT_TOP_K,
            retriever_timeout: Duration::from_millis(DEFAULT_RETRIEVER_TIMEOUT_MS),
            llm_timeout: Duration::from_millis(DEFAULT_LLM_TIMEOUT_MS),
            embedder_timeout: Duration::from_millis(DEFAULT_EMBEDDER_TIMEOUT_MS),
            attribution_threshold: DEFAULT_ATTRIBUTION_THRESHOLD,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            precision_threshold: DEFAULT_PRECISION_THRESHOLD,
            min_distinct_papers: DEFAULT_MIN_DISTINCT_PAPERS,
            min_evidence: DEFAULT_MIN_EVIDENCE,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            rrf_k: DEFAULT_RRF_K,
            answer_mode: AnswerMode::default(),
        }
    }
}

impl Config {
    const ENV_RETRIEVER_URL: &'static str = "CITEGUARD_RETRIEVER_URL";
    const ENV_SPARSE_RETRIEVER_URL: &'static str = "CITEGUARD_SPARSE_RETRIEVER_URL";
    const ENV_EMBEDDER_URL: &'static str = "CITEGUARD_EMBEDDER_URL";
    const ENV_EMBED_MODEL: &'static str = "CITEGUARD_EMBED_MODEL";
    const ENV_LLM_MODEL: &'static str = "CITEGUARD_LLM_MODEL";
    const ENV_CHUNKS_DIR: &'static str = "CITEGUARD_CHUNKS_DIR";
    const ENV_TOP_K: &'static str = "CITEGUARD_TOP_K";
    const ENV_RETRIEVER_TIMEOUT_MS: &'static str = "CITEGUARD_RETRIEVER_TIMEOUT_MS";
    const ENV_LLM_TIMEOUT_MS: &'static str = "CITEGUARD_LLM_TIMEOUT_MS";
    const ENV_EMBEDDER_TIMEOUT_MS: &'static str = "CITEGUARD_EMBEDDER_TIMEOUT_MS";
    const ENV_ATTRIBUTION_THRESHOLD: &'static str = "CITEGUARD_ATTRIBUTION_THRESHOLD";
    const ENV_CONFIDENCE_THRESHOLD: &'static str = "CITEGUARD_CONFIDENCE_THRESHOLD";
    const ENV_PRECISION_THRESHOLD: &'static str = "CITEGUARD_PRECISION_THRESHOLD";
    const ENV_MIN_DISTINCT_PAPERS: &'static str = "CITEGUARD_MIN_DISTINCT_PAPERS";
    const ENV_MIN_EVIDENCE: &'static str = "CITEGUARD_MIN_EVIDENCE";
    const ENV_MAX_ATTEMPTS: &'static str = "CITEGUARD_MAX_ATTEMPTS";
    const ENV_RRF_K: &'static str = "CITEGUARD_RRF_K";
    const ENV_ANSWER_MODE: &'static str = "CITEGUARD_ANSWER_MODE";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let retriever_url =
            Self::parse_string_from_env(Self::ENV_RETRIEVER_URL, defaults.retriever_url);
        let sparse_retriever_url =
            Self::parse_optional_string_from_env(Self::ENV_SPARSE_RETRIEVER_URL);
        let embedder_url = Self::parse_optional_string_from_env(Self::ENV_EMBEDDER_URL);
        let embed_model = Self::parse_string_from_env(Self::ENV_EMBED_MODEL, defaults.embed_model);
        let llm_model = Self::parse_string_from_env(Self::ENV_LLM_MODEL, defaults.llm_model);
        let chunks_dir =
            Self::parse_optional_string_from_env(Self::ENV_CHUNKS_DIR).map(PathBuf::from);

        let top_k = Self::parse_from_env(Self::ENV_TOP_K, defaults.top_k)?;
        let retriever_timeout =
            Self::parse_millis_from_env(Self::ENV_RETRIEVER_TIMEOUT_MS, defaults.retriever_timeout)?;
        let llm_timeout = Self::parse_millis_from_env(Self::ENV_LLM_TIMEOUT_MS, defaults.llm_timeout)?;
        let embedder_timeout =
            Self::parse_millis_from_env(Self::ENV_EMBEDDER_TIMEOUT_MS, defaults.embedder_timeout)?;

        let attribution_threshold =
            Self::parse_from_env(Self::ENV_ATTRIBUTION_THRESHOLD, defaults.attribution_threshold)?;
        let confidence_threshold =
            Self::parse_from_env(Self::ENV_CONFIDENCE_THRESHOLD, defaults.confidence_threshold)?;
        let precision_threshold =
            Self::parse_from_env(Self::ENV_PRECISION_THRESHOLD, defaults.precision_threshold)?;
        let min_distinct_papers =
            Self::parse_from_env(Self::ENV_MIN_DISTINCT_PAPERS, defaults.min_distinct_papers)?;
        let min_evidence = Self::parse_from_env(Self::ENV_MIN_EVIDENCE, defaults.min_evidence)?;
        let max_attempts = Self::parse_from_env(Self::ENV_MAX_ATTEMPTS, defaults.max_attempts)?;
        let rrf_k = Self::parse_from_env(Self::ENV_RRF_K, defaults.rrf_k)?;
        let answer_mode = Self::parse_from_env(Self::ENV_ANSWER_MODE, defaults.answer_mode)?;

        Ok(Self {
            retriever_url,
            sparse_retriever_url,
            embedder_url,
            embed_model,
            llm_model,
            chunks_dir,
            top_k,
            retriever_timeout,
            llm_timeout,
            embedder_timeout,
            attribution_threshold,
            confidence_threshold,
            precision_threshold,
            min_distinct_papers,
            min_evidence,
            max_attempts,
            rrf_k,
            answer_mode,
        })
    }

    /// Checks ranges and paths (does not create directories).
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("attribution_threshold", self.attribution_threshold),
            ("confidence_threshold", self.confidence_threshold),
            ("precision_threshold", self.precision_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidValue {
                    name,
                    reason: format!("must be between 0.0 and 1.0, got {value}"),
                });
            }
        }

        for (name, value) in [
            ("max_attempts", self.max_attempts),
            ("rrf_k", self.rrf_k),
            ("top_k", self.top_k),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    name,
                    reason: "must be greater than 0".to_string(),
                });
            }
        }

        for (name, timeout) in [
            ("retriever_timeout", self.retriever_timeout),
            ("llm_timeout", self.llm_timeout),
            ("embedder_timeout", self.embedder_timeout),
        ] {
            if timeout.is_zero() {
                return Err(ConfigError::InvalidValue {
                    name,
                    reason: "must be greater than 0ms".to_string(),
                });
            }
        }

        if self.retriever_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "retriever_url",
                reason: "cannot be empty".to_string(),
            });
        }

        if let Some(ref path) = self.chunks_dir {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_dir() {
                return Err(ConfigError::NotADirectory { path: path.clone() });
            }
        }

        Ok(())
    }

    /// Component configuration for the answer orchestrator.
    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            min_evidence: self.min_evidence,
            max_attempts: self.max_attempts,
            min_response_chars: DEFAULT_MIN_RESPONSE_CHARS,
            mode: self.answer_mode,
            attribution: AttributionConfig::new(self.attribution_threshold),
            confidence: ConfidenceConfig {
                recall_k: self.top_k,
                ..ConfidenceConfig::default()
            },
            refusal: RefusalPolicy {
                confidence_threshold: self.confidence_threshold,
                precision_threshold: self.precision_threshold,
                min_distinct_papers: self.min_distinct_papers,
            },
        }
    }

    fn parse_from_env<T>(var_name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        match env::var(var_name) {
            Ok(value) => value
                .trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::ParseError {
                    name: var_name,
                    value: value.clone(),
                    reason: e.to_string(),
                }),
            Err(_) => Ok(default),
        }
    }

    fn parse_millis_from_env(
        var_name: &'static str,
        default: Duration,
    ) -> Result<Duration, ConfigError> {
        let default_ms = default.as_millis() as u64;
        Self::parse_from_env(var_name, default_ms).map(Duration::from_millis)
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        Self::parse_optional_string_from_env(var_name).unwrap_or(default)
    }
}
