use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::confidence::ConfidenceConfig;
use crate::constants::{DEFAULT_MAX_ATTEMPTS, DEFAULT_MIN_EVIDENCE, DEFAULT_MIN_RESPONSE_CHARS};
use crate::refusal::RefusalPolicy;
use crate::verify::AttributionConfig;

/// How the generator is instructed to use the evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerMode {
    /// Answer strictly from the evidence, saying so when it is insufficient.
    #[default]
    Strict,
    /// Combine claims across sources. Answers are prefixed with `SYNTHESIS: `.
    Synthesis,
}

impl AnswerMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerMode::Strict => "strict",
            AnswerMode::Synthesis => "synthesis",
        }
    }
}

impl std::fmt::Display for AnswerMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnswerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(AnswerMode::Strict),
            "synthesis" => Ok(AnswerMode::Synthesis),
            other => Err(format!("unknown answer mode '{other}' (expected strict or synthesis)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorConfig {
    /// Hydrated chunks required before any generation attempt.
    pub min_evidence: usize,
    pub max_attempts: usize,
    pub min_response_chars: usize,
    pub mode: AnswerMode,
    pub attribution: AttributionConfig,
    pub confidence: ConfidenceConfig,
    pub refusal: RefusalPolicy,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            min_evidence: DEFAULT_MIN_EVIDENCE,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            min_response_chars: DEFAULT_MIN_RESPONSE_CHARS,
            mode: AnswerMode::default(),
            attribution: AttributionConfig::default(),
            confidence: ConfidenceConfig::default(),
            refusal: RefusalPolicy::default(),
        }
    }
}

impl OrchestratorConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 {
            return Err("max_attempts must be at least 1".to_string());
        }
        self.attribution.validate()?;
        self.confidence.validate()?;
        self.refusal.validate()?;
        Ok(())
    }
}
