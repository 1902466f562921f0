//! Answer orchestration.
//!
//! [`Orchestrator`] runs one query through a small state machine:
//!
//! ```text
//! Retrieving -> Prompting -> Generating -> Verifying -> Success
//!                               ^             |
//!                               +-- Retry <---+-------> Refused
//! ```
//!
//! Format problems (short responses, missing or out-of-range citations) are fed back to
//! the generator and retried up to `max_attempts`. Policy refusals during verification
//! end the query immediately.

mod config;
mod error;
mod orchestrator;
mod prompt;
mod types;

#[cfg(test)]
mod tests;

pub use config::{AnswerMode, OrchestratorConfig};
pub use error::AnswerError;
pub use orchestrator::Orchestrator;
pub use prompt::{PromptBuilder, clean_evidence_text, format_evidence, rejection_notice};
pub use types::{AnswerMetrics, AnswerPhase, Citation, FinalAnswer};
