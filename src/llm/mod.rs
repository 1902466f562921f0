//! Text generation collaborators.

mod error;
mod genai_client;

#[cfg(any(test, feature = "mock"))]
pub mod mock;


pub use error::LlmError;
pub use genai_client::{DEFAULT_LLM_MODEL, GenaiGenerator, GenaiGeneratorConfig, SYSTEM_PROMPT};
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockGenerator, MockReply};

use std::sync::Arc;

use async_trait::async_trait;

#[async_trait]
/// Prompt in, text out.
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;

    fn model_name(&self) -> &str;
}

#[async_trait]
impl<G: Generator + ?Sized> Generator for Arc<G> {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        (**self).generate(prompt).await
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}
