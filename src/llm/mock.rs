use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{Generator, LlmError};

/// One scripted generator outcome.
#[derive(Debug, Clone)]
pub enum MockReply {
    Text(String),
    Empty,
    Timeout,
    /// Retryable provider failure such as a rate limit.
    ProviderError,
    Unavailable,
}

/// Generator that replays scripted replies and records every prompt.
///
/// Once the script runs out the last reply repeats. An empty script always answers
/// with [`LlmError::EmptyResponse`].
#[derive(Debug, Default)]
pub struct MockGenerator {
    script: Mutex<VecDeque<MockReply>>,
    last: Mutex<Option<MockReply>>,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl MockGenerator {
    pub fn new(replies: Vec<MockReply>) -> Self {
        Self {
            script: Mutex::new(replies.into()),
            ..Self::default()
        }
    }

    /// Always answers with `text`.
    pub fn always(text: impl Into<String>) -> Self {
        Self::new(vec![MockReply::Text(text.into())])
    }

    /// Answers with each text in turn.
    pub fn sequence<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(texts.into_iter().map(|t| MockReply::Text(t.into())).collect())
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    fn next_reply(&self) -> Option<MockReply> {
        let mut last = self.last.lock();
        if let Some(reply) = self.script.lock().pop_front() {
            *last = Some(reply);
        }
        last.clone()
    }
}

#[async_trait]
impl Generator for MockGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().push(prompt.to_string());

        match self.next_reply() {
            Some(MockReply::Text(text)) if !text.trim().is_empty() => Ok(text),
            Some(MockReply::Text(_)) | Some(MockReply::Empty) | None => {
                Err(LlmError::EmptyResponse)
            }
            Some(MockReply::Timeout) => Err(LlmError::Timeout { timeout_ms: 0 }),
            Some(MockReply::ProviderError) => Err(LlmError::Provider {
                model: "mock".to_string(),
                message: "429 Too Many Requests".to_string(),
            }),
            Some(MockReply::Unavailable) => Err(LlmError::Unavailable {
                model: "mock".to_string(),
                message: "connection refused".to_string(),
            }),
        }
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}
