use std::sync::LazyLock;

use regex::Regex;

use super::config::AnswerMode;
use crate::evidence::EvidenceChunk;

static BRACKETED_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\d+\]").expect("bracket pattern is valid"));

/// `(Chen et al., 2024)`, `(Smith, 2019)`.
static AUTHOR_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\([A-Za-z\s.,]+?\d{4}\)").expect("author-year pattern is valid")
});

/// Strips foreign citation markers from chunk text so the generator does not copy them.
pub fn clean_evidence_text(text: &str) -> String {
    let without_brackets = BRACKETED_NUMBER.replace_all(text, "");
    let without_author_year = AUTHOR_YEAR.replace_all(&without_brackets, "");
    without_author_year
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// `[1] text` blocks separated by blank lines.
pub fn format_evidence(evidence: &[EvidenceChunk]) -> String {
    evidence
        .iter()
        .enumerate()
        .map(|(i, chunk)| format!("[{}] {}", i + 1, clean_evidence_text(chunk.text_or_empty())))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Feedback appended to the prompt after a rejected attempt.
pub fn rejection_notice(attempt: usize, errors: &[String]) -> String {
    format!(
        "REJECTED PREVIOUS ATTEMPT {attempt}: {}. Cite only with [1], [2] markers that refer to the evidence list. Do not use author names or years.",
        errors.join("; ")
    )
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PromptBuilder {
    mode: AnswerMode,
}

impl PromptBuilder {
    pub fn new(mode: AnswerMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> AnswerMode {
        self.mode
    }

    /// First-attempt prompt.
    pub fn build(&self, query: &str, evidence: &[EvidenceChunk]) -> String {
        let task = match self.mode {
            AnswerMode::Strict => {
                "Write a clear, detailed paragraph answering the question using only the evidence sources. \
                 If the evidence does not answer the question, say that the evidence is insufficient."
            }
            AnswerMode::Synthesis => {
                "Synthesize one coherent paragraph that combines what the evidence sources say about the question. \
                 Every claim must still come from the evidence."
            }
        };

        format!(
            "Question: {query}\n\n\
             Evidence Sources:\n{evidence}\n\n\
             Instructions:\n\
             1. {task}\n\
             2. CITATION RULE: End every sentence with the [index] of the evidence that supports it.\n   \
             - CORRECT: \"The model improves accuracy [1].\"\n   \
             - WRONG: \"The model improves accuracy (Chen et al., 2024).\"\n\
             3. Do not mention author names or years. Only use the numbers [1], [2], etc.\n\n\
             Answer:",
            evidence = format_evidence(evidence),
        )
    }

    /// `base` followed by every rejection notice so far.
    pub fn with_notices(&self, base: &str, notices: &[String]) -> String {
        if notices.is_empty() {
            return base.to_string();
        }
        format!("{base}\n\n{}", notices.join("\n"))
    }

    /// Applies the mode's presentation rules to an accepted answer.
    pub fn finalize(&self, answer: String) -> String {
        match self.mode {
            AnswerMode::Synthesis if !answer.trim_start().to_lowercase().starts_with("synthesis") => {
                format!("SYNTHESIS: {answer}")
            }
            _ => answer,
        }
    }
}
