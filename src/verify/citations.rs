use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::types::{OutOfBoundsCitation, SyntaxResult};
use crate::evidence::EvidenceChunk;
use crate::segment::split_sentences;

/// `[1]`, `[2, 5]`, `[ 3,4 ]`.
static CITATION_GROUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\s*(\d+(?:\s*,\s*\d+)*)\s*\]").expect("citation pattern is valid")
});

/// Raw citation numbers in `text`, in order of appearance.
pub fn citation_markers(text: &str) -> Vec<&str> {
    CITATION_GROUP
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .flat_map(|group| group.as_str().split(','))
        .map(str::trim)
        .collect()
}

/// Parses a raw marker into a 1-based index within `[1, evidence_len]`.
pub fn resolve_marker(raw: &str, evidence_len: usize) -> Option<usize> {
    raw.parse::<usize>()
        .ok()
        .filter(|&idx| idx >= 1 && idx <= evidence_len)
}

/// In-range citation indices in `text`, in order of appearance (repeats kept).
pub fn cited_in_order(text: &str, evidence_len: usize) -> Vec<usize> {
    citation_markers(text)
        .into_iter()
        .filter_map(|raw| resolve_marker(raw, evidence_len))
        .collect()
}

/// Validates that inline `[n]` markers refer to real evidence positions.
#[derive(Debug, Clone, Copy, Default)]
pub struct CitationChecker;

impl CitationChecker {
    pub fn new() -> Self {
        Self
    }

    /// Checks every sentence of `answer_text` against `evidence`.
    ///
    /// Out-of-range markers are reported per sentence, never dropped. An answer
    /// with no sentences fails outright; an answer with sentences but no markers
    /// passes here and is left to the caller to reject.
    pub fn check(&self, answer_text: &str, evidence: &[EvidenceChunk]) -> SyntaxResult {
        let sentences = split_sentences(answer_text);
        let available = evidence.len();

        if sentences.is_empty() {
            return SyntaxResult {
                verification_passed: false,
                errors: vec!["Empty answer: no sentences to check".to_string()],
                cited_indices: BTreeSet::new(),
                out_of_bounds: vec![],
                sentence_count: 0,
            };
        }

        let mut cited_indices = BTreeSet::new();
        let mut out_of_bounds = Vec::new();
        let mut errors = Vec::new();

        for (i, sentence) in sentences.iter().enumerate() {
            for raw in citation_markers(sentence) {
                match resolve_marker(raw, available) {
                    Some(idx) => {
                        cited_indices.insert(idx);
                    }
                    None => {
                        errors.push(out_of_bounds_message(i + 1, raw, available));
                        out_of_bounds.push(OutOfBoundsCitation {
                            sentence: i + 1,
                            index: raw.to_string(),
                        });
                    }
                }
            }
        }

        debug!(
            sentences = sentences.len(),
            cited = cited_indices.len(),
            out_of_bounds = out_of_bounds.len(),
            "Citation syntax check complete"
        );

        SyntaxResult {
            verification_passed: out_of_bounds.is_empty(),
            errors,
            cited_indices,
            out_of_bounds,
            sentence_count: sentences.len(),
        }
    }
}

fn out_of_bounds_message(sentence: usize, raw: &str, available: usize) -> String {
    if available == 0 {
        format!("Sentence {sentence}: citation [{raw}] out of bounds (no evidence available)")
    } else {
        format!("Sentence {sentence}: citation [{raw}] out of bounds (available 1-{available})")
    }
}
