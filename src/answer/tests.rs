use std::sync::Arc;

use super::*;
use crate::embedding::HashingEmbedder;
use crate::evidence::EvidenceChunk;
use crate::llm::{MockGenerator, MockReply};
use crate::refusal::RefusalReason;
use crate::retrieval::{MockHydrator, MockRetriever, PassthroughHydrator};

const ATTENTION: &str = "Transformers replace recurrence with self attention layers.";
const SPARSE: &str = "Sparse retrieval ranks documents using term frequency statistics.";
const DENSE: &str = "Dense retrieval encodes queries and passages into vectors.";

fn evidence() -> Vec<EvidenceChunk> {
    vec![
        EvidenceChunk::new("paper-a", "Introduction", "a-1").with_text(ATTENTION),
        EvidenceChunk::new("paper-b", "Methods", "b-1").with_text(SPARSE),
        EvidenceChunk::new("paper-c", "Methods", "c-1").with_text(DENSE),
    ]
}

fn orchestrator(
    chunks: Vec<EvidenceChunk>,
    generator: Arc<MockGenerator>,
    config: OrchestratorConfig,
) -> Orchestrator {
    Orchestrator::new(
        Arc::new(MockRetriever::new(chunks)),
        Arc::new(PassthroughHydrator),
        generator,
        Arc::new(HashingEmbedder::new(4096).unwrap()),
        config,
    )
    .unwrap()
}

// ---- prompt ----

#[test]
fn test_clean_evidence_text_strips_foreign_citations() {
    let cleaned = clean_evidence_text("BERT  improves GLUE [12] (Devlin et al., 2019)\n scores.");
    assert_eq!(cleaned, "BERT improves GLUE scores.");
}

#[test]
fn test_format_evidence_numbers_blocks_from_one() {
    let formatted = format_evidence(&evidence()[..2]);
    assert_eq!(formatted, format!("[1] {ATTENTION}\n\n[2] {SPARSE}"));
}

#[test]
fn test_format_evidence_unhydrated_chunk_is_blank() {
    let formatted = format_evidence(&[EvidenceChunk::new("p", "s", "c")]);
    assert_eq!(formatted, "[1] ");
}

#[test]
fn test_rejection_notice_text() {
    let notice = rejection_notice(1, &["Response too short".to_string(), "bad [9]".to_string()]);
    assert_eq!(
        notice,
        "REJECTED PREVIOUS ATTEMPT 1: Response too short; bad [9]. Cite only with [1], [2] markers that refer to the evidence list. Do not use author names or years."
    );
}

#[test]
fn test_prompt_contains_question_and_evidence() {
    let prompt = PromptBuilder::new(AnswerMode::Strict).build("What is attention?", &evidence());
    assert!(prompt.starts_with("Question: What is attention?"));
    assert!(prompt.contains(&format!("[3] {DENSE}")));
    assert!(prompt.contains("CITATION RULE"));
    assert!(prompt.ends_with("Answer:"));
}

#[test]
fn test_prompt_with_notices_appends_in_order() {
    let builder = PromptBuilder::default();
    assert_eq!(builder.with_notices("base", &[]), "base");
    assert_eq!(
        builder.with_notices("base", &["one".to_string(), "two".to_string()]),
        "base\n\none\ntwo"
    );
}

#[test]
fn test_synthesis_prefix_added_once() {
    let builder = PromptBuilder::new(AnswerMode::Synthesis);
    assert_eq!(builder.finalize("A [1].".to_string()), "SYNTHESIS: A [1].");
    assert_eq!(builder.finalize("Synthesis: A [1].".to_string()), "Synthesis: A [1].");
    assert_eq!(PromptBuilder::new(AnswerMode::Strict).finalize("A [1].".to_string()), "A [1].");
}

// ---- config ----

#[test]
fn test_answer_mode_parsing() {
    assert_eq!("strict".parse::<AnswerMode>().unwrap(), AnswerMode::Strict);
    assert_eq!(" Synthesis ".parse::<AnswerMode>().unwrap(), AnswerMode::Synthesis);
    assert!("creative".parse::<AnswerMode>().is_err());
    assert_eq!(AnswerMode::Synthesis.to_string(), "synthesis");
}

#[test]
fn test_config_validation() {
    assert!(OrchestratorConfig::default().validate().is_ok());

    let zero_attempts = OrchestratorConfig {
        max_attempts: 0,
        ..OrchestratorConfig::default()
    };
    assert!(zero_attempts.validate().is_err());

    let result = Orchestrator::new(
        Arc::new(MockRetriever::new(vec![])),
        Arc::new(PassthroughHydrator),
        Arc::new(MockGenerator::default()),
        Arc::new(HashingEmbedder::default()),
        zero_attempts,
    );
    assert!(matches!(result, Err(AnswerError::InvalidConfig { .. })));
}

#[test]
fn test_phase_terminality() {
    assert!(AnswerPhase::Success.is_terminal());
    assert!(AnswerPhase::Refused.is_terminal());
    assert!(!AnswerPhase::Retry.is_terminal());
}

// ---- orchestrator ----

#[tokio::test]
async fn test_accepts_supported_answer() {
    let generator = Arc::new(MockGenerator::always(format!(
        "{} [1]. {} [2].",
        ATTENTION.trim_end_matches('.'),
        SPARSE.trim_end_matches('.')
    )));
    let orch = orchestrator(evidence(), generator.clone(), OrchestratorConfig::default());

    let answer = orch.answer("How do transformers and sparse retrieval work?").await.unwrap();

    assert!(!answer.refused);
    assert_eq!(answer.refusal, None);
    assert_eq!(answer.sentences.len(), 2);
    assert!(answer.answer.as_deref().unwrap().ends_with("statistics [2]."));
    assert_eq!(answer.citations.len(), 2);
    assert_eq!(answer.citations[0].evidence_index, 1);
    assert_eq!(answer.citations[0].paper_id, "paper-a");
    assert_eq!(answer.citations[1].citation_id, 2);
    assert_eq!(answer.metrics.attempts, 1);
    assert_eq!(answer.metrics.retrieved_chunks, 3);
    assert!(!answer.metrics.truncated);
    assert!(!answer.metrics.refusal_triggered);
    let confidence = answer.metrics.confidence.unwrap();
    assert_eq!(confidence.alignment_score, 1.0);
    assert_eq!(generator.call_count(), 1);
}

#[tokio::test]
async fn test_citations_deduplicated_in_first_seen_order() {
    let generator = Arc::new(MockGenerator::always(format!(
        "{} [2]. {} [1, 2].",
        SPARSE.trim_end_matches('.'),
        ATTENTION.trim_end_matches('.')
    )));
    let orch = orchestrator(evidence(), generator, OrchestratorConfig::default());

    let answer = orch.answer("q").await.unwrap();

    let indices: Vec<(usize, usize)> = answer
        .citations
        .iter()
        .map(|c| (c.citation_id, c.evidence_index))
        .collect();
    assert_eq!(indices, vec![(1, 2), (2, 1)]);
}

#[tokio::test]
async fn test_empty_response_is_retried() {
    let generator = Arc::new(MockGenerator::new(vec![
        MockReply::Empty,
        MockReply::Text(format!("{} [3].", DENSE.trim_end_matches('.'))),
    ]));
    let orch = orchestrator(evidence(), generator.clone(), OrchestratorConfig::default());

    let answer = orch.answer("q").await.unwrap();

    assert!(!answer.refused);
    assert_eq!(answer.metrics.attempts, 2);
    assert_eq!(generator.call_count(), 2);
    assert!(generator.prompts()[1].contains("REJECTED PREVIOUS ATTEMPT 1: Empty response"));
}

#[tokio::test]
async fn test_timeout_counts_as_empty_response() {
    let generator = Arc::new(MockGenerator::new(vec![MockReply::Timeout]));
    let orch = orchestrator(evidence(), generator.clone(), OrchestratorConfig::default());

    let answer = orch.answer("q").await.unwrap();

    assert_eq!(answer.refusal, Some(RefusalReason::MaxRetriesFailed));
    assert_eq!(generator.call_count(), 2);
    assert_eq!(answer.metrics.last_attempt_errors, vec!["Empty response"]);
}

#[tokio::test]
async fn test_provider_failure_is_retried_until_budget_runs_out() {
    let generator = Arc::new(MockGenerator::new(vec![MockReply::ProviderError]));
    let orch = orchestrator(evidence(), generator.clone(), OrchestratorConfig::default());

    let answer = orch.answer("q").await.unwrap();

    assert!(answer.refused);
    assert_eq!(answer.refusal, Some(RefusalReason::MaxRetriesFailed));
    assert_eq!(generator.call_count(), 2);
    assert_eq!(answer.metrics.last_attempt_errors, vec!["Empty response"]);
}

#[tokio::test]
async fn test_provider_failure_then_valid_answer_is_accepted() {
    let generator = Arc::new(MockGenerator::new(vec![
        MockReply::ProviderError,
        MockReply::Text(format!("{} [2].", SPARSE.trim_end_matches('.'))),
    ]));
    let orch = orchestrator(evidence(), generator.clone(), OrchestratorConfig::default());

    let answer = orch.answer("q").await.unwrap();

    assert!(!answer.refused);
    assert_eq!(answer.metrics.attempts, 2);
}

#[tokio::test]
async fn test_short_and_uncited_responses_are_retried() {
    let generator = Arc::new(MockGenerator::sequence([
        "Too short [1].",
        "This sentence has no citation markers at all.",
        "Transformers replace recurrence with self attention layers [1].",
    ]));
    let config = OrchestratorConfig {
        max_attempts: 3,
        ..OrchestratorConfig::default()
    };
    let orch = orchestrator(evidence(), generator.clone(), config);

    let answer = orch.answer("q").await.unwrap();

    assert!(!answer.refused);
    assert_eq!(answer.metrics.attempts, 3);
    let prompts = generator.prompts();
    assert!(prompts[1].contains("Response too short"));
    assert!(prompts[2].contains("REJECTED PREVIOUS ATTEMPT 1"));
    assert!(prompts[2].contains("REJECTED PREVIOUS ATTEMPT 2: No [index] citations found"));
}

#[tokio::test]
async fn test_unsupported_sentence_refuses_without_retry() {
    let generator = Arc::new(MockGenerator::always(format!(
        "{} [1]. Penguins migrate across frozen oceans every winter [2].",
        ATTENTION.trim_end_matches('.')
    )));
    let orch = orchestrator(evidence(), generator.clone(), OrchestratorConfig::default());

    let answer = orch.answer("q").await.unwrap();

    assert!(answer.refused);
    assert_eq!(answer.refusal_reason.as_deref(), Some("Unsupported sentence at index 1"));
    assert!(answer.answer.is_none());
    assert!(answer.citations.is_empty());
    assert_eq!(answer.sentences.len(), 2);
    assert!(answer.metrics.truncated);
    assert_eq!(answer.metrics.total_sentences, 1);
    assert_eq!(answer.metrics.unaligned_sentences, 1);
    assert_eq!(generator.call_count(), 1);
}

#[tokio::test]
async fn test_unhydrated_chunks_are_dropped_before_evidence_check() {
    let bare: Vec<EvidenceChunk> = evidence()
        .into_iter()
        .map(|c| EvidenceChunk::new(c.paper_id, c.section, c.chunk_id))
        .collect();
    let hydrator = MockHydrator::new()
        .with_text("paper-a", "a-1", ATTENTION)
        .with_text("paper-b", "b-1", SPARSE);
    let generator = Arc::new(MockGenerator::always("unused"));

    let orch = Orchestrator::new(
        Arc::new(MockRetriever::new(bare)),
        Arc::new(hydrator),
        generator.clone(),
        Arc::new(HashingEmbedder::default()),
        OrchestratorConfig::default(),
    )
    .unwrap();

    let answer = orch.answer("q").await.unwrap();

    assert_eq!(answer.refusal, Some(RefusalReason::InsufficientInformation));
    assert_eq!(answer.metrics.retrieved_chunks, 2);
    assert_eq!(answer.evidence.len(), 2);
    assert_eq!(generator.call_count(), 0);
}

#[tokio::test]
async fn test_synthesis_mode_prefixes_answer() {
    let generator = Arc::new(MockGenerator::always(format!(
        "{} [3].",
        DENSE.trim_end_matches('.')
    )));
    let config = OrchestratorConfig {
        mode: AnswerMode::Synthesis,
        ..OrchestratorConfig::default()
    };
    let orch = orchestrator(evidence(), generator, config);

    let answer = orch.answer("q").await.unwrap();
    assert!(answer.answer.unwrap().starts_with("SYNTHESIS: Dense retrieval"));
}

#[tokio::test]
async fn test_unavailable_generator_propagates() {
    let generator = Arc::new(MockGenerator::new(vec![MockReply::Unavailable]));
    let orch = orchestrator(evidence(), generator, OrchestratorConfig::default());

    assert!(matches!(
        orch.answer("q").await,
        Err(AnswerError::Generation(_))
    ));
}

#[tokio::test]
async fn test_unavailable_retriever_propagates() {
    let orch = Orchestrator::new(
        Arc::new(MockRetriever::unavailable()),
        Arc::new(PassthroughHydrator),
        Arc::new(MockGenerator::default()),
        Arc::new(HashingEmbedder::default()),
        OrchestratorConfig::default(),
    )
    .unwrap();

    assert!(matches!(orch.answer("q").await, Err(AnswerError::Retrieval(_))));
}

#[tokio::test]
async fn test_answers_carry_distinct_ids() {
    let generator = Arc::new(MockGenerator::always("unused"));
    let orch = orchestrator(vec![], generator, OrchestratorConfig::default());

    let first = orch.answer("q").await.unwrap();
    let second = orch.answer("q").await.unwrap();
    assert_ne!(first.query_id, second.query_id);
    assert_eq!(first.display_text(), crate::constants::REFUSAL_MESSAGE);
}
