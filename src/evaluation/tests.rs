use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use super::*;
use crate::answer::{AnswerMetrics, Citation, Orchestrator, OrchestratorConfig};
use crate::embedding::HashingEmbedder;
use crate::evidence::EvidenceChunk;
use crate::llm::MockGenerator;
use crate::refusal::RefusalPolicy;
use crate::retrieval::{MockRetriever, PassthroughHydrator};

const ATTENTION: &str = "Transformers replace recurrence with self attention layers.";
const SPARSE: &str = "Sparse retrieval ranks documents using term frequency statistics.";
const DENSE: &str = "Dense retrieval encodes queries and passages into vectors.";

fn answer_citing(papers: &[&str]) -> FinalAnswer {
    FinalAnswer {
        query_id: Uuid::new_v4(),
        query: "q".to_string(),
        answer: Some("a [1].".to_string()),
        sentences: vec![],
        citations: papers
            .iter()
            .enumerate()
            .map(|(i, p)| Citation {
                citation_id: i + 1,
                evidence_index: i + 1,
                paper_id: p.to_string(),
                section: "s".to_string(),
                chunk_id: format!("c{i}"),
                score: 0.5,
            })
            .collect(),
        evidence: vec![],
        metrics: AnswerMetrics::default(),
        refused: false,
        refusal: None,
        refusal_reason: None,
        created_at: Utc::now(),
    }
}

#[test]
fn test_precision_at_k() {
    let retrieved = ["a", "x", "ARXIV:B", "y"];
    assert!((precision_at_k(&retrieved, &["a", "b"], 4) - 0.5).abs() < 1e-12);
    assert!((precision_at_k(&retrieved, &["a", "b"], 2) - 0.5).abs() < 1e-12);
    assert!((precision_at_k(&retrieved, &["a", "b"], 1) - 1.0).abs() < 1e-12);
}

#[test]
fn test_precision_degenerate_inputs() {
    let empty: [&str; 0] = [];
    assert_eq!(precision_at_k(&["a"], &empty, 5), 0.0);
    assert_eq!(precision_at_k(&["a"], &["a"], 0), 0.0);
}

#[test]
fn test_recall_at_k_counts_distinct_relevant() {
    let retrieved = ["2401.00001v2", "2401.00001", "zzz"];
    let relevant = ["arxiv:2401.00001", "2401.00002"];

    assert!((recall_at_k(&retrieved, &relevant, 10) - 0.5).abs() < 1e-12);
    assert_eq!(recall_at_k(&retrieved[2..], &relevant, 10), 0.0);
}

#[test]
fn test_recall_respects_k() {
    assert_eq!(recall_at_k(&["x", "a"], &["a"], 1), 0.0);
    assert_eq!(recall_at_k(&["x", "a"], &["a"], 2), 1.0);
}

#[test]
fn test_cited_relevant() {
    let answer = answer_citing(&["other", "2301.12345v1"]);
    assert!(cited_relevant(&answer, &["2301.12345"]));
    assert!(!cited_relevant(&answer, &["2301.99999"]));
    assert!(!cited_relevant(&answer_citing(&[]), &["2301.12345"]));
}

// ---- answer-level evaluation ----

fn labeled(id: &str, relevant: &[&str], should_refuse: bool) -> LabeledQuery {
    LabeledQuery {
        id: id.to_string(),
        query: format!("question {id}"),
        relevant_papers: relevant.iter().map(|p| p.to_string()).collect(),
        should_refuse,
    }
}

fn labeled_set() -> Vec<LabeledQuery> {
    vec![
        labeled("unanswerable", &["paper-z"], true),
        labeled("sparse", &["paper-b"], false),
        labeled("elsewhere", &["paper-z"], false),
    ]
}

fn cited(text: &str, marker: &str) -> String {
    format!("{} {marker}.", text.trim_end_matches('.'))
}

fn evaluated_orchestrator(
    generator: Arc<MockGenerator>,
    config: OrchestratorConfig,
) -> Orchestrator {
    let evidence = vec![
        EvidenceChunk::new("paper-a", "Introduction", "a-1").with_text(ATTENTION),
        EvidenceChunk::new("paper-b", "Methods", "b-1").with_text(SPARSE),
        EvidenceChunk::new("paper-c", "Methods", "c-1").with_text(DENSE),
    ];
    Orchestrator::new(
        Arc::new(MockRetriever::new(evidence)),
        Arc::new(PassthroughHydrator),
        generator,
        Arc::new(HashingEmbedder::new(4096).unwrap()),
        config,
    )
    .unwrap()
}

#[tokio::test]
async fn test_refusal_evaluation_counts_low_confidence_refusals() {
    let generator = Arc::new(MockGenerator::always(cited(ATTENTION, "[1]")));
    let config = OrchestratorConfig {
        refusal: RefusalPolicy {
            confidence_threshold: 0.99,
            ..RefusalPolicy::default()
        },
        ..OrchestratorConfig::default()
    };
    let orch = evaluated_orchestrator(generator.clone(), config);

    let report = evaluate_refusals(&orch, &labeled_set()).await.unwrap();

    assert_eq!(report.refusal_accuracy, 1.0);
    assert_eq!(report.confidence_refusals, 1);
    assert_eq!(report.per_query.len(), 1);
    let outcome = &report.per_query["unanswerable"];
    assert!(outcome.refused);
    assert!(outcome.correct);
    assert!(outcome.confidence > 0.0);
    assert!(outcome.refusal_reason.as_deref().unwrap().starts_with("Low Confidence"));
    assert_eq!(generator.call_count(), 1);
}

#[tokio::test]
async fn test_refusal_evaluation_flags_answered_query() {
    let generator = Arc::new(MockGenerator::always(cited(ATTENTION, "[1]")));
    let orch = evaluated_orchestrator(generator, OrchestratorConfig::default());

    let report = evaluate_refusals(&orch, &labeled_set()).await.unwrap();

    assert_eq!(report.refusal_accuracy, 0.0);
    assert_eq!(report.confidence_refusals, 0);
    let outcome = &report.per_query["unanswerable"];
    assert!(!outcome.refused);
    assert!(!outcome.correct);
    assert_eq!(outcome.refusal_reason, None);
}

#[tokio::test]
async fn test_refusal_evaluation_without_refusal_queries() {
    let generator = Arc::new(MockGenerator::always(cited(ATTENTION, "[1]")));
    let orch = evaluated_orchestrator(generator.clone(), OrchestratorConfig::default());
    let answerable = vec![labeled("sparse", &["paper-b"], false)];

    let report = evaluate_refusals(&orch, &answerable).await.unwrap();

    assert_eq!(report.refusal_accuracy, 1.0);
    assert!(report.per_query.is_empty());
    assert_eq!(generator.call_count(), 0);
}

#[tokio::test]
async fn test_citation_evaluation_scores_answerable_queries() {
    let generator = Arc::new(MockGenerator::always(cited(SPARSE, "[2]")));
    let orch = evaluated_orchestrator(generator.clone(), OrchestratorConfig::default());

    let report = evaluate_citations(&orch, &labeled_set()).await.unwrap();

    assert_eq!(report.total_evaluated, 2);
    assert!((report.citation_precision - 0.5).abs() < 1e-12);
    assert_eq!(generator.call_count(), 2);
}

#[tokio::test]
async fn test_citation_evaluation_skips_uncited_answers() {
    let generator = Arc::new(MockGenerator::always(cited(SPARSE, "[7]")));
    let orch = evaluated_orchestrator(generator, OrchestratorConfig::default());

    let report = evaluate_citations(&orch, &labeled_set()).await.unwrap();

    assert_eq!(report, CitationReport::default());
}

#[test]
fn test_labeled_query_defaults_from_json() {
    let query: LabeledQuery =
        serde_json::from_str(r#"{"id": "q1", "query": "What is RRF?"}"#).unwrap();
    assert!(query.relevant_papers.is_empty());
    assert!(!query.should_refuse);
}
