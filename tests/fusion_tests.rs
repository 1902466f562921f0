//! Hybrid retrieval over several mock retrievers.

use std::sync::Arc;

use citeguard::evidence::EvidenceChunk;
use citeguard::retrieval::{HybridRetriever, MockRetriever, Retriever};
use citeguard::{fuse, precision_at_k, recall_at_k};

fn hit(paper: &str, chunk: &str) -> EvidenceChunk {
    EvidenceChunk::new(paper, "Methods", chunk)
}

#[tokio::test]
async fn test_consensus_chunk_rises_to_top() {
    let dense = MockRetriever::new(vec![hit("p1", "x"), hit("p2", "y"), hit("p3", "z")]);
    let sparse = MockRetriever::new(vec![hit("p4", "w"), hit("p2", "y")]);
    let citation = MockRetriever::new(vec![hit("p5", "v"), hit("p2", "y")]);

    let hybrid = HybridRetriever::new(
        vec![
            Arc::new(dense) as Arc<dyn Retriever>,
            Arc::new(sparse) as Arc<dyn Retriever>,
            Arc::new(citation) as Arc<dyn Retriever>,
        ],
        60,
        3,
    )
    .unwrap();

    let results = hybrid.search("q").await.unwrap();

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].chunk_id, "y");
    assert!(results[0].score > results[1].score);
}

#[test]
fn test_fused_ranking_scores_against_gold_set() {
    let rankings = vec![
        vec![hit("p1", "a").key(), hit("p2", "b").key()],
        vec![hit("p2", "b").key(), hit("p3", "c").key()],
    ];
    let fused = fuse(&rankings, 60);
    let ids: Vec<&str> = fused.iter().map(|h| h.paper_id.as_str()).collect();

    assert_eq!(ids, vec!["p2", "p1", "p3"]);
    assert!((precision_at_k(&ids, &["p2", "p3"], 2) - 0.5).abs() < 1e-12);
    assert!((recall_at_k(&ids, &["p2", "p3"], 3) - 1.0).abs() < 1e-12);
}
