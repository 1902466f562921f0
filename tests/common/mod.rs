//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use citeguard::embedding::HashingEmbedder;
use citeguard::evidence::EvidenceChunk;
use citeguard::llm::MockGenerator;
use citeguard::retrieval::{Hydrator, MockRetriever, PassthroughHydrator};
use citeguard::{Orchestrator, OrchestratorConfig};

pub const ATTENTION: &str = "Transformers replace recurrence with self attention layers.";
pub const SPARSE: &str = "Sparse retrieval ranks documents using term frequency statistics.";
pub const DENSE: &str = "Dense retrieval encodes queries and passages into vectors.";

/// Wide enough that unrelated sentences never collide above the support threshold.
pub const TEST_EMBEDDING_DIM: usize = 4096;

/// Three hydrated chunks from three different papers.
pub fn evidence() -> Vec<EvidenceChunk> {
    vec![
        EvidenceChunk::new("paper-a", "Introduction", "a-1").with_text(ATTENTION),
        EvidenceChunk::new("paper-b", "Methods", "b-1").with_text(SPARSE),
        EvidenceChunk::new("paper-c", "Methods", "c-1").with_text(DENSE),
    ]
}

/// `text` without its final period followed by a citation marker.
pub fn cited(text: &str, marker: &str) -> String {
    format!("{} {marker}.", text.trim_end_matches('.'))
}

pub fn orchestrator_with(
    chunks: Vec<EvidenceChunk>,
    hydrator: Arc<dyn Hydrator>,
    generator: Arc<MockGenerator>,
    config: OrchestratorConfig,
) -> Orchestrator {
    Orchestrator::new(
        Arc::new(MockRetriever::new(chunks)),
        hydrator,
        generator,
        Arc::new(HashingEmbedder::new(TEST_EMBEDDING_DIM).expect("valid dimension")),
        config,
    )
    .expect("valid orchestrator config")
}

pub fn orchestrator(chunks: Vec<EvidenceChunk>, generator: Arc<MockGenerator>) -> Orchestrator {
    orchestrator_with(
        chunks,
        Arc::new(PassthroughHydrator),
        generator,
        OrchestratorConfig::default(),
    )
}
