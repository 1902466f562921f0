//! Citeguard library crate (used by the `citeguard` binary and integration tests).
//!
//! Answers questions over a corpus of scientific papers and checks every sentence of
//! the generated answer against the retrieved evidence before returning it. When the
//! answer cannot be trusted the pipeline refuses instead.
//!
//! # Public API Surface
//!
//! ## Pipeline
//! - [`Orchestrator`], [`OrchestratorConfig`], [`FinalAnswer`] - Query answering state machine
//! - [`Config`], [`ConfigError`] - Environment configuration
//!
//! ## Verification
//! - [`split_sentences`] - Deterministic sentence segmentation
//! - [`CitationChecker`], [`Attributor`], [`truncate`] - Citation, support and truncation checks
//! - [`ConfidenceScorer`], [`RefusalPolicy`] - Trust score and refusal guards
//!
//! ## Retrieval
//! - [`Retriever`], [`Hydrator`] - Collaborator traits
//! - [`HttpRetriever`], [`HybridRetriever`], [`JsonChunkStore`] - Implementations
//! - [`fuse`] - Reciprocal rank fusion
//!
//! ## Evaluation
//! - [`precision_at_k`], [`recall_at_k`], [`cited_relevant`] - Ranking and citation metrics
//! - [`evaluate_refusals`], [`evaluate_citations`] - Answer-level runs over [`LabeledQuery`] sets
//!
//! ## Models
//! - [`Embedder`] with [`OllamaEmbedder`], [`HashingEmbedder`], [`CachedEmbedder`]
//! - [`Generator`] with [`GenaiGenerator`]
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod answer;
pub mod confidence;
pub mod config;
pub mod constants;
pub mod embedding;
pub mod evaluation;
pub mod evidence;
pub mod fusion;
pub mod hashing;
pub mod llm;
pub mod refusal;
pub mod retrieval;
pub mod segment;
pub mod verify;

pub use answer::{
    AnswerError, AnswerMetrics, AnswerMode, AnswerPhase, Citation, FinalAnswer, Orchestrator,
    OrchestratorConfig,
};
pub use confidence::{ConfidenceConfig, ConfidenceResult, ConfidenceScorer, ConfidenceWeights};
pub use config::{Config, ConfigError};
pub use embedding::{
    CachedEmbedder, Embedder, EmbeddingError, HashingEmbedder, OllamaEmbedder,
    OllamaEmbedderConfig, cosine_similarity,
};
pub use evaluation::{
    CitationReport, LabeledQuery, RefusalReport, cited_relevant, evaluate_citations,
    evaluate_refusals, precision_at_k, recall_at_k,
};
pub use evidence::{ChunkKey, EvidenceChunk, normalize_paper_id};
pub use fusion::{FusedHit, fuse};
pub use hashing::{embedding_cache_key, hash_to_u64};
pub use llm::{GenaiGenerator, GenaiGeneratorConfig, Generator, LlmError};
#[cfg(any(test, feature = "mock"))]
pub use llm::{MockGenerator, MockReply};
pub use refusal::{RefusalDecision, RefusalPolicy, RefusalReason};
#[cfg(any(test, feature = "mock"))]
pub use retrieval::{MockHydrator, MockRetriever};
pub use retrieval::{
    HttpRetriever, HttpRetrieverConfig, Hydrator, HybridRetriever, JsonChunkStore,
    PassthroughHydrator, RetrievalError, Retriever,
};
pub use segment::split_sentences;
pub use verify::{
    AttributionConfig, AttributionResult, Attributor, CitationChecker, SentenceDetail,
    SyntaxResult, VerificationStatus, reconstruct, truncate,
};
