//! Cross-cutting, shared constants.
//!
//! Component configs ([`AttributionConfig`](crate::verify::AttributionConfig),
//! [`ConfidenceConfig`](crate::confidence::ConfidenceConfig),
//! [`RefusalPolicy`](crate::refusal::RefusalPolicy),
//! [`OrchestratorConfig`](crate::answer::OrchestratorConfig)) take their defaults from here.
//! Tests should build configs explicitly rather than relying on these values.

/// Minimum sentence/evidence cosine similarity for a sentence to count as supported.
pub const DEFAULT_ATTRIBUTION_THRESHOLD: f32 = 0.25;

/// Weight of the alignment score in the composite confidence.
pub const DEFAULT_ALIGNMENT_WEIGHT: f32 = 0.5;
/// Weight of the retrieval recall score in the composite confidence.
pub const DEFAULT_RECALL_WEIGHT: f32 = 0.25;
/// Weight of the citation precision score in the composite confidence.
pub const DEFAULT_PRECISION_WEIGHT: f32 = 0.25;
/// Number of leading retrieved ids considered for recall.
pub const DEFAULT_RECALL_K: usize = 10;

pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.0;
pub const DEFAULT_PRECISION_THRESHOLD: f32 = 0.0;
pub const DEFAULT_MIN_DISTINCT_PAPERS: usize = 2;

/// Evidence chunks required before any generation attempt is made.
pub const DEFAULT_MIN_EVIDENCE: usize = 3;
/// Generation attempts before refusing with "Max Retries Failed".
pub const DEFAULT_MAX_ATTEMPTS: usize = 2;
/// Responses shorter than this (after trimming) are rejected as malformed.
pub const DEFAULT_MIN_RESPONSE_CHARS: usize = 20;

/// RRF damping constant.
pub const DEFAULT_RRF_K: usize = 60;
/// Chunks requested from each retriever.
pub const DEFAULT_TOP_K: usize = 8;

pub const DEFAULT_RETRIEVER_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_LLM_TIMEOUT_MS: u64 = 60_000;
pub const DEFAULT_EMBEDDER_TIMEOUT_MS: u64 = 10_000;

/// Output dimension of the hashing embedder.
pub const HASHING_EMBEDDING_DIM: usize = 384;
/// Max entries held by [`CachedEmbedder`](crate::embedding::CachedEmbedder).
pub const DEFAULT_EMBEDDING_CACHE_CAPACITY: u64 = 10_000;

/// Text shown to users in place of a refused answer.
pub const REFUSAL_MESSAGE: &str =
    "I cannot answer this reliably with the available evidence (Refusal Triggered).";
