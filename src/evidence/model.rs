use serde::{Deserialize, Serialize};

/// A retrievable unit of paper text with provenance.
///
/// Retrievers produce chunks with `text = None`; a [`Hydrator`](crate::retrieval::Hydrator)
/// fills it in from the chunk store keyed by `(paper_id, section, chunk_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceChunk {
    pub paper_id: String,
    pub section: String,
    pub chunk_id: String,
    #[serde(default)]
    pub order: u32,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub score: f32,
}

impl EvidenceChunk {
    pub fn new(
        paper_id: impl Into<String>,
        section: impl Into<String>,
        chunk_id: impl Into<String>,
    ) -> Self {
        Self {
            paper_id: paper_id.into(),
            section: section.into(),
            chunk_id: chunk_id.into(),
            order: 0,
            text: None,
            score: 0.0,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_score(mut self, score: f32) -> Self {
        self.score = score;
        self
    }

    pub fn with_order(mut self, order: u32) -> Self {
        self.order = order;
        self
    }

    /// Identity used when de-duplicating across retrievers.
    pub fn key(&self) -> ChunkKey {
        ChunkKey::new(&self.paper_id, &self.chunk_id)
    }

    /// Text, or `""` when not hydrated.
    pub fn text_or_empty(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    pub fn is_hydrated(&self) -> bool {
        self.text.is_some()
    }
}

/// `(paper_id, chunk_id)` identity of a chunk across retrievers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkKey {
    pub paper_id: String,
    pub chunk_id: String,
}

impl ChunkKey {
    pub fn new(paper_id: &str, chunk_id: &str) -> Self {
        Self {
            paper_id: paper_id.to_string(),
            chunk_id: chunk_id.to_string(),
        }
    }
}

impl From<&EvidenceChunk> for ChunkKey {
    fn from(chunk: &EvidenceChunk) -> Self {
        chunk.key()
    }
}

impl std::fmt::Display for ChunkKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}::{}", self.paper_id, self.chunk_id)
    }
}
