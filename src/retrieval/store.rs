use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use super::{Hydrator, RetrievalError};
use crate::evidence::EvidenceChunk;

#[derive(Debug, Deserialize)]
struct PaperChunks {
    #[serde(default)]
    sections: Vec<SectionChunks>,
}

#[derive(Debug, Deserialize)]
struct SectionChunks {
    section: String,
    #[serde(default)]
    chunks: Vec<StoredChunk>,
}

#[derive(Debug, Deserialize)]
struct StoredChunk {
    chunk_id: String,
    text: String,
}

impl PaperChunks {
    fn find(&self, section: &str, chunk_id: &str) -> Option<&str> {
        let wanted = normalize_section(section);
        self.sections
            .iter()
            .filter(|s| normalize_section(&s.section) == wanted)
            .flat_map(|s| s.chunks.iter())
            .find(|c| c.chunk_id == chunk_id)
            .map(|c| c.text.as_str())
    }
}

fn normalize_section(section: &str) -> String {
    section.trim().to_lowercase()
}

/// Chunk store laid out as one `{paper_id}.json` file per paper:
///
/// ```json
/// {"paper_id": "2401.01234", "sections": [
///   {"section": "Introduction", "chunks": [{"chunk_id": "...", "text": "..."}]}
/// ]}
/// ```
#[derive(Debug, Clone)]
pub struct JsonChunkStore {
    root: PathBuf,
}

impl JsonChunkStore {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, RetrievalError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(RetrievalError::InvalidConfig {
                reason: format!("chunk directory '{}' does not exist", root.display()),
            });
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `None` when the paper has no file (or its id cannot name a file).
    fn load(&self, paper_id: &str) -> Result<Option<PaperChunks>, RetrievalError> {
        if paper_id.is_empty()
            || paper_id.contains(['/', '\\'])
            || paper_id == "."
            || paper_id == ".."
        {
            warn!(paper_id = %paper_id, "Paper id is not a valid chunk file name");
            return Ok(None);
        }

        let path = self.root.join(format!("{paper_id}.json"));
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "No chunk file for paper");
                return Ok(None);
            }
            Err(e) => {
                return Err(RetrievalError::Store {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                });
            }
        };

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| RetrievalError::Store {
                path: path.display().to_string(),
                reason: e.to_string(),
            })
    }
}

impl Hydrator for JsonChunkStore {
    /// Chunks that already carry text are left untouched.
    fn attach_text(
        &self,
        mut chunks: Vec<EvidenceChunk>,
    ) -> Result<Vec<EvidenceChunk>, RetrievalError> {
        let mut papers: HashMap<String, Option<PaperChunks>> = HashMap::new();

        for chunk in chunks.iter_mut().filter(|c| !c.is_hydrated()) {
            if !papers.contains_key(&chunk.paper_id) {
                let loaded = self.load(&chunk.paper_id)?;
                papers.insert(chunk.paper_id.clone(), loaded);
            }

            chunk.text = papers
                .get(&chunk.paper_id)
                .and_then(Option::as_ref)
                .and_then(|paper| paper.find(&chunk.section, &chunk.chunk_id))
                .map(str::to_string);
        }

        let hydrated = chunks.iter().filter(|c| c.is_hydrated()).count();
        debug!(
            chunks = chunks.len(),
            hydrated = hydrated,
            papers_read = papers.len(),
            "Hydrated evidence"
        );

        Ok(chunks)
    }
}
