use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{RetrievalError, Retriever};
use crate::constants::{DEFAULT_RETRIEVER_TIMEOUT_MS, DEFAULT_TOP_K};
use crate::evidence::EvidenceChunk;

const CHUNK_ORDER_MARKER: &str = "::chunk::";

#[derive(Debug, Clone)]
pub struct HttpRetrieverConfig {
    pub base_url: String,
    pub top_k: usize,
    pub timeout: Duration,
    /// Label used in logs, e.g. `dense` or `sparse`.
    pub name: String,
}

impl HttpRetrieverConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            top_k: DEFAULT_TOP_K,
            timeout: Duration::from_millis(DEFAULT_RETRIEVER_TIMEOUT_MS),
            name: "dense".to_string(),
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub(crate) fn endpoint(&self) -> String {
        format!("{}/search", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    top_k: usize,
}

#[derive(Deserialize)]
pub(crate) struct SearchResponse {
    pub(crate) results: Vec<SearchHit>,
}

#[derive(Deserialize)]
pub(crate) struct SearchHit {
    paper_id: String,
    chunk_id: String,
    #[serde(default)]
    section: Option<String>,
    #[serde(default)]
    order: Option<u32>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    score: f32,
}

impl SearchHit {
    pub(crate) fn into_chunk(self) -> EvidenceChunk {
        let (parsed_section, parsed_order) = parse_chunk_id(&self.chunk_id);
        let section = self
            .section
            .or_else(|| parsed_section.map(str::to_string))
            .unwrap_or_default();
        let order = self.order.or(parsed_order).unwrap_or(0);

        EvidenceChunk {
            paper_id: self.paper_id,
            section,
            chunk_id: self.chunk_id,
            order,
            text: self.text,
            score: self.score,
        }
    }
}

/// Section and order encoded in a structured chunk id
/// (`{paper_id}::{kind}::{section}::chunk::{order}`).
pub fn parse_chunk_id(chunk_id: &str) -> (Option<&str>, Option<u32>) {
    let section = chunk_id.split("::").nth(2).filter(|s| !s.is_empty());
    let order = chunk_id
        .rsplit_once(CHUNK_ORDER_MARKER)
        .and_then(|(_, tail)| tail.parse().ok());
    (section, order)
}

/// Client for a remote search service: `POST {base}/search {query, top_k}`.
#[derive(Debug, Clone)]
pub struct HttpRetriever {
    config: HttpRetrieverConfig,
    http: HttpClient,
}

impl HttpRetriever {
    pub fn new(config: HttpRetrieverConfig) -> Result<Self, RetrievalError> {
        if config.base_url.trim().is_empty() {
            return Err(RetrievalError::InvalidConfig {
                reason: "base_url cannot be empty".to_string(),
            });
        }
        if config.top_k == 0 {
            return Err(RetrievalError::InvalidConfig {
                reason: "top_k must be greater than 0".to_string(),
            });
        }

        let http = HttpClient::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RetrievalError::InvalidConfig {
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self { config, http })
    }

    pub fn config(&self) -> &HttpRetrieverConfig {
        &self.config
    }
}

#[async_trait]
impl Retriever for HttpRetriever {
    async fn search(&self, query: &str) -> Result<Vec<EvidenceChunk>, RetrievalError> {
        let url = self.config.endpoint();
        debug!(retriever = %self.config.name, url = %url, top_k = self.config.top_k, "Searching");

        let request = SearchRequest {
            query,
            top_k: self.config.top_k,
        };

        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                if e.is_timeout() {
                    RetrievalError::Timeout {
                        url: url.clone(),
                        timeout_ms: self.config.timeout.as_millis() as u64,
                    }
                } else {
                    warn!(retriever = %self.config.name, url = %url, error = %e, "Search request failed");
                    RetrievalError::Unavailable {
                        url: url.clone(),
                        message: e.to_string(),
                    }
                }
            })?;

        let body: SearchResponse =
            response
                .json()
                .await
                .map_err(|e| RetrievalError::InvalidResponse {
                    reason: e.to_string(),
                })?;

        Ok(body
            .results
            .into_iter()
            .take(self.config.top_k)
            .map(SearchHit::into_chunk)
            .collect())
    }

    fn name(&self) -> &str {
        &self.config.name
    }
}
