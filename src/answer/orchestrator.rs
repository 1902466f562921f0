use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::config::OrchestratorConfig;
use super::error::AnswerError;
use super::prompt::{PromptBuilder, rejection_notice};
use super::types::{AnswerAttempt, AnswerMetrics, AnswerPhase, Citation, FinalAnswer};
use crate::confidence::ConfidenceScorer;
use crate::embedding::Embedder;
use crate::evidence::EvidenceChunk;
use crate::llm::Generator;
use crate::refusal::RefusalReason;
use crate::retrieval::{Hydrator, Retriever};
use crate::segment::split_sentences;
use crate::verify::{
    Attributor, CitationChecker, SentenceDetail, cited_in_order, reconstruct, truncate,
};

const EMPTY_RESPONSE: &str = "Empty response";
const RESPONSE_TOO_SHORT: &str = "Response too short";
const NO_CITATIONS: &str = "No [index] citations found";

enum State {
    Retrieving,
    Prompting,
    Generating(AnswerAttempt),
    Verifying(AnswerAttempt),
    Retry(AnswerAttempt),
    Success(Accepted),
    Refused(RefusalReason),
}

impl State {
    fn phase(&self) -> AnswerPhase {
        match self {
            State::Retrieving => AnswerPhase::Retrieving,
            State::Prompting => AnswerPhase::Prompting,
            State::Generating(_) => AnswerPhase::Generating,
            State::Verifying(_) => AnswerPhase::Verifying,
            State::Retry(_) => AnswerPhase::Retry,
            State::Success(_) => AnswerPhase::Success,
            State::Refused(_) => AnswerPhase::Refused,
        }
    }
}

struct Accepted {
    answer: String,
    sentences: Vec<SentenceDetail>,
    citations: Vec<Citation>,
}

/// Per-query working set. Never shared between queries.
struct Run<'q> {
    query_id: Uuid,
    query: &'q str,
    relevant_papers: Option<&'q [String]>,
    retrieved_ids: Vec<String>,
    evidence: Vec<EvidenceChunk>,
    base_prompt: String,
    notices: Vec<String>,
    sentences: Vec<SentenceDetail>,
    metrics: AnswerMetrics,
}

impl<'q> Run<'q> {
    fn new(query: &'q str, relevant_papers: Option<&'q [String]>) -> Self {
        Self {
            query_id: Uuid::new_v4(),
            query,
            relevant_papers,
            retrieved_ids: vec![],
            evidence: vec![],
            base_prompt: String::new(),
            notices: vec![],
            sentences: vec![],
            metrics: AnswerMetrics::default(),
        }
    }

    fn finish(
        self,
        answer: Option<String>,
        citations: Vec<Citation>,
        refusal: Option<RefusalReason>,
    ) -> FinalAnswer {
        let mut metrics = self.metrics;
        metrics.refusal_triggered = refusal.is_some();
        metrics.refusal_reason = refusal.as_ref().map(ToString::to_string);

        FinalAnswer {
            query_id: self.query_id,
            query: self.query.to_string(),
            answer,
            sentences: self.sentences,
            citations,
            evidence: self.evidence,
            refused: refusal.is_some(),
            refusal_reason: metrics.refusal_reason.clone(),
            refusal,
            metrics,
            created_at: Utc::now(),
        }
    }
}

/// Drives retrieval, generation and verification for one query at a time.
///
/// Collaborators are shared read-only; one orchestrator can serve concurrent queries.
pub struct Orchestrator {
    retriever: Arc<dyn Retriever>,
    hydrator: Arc<dyn Hydrator>,
    generator: Arc<dyn Generator>,
    attributor: Attributor,
    checker: CitationChecker,
    scorer: ConfidenceScorer,
    prompts: PromptBuilder,
    config: OrchestratorConfig,
}

impl Orchestrator {
    pub fn new(
        retriever: Arc<dyn Retriever>,
        hydrator: Arc<dyn Hydrator>,
        generator: Arc<dyn Generator>,
        embedder: Arc<dyn Embedder>,
        config: OrchestratorConfig,
    ) -> Result<Self, AnswerError> {
        config
            .validate()
            .map_err(|reason| AnswerError::InvalidConfig { reason })?;

        Ok(Self {
            retriever,
            hydrator,
            generator,
            attributor: Attributor::new(embedder, config.attribution),
            checker: CitationChecker::new(),
            scorer: ConfidenceScorer::new(config.confidence),
            prompts: PromptBuilder::new(config.mode),
            config,
        })
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub async fn answer(&self, query: &str) -> Result<FinalAnswer, AnswerError> {
        self.answer_with_relevant(query, None).await
    }

    /// Answers `query`, scoring recall and citation precision against `relevant_papers`
    /// when the gold set is known (evaluation runs).
    ///
    /// Returns `Err` only when a collaborator is unreachable. Every "cannot answer
    /// reliably" outcome is a refused [`FinalAnswer`].
    pub async fn answer_with_relevant(
        &self,
        query: &str,
        relevant_papers: Option<&[String]>,
    ) -> Result<FinalAnswer, AnswerError> {
        let mut run = Run::new(query, relevant_papers);
        let mut state = State::Retrieving;

        info!(query_id = %run.query_id, mode = %self.config.mode, "Answering query");

        loop {
            let phase = state.phase();
            debug!(
                query_id = %run.query_id,
                phase = %phase,
                terminal = phase.is_terminal(),
                "Entering state"
            );
            state = match state {
                State::Retrieving => self.retrieve(&mut run).await?,
                State::Prompting => self.prompt(&mut run),
                State::Generating(attempt) => self.generate(&mut run, attempt).await?,
                State::Verifying(attempt) => self.verify(&mut run, attempt).await?,
                State::Retry(attempt) => self.retry(&mut run, attempt),
                State::Success(accepted) => {
                    info!(
                        query_id = %run.query_id,
                        attempts = run.metrics.attempts,
                        citations = accepted.citations.len(),
                        "Answer accepted"
                    );
                    run.sentences = accepted.sentences;
                    return Ok(run.finish(Some(accepted.answer), accepted.citations, None));
                }
                State::Refused(reason) => {
                    info!(query_id = %run.query_id, reason = %reason, "Answer refused");
                    return Ok(run.finish(None, vec![], Some(reason)));
                }
            };
        }
    }

    async fn retrieve(&self, run: &mut Run<'_>) -> Result<State, AnswerError> {
        let start = Instant::now();
        let retrieved = self.retriever.search(run.query).await?;
        run.retrieved_ids = retrieved.iter().map(|c| c.paper_id.clone()).collect();

        let hydrator = Arc::clone(&self.hydrator);
        let hydrated = tokio::task::spawn_blocking(move || hydrator.attach_text(retrieved))
            .await
            .map_err(|e| AnswerError::Hydration {
                reason: e.to_string(),
            })??;

        let fetched = hydrated.len();
        run.evidence = hydrated.into_iter().filter(EvidenceChunk::is_hydrated).collect();
        run.metrics.retrieval_latency_ms = start.elapsed().as_millis() as u64;
        run.metrics.retrieved_chunks = run.evidence.len();

        info!(
            query_id = %run.query_id,
            retriever = self.retriever.name(),
            fetched = fetched,
            hydrated = run.evidence.len(),
            latency_ms = run.metrics.retrieval_latency_ms,
            "Retrieval complete"
        );

        if run.evidence.len() < self.config.min_evidence {
            return Ok(State::Refused(RefusalReason::InsufficientInformation));
        }
        Ok(State::Prompting)
    }

    fn prompt(&self, run: &mut Run<'_>) -> State {
        run.base_prompt = self.prompts.build(run.query, &run.evidence);
        State::Generating(AnswerAttempt::new(1, run.base_prompt.clone()))
    }

    async fn generate(
        &self,
        run: &mut Run<'_>,
        attempt: AnswerAttempt,
    ) -> Result<State, AnswerError> {
        run.metrics.attempts = attempt.number;
        let start = Instant::now();

        let response = match self.generator.generate(&attempt.prompt).await {
            Ok(text) => text,
            Err(e) if e.is_transient() => {
                warn!(
                    query_id = %run.query_id,
                    attempt = attempt.number,
                    error = %e,
                    "Generation produced no text"
                );
                String::new()
            }
            Err(e) => return Err(e.into()),
        };

        let elapsed = start.elapsed().as_millis() as u64;
        run.metrics.llm_latency_ms += elapsed;
        info!(
            query_id = %run.query_id,
            attempt = attempt.number,
            response_chars = response.len(),
            latency_ms = elapsed,
            "Generation attempt complete"
        );

        Ok(State::Verifying(attempt.with_response(response)))
    }

    async fn verify(
        &self,
        run: &mut Run<'_>,
        attempt: AnswerAttempt,
    ) -> Result<State, AnswerError> {
        let response = attempt.response.trim();

        if response.is_empty() {
            return Ok(State::Retry(attempt.with_errors(vec![EMPTY_RESPONSE.to_string()])));
        }
        if response.chars().count() < self.config.min_response_chars {
            return Ok(State::Retry(attempt.with_errors(vec![RESPONSE_TOO_SHORT.to_string()])));
        }

        let syntax = self.checker.check(response, &run.evidence);
        let mut errors = Vec::new();
        if !syntax.has_citations() {
            errors.push(NO_CITATIONS.to_string());
        }
        if !syntax.verification_passed {
            errors.extend(syntax.errors.iter().cloned());
        }
        debug!(
            query_id = %run.query_id,
            attempt = attempt.number,
            passed = syntax.verification_passed,
            cited = syntax.cited_indices.len(),
            "Citation syntax checked"
        );
        if !errors.is_empty() {
            return Ok(State::Retry(attempt.with_errors(errors)));
        }

        let sentences = split_sentences(response);
        let attribution = self.attributor.verify(&sentences, &run.evidence).await?;

        let kept = truncate(&attribution.details).to_vec();
        run.metrics.total_sentences = kept.len();
        run.metrics.unaligned_sentences = attribution.details.len() - kept.len();
        run.metrics.truncated = kept.len() < attribution.details.len();

        let confidence = self.scorer.score(
            &attribution.details,
            &run.evidence,
            &run.retrieved_ids,
            run.relevant_papers,
        );
        run.metrics.confidence = Some(confidence);

        let decision = self.config.refusal.decide(
            &run.evidence,
            &attribution.details,
            confidence.confidence_score,
            confidence.citation_precision,
        );
        if decision.refuse
            && let Some(reason) = decision.reason
        {
            run.sentences = attribution.details;
            return Ok(State::Refused(reason));
        }

        let answer = self.prompts.finalize(reconstruct(&kept));
        let citations = self.citations(&answer, &run.evidence);
        Ok(State::Success(Accepted {
            answer,
            sentences: kept,
            citations,
        }))
    }

    fn retry(&self, run: &mut Run<'_>, attempt: AnswerAttempt) -> State {
        warn!(
            query_id = %run.query_id,
            attempt = attempt.number,
            errors = %attempt.errors.join("; "),
            "Attempt rejected"
        );
        run.metrics.last_attempt_errors = attempt.errors.clone();

        if attempt.number >= self.config.max_attempts {
            return State::Refused(RefusalReason::MaxRetriesFailed);
        }

        run.notices.push(rejection_notice(attempt.number, &attempt.errors));
        let prompt = self.prompts.with_notices(&run.base_prompt, &run.notices);
        State::Generating(AnswerAttempt::new(attempt.number + 1, prompt))
    }

    /// One record per distinct evidence index, in order of first citation.
    fn citations(&self, answer: &str, evidence: &[EvidenceChunk]) -> Vec<Citation> {
        let mut seen = Vec::new();
        for index in cited_in_order(answer, evidence.len()) {
            if !seen.contains(&index) {
                seen.push(index);
            }
        }

        seen.into_iter()
            .enumerate()
            .map(|(i, index)| {
                let chunk = &evidence[index - 1];
                Citation {
                    citation_id: i + 1,
                    evidence_index: index,
                    paper_id: chunk.paper_id.clone(),
                    section: chunk.section.clone(),
                    chunk_id: chunk.chunk_id.clone(),
                    score: chunk.score,
                }
            })
            .collect()
    }
}
