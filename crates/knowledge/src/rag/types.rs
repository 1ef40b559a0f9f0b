//! RAG response types.

use crate::types::DocumentChunk;
use serde::{Deserialize, Serialize};

/// Canonical answer when the knowledge base cannot support an answer.
pub const NO_EVIDENCE_ANSWER: &str = "Information not available.";

/// Phrase the generator is told to emit when context is insufficient.
pub const NO_EVIDENCE_PHRASE: &str = "Information not available";

/// Answer returned for an empty or whitespace-only query.
pub const EMPTY_QUERY_ANSWER: &str = "Please provide a question.";

/// A retrieved chunk paired with its rerank score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub chunk: DocumentChunk,
    pub score: f32,
}

impl ScoredCandidate {
    pub fn new(chunk: DocumentChunk, score: f32) -> Self {
        Self { chunk, score }
    }
}

/// A source reference returned with an evidence-backed answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    /// Source document label
    pub source: String,

    /// Rerank score of the chunk that backed the answer
    pub score: f32,
}

impl From<&ScoredCandidate> for SourceRef {
    fn from(candidate: &ScoredCandidate) -> Self {
        Self {
            source: candidate.chunk.source().to_string(),
            score: candidate.score,
        }
    }
}

/// How an answer was produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerRoute {
    /// Generated without retrieval
    Direct,
    /// Generated from assembled evidence
    Evidence,
    /// Canonical no-evidence answer
    #[default]
    Fallback,
    /// Query was empty
    EmptyQuery,
}

/// Response from the query pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerResult {
    /// Answer text
    pub answer: String,

    /// Sources backing the answer; empty unless the answer is evidence-backed
    pub sources: Vec<SourceRef>,

    /// Internal: route taken, used for logging and the CLI's verbose output
    #[serde(skip_serializing, default)]
    pub route: AnswerRoute,

    /// Internal: highest rerank score seen, if retrieval ran
    #[serde(skip_serializing, default)]
    pub top_score: Option<f32>,
}

impl AnswerResult {
    /// Answer generated without retrieval.
    pub fn direct(answer: String) -> Self {
        Self {
            answer,
            sources: Vec::new(),
            route: AnswerRoute::Direct,
            top_score: None,
        }
    }

    /// Answer generated from evidence.
    pub fn evidence(answer: String, sources: Vec<SourceRef>, top_score: f32) -> Self {
        Self {
            answer,
            sources,
            route: AnswerRoute::Evidence,
            top_score: Some(top_score),
        }
    }

    /// The canonical no-evidence answer.
    pub fn no_evidence(top_score: Option<f32>) -> Self {
        Self {
            answer: NO_EVIDENCE_ANSWER.to_string(),
            sources: Vec::new(),
            route: AnswerRoute::Fallback,
            top_score,
        }
    }

    pub fn empty_query() -> Self {
        Self {
            answer: EMPTY_QUERY_ANSWER.to_string(),
            sources: Vec::new(),
            route: AnswerRoute::EmptyQuery,
            top_score: None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.route == AnswerRoute::Fallback
    }
}

/// True when a generated answer is empty or signals missing information.
pub fn signals_no_evidence(answer: &str) -> bool {
    let trimmed = answer.trim();
    trimmed.is_empty()
        || trimmed
            .to_lowercase()
            .contains(&NO_EVIDENCE_PHRASE.to_lowercase())
}
