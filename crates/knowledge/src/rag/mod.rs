//! RAG (Retrieval-Augmented Generation) query pipeline.
//!
//! Stages, in order: classify, retrieve, rerank, assemble, gate, generate.
//! Each stage lives in its own module and can be exercised alone.

pub mod classifier;
pub mod context;
pub mod gate;
pub mod pipeline;
pub mod port;
pub mod rerank;
pub mod retriever;
pub mod scorer;
pub mod types;

pub use classifier::{KeywordClassifier, QueryClassifier, QueryRoute};
pub use context::{assemble, render_snippet, EvidenceWindow};
pub use gate::GateDecision;
pub use pipeline::{GenerationSettings, PipelinePorts, PromptSet, QueryPipeline};
pub use rerank::Reranker;
pub use retriever::{Retrieval, Retriever};
pub use types::{
    AnswerResult, AnswerRoute, ScoredCandidate, SourceRef, EMPTY_QUERY_ANSWER, NO_EVIDENCE_ANSWER,
};
