//! Query pipeline orchestration.
//!
//! Routes a query, then either answers directly or runs
//! retrieve, rerank, assemble, gate and generate in that order.

use super::classifier::{KeywordClassifier, QueryClassifier, QueryRoute};
use super::context::{assemble, EvidenceWindow};
use super::gate::{self, GateDecision};
use super::port::call_port;
use super::rerank::{rank, Reranker};
use super::retriever::Retriever;
use super::types::{signals_no_evidence, AnswerResult, ScoredCandidate};
use crate::embeddings::EmbeddingProvider;
use crate::vector_index::VectorIndex;
use assist_core::config::{LlmSettings, PortTimeouts};
use assist_core::{AppError, AppResult, Port, RagConfig};
use assist_llm::{LlmClient, LlmRequest};
use assist_prompt::{
    build_prompt, defaults, load_prompt, PromptDefinition, DIRECT_PROMPT_ID, EVIDENCE_PROMPT_ID,
};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// External capabilities the pipeline depends on.
#[derive(Clone)]
pub struct PipelinePorts {
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub index: Arc<dyn VectorIndex>,
    pub generator: Arc<dyn LlmClient>,
}

/// Prompt definitions for the two generation modes.
#[derive(Debug, Clone)]
pub struct PromptSet {
    pub evidence: PromptDefinition,
    pub direct: PromptDefinition,
}

impl PromptSet {
    /// Load both prompts, honoring overrides in `<workspace>/.assist/prompts/`.
    pub fn load(workspace: &Path) -> AppResult<Self> {
        Ok(Self {
            evidence: load_prompt(workspace, EVIDENCE_PROMPT_ID)?,
            direct: load_prompt(workspace, DIRECT_PROMPT_ID)?,
        })
    }

    /// Built-in prompts, ignoring workspace overrides.
    pub fn builtin() -> AppResult<Self> {
        let lookup = |id: &str| {
            defaults::builtin(id)?
                .ok_or_else(|| AppError::Prompt(format!("Missing built-in prompt '{}'", id)))
        };

        Ok(Self {
            evidence: lookup(EVIDENCE_PROMPT_ID)?,
            direct: lookup(DIRECT_PROMPT_ID)?,
        })
    }
}

/// Model parameters forwarded on every generation call.
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub timeout: Duration,
}

impl GenerationSettings {
    pub fn from_config(llm: &LlmSettings, timeouts: &PortTimeouts) -> Self {
        Self {
            model: llm.model.clone(),
            temperature: llm.temperature,
            max_tokens: llm.max_tokens,
            timeout: timeouts.generation(),
        }
    }
}

/// Answers user queries from the knowledge base.
///
/// Holds no per-request state; one instance serves concurrent queries.
pub struct QueryPipeline {
    config: RagConfig,
    classifier: Box<dyn QueryClassifier>,
    retriever: Retriever,
    reranker: Reranker,
    generator: Arc<dyn LlmClient>,
    prompts: PromptSet,
    generation: GenerationSettings,
}

impl QueryPipeline {
    /// Assemble a pipeline. Fails if `config` is invalid.
    pub fn new(
        config: RagConfig,
        ports: PipelinePorts,
        prompts: PromptSet,
        generation: GenerationSettings,
        timeouts: &PortTimeouts,
    ) -> AppResult<Self> {
        config.validate()?;

        Ok(Self {
            classifier: Box::new(KeywordClassifier::new(config.strict_classifier)),
            retriever: Retriever::new(
                Arc::clone(&ports.embedder),
                ports.index,
                timeouts.embedding(),
                timeouts.vector_store(),
            ),
            reranker: Reranker::new(ports.embedder, timeouts.embedding()),
            generator: ports.generator,
            prompts,
            generation,
            config,
        })
    }

    /// Replace the default keyword classifier.
    pub fn with_classifier(mut self, classifier: Box<dyn QueryClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Answer a query.
    ///
    /// Insufficient evidence yields `Ok` with the canonical no-evidence
    /// answer; an unreachable or slow port yields `PortUnavailable`.
    pub async fn run(&self, query: &str) -> AppResult<AnswerResult> {
        let query = query.trim();
        if query.is_empty() {
            tracing::debug!("Empty query");
            return Ok(AnswerResult::empty_query());
        }

        let route = self.classifier.classify(query);
        tracing::info!(route = ?route, "Classified query");

        let result = match route {
            QueryRoute::ConversationalOnly => self.answer_directly(query).await?,
            QueryRoute::NeedsRetrieval => self.answer_from_evidence(query).await?,
        };

        tracing::info!(
            route = ?result.route,
            sources = result.sources.len(),
            top_score = ?result.top_score,
            "Query answered"
        );
        Ok(result)
    }

    async fn answer_directly(&self, query: &str) -> AppResult<AnswerResult> {
        let mut variables = HashMap::new();
        variables.insert("query".to_string(), query.to_string());

        let answer = self.generate(&self.prompts.direct, variables).await?;
        if signals_no_evidence(&answer) {
            return Ok(AnswerResult::no_evidence(None));
        }
        Ok(AnswerResult::direct(answer))
    }

    async fn answer_from_evidence(&self, query: &str) -> AppResult<AnswerResult> {
        let retrieval = self.retriever.retrieve(query, self.config.top_k).await?;
        let reranked = self.rerank(query, retrieval.query_embedding, retrieval.candidates).await?;

        let window = assemble(reranked, self.config.max_context_chars);
        tracing::debug!(
            snippets = window.len(),
            used_chars = window.used_chars(),
            "Assembled evidence window"
        );

        let top_score = match gate::evaluate(&window, self.config.rag_score_threshold) {
            GateDecision::Proceed { top_score } => top_score,
            GateDecision::InsufficientEvidence { top_score } => {
                tracing::info!(
                    top_score = ?top_score,
                    threshold = self.config.rag_score_threshold,
                    "Evidence below threshold"
                );
                return Ok(AnswerResult::no_evidence(top_score));
            }
        };

        let answer = self.generate_from_window(query, &window).await?;
        if signals_no_evidence(&answer) {
            tracing::info!("Generator reported missing information");
            return Ok(AnswerResult::no_evidence(Some(top_score)));
        }

        Ok(AnswerResult::evidence(answer, window.sources(), top_score))
    }

    async fn rerank(
        &self,
        query: &str,
        query_embedding: Vec<f32>,
        candidates: Vec<crate::types::DocumentChunk>,
    ) -> AppResult<Vec<ScoredCandidate>> {
        let top_n = self.config.rerank_top_k;
        if self.config.reuse_query_embedding {
            return Ok(rank(&query_embedding, candidates, top_n));
        }
        self.reranker.rerank(query, candidates, top_n).await
    }

    async fn generate_from_window(&self, query: &str, window: &EvidenceWindow) -> AppResult<String> {
        let mut variables = HashMap::new();
        variables.insert("context".to_string(), window.context_block());
        variables.insert("query".to_string(), query.to_string());

        self.generate(&self.prompts.evidence, variables).await
    }

    async fn generate(
        &self,
        prompt: &PromptDefinition,
        variables: HashMap<String, String>,
    ) -> AppResult<String> {
        let built = build_prompt(prompt, variables)?;

        let mut request = LlmRequest::new(built.user, self.generation.model.clone());
        if let Some(system) = built.system {
            request = request.with_system(system);
        }
        if let Some(temperature) = self.generation.temperature {
            request = request.with_temperature(temperature);
        }
        if let Some(max_tokens) = self.generation.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }

        tracing::debug!(
            prompt = %built.metadata.source_prompt_id,
            provider = self.generator.provider_name(),
            "Generating answer"
        );

        let response = call_port(
            Port::Generation,
            self.generation.timeout,
            self.generator.complete(&request),
        )
        .await?;

        Ok(response.content.trim().to_string())
    }
}
