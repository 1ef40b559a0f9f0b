//! End-to-end pipeline behavior against instrumented ports.

use super::fakes::{
    chunk_scoring, pipeline_with, query_vector, CountingIndex, FakeEmbedder, ScriptedGenerator,
};
use crate::rag::{AnswerRoute, EMPTY_QUERY_ANSWER, NO_EVIDENCE_ANSWER};
use assist_core::config::PortTimeouts;
use assist_core::{AppError, Port, RagConfig};
use std::time::Duration;

fn kyc_index() -> std::sync::Arc<CountingIndex> {
    CountingIndex::with_chunks(vec![chunk_scoring(
        "faq-0",
        "faq.md",
        "To reset your password, use the Forgot password link on the login page.",
        0.82,
    )])
}

#[tokio::test]
async fn test_greeting_skips_retrieval() {
    let embedder = FakeEmbedder::constant(query_vector());
    let index = kyc_index();
    let generator = ScriptedGenerator::answering("Hi! How can I help you today?");
    let pipeline = pipeline_with(
        RagConfig::default(),
        embedder.clone(),
        index.clone(),
        generator.clone(),
        PortTimeouts::default(),
    );

    let result = pipeline.run("hello").await.unwrap();

    assert_eq!(result.answer, "Hi! How can I help you today?");
    assert!(result.sources.is_empty());
    assert_eq!(result.route, AnswerRoute::Direct);
    assert_eq!(embedder.calls(), 0);
    assert_eq!(index.queries(), 0);
    assert_eq!(generator.calls(), 1);

    let request = generator.last_request();
    assert!(request.prompt.contains("hello"));
    assert!(request
        .system
        .unwrap_or_default()
        .contains("helpful fintech assistant"));
    assert_eq!(request.model, "test-model");
    assert_eq!(request.temperature, Some(0.1));
    assert_eq!(request.max_tokens, Some(512));
}

#[tokio::test]
async fn test_empty_knowledge_base_falls_back_without_generation() {
    let embedder = FakeEmbedder::constant(query_vector());
    let index = CountingIndex::with_chunks(Vec::new());
    let generator = ScriptedGenerator::answering("should not be used");
    let pipeline = pipeline_with(
        RagConfig::default(),
        embedder.clone(),
        index.clone(),
        generator.clone(),
        PortTimeouts::default(),
    );

    let result = pipeline.run("What is the KYC policy?").await.unwrap();

    assert_eq!(result.answer, NO_EVIDENCE_ANSWER);
    assert!(result.sources.is_empty());
    assert_eq!(index.queries(), 1);
    // Reranking an empty candidate list needs no embedding
    assert_eq!(embedder.calls(), 1);
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn test_strong_evidence_is_answered_with_sources() {
    let embedder = FakeEmbedder::constant(query_vector());
    let index = kyc_index();
    let generator = ScriptedGenerator::answering("Use the Forgot password link on the login page.");
    let pipeline = pipeline_with(
        RagConfig::default(),
        embedder.clone(),
        index,
        generator.clone(),
        PortTimeouts::default(),
    );

    let result = pipeline.run("How do I reset my password?").await.unwrap();

    assert_eq!(result.answer, "Use the Forgot password link on the login page.");
    assert_eq!(result.route, AnswerRoute::Evidence);
    assert_eq!(result.sources.len(), 1);
    assert_eq!(result.sources[0].source, "faq.md");
    assert!((result.sources[0].score - 0.82).abs() < 1e-4);

    // Retrieval and rerank each embed the query once
    assert_eq!(embedder.calls(), 2);

    let request = generator.last_request();
    assert!(request.prompt.contains("[faq.md] (score=0.82)\n"));
    assert!(request.prompt.contains("User question: How do I reset my password?"));
    assert!(request
        .system
        .unwrap_or_default()
        .contains("Information not available."));
}

#[tokio::test]
async fn test_context_budget_too_small_falls_back() {
    let generator = ScriptedGenerator::answering("should not be used");
    let config = RagConfig {
        max_context_chars: 10,
        ..RagConfig::default()
    };
    let pipeline = pipeline_with(
        config,
        FakeEmbedder::constant(query_vector()),
        kyc_index(),
        generator.clone(),
        PortTimeouts::default(),
    );

    let result = pipeline.run("What is the KYC policy?").await.unwrap();

    assert_eq!(result.answer, NO_EVIDENCE_ANSWER);
    assert!(result.sources.is_empty());
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn test_weak_evidence_falls_back() {
    let generator = ScriptedGenerator::answering("should not be used");
    let index = CountingIndex::with_chunks(vec![
        chunk_scoring("a", "terms.md", "Card fees are listed in the tariff.", 0.31),
        chunk_scoring("b", "sop.md", "Disputes are escalated within two days.", 0.12),
    ]);
    let pipeline = pipeline_with(
        RagConfig::default(),
        FakeEmbedder::constant(query_vector()),
        index,
        generator.clone(),
        PortTimeouts::default(),
    );

    let result = pipeline.run("What is the onboarding process?").await.unwrap();

    assert_eq!(result.answer, NO_EVIDENCE_ANSWER);
    assert!(result.is_fallback());
    assert!(result.top_score.map_or(false, |s| (s - 0.31).abs() < 1e-4));
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn test_generator_refusal_becomes_fallback() {
    let generator = ScriptedGenerator::answering("Information not available.");
    let pipeline = pipeline_with(
        RagConfig::default(),
        FakeEmbedder::constant(query_vector()),
        kyc_index(),
        generator.clone(),
        PortTimeouts::default(),
    );

    let result = pipeline.run("What is the KYC policy?").await.unwrap();

    assert_eq!(result.answer, NO_EVIDENCE_ANSWER);
    assert!(result.sources.is_empty());
    assert_eq!(generator.calls(), 1);
}

#[tokio::test]
async fn test_blank_generation_becomes_fallback() {
    let pipeline = pipeline_with(
        RagConfig::default(),
        FakeEmbedder::constant(query_vector()),
        kyc_index(),
        ScriptedGenerator::answering("   "),
        PortTimeouts::default(),
    );

    let result = pipeline.run("What is the KYC policy?").await.unwrap();
    assert_eq!(result.answer, NO_EVIDENCE_ANSWER);
}

#[tokio::test]
async fn test_sources_bounded_by_rerank_top_k() {
    let chunks = (0..8)
        .map(|i| {
            chunk_scoring(
                &format!("c{}", i),
                &format!("doc{}.md", i),
                "Policy text.",
                0.9 - i as f32 * 0.05,
            )
        })
        .collect();
    let config = RagConfig {
        max_context_chars: 10_000,
        ..RagConfig::default()
    };
    let pipeline = pipeline_with(
        config,
        FakeEmbedder::constant(query_vector()),
        CountingIndex::with_chunks(chunks),
        ScriptedGenerator::answering("See the policy."),
        PortTimeouts::default(),
    );

    let result = pipeline.run("What is the refund policy?").await.unwrap();

    assert_eq!(result.sources.len(), 5);
    assert_eq!(result.sources[0].source, "doc0.md");
    assert!(result
        .sources
        .windows(2)
        .all(|pair| pair[0].score >= pair[1].score));
}

#[tokio::test]
async fn test_context_budget_limits_sources_to_included_snippets() {
    let chunks = (0..5)
        .map(|i| {
            chunk_scoring(
                &format!("c{}", i),
                &format!("doc{}.md", i),
                "Policy text.",
                0.9 - i as f32 * 0.05,
            )
        })
        .collect();
    // Each snippet renders to 35 characters: room for two, not three
    let config = RagConfig {
        max_context_chars: 80,
        ..RagConfig::default()
    };
    let generator = ScriptedGenerator::answering("See the policy.");
    let pipeline = pipeline_with(
        config,
        FakeEmbedder::constant(query_vector()),
        CountingIndex::with_chunks(chunks),
        generator.clone(),
        PortTimeouts::default(),
    );

    let result = pipeline.run("What is the refund policy?").await.unwrap();

    let sources: Vec<&str> = result.sources.iter().map(|s| s.source.as_str()).collect();
    assert_eq!(sources, vec!["doc0.md", "doc1.md"]);
    assert!(result.sources[0].score > result.sources[1].score);

    let prompt = generator.last_request().prompt;
    assert!(prompt.contains("[doc0.md] (score=0.90)\nPolicy text."));
    assert!(prompt.contains("[doc1.md] (score=0.85)\nPolicy text."));
    assert_eq!(prompt.matches("(score=").count(), 2);
    assert!(!prompt.contains("[doc2.md]"));
}

#[tokio::test]
async fn test_reused_query_embedding_embeds_once() {
    let embedder = FakeEmbedder::constant(query_vector());
    let config = RagConfig {
        reuse_query_embedding: true,
        ..RagConfig::default()
    };
    let pipeline = pipeline_with(
        config,
        embedder.clone(),
        kyc_index(),
        ScriptedGenerator::answering("Use the Forgot password link."),
        PortTimeouts::default(),
    );

    let result = pipeline.run("How do I reset my password?").await.unwrap();

    assert_eq!(result.sources.len(), 1);
    assert_eq!(embedder.calls(), 1);
}

#[tokio::test]
async fn test_empty_query_touches_no_port() {
    let embedder = FakeEmbedder::constant(query_vector());
    let index = kyc_index();
    let generator = ScriptedGenerator::answering("unused");
    let pipeline = pipeline_with(
        RagConfig::default(),
        embedder.clone(),
        index.clone(),
        generator.clone(),
        PortTimeouts::default(),
    );

    let result = pipeline.run("   \n").await.unwrap();

    assert_eq!(result.answer, EMPTY_QUERY_ANSWER);
    assert_eq!(embedder.calls() + index.queries() + generator.calls(), 0);
}

#[tokio::test]
async fn test_embedding_outage_is_an_error() {
    let generator = ScriptedGenerator::answering("unused");
    let pipeline = pipeline_with(
        RagConfig::default(),
        FakeEmbedder::failing(),
        kyc_index(),
        generator.clone(),
        PortTimeouts::default(),
    );

    let err = pipeline.run("What is the KYC policy?").await.unwrap_err();

    assert!(matches!(
        err,
        AppError::PortUnavailable {
            port: Port::Embedding,
            ..
        }
    ));
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn test_store_failure_is_attributed_to_store() {
    let pipeline = pipeline_with(
        RagConfig::default(),
        FakeEmbedder::constant(query_vector()),
        CountingIndex::failing(),
        ScriptedGenerator::answering("unused"),
        PortTimeouts::default(),
    );

    let err = pipeline.run("What is the KYC policy?").await.unwrap_err();

    assert_eq!(err.failed_port(), Some(Port::VectorStore));
    assert!(err.to_string().contains("database is locked"));
}

#[tokio::test(start_paused = true)]
async fn test_slow_generator_times_out() {
    let timeouts = PortTimeouts {
        generation_secs: 1,
        ..PortTimeouts::default()
    };
    let pipeline = pipeline_with(
        RagConfig::default(),
        FakeEmbedder::constant(query_vector()),
        kyc_index(),
        ScriptedGenerator::slow(Duration::from_secs(30)),
        timeouts,
    );

    let err = pipeline.run("hello").await.unwrap_err();

    assert_eq!(err.failed_port(), Some(Port::Generation));
}

#[tokio::test]
async fn test_concurrent_queries_share_one_pipeline() {
    let generator = ScriptedGenerator::answering("Use the Forgot password link.");
    let pipeline = pipeline_with(
        RagConfig::default(),
        FakeEmbedder::constant(query_vector()),
        kyc_index(),
        generator.clone(),
        PortTimeouts::default(),
    );

    let (a, b) = tokio::join!(
        pipeline.run("How do I reset my password?"),
        pipeline.run("How do I reset my password?")
    );

    let (a, b) = (a.unwrap(), b.unwrap());
    assert_eq!(a.answer, b.answer);
    assert_eq!(a.sources, b.sources);
    assert_eq!(generator.calls(), 2);
}
