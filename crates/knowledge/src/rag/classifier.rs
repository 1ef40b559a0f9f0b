//! Query routing.
//!
//! Decides whether a query should be answered from the knowledge base or
//! handed straight to the generator.

use serde::Serialize;

/// Where a query is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryRoute {
    NeedsRetrieval,
    ConversationalOnly,
}

/// Routes a query. Implementations must be pure and never fail.
pub trait QueryClassifier: Send + Sync {
    fn classify(&self, query: &str) -> QueryRoute;
}

const GREETINGS: &[&str] = &[
    "hi",
    "hello",
    "hey",
    "hey there",
    "good morning",
    "good evening",
];

const KNOWLEDGE_TRIGGERS: &[&str] = &[
    "policy",
    "sop",
    "faq",
    "procedure",
    "process",
    "compliance",
    "onboarding",
    "account",
    "reset password",
    "password",
    "kyc",
    "test case",
    "terms",
    "how to",
    "how do i",
    "what is",
    "step",
    "steps",
    "document",
    "manual",
];

const INTERROGATIVES: &[&str] = &[
    "how", "what", "when", "where", "why", "which", "is", "are", "do", "does",
];

/// Queries with at least this many tokens are treated as questions.
const MIN_QUESTION_TOKENS: usize = 6;

/// Greeting substrings only count for queries this short.
const MAX_GREETING_TOKENS: usize = 2;

/// Keyword and length heuristics over the lowercased query.
///
/// In strict mode a long query also needs an interrogative word before it
/// is sent to retrieval.
#[derive(Debug, Clone, Copy)]
pub struct KeywordClassifier {
    strict: bool,
}

impl KeywordClassifier {
    pub fn new(strict: bool) -> Self {
        Self { strict }
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new(true)
    }
}

impl QueryClassifier for KeywordClassifier {
    fn classify(&self, query: &str) -> QueryRoute {
        let text = query.trim().to_lowercase();
        if text.is_empty() {
            return QueryRoute::ConversationalOnly;
        }

        let token_count = text.split_whitespace().count();

        if GREETINGS.contains(&text.as_str())
            || (token_count <= MAX_GREETING_TOKENS && GREETINGS.iter().any(|g| text.contains(g)))
        {
            return QueryRoute::ConversationalOnly;
        }

        if KNOWLEDGE_TRIGGERS.iter().any(|k| text.contains(k)) {
            return QueryRoute::NeedsRetrieval;
        }

        if token_count >= MIN_QUESTION_TOKENS && (!self.strict || has_interrogative(&text)) {
            return QueryRoute::NeedsRetrieval;
        }

        QueryRoute::ConversationalOnly
    }
}

/// Whole-word match against the interrogative list.
fn has_interrogative(text: &str) -> bool {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .any(|word| INTERROGATIVES.contains(&word))
}
