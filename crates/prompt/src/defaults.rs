//! Built-in prompt definitions.
//!
//! Workspaces can override any of these with `.assist/prompts/<id>.yml`.

use crate::types::PromptDefinition;
use assist_core::{AppError, AppResult};

/// Prompt used when answering from assembled evidence.
pub const EVIDENCE_PROMPT_ID: &str = "rag.evidence";

/// Prompt used when the query bypasses retrieval.
pub const DIRECT_PROMPT_ID: &str = "rag.direct";

const EVIDENCE_PROMPT_YAML: &str = r#"
id: rag.evidence
title: Evidence-backed answer
apiVersion: "1.0"
createdBy: assist
variables: [context, query]
system: |
  You are a fintech knowledge assistant answering from internal documents
  (SOPs, policies, FAQs, test cases).

  Rules:
  1. Answer ONLY using the provided context. Each context block starts with its source and relevance score.
  2. If the context does not contain the answer, reply exactly: "Information not available."
  3. Never invent facts about SOPs, KYC, policies, or fintech operations.
  4. Do not mention the context, sources or scores unless explicitly asked.
  5. Keep answers concise and factual.
template: |
  Context:
  {{context}}

  User question: {{query}}

  Answer:
"#;

const DIRECT_PROMPT_YAML: &str = r#"
id: rag.direct
title: General answer without retrieval
apiVersion: "1.0"
createdBy: assist
variables: [query]
system: |
  You are a helpful fintech assistant.
  - You can answer general queries, greet the user, or provide basic information.
  - Do NOT invent details about internal fintech processes, policies, or compliance.
  - If you are asked about internal knowledge, say: "Please ask a specific question, I will check internal documents."
  - If unsure, say "I'm not sure" instead of guessing.
template: |
  User question: {{query}}

  Answer:
"#;

/// Look up a built-in prompt definition.
pub fn builtin(prompt_id: &str) -> AppResult<Option<PromptDefinition>> {
    let yaml = match prompt_id {
        EVIDENCE_PROMPT_ID => EVIDENCE_PROMPT_YAML,
        DIRECT_PROMPT_ID => DIRECT_PROMPT_YAML,
        _ => return Ok(None),
    };

    serde_yaml::from_str(yaml)
        .map(Some)
        .map_err(|e| AppError::Prompt(format!("Built-in prompt '{}' is invalid: {}", prompt_id, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_parse() {
        for id in [EVIDENCE_PROMPT_ID, DIRECT_PROMPT_ID] {
            let def = builtin(id).unwrap().unwrap();
            assert_eq!(def.id, id);
            assert!(!def.system.is_empty());
            assert!(def.variables.contains(&"query".to_string()));
        }
    }

    #[test]
    fn test_evidence_prompt_names_fallback_phrase() {
        let def = builtin(EVIDENCE_PROMPT_ID).unwrap().unwrap();
        assert!(def.system.contains("\"Information not available.\""));
        assert!(def.template.contains("{{context}}"));
    }

    #[test]
    fn test_unknown_builtin() {
        assert!(builtin("agent.task").unwrap().is_none());
    }
}
