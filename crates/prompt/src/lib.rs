//! Prompt system for Assist.
//!
//! This crate provides structured prompt management with:
//! - YAML-based prompt definitions
//! - Built-in evidence and direct-answer prompts
//! - Workspace overrides under `.assist/prompts/`
//! - Handlebars template rendering

pub mod builder;
pub mod defaults;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::build_prompt;
pub use defaults::{DIRECT_PROMPT_ID, EVIDENCE_PROMPT_ID};
pub use loader::load_prompt;
pub use types::{BuiltPrompt, BuiltPromptMetadata, PromptDefinition};
