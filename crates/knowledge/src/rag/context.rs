//! Evidence window assembly.
//!
//! Each candidate becomes a snippet of the form
//! `[<source>] (score=<score:.2>)\n<text>`; snippets are appended in rank
//! order until the next one would exceed the character budget.

use super::types::{ScoredCandidate, SourceRef};

/// Separator between snippets in the rendered context block.
pub const SNIPPET_SEPARATOR: &str = "\n\n";

/// The bounded set of snippets handed to the generator.
#[derive(Debug, Clone, Default)]
pub struct EvidenceWindow {
    snippets: Vec<String>,
    candidates: Vec<ScoredCandidate>,
    used_chars: usize,
}

impl EvidenceWindow {
    pub fn is_empty(&self) -> bool {
        self.snippets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.snippets.len()
    }

    pub fn snippets(&self) -> &[String] {
        &self.snippets
    }

    /// Characters consumed by the snippets, separators excluded.
    pub fn used_chars(&self) -> usize {
        self.used_chars
    }

    /// Scores of the included candidates, in window order.
    pub fn scores(&self) -> Vec<f32> {
        self.candidates.iter().map(|c| c.score).collect()
    }

    /// Snippets joined into a single context block.
    pub fn context_block(&self) -> String {
        self.snippets.join(SNIPPET_SEPARATOR)
    }

    /// One source reference per included candidate.
    pub fn sources(&self) -> Vec<SourceRef> {
        self.candidates.iter().map(SourceRef::from).collect()
    }
}

/// Render a single candidate as a snippet.
pub fn render_snippet(candidate: &ScoredCandidate) -> String {
    format!(
        "[{}] (score={:.2})\n{}",
        candidate.chunk.source(),
        candidate.score,
        candidate.chunk.text
    )
}

/// Build an evidence window from ranked candidates.
///
/// Stops at the first snippet that does not fit; later, shorter snippets are
/// not considered. Length is measured in characters.
pub fn assemble(candidates: Vec<ScoredCandidate>, max_chars: usize) -> EvidenceWindow {
    let mut window = EvidenceWindow::default();

    for candidate in candidates {
        let snippet = render_snippet(&candidate);
        let length = snippet.chars().count();

        if window.used_chars + length > max_chars {
            tracing::debug!(
                "Context budget reached: {} used, next snippet needs {} of {}",
                window.used_chars,
                length,
                max_chars
            );
            break;
        }

        window.used_chars += length;
        window.snippets.push(snippet);
        window.candidates.push(candidate);
    }

    window
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DocumentChunk;
    use serde_json::json;

    fn candidate(source: Option<&str>, text: &str, score: f32) -> ScoredCandidate {
        let mut chunk = DocumentChunk::new(text, text, vec![]);
        if let Some(source) = source {
            chunk = chunk.with_metadata(json!({ "source": source }));
        }
        ScoredCandidate::new(chunk, score)
    }

    #[test]
    fn test_snippet_format() {
        let snippet = render_snippet(&candidate(Some("kyc_policy.md"), "Upload an ID.", 0.8234));
        assert_eq!(snippet, "[kyc_policy.md] (score=0.82)\nUpload an ID.");
    }

    #[test]
    fn test_missing_source_uses_document() {
        let snippet = render_snippet(&candidate(None, "text", 0.5));
        assert!(snippet.starts_with("[document] (score=0.50)\n"));
    }

    #[test]
    fn test_all_fit() {
        let window = assemble(
            vec![candidate(Some("a.md"), "one", 0.9), candidate(Some("b.md"), "two", 0.8)],
            1000,
        );

        assert_eq!(window.len(), 2);
        assert_eq!(window.scores(), vec![0.9, 0.8]);
        assert_eq!(
            window.context_block(),
            "[a.md] (score=0.90)\none\n\n[b.md] (score=0.80)\ntwo"
        );
        assert_eq!(window.sources()[1].source, "b.md");
    }

    #[test]
    fn test_stops_at_first_overflow() {
        let first = candidate(Some("a.md"), "short", 0.9);
        let last = candidate(Some("c.md"), "s", 0.7);
        let budget =
            render_snippet(&first).chars().count() + render_snippet(&last).chars().count();

        let window = assemble(
            vec![first, candidate(Some("b.md"), &"x".repeat(100), 0.8), last],
            budget,
        );

        // "c.md" would fit on its own but assembly already stopped
        assert_eq!(window.len(), 1);
        assert!(window.used_chars() <= budget);
    }

    #[test]
    fn test_exact_budget_fits() {
        let only = candidate(Some("a.md"), "abc", 0.9);
        let budget = render_snippet(&only).chars().count();
        let window = assemble(vec![only], budget);
        assert_eq!(window.len(), 1);
        assert_eq!(window.used_chars(), budget);
    }

    #[test]
    fn test_first_snippet_too_large() {
        let window = assemble(vec![candidate(Some("a.md"), "abcdef", 0.9)], 5);
        assert!(window.is_empty());
        assert!(window.scores().is_empty());
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let text = "é".repeat(10);
        let only = candidate(Some("a.md"), &text, 0.9);
        let chars = render_snippet(&only).chars().count();
        let window = assemble(vec![only], chars);
        assert_eq!(window.len(), 1);
    }
}
