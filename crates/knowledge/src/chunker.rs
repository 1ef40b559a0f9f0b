//! Text chunking with configurable size and overlap.

/// A slice of source text destined to become one chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSpan {
    /// Zero-based index of the span within its document
    pub position: u32,
    /// Trimmed span text
    pub text: String,
    /// Character offset where the span starts
    pub start: usize,
    /// Character offset where the span ends (exclusive)
    pub end: usize,
}

/// Split `text` into windows of `chunk_size` characters, each overlapping the
/// previous one by `overlap` characters.
///
/// Whitespace-only windows are dropped. An overlap that is not smaller than
/// `chunk_size` is treated as zero.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<TextSpan> {
    if text.trim().is_empty() || chunk_size == 0 {
        return vec![];
    }

    let chars: Vec<char> = text.chars().collect();
    let step = if overlap < chunk_size {
        chunk_size - overlap
    } else {
        chunk_size
    };

    let mut spans = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let end = (start + chunk_size).min(chars.len());
        let window: String = chars[start..end].iter().collect();
        let trimmed = window.trim();

        if !trimmed.is_empty() {
            spans.push(TextSpan {
                position: spans.len() as u32,
                text: trimmed.to_string(),
                start,
                end,
            });
        }

        if end == chars.len() {
            break;
        }
        start += step;
    }

    tracing::debug!(
        "Chunked text into {} chunks (size: {}, overlap: {})",
        spans.len(),
        chunk_size,
        overlap
    );

    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_text_basic() {
        let text = "a".repeat(1000);
        let chunks = chunk_text(&text, 500, 100);

        // windows start at 0, 400, 800
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].position, 0);
        assert_eq!(chunks[1].start, 400);
        assert_eq!(chunks[2].end, 1000);
    }

    #[test]
    fn test_chunk_text_no_overlap() {
        let text = "a".repeat(300);
        let chunks = chunk_text(&text, 100, 0);
        assert_eq!(chunks.len(), 3);
    }

    #[test]
    fn test_short_text_single_chunk() {
        let chunks = chunk_text("  KYC requires an ID.  ", 500, 100);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "KYC requires an ID.");
    }

    #[test]
    fn test_chunk_text_empty() {
        assert!(chunk_text("", 100, 10).is_empty());
        assert!(chunk_text("   \n\t", 100, 10).is_empty());
        assert!(chunk_text("abc", 0, 0).is_empty());
    }

    #[test]
    fn test_overlap_is_shared_text() {
        let text: String = ('a'..='z').cycle().take(120).collect();
        let chunks = chunk_text(&text, 50, 10);

        let tail: String = chunks[0].text.chars().skip(40).collect();
        let head: String = chunks[1].text.chars().take(10).collect();
        assert_eq!(tail, head);
    }

    #[test]
    fn test_multibyte_text() {
        let text = "ü".repeat(30);
        let chunks = chunk_text(&text, 10, 2);
        assert!(chunks.iter().all(|c| c.text.chars().count() <= 10));
        assert_eq!(chunks.last().map(|c| c.end), Some(30));
    }

    #[test]
    fn test_oversized_overlap_does_not_loop() {
        let chunks = chunk_text(&"x".repeat(25), 10, 10);
        assert_eq!(chunks.len(), 3);
    }
}
