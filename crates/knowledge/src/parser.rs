//! Source file parsing and text extraction.

use assist_core::{AppError, AppResult};
use std::fs;
use std::path::Path;

/// Content type classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Markdown,
    Html,
    PlainText,
    Unsupported,
}

impl ContentType {
    /// Detect content type from file extension.
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match extension.as_deref() {
            Some("md") | Some("markdown") => Self::Markdown,
            Some("html") | Some("htm") => Self::Html,
            Some("txt") => Self::PlainText,
            _ => Self::Unsupported,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::Html => "html",
            Self::PlainText => "text",
            Self::Unsupported => "unsupported",
        }
    }
}

/// Read a source file and extract clean text.
pub fn parse_file(path: &Path) -> AppResult<String> {
    let content_type = ContentType::from_path(path);
    if !content_type.is_supported() {
        return Err(AppError::Knowledge(format!(
            "Unsupported file type: {:?}",
            path
        )));
    }

    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Knowledge(format!("Failed to read {:?}: {}", path, e)))?;

    if raw.contains('\0') {
        return Err(AppError::Knowledge(format!(
            "Binary content in {:?}",
            path
        )));
    }

    Ok(extract_text(content_type, &raw))
}

/// Extract clean text from raw content of a known type.
pub fn extract_text(content_type: ContentType, raw: &str) -> String {
    match content_type {
        ContentType::Markdown => clean_markdown(raw),
        ContentType::Html => clean_html(raw),
        ContentType::PlainText | ContentType::Unsupported => raw.trim().to_string(),
    }
}

/// Strip heading markers, rules and code fences, keeping the prose.
fn clean_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for line in text.lines() {
        let trimmed = line.trim_start_matches('#').trim();

        if trimmed.starts_with("---") || trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            continue;
        }

        if !trimmed.is_empty() {
            result.push_str(trimmed);
            result.push('\n');
        }
    }

    result.trim().to_string()
}

/// Strip tags, scripts and styles, collapsing whitespace.
fn clean_html(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut in_tag = false;
    let mut skip_depth = 0usize;

    let mut rest = text;
    while let Some(ch) = rest.chars().next() {
        if ch == '<' {
            let lower: String = rest.chars().take(8).collect::<String>().to_ascii_lowercase();
            if lower.starts_with("<script") || lower.starts_with("<style") {
                skip_depth += 1;
            } else if (lower.starts_with("</script") || lower.starts_with("</style")) && skip_depth > 0 {
                skip_depth -= 1;
            }
            in_tag = true;
            // Tags separate words
            result.push(' ');
        } else if ch == '>' && in_tag {
            in_tag = false;
        } else if !in_tag && skip_depth == 0 {
            result.push(ch);
        }
        rest = &rest[ch.len_utf8()..];
    }

    decode_entities(&result.split_whitespace().collect::<Vec<_>>().join(" "))
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_content_type_detection() {
        assert_eq!(ContentType::from_path(Path::new("faq.md")), ContentType::Markdown);
        assert_eq!(ContentType::from_path(Path::new("terms.HTML")), ContentType::Html);
        assert_eq!(ContentType::from_path(Path::new("sop.txt")), ContentType::PlainText);
        assert_eq!(ContentType::from_path(Path::new("report.pdf")), ContentType::Unsupported);
        assert_eq!(ContentType::from_path(Path::new("README")), ContentType::Unsupported);
    }

    #[test]
    fn test_clean_markdown() {
        let input = "# Header\n\nSome text\n\n```rust\ncode\n```\n\nMore text";
        let output = clean_markdown(input);
        assert!(output.contains("Header"));
        assert!(output.contains("Some text"));
        assert!(output.contains("More text"));
        assert!(!output.contains("```"));
    }

    #[test]
    fn test_clean_html() {
        let input = "<html><body><p>Hello <b>world</b></p></body></html>";
        assert_eq!(clean_html(input), "Hello world");
    }

    #[test]
    fn test_clean_html_skips_scripts_and_decodes() {
        let input = "<p>Fees &amp; limits</p><script>var x = 1;</script><style>p{}</style><p>apply</p>";
        assert_eq!(clean_html(input), "Fees & limits apply");
    }

    #[test]
    fn test_parse_file_rejects_unsupported() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("data.csv");
        std::fs::write(&path, "a,b").unwrap();
        assert!(parse_file(&path).is_err());
    }

    #[test]
    fn test_parse_text_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("sop.txt");
        std::fs::write(&path, "\nStep 1: verify identity.\n").unwrap();
        assert_eq!(parse_file(&path).unwrap(), "Step 1: verify identity.");
    }
}
