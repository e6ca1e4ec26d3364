//! Document-at-rest format
//!
//! A document is UTF-8 text: a `---` fenced header block, an H1 title, and
//! the raw markdown body. Two header conventions coexist across writers —
//! a JSON object (what this store writes) and plain `key: value` lines —
//! so the reader tolerates both. A header that parses as neither degrades
//! to "no metadata"; it never fails the read.

use crate::category::Category;
use serde_json::Value;

/// Open string-keyed metadata serialized alongside the document body
pub type Metadata = serde_json::Map<String, Value>;

/// Parsed in-memory document
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Category, when known from the document's location
    pub category: Option<Category>,
    /// Title from the H1 heading (or the `title` metadata key)
    pub title: String,
    /// Header metadata; empty if the header was absent or unparseable
    pub metadata: Metadata,
    /// Raw markdown body with header and title heading stripped
    pub body: String,
}

impl Document {
    /// Render the at-rest form: fenced JSON metadata, H1 title, body.
    #[must_use]
    pub fn render(title: &str, body: &str, metadata: &Metadata) -> String {
        let header = serde_json::to_string_pretty(metadata)
            .unwrap_or_else(|_| "{}".to_string());
        format!("---\n{header}\n---\n\n# {title}\n\n{body}")
    }

    /// Parse the at-rest form, tolerating both header conventions.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let (metadata, rest) = split_header(text);
        let (title_from_heading, body) = split_title(rest);

        let title = title_from_heading
            .or_else(|| {
                metadata
                    .get("title")
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .unwrap_or_default();

        let category = metadata
            .get("category")
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok());

        Self {
            category,
            title,
            metadata,
            body: body.to_string(),
        }
    }
}

/// Split off a leading `---` fenced header, if present.
fn split_header(text: &str) -> (Metadata, &str) {
    let Some(after_open) = text.strip_prefix("---\n") else {
        return (Metadata::new(), text);
    };
    let Some(close) = after_open.find("\n---\n") else {
        return (Metadata::new(), text);
    };
    let header = &after_open[..close];
    let rest = &after_open[close + "\n---\n".len()..];
    (parse_header(header), rest)
}

/// JSON object first, `key: value` lines second, empty map otherwise.
fn parse_header(header: &str) -> Metadata {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(header) {
        return map;
    }
    let mut map = Metadata::new();
    for line in header.lines() {
        if let Some((key, value)) = line.split_once(':') {
            let key = key.trim();
            if key.is_empty() {
                continue;
            }
            map.insert(
                key.to_string(),
                Value::String(value.trim().to_string()),
            );
        }
    }
    map
}

/// Split off a leading `# ` title heading, if present.
fn split_title(text: &str) -> (Option<String>, &str) {
    let trimmed = text.trim_start_matches('\n');
    if let Some(after_hash) = trimmed.strip_prefix("# ") {
        match after_hash.split_once('\n') {
            Some((title, rest)) => (
                Some(title.trim().to_string()),
                rest.trim_start_matches('\n'),
            ),
            None => (Some(after_hash.trim().to_string()), ""),
        }
    } else {
        (None, trimmed)
    }
}
