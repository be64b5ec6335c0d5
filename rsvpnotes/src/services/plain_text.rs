//! Plain-text extraction from note content
//!
//! Note content is stored as a Quill Delta document. The reader only needs
//! the text, so embeds are skipped and string inserts are concatenated.

use serde::Deserialize;
use serde_json::Value;

/// Turns stored note content into readable text
pub trait PlainTextExtractor: Send + Sync {
    fn extract(&self, content: &str) -> String;
}

#[derive(Deserialize)]
struct Delta {
    ops: Vec<DeltaOp>,
}

#[derive(Deserialize)]
struct DeltaOp {
    #[serde(default)]
    insert: Option<Value>,
}

/// Extractor for Quill Delta content
///
/// Anything that is not a delta document is treated as plain text already.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeltaPlainText;

impl PlainTextExtractor for DeltaPlainText {
    fn extract(&self, content: &str) -> String {
        let delta: Delta = match serde_json::from_str(content) {
            Ok(delta) => delta,
            Err(_) => return content.to_string(),
        };

        delta
            .ops
            .into_iter()
            .filter_map(|op| match op.insert {
                Some(Value::String(text)) => Some(text),
                _ => None,
            })
            .collect()
    }
}

/// Wrap plain text as a single-insert delta document
pub fn delta_from_text(text: &str) -> String {
    serde_json::json!({
        "ops": [
            { "insert": format!("{}\n", text) }
        ]
    })
    .to_string()
}
