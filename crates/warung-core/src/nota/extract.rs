//! Decoding of heterogeneous OCR provider payloads into raw text.

use serde_json::Value;
use tracing::warn;

/// Decoded OCR provider payload.
///
/// The provider has shipped several response shapes over time; the variants
/// cover every shape seen in production, and `Unrecognized` maps to the
/// empty string — the designed "no text found" signal, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum RawOcrResult {
    /// The body was a bare string.
    Plain(String),

    /// `{"extracted_text": "..."}`
    ExtractedText(String),

    /// `{"data": {"text": "..."}}`
    NestedData(String),

    /// `{"text": "..."}`
    TextField(String),

    /// An array of fragments, each optionally carrying a `text` field.
    /// Fragments without one contribute an empty line.
    Fragments(Vec<String>),

    /// No known text-bearing field present.
    Unrecognized,
}

impl RawOcrResult {
    /// Classify a decoded provider payload. Probes are ordered; the first
    /// matching shape wins.
    pub fn classify(value: &Value) -> Self {
        if let Value::String(s) = value {
            return RawOcrResult::Plain(s.clone());
        }

        if let Some(s) = value.get("extracted_text").and_then(Value::as_str) {
            return RawOcrResult::ExtractedText(s.to_string());
        }

        if let Some(s) = value
            .get("data")
            .and_then(|data| data.get("text"))
            .and_then(Value::as_str)
        {
            return RawOcrResult::NestedData(s.to_string());
        }

        if let Some(s) = value.get("text").and_then(Value::as_str) {
            return RawOcrResult::TextField(s.to_string());
        }

        if let Value::Array(fragments) = value {
            return RawOcrResult::Fragments(
                fragments
                    .iter()
                    .map(|fragment| {
                        fragment
                            .get("text")
                            .and_then(Value::as_str)
                            .unwrap_or_default()
                            .to_string()
                    })
                    .collect(),
            );
        }

        RawOcrResult::Unrecognized
    }

    /// Canonical text for the payload.
    pub fn into_text(self) -> String {
        match self {
            RawOcrResult::Plain(s)
            | RawOcrResult::ExtractedText(s)
            | RawOcrResult::NestedData(s)
            | RawOcrResult::TextField(s) => s,
            RawOcrResult::Fragments(fragments) => fragments.join("\n"),
            RawOcrResult::Unrecognized => String::new(),
        }
    }
}

/// Extract raw text from an OCR provider payload. Never fails; an
/// unrecognized shape yields an empty string.
pub fn extract_text(value: &Value) -> String {
    let decoded = RawOcrResult::classify(value);
    if decoded == RawOcrResult::Unrecognized {
        warn!("could not extract text from OCR payload");
    }
    decoded.into_text()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn plain_string_passes_through() {
        assert_eq!(extract_text(&json!("raw receipt text")), "raw receipt text");
    }

    #[test]
    fn extracted_text_field() {
        assert_eq!(extract_text(&json!({"extracted_text": "abc"})), "abc");
    }

    #[test]
    fn nested_data_text() {
        assert_eq!(extract_text(&json!({"data": {"text": "abc"}})), "abc");
    }

    #[test]
    fn top_level_text_field() {
        assert_eq!(extract_text(&json!({"text": "abc"})), "abc");
    }

    #[test]
    fn fragment_array_joins_with_newline() {
        let value = json!([{"text": "line one"}, {"text": "line two"}]);
        assert_eq!(extract_text(&value), "line one\nline two");
    }

    #[test]
    fn fragment_without_text_contributes_empty_line() {
        let value = json!([{"text": "a"}, {"confidence": 0.9}, {"text": "b"}]);
        assert_eq!(extract_text(&value), "a\n\nb");
    }

    #[test]
    fn probe_order_prefers_extracted_text() {
        let value = json!({"extracted_text": "wins", "text": "loses"});
        assert_eq!(extract_text(&value), "wins");
    }

    #[test]
    fn unknown_shapes_yield_empty_string() {
        assert_eq!(extract_text(&json!({"body": 1})), "");
        assert_eq!(extract_text(&json!(42)), "");
        assert_eq!(extract_text(&json!(null)), "");
        assert_eq!(extract_text(&json!({"text": 7})), "");
    }
}
