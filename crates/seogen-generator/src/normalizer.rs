//! Response normalizer: provider text in, typed content out.
//!
//! Providers are asked for bare JSON but often wrap it in a markdown fence
//! (```` ```json ... ``` ````). The fence is stripped before parsing. A
//! payload that still does not parse, or parses to the wrong JSON shape, is
//! a `MalformedResponse` carrying the raw text; it is never defaulted to an
//! empty value.

use serde::de::{DeserializeOwned, Error as _};
use serde_json::Value;

use seogen_core::{ContentKind, GenerationError, KeywordItem, MetaDescription, Result};

/// Strip one wrapping code fence and surrounding whitespace.
///
/// Handles an optional language tag after the opening fence (`json`,
/// `JSON`, `` ``` json ``, ...). Text without a fence is only trimmed.
pub fn strip_code_fence(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix("```") {
        let rest = rest.trim_start_matches([' ', '\t']);
        let tag_len = rest
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(rest.len());
        text = &rest[tag_len..];
    }
    if let Some(rest) = text.trim_end().strip_suffix("```") {
        text = rest;
    }

    text.trim()
}

/// Expected top-level JSON shape of a structured payload.
#[derive(Clone, Copy)]
enum Shape {
    /// A single object.
    Object,
    /// An array whose items are all objects.
    ArrayOfObjects,
    /// An array whose items are all strings.
    ArrayOfStrings,
}

impl Shape {
    fn matches(self, value: &Value) -> bool {
        match (self, value) {
            (Shape::Object, Value::Object(_)) => true,
            (Shape::ArrayOfObjects, Value::Array(items)) => items.iter().all(Value::is_object),
            (Shape::ArrayOfStrings, Value::Array(items)) => items.iter().all(Value::is_string),
            _ => false,
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Shape::Object => "a JSON object",
            Shape::ArrayOfObjects => "a JSON array of objects",
            Shape::ArrayOfStrings => "a JSON array of strings",
        }
    }
}

// serde's derived structs also accept the tuple form (`["a"]`), so the shape
// is checked on the untyped value before converting.
fn parse_structured<T: DeserializeOwned>(kind: ContentKind, shape: Shape, raw: &str) -> Result<T> {
    let malformed = |source: serde_json::Error| GenerationError::MalformedResponse {
        kind,
        raw: raw.to_string(),
        source,
    };

    let value: Value = serde_json::from_str(strip_code_fence(raw)).map_err(malformed)?;
    if !shape.matches(&value) {
        return Err(malformed(serde_json::Error::custom(format!(
            "expected {}",
            shape.describe()
        ))));
    }
    serde_json::from_value(value).map_err(malformed)
}

/// `[{"keyword": .., "relevance": ..}, ..]`, order preserved.
pub fn parse_keywords(raw: &str) -> Result<Vec<KeywordItem>> {
    parse_structured(ContentKind::Keywords, Shape::ArrayOfObjects, raw)
}

/// `["title", ..]`
pub fn parse_titles(raw: &str) -> Result<Vec<String>> {
    parse_structured(ContentKind::Title, Shape::ArrayOfStrings, raw)
}

/// `{"description": ".."}`. Length is not checked.
pub fn parse_meta(raw: &str) -> Result<MetaDescription> {
    parse_structured(ContentKind::Meta, Shape::Object, raw)
}

/// Content is free prose; it passes through untouched.
pub fn parse_content(raw: &str) -> String {
    raw.to_string()
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
