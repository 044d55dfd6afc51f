//! Core content types for Seogen.
//!
//! Every generation call produces one of these shapes. Providers answer with
//! free-form text; the normalizer in `seogen-generator` turns that text into
//! the typed values below.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────
// Content kind
// ─────────────────────────────────────────────

/// Which content artifact a generation call targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Keywords,
    Title,
    Meta,
    Content,
    All,
}

impl ContentKind {
    /// The four kinds that `All` fans out to, in aggregate order.
    pub const SINGLE: [ContentKind; 4] = [
        ContentKind::Keywords,
        ContentKind::Title,
        ContentKind::Meta,
        ContentKind::Content,
    ];

    /// Lowercase wire name (`"keywords"`, `"title"`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Keywords => "keywords",
            ContentKind::Title => "title",
            ContentKind::Meta => "meta",
            ContentKind::Content => "content",
            ContentKind::All => "all",
        }
    }

    /// Parse a kind name, case-insensitively.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "keywords" => Some(ContentKind::Keywords),
            "title" | "titles" => Some(ContentKind::Title),
            "meta" => Some(ContentKind::Meta),
            "content" => Some(ContentKind::Content),
            "all" => Some(ContentKind::All),
            _ => None,
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────
// Structured content
// ─────────────────────────────────────────────

/// One SEO keyword with its provider-assigned relevance score.
///
/// The score's range is whatever the provider chose; it is not validated.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct KeywordItem {
    pub keyword: String,
    pub relevance: f64,
}

impl KeywordItem {
    pub fn new(keyword: impl Into<String>, relevance: f64) -> Self {
        Self {
            keyword: keyword.into(),
            relevance,
        }
    }
}

/// A meta description. The 160-character limit is requested in the prompt
/// but not enforced here.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MetaDescription {
    pub description: String,
}

/// Result of a `generate_all` call.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AggregatedContent {
    pub keywords: Vec<KeywordItem>,
    pub titles: Vec<String>,
    pub meta: MetaDescription,
    pub content: String,
}

// ─────────────────────────────────────────────
// Request / output
// ─────────────────────────────────────────────

/// A single generation request, as received from the HTTP or terminal layer.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationRequest {
    pub topic: String,
    pub kind: ContentKind,
    /// Keyword allow-list; only consulted when `kind == All`.
    pub selected_keywords: Option<HashSet<String>>,
}

impl GenerationRequest {
    /// Create a request without a keyword selection.
    pub fn new(kind: ContentKind, topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            kind,
            selected_keywords: None,
        }
    }

    /// Attach a keyword allow-list (ignored for single kinds).
    pub fn with_selected_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected_keywords = Some(keywords.into_iter().map(Into::into).collect());
        self
    }
}

/// Normalized output of one generation call.
///
/// Serialized untagged, so the JSON payload is exactly the inner value.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum GenerationOutput {
    Keywords(Vec<KeywordItem>),
    Titles(Vec<String>),
    Meta(MetaDescription),
    Content(String),
    All(AggregatedContent),
}

impl GenerationOutput {
    /// The content kind this output answers.
    pub fn kind(&self) -> ContentKind {
        match self {
            GenerationOutput::Keywords(_) => ContentKind::Keywords,
            GenerationOutput::Titles(_) => ContentKind::Title,
            GenerationOutput::Meta(_) => ContentKind::Meta,
            GenerationOutput::Content(_) => ContentKind::Content,
            GenerationOutput::All(_) => ContentKind::All,
        }
    }
}

// ─────────────────────────────────────────────
// OpenAI-style chat completion wire types
// ─────────────────────────────────────────────

/// A single chat message (`{"role": "user", "content": "..."}`).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Request body for an OpenAI-compatible chat completion API.
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

/// Raw chat completion response. Only the fields we read are modelled.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

/// A single choice in a chat completion response.
#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: AssistantMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// The assistant message within a chat completion choice.
#[derive(Debug, Deserialize)]
pub struct AssistantMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    /// Text of the first choice, if any.
    pub fn first_text(self) -> Option<String> {
        self.choices.into_iter().next().and_then(|c| c.message.content)
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_content_kind_parse_case_insensitive() {
        assert_eq!(ContentKind::parse("Keywords"), Some(ContentKind::Keywords));
        assert_eq!(ContentKind::parse(" META "), Some(ContentKind::Meta));
        assert_eq!(ContentKind::parse("titles"), Some(ContentKind::Title));
        assert_eq!(ContentKind::parse("slug"), None);
    }

    #[test]
    fn test_content_kind_serializes_lowercase() {
        assert_eq!(serde_json::to_value(ContentKind::All).unwrap(), json!("all"));
        assert_eq!(ContentKind::Title.to_string(), "title");
    }

    #[test]
    fn test_keyword_item_accepts_integer_relevance() {
        let item: KeywordItem =
            serde_json::from_value(json!({"keyword": "rust", "relevance": 9})).unwrap();
        assert_eq!(item, KeywordItem::new("rust", 9.0));
    }

    #[test]
    fn test_output_serializes_untagged() {
        let output = GenerationOutput::Meta(MetaDescription {
            description: "Short and sweet".into(),
        });
        assert_eq!(
            serde_json::to_value(&output).unwrap(),
            json!({"description": "Short and sweet"})
        );

        let output = GenerationOutput::Content("<p>body</p>".into());
        assert_eq!(serde_json::to_value(&output).unwrap(), json!("<p>body</p>"));
        assert_eq!(output.kind(), ContentKind::Content);
    }

    #[test]
    fn test_request_selected_keywords() {
        let req = GenerationRequest::new(ContentKind::All, "AI")
            .with_selected_keywords(["x", "y"]);
        let selected = req.selected_keywords.unwrap();
        assert!(selected.contains("x"));
        assert_eq!(selected.len(), 2);
    }

    #[test]
    fn test_chat_request_serialization() {
        let request = ChatCompletionRequest {
            model: "gpt-4o-mini".to_string(),
            messages: vec![ChatMessage::user("Hello")],
            max_tokens: None,
            temperature: Some(0.7),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["temperature"], 0.7);
        assert!(json.get("max_tokens").is_none());
    }

    #[test]
    fn test_chat_response_first_text() {
        let resp: ChatCompletionResponse = serde_json::from_value(json!({
            "id": "chatcmpl-1",
            "choices": [{"message": {"content": "hi"}, "finish_reason": "stop"}]
        }))
        .unwrap();
        assert_eq!(resp.first_text().as_deref(), Some("hi"));

        let empty: ChatCompletionResponse =
            serde_json::from_value(json!({"choices": []})).unwrap();
        assert!(empty.first_text().is_none());
    }
}
