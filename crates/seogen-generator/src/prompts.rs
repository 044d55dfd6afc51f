//! Kind-specific prompt templates.
//!
//! Each prompt embeds the topic verbatim and asks for a bare JSON payload
//! (except `content`, whose shape the normalizer does not rely on).

use seogen_core::ContentKind;

/// Build the prompt for one single-kind generation.
///
/// `All` has no prompt of its own; it fans out to the four single kinds.
pub fn build(kind: ContentKind, topic: &str) -> Option<String> {
    let prompt = match kind {
        ContentKind::Keywords => format!(
            "Generate 10 relevant SEO keywords for the topic: {topic}. \
             Also give me the score of how much the keyword is relevant to the topic. \
             Return only a JSON array of objects with \"keyword\" and \"relevance\" fields, \
             without any markdown formatting or additional text."
        ),
        ContentKind::Title => format!(
            "Generate 1 engaging title for the topic: {topic}. \
             The title should be very attractive and under 60 characters. \
             Return only a html object inside a JSON array of strings, \
             without any markdown formatting or additional text."
        ),
        ContentKind::Meta => format!(
            "Generate meta description for the topic: {topic}. \
             The description should be under 160 characters and SEO optimized. \
             Return only a html object inside a JSON object with a single \"description\" field, \
             without any markdown formatting or additional text."
        ),
        ContentKind::Content => format!(
            "Generate a detailed article about: {topic}. \
             Include introduction, main points, and conclusion. \
             Return only a html object inside a JSON array of strings, \
             without any markdown formatting or additional text."
        ),
        ContentKind::All => return None,
    };
    Some(prompt)
}
