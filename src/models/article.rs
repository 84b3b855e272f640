//! Article preview extracted from a raw Guardian search result.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::error::{AppError, Result};

/// Maximum number of characters kept from the article body.
pub const PREVIEW_MAX_CHARS: usize = 1000;

/// Internal field name to its path in a raw search result.
pub const FIELD_ALIASES: [(&str, &[&str]); 4] = [
    ("publication_date", &["webPublicationDate"]),
    ("title", &["webTitle"]),
    ("url", &["webUrl"]),
    ("content_preview", &["fields", "bodyText"]),
];

/// Normalized subset of an article, as published to the stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticlePreview {
    #[serde(rename = "webPublicationDate")]
    publication_date: String,

    #[serde(rename = "webTitle")]
    title: String,

    #[serde(rename = "webUrl")]
    url: String,

    #[serde(rename = "contentPreview")]
    content_preview: String,
}

impl ArticlePreview {
    /// Build a preview from a raw search result.
    ///
    /// Every aliased field must be present and a string, and `webUrl` must
    /// parse as an absolute URL. The body text is truncated here, once.
    pub fn from_raw(raw: &Value) -> Result<Self> {
        let [date, title, url, body] = FIELD_ALIASES.map(|(_, path)| path);

        let url = required_str(raw, url)?;
        Url::parse(url).map_err(|e| {
            AppError::validation(format!("field 'webUrl' is not a valid URL: {e}"))
        })?;

        Ok(Self {
            publication_date: required_str(raw, date)?.to_string(),
            title: required_str(raw, title)?.to_string(),
            url: url.to_string(),
            content_preview: truncate_preview(required_str(raw, body)?),
        })
    }

    pub fn publication_date(&self) -> &str {
        &self.publication_date
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn content_preview(&self) -> &str {
        &self.content_preview
    }
}

/// Look up a string at a fixed path in a raw result.
fn required_str<'a>(raw: &'a Value, path: &[&str]) -> Result<&'a str> {
    let name = path.join(".");
    let value = path
        .iter()
        .try_fold(raw, |node, key| node.get(key))
        .ok_or_else(|| AppError::validation(format!("missing field '{name}'")))?;

    value
        .as_str()
        .ok_or_else(|| AppError::validation(format!("field '{name}' must be a string")))
}

/// Truncate article content for the preview.
///
/// Content of at most [`PREVIEW_MAX_CHARS`] characters is returned as is.
/// Longer content is cut, trailing whitespace is dropped, and an ellipsis
/// is appended when the cut ends on a letter. Otherwise trailing commas are
/// dropped and the ellipsis is appended unless the text already ends in a
/// period.
pub fn truncate_preview(content: &str) -> String {
    if content.chars().count() <= PREVIEW_MAX_CHARS {
        return content.to_string();
    }

    let cut = truncate_hard(content);
    let preview = cut.trim_end();

    match preview.chars().last() {
        None => String::new(),
        Some(last) if last.is_alphabetic() => format!("{preview}..."),
        Some(_) => {
            let stripped = preview.trim_end_matches(',');
            if stripped.ends_with('.') {
                stripped.to_string()
            } else {
                format!("{stripped}...")
            }
        }
    }
}

/// Cut content to [`PREVIEW_MAX_CHARS`] characters with no further processing.
///
/// Kept for consumers that still expect the early fixed-width previews.
pub fn truncate_hard(content: &str) -> String {
    content.chars().take(PREVIEW_MAX_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_article(body: &str) -> Value {
        json!({
            "id": "world/2024/jan/01/test",
            "webPublicationDate": "2024-01-01T10:00:00Z",
            "webTitle": "Test Title",
            "webUrl": "https://www.theguardian.com/world/2024/jan/01/test",
            "fields": { "bodyText": body, "wordcount": "3" }
        })
    }

    /// Build a body whose first 1000 chars end with `tail`.
    fn long_body(tail: &str) -> String {
        let head = "a".repeat(PREVIEW_MAX_CHARS - tail.chars().count());
        format!("{head}{tail} and more text after the cut")
    }

    #[test]
    fn test_short_content_unchanged() {
        let body = "Short body, with punctuation ,  ";
        assert_eq!(truncate_preview(body), body);

        let exact = "x".repeat(PREVIEW_MAX_CHARS);
        assert_eq!(truncate_preview(&exact), exact);
    }

    #[test]
    fn test_cut_on_letter_gets_ellipsis() {
        let preview = truncate_preview(&long_body("word"));
        assert_eq!(preview.chars().count(), PREVIEW_MAX_CHARS + 3);
        assert!(preview.ends_with("word..."));
    }

    #[test]
    fn test_cut_on_whitespace_is_stripped() {
        let preview = truncate_preview(&long_body("end   "));
        assert!(preview.ends_with("end..."));
        assert_eq!(preview.chars().count(), PREVIEW_MAX_CHARS - 3 + 3);
    }

    #[test]
    fn test_cut_on_period_has_no_ellipsis() {
        let preview = truncate_preview(&long_body("sentence."));
        assert!(preview.ends_with("sentence."));
        assert!(!preview.ends_with("..."));
    }

    #[test]
    fn test_cut_on_commas_strips_them() {
        let preview = truncate_preview(&long_body("list,, "));
        assert!(preview.ends_with("list..."));

        let preview = truncate_preview(&long_body("done.,"));
        assert!(preview.ends_with("done."));
        assert!(!preview.ends_with("..."));
    }

    #[test]
    fn test_cut_on_digit_gets_ellipsis() {
        let preview = truncate_preview(&long_body("in 2024"));
        assert!(preview.ends_with("2024..."));
    }

    #[test]
    fn test_cut_counts_chars_not_bytes() {
        let body = "é".repeat(PREVIEW_MAX_CHARS + 10);
        let preview = truncate_preview(&body);
        assert_eq!(preview.chars().count(), PREVIEW_MAX_CHARS + 3);
    }

    #[test]
    fn test_long_content_length_bound() {
        for tail in ["word", "x.", "9)", ",", " . ", "\""] {
            let preview = truncate_preview(&long_body(tail));
            assert!(preview.chars().count() <= PREVIEW_MAX_CHARS + 3);
            assert!(preview.ends_with("...") || preview.ends_with('.'));
        }
    }

    #[test]
    fn test_truncate_hard() {
        let body = long_body("word");
        let cut = truncate_hard(&body);
        assert_eq!(cut.chars().count(), PREVIEW_MAX_CHARS);
        assert!(cut.ends_with("word"));
    }

    #[test]
    fn test_from_raw() {
        let preview = ArticlePreview::from_raw(&raw_article("Body text")).unwrap();
        assert_eq!(preview.publication_date(), "2024-01-01T10:00:00Z");
        assert_eq!(preview.title(), "Test Title");
        assert_eq!(
            preview.url(),
            "https://www.theguardian.com/world/2024/jan/01/test"
        );
        assert_eq!(preview.content_preview(), "Body text");
    }

    #[test]
    fn test_from_raw_missing_nested_field() {
        let mut raw = raw_article("Body");
        raw["fields"].as_object_mut().unwrap().remove("bodyText");
        let err = ArticlePreview::from_raw(&raw).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(err.to_string().contains("fields.bodyText"));
    }

    #[test]
    fn test_from_raw_wrong_type() {
        let mut raw = raw_article("Body");
        raw["webTitle"] = json!(42);
        let err = ArticlePreview::from_raw(&raw).unwrap_err();
        assert!(err.to_string().contains("'webTitle' must be a string"));
    }

    #[test]
    fn test_from_raw_rejects_bad_url() {
        let mut raw = raw_article("Body");
        raw["webUrl"] = json!("not a url");
        let err = ArticlePreview::from_raw(&raw).unwrap_err();
        assert!(err.to_string().contains("webUrl"));
    }

    #[test]
    fn test_serialized_keys() {
        let preview = ArticlePreview::from_raw(&raw_article("Body")).unwrap();
        let value = serde_json::to_value(&preview).unwrap();
        let mut keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(
            keys,
            ["contentPreview", "webPublicationDate", "webTitle", "webUrl"]
        );
    }
}
