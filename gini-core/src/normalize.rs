//! Turns the many reply shapes the webhooks produce into one view model.

use crate::blocks;
use crate::models::{MoleculeImage, WebResult};
use tracing::{debug, warn};
use pulldown_cmark::{html, Event, Options, Parser};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::OnceLock;

/// Reply keys that may carry the answer, in priority order.
const TEXT_KEYS: [&str; 4] = ["output", "response", "content", "message"];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Normalized {
    pub html: String,
    pub used_web_search: bool,
    pub web_results: Vec<WebResult>,
    pub molecule: Option<MoleculeImage>,
}

pub fn looks_like_json(raw: &str) -> bool {
    let trimmed = raw.trim_start();
    trimmed.starts_with('{') || trimmed.starts_with('[')
}

/// Array-wrapped replies are reduced to their first element.
pub fn first_item(value: Value) -> Value {
    match value {
        Value::Array(items) => items.into_iter().next().unwrap_or(Value::Null),
        other => other,
    }
}

pub fn process_response(raw: &str, is_image: bool) -> Normalized {
    if !looks_like_json(raw) {
        let html = if raw.contains('<') {
            raw.to_string()
        } else {
            markdown(raw)
        };
        return Normalized {
            html,
            ..Default::default()
        };
    }
    match serde_json::from_str::<Value>(raw.trim()) {
        Ok(json) => from_item(first_item(json), is_image),
        Err(err) => {
            warn!("Process error: {err}");
            Normalized {
                html: blocks::error("Error", &err.to_string()),
                ..Default::default()
            }
        }
    }
}

fn from_item(item: Value, is_image: bool) -> Normalized {
    if is_image {
        if let Some(molecule) = molecule(&item) {
            return Normalized {
                molecule: Some(molecule),
                ..Default::default()
            };
        }
    }
    let html = TEXT_KEYS
        .iter()
        .filter_map(|key| item.get(key).and_then(Value::as_str))
        .find(|text| !text.is_empty())
        .unwrap_or_default()
        .to_string();
    let used_web_search = item
        .get("used_web_search")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let web_results = ["web_results", "papers"]
        .iter()
        .filter_map(|key| item.get(key))
        .find(|value| !value.is_null())
        .map(|value| decode_list::<WebResult>(value.clone()))
        .unwrap_or_default();
    Normalized {
        html,
        used_web_search,
        web_results,
        molecule: None,
    }
}

fn molecule(item: &Value) -> Option<MoleculeImage> {
    let success = item.get("success").and_then(Value::as_bool).unwrap_or(false);
    let has_url = item
        .get("image_url")
        .and_then(Value::as_str)
        .is_some_and(|url| !url.is_empty());
    if !(success && has_url) {
        return None;
    }
    match serde_json::from_value(item.clone()) {
        Ok(molecule) => Some(molecule),
        Err(err) => {
            warn!("Ignoring malformed molecule payload: {err}");
            None
        }
    }
}

/// Decodes each element on its own so one bad entry does not hide the rest.
pub fn decode_list<T: DeserializeOwned>(value: Value) -> Vec<T> {
    let Value::Array(items) = value else {
        return vec![];
    };
    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(decoded) => Some(decoded),
            Err(err) => {
                debug!("Skipping entry: {err}");
                None
            }
        })
        .collect()
}

/// Finds a list either at the top level, under `key`, or inside an array wrapper.
pub fn list_under(value: Value, key: &str) -> Value {
    match value {
        Value::Array(items) => {
            let wrapped = items
                .first()
                .and_then(|first| first.get(key))
                .filter(|inner| inner.is_array())
                .cloned();
            wrapped.unwrap_or(Value::Array(items))
        }
        Value::Object(mut map) => map.remove(key).unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

/// Plain text replies are rendered as Markdown, keeping single line breaks.
pub fn markdown(text: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    let parser = Parser::new_ext(text, options).map(|event| match event {
        Event::SoftBreak => Event::HardBreak,
        other => other,
    });
    let mut parsed = String::new();
    html::push_html(&mut parsed, parser);
    parsed
}

pub fn html_to_text(html: &str) -> String {
    static TAGS: OnceLock<Regex> = OnceLock::new();
    static BLANK_LINES: OnceLock<Regex> = OnceLock::new();
    let tags = TAGS.get_or_init(|| Regex::new(r"<[^>]*>").expect("static regex"));
    let blank_lines = BLANK_LINES.get_or_init(|| Regex::new(r"\n\n+").expect("static regex"));
    let stripped = tags.replace_all(html, "");
    blank_lines.replace_all(&stripped, "\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_first_non_empty_text_key() {
        let normalized =
            process_response(r#"{"output": "", "response": "<p>Caffeine</p>", "content": "x"}"#, false);
        assert_eq!(normalized.html, "<p>Caffeine</p>");
        assert!(!normalized.used_web_search);
        assert!(normalized.web_results.is_empty());
    }

    #[test]
    fn unwraps_arrays_and_reads_search_fields() {
        let raw = r#"[{"output": "Found papers", "used_web_search": true,
            "papers": [{"title": "Chromene review", "url": "https://example.org"}, 12]}]"#;
        let normalized = process_response(raw, false);
        assert_eq!(normalized.html, "Found papers");
        assert!(normalized.used_web_search);
        assert_eq!(normalized.web_results.len(), 1);
        assert_eq!(normalized.web_results[0].title, "Chromene review");
    }

    #[test]
    fn image_replies_become_molecules() {
        let raw = r#"{"success": true, "image_url": "https://img/caffeine.png",
            "metadata": {"compound": "caffeine", "cid": 2519, "formula": "C8H10N4O2"}}"#;
        let normalized = process_response(raw, true);
        let molecule = normalized.molecule.unwrap();
        assert_eq!(molecule.image_url, "https://img/caffeine.png");
        assert_eq!(molecule.metadata.cid.as_deref(), Some("2519"));
        assert!(normalized.html.is_empty());

        // Without success the payload is read as text.
        let normalized =
            process_response(r#"{"success": false, "message": "no structure"}"#, true);
        assert!(normalized.molecule.is_none());
        assert_eq!(normalized.html, "no structure");

        // The same payload on the text path is never a molecule.
        assert!(process_response(raw, false).molecule.is_none());
    }

    #[test]
    fn raw_text_and_html() {
        assert_eq!(process_response("<b>bold</b>", false).html, "<b>bold</b>");
        let html = process_response("line one\nline two", false).html;
        assert!(html.starts_with("<p>line one<br />"));
        assert!(html.contains("line two</p>"));
    }

    #[test]
    fn broken_json_becomes_error_block() {
        let html = process_response("{not json", false).html;
        assert!(html.contains("bg-red-50"));
        assert!(html.contains("Error"));
    }

    #[test]
    fn empty_array_yields_empty_html() {
        let normalized = process_response("[]", false);
        assert!(normalized.html.is_empty());
    }

    #[test]
    fn lists_under_keys() {
        let wrapped = serde_json::json!([{"documents": [1, 2]}]);
        assert_eq!(list_under(wrapped, "documents"), serde_json::json!([1, 2]));
        let bare = serde_json::json!([{"id": 1}]);
        assert_eq!(list_under(bare.clone(), "documents"), bare);
        let object = serde_json::json!({"documents": [3]});
        assert_eq!(list_under(object, "documents"), serde_json::json!([3]));
        assert_eq!(list_under(serde_json::json!("x"), "documents"), Value::Null);
    }

    #[test]
    fn strips_html() {
        assert_eq!(
            html_to_text("<div><p>One</p>\n\n\n<p>Two</p></div>  "),
            "One\nTwo"
        );
        assert_eq!(html_to_text(""), "");
    }
}
