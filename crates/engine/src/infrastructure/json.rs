//! Tolerant accessors over `serde_json::Value`.
//!
//! Model output is untrusted: every getter takes a default and falls back to
//! it when the key is missing or holds the wrong type. Nothing here panics or
//! returns an error for malformed input.

use std::sync::LazyLock;

use regex_lite::Regex;
use serde_json::{Map, Value};

static EMPTY_OBJECT: LazyLock<Value> = LazyLock::new(|| Value::Object(Map::new()));

static CODE_FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*```[A-Za-z0-9_-]*\s*(.*?)\s*```\s*$").expect("valid regex")
});

/// Parse text that should hold an object. Anything else yields `{}`.
pub fn parse(text: &str) -> Value {
    match serde_json::from_str::<Value>(text) {
        Ok(value) if value.is_object() => value,
        Ok(_) => Value::Object(Map::new()),
        Err(e) => {
            tracing::debug!(error = %e, "Payload is not a JSON object");
            Value::Object(Map::new())
        }
    }
}

/// Parse any JSON document.
pub fn parse_any(text: &str) -> Option<Value> {
    serde_json::from_str(text).ok()
}

pub fn is_valid_json(text: &str) -> bool {
    serde_json::from_str::<serde::de::IgnoredAny>(text).is_ok()
}

pub fn stringify(value: &Value) -> String {
    value.to_string()
}

pub fn has_key(object: &Value, key: &str) -> bool {
    object.get(key).is_some()
}

pub fn get_string(object: &Value, key: &str, default: &str) -> String {
    object
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or(default)
        .to_string()
}

/// Integers and floats are both accepted; floats truncate toward zero.
pub fn get_int(object: &Value, key: &str, default: i64) -> i64 {
    match object.get(key) {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(default),
        _ => default,
    }
}

/// [`get_int`] narrowed to `i32`, saturating at the bounds.
pub fn get_i32(object: &Value, key: &str, default: i32) -> i32 {
    let value = get_int(object, key, i64::from(default));
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

pub fn get_float(object: &Value, key: &str, default: f64) -> f64 {
    object.get(key).and_then(Value::as_f64).unwrap_or(default)
}

pub fn get_bool(object: &Value, key: &str, default: bool) -> bool {
    object.get(key).and_then(Value::as_bool).unwrap_or(default)
}

/// The array under `key`, or an empty slice.
pub fn get_array<'a>(object: &'a Value, key: &str) -> &'a [Value] {
    object
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// The object under `key`, or an empty object.
pub fn get_object<'a>(object: &'a Value, key: &str) -> &'a Value {
    match object.get(key) {
        Some(value) if value.is_object() => value,
        _ => &*EMPTY_OBJECT,
    }
}

/// `choices[0].message.content` of a chat-completion response body.
pub fn chat_content(body: &str) -> Option<String> {
    let response = parse(body);
    let choice = get_array(&response, "choices").first()?;
    let message = get_object(choice, "message");
    message
        .get("content")
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Strip a surrounding markdown code fence, if any.
pub fn strip_code_fence(text: &str) -> &str {
    match CODE_FENCE_RE.captures(text).and_then(|caps| caps.get(1)) {
        Some(inner) => inner.as_str(),
        None => text.trim(),
    }
}

/// Best-effort recovery of a JSON array from model prose.
///
/// Tries the text as-is, then without a code fence, then the span between the
/// first `[` and the last `]`.
pub fn extract_array(text: &str) -> Option<Vec<Value>> {
    let candidates = [text.trim(), strip_code_fence(text)];
    for candidate in candidates {
        if let Some(Value::Array(items)) = parse_any(candidate) {
            return Some(items);
        }
    }

    let start = text.find('[')?;
    let end = text.rfind(']')?;
    if end <= start {
        return None;
    }
    match parse_any(&text[start..=end]) {
        Some(Value::Array(items)) => Some(items),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn has_key_only_sees_object_members() {
        let object = json!({"name": "Spore Knife", "damage": null});
        assert!(has_key(&object, "name"));
        assert!(has_key(&object, "damage"));
        assert!(!has_key(&object, "rarity"));
        assert!(!has_key(&json!(["name"]), "name"));
    }

    #[test]
    fn stringify_is_compact_and_parses_back() {
        let object = json!({"name": "Cap Tonic", "tags": ["healing"]});
        let text = stringify(&object);
        assert!(!text.contains('\n'));
        assert_eq!(parse(&text), object);
        assert_eq!(stringify(&json!("plain")), "\"plain\"");
    }

    #[test]
    fn parse_rejects_non_objects() {
        assert_eq!(parse("[1, 2]"), json!({}));
        assert_eq!(parse("not json"), json!({}));
        assert_eq!(parse(r#"{"a": 1}"#), json!({"a": 1}));
    }

    #[test]
    fn getters_fall_back_on_wrong_types() {
        let obj = json!({"name": 5, "damage": "ten", "flag": "yes", "list": {}, "nested": []});
        assert_eq!(get_string(&obj, "name", "Unknown"), "Unknown");
        assert_eq!(get_int(&obj, "damage", 3), 3);
        assert!(!get_bool(&obj, "flag", false));
        assert!(get_array(&obj, "list").is_empty());
        assert_eq!(get_object(&obj, "nested"), &json!({}));
        assert_eq!(get_float(&obj, "missing", 1.5), 1.5);
    }

    #[test]
    fn numbers_cross_int_and_float() {
        let obj = json!({"whole": 7, "fraction": 7.9, "negative": -2.5, "huge": 1e30});
        assert_eq!(get_int(&obj, "fraction", 0), 7);
        assert_eq!(get_int(&obj, "negative", 0), -2);
        assert_eq!(get_float(&obj, "whole", 0.0), 7.0);
        assert_eq!(get_i32(&obj, "huge", 0), i32::MAX);
    }

    #[test]
    fn chat_content_walks_choices() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"Hello"}}]}"#;
        assert_eq!(chat_content(body).as_deref(), Some("Hello"));
        assert_eq!(chat_content(r#"{"choices":[]}"#), None);
        assert_eq!(chat_content("garbage"), None);
    }

    #[test]
    fn arrays_survive_fences_and_prose() {
        let fenced = "```json\n[{\"name\": \"a\"}]\n```";
        assert_eq!(extract_array(fenced).map(|a| a.len()), Some(1));

        let prose = "Here are your items: [1, 2, 3] enjoy!";
        assert_eq!(extract_array(prose).map(|a| a.len()), Some(3));

        assert!(extract_array("no array here").is_none());
        assert!(extract_array("] backwards [").is_none());
    }

    #[test]
    fn validity_check() {
        assert!(is_valid_json("[]"));
        assert!(is_valid_json("\"text\""));
        assert!(!is_valid_json("{"));
    }
}
