//! Masking of JSON objects embedded in free-text log lines.
//!
//! Objects are located by brace matching, parsed with `serde_json` and re-emitted
//! with their keys and structure intact but volatile values replaced. A region
//! that does not parse is left exactly as it was.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static RE_UUID_VALUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$").unwrap()
});

static RE_TIMESTAMP_VALUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(?:\.\d+)?(?:Z|[+-]\d{2}:\d{2})?$").unwrap()
});

static RE_EMAIL_VALUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap()
});

/// Replaces every parseable `{...}` region of `text` with its masked form.
pub fn mask_embedded_json(text: &str) -> String {
    if !text.contains('{') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut copied = 0;
    for (start, end) in object_spans(text) {
        // Nested in a region that was already replaced.
        if start < copied {
            continue;
        }
        // A region that is not JSON stays as it is; objects nested in it come next.
        if let Some(masked) = mask_object(&text[start..end]) {
            out.push_str(&text[copied..start]);
            out.push_str(&masked);
            copied = end;
        }
    }
    out.push_str(&text[copied..]);
    out
}

/// Recursively masks a parsed JSON value, keeping object keys untouched.
pub fn mask_value(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(map.into_iter().map(|(k, v)| (k, mask_value(v))).collect()),
        Value::Array(items) => Value::Array(items.into_iter().map(mask_value).collect()),
        Value::String(s) => Value::String(mask_string_value(s)),
        Value::Number(_) => Value::String("<NUM>".to_string()),
        other => other,
    }
}

fn mask_string_value(s: String) -> String {
    if RE_UUID_VALUE.is_match(&s) {
        "<UUID>".to_string()
    } else if RE_TIMESTAMP_VALUE.is_match(&s) {
        "<TIMESTAMP>".to_string()
    } else if RE_EMAIL_VALUE.is_match(&s) {
        "<EMAIL>".to_string()
    } else {
        s
    }
}

fn mask_object(region: &str) -> Option<String> {
    match serde_json::from_str::<Value>(region) {
        Ok(v @ Value::Object(_)) => serde_json::to_string(&mask_value(v)).ok(),
        _ => None,
    }
}

/// Every balanced `{...}` region as `(start, end)` byte offsets, ordered by start
/// so an enclosing region precedes the ones nested in it. One pass over the text:
/// braces inside string literals of an open region are ignored and a `{` that is
/// never closed yields nothing.
fn object_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut open: Vec<usize> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;
    for (i, b) in text.bytes().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            // Quotes between objects are prose.
            b'"' if !open.is_empty() => in_string = true,
            b'{' => open.push(i),
            b'}' => {
                if let Some(start) = open.pop() {
                    spans.push((start, i + 1));
                }
            }
            _ => {}
        }
    }
    spans.sort_unstable_by_key(|&(start, _)| start);
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spans_skip_braces_in_strings() {
        let text = r#"x {"a":"}{","b":{"c":1}} y"#;
        let spans = object_spans(text);
        assert_eq!(spans.len(), 2);
        let (start, end) = spans[0];
        assert_eq!(&text[start..end], r#"{"a":"}{","b":{"c":1}}"#);
        assert_eq!(&text[spans[1].0..spans[1].1], r#"{"c":1}"#);
    }

    #[test]
    fn unbalanced_braces_yield_no_span() {
        assert!(object_spans("{ never closed").is_empty());
        assert_eq!(object_spans("{ {}"), vec![(2, 4)]);
        assert!(object_spans("stray } brace").is_empty());
    }
}
