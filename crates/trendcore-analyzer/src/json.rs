use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// Non-greedy, non-nested `{...}` span: the first brace pair whose contents
/// contain no further braces.
static BALANCED_OBJECT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\{[^{}]*\}").unwrap());

/// Parse the whole response as JSON; on failure, search for the first
/// innermost balanced `{...}` span and retry once against that. Returns
/// `None` if neither parses — deliberately a single retry, not a scan over
/// every closing brace in the text.
pub fn extract_json_object(text: &str) -> Option<Value> {
    if let Ok(value) = serde_json::from_str::<Value>(text.trim()) {
        return Some(value);
    }

    let candidate = BALANCED_OBJECT.find(text)?;
    serde_json::from_str::<Value>(candidate.as_str()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_clean_object() {
        let v = extract_json_object(r#"{"a": 1}"#).unwrap();
        assert_eq!(v["a"], 1);
    }

    #[test]
    fn recovers_object_wrapped_in_prose() {
        let v = extract_json_object("Sure, here you go:\n```json\n{\"a\": 1}\n```\nThanks!").unwrap();
        assert_eq!(v["a"], 1);
    }

    #[test]
    fn returns_none_for_non_json() {
        assert!(extract_json_object("no json here at all").is_none());
    }

    #[test]
    fn prefers_innermost_object_over_outer_malformed_wrapper() {
        // The outer object is malformed (trailing comma), but the inner one
        // is well-formed and closes first.
        let v = extract_json_object(r#"{"outer": {"a": 1},}"#).unwrap();
        assert_eq!(v["a"], 1);
    }

    #[test]
    fn does_not_keep_scanning_past_the_first_failed_candidate() {
        // The first `{...}` span found is malformed; a later, valid object
        // further in the text must NOT be picked up as a second attempt.
        let text = r#"noise {invalid json here} then {"a":1}"#;
        assert!(extract_json_object(text).is_none());
    }
}
