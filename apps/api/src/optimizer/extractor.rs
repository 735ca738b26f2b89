//! Structured Extractor: recovers the resume JSON from free-form model output.
//!
//! Candidate selection:
//! 1. First fenced block (```` ``` ```` optionally tagged `json`): its trimmed interior, unvalidated.
//! 2. Otherwise the span from the first `{` to the `}` that brings brace depth back to zero.
//!
//! The brace scan does not understand string literals: a `}` inside a quoted value counts.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::models::resume::ResumeRecord;

static FENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(?:json)?(.*?)```").expect("fence pattern compiles"));

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("no JSON object found in the model response")]
    NoJsonFound,

    #[error("model response contained malformed JSON: {0}")]
    MalformedJson(#[source] serde_json::Error),

    #[error("model JSON does not match the resume schema: {0}")]
    SchemaMismatch(String),
}

/// Returns the JSON candidate inside `raw_text`, or `None` when there is none.
pub fn extract_json(raw_text: &str) -> Option<&str> {
    if let Some(captures) = FENCE_RE.captures(raw_text) {
        return captures.get(1).map(|m| m.as_str().trim());
    }

    let start = raw_text.find('{')?;
    let mut depth = 0usize;
    for (offset, ch) in raw_text[start..].char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&raw_text[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parses an extracted candidate and validates it into a `ResumeRecord`.
pub fn parse_record(candidate: &str) -> Result<ResumeRecord, ExtractionError> {
    let value: serde_json::Value =
        serde_json::from_str(candidate).map_err(ExtractionError::MalformedJson)?;
    validate_record(value)
}

/// Validates an already-parsed JSON value against the resume schema.
pub fn validate_record(value: serde_json::Value) -> Result<ResumeRecord, ExtractionError> {
    if !value.is_object() {
        return Err(ExtractionError::SchemaMismatch(format!(
            "expected a JSON object, found {}",
            json_kind(&value)
        )));
    }
    serde_json::from_value(value).map_err(|e| ExtractionError::SchemaMismatch(e.to_string()))
}

/// `extract_json` followed by `parse_record`.
pub fn extract_record(raw_text: &str) -> Result<ResumeRecord, ExtractionError> {
    let candidate = extract_json(raw_text).ok_or(ExtractionError::NoJsonFound)?;
    parse_record(candidate)
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_record;

    #[test]
    fn test_fenced_json_block_is_returned_trimmed() {
        let input = "prefix ```json\n{\"a\":1}\n``` suffix";
        assert_eq!(extract_json(input), Some("{\"a\":1}"));
    }

    #[test]
    fn test_untagged_fence_is_returned_trimmed() {
        let input = "Here you go:\n```\n  {\"a\": [1, 2]}  \n```";
        assert_eq!(extract_json(input), Some("{\"a\": [1, 2]}"));
    }

    #[test]
    fn test_fence_wins_over_braces_outside_it() {
        let input = "{\"outside\": true} then ```json\n{\"inside\": true}\n``` and {more}";
        assert_eq!(extract_json(input), Some("{\"inside\": true}"));
    }

    #[test]
    fn test_fence_interior_is_not_validated() {
        let input = "```json\nnot json at all\n```";
        assert_eq!(extract_json(input), Some("not json at all"));
    }

    #[test]
    fn test_only_first_fence_is_used() {
        let input = "```json\n{\"first\":1}\n```\n```json\n{\"second\":2}\n```";
        assert_eq!(extract_json(input), Some("{\"first\":1}"));
    }

    #[test]
    fn test_nested_braces_are_matched_to_depth_zero() {
        let input = "noise {\"x\":{\"y\":2}} trailing";
        assert_eq!(extract_json(input), Some("{\"x\":{\"y\":2}}"));
    }

    #[test]
    fn test_scan_stops_at_first_balanced_object() {
        let input = "a {\"one\":1} b {\"two\":2}";
        assert_eq!(extract_json(input), Some("{\"one\":1}"));
    }

    #[test]
    fn test_no_braces_is_not_found() {
        assert_eq!(extract_json("no braces here"), None);
    }

    #[test]
    fn test_unbalanced_open_brace_is_not_found() {
        assert_eq!(extract_json("start {\"a\": {\"b\": 1} and never closed"), None);
    }

    #[test]
    fn test_unterminated_fence_falls_back_to_brace_scan() {
        let input = "```json\n{\"a\":1}";
        assert_eq!(extract_json(input), Some("{\"a\":1}"));
    }

    #[test]
    fn test_braces_inside_strings_are_counted() {
        // Known limitation: the scan closes on the `}` inside the string value.
        let input = "{\"note\": \"use } carefully\", \"x\": 1}";
        assert_eq!(extract_json(input), Some("{\"note\": \"use }"));
        assert!(matches!(
            extract_record(input),
            Err(ExtractionError::MalformedJson(_))
        ));
    }

    #[test]
    fn test_multibyte_text_around_object() {
        let input = "Résumé → {\"name\":\"Zoë\"} ✓";
        assert_eq!(extract_json(input), Some("{\"name\":\"Zoë\"}"));
    }

    #[test]
    fn test_extract_record_reports_no_json_found() {
        assert!(matches!(
            extract_record("Sorry, I cannot help with that."),
            Err(ExtractionError::NoJsonFound)
        ));
    }

    #[test]
    fn test_extract_record_reports_malformed_json() {
        assert!(matches!(
            extract_record("```json\n{\"name\": \"Ada\",}\n```"),
            Err(ExtractionError::MalformedJson(_))
        ));
    }

    #[test]
    fn test_extract_record_reports_schema_mismatch_for_array() {
        match extract_record("```json\n[1, 2, 3]\n```") {
            Err(ExtractionError::SchemaMismatch(msg)) => assert!(msg.contains("an array")),
            other => panic!("expected schema mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_extract_record_reports_schema_mismatch_for_missing_name() {
        assert!(matches!(
            extract_record("{\"title\": \"Engineer\"}"),
            Err(ExtractionError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn test_fenced_record_with_commentary_parses() {
        let record = sample_record();
        let raw = format!(
            "Here is the optimized resume:\n```json\n{}\n```\nLet me know if you need changes.",
            serde_json::to_string_pretty(&record).unwrap()
        );
        assert_eq!(extract_record(&raw).unwrap(), record);
    }
}
