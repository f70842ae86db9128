//! Turning raw model completions into contact candidates.
//!
//! Vision models rarely return clean JSON. A completion may be a bare object,
//! a bare array, or either one inside a markdown code fence with prose around
//! it. Extraction runs as a fixed sequence of steps, each with one way to fail:
//!
//! 1. reject empty input ([`ExtractError::Empty`])
//! 2. if fenced, cut out the bracketed JSON span ([`ExtractError::NoJsonSpan`])
//! 3. parse JSON ([`ExtractError::Malformed`])
//! 4. normalize the shape to a list of objects ([`ExtractError::UnexpectedShape`])
//! 5. check required fields, warning only
//!
//! An empty JSON array is a successful extraction of zero candidates.

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::ContactCandidate;

/// Markdown code fence marker.
const FENCE: &str = "```";

/// Errors from extracting candidates out of a completion.
///
/// `Empty` is the empty-response case; every other variant is a malformed
/// response.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("Empty response received")]
    Empty,

    #[error("Could not find valid JSON content in response")]
    NoJsonSpan,

    #[error("Failed to parse API response: {0}")]
    Malformed(String),

    #[error("Unexpected JSON shape: {0}")]
    UnexpectedShape(String),
}

impl ExtractError {
    /// True for every failure except an empty response.
    pub fn is_malformed(&self) -> bool {
        !matches!(self, ExtractError::Empty)
    }
}

/// Where the JSON text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Payload<'a> {
    /// No fence; the whole trimmed response is the candidate JSON.
    Bare(&'a str),
    /// Text sliced out of a fenced response.
    Fenced(&'a str),
}

impl<'a> Payload<'a> {
    fn text(self) -> &'a str {
        match self {
            Payload::Bare(s) | Payload::Fenced(s) => s,
        }
    }
}

/// Extract contact candidates from a raw completion, in source order.
pub fn extract(raw: &str) -> Result<Vec<ContactCandidate>, ExtractError> {
    debug!("Raw response received: {}", raw);

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ExtractError::Empty);
    }

    let payload = locate_payload(trimmed)?;
    if let Payload::Fenced(text) = payload {
        debug!("Cleaned response for parsing: {}", text);
    }

    let value: Value = serde_json::from_str(payload.text())
        .map_err(|e| ExtractError::Malformed(e.to_string()))?;
    let candidates = normalize_shape(value)?;

    for candidate in &candidates {
        let missing = candidate.missing_fields();
        if !missing.is_empty() {
            warn!(
                "Card for {} is missing fields: {:?}",
                candidate.name.as_deref().unwrap_or("Unknown"),
                missing
            );
        }
    }

    info!("Successfully parsed {} cards", candidates.len());
    Ok(candidates)
}

/// Decide whether the response is fenced and, if so, cut out the JSON span.
fn locate_payload(text: &str) -> Result<Payload<'_>, ExtractError> {
    let Some(fence_at) = text.find(FENCE) else {
        return Ok(Payload::Bare(text));
    };

    let after_fence = &text[fence_at + FENCE.len()..];
    json_span(after_fence)
        .map(Payload::Fenced)
        .ok_or(ExtractError::NoJsonSpan)
}

/// Slice from the first `[` or `{` to the last matching closer.
fn json_span(text: &str) -> Option<&str> {
    let start = text.find(['[', '{'])?;
    let closer = if text[start..].starts_with('[') { ']' } else { '}' };
    let end = text.rfind(closer)?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// Object -> one candidate; array of objects -> one candidate each.
fn normalize_shape(value: Value) -> Result<Vec<ContactCandidate>, ExtractError> {
    match value {
        Value::Object(obj) => Ok(vec![ContactCandidate::from_object(&obj)]),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::Object(obj) => Ok(ContactCandidate::from_object(obj)),
                other => Err(ExtractError::UnexpectedShape(format!(
                    "array element {} is {}, expected an object",
                    i,
                    json_kind(other)
                ))),
            })
            .collect(),
        other => Err(ExtractError::UnexpectedShape(format!(
            "expected an object or array, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JANE: &str =
        r#"{"name":"Jane Doe","business_name":"Acme","contact_number":"555-1212"}"#;

    fn jane() -> ContactCandidate {
        ContactCandidate {
            name: Some("Jane Doe".into()),
            business_name: Some("Acme".into()),
            contact_number: Some("555-1212".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_single_object() {
        assert_eq!(extract(JANE).unwrap(), vec![jane()]);
    }

    #[test]
    fn test_array_preserves_order() {
        let raw = r#"[
            {"name": "A", "business_name": "One", "contact_number": "1"},
            {"name": "B", "business_name": "Two", "contact_number": "2"},
            {"name": "C", "business_name": "Three", "contact_number": "3"}
        ]"#;
        let names: Vec<_> = extract(raw)
            .unwrap()
            .into_iter()
            .map(|c| c.name.unwrap())
            .collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_empty_array_is_not_an_error() {
        assert!(extract("[]").unwrap().is_empty());
        assert!(extract("```json\n[]\n```").unwrap().is_empty());
    }

    #[test]
    fn test_fencing_is_transparent() {
        let bare = extract(JANE).unwrap();
        for raw in [
            format!("```json\n{}\n```", JANE),
            format!("```\n{}\n```", JANE),
            format!("```json{}```", JANE),
            format!("Here is the extracted data:\n\n```json\n{}\n```\nLet me know if you need more.", JANE),
        ] {
            assert_eq!(extract(&raw).unwrap(), bare, "input: {raw}");
        }
    }

    #[test]
    fn test_fenced_array_with_nested_brackets() {
        let raw = "```json\n[{\"name\": \"A\", \"business_name\": \"X\", \"contact_number\": [\"1\", \"2\"]}]\n```";
        let candidates = extract(raw).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].contact_number.as_deref(), Some("1, 2"));
    }

    #[test]
    fn test_fenced_object_containing_array() {
        // The object opens first, so the span must run to the last '}'.
        let raw = "```json\n{\"name\": \"A\", \"phones\": [\"1\"], \"business_name\": \"X\"}\n```";
        let candidates = extract(raw).unwrap();
        assert_eq!(candidates[0].business_name.as_deref(), Some("X"));
    }

    #[test]
    fn test_empty_response() {
        assert_eq!(extract(""), Err(ExtractError::Empty));
        assert_eq!(extract("  \n "), Err(ExtractError::Empty));
        assert!(!ExtractError::Empty.is_malformed());
    }

    #[test]
    fn test_prose_is_malformed() {
        let err = extract("Sorry, I can't read this card.").unwrap_err();
        assert!(matches!(err, ExtractError::Malformed(_)));
        assert!(err.is_malformed());
    }

    #[test]
    fn test_fence_without_json() {
        assert_eq!(
            extract("```\nno data here\n```"),
            Err(ExtractError::NoJsonSpan)
        );
    }

    #[test]
    fn test_truncated_json_is_malformed() {
        let err = extract("```json\n{\"name\": \"Jane\", \"business_name\": \"Ac").unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_unexpected_shapes() {
        for raw in ["42", "\"Jane\"", "null", "true"] {
            let err = extract(raw).unwrap_err();
            assert!(matches!(err, ExtractError::UnexpectedShape(_)), "input: {raw}");
        }

        let err = extract(r#"[{"name": "A"}, "B"]"#).unwrap_err();
        assert_eq!(
            err,
            ExtractError::UnexpectedShape(
                "array element 1 is a string, expected an object".to_string()
            )
        );
    }

    #[test]
    fn test_incomplete_candidate_is_kept() {
        let candidates = extract(r#"{"name": "Jane Doe", "business_name": "Acme"}"#).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].missing_fields(), vec!["contact_number"]);
    }

    #[test]
    fn test_parse_error_carries_parser_message() {
        let err = extract("{not json}").unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("Failed to parse API response: "));
        assert!(message.contains("line 1"));
    }
}
