//! AI generation of study materials from document text.
//!
//! Flashcard and quiz generators share the same shape: send the (truncated)
//! document text to the chat model in structured-JSON mode, validate the
//! returned records, and persist them individually.

mod flashcards;
mod quiz;

pub use flashcards::FlashcardGenerator;
pub use quiz::QuizGenerator;

use crate::error::{Result, TerpError};
use serde_json::Value;

/// Whether a generator may run again when records already exist for a
/// document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdempotencyPolicy {
    /// Skip generation (and the model call) when records already exist.
    SkipIfExisting,
    /// Always call the model; repeated runs append records.
    AlwaysGenerate,
}

/// Outcome of a generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// This many new records were generated and persisted.
    Generated(usize),
    /// Records already existed and the policy skipped generation.
    SkippedExisting,
}

/// Pull the array of records out of a structured-output response.
///
/// The model may return a bare array, or an object wrapping the array
/// under `wrapper_key` (or some other single key).
pub(crate) fn unwrap_array(value: Value, wrapper_key: &str) -> Result<Vec<Value>> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => {
            if let Some(Value::Array(items)) = map.remove(wrapper_key) {
                return Ok(items);
            }

            let mut arrays: Vec<Vec<Value>> = map
                .into_iter()
                .filter_map(|(_, v)| match v {
                    Value::Array(items) => Some(items),
                    _ => None,
                })
                .collect();

            if arrays.len() == 1 {
                Ok(arrays.remove(0))
            } else {
                Err(TerpError::MalformedModelOutput(format!(
                    "expected a JSON array or an object wrapping one under '{}'",
                    wrapper_key
                )))
            }
        }
        other => Err(TerpError::MalformedModelOutput(format!(
            "expected a JSON array, got {}",
            value_kind(&other)
        ))),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Truncate text to at most `max` characters on a char boundary.
pub(crate) fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unwrap_bare_array() {
        let items = unwrap_array(json!([{"a": 1}]), "records").unwrap();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_unwrap_named_wrapper() {
        let items = unwrap_array(json!({"records": [1, 2]}), "records").unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_unwrap_single_other_array_field() {
        let items = unwrap_array(json!({"cards": [1, 2, 3]}), "records").unwrap();
        assert_eq!(items.len(), 3);
    }

    #[test]
    fn test_unwrap_rejects_ambiguous_and_scalar() {
        assert!(unwrap_array(json!({"a": [1], "b": [2]}), "records").is_err());
        assert!(unwrap_array(json!("just text"), "records").is_err());
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 3), "hel");
        // Multibyte chars are not split
        assert_eq!(truncate_chars("héllo", 2), "hé");
    }
}
