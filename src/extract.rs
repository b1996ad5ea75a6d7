//! Recover a JSON object from free-form model output.
//!
//! Models wrap their answer in code fences or surround it with prose. The
//! extraction is a heuristic: strip fences, then parse everything between the
//! first `{` and the last `}`. Braces inside prose on either side of the
//! object will widen the slice and make parsing fail.

use log::debug;
use serde_json::value::RawValue;

use crate::AssistantError;

const FENCE: &str = "```";
const THINK_OPEN: &str = "<think>";

/// Strip markdown code fences and an optional `json` language tag.
#[must_use]
pub fn clean_model_output(text: &str) -> &str {
    let mut cleaned = text.trim();

    if cleaned.contains(THINK_OPEN) {
        // Detected only; the block is not stripped.
        debug!("model output contains a reasoning block");
    }

    if cleaned.starts_with(FENCE) {
        cleaned = cleaned.trim_start_matches('`');
        if cleaned
            .get(..4)
            .is_some_and(|tag| tag.eq_ignore_ascii_case("json"))
        {
            cleaned = cleaned.get(4..).unwrap_or_default().trim_start();
        }
    }
    if cleaned.ends_with(FENCE) {
        cleaned = cleaned.trim_end_matches('`').trim_end();
    }
    cleaned
}

/// Parse the JSON object embedded in `text`.
///
/// The slice is validated as JSON and returned verbatim, so key order, number
/// formatting and whitespace are exactly what the model produced. It is not
/// checked against any schema.
///
/// # Errors
///
/// Returns [`AssistantError::JsonNotFound`] with the cleaned text when no
/// `{ ... }` span exists, and [`AssistantError::JsonParse`] with the attempted
/// slice when that span is not valid JSON.
pub fn extract_json(text: &str) -> Result<Box<RawValue>, AssistantError> {
    let cleaned = clean_model_output(text);
    let not_found = || AssistantError::JsonNotFound {
        cleaned: cleaned.to_owned(),
    };
    let start = cleaned.find('{').ok_or_else(not_found)?;
    let end = cleaned.rfind('}').ok_or_else(not_found)?;
    if end <= start {
        return Err(not_found());
    }
    let candidate = cleaned.get(start..=end).ok_or_else(not_found)?;
    RawValue::from_string(candidate.to_owned()).map_err(|source| AssistantError::JsonParse {
        source,
        raw: candidate.to_owned(),
    })
}
