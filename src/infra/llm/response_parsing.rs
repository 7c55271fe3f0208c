use serde_json::Value;

use crate::domain::GenerationError;

use super::provider_shape::ResponseShape;

const MAX_ERROR_MESSAGE_LEN: usize = 256;

/// Collapses whitespace runs in a provider error body and caps its length so
/// it fits on one log line.
pub(crate) fn truncate_message(body: &str) -> String {
    let mut compact = String::with_capacity(body.len().min(MAX_ERROR_MESSAGE_LEN));
    for word in body.split_whitespace() {
        if !compact.is_empty() {
            compact.push(' ');
        }
        compact.push_str(word);
    }
    compact.chars().take(MAX_ERROR_MESSAGE_LEN).collect()
}

/// Extracts the code string from a decoded provider response.
///
/// Providers sometimes answer 200 with a degenerate payload; a missing field
/// and an all-whitespace string both count as an empty result. The extracted
/// code is returned as-is.
pub fn normalize(
    raw: &Value,
    shape: ResponseShape,
    model: &str,
) -> Result<String, GenerationError> {
    match shape.extract_code(raw) {
        Some(code) if !code.trim().is_empty() => Ok(code),
        _ => Err(GenerationError::EmptyResult {
            model: model.to_string(),
        }),
    }
}
