//! Request body decoding with envelope-shaped failures.

use serde::de::DeserializeOwned;
use serde_json::error::Category;

use crate::error::AppError;

/// Decode a JSON body, reporting any failure as a validation error with
/// `message`. The parser's own description is only logged.
pub fn decode_json<T: DeserializeOwned>(body: &[u8], message: &'static str) -> Result<T, AppError> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(
            error = %e,
            kind = classify(&e),
            body_size = body.len(),
            "JSON parsing failed"
        );
        AppError::validation(message)
    })
}

fn classify(error: &serde_json::Error) -> &'static str {
    match error.classify() {
        Category::Syntax => "syntax",
        Category::Eof => "eof",
        Category::Data => "data",
        Category::Io => "io",
    }
}
