//! Uniform `{error, details}` shape for every failure a caller can see.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::utils::constants::{SAVE_FAILED, UNEXPECTED_ERROR_DETAILS};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{error}: {details}")]
pub struct NormalizedError {
    pub error: String,
    pub details: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl NormalizedError {
    pub fn new(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: details.into(),
            message: None,
        }
    }

    pub fn unexpected() -> Self {
        Self::new(SAVE_FAILED, UNEXPECTED_ERROR_DETAILS)
    }
}

/// Classify an error payload. Pure and total.
///
/// - `error` and `details` both strings: passed through verbatim
/// - a string `message`: `Save failed` with the message as details
/// - anything else: `Save failed` with a generic detail
pub fn normalize(payload: &Value) -> NormalizedError {
    let field = |name: &str| payload.get(name).and_then(Value::as_str);

    match (field("error"), field("details"), field("message")) {
        (Some(error), Some(details), message) => NormalizedError {
            error: error.to_owned(),
            details: details.to_owned(),
            message: message.map(str::to_owned),
        },
        (_, _, Some(message)) => NormalizedError::new(SAVE_FAILED, message),
        _ => NormalizedError::unexpected(),
    }
}

/// Payload for failures that never produced a response body.
pub(crate) fn message_payload(message: impl Into<String>) -> Value {
    json!({ "message": message.into() })
}
