use http::{Method, StatusCode};
use serde_json::Value;

/// One logical call. Resent verbatim when the 401 protocol retries it.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>, body: Option<Value>) -> Self {
        Self { method, path: path.into(), body }
    }
}

/// Whether a logical request has already used its single 401 retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestAttempt {
    #[default]
    First,
    Retried,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse<T> {
    pub status: StatusCode,
    pub data: T,
}
