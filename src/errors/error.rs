use http::StatusCode;
use serde_json::Value;
use thiserror::Error;

use crate::errors::normalizer::{message_payload, normalize, NormalizedError};

/// Every way an API call can be rejected.
///
/// A first 401 is not listed: it is consumed by the retry protocol and only
/// surfaces as [`ClientError::AuthFailed`] when it cannot be recovered.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("authorization failed for {url}: {status}")]
    AuthFailed {
        status: StatusCode,
        url: String,
        body: Value,
    },

    #[error("server responded {status} for {url}: {message}")]
    Server {
        status: StatusCode,
        url: String,
        message: String,
        body: Value,
    },

    #[error("no response received from {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request setup failed: {0}")]
    Setup(String),

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ClientError {
    pub fn setup<S: Into<String>>(msg: S) -> Self {
        Self::Setup(msg.into())
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::AuthFailed { status, .. } | ClientError::Server { status, .. } => Some(*status),
            ClientError::Network { source, .. } => source.status(),
            ClientError::Setup(_) | ClientError::Decode { .. } => None,
        }
    }

    /// Response body as received, for responses that carried one.
    pub fn body(&self) -> Option<&Value> {
        match self {
            ClientError::AuthFailed { body, .. } | ClientError::Server { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Label used for logs and the failure counter.
    pub fn kind(&self) -> &'static str {
        match self {
            ClientError::AuthFailed { .. } => "auth_failed",
            ClientError::Server { .. } => "server",
            ClientError::Network { .. } => "network",
            ClientError::Setup(_) => "setup",
            ClientError::Decode { .. } => "decode",
        }
    }

    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ClientError::AuthFailed { .. })
    }

    /// Normalize the response body when there is one, the error message otherwise.
    pub fn normalized(&self) -> NormalizedError {
        match self.body() {
            Some(body) => normalize(body),
            None => normalize(&message_payload(self.to_string())),
        }
    }
}

/// Best-effort human message out of an error body.
pub(crate) fn body_message(body: &Value) -> String {
    ["message", "error", "details"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .map(str::to_owned)
        .or_else(|| body.as_str().map(str::to_owned))
        .unwrap_or_else(|| body.to_string())
}
