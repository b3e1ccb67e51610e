//! Request and response interception.
//!
//! The request side attaches `Authorization: Bearer <token>` when a token was
//! resolved. The response side decides, per response, whether the 401
//! protocol applies:
//!
//! ```text
//! First   --401--> refresh --token--> resend as Retried
//!                          --none---> AuthFailed
//! Retried --401--> AuthFailed
//! any     --2xx--> Accept
//! any     --other error--> Reject
//! ```

use http::StatusCode;
use reqwest::RequestBuilder;

use crate::client::request::RequestAttempt;

/// Attach credentials if there are any. Without a token the request goes out
/// anonymously and the backend decides.
pub fn with_credentials(builder: RequestBuilder, token: Option<&str>) -> RequestBuilder {
    match token {
        Some(token) => builder.bearer_auth(token),
        None => builder,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseVerdict {
    Accept,
    /// First 401 for this request: refresh once and resend.
    RefreshAndRetry,
    /// 401 that must not be retried again.
    AuthFailed,
    Reject,
}

pub fn on_response(status: StatusCode, attempt: RequestAttempt) -> ResponseVerdict {
    if status.is_success() {
        return ResponseVerdict::Accept;
    }
    match (status, attempt) {
        (StatusCode::UNAUTHORIZED, RequestAttempt::First) => ResponseVerdict::RefreshAndRetry,
        (StatusCode::UNAUTHORIZED, RequestAttempt::Retried) => ResponseVerdict::AuthFailed,
        _ => ResponseVerdict::Reject,
    }
}
