use anyhow::{anyhow, Result};
use base64::Engine;
use serde::Deserialize;
use tracing::debug;

use crate::helpers::time::now_i64;

#[derive(Debug, Deserialize)]
pub struct JwtClaims {
    pub exp: i64,
}

/// Decodes the claims segment without verifying the signature.
/// The backend stays the authority on whether a token is valid.
fn decode_jwt_from_string(token_string: &str) -> Result<JwtClaims> {
    let parts: Vec<&str> = token_string.split('.').collect();
    if parts.len() != 3 {
        return Err(anyhow!("invalid JWT format"));
    }

    let payload = parts[1].trim_end_matches('=');
    let decoded = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| anyhow!("base64 decode error: {}", e))?;

    serde_json::from_slice::<JwtClaims>(&decoded)
        .map_err(|e| anyhow!("invalid JWT payload: {}", e))
}

/// Remaining lifetime in seconds according to the `exp` claim.
/// An expired token has a lifetime of 0; only undecodable tokens are errors.
pub fn jwt_ttl_seconds(token_value: &str) -> Result<u64> {
    let claims = decode_jwt_from_string(token_value)?;
    let remaining = claims.exp.saturating_sub(now_i64());

    if remaining <= 0 {
        debug!(expires_at = claims.exp, "jwt already expired");
        return Ok(0);
    }
    debug!(expires_at = claims.exp, "jwt parsed successfully");
    Ok(remaining as u64)
}
