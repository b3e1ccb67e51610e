use crate::helpers::time::{now_i64, ttl_to_i64};
use crate::utils::constants::TOKEN_SAFETY_BUFFER_SECS;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedToken {
    pub value: String,
    pub expires_at: i64, // UNIX TIMESTAMP
}

impl CachedToken {
    pub fn new(value: String, ttl_seconds: u64) -> Self {
        let expires_at = now_i64().saturating_add(ttl_to_i64(ttl_seconds));
        Self { value, expires_at }
    }

    /// Usable only while more than the safety buffer remains.
    pub fn is_usable(&self) -> bool {
        now_i64() < self.expires_at - TOKEN_SAFETY_BUFFER_SECS
    }
}
