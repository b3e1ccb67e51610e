use chrono::Utc;
use tokio::time::Instant;

pub fn now_i64() -> i64 {
    Utc::now().timestamp()
}

pub fn get_instant() -> Instant {
    Instant::now()
}

/// Saturating conversion for TTLs coming from config or JWT claims.
pub fn ttl_to_i64(ttl_seconds: u64) -> i64 {
    i64::try_from(ttl_seconds).unwrap_or(i64::MAX)
}
