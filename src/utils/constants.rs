//! Shared constants and invariants

/// A cached token is treated as absent once fewer than this many seconds remain.
pub const TOKEN_SAFETY_BUFFER_SECS: i64 = 30;
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 3600;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3001/api";
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 10_000;

// Environment overrides
pub const ENV_API_BASE_URL: &str = "VITE_API_BASE_URL";
pub const ENV_API_TIMEOUT_MS: &str = "API_TIMEOUT_MS";

// Normalized error vocabulary
pub const SAVE_FAILED: &str = "Save failed";
pub const UNEXPECTED_ERROR_DETAILS: &str = "An unexpected error occurred.";
