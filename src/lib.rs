//! # Classroom API Client
//!
//! Authenticated HTTP access to the classroom REST backend: a bearer token
//! cache with TTL, a provider fallback with single-flight refresh, a bounded
//! 401-retry protocol and one error shape for every failure.
//!
//! Modules:
//! - `cache` — token cache with read-time staleness
//! - `auth` — provider registration, session handle, session-expired signal
//! - `client` — request/response interceptors and the JSON HTTP surface
//! - `errors` — rejection taxonomy and `{error, details}` normalization
//! - `services` — CRUD call-through for backend collections
//! - `config` — client configuration and YAML loading

pub mod auth;
pub mod cache;
pub mod client;
pub mod config;
pub mod errors;
pub mod helpers;
pub mod observability;
pub mod services;
pub mod tests;
pub mod utils;


pub use crate::auth::{provider_fn, AccessTokenProvider, AuthSession, SessionEvent};
pub use crate::client::{ApiClient, ApiResponse};
pub use crate::config::settings::ClientConfig;
pub use crate::errors::{normalize, ClientError, NormalizedError};
