// tests/common/mod.rs
#![cfg(test)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::Router;
use tokio::task::JoinHandle;

use crate::auth::provider::{provider_fn, AccessTokenProvider};
use crate::auth::session::AuthSession;
use crate::client::http_client::ApiClient;
use crate::config::settings::ApiConfig;

/// Spawn an Axum router on an ephemeral port and return (JoinHandle, SocketAddr)
pub async fn spawn_axum(router: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    (handle, addr)
}

pub fn api_config(base_url: String) -> ApiConfig {
    ApiConfig {
        base_url,
        timeout_ms: 2_000,
        ..ApiConfig::default()
    }
}

pub fn build_client(base_url: String, session: AuthSession) -> ApiClient {
    ApiClient::new(&api_config(base_url), session).expect("api client")
}

/// Provider that hands out `token` and counts its invocations.
pub fn counting_provider(token: &str) -> (Arc<dyn AccessTokenProvider>, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_clone = calls.clone();
    let token = token.to_owned();
    let provider = provider_fn(move || {
        calls_clone.fetch_add(1, Ordering::SeqCst);
        let token = token.clone();
        async move { Ok(Some(token)) }
    });
    (provider, calls)
}
