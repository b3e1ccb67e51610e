
// Outgoing credentials: cache hit, provider fallback, anonymous fallback.

#[cfg(test)]
mod test {

use std::sync::atomic::Ordering;

use axum::{http::HeaderMap, routing::get, Json, Router};
use serde_json::{json, Value};

use crate::auth::provider::provider_fn;
use crate::auth::session::AuthSession;
use crate::tests::common::{build_client, counting_provider, spawn_axum};

fn echo_router() -> Router {
    Router::new().route("/api/whoami", get(|headers: HeaderMap| async move {
        let authorization = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        Json(json!({ "authorization": authorization }))
    }))
}

#[tokio::test]
async fn cached_token_is_attached_without_provider_call() {
    let (handle, addr) = spawn_axum(echo_router()).await;
    let (provider, calls) = counting_provider("from-provider");
    let session = AuthSession::default().with_provider(provider);
    session.set_cached_token(Some("cached"), 3600);

    let client = build_client(format!("http://{}/api", addr), session);
    let res = client.get::<Value>("/whoami").await.unwrap();

    assert_eq!(res.data["authorization"], "Bearer cached");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    handle.abort();
}

#[tokio::test]
async fn empty_cache_uses_provider_once_and_caches() {
    let (handle, addr) = spawn_axum(echo_router()).await;
    let (provider, calls) = counting_provider("abc");
    let session = AuthSession::default().with_provider(provider);

    let client = build_client(format!("http://{}/api", addr), session.clone());
    let res = client.get::<Value>("whoami").await.unwrap();

    assert_eq!(res.data["authorization"], "Bearer abc");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(session.cache().get().as_deref(), Some("abc"));

    // the second call is served from the cache
    let res = client.get::<Value>("whoami").await.unwrap();
    assert_eq!(res.data["authorization"], "Bearer abc");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    handle.abort();
}

#[tokio::test]
async fn no_provider_sends_anonymously() {
    let (handle, addr) = spawn_axum(echo_router()).await;
    let client = build_client(format!("http://{}/api", addr), AuthSession::default());

    let res = client.get::<Value>("/whoami").await.unwrap();
    assert_eq!(res.data["authorization"], Value::Null);
    handle.abort();
}

#[tokio::test]
async fn failing_provider_does_not_abort_request() {
    let (handle, addr) = spawn_axum(echo_router()).await;
    let session = AuthSession::default()
        .with_provider(provider_fn(|| async { Err(anyhow::anyhow!("login popup closed")) }));
    let client = build_client(format!("http://{}/api", addr), session.clone());

    let res = client.get::<Value>("/whoami").await.unwrap();
    assert_eq!(res.data["authorization"], Value::Null);
    assert_eq!(session.cache().get(), None);
    handle.abort();
}

#[tokio::test]
async fn stale_cached_token_is_replaced_by_provider() {
    let (handle, addr) = spawn_axum(echo_router()).await;
    let (provider, calls) = counting_provider("fresh");
    let session = AuthSession::default().with_provider(provider);
    // inside the safety buffer
    session.set_cached_token(Some("about-to-expire"), 10);

    let client = build_client(format!("http://{}/api", addr), session.clone());
    let res = client.get::<Value>("/whoami").await.unwrap();

    assert_eq!(res.data["authorization"], "Bearer fresh");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(session.cache().get().as_deref(), Some("fresh"));
    handle.abort();
}

}
