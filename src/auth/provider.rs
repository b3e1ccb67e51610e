use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

/// Host-supplied capability that can mint or refresh an access token on demand.
///
/// `Ok(None)` means "no token available right now" and is not an error.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    async fn fetch_token(&self) -> Result<Option<String>>;
}

/// Adapts an async closure into a provider.
pub struct FnProvider<F>(F);

impl<F> FnProvider<F> {
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<F, Fut> AccessTokenProvider for FnProvider<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<String>>> + Send,
{
    async fn fetch_token(&self) -> Result<Option<String>> {
        (self.0)().await
    }
}

pub fn provider_fn<F, Fut>(f: F) -> Arc<dyn AccessTokenProvider>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Option<String>>> + Send + 'static,
{
    Arc::new(FnProvider::new(f))
}

/// Always hands out the same token. Used for service accounts and the CLI.
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: Option<String>,
}

impl StaticTokenProvider {
    pub fn new(token: Option<String>) -> Self {
        Self { token }
    }
}

#[async_trait]
impl AccessTokenProvider for StaticTokenProvider {
    async fn fetch_token(&self) -> Result<Option<String>> {
        Ok(self.token.clone())
    }
}
