use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::broadcast::{Receiver, Sender};
use tracing::{debug, error, info, warn};

use crate::auth::events::SessionEvent;
use crate::auth::provider::AccessTokenProvider;
use crate::cache::token_cache::TokenCache;
use crate::helpers::jwt::jwt_ttl_seconds;
use crate::observability::metrics::get_metrics;
use crate::utils::channel;
use crate::utils::constants::DEFAULT_TOKEN_TTL_SECS;

type RefreshFuture = Shared<BoxFuture<'static, Option<String>>>;

struct SessionInner {
    cache: TokenCache,
    provider: RwLock<Option<Arc<dyn AccessTokenProvider>>>,
    /// at most one provider call outstanding, every concurrent caller awaits it
    inflight: Mutex<Option<RefreshFuture>>,
    events: Sender<SessionEvent>,
    token_ttl_seconds: u64,
}

/// Credentials for one API client: the token cache, the registered provider
/// and the session-expired signal.
///
/// Cloning is cheap and every clone shares the same state.
#[derive(Clone)]
pub struct AuthSession {
    inner: Arc<SessionInner>,
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSession")
            .field("cache", &self.inner.cache)
            .field("has_provider", &self.has_provider())
            .field("token_ttl_seconds", &self.inner.token_ttl_seconds)
            .finish()
    }
}

impl Default for AuthSession {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_TTL_SECS)
    }
}

impl AuthSession {
    /// `token_ttl_seconds` applies to tokens obtained from the provider.
    pub fn new(token_ttl_seconds: u64) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                cache: TokenCache::new(),
                provider: RwLock::new(None),
                inflight: Mutex::new(None),
                events: channel::run(),
                token_ttl_seconds,
            }),
        }
    }

    pub fn with_provider(self, provider: Arc<dyn AccessTokenProvider>) -> Self {
        self.set_access_token_provider(Some(provider));
        self
    }

    /// Register, replace or (with `None`) remove the provider. Last write wins.
    pub fn set_access_token_provider(&self, provider: Option<Arc<dyn AccessTokenProvider>>) {
        info!(registered = provider.is_some(), "access token provider updated");
        *self.inner.provider.write().unwrap_or_else(PoisonError::into_inner) = provider;
    }

    pub fn has_provider(&self) -> bool {
        self.inner.provider.read().unwrap_or_else(PoisonError::into_inner).is_some()
    }

    fn provider(&self) -> Option<Arc<dyn AccessTokenProvider>> {
        self.inner.provider.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Explicit sync from the auth collaborator after login or a silent refresh.
    pub fn set_cached_token(&self, token: Option<&str>, ttl_seconds: u64) {
        self.inner.cache.set(token, ttl_seconds);
    }

    /// Like [`AuthSession::set_cached_token`] with the TTL read from the JWT `exp` claim.
    /// Opaque or undecodable tokens get the default TTL, expired ones are stored unusable.
    pub fn sync_jwt(&self, token: &str) {
        let ttl = jwt_ttl_seconds(token).unwrap_or_else(|err| {
            debug!(error = %err, "token ttl not derivable from claims, using default");
            self.inner.token_ttl_seconds
        });
        self.inner.cache.set(Some(token), ttl);
    }

    pub fn logout(&self) {
        info!("session cleared");
        self.inner.cache.clear();
    }

    pub fn cache(&self) -> &TokenCache {
        &self.inner.cache
    }

    pub fn subscribe(&self) -> Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    /// Token for an outgoing request: the cache when it holds a usable token,
    /// the provider otherwise. `None` means send without credentials.
    pub async fn authorize(&self) -> Option<String> {
        if let Some(token) = self.inner.cache.get() {
            return Some(token);
        }
        if !self.has_provider() {
            debug!("no cached token and no provider registered, sending without credentials");
            return None;
        }
        self.refresh().await
    }

    /// Ask the provider for a fresh token, ignoring the cache.
    ///
    /// Concurrent callers share a single provider call. Provider errors are
    /// logged here and reported as `None`.
    pub async fn refresh(&self) -> Option<String> {
        let pending = {
            let mut slot = self.inner.inflight.lock().unwrap_or_else(PoisonError::into_inner);
            match slot.as_ref() {
                Some(pending) => {
                    debug!("joining in-flight token refresh");
                    pending.clone()
                }
                None => {
                    let provider = self.provider()?;
                    let pending = self.start_refresh(provider);
                    *slot = Some(pending.clone());
                    pending
                }
            }
        };
        pending.await
    }

    fn start_refresh(&self, provider: Arc<dyn AccessTokenProvider>) -> RefreshFuture {
        let cache = self.inner.cache.clone();
        let ttl = self.inner.token_ttl_seconds;
        let generation = cache.generation();
        let session = Arc::downgrade(&self.inner);

        async move {
            let metrics = get_metrics();
            let outcome = match provider.fetch_token().await {
                Ok(Some(token)) => {
                    metrics.provider_calls.with_label_values(&["token"]).inc();
                    if cache.commit_if_current(&token, ttl, generation) {
                        debug!("refreshed token cached");
                        Some(token)
                    } else {
                        // an explicit set/clear landed meanwhile and wins
                        cache.get()
                    }
                }
                Ok(None) => {
                    metrics.provider_calls.with_label_values(&["empty"]).inc();
                    warn!("access token provider returned no token");
                    None
                }
                Err(err) => {
                    metrics.provider_calls.with_label_values(&["error"]).inc();
                    error!(error = ?err, "access token provider failed");
                    None
                }
            };
            if let Some(inner) = session.upgrade() {
                inner.inflight.lock().unwrap_or_else(PoisonError::into_inner).take();
            }
            outcome
        }
        .boxed()
        .shared()
    }

    /// Emit the session-expired signal. Having no subscriber is fine.
    pub fn expire_session(&self, method: &str, url: &str) {
        get_metrics().session_expired.inc();
        warn!(method, url, "session expired");
        let event = SessionEvent::Expired { method: method.to_owned(), url: url.to_owned() };
        if let Err(err) = self.inner.events.send(event) {
            debug!("session expired event had no receivers: {}", err);
        }
    }
}
