use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::cache::token::CachedToken;
use crate::observability::metrics::get_metrics;

#[derive(Debug, Default)]
struct CacheState {
    token: Option<CachedToken>,
    /// bumped on every explicit write, refreshes commit only against the generation they started from
    generation: u64,
}

/// Bearer token cache shared by one auth session and every request it authorizes.
///
/// Staleness is decided at read time: nothing is evicted in the background and
/// `get` never performs I/O.
#[derive(Debug, Clone, Default)]
pub struct TokenCache {
    inner: Arc<RwLock<CacheState>>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `token` for `ttl_seconds`. `None` is the same as [`TokenCache::clear`].
    pub fn set(&self, token: Option<&str>, ttl_seconds: u64) {
        let mut state = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        state.generation += 1;
        state.token = token.map(|value| CachedToken::new(value.to_owned(), ttl_seconds));
        debug!(generation = state.generation, present = state.token.is_some(), "token cache set");
        record_expiry(state.token.as_ref());
    }

    /// Token value if more than the safety buffer of its lifetime remains.
    pub fn get(&self) -> Option<String> {
        let state = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        state
            .token
            .as_ref()
            .filter(|token| token.is_usable())
            .map(|token| token.value.to_owned())
    }

    pub fn clear(&self) {
        self.set(None, 0);
    }

    /// Raw expiry of whatever is stored, usable or not.
    pub fn expires_at(&self) -> Option<i64> {
        let state = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        state.token.as_ref().map(|token| token.expires_at)
    }

    pub fn generation(&self) -> u64 {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).generation
    }

    /// Write a refreshed token unless an explicit `set`/`clear` happened after
    /// `generation` was observed. Returns whether the write was applied.
    pub fn commit_if_current(&self, token: &str, ttl_seconds: u64, generation: u64) -> bool {
        let mut state = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if state.generation != generation {
            debug!(
                expected = generation,
                current = state.generation,
                "token cache changed during refresh, dropping refreshed token"
            );
            return false;
        }
        state.token = Some(CachedToken::new(token.to_owned(), ttl_seconds));
        record_expiry(state.token.as_ref());
        true
    }
}

fn record_expiry(token: Option<&CachedToken>) {
    get_metrics()
        .cached_token_expiry_unix
        .set(token.map(|t| t.expires_at).unwrap_or(0));
}

#[cfg(test)]
mod tests {
    use super::TokenCache;

    #[test]
    fn test_set_get_with_long_ttl() {
        let cache = TokenCache::new();
        cache.set(Some("T"), 3600);
        assert_eq!(cache.get().as_deref(), Some("T"));
        cache.set(Some("T"), 45);
        assert_eq!(cache.get().as_deref(), Some("T"));
    }

    #[test]
    fn test_ttl_within_safety_buffer_reads_as_absent() {
        let cache = TokenCache::new();
        for ttl in [0, 1, 29, 30] {
            cache.set(Some("short"), ttl);
            assert_eq!(cache.get(), None, "ttl {ttl} should be inside the buffer");
            assert!(cache.expires_at().is_some());
        }
    }

    #[test]
    fn test_set_none_clears() {
        let cache = TokenCache::new();
        cache.set(Some("T"), 3600);
        cache.set(None, 3600);
        assert_eq!(cache.get(), None);
        assert_eq!(cache.expires_at(), None);

        cache.set(Some("T"), 3600);
        cache.clear();
        assert_eq!(cache.get(), None);
    }

    #[test]
    fn test_commit_rejected_after_explicit_write() {
        let cache = TokenCache::new();
        let generation = cache.generation();
        assert!(cache.commit_if_current("refreshed", 3600, generation));
        assert_eq!(cache.get().as_deref(), Some("refreshed"));

        let generation = cache.generation();
        cache.clear();
        assert!(!cache.commit_if_current("late", 3600, generation));
        assert_eq!(cache.get(), None);
    }

    #[test]
    fn test_clones_share_state() {
        let cache = TokenCache::new();
        let other = cache.clone();
        other.set(Some("shared"), 3600);
        assert_eq!(cache.get().as_deref(), Some("shared"));
    }
}
