//! Optional time-bounded cache in front of a [`KeySource`]
//!
//! Serving cached keys means a rotated-out certificate may still be accepted
//! until the entry expires, so the cache is opt-in.

use crate::error::Result;
use crate::keys::{KeySource, SigningKeySet};
use async_trait::async_trait;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const KEY_SET_ENTRY: &str = "signing-keys";

pub struct CachedKeySource<S> {
    inner: S,
    cache: Cache<&'static str, Arc<SigningKeySet>>,
    ttl: Duration,
}

impl<S: KeySource> CachedKeySource<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        let cache = Cache::builder().max_capacity(1).time_to_live(ttl).build();

        Self { inner, cache, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Drop the cached key set; the next fetch goes to the inner source
    pub async fn invalidate(&self) {
        self.cache.invalidate(KEY_SET_ENTRY).await;
    }
}

#[async_trait]
impl<S: KeySource> KeySource for CachedKeySource<S> {
    async fn fetch(&self) -> Result<SigningKeySet> {
        if let Some(cached) = self.cache.get(KEY_SET_ENTRY).await {
            debug!(key_count = cached.len(), "Signing keys served from cache");
            return Ok(cached.as_ref().clone());
        }

        // Errors propagate without populating the cache
        let keys = self.inner.fetch().await?;
        self.cache
            .insert(KEY_SET_ENTRY, Arc::new(keys.clone()))
            .await;

        debug!(
            key_count = keys.len(),
            ttl_secs = self.ttl.as_secs(),
            "Cached signing keys"
        );
        Ok(keys)
    }
}
