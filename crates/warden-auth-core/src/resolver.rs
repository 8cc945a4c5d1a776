//! Key resolution with an append-only JWKS cache
//!
//! ```text
//! kid → cache hit?  ── yes ──→ SigningKey
//!          │ no
//!          ↓
//!       coalesce with any in-flight fetch for this kid
//!          ↓
//!       fetch full key set (bounded by fetch_timeout)
//!          ↓
//!       insert every valid key, re-check kid
//! ```
//!
//! The fetch runs on its own task, so a caller that gives up does not cancel
//! it; the keys still land in the cache for later callers.
//!
//! Providers never reuse key IDs, so entries are never evicted. Failed
//! lookups are not cached; the next miss fetches again.

use std::sync::Arc;
use std::time::{Duration, Instant};

use moka::future::Cache;

use crate::metrics::{self, FetchResult};
use crate::source::KeySource;
use crate::{JwkSet, KeyError, SigningKey};

/// Maps key IDs to signing keys, refilling from a [`KeySource`] on miss.
///
/// Cheap to share behind an `Arc`; all methods take `&self`.
pub struct KeyResolver {
    source: Arc<dyn KeySource>,
    fetch_timeout: Duration,
    /// kid -> signing key, append-only
    cache: Cache<String, Arc<SigningKey>>,
}

impl KeyResolver {
    /// Create a resolver with an empty cache
    pub fn new(source: Arc<dyn KeySource>, fetch_timeout: Duration) -> Self {
        Self {
            source,
            fetch_timeout,
            cache: Cache::builder().build(),
        }
    }

    /// Resolve a key ID to its signing key.
    ///
    /// Concurrent misses for the same kid share one fetch. Other valid keys in
    /// the fetched set are cached as well.
    pub async fn resolve(&self, kid: &str) -> Result<Arc<SigningKey>, KeyError> {
        if let Some(key) = self.cache.get(kid).await {
            return Ok(key);
        }

        self.cache
            .try_get_with_by_ref(kid, self.fetch_for(kid))
            .await
            .map_err(|e| (*e).clone())
    }

    /// Fetch the key set and cache every valid key in it.
    ///
    /// Returns the number of usable keys the provider published.
    pub async fn prefetch(&self) -> Result<usize, KeyError> {
        let count = self.spawn_refresh().await?.len();
        tracing::info!(count, source = %self.source.describe(), "Prefetched signing keys");
        Ok(count)
    }

    /// Key IDs currently cached, sorted
    pub fn known_key_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.cache.iter().map(|(kid, _)| (*kid).clone()).collect();
        ids.sort();
        ids
    }

    /// Number of cached keys
    pub async fn cached_key_count(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }

    /// Cache miss path for one kid: runs at most once per in-flight miss
    async fn fetch_for(&self, kid: &str) -> Result<Arc<SigningKey>, KeyError> {
        tracing::debug!(kid, "Signing key cache miss");

        let keys = self.spawn_refresh().await?;
        keys.into_iter()
            .find(|key| key.key_id() == kid)
            .ok_or_else(|| {
                tracing::debug!(kid, "Key not found in fresh JWKS");
                KeyError::KeyNotFound {
                    kid: kid.to_string(),
                }
            })
    }

    /// Run a refresh on its own task.
    ///
    /// Dropping the caller does not cancel the fetch; it still completes and
    /// fills the cache.
    async fn spawn_refresh(&self) -> Result<Vec<Arc<SigningKey>>, KeyError> {
        let task = tokio::spawn(refresh(
            Arc::clone(&self.source),
            self.cache.clone(),
            self.fetch_timeout,
        ));
        task.await
            .map_err(|e| KeyError::ProviderUnavailable(format!("key fetch task failed: {}", e)))?
    }
}

/// Fetch the full key set and insert every valid key
async fn refresh(
    source: Arc<dyn KeySource>,
    cache: Cache<String, Arc<SigningKey>>,
    fetch_timeout: Duration,
) -> Result<Vec<Arc<SigningKey>>, KeyError> {
    let started = Instant::now();
    let outcome = tokio::time::timeout(fetch_timeout, source.fetch_key_set()).await;
    let elapsed = started.elapsed().as_secs_f64();

    let set: JwkSet = match outcome {
        Ok(Ok(set)) => {
            metrics::record_fetch(FetchResult::Success, elapsed);
            set
        }
        Ok(Err(e)) => {
            metrics::record_fetch(FetchResult::Error, elapsed);
            return Err(e);
        }
        Err(_) => {
            metrics::record_fetch(FetchResult::Timeout, elapsed);
            tracing::error!(
                source = %source.describe(),
                timeout_ms = fetch_timeout.as_millis() as u64,
                "JWKS fetch timed out"
            );
            return Err(KeyError::ProviderUnavailable(format!(
                "fetch timed out after {:?}",
                fetch_timeout
            )));
        }
    };

    let mut keys = Vec::new();
    for key in set.signing_keys() {
        let key = Arc::new(key);
        cache.insert(key.key_id().to_string(), Arc::clone(&key)).await;
        keys.push(key);
    }
    Ok(keys)
}

impl std::fmt::Debug for KeyResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyResolver")
            .field("source", &self.source.describe())
            .field("fetch_timeout", &self.fetch_timeout)
            .finish_non_exhaustive()
    }
}
