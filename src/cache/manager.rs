//! Context cache manager.

use std::collections::HashSet;
use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex as StdMutex;
use std::time::{Duration, Instant};

use lru::LruCache;
use tokio::sync::Mutex;

use crate::cache::key::CacheKey;
use crate::types::Provider;
use crate::Result;

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// How long a vendor cache handle stays reusable. Matches the TTL sent
    /// on the vendor-side creation call.
    pub ttl: Duration,
    /// Upper bound on tracked handles; least-recently-used entries fall out.
    pub max_entries: usize,
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60),
            max_entries: 256,
            enabled: true,
        }
    }
}

impl CacheConfig {
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// One vendor-side cache reference. Replaced, never mutated, on renewal.
#[derive(Debug, Clone)]
struct CacheEntry {
    handle: String,
    expires_at: Instant,
}

/// Result of a vendor cache-creation call.
#[derive(Debug, Clone)]
pub struct CreatedCache {
    /// Opaque vendor reference (e.g. a Gemini `cachedContents/...` name).
    pub handle: String,
    /// Tokens the vendor charged for storing the context.
    pub creation_tokens: u64,
}

/// Outcome of a cache lookup: the handle to generate against, plus the
/// creation token count when this call paid for a fresh entry (zero on reuse).
#[derive(Debug, Clone)]
pub struct CacheOutcome {
    pub handle: String,
    pub creation_tokens: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub creations: u64,
    pub opt_outs: u64,
}

#[derive(Default)]
struct AtomicStats {
    hits: AtomicU64,
    misses: AtomicU64,
    creations: AtomicU64,
    opt_outs: AtomicU64,
}

impl AtomicStats {
    fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            creations: self.creations.load(Ordering::Relaxed),
            opt_outs: self.opt_outs.load(Ordering::Relaxed),
        }
    }
}

/// Tracks vendor-side context cache handles by content fingerprint.
///
/// Shared across concurrently executing call chains: the handle map sits
/// behind an async mutex held across creation, so two simultaneous calls
/// with the same fingerprint produce a single creation call (the second
/// waits and then reuses the fresh handle).
///
/// Models that fail a cache-creation call are marked cache-unsupported for
/// the remainder of the process lifetime; the transition is one-way.
pub struct ContextCacheManager {
    config: CacheConfig,
    entries: Mutex<LruCache<String, CacheEntry>>,
    unsupported: StdMutex<HashSet<String>>,
    stats: AtomicStats,
}

impl ContextCacheManager {
    pub fn new(config: CacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.max_entries.max(1)).unwrap();
        Self {
            config,
            entries: Mutex::new(LruCache::new(capacity)),
            unsupported: StdMutex::new(HashSet::new()),
            stats: AtomicStats::default(),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Whether the cached path should even be attempted for this model.
    pub fn is_unsupported(&self, provider: Provider, model: &str) -> bool {
        !self.config.enabled
            || self
                .unsupported
                .lock()
                .expect("unsupported set poisoned")
                .contains(&scope(provider, model))
    }

    /// Permanently opt this model out of the cached path.
    pub fn mark_unsupported(&self, provider: Provider, model: &str) {
        let inserted = self
            .unsupported
            .lock()
            .expect("unsupported set poisoned")
            .insert(scope(provider, model));
        if inserted {
            self.stats.opt_outs.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(%provider, model, "context caching disabled for model");
        }
    }

    /// Look up an unexpired handle for `key`, or run `create` to obtain one.
    ///
    /// Creation failures propagate to the caller, which is expected to mark
    /// the model unsupported and fall back to the uncached path — the error
    /// never travels further than the adapter.
    pub async fn get_or_create<F, Fut>(&self, key: &CacheKey, create: F) -> Result<CacheOutcome>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<CreatedCache>>,
    {
        let mut entries = self.entries.lock().await;
        if let Some(entry) = entries.get(key.as_str()) {
            if entry.expires_at > Instant::now() {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(key = %key, "context cache hit");
                return Ok(CacheOutcome {
                    handle: entry.handle.clone(),
                    creation_tokens: 0,
                });
            }
        }
        self.stats.misses.fetch_add(1, Ordering::Relaxed);

        let created = create().await?;
        entries.put(
            key.as_str().to_string(),
            CacheEntry {
                handle: created.handle.clone(),
                expires_at: Instant::now() + self.config.ttl,
            },
        );
        self.stats.creations.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            key = %key,
            provider = %key.provider,
            model = %key.model,
            handle = %created.handle,
            "context cache entry created"
        );
        Ok(CacheOutcome {
            handle: created.handle,
            creation_tokens: created.creation_tokens,
        })
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }
}

fn scope(provider: Provider, model: &str) -> String {
    format!("{}/{}", provider, model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::key::fingerprint;
    use crate::error::Error;
    use std::sync::atomic::AtomicU32;
    use std::sync::Arc;

    fn manager(ttl: Duration) -> ContextCacheManager {
        ContextCacheManager::new(CacheConfig::default().with_ttl(ttl))
    }

    fn key(model: &str) -> CacheKey {
        fingerprint(Provider::GoogleGemini, model, "static context", &[])
    }

    #[tokio::test]
    async fn second_lookup_reuses_the_handle() {
        let cache = manager(Duration::from_secs(60));
        let creations = Arc::new(AtomicU32::new(0));

        for round in 0..2u32 {
            let creations = creations.clone();
            let outcome = cache
                .get_or_create(&key("gemini-1.5-pro-002"), move || async move {
                    creations.fetch_add(1, Ordering::SeqCst);
                    Ok(CreatedCache {
                        handle: "cachedContents/abc".into(),
                        creation_tokens: 42,
                    })
                })
                .await
                .unwrap();
            assert_eq!(outcome.handle, "cachedContents/abc");
            assert_eq!(outcome.creation_tokens, if round == 0 { 42 } else { 0 });
        }

        assert_eq!(creations.load(Ordering::SeqCst), 1);
        assert_eq!(cache.stats().hits, 1);
        assert_eq!(cache.stats().creations, 1);
    }

    #[tokio::test]
    async fn expired_entries_are_replaced() {
        let cache = manager(Duration::ZERO);
        let creations = Arc::new(AtomicU32::new(0));

        for _ in 0..2 {
            let creations = creations.clone();
            cache
                .get_or_create(&key("gemini-1.5-pro-002"), move || async move {
                    creations.fetch_add(1, Ordering::SeqCst);
                    Ok(CreatedCache {
                        handle: "cachedContents/next".into(),
                        creation_tokens: 1,
                    })
                })
                .await
                .unwrap();
        }

        assert_eq!(creations.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn concurrent_lookups_create_once() {
        let cache = Arc::new(manager(Duration::from_secs(60)));
        let creations = Arc::new(AtomicU32::new(0));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                let creations = creations.clone();
                tokio::spawn(async move {
                    cache
                        .get_or_create(&key("gemini-1.5-pro-002"), move || async move {
                            creations.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(10)).await;
                            Ok(CreatedCache {
                                handle: "cachedContents/one".into(),
                                creation_tokens: 5,
                            })
                        })
                        .await
                        .unwrap()
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(creations.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn creation_failure_propagates_to_the_adapter() {
        let cache = manager(Duration::from_secs(60));
        let result = cache
            .get_or_create(&key("gemini-2.0-flash-001"), || async {
                Err(Error::cache("cachedContents rejected the model"))
            })
            .await;
        assert!(matches!(result, Err(Error::Cache(_))));
        assert_eq!(cache.stats().creations, 0);
    }

    #[test]
    fn opt_out_is_one_way_and_scoped_to_the_model() {
        let cache = manager(Duration::from_secs(60));
        assert!(!cache.is_unsupported(Provider::GoogleGemini, "gemini-1.5-pro-002"));

        cache.mark_unsupported(Provider::GoogleGemini, "gemini-1.5-pro-002");
        cache.mark_unsupported(Provider::GoogleGemini, "gemini-1.5-pro-002");

        assert!(cache.is_unsupported(Provider::GoogleGemini, "gemini-1.5-pro-002"));
        assert!(!cache.is_unsupported(Provider::GoogleGemini, "gemini-1.5-flash-002"));
        assert_eq!(cache.stats().opt_outs, 1);
    }

    #[test]
    fn disabled_cache_reports_every_model_unsupported() {
        let cache = ContextCacheManager::new(CacheConfig::default().with_enabled(false));
        assert!(cache.is_unsupported(Provider::GoogleGemini, "gemini-1.5-pro-002"));
    }
}
