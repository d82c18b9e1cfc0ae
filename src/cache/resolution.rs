//! Memoized route resolution.
//!
//! # Responsibilities
//! - Resolve each distinct request shape once
//! - Return the stored descriptor on repeat
//! - Bound memory with LRU eviction
//!
//! # Design Decisions
//! - The lock is never held while resolving; two racing misses on the same
//!   fingerprint may both resolve, and the first stored descriptor wins
//! - Descriptors are shared as `Arc` and never mutated after insertion
//! - Resolution errors are not cached
//! - Capacity 0 disables eviction

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;

use crate::cache::fingerprint::Fingerprint;
use crate::http::request::RawRequest;
use crate::observability::metrics;
use crate::routing::{RouteDescriptor, RouteResolver, RoutingError};

/// Point-in-time cache counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

/// Fingerprint-keyed cache in front of a [`RouteResolver`].
pub struct ResolutionCache {
    resolver: RouteResolver,
    entries: Mutex<LruCache<Fingerprint, Arc<RouteDescriptor>>>,
    capacity: usize,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl ResolutionCache {
    /// Create a cache holding at most `capacity` descriptors (0 = unbounded).
    pub fn new(resolver: RouteResolver, capacity: usize) -> Self {
        let entries = match NonZeroUsize::new(capacity) {
            Some(cap) => LruCache::new(cap),
            None => LruCache::unbounded(),
        };
        Self {
            resolver,
            entries: Mutex::new(entries),
            capacity,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Descriptor for `request`, resolving it on the first sighting of its
    /// fingerprint.
    pub fn resolve(&self, request: &Arc<RawRequest>) -> Result<Arc<RouteDescriptor>, RoutingError> {
        let fingerprint = Fingerprint::of(request);

        if let Some(hit) = self.entries.lock().get(&fingerprint) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            metrics::record_cache_hit();
            tracing::debug!(%fingerprint, path = %request.path(), "Resolution cache hit");
            return Ok(Arc::clone(hit));
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        metrics::record_cache_miss();
        tracing::debug!(%fingerprint, path = %request.path(), "Resolution cache miss");

        let resolved = Arc::new(self.resolver.resolve(request)?);

        let mut entries = self.entries.lock();
        if let Some(existing) = entries.get(&fingerprint) {
            return Ok(Arc::clone(existing));
        }
        if let Some((evicted, _)) = entries.push(fingerprint, Arc::clone(&resolved)) {
            self.evictions.fetch_add(1, Ordering::Relaxed);
            metrics::record_cache_eviction();
            tracing::trace!(fingerprint = %evicted, "Evicted resolution cache entry");
        }
        Ok(resolved)
    }

    /// A new descriptor pairing `descriptor`'s routing decision with `body`.
    /// The cache itself is never touched.
    pub fn copy_with_body(descriptor: &RouteDescriptor, body: Option<Value>) -> RouteDescriptor {
        descriptor.with_body(body)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached descriptor. Counters are kept.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            capacity: self.capacity,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}

impl std::fmt::Debug for ResolutionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolutionCache")
            .field("stats", &self.stats())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::naming::DEFAULT_HANDLER;
    use crate::routing::StaticCatalog;
    use serde_json::json;

    fn cache(capacity: usize) -> ResolutionCache {
        let catalog = StaticCatalog::new()
            .with_type(DEFAULT_HANDLER, ["getCountAction"])
            .with_type("Foo\\Controller\\BarController", ["postCreateAction"]);
        ResolutionCache::new(RouteResolver::new(Arc::new(catalog)), capacity)
    }

    #[test]
    fn test_repeat_resolution_hits() {
        let cache = cache(16);
        let first = cache.resolve(&Arc::new(RawRequest::new("GET", "/db/doc"))).unwrap();
        let second = cache.resolve(&Arc::new(RawRequest::new("GET", "/db/doc"))).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses, stats.entries), (1, 1, 1));
    }

    #[test]
    fn test_lru_eviction() {
        let cache = cache(2);
        for path in ["/a", "/b", "/c"] {
            cache.resolve(&Arc::new(RawRequest::new("GET", path))).unwrap();
        }
        let stats = cache.stats();
        assert_eq!(stats.entries, 2);
        assert_eq!(stats.evictions, 1);

        // "/a" was least recently used and must be resolved again
        cache.resolve(&Arc::new(RawRequest::new("GET", "/a"))).unwrap();
        assert_eq!(cache.stats().misses, 4);
    }

    #[test]
    fn test_zero_capacity_is_unbounded() {
        let cache = cache(0);
        for i in 0..100 {
            cache
                .resolve(&Arc::new(RawRequest::new("GET", format!("/db/{i}"))))
                .unwrap();
        }
        assert_eq!(cache.len(), 100);
        assert_eq!(cache.stats().evictions, 0);
    }

    #[test]
    fn test_errors_are_not_cached() {
        let cache = cache(16);
        let request = Arc::new(RawRequest::new("POST", "/_foo-bar/bad.name"));
        assert!(cache.resolve(&request).is_err());
        assert!(cache.resolve(&request).is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_copy_with_body_leaves_cache_untouched() {
        let cache = cache(16);
        let request = Arc::new(RawRequest::new("PUT", "/db/doc"));
        let cached = cache.resolve(&request).unwrap();

        let copy = ResolutionCache::copy_with_body(&cached, Some(json!({"title": "x"})));
        assert_eq!(copy.body(), Some(&json!({"title": "x"})));
        assert_eq!(copy.database_identifier(), cached.database_identifier());
        assert_eq!(cached.body(), None);

        let again = cache.resolve(&request).unwrap();
        assert!(Arc::ptr_eq(&cached, &again));
        assert_eq!(again.body(), None);
    }
}
