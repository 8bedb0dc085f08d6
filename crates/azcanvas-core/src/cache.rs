//! Client-local key-value cache using moka
//!
//! String-keyed values with a bounded size and optional TTL. Generated
//! documents are held as whole assemblies, so a hit carries the same code,
//! warnings and module flag as the assembly that filled it.

use azcanvas_codegen::Assembly;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

/// Key prefix for generated documents
pub const CODEGEN_PREFIX: &str = "codegen:";

/// Bounded cache with time-based expiration
#[derive(Debug, Clone)]
pub struct LocalCache<V = Arc<str>>
where
    V: Clone + Send + Sync + 'static,
{
    inner: Cache<String, V>,
}

/// Cache of assembled documents
pub type DocumentCache = LocalCache<Arc<Assembly>>;

impl<V> LocalCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Cache with capacity only
    #[inline]
    #[must_use]
    pub fn new(max_capacity: u64) -> Self {
        Self {
            inner: Cache::new(max_capacity),
        }
    }

    /// Cache whose entries expire `ttl` after insertion
    #[inline]
    #[must_use]
    pub fn with_ttl(max_capacity: u64, ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Store a value
    #[inline]
    pub async fn insert(&self, key: impl Into<String>, value: impl Into<V>) {
        self.inner.insert(key.into(), value.into()).await;
    }

    /// Fetch a value
    #[inline]
    pub async fn get(&self, key: &str) -> Option<V> {
        self.inner.get(key).await
    }

    /// Drop one entry
    #[inline]
    pub async fn invalidate(&self, key: &str) {
        self.inner.invalidate(key).await;
    }

    /// Drop every entry
    #[inline]
    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }

    /// Entry count after pending maintenance has run
    pub async fn entry_count(&self) -> u64 {
        self.inner.run_pending_tasks().await;
        self.inner.entry_count()
    }
}

impl<V> Default for LocalCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(256)
    }
}
