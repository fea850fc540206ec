//! Shared cache of a bounded key sample
//!
//! Listing every key of a large database on each screen refresh would hammer
//! the server, so the "all keys" view is served from a sample of at most
//! [`SAMPLE_PAGES`] SCAN pages that is reused for [`CACHE_TTL`].
//!
//! The entry sits behind one reader/writer lock. Cache hits share the read
//! lock; a refresh holds the write lock for the whole bounded scan, so only
//! one refresh runs at a time and readers never see a half-written entry.
//! Two callers that miss at the same moment may both scan.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

use crate::client::Client;
use crate::error::Result;
use crate::scan::{ScanLimit, scan_keys};

/// How long a sample stays fresh
pub const CACHE_TTL: Duration = Duration::from_secs(60);

/// Pages scanned for the "all keys" sample
pub const SAMPLE_PAGES: usize = 10;

#[derive(Debug, Default)]
struct CacheEntry {
    keys: Arc<[String]>,
    refreshed_at: Option<Instant>,
}

impl CacheEntry {
    fn fresh(&self, ttl: Duration) -> Option<Arc<[String]>> {
        let refreshed_at = self.refreshed_at?;
        (refreshed_at.elapsed() < ttl).then(|| Arc::clone(&self.keys))
    }
}

/// Key listing cache owned by a session
#[derive(Debug)]
pub struct KeyCache {
    entry: RwLock<CacheEntry>,
    ttl: Duration,
    sample: ScanLimit,
}

impl Default for KeyCache {
    fn default() -> Self {
        Self::new(CACHE_TTL, SAMPLE_PAGES)
    }
}

impl KeyCache {
    pub fn new(ttl: Duration, sample_pages: usize) -> Self {
        Self {
            entry: RwLock::new(CacheEntry::default()),
            ttl,
            sample: ScanLimit::pages(sample_pages),
        }
    }

    /// Keys matching `pattern`, always from a fresh unbounded scan
    pub async fn keys_matching(&self, client: &Client, pattern: &str) -> Result<Vec<String>> {
        scan_keys(client, pattern, ScanLimit::Unbounded).await
    }

    /// A sample of all keys.
    ///
    /// With `use_cache`, a sample refreshed within the TTL is returned as-is.
    /// Otherwise a bounded scan replaces the cached sample. A failed scan
    /// leaves the previous sample in place.
    pub async fn all_keys(&self, client: &Client, use_cache: bool) -> Result<Arc<[String]>> {
        if use_cache {
            if let Some(keys) = self.entry.read().await.fresh(self.ttl) {
                debug!("Serving {} cached key(s)", keys.len());
                return Ok(keys);
            }
        }

        let mut entry = self.entry.write().await;
        let keys: Arc<[String]> = scan_keys(client, "*", self.sample).await?.into();
        entry.keys = Arc::clone(&keys);
        entry.refreshed_at = Some(Instant::now());
        debug!("Refreshed key sample: {} key(s)", keys.len());

        Ok(keys)
    }

    /// Drop the cached sample so the next call rescans
    pub async fn invalidate(&self) {
        let mut entry = self.entry.write().await;
        entry.refreshed_at = None;
    }

    /// When the sample was last refreshed
    pub async fn last_refresh(&self) -> Option<Instant> {
        self.entry.read().await.refreshed_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientKind;
    use crate::error::CoreError;
    use crate::testing::ScriptedBackend;
    use redis::ErrorKind;

    fn setup() -> (Arc<ScriptedBackend>, Client, KeyCache) {
        let backend = Arc::new(ScriptedBackend::new());
        let client = Client::new(ClientKind::Standalone, backend.clone());
        (backend, client, KeyCache::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_hit_within_ttl() {
        let (backend, client, cache) = setup();
        backend.push_scan_page(0, &["a", "b"]);

        let first = cache.all_keys(&client, true).await.unwrap();
        tokio::time::advance(Duration::from_secs(30)).await;
        let second = cache.all_keys(&client, true).await.unwrap();

        assert_eq!(&*first, &["a".to_string(), "b".to_string()]);
        assert_eq!(first, second);
        assert_eq!(backend.count("SCAN"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_cache_refreshes() {
        let (backend, client, cache) = setup();
        backend.push_scan_page(0, &["old"]);
        backend.push_scan_page(0, &["new"]);

        cache.all_keys(&client, true).await.unwrap();
        tokio::time::advance(Duration::from_secs(61)).await;
        let keys = cache.all_keys(&client, true).await.unwrap();

        assert_eq!(&*keys, &["new".to_string()]);
        assert_eq!(backend.count("SCAN"), 2);
    }

    #[tokio::test]
    async fn test_without_cache_always_scans() {
        let (backend, client, cache) = setup();
        backend.push_scan_page(0, &["a"]);
        backend.push_scan_page(0, &["b"]);

        cache.all_keys(&client, false).await.unwrap();
        let keys = cache.all_keys(&client, false).await.unwrap();
        assert_eq!(&*keys, &["b".to_string()]);
        assert_eq!(backend.count("SCAN"), 2);
    }

    #[tokio::test]
    async fn test_sample_is_bounded_to_ten_pages() {
        let (backend, client, cache) = setup();
        for page in 1..=12u64 {
            backend.push_scan_page(page, &["k"]);
        }

        let keys = cache.all_keys(&client, true).await.unwrap();
        assert_eq!(keys.len(), 10);
        assert_eq!(backend.count("SCAN"), 10);
    }

    #[tokio::test]
    async fn test_exact_pattern_bypasses_cache() {
        let (backend, client, cache) = setup();
        backend.push_scan_page(0, &["user:1"]);
        backend.push_scan_page(0, &["user:1", "user:2"]);

        cache.keys_matching(&client, "user:*").await.unwrap();
        let keys = cache.keys_matching(&client, "user:*").await.unwrap();

        assert_eq!(keys, vec!["user:1", "user:2"]);
        assert!(cache.last_refresh().await.is_none());
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_sample() {
        let (backend, client, cache) = setup();
        backend.push_scan_page(0, &["kept"]);
        backend.push_err("SCAN", ErrorKind::IoError, "timed out");

        cache.all_keys(&client, true).await.unwrap();
        let refreshed = cache.last_refresh().await;

        let err = cache.all_keys(&client, false).await.unwrap_err();
        assert!(matches!(err, CoreError::Scan(_)));
        assert_eq!(cache.last_refresh().await, refreshed);

        let keys = cache.all_keys(&client, true).await.unwrap();
        assert_eq!(&*keys, &["kept".to_string()]);
    }

    #[tokio::test]
    async fn test_invalidate_forces_rescan() {
        let (backend, client, cache) = setup();
        backend.push_scan_page(0, &["a"]);
        backend.push_scan_page(0, &["b"]);

        cache.all_keys(&client, true).await.unwrap();
        cache.invalidate().await;
        let keys = cache.all_keys(&client, true).await.unwrap();
        assert_eq!(&*keys, &["b".to_string()]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_readers_share_one_sample() {
        let (backend, client, cache) = setup();
        backend.push_scan_page(0, &["a", "b", "c"]);
        let cache = Arc::new(cache);

        cache.all_keys(&client, true).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..16 {
            let cache = Arc::clone(&cache);
            let client = client.clone();
            handles.push(tokio::spawn(async move {
                cache.all_keys(&client, true).await.unwrap().len()
            }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap(), 3);
        }
        assert_eq!(backend.count("SCAN"), 1);
    }
}
