// Cache-wrapped fetching.
// Serves typed resources from a fresh cache entry or a live producer call,
// persisting results and degrading to stale data when the producer fails.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Result;

use super::entry::{CACHE_TTL, CacheEntry};
use super::store::CacheStore;

/// Prefix scoping this subsystem's keys within the shared store.
pub const NAMESPACE: &str = "gh-";

fn namespaced(key: &str) -> String {
    format!("{NAMESPACE}{key}")
}

/// Fetch a resource through the cache.
///
/// Sweeps expired entries, then serves the cached value if it is fresh,
/// otherwise invokes `producer`. A successful fetch is persisted
/// best-effort; a failed fetch falls back to any existing entry for the
/// key regardless of age. The producer's error propagates only when no
/// entry exists at all.
pub async fn fetch_with_cache<T, F, Fut>(store: &dyn CacheStore, key: &str, producer: F) -> Result<T>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let cache_key = namespaced(key);

    if let Err(e) = cleanup_expired(store) {
        tracing::warn!(key, error = %e, "cache maintenance sweep failed");
    }

    match store.get(&cache_key) {
        Ok(Some(raw)) => match serde_json::from_str::<CacheEntry<T>>(&raw) {
            Ok(entry) if entry.is_valid(CACHE_TTL) => {
                tracing::debug!(key, age_secs = entry.age().as_secs(), "using cached data");
                return Ok(entry.data);
            }
            // An expired entry falls through to a live fetch.
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(key, error = %e, "corrupt cache entry, treating as miss");
            }
        },
        Ok(None) => {}
        Err(e) => {
            tracing::warn!(key, error = %e, "cache read failed, treating as miss");
        }
    }

    match producer().await {
        Ok(data) => {
            let entry = CacheEntry::new(data);
            match serde_json::to_string(&entry) {
                Ok(json) => {
                    if let Err(e) = store.set(&cache_key, &json) {
                        tracing::warn!(key, error = %e, "cache write failed");
                    } else {
                        tracing::debug!(key, "cached fresh data");
                    }
                }
                Err(e) => {
                    tracing::warn!(key, error = %e, "cache entry serialization failed");
                }
            }
            Ok(entry.data)
        }
        Err(err) => {
            // Stale allowed here: any entry beats surfacing the failure.
            if let Ok(Some(raw)) = store.get(&cache_key) {
                if let Ok(entry) = serde_json::from_str::<CacheEntry<T>>(&raw) {
                    tracing::warn!(key, error = %err, "fetch failed, returning stale cache");
                    return Ok(entry.data);
                }
            }
            Err(err)
        }
    }
}

/// Delete every namespaced entry older than the TTL.
///
/// Entries that fail to parse are deleted as corrupt. Returns the number
/// of entries removed; running twice in a row removes nothing the second
/// time.
pub fn cleanup_expired(store: &dyn CacheStore) -> Result<usize> {
    let mut removed = 0;

    for key in store.list_keys(NAMESPACE)? {
        let raw = match store.get(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => continue,
            Err(e) => {
                tracing::warn!(key, error = %e, "cache read failed during sweep");
                continue;
            }
        };

        let expired = match serde_json::from_str::<CacheEntry<serde_json::Value>>(&raw) {
            Ok(entry) => entry.is_expired(CACHE_TTL),
            // Corrupt entries go unconditionally.
            Err(_) => true,
        };

        if expired {
            match store.delete(&key) {
                Ok(()) => removed += 1,
                Err(e) => tracing::warn!(key, error = %e, "cache delete failed during sweep"),
            }
        }
    }

    if removed > 0 {
        tracing::debug!(removed, "cleaned up expired cache entries");
    }
    Ok(removed)
}

/// Delete every namespaced entry regardless of age.
pub fn clear_all(store: &dyn CacheStore) -> Result<usize> {
    let mut removed = 0;

    for key in store.list_keys(NAMESPACE)? {
        match store.delete(&key) {
            Ok(()) => removed += 1,
            Err(e) => tracing::warn!(key, error = %e, "cache delete failed during clear"),
        }
    }

    tracing::debug!(removed, "cache cleared");
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::store::MemoryStore;
    use crate::error::GitfolioError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn seed_entry<T: Serialize>(store: &MemoryStore, key: &str, data: T, age_millis: i64) {
        let mut entry = CacheEntry::new(data);
        entry.timestamp -= age_millis;
        store
            .set(&namespaced(key), &serde_json::to_string(&entry).unwrap())
            .unwrap();
    }

    const DAY_MILLIS: i64 = 24 * 60 * 60 * 1000;

    #[tokio::test]
    async fn test_fresh_hit_skips_producer() {
        let store = MemoryStore::new();
        let calls = AtomicUsize::new(0);

        let producer = || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok("fresh".to_string()) }
        };

        let first = fetch_with_cache(&store, "profile", producer).await.unwrap();
        assert_eq!(first, "fresh");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let second = fetch_with_cache(&store, "profile", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok("refetched".to_string()) }
        })
        .await
        .unwrap();

        // Served from cache, producer not invoked again
        assert_eq!(second, "fresh");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_expired_entry_refetches() {
        let store = MemoryStore::new();
        seed_entry(&store, "profile", "old".to_string(), DAY_MILLIS + 1000);

        let calls = AtomicUsize::new(0);
        let result = fetch_with_cache(&store, "profile", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok("new".to_string()) }
        })
        .await
        .unwrap();

        assert_eq!(result, "new");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stale_fallback_on_producer_failure() {
        let store = MemoryStore::new();

        // The entry appears after the maintenance sweep, as with a
        // concurrent caller that wrote before this producer failed.
        let result = fetch_with_cache(&store, "profile", || {
            seed_entry(&store, "profile", "stale".to_string(), DAY_MILLIS + 1000);
            async { Err::<String, _>(GitfolioError::Http { status: 503 }) }
        })
        .await
        .unwrap();

        assert_eq!(result, "stale");
    }

    #[tokio::test]
    async fn test_producer_failure_propagates_without_cache() {
        let store = MemoryStore::new();

        let err = fetch_with_cache(&store, "profile", || async {
            Err::<String, _>(GitfolioError::Http { status: 500 })
        })
        .await
        .unwrap_err();

        assert_eq!(err.status(), Some(500));
    }

    #[tokio::test]
    async fn test_successful_fetch_is_persisted() {
        let store = MemoryStore::new();

        fetch_with_cache(&store, "repos-stars", || async { Ok(vec![1u32, 2, 3]) })
            .await
            .unwrap();

        let raw = store.get("gh-repos-stars").unwrap().unwrap();
        let entry: CacheEntry<Vec<u32>> = serde_json::from_str(&raw).unwrap();
        assert_eq!(entry.data, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_a_miss() {
        let store = MemoryStore::new();
        store.set("gh-profile", "not json").unwrap();

        let calls = AtomicUsize::new(0);
        let result = fetch_with_cache(&store, "profile", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok("fresh".to_string()) }
        })
        .await
        .unwrap();

        assert_eq!(result, "fresh");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cleanup_removes_expired_and_corrupt() {
        let store = MemoryStore::new();
        seed_entry(&store, "profile", "fresh".to_string(), 1000);
        seed_entry(&store, "repos-stars", "old".to_string(), DAY_MILLIS + 1000);
        store.set("gh-commits-a", "not json").unwrap();
        store.set("unrelated", "not json").unwrap();

        let removed = cleanup_expired(&store).unwrap();
        assert_eq!(removed, 2);

        assert!(store.get("gh-profile").unwrap().is_some());
        assert!(store.get("gh-repos-stars").unwrap().is_none());
        assert!(store.get("gh-commits-a").unwrap().is_none());
        // Keys outside the namespace are untouched
        assert!(store.get("unrelated").unwrap().is_some());
    }

    #[test]
    fn test_cleanup_is_idempotent() {
        let store = MemoryStore::new();
        seed_entry(&store, "profile", "fresh".to_string(), 1000);
        seed_entry(&store, "repos-stars", "old".to_string(), DAY_MILLIS + 1000);

        assert_eq!(cleanup_expired(&store).unwrap(), 1);
        let after_first = store.list_keys("").unwrap();

        assert_eq!(cleanup_expired(&store).unwrap(), 0);
        let after_second = store.list_keys("").unwrap();

        let (mut first, mut second) = (after_first, after_second);
        first.sort();
        second.sort();
        assert_eq!(first, second);
    }

    #[test]
    fn test_clear_all_only_touches_namespace() {
        let store = MemoryStore::new();
        seed_entry(&store, "profile", "fresh".to_string(), 0);
        seed_entry(&store, "repos-stars", "fresh".to_string(), 0);
        store.set("unrelated", "kept").unwrap();

        assert_eq!(clear_all(&store).unwrap(), 2);
        assert!(store.get("gh-profile").unwrap().is_none());
        assert_eq!(store.get("unrelated").unwrap().as_deref(), Some("kept"));

        assert_eq!(clear_all(&store).unwrap(), 0);
    }
}
