//! Single-writer cache for short-lived values fetched from elsewhere, such as
//! an administrative access token.

use std::future::Future;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

/// Refresh once less than this much lifetime is left.
pub const TOKEN_REFRESH_SKEW: Duration = Duration::from_secs(120);

/// Longest lifetime an entry is kept for, whatever ttl the refresh reports.
pub const MAX_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

#[derive(Debug, Clone)]
struct Entry<T> {
    value: T,
    expires_at: Instant,
}

/// Holds one value and its expiry. Concurrent callers that find it stale
/// queue on the lock, so only one refresh runs at a time and the rest reuse
/// its result.
#[derive(Debug)]
pub struct ExpiringCache<T> {
    slot: Mutex<Option<Entry<T>>>,
    skew: Duration,
}

impl<T: Clone> Default for ExpiringCache<T> {
    fn default() -> Self {
        Self::new(TOKEN_REFRESH_SKEW)
    }
}

impl<T: Clone> ExpiringCache<T> {
    pub fn new(skew: Duration) -> Self {
        Self {
            slot: Mutex::new(None),
            skew,
        }
    }

    /// Cached value if it is still fresh.
    pub async fn peek(&self) -> Option<T> {
        let slot = self.slot.lock().await;
        slot.as_ref()
            .filter(|e| self.is_fresh(e))
            .map(|e| e.value.clone())
    }

    /// Return the cached value, or run `refresh` to replace it.
    ///
    /// `refresh` yields the value and its time to live. On error the old
    /// entry is left alone and the error is returned.
    pub async fn get_or_refresh<F, Fut, E>(&self, refresh: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(T, Duration), E>>,
    {
        let mut slot = self.slot.lock().await;
        if let Some(entry) = slot.as_ref().filter(|e| self.is_fresh(e)) {
            return Ok(entry.value.clone());
        }

        tracing::debug!("Cached value missing or about to expire, refreshing");
        let (value, ttl) = refresh().await?;
        let now = Instant::now();
        let expires_at = now
            .checked_add(ttl.min(MAX_TTL))
            .unwrap_or(now);
        *slot = Some(Entry {
            value: value.clone(),
            expires_at,
        });
        Ok(value)
    }

    /// Drop the cached value so the next call refreshes.
    pub async fn invalidate(&self) {
        *self.slot.lock().await = None;
    }

    fn is_fresh(&self, entry: &Entry<T>) -> bool {
        entry
            .expires_at
            .checked_duration_since(Instant::now())
            .is_some_and(|left| left > self.skew)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_reuses_fresh_value() {
        let cache = ExpiringCache::new(Duration::from_secs(1));
        let counter = AtomicUsize::new(0);
        let calls = &counter;
        for _ in 0..3 {
            let v = cache
                .get_or_refresh(|| async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, ()>(("tok".to_string(), Duration::from_secs(3600)))
                })
                .await
                .unwrap();
            assert_eq!(v, "tok");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.peek().await.as_deref(), Some("tok"));
    }

    #[tokio::test]
    async fn test_refreshes_inside_skew() {
        // ttl shorter than the skew is stale immediately
        let cache = ExpiringCache::new(Duration::from_secs(120));
        let counter = AtomicUsize::new(0);
        let calls = &counter;
        for _ in 0..2 {
            cache
                .get_or_refresh(|| async move {
                    let n = calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, ()>((n, Duration::from_secs(60)))
                })
                .await
                .unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.peek().await, None);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_nothing_new() {
        let cache: ExpiringCache<String> = ExpiringCache::default();
        let err = cache
            .get_or_refresh(|| async { Err::<(String, Duration), _>("upstream down") })
            .await
            .unwrap_err();
        assert_eq!(err, "upstream down");
        assert_eq!(cache.peek().await, None);
    }

    #[tokio::test]
    async fn test_huge_ttl_is_capped() {
        let cache = ExpiringCache::new(Duration::from_secs(120));
        let v = cache
            .get_or_refresh(|| async { Ok::<_, ()>(("tok", Duration::MAX)) })
            .await
            .unwrap();
        assert_eq!(v, "tok");
        assert_eq!(cache.peek().await, Some("tok"));
    }

    #[tokio::test]
    async fn test_invalidate() {
        let cache = ExpiringCache::new(Duration::ZERO);
        cache
            .get_or_refresh(|| async { Ok::<_, ()>((1u32, Duration::from_secs(60))) })
            .await
            .unwrap();
        cache.invalidate().await;
        assert_eq!(cache.peek().await, None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_callers_single_refresh() {
        let cache = Arc::new(ExpiringCache::new(Duration::ZERO));
        let calls = Arc::new(AtomicUsize::new(0));
        let mut handles = Vec::new();
        for _ in 0..16 {
            let cache = cache.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_refresh(|| async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        Ok::<_, ()>(("shared".to_string(), Duration::from_secs(60)))
                    })
                    .await
                    .unwrap()
            }));
        }
        for h in handles {
            assert_eq!(h.await.unwrap(), "shared");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
