use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::TimeDelta;
use tokio::sync::Mutex;
use tracing::debug;

use crate::cache::{CacheInfo, Clock, FeedCache};
use crate::feed::StationFeed;
use crate::station::Station;

/// Serves the last snapshot of `inner` while it is younger than the TTL.
///
/// Failed fetches are not cached.
pub struct CachedFeed<F> {
    inner: F,
    cache: Mutex<FeedCache<Vec<Station>>>,
    clock: Arc<dyn Clock>,
}

impl<F: StationFeed> CachedFeed<F> {
    pub fn new(inner: F, ttl: TimeDelta, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner,
            cache: Mutex::new(FeedCache::new(ttl)),
            clock,
        }
    }

    /// Drops the cached snapshot so the next fetch goes to `inner`.
    pub async fn clear(&self) {
        self.cache.lock().await.clear();
    }

    pub async fn info(&self) -> CacheInfo {
        self.cache.lock().await.info(self.clock.now())
    }
}

#[async_trait]
impl<F: StationFeed> StationFeed for CachedFeed<F> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn fetch(&self) -> Result<Vec<Station>> {
        let mut cache = self.cache.lock().await;
        if let Some(stations) = cache.get(self.clock.now()) {
            debug!(source = self.inner.name(), "Returning cached station data");
            return Ok(stations.clone());
        }

        let stations = self.inner.fetch().await?;
        cache.store(stations.clone(), self.clock.now());
        Ok(stations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use chrono::{DateTime, TimeZone, Utc};
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct ManualClock(StdMutex<DateTime<Utc>>);

    impl ManualClock {
        fn advance(&self, by: TimeDelta) {
            let mut now = self.0.lock().unwrap();
            *now += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }

    struct Counting {
        calls: AtomicUsize,
        fail: AtomicBool,
    }

    #[async_trait]
    impl StationFeed for Counting {
        fn name(&self) -> &str {
            "counting"
        }

        async fn fetch(&self) -> Result<Vec<Station>> {
            if self.fail.load(Ordering::SeqCst) {
                bail!("offline");
            }
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(vec![Station::with_aqi(28.6, 77.2, n as u16)])
        }
    }

    fn setup() -> (Arc<ManualClock>, CachedFeed<Counting>) {
        let clock = Arc::new(ManualClock(StdMutex::new(
            Utc.with_ymd_and_hms(2024, 11, 3, 9, 0, 0).unwrap(),
        )));
        let feed = CachedFeed::new(
            Counting {
                calls: AtomicUsize::new(0),
                fail: AtomicBool::new(false),
            },
            TimeDelta::minutes(5),
            clock.clone(),
        );
        (clock, feed)
    }

    #[tokio::test]
    async fn test_fresh_cache_skips_inner() {
        let (clock, feed) = setup();

        assert_eq!(feed.fetch().await.unwrap()[0].aqi, Some(1));
        clock.advance(TimeDelta::minutes(2));
        assert_eq!(feed.fetch().await.unwrap()[0].aqi, Some(1));
        assert_eq!(feed.inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stale_cache_refetches() {
        let (clock, feed) = setup();

        feed.fetch().await.unwrap();
        clock.advance(TimeDelta::minutes(6));
        assert!(feed.info().await.expired);

        assert_eq!(feed.fetch().await.unwrap()[0].aqi, Some(2));
        assert!(!feed.info().await.expired);
    }

    #[tokio::test]
    async fn test_clear_forces_refetch() {
        let (_clock, feed) = setup();

        feed.fetch().await.unwrap();
        feed.clear().await;
        assert!(!feed.info().await.has_cache);
        assert_eq!(feed.fetch().await.unwrap()[0].aqi, Some(2));
    }

    #[tokio::test]
    async fn test_failure_is_not_cached() {
        let (clock, feed) = setup();

        feed.inner.fail.store(true, Ordering::SeqCst);
        assert!(feed.fetch().await.is_err());
        assert!(!feed.info().await.has_cache);

        feed.inner.fail.store(false, Ordering::SeqCst);
        clock.advance(TimeDelta::seconds(1));
        assert_eq!(feed.fetch().await.unwrap()[0].aqi, Some(1));
    }
}
