//! Time-bounded cache of the last successful station fetch.
//!
//! Time is read through [`Clock`] so expiry can be driven from tests
//! without sleeping.

use chrono::{DateTime, TimeDelta, Utc};

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Cached payload with the time it was fetched and how long it stays fresh.
#[derive(Debug, Clone)]
pub struct FeedCache<T> {
    data: Option<T>,
    fetched_at: Option<DateTime<Utc>>,
    ttl: TimeDelta,
}

/// Snapshot of the cache state for status reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheInfo {
    pub has_cache: bool,
    pub age: Option<TimeDelta>,
    pub expired: bool,
}

impl<T> FeedCache<T> {
    pub fn new(ttl: TimeDelta) -> Self {
        Self {
            data: None,
            fetched_at: None,
            ttl,
        }
    }

    /// Cached data if it was fetched less than `ttl` before `now`.
    pub fn get(&self, now: DateTime<Utc>) -> Option<&T> {
        let fetched_at = self.fetched_at?;
        if now - fetched_at < self.ttl {
            self.data.as_ref()
        } else {
            None
        }
    }

    pub fn store(&mut self, data: T, now: DateTime<Utc>) {
        self.data = Some(data);
        self.fetched_at = Some(now);
    }

    pub fn clear(&mut self) {
        self.data = None;
        self.fetched_at = None;
    }

    pub fn info(&self, now: DateTime<Utc>) -> CacheInfo {
        let age = self.fetched_at.map(|at| now - at);
        CacheInfo {
            has_cache: self.data.is_some(),
            age,
            expired: age.is_none_or(|age| age >= self.ttl),
        }
    }
}
