//! Station data sources.
//!
//! Every source implements [`StationFeed`], so a live endpoint, the mock
//! dataset, an ordered fallback list and a cached wrapper are
//! interchangeable wherever a feed is expected.

mod cached;
mod fallback;
mod http;
mod mock;

pub use cached::CachedFeed;
pub use fallback::FallbackFeed;
pub use http::HttpStationFeed;
pub use mock::MockDataSource;

use anyhow::Result;
use async_trait::async_trait;

use crate::station::Station;

/// A source of station readings. Each call returns a complete snapshot.
#[async_trait]
pub trait StationFeed: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &str;

    async fn fetch(&self) -> Result<Vec<Station>>;
}

#[async_trait]
impl<F: StationFeed + ?Sized> StationFeed for Box<F> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn fetch(&self) -> Result<Vec<Station>> {
        (**self).fetch().await
    }
}
