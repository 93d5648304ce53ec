use anyhow::{Result, bail};
use async_trait::async_trait;
use tracing::{info, warn};

use crate::feed::StationFeed;
use crate::station::Station;

/// Ordered list of equivalent sources, tried one at a time until one
/// answers.
pub struct FallbackFeed {
    sources: Vec<Box<dyn StationFeed>>,
}

impl FallbackFeed {
    pub fn new(sources: Vec<Box<dyn StationFeed>>) -> Self {
        Self { sources }
    }

    pub fn push(&mut self, source: Box<dyn StationFeed>) {
        self.sources.push(source);
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

#[async_trait]
impl StationFeed for FallbackFeed {
    fn name(&self) -> &str {
        "fallback"
    }

    async fn fetch(&self) -> Result<Vec<Station>> {
        for source in &self.sources {
            match source.fetch().await {
                Ok(stations) => {
                    info!(source = source.name(), stations = stations.len(), "Station source answered");
                    return Ok(stations);
                }
                Err(e) => {
                    warn!(source = source.name(), error = %e, "Station source failed, trying next");
                }
            }
        }
        bail!("all {} station sources failed", self.sources.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Scripted {
        name: String,
        result: Option<Vec<Station>>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl StationFeed for Scripted {
        fn name(&self) -> &str {
            &self.name
        }

        async fn fetch(&self) -> Result<Vec<Station>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.result {
                Some(stations) => Ok(stations.clone()),
                None => bail!("{} unreachable", self.name),
            }
        }
    }

    fn scripted(name: &str, result: Option<Vec<Station>>, calls: &Arc<AtomicUsize>) -> Box<dyn StationFeed> {
        Box::new(Scripted {
            name: name.to_string(),
            result,
            calls: calls.clone(),
        })
    }

    #[tokio::test]
    async fn test_first_success_wins() {
        let calls = Arc::new(AtomicUsize::new(0));
        let feed = FallbackFeed::new(vec![
            scripted("local", None, &calls),
            scripted("remote", Some(vec![Station::with_aqi(28.6, 77.2, 210)]), &calls),
            scripted("mock", Some(vec![]), &calls),
        ]);

        let stations = feed.fetch().await.unwrap();

        assert_eq!(stations.len(), 1);
        assert_eq!(stations[0].aqi, Some(210));
        // The third source is never consulted.
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_all_failing_is_error() {
        let calls = Arc::new(AtomicUsize::new(0));
        let feed = FallbackFeed::new(vec![scripted("a", None, &calls), scripted("b", None, &calls)]);

        let err = feed.fetch().await.unwrap_err();
        assert!(err.to_string().contains("all 2 station sources failed"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_pushed_source_is_tried_last() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut feed = FallbackFeed::new(Vec::new());
        assert!(feed.is_empty());

        feed.push(scripted("endpoint", None, &calls));
        feed.push(scripted("mock", Some(vec![Station::with_aqi(28.6, 77.2, 150)]), &calls));

        assert_eq!(feed.len(), 2);
        assert_eq!(feed.fetch().await.unwrap()[0].aqi, Some(150));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_empty_list_is_error() {
        assert!(FallbackFeed::new(Vec::new()).fetch().await.is_err());
    }
}
