use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

use crate::feed::StationFeed;
use crate::fetch::{HttpClient, fetch_bytes};
use crate::parser::parse_station_payload;
use crate::station::Station;

/// Station readings served as JSON from one HTTP endpoint.
pub struct HttpStationFeed<C> {
    client: C,
    url: String,
}

impl<C: HttpClient> HttpStationFeed<C> {
    pub fn new(client: C, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl<C: HttpClient> StationFeed for HttpStationFeed<C> {
    fn name(&self) -> &str {
        &self.url
    }

    #[tracing::instrument(skip(self), fields(url = %self.url))]
    async fn fetch(&self) -> Result<Vec<Station>> {
        let bytes = fetch_bytes(&self.client, &self.url)
            .await
            .with_context(|| format!("station request to {} failed", self.url))?;
        debug!(bytes = bytes.len(), "Station payload received");

        parse_station_payload(&bytes)
            .with_context(|| format!("station payload from {} is not valid JSON", self.url))
    }
}
