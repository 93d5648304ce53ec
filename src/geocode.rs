//! Place-name lookup for ward search.
//!
//! Queries a Nominatim-compatible `/search` endpoint and takes the first
//! hit. Searches are scoped to Delhi by suffixing the query.

use anyhow::{Context, Result};
use reqwest::Url;
use serde_json::Value;
use tracing::debug;

use crate::fetch::{HttpClient, fetch_bytes};
use crate::parser::number;

pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org/search";

const CITY_SUFFIX: &str = ", Delhi";

/// Search URL for `query` against `base_url`.
///
/// # Errors
///
/// Returns an error if `base_url` is not a valid URL.
pub fn search_url(base_url: &str, query: &str) -> Result<Url> {
    let q = format!("{}{CITY_SUFFIX}", query.trim());
    Url::parse_with_params(base_url, &[("format", "json"), ("limit", "1"), ("q", q.as_str())])
        .with_context(|| format!("invalid geocoder URL '{base_url}'"))
}

/// `(lat, lon)` of the first result, or `None` when nothing matched.
///
/// # Errors
///
/// Returns an error if the bytes are not valid JSON.
pub fn parse_geocode_response(bytes: &[u8]) -> Result<Option<(f64, f64)>> {
    let payload: Value = serde_json::from_slice(bytes)?;
    let hit = payload
        .as_array()
        .and_then(|places| places.first())
        .and_then(|place| Some((number(&place["lat"])?, number(&place["lon"])?)));
    Ok(hit)
}

/// Resolves a free-text place name in Delhi to coordinates.
#[tracing::instrument(skip(client))]
pub async fn geocode<C: HttpClient + ?Sized>(
    client: &C,
    base_url: &str,
    query: &str,
) -> Result<Option<(f64, f64)>> {
    let url = search_url(base_url, query)?;
    let bytes = fetch_bytes(client, url.as_str())
        .await
        .context("geocoder request failed")?;
    let hit = parse_geocode_response(&bytes)?;
    debug!(?hit, "Geocoder answered");
    Ok(hit)
}
