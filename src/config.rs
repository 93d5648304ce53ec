//! Runtime configuration.
//!
//! Values come from the environment (a `.env` file is loaded by the binary
//! before this runs) and can be overridden by command-line flags.
//!
//! | Variable              | Default                         |
//! |-----------------------|---------------------------------|
//! | `AQI_ENDPOINTS`       | `http://localhost:3000/api/aqi` |
//! | `AQI_WARD_SOURCES`    | `delhi_wards.geojson`           |
//! | `AQI_REFRESH_SECS`    | `300`                           |
//! | `AQI_CACHE_TTL_SECS`  | `300`                           |
//! | `AQI_USE_MOCK`        | `true`                          |
//! | `AQI_AUTH_URL`        | `http://localhost:3000`         |
//! | `AQI_GEOCODER_URL`    | Nominatim `/search`             |

use std::time::Duration;

use anyhow::{Context, Result};

use crate::geocode::DEFAULT_GEOCODER_URL;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:3000/api/aqi";
pub const DEFAULT_WARD_SOURCE: &str = "delhi_wards.geojson";
pub const DEFAULT_AUTH_URL: &str = "http://localhost:3000";
pub const DEFAULT_REFRESH_SECS: u64 = 5 * 60;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 5 * 60;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Station endpoints, tried in order.
    pub endpoints: Vec<String>,
    /// Ward GeoJSON files or URLs, tried in order.
    pub ward_sources: Vec<String>,
    pub refresh_interval: Duration,
    pub cache_ttl: Duration,
    /// Append the hardcoded station set after the live endpoints.
    pub use_mock: bool,
    pub auth_url: String,
    /// Place-name search used when no ward name matches.
    pub geocoder_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoints: vec![DEFAULT_ENDPOINT.to_string()],
            ward_sources: vec![DEFAULT_WARD_SOURCE.to_string()],
            refresh_interval: Duration::from_secs(DEFAULT_REFRESH_SECS),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            use_mock: true,
            auth_url: DEFAULT_AUTH_URL.to_string(),
            geocoder_url: DEFAULT_GEOCODER_URL.to_string(),
        }
    }
}

impl Config {
    /// Reads the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric or boolean variable does not parse.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup; unset keys keep their
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric or boolean variable does not parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(v) = lookup("AQI_ENDPOINTS") {
            config.endpoints = split_list(&v);
        }
        if let Some(v) = lookup("AQI_WARD_SOURCES") {
            config.ward_sources = split_list(&v);
        }
        if let Some(v) = lookup("AQI_REFRESH_SECS") {
            config.refresh_interval = parse_secs("AQI_REFRESH_SECS", &v)?;
        }
        if let Some(v) = lookup("AQI_CACHE_TTL_SECS") {
            config.cache_ttl = parse_secs("AQI_CACHE_TTL_SECS", &v)?;
        }
        if let Some(v) = lookup("AQI_USE_MOCK") {
            config.use_mock = parse_flag(&v).with_context(|| format!("AQI_USE_MOCK='{v}'"))?;
        }
        if let Some(v) = lookup("AQI_AUTH_URL") {
            config.auth_url = v.trim().trim_end_matches('/').to_string();
        }
        if let Some(v) = lookup("AQI_GEOCODER_URL") {
            config.geocoder_url = v.trim().to_string();
        }

        Ok(config)
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_secs(key: &str, value: &str) -> Result<Duration> {
    let secs: u64 = value
        .trim()
        .parse()
        .with_context(|| format!("{key} must be a whole number of seconds, got '{value}'"))?;
    Ok(Duration::from_secs(secs))
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("expected a boolean, got '{other}'"),
    }
}
