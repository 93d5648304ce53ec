//! Ward state across refresh cycles.
//!
//! [`WardBoard`] owns the ward polygons and the current station snapshot.
//! A refresh replaces the snapshot wholesale and recomputes every ward; a
//! failed fetch leaves the previous readings in place.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info};

use crate::aqi::{aqi_color, estimate_pm10, estimate_pm25};
use crate::feed::StationFeed;
use crate::interpolate::{Estimate, estimate_aqi};
use crate::output::{WardRow, ward_rows};
use crate::spatial::{find_ward_containing, representative_point, stations_within_wards};
use crate::station::Station;
use crate::summary::CitySummary;
use crate::ward::{AqiMethod, Ward, WardReading};

/// Outcome of the most recent refresh.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LiveStatus {
    /// No refresh has run yet.
    Idle,
    Live { average_aqi: u16, stations: usize },
    FetchFailed { error: String },
}

impl fmt::Display for LiveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiveStatus::Idle => f.write_str("Waiting for first refresh"),
            LiveStatus::Live { average_aqi, .. } => write!(f, "Live: Delhi Avg AQI {average_aqi}"),
            LiveStatus::FetchFailed { .. } => f.write_str("Live fetch failed."),
        }
    }
}

/// Result of resolving a map click or search hit.
#[derive(Debug, Clone, PartialEq)]
pub enum Location<'a> {
    /// The point falls inside this ward.
    Ward(&'a Ward),
    /// Outside every ward; estimated directly from the stations.
    Outside {
        lat: f64,
        lon: f64,
        estimate: Option<Estimate>,
    },
}

/// A station as drawn on the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationMarker {
    pub id: String,
    pub lat: f64,
    pub lon: f64,
    pub aqi: u16,
    pub color: &'static str,
}

pub struct WardBoard {
    wards: Vec<Ward>,
    stations: Vec<Station>,
    summary: CitySummary,
    status: LiveStatus,
}

impl WardBoard {
    pub fn new(wards: Vec<Ward>) -> Self {
        Self {
            wards,
            stations: Vec::new(),
            summary: CitySummary::default(),
            status: LiveStatus::Idle,
        }
    }

    pub fn wards(&self) -> &[Ward] {
        &self.wards
    }

    /// Stations from the last successful refresh that lie inside the city.
    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn summary(&self) -> &CitySummary {
        &self.summary
    }

    pub fn status(&self) -> &LiveStatus {
        &self.status
    }

    /// Runs one refresh cycle against `feed`.
    #[tracing::instrument(skip_all, fields(source = feed.name()))]
    pub async fn refresh<F: StationFeed + ?Sized>(&mut self, feed: &F) -> &LiveStatus {
        match feed.fetch().await {
            Ok(stations) => self.apply_snapshot(stations),
            Err(e) => {
                error!(error = %e, "Live fetch failed, keeping last ward readings");
                self.status = LiveStatus::FetchFailed {
                    error: format!("{e:#}"),
                };
            }
        }
        &self.status
    }

    /// Replaces the station snapshot and recomputes every ward.
    pub fn apply_snapshot(&mut self, stations: Vec<Station>) {
        let received = stations.len();
        let stations = stations_within_wards(stations, &self.wards);
        let summary = CitySummary::from_stations(&stations);

        for ward in &mut self.wards {
            let reading = reading_for(ward, &stations, &summary);
            ward.reading = Some(reading);
        }

        let city_average_wards = self
            .wards
            .iter()
            .filter(|w| matches!(&w.reading, Some(r) if r.method == AqiMethod::CityAverage))
            .count();
        info!(
            received,
            inside_city = stations.len(),
            average_aqi = summary.aqi,
            aqi_samples = summary.aqi_samples,
            wards = self.wards.len(),
            city_average_wards,
            "Ward readings recomputed"
        );

        self.status = LiveStatus::Live {
            average_aqi: summary.aqi,
            stations: stations.len(),
        };
        self.summary = summary;
        self.stations = stations;
    }

    /// Resolves a point to its ward, or estimates it when outside every ward.
    pub fn locate(&self, lat: f64, lon: f64) -> Location<'_> {
        match find_ward_containing(lat, lon, &self.wards) {
            Some(ward) => Location::Ward(ward),
            None => Location::Outside {
                lat,
                lon,
                estimate: estimate_aqi(lat, lon, &self.stations),
            },
        }
    }

    /// Current ward readings as renderer rows.
    pub fn snapshot_rows(&self, timestamp: DateTime<Utc>) -> Vec<WardRow> {
        ward_rows(&self.wards, timestamp)
    }

    /// Map markers for every station with a resolvable AQI.
    pub fn station_markers(&self) -> Vec<StationMarker> {
        self.stations
            .iter()
            .filter_map(|s| {
                let aqi = s.resolved_aqi()?;
                Some(StationMarker {
                    id: s.id.clone(),
                    lat: s.lat,
                    lon: s.lon,
                    aqi,
                    color: aqi_color(Some(aqi)),
                })
            })
            .collect()
    }
}

fn reading_for(ward: &Ward, stations: &[Station], summary: &CitySummary) -> WardReading {
    let estimate =
        representative_point(ward).and_then(|(lat, lon)| estimate_aqi(lat, lon, stations));

    match estimate {
        Some(Estimate { aqi, method }) => WardReading {
            aqi,
            pm25: estimate_pm25(aqi),
            pm10: estimate_pm10(aqi),
            method,
        },
        None => WardReading {
            aqi: summary.aqi,
            pm25: summary.pm25,
            pm10: summary.pm10,
            method: AqiMethod::CityAverage,
        },
    }
}
