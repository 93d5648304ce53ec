use serde::Serialize;

use crate::aqi::clamp_aqi;
use crate::station::Station;

/// Computes the arithmetic mean of a slice of values. Returns 0.0 for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// City-wide means over the current station snapshot.
///
/// Each field averages only the stations that report it and is rounded.
/// Fields with no samples are zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CitySummary {
    pub aqi: u16,
    pub pm25: f64,
    pub pm10: f64,
    pub aqi_samples: usize,
}

impl CitySummary {
    pub fn from_stations(stations: &[Station]) -> Self {
        let aqi_values: Vec<f64> = stations
            .iter()
            .filter_map(Station::resolved_aqi)
            .map(f64::from)
            .collect();
        let pm25_values: Vec<f64> = stations.iter().filter_map(|s| s.pm25).collect();
        let pm10_values: Vec<f64> = stations.iter().filter_map(|s| s.pm10).collect();

        CitySummary {
            aqi: clamp_aqi(mean(&aqi_values)).unwrap_or(0),
            pm25: mean(&pm25_values).round(),
            pm10: mean(&pm10_values).round(),
            aqi_samples: aqi_values.len(),
        }
    }
}
