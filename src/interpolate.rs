//! Inverse-distance-weighted AQI estimation at an arbitrary point.

use geo::{Distance, Haversine, Point};
use serde::Serialize;

use crate::aqi::clamp_aqi;
use crate::station::Station;
use crate::ward::AqiMethod;

/// Below this distance the nearest station's reading is used as-is.
pub const DIRECT_READING_RADIUS_KM: f64 = 0.5;

/// Number of nearest stations blended by the weighting.
pub const NEAREST_STATIONS: usize = 3;

/// An AQI value estimated for a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Estimate {
    pub aqi: u16,
    pub method: AqiMethod,
}

/// Great-circle distance in kilometers.
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    Haversine.distance(Point::new(lon1, lat1), Point::new(lon2, lat2)) / 1000.0
}

/// Estimates the AQI at `(lat, lon)` from the station snapshot.
///
/// Stations without a resolvable AQI are ignored. Returns `None` when no
/// station is usable; callers substitute the city average.
pub fn estimate_aqi(lat: f64, lon: f64, stations: &[Station]) -> Option<Estimate> {
    let mut samples: Vec<(f64, u16)> = stations
        .iter()
        .filter_map(|s| {
            let aqi = s.resolved_aqi()?;
            let distance = distance_km(lat, lon, s.lat, s.lon);
            distance.is_finite().then_some((distance, aqi))
        })
        .collect();

    // Stable: equidistant stations keep snapshot order.
    samples.sort_by(|a, b| a.0.total_cmp(&b.0));

    let &(nearest_distance, nearest_aqi) = samples.first()?;
    if nearest_distance < DIRECT_READING_RADIUS_KM {
        return Some(Estimate {
            aqi: nearest_aqi,
            method: AqiMethod::DirectReading,
        });
    }

    let (weighted_sum, weight_sum) = samples
        .iter()
        .take(NEAREST_STATIONS)
        .fold((0.0, 0.0), |(weighted, total), &(distance, aqi)| {
            let weight = 1.0 / distance.powi(2);
            (weighted + weight * f64::from(aqi), total + weight)
        });

    clamp_aqi(weighted_sum / weight_sum).map(|aqi| Estimate {
        aqi,
        method: AqiMethod::SpatialInterpolation,
    })
}
