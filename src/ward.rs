use std::fmt;

use geo::MultiPolygon;
use serde::Serialize;

/// How a ward's AQI was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AqiMethod {
    /// A station sits within the direct-reading radius of the target.
    DirectReading,
    /// Inverse-square-distance weighting of the nearest stations.
    SpatialInterpolation,
    /// No usable station; the city-wide mean was substituted.
    CityAverage,
}

impl AqiMethod {
    pub fn label(self) -> &'static str {
        match self {
            AqiMethod::DirectReading => "Direct Reading",
            AqiMethod::SpatialInterpolation => "Spatial Interpolation",
            AqiMethod::CityAverage => "City Average",
        }
    }
}

impl fmt::Display for AqiMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Computed air quality for a ward. Replaced as a whole on every refresh.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WardReading {
    pub aqi: u16,
    pub pm25: f64,
    pub pm10: f64,
    pub method: AqiMethod,
}

/// An administrative ward and its latest reading.
///
/// `geometry` is `None` when the source feature could not be converted to a
/// (multi-)polygon; such a ward never contains any point.
#[derive(Debug, Clone, PartialEq)]
pub struct Ward {
    pub id: String,
    pub name: String,
    pub geometry: Option<MultiPolygon<f64>>,
    pub reading: Option<WardReading>,
}

impl Ward {
    pub fn new(id: impl Into<String>, name: impl Into<String>, geometry: Option<MultiPolygon<f64>>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            geometry,
            reading: None,
        }
    }
}
