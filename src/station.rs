use serde::Serialize;

use crate::aqi::{Pollutant, pm25_to_aqi};

/// A monitoring station reading from the current feed snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Station {
    pub id: String,
    pub lat: f64,
    pub lon: f64,
    pub aqi: Option<u16>,
    pub pm25: Option<f64>,
    pub pm10: Option<f64>,
}

impl Station {
    /// Station carrying only an AQI value, id derived from its position.
    pub fn with_aqi(lat: f64, lon: f64, aqi: u16) -> Self {
        Self {
            id: format!("{lat},{lon}"),
            lat,
            lon,
            aqi: Some(aqi),
            pm25: None,
            pm10: None,
        }
    }

    /// The reported AQI, else the PM2.5 sub-index, else the PM10 sub-index
    /// for stations that report only PM10. `None` means the station is
    /// unusable.
    pub fn resolved_aqi(&self) -> Option<u16> {
        if let Some(aqi) = self.aqi {
            return Some(aqi);
        }
        if let Some(pm25) = self.pm25.filter(|c| *c > 0.0) {
            return Some(pm25_to_aqi(pm25));
        }
        self.pm10
            .filter(|c| *c > 0.0)
            .map(|pm10| Pollutant::Pm10.sub_index(pm10))
    }
}
