use anyhow::Result;
use async_trait::async_trait;

use crate::feed::StationFeed;
use crate::station::Station;

/// Name, lat, lon, AQI, PM2.5, PM10 for the city's CPCB monitoring stations.
static DELHI_STATIONS: &[(&str, f64, f64, u16, f64, f64)] = &[
    ("Anand Vihar", 28.6469, 77.3160, 385, 185.0, 295.0),
    ("RK Puram", 28.5631, 77.1822, 342, 165.0, 275.0),
    ("Dwarka Sector 8", 28.5706, 77.0621, 298, 142.0, 245.0),
    ("Punjabi Bagh", 28.6692, 77.1312, 365, 175.0, 285.0),
    ("Nehru Nagar", 28.5672, 77.2506, 318, 152.0, 258.0),
    ("Vivek Vihar", 28.6719, 77.3152, 372, 178.0, 288.0),
    ("Rohini", 28.7430, 77.1175, 325, 155.0, 262.0),
    ("Shadipur", 28.6531, 77.1588, 358, 172.0, 280.0),
    ("ITO", 28.6281, 77.2428, 395, 192.0, 305.0),
    ("Mandir Marg", 28.6369, 77.2014, 335, 162.0, 268.0),
    ("Lodhi Road", 28.5920, 77.2274, 312, 148.0, 252.0),
    ("Okhla Phase 2", 28.5305, 77.2703, 348, 168.0, 275.0),
    ("Jahangirpuri", 28.7335, 77.1638, 378, 182.0, 292.0),
    ("Sonia Vihar", 28.7186, 77.2473, 362, 174.0, 282.0),
    ("Najafgarh", 28.6092, 76.9798, 305, 145.0, 248.0),
    ("Wazirpur", 28.6988, 77.1642, 352, 170.0, 278.0),
    ("Mundka", 28.6836, 77.0316, 388, 188.0, 298.0),
    ("Alipur", 28.7995, 77.1346, 315, 150.0, 255.0),
    ("Bawana", 28.7953, 77.0373, 368, 176.0, 286.0),
    ("North Campus", 28.6869, 77.2153, 330, 158.0, 265.0),
];

/// Hardcoded snapshot of Delhi station readings, used when no live endpoint
/// answers or when running offline.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockDataSource;

impl MockDataSource {
    pub fn stations() -> Vec<Station> {
        DELHI_STATIONS
            .iter()
            .map(|&(name, lat, lon, aqi, pm25, pm10)| Station {
                id: name.to_string(),
                lat,
                lon,
                aqi: Some(aqi),
                pm25: Some(pm25),
                pm10: Some(pm10),
            })
            .collect()
    }
}

#[async_trait]
impl StationFeed for MockDataSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch(&self) -> Result<Vec<Station>> {
        Ok(Self::stations())
    }
}
