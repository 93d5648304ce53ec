//! JSON parser for station feed payloads.

use anyhow::Result;
use serde_json::Value;
use tracing::debug;

use crate::aqi::{clamp_aqi, estimate_pm10, estimate_pm25};
use crate::station::Station;

/// Decodes a station feed payload into [`Station`]s.
///
/// The payload is a JSON array of `{lat, lon, aqi?, pm25?, pm10?, uid?}`
/// records. Numeric fields may arrive as numbers or numeric strings. Records
/// without a usable `lat`/`lon` are dropped, and a payload that is not an
/// array yields no stations. When only `aqi` is reported, the particulate
/// fields are filled with display estimates.
///
/// # Errors
///
/// Returns an error if the bytes are not valid JSON.
pub fn parse_station_payload(bytes: &[u8]) -> Result<Vec<Station>> {
    let payload: Value = serde_json::from_slice(bytes)?;
    let Some(items) = payload.as_array() else {
        debug!("Station payload is not an array, ignoring");
        return Ok(Vec::new());
    };

    let stations: Vec<Station> = items.iter().filter_map(station_from_record).collect();
    debug!(
        records = items.len(),
        stations = stations.len(),
        "Station payload parsed"
    );

    Ok(stations)
}

fn station_from_record(item: &Value) -> Option<Station> {
    let lat = number(&item["lat"])?;
    let lon = number(&item["lon"])?;

    let aqi = number(&item["aqi"]).and_then(clamp_aqi);
    let pm25 = concentration(&item["pm25"]).or_else(|| aqi.map(estimate_pm25));
    let pm10 = concentration(&item["pm10"]).or_else(|| aqi.map(estimate_pm10));

    let id = text(&item["uid"])
        .or_else(|| text(&item["id"]))
        .unwrap_or_else(|| format!("{lat},{lon}"));

    Some(Station {
        id,
        lat,
        lon,
        aqi,
        pm25,
        pm10,
    })
}

pub(crate) fn number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

fn concentration(value: &Value) -> Option<f64> {
    number(value).filter(|c| *c >= 0.0)
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_invalid_bytes() {
        assert!(parse_station_payload(b"{not json").is_err());
    }

    #[test]
    fn test_non_array_payload_is_empty() {
        let stations = parse_station_payload(br#"{"status":"ok"}"#).unwrap();
        assert!(stations.is_empty());
    }

    #[test]
    fn test_records_without_coordinates_are_dropped() {
        let payload = br#"[
            {"lat": 28.6, "lon": 77.2, "aqi": 150},
            {"lat": 28.7, "aqi": 90},
            {"lon": 77.1, "pm25": 40}
        ]"#;
        let stations = parse_station_payload(payload).unwrap();
        assert_eq!(stations.len(), 1);
        assert_eq!(stations[0].aqi, Some(150));
    }

    #[test]
    fn test_string_numbers_and_ids() {
        let payload = br#"[
            {"lat": "28.65", "lon": "77.31", "aqi": "385", "uid": 4021},
            {"lat": 28.56, "lon": 77.18, "pm25": 165.0, "pm10": 275.0}
        ]"#;
        let stations = parse_station_payload(payload).unwrap();

        assert_eq!(stations[0].id, "4021");
        assert_eq!(stations[0].aqi, Some(385));
        assert_eq!(stations[1].id, "28.56,77.18");
        assert_eq!(stations[1].aqi, None);
        assert_eq!(stations[1].pm25, Some(165.0));
    }

    #[test]
    fn test_aqi_only_fills_particulate_estimates() {
        let stations = parse_station_payload(br#"[{"lat": 28.6, "lon": 77.2, "aqi": 100}]"#).unwrap();
        let station = &stations[0];

        assert_eq!(station.pm25, Some(estimate_pm25(100)));
        assert_eq!(station.pm10, Some(estimate_pm10(100)));
    }

    #[test]
    fn test_out_of_range_aqi_is_clamped() {
        let stations = parse_station_payload(br#"[{"lat": 28.6, "lon": 77.2, "aqi": 999}]"#).unwrap();
        assert_eq!(stations[0].aqi, Some(500));
    }
}
