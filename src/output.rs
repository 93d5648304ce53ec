//! Output formatting and persistence for ward readings.
//!
//! Supports pretty-printing, JSON serialization, and CSV append.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::aqi::AqiBand;
use crate::ward::Ward;
use csv::WriterBuilder;
use std::fs::OpenOptions;
use std::path::Path;

/// One ward's reading as handed to the map renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WardRow {
    pub timestamp: DateTime<Utc>,
    pub ward_id: String,
    pub ward_name: String,
    pub aqi: Option<u16>,
    pub pm25: Option<f64>,
    pub pm10: Option<f64>,
    pub method: Option<String>,
    pub color: &'static str,
    pub label: &'static str,
}

impl WardRow {
    pub fn from_ward(ward: &Ward, timestamp: DateTime<Utc>) -> Self {
        let reading = ward.reading.as_ref();
        let band = AqiBand::from_aqi(reading.map(|r| r.aqi));
        WardRow {
            timestamp,
            ward_id: ward.id.clone(),
            ward_name: ward.name.clone(),
            aqi: reading.map(|r| r.aqi),
            pm25: reading.map(|r| r.pm25.round()),
            pm10: reading.map(|r| r.pm10.round()),
            method: reading.map(|r| r.method.label().to_string()),
            color: band.color(),
            label: band.label(),
        }
    }
}

/// Rows for every ward, stamped with `timestamp`.
pub fn ward_rows(wards: &[Ward], timestamp: DateTime<Utc>) -> Vec<WardRow> {
    wards
        .iter()
        .map(|w| WardRow::from_ward(w, timestamp))
        .collect()
}

/// Logs rows using Rust's debug pretty-print format.
pub fn print_pretty(rows: &[WardRow]) {
    debug!("{:#?}", rows);
}

/// Logs a serializable value as pretty-printed JSON.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Appends ward rows to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_records(path: &str, rows: &[WardRow]) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, rows = rows.len(), "Appending CSV records");

    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ward::{AqiMethod, WardReading};
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    fn wards() -> Vec<Ward> {
        let mut measured = Ward::new("12", "Model Town", None);
        measured.reading = Some(WardReading {
            aqi: 342,
            pm25: 165.4,
            pm10: 264.6,
            method: AqiMethod::SpatialInterpolation,
        });
        vec![measured, Ward::new("13", "Kamla Nagar", None)]
    }

    #[test]
    fn test_row_from_ward() {
        let rows = ward_rows(&wards(), Utc::now());

        assert_eq!(rows[0].aqi, Some(342));
        assert_eq!(rows[0].pm25, Some(165.0));
        assert_eq!(rows[0].method.as_deref(), Some("Spatial Interpolation"));
        assert_eq!(rows[0].label, "Very Poor");
        assert_eq!(rows[1].aqi, None);
        assert_eq!(rows[1].label, "No data");
    }

    #[test]
    fn test_print_pretty_does_not_panic() {
        print_pretty(&ward_rows(&wards(), Utc::now()));
    }

    #[test]
    fn test_print_json_does_not_panic() {
        print_json(&ward_rows(&wards(), Utc::now())).unwrap();
    }

    #[test]
    fn test_append_records_writes_header_once() {
        let path = temp_path("delhi_aqi_test_header.csv");
        let _ = fs::remove_file(&path);

        let rows = ward_rows(&wards(), Utc::now());
        append_records(&path, &rows).unwrap();
        append_records(&path, &rows).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let header_count = content.lines().filter(|l| l.starts_with("timestamp")).count();
        assert_eq!(header_count, 1);
        // 1 header + 2 cycles of 2 wards
        assert_eq!(content.lines().count(), 5);

        fs::remove_file(&path).unwrap();
    }
}
