//! Ward geometry: GeoJSON loading and point-in-polygon assignment.
//!
//! Geometry problems never surface as errors at query time. A feature that
//! cannot be converted is kept with no geometry, and a point that cannot be
//! tested is simply "not inside".

use anyhow::{Context, Result, bail};
use geo::{Centroid, InteriorPoint, Intersects, MultiPolygon, Point};
use geojson::{Feature, GeoJson, feature::Id};
use serde_json::Value;
use tracing::{info, warn};

use crate::station::Station;
use crate::ward::Ward;

/// Property keys tried, in order, for a ward's display name.
const NAME_KEYS: [&str; 3] = ["name", "WARD_NAME", "WardName"];

/// Parses a GeoJSON `FeatureCollection` into wards.
///
/// # Errors
///
/// Returns an error if the text is not GeoJSON or not a `FeatureCollection`.
/// Individual features with unusable geometry are kept without geometry.
pub fn load_wards(geojson: &str) -> Result<Vec<Ward>> {
    let parsed: GeoJson = geojson.parse().context("ward source is not valid GeoJSON")?;
    let GeoJson::FeatureCollection(collection) = parsed else {
        bail!("ward source is not a FeatureCollection");
    };

    let wards: Vec<Ward> = collection
        .features
        .into_iter()
        .enumerate()
        .map(|(index, feature)| ward_from_feature(index, feature))
        .collect();

    let without_geometry = wards.iter().filter(|w| w.geometry.is_none()).count();
    info!(wards = wards.len(), without_geometry, "Ward polygons loaded");

    Ok(wards)
}

fn ward_from_feature(index: usize, feature: Feature) -> Ward {
    let name = NAME_KEYS
        .iter()
        .find_map(|key| property_text(&feature, key))
        .unwrap_or_else(|| format!("Ward {}", index + 1));

    let id = property_text(&feature, "Ward_No")
        .or_else(|| feature.id.as_ref().map(id_text))
        .unwrap_or_else(|| (index + 1).to_string());

    let geometry = feature.geometry.and_then(to_multipolygon);
    if geometry.is_none() {
        warn!(ward_id = %id, ward_name = %name, "Ward has no usable polygon geometry");
    }

    Ward::new(id, name, geometry)
}

fn property_text(feature: &Feature, key: &str) -> Option<String> {
    match feature.property(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn id_text(id: &Id) -> String {
    match id {
        Id::String(s) => s.clone(),
        Id::Number(n) => n.to_string(),
    }
}

/// Converts a GeoJSON geometry to a [`MultiPolygon`].
/// Handles both `Polygon` and `MultiPolygon` geometry types.
fn to_multipolygon(geometry: geojson::Geometry) -> Option<MultiPolygon<f64>> {
    let geometry: geo::Geometry<f64> = geometry.try_into().ok()?;
    match geometry {
        geo::Geometry::MultiPolygon(mp) => Some(mp),
        geo::Geometry::Polygon(p) => Some(MultiPolygon(vec![p])),
        _ => None,
    }
}

/// Whether `(lat, lon)` lies inside or on the boundary of any of the ward's
/// polygons.
pub fn point_in_ward(ward: &Ward, lat: f64, lon: f64) -> bool {
    if !lat.is_finite() || !lon.is_finite() {
        return false;
    }
    let point = Point::new(lon, lat);
    ward.geometry
        .as_ref()
        .is_some_and(|polygons| polygons.intersects(&point))
}

/// Keeps the stations that fall inside at least one ward.
///
/// With no wards loaded there is nothing to filter against, so every
/// station is kept.
pub fn stations_within_wards(stations: Vec<Station>, wards: &[Ward]) -> Vec<Station> {
    if wards.is_empty() {
        return stations;
    }
    stations
        .into_iter()
        .filter(|s| wards.iter().any(|w| point_in_ward(w, s.lat, s.lon)))
        .collect()
}

/// The first ward containing `(lat, lon)`.
pub fn find_ward_containing(lat: f64, lon: f64, wards: &[Ward]) -> Option<&Ward> {
    wards.iter().find(|w| point_in_ward(w, lat, lon))
}

/// First ward whose name contains `query`, ignoring case.
///
/// A blank query matches nothing.
pub fn find_ward_by_name<'a>(query: &str, wards: &'a [Ward]) -> Option<&'a Ward> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    wards
        .iter()
        .find(|w| w.name.to_lowercase().contains(&needle))
}

/// A `(lat, lon)` point on the ward, used as its interpolation target.
///
/// Prefers an interior point, which is guaranteed to lie on the surface even
/// for concave wards, and falls back to the centroid.
pub fn representative_point(ward: &Ward) -> Option<(f64, f64)> {
    let polygons = ward.geometry.as_ref()?;
    polygons
        .interior_point()
        .or_else(|| polygons.centroid())
        .map(|p| (p.y(), p.x()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(lon: f64, lat: f64, size: f64) -> String {
        format!(
            "[[[{lon},{lat}],[{e},{lat}],[{e},{n}],[{lon},{n}],[{lon},{lat}]]]",
            e = lon + size,
            n = lat + size
        )
    }

    fn collection(features: &[String]) -> String {
        format!(r#"{{"type":"FeatureCollection","features":[{}]}}"#, features.join(","))
    }

    fn polygon_feature(properties: &str, lon: f64, lat: f64, size: f64) -> String {
        format!(
            r#"{{"type":"Feature","properties":{properties},"geometry":{{"type":"Polygon","coordinates":{}}}}}"#,
            square(lon, lat, size)
        )
    }

    #[test]
    fn test_load_names_and_ids() {
        let text = collection(&[
            polygon_feature(r#"{"name":"Civil Lines","Ward_No":7}"#, 77.0, 28.0, 0.1),
            polygon_feature(r#"{"WARD_NAME":"Karol Bagh"}"#, 77.2, 28.0, 0.1),
            polygon_feature("{}", 77.4, 28.0, 0.1),
        ]);
        let wards = load_wards(&text).unwrap();

        assert_eq!(wards.len(), 3);
        assert_eq!(wards[0].name, "Civil Lines");
        assert_eq!(wards[0].id, "7");
        assert_eq!(wards[1].name, "Karol Bagh");
        assert_eq!(wards[1].id, "2");
        assert_eq!(wards[2].name, "Ward 3");
        assert!(wards.iter().all(|w| w.geometry.is_some()));
    }

    #[test]
    fn test_load_rejects_non_collection() {
        assert!(load_wards(r#"{"type":"Point","coordinates":[77.0,28.0]}"#).is_err());
        assert!(load_wards("not geojson").is_err());
    }

    #[test]
    fn test_non_polygon_geometry_is_never_inside() {
        let text = collection(&[String::from(
            r#"{"type":"Feature","properties":{"name":"Stray"},"geometry":{"type":"Point","coordinates":[77.0,28.0]}}"#,
        )]);
        let wards = load_wards(&text).unwrap();

        assert!(wards[0].geometry.is_none());
        assert!(!point_in_ward(&wards[0], 28.0, 77.0));
        assert!(representative_point(&wards[0]).is_none());
    }

    #[test]
    fn test_multipolygon_membership() {
        let feature = format!(
            r#"{{"type":"Feature","properties":{{"name":"Split"}},"geometry":{{"type":"MultiPolygon","coordinates":[{},{}]}}}}"#,
            square(77.0, 28.0, 0.1),
            square(77.5, 28.5, 0.1)
        );
        let wards = load_wards(&collection(&[feature])).unwrap();

        assert!(point_in_ward(&wards[0], 28.05, 77.05));
        assert!(point_in_ward(&wards[0], 28.55, 77.55));
        assert!(!point_in_ward(&wards[0], 28.3, 77.3));
    }

    #[test]
    fn test_non_finite_point_is_outside() {
        let wards = load_wards(&collection(&[polygon_feature("{}", 77.0, 28.0, 1.0)])).unwrap();
        assert!(!point_in_ward(&wards[0], f64::NAN, 77.5));
        assert!(!point_in_ward(&wards[0], 28.5, f64::INFINITY));
    }

    #[test]
    fn test_outside_points_never_inside_disjoint_squares() {
        let features: Vec<String> = (0..4)
            .flat_map(|row| (0..4).map(move |col| (row, col)))
            .map(|(row, col)| {
                polygon_feature("{}", 77.0 + f64::from(col) * 0.2, 28.0 + f64::from(row) * 0.2, 0.1)
            })
            .collect();
        let wards = load_wards(&collection(&features)).unwrap();

        // Points in the 0.1-wide gutters between squares and beyond the grid.
        for i in 0..40 {
            let t = f64::from(i) * 0.02;
            for (lat, lon) in [
                (28.15, 77.0 + t),
                (28.0 + t, 77.15),
                (27.95, 77.0 + t),
                (28.0 + t, 77.85),
            ] {
                assert!(find_ward_containing(lat, lon, &wards).is_none(), "({lat}, {lon})");
            }
        }
        assert!(find_ward_containing(28.05, 77.05, &wards).is_some());
    }

    #[test]
    fn test_stations_within_wards() {
        let wards = load_wards(&collection(&[polygon_feature("{}", 77.0, 28.0, 1.0)])).unwrap();
        let stations = vec![
            Station::with_aqi(28.5, 77.5, 200),
            Station::with_aqi(30.0, 77.5, 100),
        ];

        let inside = stations_within_wards(stations.clone(), &wards);
        assert_eq!(inside.len(), 1);
        assert_eq!(inside[0].aqi, Some(200));

        assert_eq!(stations_within_wards(stations, &[]).len(), 2);
    }

    #[test]
    fn test_representative_point_is_inside() {
        let wards = load_wards(&collection(&[polygon_feature("{}", 77.0, 28.0, 0.2)])).unwrap();
        let (lat, lon) = representative_point(&wards[0]).unwrap();
        assert!(point_in_ward(&wards[0], lat, lon));
    }

    #[test]
    fn test_find_ward_by_name_is_case_insensitive_substring() {
        let wards = vec![
            Ward::new("1", "Civil Lines", None),
            Ward::new("2", "Karol Bagh", None),
            Ward::new("3", "Bagh Pahari", None),
        ];

        assert_eq!(find_ward_by_name("karol", &wards).map(|w| w.id.as_str()), Some("2"));
        assert_eq!(find_ward_by_name("  LINES ", &wards).map(|w| w.id.as_str()), Some("1"));
        // First match in ward order wins.
        assert_eq!(find_ward_by_name("bagh", &wards).map(|w| w.id.as_str()), Some("2"));
        assert!(find_ward_by_name("Connaught Place", &wards).is_none());
        assert!(find_ward_by_name("   ", &wards).is_none());
    }
}
