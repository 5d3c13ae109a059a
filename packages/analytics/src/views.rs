//! City map views, loaded from an embedded TOML table.
//!
//! `views/cities.toml` is baked into the binary with [`include_str!`].
//! Adding a city camera means adding a `[[city]]` entry there.

use std::collections::BTreeMap;

use income_crime_analytics_models::MapView;
use serde::Deserialize;

/// Zoom level for cities without an entry in the table.
pub const DEFAULT_ZOOM: f64 = 9.0;

const CITY_VIEWS_TOML: &str = include_str!("../views/cities.toml");

#[derive(Debug, Deserialize)]
struct CityViewsFile {
    city: Vec<CityViewEntry>,
}

#[derive(Debug, Deserialize)]
struct CityViewEntry {
    name: String,
    latitude: f64,
    longitude: f64,
    zoom: f64,
}

/// Parses a city views document into a map from city name to view.
///
/// # Errors
///
/// Returns [`toml::de::Error`] if the document is malformed.
pub fn parse_city_views(text: &str) -> Result<BTreeMap<String, MapView>, toml::de::Error> {
    let file: CityViewsFile = toml::from_str(text)?;
    Ok(file
        .city
        .into_iter()
        .map(|entry| {
            (
                entry.name,
                MapView {
                    latitude: entry.latitude,
                    longitude: entry.longitude,
                    zoom: entry.zoom,
                },
            )
        })
        .collect())
}

/// All embedded city views.
///
/// # Errors
///
/// Returns [`toml::de::Error`] if the embedded table is malformed.
pub fn city_views() -> Result<BTreeMap<String, MapView>, toml::de::Error> {
    parse_city_views(CITY_VIEWS_TOML)
}

/// The embedded view for `city`, if it has one.
#[must_use]
pub fn map_view(city: &str) -> Option<MapView> {
    match city_views() {
        Ok(mut views) => views.remove(city),
        Err(e) => {
            log::error!("Failed to parse embedded city views: {e}");
            None
        }
    }
}

/// A view centered on the mean of `points`, at [`DEFAULT_ZOOM`].
///
/// Non-finite coordinates are ignored; with none left the view is centered
/// on `(0, 0)`.
#[must_use]
pub fn centroid_view(points: impl IntoIterator<Item = (f64, f64)>) -> MapView {
    let (latitudes, longitudes): (Vec<f64>, Vec<f64>) = points
        .into_iter()
        .filter(|(lat, lng)| lat.is_finite() && lng.is_finite())
        .unzip();
    let center = |values: Vec<f64>| {
        let mean = crate::stats::mean(values);
        if mean.is_finite() { mean } else { 0.0 }
    };

    MapView {
        latitude: center(latitudes),
        longitude: center(longitudes),
        zoom: DEFAULT_ZOOM,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_all_city_views() {
        let views = city_views().unwrap();
        assert_eq!(views.len(), 6);
        for city in [
            "New York",
            "Los Angeles",
            "Houston",
            "Seattle",
            "San Francisco",
            "Chicago",
        ] {
            assert!(views.contains_key(city), "missing view for {city}");
        }
    }

    #[test]
    fn san_francisco_is_zoomed_in() {
        let view = map_view("San Francisco").unwrap();
        assert!((view.zoom - 10.0).abs() < f64::EPSILON);
        assert!((view.latitude - 37.7749).abs() < 1e-9);
    }

    #[test]
    fn unknown_city_has_no_view() {
        assert!(map_view("Springfield").is_none());
    }

    #[test]
    fn rejects_entries_missing_fields() {
        assert!(parse_city_views("[[city]]\nname = \"X\"\nlatitude = 1.0").is_err());
    }

    #[test]
    fn centroid_ignores_non_finite_points() {
        let view = centroid_view([(10.0, 20.0), (f64::NAN, 0.0), (20.0, 40.0)]);
        assert!((view.latitude - 15.0).abs() < f64::EPSILON);
        assert!((view.longitude - 30.0).abs() < f64::EPSILON);
        assert!((view.zoom - DEFAULT_ZOOM).abs() < f64::EPSILON);
    }

    #[test]
    fn centroid_of_nothing_is_origin() {
        let view = centroid_view(std::iter::empty());
        assert!(view.latitude.abs() < f64::EPSILON);
        assert!(view.longitude.abs() < f64::EPSILON);
    }
}
