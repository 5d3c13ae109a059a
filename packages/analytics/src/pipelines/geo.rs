//! Geographic heatmaps page.
//!
//! Each city gets a crime layer (summed crimes per ZIP centroid) and an
//! income layer (mean income per ZIP centroid). The income layer only
//! covers ZIPs with at least one recorded crime, so the two maps show the
//! same footprint.

use std::collections::{BTreeMap, BTreeSet};

use income_crime_analytics_models::{CityGeoLayers, CrimePoint, HeatmapsPage, IncomePoint};
use income_crime_dataset_models::Record;

use crate::filter::FilteredView;
use crate::stats::{OrderedF64, mean};
use crate::views::{centroid_view, map_view};

type PointKey<'a> = (&'a str, OrderedF64, OrderedF64);

fn point_key(record: &Record) -> PointKey<'_> {
    (
        record.zip.as_str(),
        OrderedF64(record.latitude),
        OrderedF64(record.longitude),
    )
}

fn city_layers(city: &str, records: &[&Record]) -> CityGeoLayers {
    let mut crimes: BTreeMap<PointKey<'_>, u64> = BTreeMap::new();
    let mut incomes: BTreeMap<PointKey<'_>, Vec<f64>> = BTreeMap::new();
    for record in records {
        *crimes.entry(point_key(record)).or_default() += record.total_crimes;
        incomes
            .entry(point_key(record))
            .or_default()
            .push(record.median_income);
    }

    let active_zips: BTreeSet<&str> = crimes
        .iter()
        .filter(|(_, total)| **total > 0)
        .map(|((zip, _, _), _)| *zip)
        .collect();

    let crime_points: Vec<CrimePoint> = crimes
        .into_iter()
        .map(|((zip, lat, lng), total_crimes)| CrimePoint {
            zip: zip.to_string(),
            latitude: lat.0,
            longitude: lng.0,
            total_crimes,
        })
        .collect();

    let income_points = incomes
        .into_iter()
        .filter(|((zip, _, _), _)| active_zips.contains(zip))
        .map(|((zip, lat, lng), values)| IncomePoint {
            zip: zip.to_string(),
            latitude: lat.0,
            longitude: lng.0,
            median_income: mean(values),
        })
        .collect();

    let view = map_view(city).unwrap_or_else(|| {
        log::debug!("No map view for {city}, centering on its crime points");
        centroid_view(crime_points.iter().map(|p| (p.latitude, p.longitude)))
    });

    CityGeoLayers {
        city: city.to_string(),
        view,
        crime_points,
        income_points,
    }
}

/// Crime and income layers for each city, in order of first appearance in
/// the view.
#[must_use]
pub fn heatmap_layers(view: &FilteredView<'_>) -> Vec<CityGeoLayers> {
    let mut order: Vec<&str> = Vec::new();
    let mut by_city: BTreeMap<&str, Vec<&Record>> = BTreeMap::new();
    for record in view.iter() {
        let records = by_city.entry(record.city.as_str()).or_insert_with(|| {
            order.push(record.city.as_str());
            Vec::new()
        });
        records.push(record);
    }

    order
        .into_iter()
        .map(|city| city_layers(city, by_city.get(city).map_or(&[][..], Vec::as_slice)))
        .collect()
}

/// Every table on the heatmaps page.
#[must_use]
pub fn page(view: &FilteredView<'_>) -> HeatmapsPage {
    HeatmapsPage {
        cities: heatmap_layers(view),
    }
}
