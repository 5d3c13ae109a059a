#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the dashboard server.
//!
//! Page responses reuse the analytics table types directly; this crate only
//! adds the query string shape, the preview envelope and the health and
//! error bodies.

use income_crime_analytics_models::{FilterState, OffenseCategoryFilter};
use income_crime_dataset_models::Record;
use serde::{Deserialize, Serialize};

/// Server health status.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the server is healthy.
    pub healthy: bool,
    /// Server version.
    pub version: String,
    /// Number of records in the loaded dataset.
    pub records: usize,
}

/// Error body returned with 4xx/5xx responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Human-readable message.
    pub error: String,
}

/// Filter query parameters shared by every page endpoint.
///
/// Absent parameters keep the session default. `cities` is a
/// comma-separated list; present but empty selects no cities.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterQueryParams {
    /// First year to include.
    pub year_from: Option<i32>,
    /// Last year to include.
    pub year_to: Option<i32>,
    /// First month to include (1-12).
    pub month_from: Option<u8>,
    /// Last month to include (1-12).
    pub month_to: Option<u8>,
    /// Comma-separated city names.
    pub cities: Option<String>,
    /// Offense category, or `All Categories`.
    pub category: Option<String>,
    /// Maximum number of preview records (`/records` only).
    pub limit: Option<usize>,
}

impl FilterQueryParams {
    /// Overlays the given parameters onto `defaults`.
    ///
    /// The result is not validated; the session rejects invalid values.
    #[must_use]
    pub fn to_state(&self, defaults: &FilterState) -> FilterState {
        FilterState {
            year_range: (
                self.year_from.unwrap_or(defaults.year_range.0),
                self.year_to.unwrap_or(defaults.year_range.1),
            ),
            month_range: (
                self.month_from.unwrap_or(defaults.month_range.0),
                self.month_to.unwrap_or(defaults.month_range.1),
            ),
            selected_cities: self.cities.as_deref().map_or_else(
                || defaults.selected_cities.clone(),
                |cities| {
                    cities
                        .split(',')
                        .map(str::trim)
                        .filter(|c| !c.is_empty())
                        .map(str::to_string)
                        .collect()
                },
            ),
            offense_category: self.category.as_deref().map_or_else(
                || defaults.offense_category.clone(),
                OffenseCategoryFilter::from,
            ),
        }
    }
}

/// Table preview response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRecords {
    /// Number of records matching the filters.
    pub matched: usize,
    /// The first matching records.
    pub records: Vec<Record>,
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn defaults() -> FilterState {
        FilterState {
            year_range: (2018, 2021),
            month_range: (1, 12),
            selected_cities: BTreeSet::from(["Chicago".to_string(), "Seattle".to_string()]),
            offense_category: OffenseCategoryFilter::All,
        }
    }

    #[test]
    fn absent_params_keep_defaults() {
        assert_eq!(FilterQueryParams::default().to_state(&defaults()), defaults());
    }

    #[test]
    fn params_override_each_dimension() {
        let params = FilterQueryParams {
            year_from: Some(2019),
            month_to: Some(6),
            cities: Some(" Seattle ,Houston".to_string()),
            category: Some("Theft".to_string()),
            ..FilterQueryParams::default()
        };
        let state = params.to_state(&defaults());

        assert_eq!(state.year_range, (2019, 2021));
        assert_eq!(state.month_range, (1, 6));
        assert_eq!(
            state.selected_cities,
            BTreeSet::from(["Houston".to_string(), "Seattle".to_string()])
        );
        assert_eq!(
            state.offense_category,
            OffenseCategoryFilter::Category("Theft".to_string())
        );
    }

    #[test]
    fn empty_cities_param_selects_nothing() {
        let params = FilterQueryParams {
            cities: Some(String::new()),
            ..FilterQueryParams::default()
        };
        assert!(params.to_state(&defaults()).selected_cities.is_empty());
    }

    #[test]
    fn all_categories_label_clears_category() {
        let params = FilterQueryParams {
            category: Some("All Categories".to_string()),
            ..FilterQueryParams::default()
        };
        assert_eq!(
            params.to_state(&defaults()).offense_category,
            OffenseCategoryFilter::All
        );
    }

    #[test]
    fn deserializes_camel_case_query_keys() {
        let params: FilterQueryParams =
            serde_json::from_str(r#"{"yearFrom": 2018, "monthTo": 3, "limit": 10}"#).unwrap();
        assert_eq!(params.year_from, Some(2018));
        assert_eq!(params.month_to, Some(3));
        assert_eq!(params.limit, Some(10));
    }
}
