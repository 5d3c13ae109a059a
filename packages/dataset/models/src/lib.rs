#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Record, income bracket, and dataset types for the income vs crime
//! dashboard.
//!
//! A [`Record`] is one row of the `FINAL_CRIME_WITH_LATLON` table: monthly
//! crime totals for a ZIP code and offense category, joined with that ZIP's
//! household income profile. A [`Dataset`] is the full record set plus the
//! distinct values the filter controls are built from.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize, Serializer};
use strum_macros::{AsRefStr, Display, EnumString};

/// Source column names. These must match the table exactly.
pub mod columns {
    /// City name.
    pub const CITY: &str = "CITY";
    /// Calendar year.
    pub const YEAR: &str = "YEAR";
    /// Calendar month (1-12).
    pub const MONTH: &str = "MONTH1";
    /// ZIP code.
    pub const ZIP: &str = "ZIP";
    /// ZIP centroid latitude.
    pub const LATITUDE: &str = "LAT";
    /// ZIP centroid longitude.
    pub const LONGITUDE: &str = "LNG";
    /// Offense category label.
    pub const OFFENSE_CATEGORY: &str = "OFFENSE_CATEGORY";
    /// Crime count for the row.
    pub const TOTAL_CRIMES: &str = "TOTAL_CRIMES";
    /// Number of households in the ZIP.
    pub const HOUSEHOLDS: &str = "HOUSEHOLDS";
    /// Median household income in the ZIP.
    pub const HOUSEHOLDS_MEDIAN_INCOME: &str = "HOUSEHOLDS_MEDIAN_INCOME";
}

/// Household income brackets, in ascending income order.
///
/// The ordering is significant: the distribution heatmap lays brackets out
/// left to right in declaration order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum IncomeBracket {
    /// Less than $10,000.
    #[serde(rename = "<10K")]
    #[strum(serialize = "<10K")]
    LessThan10K,
    /// $10,000 to $15,000.
    #[serde(rename = "10K-15K")]
    #[strum(serialize = "10K-15K")]
    From10KTo15K,
    /// $15,000 to $25,000.
    #[serde(rename = "15K-25K")]
    #[strum(serialize = "15K-25K")]
    From15KTo25K,
    /// $25,000 to $35,000.
    #[serde(rename = "25K-35K")]
    #[strum(serialize = "25K-35K")]
    From25KTo35K,
    /// $35,000 to $50,000.
    #[serde(rename = "35K-50K")]
    #[strum(serialize = "35K-50K")]
    From35KTo50K,
    /// $50,000 to $75,000.
    #[serde(rename = "50K-75K")]
    #[strum(serialize = "50K-75K")]
    From50KTo75K,
    /// $75,000 to $100,000.
    #[serde(rename = "75K-100K")]
    #[strum(serialize = "75K-100K")]
    From75KTo100K,
    /// $100,000 to $150,000.
    #[serde(rename = "100K-150K")]
    #[strum(serialize = "100K-150K")]
    From100KTo150K,
    /// $150,000 to $200,000.
    #[serde(rename = "150K-200K")]
    #[strum(serialize = "150K-200K")]
    From150KTo200K,
    /// More than $200,000.
    #[serde(rename = "200K+")]
    #[strum(serialize = "200K+")]
    MoreThan200K,
}

/// Number of income brackets carried by every record.
pub const BRACKET_COUNT: usize = 10;

impl IncomeBracket {
    /// All brackets in ascending income order.
    pub const ALL: [Self; BRACKET_COUNT] = [
        Self::LessThan10K,
        Self::From10KTo15K,
        Self::From15KTo25K,
        Self::From25KTo35K,
        Self::From35KTo50K,
        Self::From50KTo75K,
        Self::From75KTo100K,
        Self::From100KTo150K,
        Self::From150KTo200K,
        Self::MoreThan200K,
    ];

    /// Position of this bracket in [`Self::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Source column holding this bracket's household percentage.
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::LessThan10K => "HOUSEHOLDS_LESS_THAN_10K",
            Self::From10KTo15K => "HOUSEHOLDS_10K_15K",
            Self::From15KTo25K => "HOUSEHOLDS_15K_25K",
            Self::From25KTo35K => "HOUSEHOLDS_25K_35K",
            Self::From35KTo50K => "HOUSEHOLDS_35K_50K",
            Self::From50KTo75K => "HOUSEHOLDS_50K_75K",
            Self::From75KTo100K => "HOUSEHOLDS_75K_100K",
            Self::From100KTo150K => "HOUSEHOLDS_100K_150K",
            Self::From150KTo200K => "HOUSEHOLDS_150K_200K",
            Self::MoreThan200K => "HOUSEHOLDS_MORE_THAN_200K",
        }
    }
}

/// One row of the source dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// City name.
    pub city: String,
    /// Calendar year.
    pub year: i32,
    /// Calendar month (1-12).
    pub month: u8,
    /// ZIP code.
    pub zip: String,
    /// ZIP centroid latitude.
    pub latitude: f64,
    /// ZIP centroid longitude.
    pub longitude: f64,
    /// Offense category label.
    pub offense_category: String,
    /// Number of crimes reported.
    pub total_crimes: u64,
    /// Household count (NaN when the source value is NULL).
    pub households: f64,
    /// Household median income in dollars (NaN when NULL).
    pub median_income: f64,
    /// Percentage of households per bracket, indexed by
    /// [`IncomeBracket::index`].
    pub brackets: [f64; BRACKET_COUNT],
}

impl Record {
    /// Percentage of households that fall in `bracket`.
    #[must_use]
    pub const fn bracket(&self, bracket: IncomeBracket) -> f64 {
        self.brackets[bracket.index()]
    }

    /// The record's calendar month key.
    #[must_use]
    pub const fn year_month(&self) -> YearMonth {
        YearMonth::new(self.year, self.month)
    }
}

/// A calendar month, ordered chronologically and displayed as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    /// Calendar year.
    pub year: i32,
    /// Calendar month (1-12).
    pub month: u8,
}

impl YearMonth {
    /// Creates a new month key.
    #[must_use]
    pub const fn new(year: i32, month: u8) -> Self {
        Self { year, month }
    }

    /// The January key a yearly value is plotted at.
    #[must_use]
    pub const fn january(year: i32) -> Self {
        Self { year, month: 1 }
    }
}

impl std::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The full record set and the distinct values derived from it.
///
/// Built once per process by the loader; every filter default and control
/// bound comes from here.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<Record>,
    cities: Vec<String>,
    offense_categories: Vec<String>,
    year_bounds: (i32, i32),
    month_bounds: (u8, u8),
}

impl Dataset {
    /// Builds a dataset from loaded records.
    ///
    /// Returns `None` when `records` is empty, since no defaults can be
    /// derived from an empty table.
    #[must_use]
    pub fn from_records(records: Vec<Record>) -> Option<Self> {
        let first = records.first()?;
        let mut year_bounds = (first.year, first.year);
        let mut month_bounds = (first.month, first.month);

        let mut seen_cities = BTreeSet::new();
        let mut cities = Vec::new();
        let mut seen_categories = BTreeSet::new();
        let mut offense_categories = Vec::new();

        for record in &records {
            year_bounds.0 = year_bounds.0.min(record.year);
            year_bounds.1 = year_bounds.1.max(record.year);
            month_bounds.0 = month_bounds.0.min(record.month);
            month_bounds.1 = month_bounds.1.max(record.month);

            if seen_cities.insert(record.city.as_str()) {
                cities.push(record.city.clone());
            }
            if seen_categories.insert(record.offense_category.as_str()) {
                offense_categories.push(record.offense_category.clone());
            }
        }

        Some(Self {
            records,
            cities,
            offense_categories,
            year_bounds,
            month_bounds,
        })
    }

    /// All records, in source order.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Distinct cities in first-appearance order.
    #[must_use]
    pub fn cities(&self) -> &[String] {
        &self.cities
    }

    /// Distinct offense categories in first-appearance order.
    #[must_use]
    pub fn offense_categories(&self) -> &[String] {
        &self.offense_categories
    }

    /// `(min, max)` year present in the data.
    #[must_use]
    pub const fn year_bounds(&self) -> (i32, i32) {
        self.year_bounds
    }

    /// `(min, max)` month present in the data.
    #[must_use]
    pub const fn month_bounds(&self) -> (u8, u8) {
        self.month_bounds
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always `false`; an empty dataset cannot be constructed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(city: &str, year: i32, month: u8, category: &str) -> Record {
        Record {
            city: city.to_string(),
            year,
            month,
            zip: "00000".to_string(),
            latitude: 0.0,
            longitude: 0.0,
            offense_category: category.to_string(),
            total_crimes: 1,
            households: 1.0,
            median_income: 1.0,
            brackets: [10.0; BRACKET_COUNT],
        }
    }

    #[test]
    fn bracket_indices_follow_declaration_order() {
        for (i, bracket) in IncomeBracket::ALL.iter().enumerate() {
            assert_eq!(bracket.index(), i);
        }
    }

    #[test]
    fn bracket_labels_roundtrip_through_strum() {
        for bracket in IncomeBracket::ALL {
            let label = bracket.to_string();
            let parsed: IncomeBracket = label.parse().unwrap();
            assert_eq!(parsed, bracket);
        }
        assert_eq!(IncomeBracket::LessThan10K.as_ref(), "<10K");
        assert_eq!(IncomeBracket::MoreThan200K.as_ref(), "200K+");
    }

    #[test]
    fn bracket_serializes_as_label() {
        let json = serde_json::to_string(&IncomeBracket::From35KTo50K).unwrap();
        assert_eq!(json, "\"35K-50K\"");
    }

    #[test]
    fn bracket_columns_are_unique() {
        let mut cols: Vec<&str> = IncomeBracket::ALL.iter().map(|b| b.column()).collect();
        cols.sort_unstable();
        cols.dedup();
        assert_eq!(cols.len(), BRACKET_COUNT);
    }

    #[test]
    fn year_month_formats_zero_padded() {
        assert_eq!(YearMonth::new(2019, 3).to_string(), "2019-03");
        assert_eq!(YearMonth::january(2020).to_string(), "2020-01");
        assert_eq!(
            serde_json::to_string(&YearMonth::new(2021, 11)).unwrap(),
            "\"2021-11\""
        );
    }

    #[test]
    fn year_month_orders_chronologically() {
        assert!(YearMonth::new(2018, 12) < YearMonth::new(2019, 1));
        assert!(YearMonth::new(2019, 2) < YearMonth::new(2019, 10));
    }

    #[test]
    fn dataset_rejects_empty_records() {
        assert!(Dataset::from_records(Vec::new()).is_none());
    }

    #[test]
    fn dataset_collects_distinct_values_in_first_appearance_order() {
        let dataset = Dataset::from_records(vec![
            record("Seattle", 2019, 4, "Theft"),
            record("Chicago", 2017, 12, "Assault"),
            record("Seattle", 2020, 1, "Assault"),
        ])
        .unwrap();

        assert_eq!(dataset.cities(), ["Seattle", "Chicago"]);
        assert_eq!(dataset.offense_categories(), ["Theft", "Assault"]);
        assert_eq!(dataset.year_bounds(), (2017, 2020));
        assert_eq!(dataset.month_bounds(), (1, 12));
        assert_eq!(dataset.len(), 3);
    }
}
