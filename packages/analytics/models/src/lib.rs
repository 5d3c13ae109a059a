#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Filter state and aggregated result types for the dashboard.
//!
//! [`FilterState`] holds the four user-controlled filter dimensions. The
//! remaining types are the tables each aggregation pipeline hands to the
//! chart layer, grouped into one struct per dashboard page. All of them
//! serialize to JSON with camelCase field names, which are the names the
//! charts bind to.

use std::collections::BTreeSet;

use income_crime_dataset_models::{Dataset, IncomeBracket, YearMonth};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Label of the offense category option that disables category filtering.
pub const ALL_CATEGORIES: &str = "All Categories";

/// Default lower bound of the year range.
pub const DEFAULT_START_YEAR: i32 = 2018;

/// Color scale domain of the income distribution heatmap.
pub const BRACKET_SHARE_DOMAIN: (f64, f64) = (0.0, 0.35);

/// Offense category selection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum OffenseCategoryFilter {
    /// Every category passes.
    #[default]
    All,
    /// Only records with exactly this category pass.
    Category(String),
}

impl OffenseCategoryFilter {
    /// Whether a record with `category` passes this filter.
    #[must_use]
    pub fn matches(&self, category: &str) -> bool {
        match self {
            Self::All => true,
            Self::Category(selected) => selected == category,
        }
    }
}

impl std::fmt::Display for OffenseCategoryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "{ALL_CATEGORIES}"),
            Self::Category(category) => write!(f, "{category}"),
        }
    }
}

impl From<&str> for OffenseCategoryFilter {
    fn from(value: &str) -> Self {
        if value == ALL_CATEGORIES {
            Self::All
        } else {
            Self::Category(value.to_string())
        }
    }
}

impl Serialize for OffenseCategoryFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for OffenseCategoryFilter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Self::from(value.as_str()))
    }
}

/// The current value of every filter control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    /// Inclusive `(min, max)` year.
    pub year_range: (i32, i32),
    /// Inclusive `(min, max)` month.
    pub month_range: (u8, u8),
    /// Cities to include. Empty means no city passes.
    pub selected_cities: BTreeSet<String>,
    /// Offense category selection.
    pub offense_category: OffenseCategoryFilter,
}

impl FilterState {
    /// The default filter state for `dataset`.
    ///
    /// The year range starts at [`DEFAULT_START_YEAR`] (or the first year in
    /// the data if that is later, capped at the last year) and ends at the
    /// last year in the data. Every month, every city, and every category are
    /// selected.
    #[must_use]
    pub fn defaults_for(dataset: &Dataset) -> Self {
        let (min_year, max_year) = dataset.year_bounds();
        let start_year = DEFAULT_START_YEAR.max(min_year).min(max_year);

        Self {
            year_range: (start_year, max_year),
            month_range: (1, 12),
            selected_cities: dataset.cities().iter().cloned().collect(),
            offense_category: OffenseCategoryFilter::All,
        }
    }
}

/// Bounds and options for the filter controls.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    /// Year slider bounds.
    pub year_bounds: (i32, i32),
    /// Month slider bounds.
    pub month_bounds: (u8, u8),
    /// City checkbox options, in dataset order.
    pub cities: Vec<String>,
    /// Offense category options, [`ALL_CATEGORIES`] first.
    pub offense_categories: Vec<String>,
    /// Values restored by a reset.
    pub defaults: FilterState,
}

// ── Key insights ────────────────────────────────────────────────────────

/// Per-city crime and income summary (scatter plot, log-scaled axes, sized
/// by household count).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CitySummary {
    /// City name.
    pub city: String,
    /// Sum of total crimes.
    pub total_crimes: u64,
    /// Median of household median income.
    pub median_income: f64,
    /// Mean household count.
    pub mean_households: f64,
}

/// Per-city crime rate and its normalized intensity.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrimeIntensityRow {
    /// City name.
    pub city: String,
    /// Median of household median income.
    pub median_income: f64,
    /// Sum of total crimes.
    pub total_crimes: u64,
    /// Mean household count.
    pub mean_households: f64,
    /// `total_crimes / mean_households`, or 0 when there are no households.
    pub crime_rate_per_household: f64,
    /// Crime rate min-max scaled across cities into `[0, 1]`.
    pub crime_intensity: f64,
}

/// Crime intensity bars plus the color scale domain.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrimeIntensity {
    /// One row per city.
    pub rows: Vec<CrimeIntensityRow>,
    /// `(min, max)` crime rate, `None` when there are no rows.
    pub rate_domain: Option<(f64, f64)>,
}

/// One month of a city's crime series, optionally carrying an income point.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTrendPoint {
    /// City name.
    pub city: String,
    /// Month key (`YYYY-MM`).
    pub year_month: YearMonth,
    /// Sum of total crimes for the month.
    pub total_crimes: u64,
    /// Monthly total min-max scaled within the city.
    pub total_crimes_norm: f64,
    /// Yearly median income, only on January of a year whose income changed.
    pub median_income: Option<f64>,
    /// Yearly median income min-max scaled within the city.
    pub median_income_norm: Option<f64>,
}

/// Tables backing the key insights page.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyInsightsPage {
    /// Crime vs median income scatter.
    pub city_summary: Vec<CitySummary>,
    /// Crime rate per household bars with the income line.
    pub crime_intensity: CrimeIntensity,
    /// Faceted monthly crime and income trend.
    pub monthly_trend: Vec<MonthlyTrendPoint>,
}

// ── Crime ───────────────────────────────────────────────────────────────

/// Crime total for a city in one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrimeTrendPoint {
    /// Month key (`YYYY-MM`).
    pub year_month: YearMonth,
    /// City name.
    pub city: String,
    /// Sum of total crimes.
    pub total_crimes: u64,
}

/// Crime total for a city in a calendar month, across years.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyHeatmapCell {
    /// Calendar month (1-12).
    pub month: u8,
    /// City name.
    pub city: String,
    /// Sum of total crimes.
    pub total_crimes: u64,
    /// Total min-max scaled within the city.
    pub normalized_crimes: f64,
}

/// Crime total for one city and offense category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CityCategoryCount {
    /// City name.
    pub city: String,
    /// Offense category.
    pub offense_category: String,
    /// Sum of total crimes.
    pub total_crimes: u64,
}

/// Offense category by city table of summed crimes.
///
/// `cells[i][j]` is the total for `offense_categories[i]` in `cities[j]`;
/// combinations with no records hold 0.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PivotTable {
    /// Row labels, ascending.
    pub offense_categories: Vec<String>,
    /// Column labels, ascending.
    pub cities: Vec<String>,
    /// Row-major cell values.
    pub cells: Vec<Vec<u64>>,
}

impl PivotTable {
    /// The cell for `offense_category` and `city`, if both labels exist.
    #[must_use]
    pub fn get(&self, offense_category: &str, city: &str) -> Option<u64> {
        let row = self
            .offense_categories
            .iter()
            .position(|c| c == offense_category)?;
        let col = self.cities.iter().position(|c| c == city)?;
        Some(self.cells[row][col])
    }

    /// Sum of every cell.
    #[must_use]
    pub fn grand_total(&self) -> u64 {
        self.cells.iter().flatten().sum()
    }

    /// Whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.offense_categories.is_empty()
    }
}

/// Tables backing the crime analysis page.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrimePage {
    /// Crime trend over time by city.
    pub crime_trend: Vec<CrimeTrendPoint>,
    /// Crime intensity by month, normalized per city.
    pub monthly_heatmap: Vec<MonthlyHeatmapCell>,
    /// Total crime by city, stacked by offense category.
    pub by_city_category: Vec<CityCategoryCount>,
    /// Offense category by city table.
    pub category_table: PivotTable,
}

// ── Income ──────────────────────────────────────────────────────────────

/// Median income for a city in one year.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeGrowthPoint {
    /// Calendar year.
    pub year: i32,
    /// City name.
    pub city: String,
    /// Median of household median income.
    pub median_income: f64,
}

/// Mean share of a city's households in one income bracket.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketShare {
    /// City name.
    pub city: String,
    /// Income bracket.
    pub bracket: IncomeBracket,
    /// Mean percentage as a fraction (`12.5%` is `0.125`).
    pub percentage: f64,
}

/// Mean income alongside mean household count for a city.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeHouseholdSummary {
    /// City name.
    pub city: String,
    /// Mean of household median income.
    pub mean_income: f64,
    /// Mean household count.
    pub mean_households: f64,
}

/// Box plot statistics of household median income for a city.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeBoxStats {
    /// City name.
    pub city: String,
    /// Smallest value.
    pub min: f64,
    /// First quartile.
    pub q1: f64,
    /// Median.
    pub median: f64,
    /// Third quartile.
    pub q3: f64,
    /// Largest value.
    pub max: f64,
    /// Smallest value within 1.5 IQR below `q1`.
    pub lower_whisker: f64,
    /// Largest value within 1.5 IQR above `q3`.
    pub upper_whisker: f64,
    /// Values beyond the whiskers, ascending.
    pub outliers: Vec<f64>,
}

/// Tables backing the income analysis page.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomePage {
    /// Income growth over time.
    pub income_growth: Vec<IncomeGrowthPoint>,
    /// Income distribution heatmap.
    pub bracket_distribution: Vec<BracketShare>,
    /// Mean income vs household count.
    pub income_households: Vec<IncomeHouseholdSummary>,
    /// Income inequality box plot.
    pub income_box_stats: Vec<IncomeBoxStats>,
}

// ── Heatmaps ────────────────────────────────────────────────────────────

/// Initial camera position for a city map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapView {
    /// Center latitude.
    pub latitude: f64,
    /// Center longitude.
    pub longitude: f64,
    /// Zoom level.
    pub zoom: f64,
}

/// Crime weight at a ZIP centroid.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrimePoint {
    /// ZIP code.
    pub zip: String,
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
    /// Sum of total crimes.
    pub total_crimes: u64,
}

/// Income weight at a ZIP centroid.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomePoint {
    /// ZIP code.
    pub zip: String,
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
    /// Mean of household median income.
    pub median_income: f64,
}

/// Paired crime and income heatmap layers for one city.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CityGeoLayers {
    /// City name.
    pub city: String,
    /// Initial map camera.
    pub view: MapView,
    /// Crime weights per ZIP centroid.
    pub crime_points: Vec<CrimePoint>,
    /// Income weights, only for ZIPs with at least one recorded crime.
    pub income_points: Vec<IncomePoint>,
}

/// Tables backing the geographic heatmaps page.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapsPage {
    /// One entry per city in the filtered view.
    pub cities: Vec<CityGeoLayers>,
}
