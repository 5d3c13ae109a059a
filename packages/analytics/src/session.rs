//! Per-caller dashboard session.
//!
//! A [`DashboardSession`] pairs the shared, immutable dataset with one
//! caller's filter state. Every read recomputes the filtered view and the
//! requested tables from scratch.

use std::collections::BTreeSet;
use std::sync::Arc;

use income_crime_analytics_models::{
    ALL_CATEGORIES, CrimePage, FilterOptions, FilterState, HeatmapsPage, IncomePage,
    KeyInsightsPage, OffenseCategoryFilter,
};
use income_crime_dataset_models::{Dataset, Record};

use crate::AnalyticsError;
use crate::filter::{FilteredView, apply};
use crate::pipelines::{crime, geo, income, key_insights};

/// Number of records shown by the table preview.
pub const DEFAULT_PREVIEW_ROWS: usize = 5;

/// The dataset plus one caller's filter selections.
#[derive(Debug, Clone)]
pub struct DashboardSession {
    dataset: Arc<Dataset>,
    defaults: FilterState,
    state: FilterState,
    show_table: bool,
}

impl DashboardSession {
    /// Starts a session at the dataset's default filters.
    #[must_use]
    pub fn new(dataset: Arc<Dataset>) -> Self {
        let defaults = FilterState::defaults_for(&dataset);
        Self {
            dataset,
            state: defaults.clone(),
            defaults,
            show_table: false,
        }
    }

    /// The underlying dataset.
    #[must_use]
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// The current filter state.
    #[must_use]
    pub const fn state(&self) -> &FilterState {
        &self.state
    }

    /// The filter state restored by [`Self::reset`].
    #[must_use]
    pub const fn defaults(&self) -> &FilterState {
        &self.defaults
    }

    /// Control bounds and options.
    #[must_use]
    pub fn filter_options(&self) -> FilterOptions {
        FilterOptions {
            year_bounds: self.dataset.year_bounds(),
            month_bounds: self.dataset.month_bounds(),
            cities: self.dataset.cities().to_vec(),
            offense_categories: std::iter::once(ALL_CATEGORIES.to_string())
                .chain(self.dataset.offense_categories().iter().cloned())
                .collect(),
            defaults: self.defaults.clone(),
        }
    }

    fn validate(&self, state: &FilterState) -> Result<(), AnalyticsError> {
        let (min_year, max_year) = state.year_range;
        if min_year > max_year {
            return Err(AnalyticsError::invalid_filter(format!(
                "year range {min_year}-{max_year} is reversed"
            )));
        }

        let (min_month, max_month) = state.month_range;
        if min_month > max_month {
            return Err(AnalyticsError::invalid_filter(format!(
                "month range {min_month}-{max_month} is reversed"
            )));
        }
        if !(1..=12).contains(&min_month) || !(1..=12).contains(&max_month) {
            return Err(AnalyticsError::invalid_filter(format!(
                "month range {min_month}-{max_month} is outside 1-12"
            )));
        }

        if let OffenseCategoryFilter::Category(category) = &state.offense_category
            && !self
                .dataset
                .offense_categories()
                .iter()
                .any(|c| c == category)
        {
            return Err(AnalyticsError::invalid_filter(format!(
                "unknown offense category {category:?}"
            )));
        }

        Ok(())
    }

    /// Replaces the whole filter state.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::InvalidFilter`] and keeps the current state
    /// if any dimension is invalid.
    pub fn apply_state(&mut self, state: FilterState) -> Result<(), AnalyticsError> {
        self.validate(&state)?;
        self.state = state;
        Ok(())
    }

    fn update(&mut self, change: impl FnOnce(&mut FilterState)) -> Result<(), AnalyticsError> {
        let mut state = self.state.clone();
        change(&mut state);
        self.apply_state(state)
    }

    /// Sets the inclusive year range.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::InvalidFilter`] if `min > max`.
    pub fn set_year_range(&mut self, min: i32, max: i32) -> Result<(), AnalyticsError> {
        self.update(|state| state.year_range = (min, max))
    }

    /// Sets the inclusive month range.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::InvalidFilter`] if `min > max` or either
    /// month is outside 1-12.
    pub fn set_month_range(&mut self, min: u8, max: u8) -> Result<(), AnalyticsError> {
        self.update(|state| state.month_range = (min, max))
    }

    /// Sets the selected cities. An empty selection is valid and matches
    /// nothing.
    pub fn set_cities(&mut self, cities: impl IntoIterator<Item = String>) {
        self.state.selected_cities = cities.into_iter().collect::<BTreeSet<_>>();
    }

    /// Sets the offense category filter.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::InvalidFilter`] if the category does not
    /// occur in the dataset.
    pub fn set_offense_category(
        &mut self,
        category: OffenseCategoryFilter,
    ) -> Result<(), AnalyticsError> {
        self.update(|state| state.offense_category = category)
    }

    /// Whether the table preview is shown.
    #[must_use]
    pub const fn show_table(&self) -> bool {
        self.show_table
    }

    /// Shows or hides the table preview.
    pub const fn set_show_table(&mut self, show: bool) {
        self.show_table = show;
    }

    /// Restores every filter to its default.
    pub fn reset(&mut self) {
        log::debug!("Resetting filters to defaults");
        self.state = self.defaults.clone();
    }

    /// The records matching the current filters.
    #[must_use]
    pub fn filtered(&self) -> FilteredView<'_> {
        apply(self.dataset.records(), &self.state)
    }

    /// The first `rows` matching records.
    #[must_use]
    pub fn preview(&self, rows: usize) -> Vec<Record> {
        self.filtered()
            .head(rows)
            .iter()
            .map(|record| (*record).clone())
            .collect()
    }

    /// Tables for the key insights page.
    #[must_use]
    pub fn key_insights(&self) -> KeyInsightsPage {
        log::debug!("Computing key insights page");
        key_insights::page(&self.filtered())
    }

    /// Tables for the crime analysis page.
    #[must_use]
    pub fn crime_page(&self) -> CrimePage {
        log::debug!("Computing crime page");
        crime::page(&self.filtered())
    }

    /// Tables for the income analysis page.
    #[must_use]
    pub fn income_page(&self) -> IncomePage {
        log::debug!("Computing income page");
        income::page(&self.filtered())
    }

    /// Tables for the geographic heatmaps page.
    #[must_use]
    pub fn heatmaps_page(&self) -> HeatmapsPage {
        log::debug!("Computing heatmaps page");
        geo::page(&self.filtered())
    }
}
