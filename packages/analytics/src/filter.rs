//! The filter engine.
//!
//! A record passes when its year and month fall inside the selected ranges,
//! its city is selected, and its offense category matches. The view keeps
//! borrowed records in source order.

use income_crime_analytics_models::FilterState;
use income_crime_dataset_models::Record;

type Predicate = fn(&Record, &FilterState) -> bool;

const PREDICATES: [Predicate; 4] = [
    in_year_range,
    in_month_range,
    in_selected_cities,
    in_offense_category,
];

/// Whether the record's year lies in the inclusive year range.
#[must_use]
pub fn in_year_range(record: &Record, state: &FilterState) -> bool {
    (state.year_range.0..=state.year_range.1).contains(&record.year)
}

/// Whether the record's month lies in the inclusive month range.
#[must_use]
pub fn in_month_range(record: &Record, state: &FilterState) -> bool {
    (state.month_range.0..=state.month_range.1).contains(&record.month)
}

/// Whether the record's city is selected.
#[must_use]
pub fn in_selected_cities(record: &Record, state: &FilterState) -> bool {
    state.selected_cities.contains(&record.city)
}

/// Whether the record's offense category passes the category filter.
#[must_use]
pub fn in_offense_category(record: &Record, state: &FilterState) -> bool {
    state.offense_category.matches(&record.offense_category)
}

/// The records that passed a filter, in source order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilteredView<'a> {
    records: Vec<&'a Record>,
}

impl<'a> FilteredView<'a> {
    /// The matching records.
    #[must_use]
    pub fn records(&self) -> &[&'a Record] {
        &self.records
    }

    /// Iterates over the matching records.
    pub fn iter(&self) -> impl Iterator<Item = &'a Record> + '_ {
        self.records.iter().copied()
    }

    /// Number of matching records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no record matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sum of total crimes over the view.
    #[must_use]
    pub fn total_crimes(&self) -> u64 {
        self.iter().map(|r| r.total_crimes).sum()
    }

    /// The first `n` matching records.
    #[must_use]
    pub fn head(&self, n: usize) -> &[&'a Record] {
        &self.records[..n.min(self.records.len())]
    }
}

fn apply_with<'a>(
    records: &'a [Record],
    state: &FilterState,
    predicates: &[Predicate],
) -> FilteredView<'a> {
    FilteredView {
        records: records
            .iter()
            .filter(|record| predicates.iter().all(|p| p(record, state)))
            .collect(),
    }
}

/// Returns the records matching every dimension of `state`.
///
/// An empty city selection matches nothing.
#[must_use]
pub fn apply<'a>(records: &'a [Record], state: &FilterState) -> FilteredView<'a> {
    let view = apply_with(records, state, &PREDICATES);
    log::debug!(
        "Filter matched {} of {} records (years {:?}, months {:?}, {} cities, {})",
        view.len(),
        records.len(),
        state.year_range,
        state.month_range,
        state.selected_cities.len(),
        state.offense_category,
    );
    view
}
