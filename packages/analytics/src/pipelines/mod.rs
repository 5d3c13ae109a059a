//! Aggregation pipelines, one module per dashboard page.
//!
//! Every pipeline is a pure function of a [`FilteredView`]. Empty views
//! produce empty tables, and grouped output is ordered by ascending group
//! key unless a function says otherwise.

pub mod crime;
pub mod geo;
pub mod income;
pub mod key_insights;

use std::collections::BTreeMap;

use income_crime_dataset_models::Record;

use crate::filter::FilteredView;

/// Groups the view's records by `key`, in ascending key order.
fn group_by<'a, K: Ord>(
    view: &FilteredView<'a>,
    key: impl Fn(&'a Record) -> K,
) -> BTreeMap<K, Vec<&'a Record>> {
    let mut groups: BTreeMap<K, Vec<&'a Record>> = BTreeMap::new();
    for record in view.iter() {
        groups.entry(key(record)).or_default().push(record);
    }
    groups
}

/// Sums total crimes per `key`, in ascending key order.
fn sum_crimes_by<'a, K: Ord>(
    view: &FilteredView<'a>,
    key: impl Fn(&'a Record) -> K,
) -> BTreeMap<K, u64> {
    let mut totals: BTreeMap<K, u64> = BTreeMap::new();
    for record in view.iter() {
        *totals.entry(key(record)).or_default() += record.total_crimes;
    }
    totals
}
