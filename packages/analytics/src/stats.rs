//! Descriptive statistics and min-max normalization.
//!
//! NaN values (NULL measures in the source) are skipped by every statistic,
//! matching DataFrame semantics. Normalization never produces NaN or
//! infinity: degenerate groups and non-finite inputs map to 0.

use std::cmp::Ordering;
use std::collections::BTreeMap;

/// An `f64` with a total order, usable as a map key.
#[derive(Debug, Clone, Copy)]
pub struct OrderedF64(pub f64);

impl PartialEq for OrderedF64 {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OrderedF64 {}

impl PartialOrd for OrderedF64 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrderedF64 {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

fn non_nan_sorted(values: impl IntoIterator<Item = f64>) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.into_iter().filter(|v| !v.is_nan()).collect();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Arithmetic mean of the non-NaN values, or NaN if there are none.
#[allow(clippy::cast_precision_loss)]
pub fn mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, count) = values
        .into_iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 { f64::NAN } else { sum / count as f64 }
}

/// Median of the non-NaN values, or NaN if there are none.
pub fn median(values: impl IntoIterator<Item = f64>) -> f64 {
    quantile(&non_nan_sorted(values), 0.5)
}

/// Linear-interpolated quantile of an ascending slice, or NaN if empty.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

/// Five-number summary with Tukey whiskers.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxSummary {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub lower_whisker: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

/// Box plot statistics of the non-NaN values, or `None` if there are none.
///
/// Whiskers end at the most extreme values within 1.5 IQR of the box.
pub fn box_summary(values: impl IntoIterator<Item = f64>) -> Option<BoxSummary> {
    let sorted = non_nan_sorted(values);
    let (&min, &max) = (sorted.first()?, sorted.last()?);

    let q1 = quantile(&sorted, 0.25);
    let q3 = quantile(&sorted, 0.75);
    let iqr = q3 - q1;
    let (low_fence, high_fence) = (1.5f64.mul_add(-iqr, q1), 1.5f64.mul_add(iqr, q3));

    let inside = || sorted.iter().copied().filter(|v| (low_fence..=high_fence).contains(v));
    let lower_whisker = inside().next().unwrap_or(q1);
    let upper_whisker = inside().last().unwrap_or(q3);
    let outliers = sorted
        .iter()
        .copied()
        .filter(|v| !(low_fence..=high_fence).contains(v))
        .collect();

    Some(BoxSummary {
        min,
        q1,
        median: quantile(&sorted, 0.5),
        q3,
        max,
        lower_whisker,
        upper_whisker,
        outliers,
    })
}

/// Min-max scales `values` into `[0, 1]`.
///
/// The range is taken over the finite values. Non-finite values, and every
/// value of a degenerate range (max equal to min), map to 0.
pub fn min_max_normalize(values: &[f64]) -> Vec<f64> {
    let (min, max) = values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    let range = max - min;

    values
        .iter()
        .map(|&v| {
            if v.is_finite() && range.is_finite() && range > 0.0 {
                (v - min) / range
            } else {
                0.0
            }
        })
        .collect()
}

/// Min-max scales `values` separately within each group of equal `keys`,
/// returning results in input order.
pub fn min_max_normalize_within<K: Ord>(keys: &[K], values: &[f64]) -> Vec<f64> {
    let mut groups: BTreeMap<&K, Vec<usize>> = BTreeMap::new();
    for (i, key) in keys.iter().enumerate() {
        groups.entry(key).or_default().push(i);
    }

    let mut normalized = vec![0.0; values.len()];
    for indices in groups.values() {
        let group: Vec<f64> = indices.iter().map(|&i| values[i]).collect();
        for (&i, v) in indices.iter().zip(min_max_normalize(&group)) {
            normalized[i] = v;
        }
    }
    normalized
}
