//! Key insights page: crime vs income per city, crime intensity, and the
//! monthly crime and income trend.

use std::collections::BTreeMap;

use income_crime_analytics_models::{
    CitySummary, CrimeIntensity, CrimeIntensityRow, KeyInsightsPage, MonthlyTrendPoint,
};
use income_crime_dataset_models::YearMonth;

use super::{group_by, sum_crimes_by};
use crate::filter::FilteredView;
use crate::stats::{mean, median, min_max_normalize, min_max_normalize_within};

/// Per-city total crimes, median income, and mean household count.
#[must_use]
pub fn city_summary(view: &FilteredView<'_>) -> Vec<CitySummary> {
    group_by(view, |r| r.city.as_str())
        .into_iter()
        .map(|(city, records)| CitySummary {
            city: city.to_string(),
            total_crimes: records.iter().map(|r| r.total_crimes).sum(),
            median_income: median(records.iter().map(|r| r.median_income)),
            mean_households: mean(records.iter().map(|r| r.households)),
        })
        .collect()
}

/// Crime rate per household for each city, scaled across cities.
///
/// The rate is 0 for a city whose mean household count is not positive.
/// With fewer than two distinct rates every intensity is 0.
#[must_use]
pub fn crime_intensity(view: &FilteredView<'_>) -> CrimeIntensity {
    let summaries = city_summary(view);

    #[allow(clippy::cast_precision_loss)]
    let rates: Vec<f64> = summaries
        .iter()
        .map(|s| {
            if s.mean_households > 0.0 {
                s.total_crimes as f64 / s.mean_households
            } else {
                0.0
            }
        })
        .collect();

    let rate_domain = rates
        .iter()
        .copied()
        .fold(None, |domain: Option<(f64, f64)>, rate| {
            Some(domain.map_or((rate, rate), |(lo, hi)| (lo.min(rate), hi.max(rate))))
        });

    let rows = summaries
        .into_iter()
        .zip(rates.iter().copied().zip(min_max_normalize(&rates)))
        .map(|(s, (rate, intensity))| CrimeIntensityRow {
            city: s.city,
            median_income: s.median_income,
            total_crimes: s.total_crimes,
            mean_households: s.mean_households,
            crime_rate_per_household: rate,
            crime_intensity: intensity,
        })
        .collect();

    CrimeIntensity { rows, rate_domain }
}

/// Monthly crime totals per city with yearly income points attached.
///
/// A city's yearly median income appears on the January row of a year only
/// when it differs from the previous year's; the first year never carries
/// one. Years whose income did not change are left blank rather than
/// carried forward. Crime totals and incomes are each scaled within their
/// city.
#[must_use]
pub fn monthly_trend(view: &FilteredView<'_>) -> Vec<MonthlyTrendPoint> {
    let crimes = sum_crimes_by(view, |r| (r.city.as_str(), r.year_month()));

    let yearly_income: BTreeMap<(&str, i32), f64> =
        group_by(view, |r| (r.city.as_str(), r.year))
            .into_iter()
            .map(|(key, records)| (key, median(records.iter().map(|r| r.median_income))))
            .collect();
    let income_keys: Vec<&str> = yearly_income.keys().map(|(city, _)| *city).collect();
    let income_values: Vec<f64> = yearly_income.values().copied().collect();
    let income_norm = min_max_normalize_within(&income_keys, &income_values);

    let mut changed: BTreeMap<(&str, YearMonth), (f64, f64)> = BTreeMap::new();
    let mut previous: Option<(&str, f64)> = None;
    for (((city, year), income), norm) in yearly_income.iter().zip(income_norm) {
        let change = match previous {
            Some((prev_city, prev_income)) if prev_city == *city => *income - prev_income,
            _ => 0.0,
        };
        if change != 0.0 && !change.is_nan() {
            changed.insert((*city, YearMonth::january(*year)), (*income, norm));
        }
        previous = Some((*city, *income));
    }

    let crime_keys: Vec<&str> = crimes.keys().map(|(city, _)| *city).collect();
    #[allow(clippy::cast_precision_loss)]
    let crime_values: Vec<f64> = crimes.values().map(|&total| total as f64).collect();
    let crime_norm = min_max_normalize_within(&crime_keys, &crime_values);

    crimes
        .into_iter()
        .zip(crime_norm)
        .map(|((key @ (city, year_month), total_crimes), total_crimes_norm)| {
            let income = changed.get(&key);
            MonthlyTrendPoint {
                city: city.to_string(),
                year_month,
                total_crimes,
                total_crimes_norm,
                median_income: income.map(|(value, _)| *value),
                median_income_norm: income.map(|(_, norm)| *norm),
            }
        })
        .collect()
}

/// Every table on the key insights page.
#[must_use]
pub fn page(view: &FilteredView<'_>) -> KeyInsightsPage {
    KeyInsightsPage {
        city_summary: city_summary(view),
        crime_intensity: crime_intensity(view),
        monthly_trend: monthly_trend(view),
    }
}
