//! Income analysis page.

use income_crime_analytics_models::{
    BracketShare, IncomeBoxStats, IncomeGrowthPoint, IncomeHouseholdSummary, IncomePage,
};
use income_crime_dataset_models::IncomeBracket;

use super::group_by;
use crate::filter::FilteredView;
use crate::stats::{box_summary, mean, median};

/// Median household income per year and city.
#[must_use]
pub fn income_growth(view: &FilteredView<'_>) -> Vec<IncomeGrowthPoint> {
    group_by(view, |r| (r.year, r.city.as_str()))
        .into_iter()
        .map(|((year, city), records)| IncomeGrowthPoint {
            year,
            city: city.to_string(),
            median_income: median(records.iter().map(|r| r.median_income)),
        })
        .collect()
}

/// Mean household share per city and income bracket, as a fraction.
///
/// Rows are ordered by city, then by bracket in ascending income order.
#[must_use]
pub fn bracket_distribution(view: &FilteredView<'_>) -> Vec<BracketShare> {
    group_by(view, |r| r.city.as_str())
        .into_iter()
        .flat_map(|(city, records)| {
            IncomeBracket::ALL.into_iter().map(move |bracket| BracketShare {
                city: city.to_string(),
                bracket,
                percentage: mean(records.iter().map(|r| r.bracket(bracket))) / 100.0,
            })
        })
        .collect()
}

/// Mean income and mean household count per city.
#[must_use]
pub fn income_households(view: &FilteredView<'_>) -> Vec<IncomeHouseholdSummary> {
    group_by(view, |r| r.city.as_str())
        .into_iter()
        .map(|(city, records)| IncomeHouseholdSummary {
            city: city.to_string(),
            mean_income: mean(records.iter().map(|r| r.median_income)),
            mean_households: mean(records.iter().map(|r| r.households)),
        })
        .collect()
}

/// Box plot statistics of household median income per city.
///
/// Cities with no known income are omitted.
#[must_use]
pub fn income_box_stats(view: &FilteredView<'_>) -> Vec<IncomeBoxStats> {
    group_by(view, |r| r.city.as_str())
        .into_iter()
        .filter_map(|(city, records)| {
            let summary = box_summary(records.iter().map(|r| r.median_income))?;
            Some(IncomeBoxStats {
                city: city.to_string(),
                min: summary.min,
                q1: summary.q1,
                median: summary.median,
                q3: summary.q3,
                max: summary.max,
                lower_whisker: summary.lower_whisker,
                upper_whisker: summary.upper_whisker,
                outliers: summary.outliers,
            })
        })
        .collect()
}

/// Every table on the income analysis page.
#[must_use]
pub fn page(view: &FilteredView<'_>) -> IncomePage {
    IncomePage {
        income_growth: income_growth(view),
        bracket_distribution: bracket_distribution(view),
        income_households: income_households(view),
        income_box_stats: income_box_stats(view),
    }
}
