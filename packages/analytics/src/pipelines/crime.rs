//! Crime analysis page.

use std::collections::BTreeSet;

use income_crime_analytics_models::{
    CityCategoryCount, CrimePage, CrimeTrendPoint, MonthlyHeatmapCell, PivotTable,
};

use super::sum_crimes_by;
use crate::filter::FilteredView;
use crate::stats::min_max_normalize_within;

/// Monthly crime totals per city, ordered by month then city.
#[must_use]
pub fn crime_trend(view: &FilteredView<'_>) -> Vec<CrimeTrendPoint> {
    sum_crimes_by(view, |r| (r.year_month(), r.city.as_str()))
        .into_iter()
        .map(|((year_month, city), total_crimes)| CrimeTrendPoint {
            year_month,
            city: city.to_string(),
            total_crimes,
        })
        .collect()
}

/// Crime totals per calendar month and city, scaled within each city.
#[must_use]
pub fn monthly_heatmap(view: &FilteredView<'_>) -> Vec<MonthlyHeatmapCell> {
    let totals = sum_crimes_by(view, |r| (r.month, r.city.as_str()));

    let cities: Vec<&str> = totals.keys().map(|(_, city)| *city).collect();
    #[allow(clippy::cast_precision_loss)]
    let values: Vec<f64> = totals.values().map(|&total| total as f64).collect();
    let normalized = min_max_normalize_within(&cities, &values);

    totals
        .into_iter()
        .zip(normalized)
        .map(|(((month, city), total_crimes), normalized_crimes)| MonthlyHeatmapCell {
            month,
            city: city.to_string(),
            total_crimes,
            normalized_crimes,
        })
        .collect()
}

/// Crime totals per city and offense category.
#[must_use]
pub fn by_city_category(view: &FilteredView<'_>) -> Vec<CityCategoryCount> {
    sum_crimes_by(view, |r| (r.city.as_str(), r.offense_category.as_str()))
        .into_iter()
        .map(|((city, offense_category), total_crimes)| CityCategoryCount {
            city: city.to_string(),
            offense_category: offense_category.to_string(),
            total_crimes,
        })
        .collect()
}

/// Offense category by city table of crime totals.
///
/// Rows and columns are sorted; combinations with no records hold 0, so the
/// cells sum to the view's total crimes.
#[must_use]
pub fn category_pivot(view: &FilteredView<'_>) -> PivotTable {
    let totals = sum_crimes_by(view, |r| (r.offense_category.as_str(), r.city.as_str()));

    let categories: BTreeSet<&str> = totals.keys().map(|(category, _)| *category).collect();
    let cities: BTreeSet<&str> = totals.keys().map(|(_, city)| *city).collect();

    let cells: Vec<Vec<u64>> = categories
        .iter()
        .map(|category| {
            cities
                .iter()
                .map(|city| totals.get(&(*category, *city)).copied().unwrap_or(0))
                .collect()
        })
        .collect();

    PivotTable {
        offense_categories: categories.into_iter().map(str::to_string).collect(),
        cities: cities.into_iter().map(str::to_string).collect(),
        cells,
    }
}

/// Every table on the crime analysis page.
#[must_use]
pub fn page(view: &FilteredView<'_>) -> CrimePage {
    CrimePage {
        crime_trend: crime_trend(view),
        monthly_heatmap: monthly_heatmap(view),
        by_city_category: by_city_category(view),
        category_table: category_pivot(view),
    }
}

#[cfg(test)]
mod tests {
    use income_crime_analytics_models::OffenseCategoryFilter;
    use income_crime_dataset_models::YearMonth;

    use super::*;
    use crate::filter::apply;
    use crate::fixtures::{chicago_seattle, record, state_for};

    #[test]
    fn pivot_sums_to_view_total() {
        let dataset = chicago_seattle();
        let mut state = state_for(&dataset);
        state.year_range = (2017, 2018);
        let view = apply(dataset.records(), &state);
        let table = category_pivot(&view);

        assert_eq!(table.grand_total(), view.total_crimes());
        assert_eq!(table.offense_categories, ["Assault", "Theft"]);
        assert_eq!(table.cities, ["Chicago", "Seattle"]);
    }

    #[test]
    fn pivot_fills_missing_combinations_with_zero() {
        let records = vec![
            record("Chicago", 2018, 1, "Theft", 5),
            record("Seattle", 2018, 1, "Assault", 2),
            record("Seattle", 2018, 2, "Assault", 3),
        ];
        let dataset = income_crime_dataset_models::Dataset::from_records(records).unwrap();
        let view = apply(dataset.records(), &state_for(&dataset));
        let table = category_pivot(&view);

        assert_eq!(table.get("Theft", "Seattle"), Some(0));
        assert_eq!(table.get("Assault", "Chicago"), Some(0));
        assert_eq!(table.get("Assault", "Seattle"), Some(5));
        assert_eq!(table.grand_total(), 10);
    }

    #[test]
    fn trend_is_ordered_by_month_then_city() {
        let records = vec![
            record("Seattle", 2018, 2, "Theft", 1),
            record("Chicago", 2018, 2, "Theft", 2),
            record("Chicago", 2018, 1, "Theft", 3),
            record("Chicago", 2018, 1, "Assault", 4),
        ];
        let dataset = income_crime_dataset_models::Dataset::from_records(records).unwrap();
        let trend = crime_trend(&apply(dataset.records(), &state_for(&dataset)));

        let keys: Vec<(YearMonth, &str, u64)> = trend
            .iter()
            .map(|p| (p.year_month, p.city.as_str(), p.total_crimes))
            .collect();
        assert_eq!(
            keys,
            [
                (YearMonth::new(2018, 1), "Chicago", 7),
                (YearMonth::new(2018, 2), "Chicago", 2),
                (YearMonth::new(2018, 2), "Seattle", 1),
            ]
        );
    }

    #[test]
    fn heatmap_normalizes_within_city() {
        let records = vec![
            record("Chicago", 2018, 1, "Theft", 10),
            record("Chicago", 2018, 2, "Theft", 20),
            record("Seattle", 2018, 1, "Theft", 500),
        ];
        let dataset = income_crime_dataset_models::Dataset::from_records(records).unwrap();
        let cells = monthly_heatmap(&apply(dataset.records(), &state_for(&dataset)));

        let cell = |month: u8, city: &str| {
            cells
                .iter()
                .find(|c| c.month == month && c.city == city)
                .unwrap()
                .normalized_crimes
        };
        assert!(cell(1, "Chicago").abs() < f64::EPSILON);
        assert!((cell(2, "Chicago") - 1.0).abs() < f64::EPSILON);
        assert!(cell(1, "Seattle").abs() < f64::EPSILON);
    }

    #[test]
    fn heatmap_merges_years() {
        let records = vec![
            record("Chicago", 2018, 3, "Theft", 10),
            record("Chicago", 2019, 3, "Theft", 5),
        ];
        let dataset = income_crime_dataset_models::Dataset::from_records(records).unwrap();
        let mut state = state_for(&dataset);
        state.year_range = (2018, 2019);
        let cells = monthly_heatmap(&apply(dataset.records(), &state));

        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].total_crimes, 15);
    }

    #[test]
    fn city_category_counts_follow_category_filter() {
        let dataset = chicago_seattle();
        let mut state = state_for(&dataset);
        state.offense_category = OffenseCategoryFilter::Category("Theft".to_string());
        let counts = by_city_category(&apply(dataset.records(), &state));

        assert_eq!(counts.len(), 2);
        assert!(counts.iter().all(|c| c.offense_category == "Theft"));
    }

    #[test]
    fn empty_view_yields_empty_page() {
        let page = page(&FilteredView::default());
        assert!(page.crime_trend.is_empty());
        assert!(page.monthly_heatmap.is_empty());
        assert!(page.by_city_category.is_empty());
        assert!(page.category_table.is_empty());
        assert_eq!(page.category_table.grand_total(), 0);
    }
}
