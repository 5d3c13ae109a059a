//! Plain-text summaries printed by the interactive session.

use income_crime_analytics::DashboardSession;
use income_crime_analytics_models::{CrimePage, HeatmapsPage, IncomePage, KeyInsightsPage};
use income_crime_dataset_models::Record;

/// Rows shown per table before eliding the rest.
const MAX_ROWS: usize = 12;

fn money(value: f64) -> String {
    if value.is_finite() {
        format!("${value:.0}")
    } else {
        "-".to_string()
    }
}

fn number(value: f64) -> String {
    if value.is_finite() {
        format!("{value:.2}")
    } else {
        "-".to_string()
    }
}

fn elided(total: usize) {
    if total > MAX_ROWS {
        println!("  ... {} more", total - MAX_ROWS);
    }
}

/// Prints the active filters and the size of the filtered view.
pub fn status(session: &DashboardSession) {
    let state = session.state();
    let view = session.filtered();
    println!();
    println!(
        "Years {}-{}, months {}-{}, {} of {} cities, {}",
        state.year_range.0,
        state.year_range.1,
        state.month_range.0,
        state.month_range.1,
        state.selected_cities.len(),
        session.dataset().cities().len(),
        state.offense_category,
    );
    println!(
        "{} records match, {} crimes in total",
        view.len(),
        view.total_crimes()
    );
}

/// Prints the table preview.
pub fn preview(records: &[Record]) {
    if records.is_empty() {
        println!("No records match the current filters.");
        return;
    }
    println!(
        "{:<16} {:>4} {:>5} {:<8} {:<24} {:>7} {:>10}",
        "CITY", "YEAR", "MONTH", "ZIP", "CATEGORY", "CRIMES", "INCOME"
    );
    println!("{}", "-".repeat(80));
    for r in records {
        println!(
            "{:<16} {:>4} {:>5} {:<8} {:<24} {:>7} {:>10}",
            r.city,
            r.year,
            r.month,
            r.zip,
            r.offense_category,
            r.total_crimes,
            money(r.median_income),
        );
    }
}

/// Prints the key insights tables.
pub fn key_insights(page: &KeyInsightsPage) {
    println!();
    println!("Crime vs median income");
    println!("{:<20} {:>10} {:>12} {:>12}", "CITY", "CRIMES", "INCOME", "HOUSEHOLDS");
    for row in &page.city_summary {
        println!(
            "{:<20} {:>10} {:>12} {:>12}",
            row.city,
            row.total_crimes,
            money(row.median_income),
            number(row.mean_households),
        );
    }

    println!();
    println!("Crime intensity");
    println!("{:<20} {:>12} {:>10}", "CITY", "PER HOUSEHOLD", "INTENSITY");
    for row in &page.crime_intensity.rows {
        println!(
            "{:<20} {:>12} {:>10}",
            row.city,
            number(row.crime_rate_per_household),
            number(row.crime_intensity),
        );
    }

    let income_changes = page
        .monthly_trend
        .iter()
        .filter(|p| p.median_income.is_some())
        .count();
    println!();
    println!(
        "Monthly trend: {} points, {} with an income change",
        page.monthly_trend.len(),
        income_changes
    );
}

/// Prints the crime page tables.
pub fn crime(page: &CrimePage) {
    println!();
    println!("Crime by month");
    for point in page.crime_trend.iter().take(MAX_ROWS) {
        println!("  {} {:<20} {:>8}", point.year_month, point.city, point.total_crimes);
    }
    elided(page.crime_trend.len());

    let table = &page.category_table;
    println!();
    println!("Offense category by city");
    print!("{:<24}", "CATEGORY");
    for city in &table.cities {
        print!(" {city:>14}");
    }
    println!();
    for (category, row) in table.offense_categories.iter().zip(&table.cells) {
        print!("{category:<24}");
        for cell in row {
            print!(" {cell:>14}");
        }
        println!();
    }
    println!("Total: {}", table.grand_total());
}

/// Prints the income page tables.
pub fn income(page: &IncomePage) {
    println!();
    println!("Median income by year");
    for point in page.income_growth.iter().take(MAX_ROWS) {
        println!(
            "  {} {:<20} {:>12}",
            point.year,
            point.city,
            money(point.median_income)
        );
    }
    elided(page.income_growth.len());

    println!();
    println!("Income spread");
    println!(
        "{:<20} {:>10} {:>10} {:>10} {:>9}",
        "CITY", "Q1", "MEDIAN", "Q3", "OUTLIERS"
    );
    for stats in &page.income_box_stats {
        println!(
            "{:<20} {:>10} {:>10} {:>10} {:>9}",
            stats.city,
            money(stats.q1),
            money(stats.median),
            money(stats.q3),
            stats.outliers.len(),
        );
    }
}

/// Prints the heatmaps page summary.
pub fn heatmaps(page: &HeatmapsPage) {
    println!();
    println!(
        "{:<20} {:>12} {:>12} {:>20}",
        "CITY", "CRIME ZIPS", "INCOME ZIPS", "CENTER"
    );
    for layers in &page.cities {
        let center = format!("{:.3}, {:.3}", layers.view.latitude, layers.view.longitude);
        println!(
            "{:<20} {:>12} {:>12} {:>20}",
            layers.city,
            layers.crime_points.len(),
            layers.income_points.len(),
            center,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_values_render_as_dash() {
        assert_eq!(money(f64::NAN), "-");
        assert_eq!(number(f64::INFINITY), "-");
        assert_eq!(money(52_000.4), "$52000");
        assert_eq!(number(1.0 / 3.0), "0.33");
    }
}
