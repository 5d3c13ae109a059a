//! Record and dataset builders shared by the unit tests.

use income_crime_analytics_models::FilterState;
use income_crime_dataset_models::{BRACKET_COUNT, Dataset, Record};

/// A record with neutral geography and income values.
pub fn record(city: &str, year: i32, month: u8, category: &str, total_crimes: u64) -> Record {
    Record {
        city: city.to_string(),
        year,
        month,
        zip: "00000".to_string(),
        latitude: 0.0,
        longitude: 0.0,
        offense_category: category.to_string(),
        total_crimes,
        households: 100.0,
        median_income: 50_000.0,
        brackets: [10.0; BRACKET_COUNT],
    }
}

/// Two cities over 2017-2018, four months a year, two ZIPs per city and
/// two offense categories.
pub fn chicago_seattle() -> Dataset {
    let cities = [
        ("Chicago", [("60601", 41.886, -87.622), ("60614", 41.922, -87.652)], 60_000.0),
        ("Seattle", [("98101", 47.611, -122.337), ("98122", 47.611, -122.305)], 90_000.0),
    ];

    let mut records = Vec::new();
    for (city, zips, base_income) in cities {
        for year in [2017, 2018] {
            for month in [1, 4, 7, 10] {
                for (z, (zip, latitude, longitude)) in zips.iter().enumerate() {
                    for (c, category) in ["Theft", "Assault"].iter().enumerate() {
                        let z = u32::try_from(z).unwrap_or_default();
                        let c = u32::try_from(c).unwrap_or_default();
                        records.push(Record {
                            zip: (*zip).to_string(),
                            latitude: *latitude,
                            longitude: *longitude,
                            households: f64::from(1_000 + 500 * z),
                            median_income: base_income
                                + f64::from(year - 2017) * 2_000.0
                                + f64::from(z) * 5_000.0,
                            ..record(
                                city,
                                year,
                                month,
                                category,
                                u64::from(month) + u64::from(z * 3 + c * 2),
                            )
                        });
                    }
                }
            }
        }
    }

    Dataset::from_records(records).unwrap()
}

/// The default filter state for `dataset`.
pub fn state_for(dataset: &Dataset) -> FilterState {
    FilterState::defaults_for(dataset)
}
