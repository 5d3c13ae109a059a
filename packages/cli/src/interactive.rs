//! Interactive dashboard session.
//!
//! Provides a menu-driven interface using `dialoguer` for adjusting the
//! filters and viewing page summaries without memorizing CLI flags.

use std::sync::Arc;

use dialoguer::{Confirm, Input, MultiSelect, Select};
use income_crime_analytics::{DEFAULT_PREVIEW_ROWS, DashboardSession};
use income_crime_analytics_models::OffenseCategoryFilter;
use income_crime_dataset::DatasetCache;
use income_crime_dataset::progress::null_progress;

use crate::render;

/// Actions available in the session menu.
enum Action {
    YearRange,
    MonthRange,
    Cities,
    OffenseCategory,
    ToggleTable,
    Reset,
    KeyInsights,
    Crime,
    Income,
    Heatmaps,
    Serve,
    Quit,
}

impl Action {
    const ALL: &[Self] = &[
        Self::YearRange,
        Self::MonthRange,
        Self::Cities,
        Self::OffenseCategory,
        Self::ToggleTable,
        Self::Reset,
        Self::KeyInsights,
        Self::Crime,
        Self::Income,
        Self::Heatmaps,
        Self::Serve,
        Self::Quit,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::YearRange => "Set year range",
            Self::MonthRange => "Set month range",
            Self::Cities => "Select cities",
            Self::OffenseCategory => "Select offense category",
            Self::ToggleTable => "Show/hide table preview",
            Self::Reset => "Reset filters",
            Self::KeyInsights => "Key insights",
            Self::Crime => "Crime analysis",
            Self::Income => "Income analysis",
            Self::Heatmaps => "Geographic heatmaps",
            Self::Serve => "Start server",
            Self::Quit => "Quit",
        }
    }
}

/// Runs the session loop until the user quits.
///
/// Invalid filter input is reported and leaves the filters unchanged.
///
/// # Errors
///
/// Returns an error if the dataset cannot be loaded, a prompt fails, or the
/// server fails to start.
pub fn run(cache: &Arc<DatasetCache>) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = DashboardSession::new(cache.get_or_load(&null_progress())?);
    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();

    println!("Income vs Crime Dashboard");

    loop {
        render::status(&session);
        if session.show_table() {
            render::preview(&session.preview(DEFAULT_PREVIEW_ROWS));
        }
        println!();

        let idx = Select::new()
            .with_prompt("What would you like to do?")
            .items(&labels)
            .default(0)
            .interact()?;

        let result = match Action::ALL[idx] {
            Action::YearRange => {
                let (min, max) = session.dataset().year_bounds();
                let (from, to) = session.state().year_range;
                let from = prompt_in_range("First year", from, min, max)?;
                let to = prompt_in_range("Last year", to, min, max)?;
                session.set_year_range(from, to)
            }
            Action::MonthRange => {
                let (min, max) = session.dataset().month_bounds();
                let (from, to) = session.state().month_range;
                let from = prompt_in_range("First month", from, min, max)?;
                let to = prompt_in_range("Last month", to, min, max)?;
                session.set_month_range(from, to)
            }
            Action::Cities => {
                let cities = session.dataset().cities().to_vec();
                let checked: Vec<bool> = cities
                    .iter()
                    .map(|c| session.state().selected_cities.contains(c))
                    .collect();
                let selected = MultiSelect::new()
                    .with_prompt("Select cities (space=toggle, a=all, enter=confirm)")
                    .items(&cities)
                    .defaults(&checked)
                    .interact()?;
                session.set_cities(selected.into_iter().map(|i| cities[i].clone()));
                Ok(())
            }
            Action::OffenseCategory => {
                let options = session.filter_options().offense_categories;
                let current = session.state().offense_category.to_string();
                let idx = Select::new()
                    .with_prompt("Offense category")
                    .items(&options)
                    .default(options.iter().position(|o| *o == current).unwrap_or(0))
                    .interact()?;
                session.set_offense_category(OffenseCategoryFilter::from(options[idx].as_str()))
            }
            Action::ToggleTable => {
                session.set_show_table(!session.show_table());
                Ok(())
            }
            Action::Reset => {
                session.reset();
                Ok(())
            }
            Action::KeyInsights => {
                render::key_insights(&session.key_insights());
                Ok(())
            }
            Action::Crime => {
                render::crime(&session.crime_page());
                Ok(())
            }
            Action::Income => {
                render::income(&session.income_page());
                Ok(())
            }
            Action::Heatmaps => {
                render::heatmaps(&session.heatmaps_page());
                Ok(())
            }
            Action::Serve => {
                actix_web::rt::System::new()
                    .block_on(income_crime_server::interactive::run(Arc::clone(cache)))?;
                return Ok(());
            }
            Action::Quit => {
                if Confirm::new()
                    .with_prompt("Quit?")
                    .default(true)
                    .interact()?
                {
                    return Ok(());
                }
                Ok(())
            }
        };

        if let Err(e) = result {
            println!("{e}");
        }
    }
}

/// The value a prompt pre-fills: `current` moved into `min..=max`.
fn prefill<T: Ord>(current: T, min: T, max: T) -> T {
    current.clamp(min, max)
}

/// Prompts for a value, re-asking until it lies in `min..=max`.
///
/// `current` is pre-filled, clamped into the bounds so the default always
/// validates.
fn prompt_in_range<T>(prompt: &str, current: T, min: T, max: T) -> Result<T, dialoguer::Error>
where
    T: Copy + Ord + std::fmt::Display + std::str::FromStr,
    <T as std::str::FromStr>::Err: std::fmt::Display,
{
    Input::new()
        .with_prompt(format!("{prompt} ({min}-{max})"))
        .default(prefill(current, min, max))
        .validate_with(move |value: &T| -> Result<(), String> {
            if (min..=max).contains(value) {
                Ok(())
            } else {
                Err(format!("must be between {min} and {max}"))
            }
        })
        .interact_text()
}
