#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for the income vs crime dashboard.
//!
//! Subcommands print a page's tables as JSON or start the HTTP server.
//! Without a subcommand an interactive session lets the user adjust the
//! filters and browse page summaries.
//!
//! Uses `indicatif-log-bridge` (via [`income_crime_cli_utils::init_logger`])
//! to route `log` output through `indicatif::MultiProgress` so that log
//! lines and the load spinner never fight for the terminal.

mod interactive;
mod render;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand, ValueEnum};
use income_crime_analytics::{DEFAULT_PREVIEW_ROWS, DashboardSession};
use income_crime_cli_utils::{IndicatifProgress, MultiProgress};
use income_crime_dataset::progress::null_progress;
use income_crime_dataset::{DatasetCache, DatasetConfig, DatasetError};
use income_crime_dataset_models::Dataset;
use income_crime_server::{ServerConfig, run_server_with};
use income_crime_server_models::{ApiRecords, FilterQueryParams};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "income_crime", about = "Income vs crime dashboard")]
struct Cli {
    /// Dataset file (overrides `INCOME_CRIME_DATASET` and the config file)
    #[arg(long, global = true)]
    dataset: Option<PathBuf>,
    /// Table to query (overrides `INCOME_CRIME_TABLE` and the config file)
    #[arg(long, global = true)]
    table: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Bind address (overrides `BIND_ADDR`)
        #[arg(long)]
        bind: Option<String>,
        /// Port (overrides `PORT`)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Print filter bounds, options and defaults
    Filters,
    /// Print one dashboard page's tables
    Page {
        /// Page to compute
        #[arg(value_enum)]
        page: Page,
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Print the first filtered records
    Records {
        /// Number of records to print
        #[arg(long, default_value_t = DEFAULT_PREVIEW_ROWS)]
        limit: usize,
        #[command(flatten)]
        filters: FilterArgs,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Page {
    KeyInsights,
    Crime,
    Income,
    Heatmaps,
}

/// Filter flags; absent flags keep the defaults.
#[derive(Args)]
struct FilterArgs {
    /// First year to include
    #[arg(long)]
    year_from: Option<i32>,
    /// Last year to include
    #[arg(long)]
    year_to: Option<i32>,
    /// First month to include (1-12)
    #[arg(long)]
    month_from: Option<u8>,
    /// Last month to include (1-12)
    #[arg(long)]
    month_to: Option<u8>,
    /// Comma-separated cities (empty selects none)
    #[arg(long)]
    cities: Option<String>,
    /// Offense category, or "All Categories"
    #[arg(long)]
    category: Option<String>,
}

impl From<FilterArgs> for FilterQueryParams {
    fn from(args: FilterArgs) -> Self {
        Self {
            year_from: args.year_from,
            year_to: args.year_to,
            month_from: args.month_from,
            month_to: args.month_to,
            cities: args.cities,
            category: args.category,
            limit: None,
        }
    }
}

/// Builds the cache for the configured dataset and loads it behind a
/// progress spinner.
fn open_cache(
    multi: &MultiProgress,
    path: Option<PathBuf>,
    table: Option<String>,
) -> Result<Arc<DatasetCache>, DatasetError> {
    let config = DatasetConfig::from_env()?.with_overrides(path, table);
    let cache = DatasetCache::new(config.into_source()?);
    let progress = IndicatifProgress::rows_bar(multi, &format!("Loading {}", cache.describe()));
    cache.get_or_load(&progress)?;
    Ok(Arc::new(cache))
}

/// A session with the defaults overlaid by `filters`.
fn session_with(
    dataset: Arc<Dataset>,
    filters: FilterArgs,
) -> Result<DashboardSession, Box<dyn std::error::Error>> {
    let mut session = DashboardSession::new(dataset);
    let state = FilterQueryParams::from(filters).to_state(session.defaults());
    session.apply_state(state)?;
    Ok(session)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = income_crime_cli_utils::init_logger();
    let cli = Cli::parse();

    let cache = open_cache(&multi, cli.dataset, cli.table)?;

    let Some(command) = cli.command else {
        return interactive::run(&cache);
    };

    match command {
        Commands::Serve { bind, port } => {
            let config = ServerConfig::from_env().with_overrides(bind, port);
            actix_web::rt::System::new().block_on(run_server_with(cache, config))?;
        }
        Commands::Filters => {
            let dataset = cache.get_or_load(&null_progress())?;
            print_json(&DashboardSession::new(dataset).filter_options())?;
        }
        Commands::Page { page, filters } => {
            let session = session_with(cache.get_or_load(&null_progress())?, filters)?;
            match page {
                Page::KeyInsights => print_json(&session.key_insights())?,
                Page::Crime => print_json(&session.crime_page())?,
                Page::Income => print_json(&session.income_page())?,
                Page::Heatmaps => print_json(&session.heatmaps_page())?,
            }
        }
        Commands::Records { limit, filters } => {
            let session = session_with(cache.get_or_load(&null_progress())?, filters)?;
            print_json(&ApiRecords {
                matched: session.filtered().len(),
                records: session.preview(limit),
            })?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory as _;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_page_with_filters() {
        let cli = Cli::try_parse_from([
            "income_crime",
            "page",
            "key-insights",
            "--year-from",
            "2018",
            "--cities",
            "Chicago,Seattle",
        ])
        .unwrap();

        let Some(Commands::Page { page, filters }) = cli.command else {
            panic!("expected page command");
        };
        assert!(matches!(page, Page::KeyInsights));
        let params = FilterQueryParams::from(filters);
        assert_eq!(params.year_from, Some(2018));
        assert_eq!(params.cities.as_deref(), Some("Chicago,Seattle"));
    }

    #[test]
    fn records_limit_defaults_to_preview_rows() {
        let cli = Cli::try_parse_from(["income_crime", "records"]).unwrap();
        let Some(Commands::Records { limit, .. }) = cli.command else {
            panic!("expected records command");
        };
        assert_eq!(limit, DEFAULT_PREVIEW_ROWS);
    }

    #[test]
    fn no_subcommand_is_interactive() {
        let cli = Cli::try_parse_from(["income_crime", "--dataset", "data/x.csv"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.dataset, Some(PathBuf::from("data/x.csv")));
    }
}
