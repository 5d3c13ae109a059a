#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Dataset loading, configuration, and process-wide caching.
//!
//! The dashboard runs one fixed `SELECT * FROM <table>` query against a
//! `DuckDB` file (or reads an equivalent CSV export), converts every row
//! into a [`Record`](income_crime_dataset_models::Record), and keeps the
//! result in a [`cache::DatasetCache`] for the lifetime of the process.

pub mod cache;
pub mod config;
pub mod loader;
pub mod paths;
pub mod progress;
mod row;

use std::path::PathBuf;

use thiserror::Error;

pub use cache::DatasetCache;
pub use config::{DatasetConfig, DatasetFormat};
pub use loader::{CsvSource, DataSource, DuckDbSource, load_dataset};

/// Errors that can occur while locating, reading, or converting the dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// `DuckDB` query or connection failure.
    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    /// CSV parse failure.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed TOML configuration.
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    /// The dataset file does not exist.
    #[error("Dataset not found at {}", path.display())]
    NotFound {
        /// Path that was checked.
        path: PathBuf,
    },

    /// The configured table name is not a plain (optionally dotted)
    /// identifier.
    #[error("Invalid table name '{table}'")]
    InvalidTable {
        /// The rejected table name.
        table: String,
    },

    /// A required column is absent from the source.
    #[error("Missing column '{column}'")]
    MissingColumn {
        /// Column name.
        column: String,
    },

    /// A cell could not be converted to the expected type.
    #[error("Invalid value in column '{column}' at row {row}: {message}")]
    InvalidValue {
        /// Column name.
        column: String,
        /// 1-based data row number.
        row: u64,
        /// Description of what went wrong.
        message: String,
    },

    /// The source returned no rows, so no filter defaults can be derived.
    #[error("Dataset '{origin}' returned no rows")]
    Empty {
        /// Human-readable description of the source.
        origin: String,
    },
}
