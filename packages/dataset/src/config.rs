//! Dataset location configuration.
//!
//! Settings are read from a TOML file (`INCOME_CRIME_CONFIG`, or
//! `income_crime.toml` at the project root when present) and then
//! overridden by the `INCOME_CRIME_DATASET` and `INCOME_CRIME_TABLE`
//! environment variables:
//!
//! ```toml
//! [dataset]
//! path = "data/income_crime.duckdb"
//! table = "FINAL_CRIME_WITH_LATLON"
//! format = "duckdb"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use strum_macros::{AsRefStr, Display, EnumString};

use crate::loader::{CsvSource, DataSource, DuckDbSource};
use crate::{DatasetError, paths};

/// Table queried when none is configured.
pub const DEFAULT_TABLE: &str = "FINAL_CRIME_WITH_LATLON";

/// Environment variable naming the TOML config file.
pub const CONFIG_ENV: &str = "INCOME_CRIME_CONFIG";
/// Environment variable overriding the dataset path.
pub const DATASET_ENV: &str = "INCOME_CRIME_DATASET";
/// Environment variable overriding the table name.
pub const TABLE_ENV: &str = "INCOME_CRIME_TABLE";

/// Storage format of the dataset file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Display, EnumString, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DatasetFormat {
    /// A `DuckDB` database file.
    #[serde(rename = "duckdb")]
    #[strum(serialize = "duckdb")]
    DuckDb,
    /// A CSV export of the table.
    Csv,
}

impl DatasetFormat {
    /// Infers the format from a file extension (`.csv`/`.tsv` are CSV,
    /// anything else is `DuckDB`).
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("csv" | "tsv") => Self::Csv,
            _ => Self::DuckDb,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    dataset: DatasetConfig,
}

/// Where and how to load the dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DatasetConfig {
    /// Dataset file path.
    pub path: Option<PathBuf>,
    /// Table to query (`DuckDB` only).
    pub table: Option<String>,
    /// Explicit storage format; inferred from the path when absent.
    pub format: Option<DatasetFormat>,
}

impl DatasetConfig {
    /// Parses the `[dataset]` section of a TOML config document.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Config`] if the document is malformed.
    pub fn parse_toml(text: &str) -> Result<Self, DatasetError> {
        let file: ConfigFile = toml::from_str(text)?;
        Ok(file.dataset)
    }

    /// Builds the configuration from the config file and environment.
    ///
    /// A missing default config file is not an error; a missing file named
    /// explicitly through `INCOME_CRIME_CONFIG` is.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] if the config file cannot be read or parsed.
    pub fn from_env() -> Result<Self, DatasetError> {
        let config = match std::env::var(CONFIG_ENV) {
            Ok(path) => {
                log::debug!("Reading dataset config from {path}");
                Self::parse_toml(&std::fs::read_to_string(path)?)?
            }
            Err(_) => {
                let default_path = paths::default_config_path();
                if default_path.exists() {
                    log::debug!("Reading dataset config from {}", default_path.display());
                    Self::parse_toml(&std::fs::read_to_string(default_path)?)?
                } else {
                    Self::default()
                }
            }
        };

        Ok(config.with_overrides(
            std::env::var(DATASET_ENV).ok().map(PathBuf::from),
            std::env::var(TABLE_ENV).ok(),
        ))
    }

    /// Replaces the path and table with any values given.
    #[must_use]
    pub fn with_overrides(mut self, path: Option<PathBuf>, table: Option<String>) -> Self {
        if path.is_some() {
            self.path = path;
        }
        if table.is_some() {
            self.table = table;
        }
        self
    }

    /// The configured path, or `data/income_crime.duckdb`.
    #[must_use]
    pub fn resolved_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(paths::default_dataset_path)
    }

    /// The configured table, or [`DEFAULT_TABLE`].
    #[must_use]
    pub fn resolved_table(&self) -> &str {
        self.table.as_deref().unwrap_or(DEFAULT_TABLE)
    }

    /// The configured format, or the one inferred from the path.
    #[must_use]
    pub fn resolved_format(&self) -> DatasetFormat {
        self.format
            .unwrap_or_else(|| DatasetFormat::from_path(&self.resolved_path()))
    }

    /// Builds the [`DataSource`] this configuration describes.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::InvalidTable`] if the table name is invalid.
    pub fn into_source(self) -> Result<Box<dyn DataSource>, DatasetError> {
        let path = self.resolved_path();
        let source: Box<dyn DataSource> = match self.resolved_format() {
            DatasetFormat::DuckDb => Box::new(DuckDbSource::new(path, self.resolved_table())?),
            DatasetFormat::Csv => {
                let source = CsvSource::new(&path);
                let is_tsv = path
                    .extension()
                    .is_some_and(|e| e.eq_ignore_ascii_case("tsv"));
                Box::new(if is_tsv { source.with_delimiter(b'\t') } else { source })
            }
        };
        Ok(source)
    }
}
