#![allow(clippy::module_name_repetitions)]
//! Canonical file paths for the dashboard's data and configuration.
//!
//! All defaults are relative to the project root.

use std::path::{Path, PathBuf};

/// Default dataset file name under `data/`.
pub const DEFAULT_DATASET_FILE: &str = "income_crime.duckdb";

/// Default configuration file name at the project root.
pub const DEFAULT_CONFIG_FILE: &str = "income_crime.toml";

/// Returns the workspace root directory.
///
/// Resolved at compile time from `CARGO_MANIFEST_DIR`; falls back to the
/// current directory if the manifest is not nested as expected.
#[must_use]
pub fn project_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

/// Returns the `data/` directory path.
#[must_use]
pub fn data_dir() -> PathBuf {
    project_root().join("data")
}

/// Returns the default dataset path (`data/income_crime.duckdb`).
#[must_use]
pub fn default_dataset_path() -> PathBuf {
    data_dir().join(DEFAULT_DATASET_FILE)
}

/// Returns the default configuration file path (`income_crime.toml`).
#[must_use]
pub fn default_config_path() -> PathBuf {
    project_root().join(DEFAULT_CONFIG_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_path_lives_under_data_dir() {
        let path = default_dataset_path();
        assert!(path.starts_with(data_dir()));
        assert!(path.ends_with(DEFAULT_DATASET_FILE));
    }

    #[test]
    fn config_path_lives_at_project_root() {
        assert_eq!(
            default_config_path().parent(),
            Some(project_root().as_path())
        );
    }
}
