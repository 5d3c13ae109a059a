//! Dataset sources.
//!
//! A [`DataSource`] runs the dashboard's single fixed query and returns every
//! row as a [`Record`]. Two sources exist: [`DuckDbSource`], which runs
//! `SELECT * FROM <table>` against a read-only `DuckDB` file, and
//! [`CsvSource`], which reads a CSV export carrying the same column headers.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use duckdb::types::Value;
use duckdb::{AccessMode, Config, Connection};
use income_crime_dataset_models::{Dataset, Record};

use crate::DatasetError;
use crate::progress::ProgressCallback;
use crate::row::{Cell, RowAccess, parse_record, required_columns};

/// Number of rows between progress updates.
const PROGRESS_INTERVAL: u64 = 10_000;

/// A tabular source the dashboard can load its records from.
pub trait DataSource: Send + Sync {
    /// Human-readable description used in log and error messages.
    fn describe(&self) -> String;

    /// Reads every record from the source.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] if the source is unreachable or a row cannot
    /// be converted.
    fn load_records(
        &self,
        progress: &Arc<dyn ProgressCallback>,
    ) -> Result<Vec<Record>, DatasetError>;
}

/// Loads the full dataset from `source`.
///
/// # Errors
///
/// Returns [`DatasetError`] if the source fails, or
/// [`DatasetError::Empty`] if it returns no rows.
pub fn load_dataset(
    source: &dyn DataSource,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<Dataset, DatasetError> {
    let origin = source.describe();
    log::info!("Loading dataset from {origin}...");
    let start = Instant::now();

    let records = source.load_records(progress)?;

    let missing_measures = records
        .iter()
        .filter(|r| r.median_income.is_nan() || r.households.is_nan())
        .count();
    if missing_measures > 0 {
        log::warn!(
            "{missing_measures} of {} records have a NULL income or household measure",
            records.len()
        );
    }

    let dataset = Dataset::from_records(records).ok_or(DatasetError::Empty { origin })?;

    log::info!(
        "Loaded {} records ({} cities, {} offense categories) in {:.1}s",
        dataset.len(),
        dataset.cities().len(),
        dataset.offense_categories().len(),
        start.elapsed().as_secs_f64()
    );
    progress.finish(format!("Loaded {} records", dataset.len()));

    Ok(dataset)
}

/// Returns `true` if `table` is a plain identifier, optionally qualified
/// with dots (`db.schema.table`).
fn is_valid_table_name(table: &str) -> bool {
    !table.is_empty()
        && table.split('.').all(|part| {
            !part.is_empty() && part.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}

/// Runs `SELECT * FROM <table>` against a `DuckDB` database file.
#[derive(Debug, Clone)]
pub struct DuckDbSource {
    path: PathBuf,
    table: String,
}

impl DuckDbSource {
    /// Creates a source for `table` in the database at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::InvalidTable`] if `table` is not a plain
    /// identifier.
    pub fn new(path: impl Into<PathBuf>, table: impl Into<String>) -> Result<Self, DatasetError> {
        let table = table.into();
        if !is_valid_table_name(&table) {
            return Err(DatasetError::InvalidTable { table });
        }
        Ok(Self {
            path: path.into(),
            table,
        })
    }

    /// The database file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The fixed select-all query this source runs.
    #[must_use]
    pub fn query(&self) -> String {
        format!("SELECT * FROM {}", self.table)
    }

    fn open(&self) -> Result<Connection, DatasetError> {
        if !self.path.exists() {
            return Err(DatasetError::NotFound {
                path: self.path.clone(),
            });
        }
        let config = Config::default().access_mode(AccessMode::ReadOnly)?;
        Ok(Connection::open_with_flags(&self.path, config)?)
    }

    /// Reads every record of this source's table from an open connection.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] if the query fails or a row cannot be
    /// converted.
    pub fn load_from_connection(
        &self,
        conn: &Connection,
        progress: &Arc<dyn ProgressCallback>,
    ) -> Result<Vec<Record>, DatasetError> {
        let mut count_stmt = conn.prepare(&format!("SELECT COUNT(*) FROM {}", self.table))?;
        let total: i64 = count_stmt.query_row([], |row| row.get(0))?;
        let total = u64::try_from(total).unwrap_or(0);
        progress.set_total(total);
        progress.set_message(format!("Reading {}", self.table));

        let mut stmt = conn.prepare(&self.query())?;
        let mut rows = stmt.query([])?;
        let mut records = Vec::with_capacity(usize::try_from(total).unwrap_or(0));
        let mut row_number = 0u64;

        while let Some(row) = rows.next()? {
            row_number += 1;
            records.push(parse_record(row, row_number)?);
            if row_number % PROGRESS_INTERVAL == 0 {
                progress.inc(PROGRESS_INTERVAL);
            }
        }
        progress.inc(row_number % PROGRESS_INTERVAL);

        Ok(records)
    }
}

impl DataSource for DuckDbSource {
    fn describe(&self) -> String {
        format!("{} ({})", self.path.display(), self.table)
    }

    fn load_records(
        &self,
        progress: &Arc<dyn ProgressCallback>,
    ) -> Result<Vec<Record>, DatasetError> {
        let conn = self.open()?;
        self.load_from_connection(&conn, progress)
    }
}

#[allow(clippy::cast_precision_loss)]
impl From<Value> for Cell {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Boolean(v) => Self::Int(i64::from(v)),
            Value::TinyInt(v) => Self::Int(i64::from(v)),
            Value::SmallInt(v) => Self::Int(i64::from(v)),
            Value::Int(v) => Self::Int(i64::from(v)),
            Value::BigInt(v) => Self::Int(v),
            Value::UTinyInt(v) => Self::Int(i64::from(v)),
            Value::USmallInt(v) => Self::Int(i64::from(v)),
            Value::UInt(v) => Self::Int(i64::from(v)),
            Value::UBigInt(v) => i64::try_from(v).map_or(Self::Float(v as f64), Self::Int),
            Value::HugeInt(v) => i64::try_from(v).map_or(Self::Float(v as f64), Self::Int),
            Value::Float(v) => Self::Float(f64::from(v)),
            Value::Double(v) => Self::Float(v),
            Value::Decimal(d) => {
                let text = d.to_string();
                text.parse::<f64>().map_or(Self::Text(text), Self::Float)
            }
            Value::Text(s) => Self::Text(s),
            other => Self::Text(format!("{other:?}")),
        }
    }
}

impl RowAccess for duckdb::Row<'_> {
    fn cell(&self, column: &str) -> Result<Cell, DatasetError> {
        let value: Value = self.get(column).map_err(|e| match e {
            duckdb::Error::InvalidColumnName(_) => DatasetError::MissingColumn {
                column: column.to_string(),
            },
            other => DatasetError::DuckDb(other),
        })?;
        Ok(Cell::from(value))
    }
}

/// Reads a CSV export with the same column headers as the source table.
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
    delimiter: u8,
}

impl CsvSource {
    /// Creates a comma-delimited source for the file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            delimiter: b',',
        }
    }

    /// Sets the field delimiter (e.g. `b'\t'` for TSV exports).
    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Reads every record from `reader`.
    ///
    /// Empty cells and the literals `NULL`/`NaN` are treated as NULL.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::MissingColumn`] if a required header is
    /// absent, or another [`DatasetError`] if a row cannot be parsed.
    pub fn load_from_reader<R: Read>(
        &self,
        reader: R,
        progress: &Arc<dyn ProgressCallback>,
    ) -> Result<Vec<Record>, DatasetError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .flexible(true)
            .from_reader(reader);

        let header_index: BTreeMap<String, usize> = reader
            .headers()?
            .iter()
            .enumerate()
            .map(|(i, h)| (h.trim().to_owned(), i))
            .collect();

        if let Some(column) = required_columns().find(|c| !header_index.contains_key(*c)) {
            return Err(DatasetError::MissingColumn {
                column: column.to_string(),
            });
        }

        progress.set_message(format!("Reading {}", self.path.display()));

        let mut records = Vec::new();
        let mut row_number = 0u64;

        for result in reader.records() {
            let record = result?;
            row_number += 1;
            let row = CsvRow {
                header_index: &header_index,
                record: &record,
            };
            records.push(parse_record(&row, row_number)?);
            if row_number % PROGRESS_INTERVAL == 0 {
                progress.inc(PROGRESS_INTERVAL);
            }
        }
        progress.inc(row_number % PROGRESS_INTERVAL);

        Ok(records)
    }
}

impl DataSource for CsvSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load_records(
        &self,
        progress: &Arc<dyn ProgressCallback>,
    ) -> Result<Vec<Record>, DatasetError> {
        if !self.path.exists() {
            return Err(DatasetError::NotFound {
                path: self.path.clone(),
            });
        }
        let file = std::fs::File::open(&self.path)?;
        self.load_from_reader(std::io::BufReader::new(file), progress)
    }
}

struct CsvRow<'a> {
    header_index: &'a BTreeMap<String, usize>,
    record: &'a csv::StringRecord,
}

impl RowAccess for CsvRow<'_> {
    fn cell(&self, column: &str) -> Result<Cell, DatasetError> {
        let idx = self
            .header_index
            .get(column)
            .ok_or_else(|| DatasetError::MissingColumn {
                column: column.to_string(),
            })?;
        let raw = self.record.get(*idx).unwrap_or("").trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case("null") || raw.eq_ignore_ascii_case("nan") {
            Ok(Cell::Null)
        } else {
            Ok(Cell::Text(raw.to_owned()))
        }
    }
}

#[cfg(test)]
mod tests {
    use income_crime_dataset_models::IncomeBracket;

    use super::*;
    use crate::progress::null_progress;

    const HEADER: &str = "CITY,YEAR,MONTH1,ZIP,LAT,LNG,OFFENSE_CATEGORY,TOTAL_CRIMES,HOUSEHOLDS,\
        HOUSEHOLDS_MEDIAN_INCOME,HOUSEHOLDS_LESS_THAN_10K,HOUSEHOLDS_10K_15K,HOUSEHOLDS_15K_25K,\
        HOUSEHOLDS_25K_35K,HOUSEHOLDS_35K_50K,HOUSEHOLDS_50K_75K,HOUSEHOLDS_75K_100K,\
        HOUSEHOLDS_100K_150K,HOUSEHOLDS_150K_200K,HOUSEHOLDS_MORE_THAN_200K";

    fn csv_text(rows: &[&str]) -> String {
        let mut text = HEADER.replace(' ', "");
        for row in rows {
            text.push('\n');
            text.push_str(row);
        }
        text
    }

    #[test]
    fn loads_csv_rows() {
        let text = csv_text(&[
            "Chicago,2018,3,60601,41.88,-87.62,Theft,12,1500,65000,5,5,10,10,10,20,15,10,10,5",
            "Seattle,2019,11,98101,47.61,-122.33,Assault,,,,5,5,10,10,10,20,15,10,10,5",
        ]);
        let records = CsvSource::new("inline.csv")
            .load_from_reader(text.as_bytes(), &null_progress())
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].city, "Chicago");
        assert_eq!(records[0].total_crimes, 12);
        assert!((records[0].median_income - 65_000.0).abs() < f64::EPSILON);
        assert!((records[0].bracket(IncomeBracket::From50KTo75K) - 20.0).abs() < f64::EPSILON);
        assert_eq!(records[1].total_crimes, 0);
        assert!(records[1].households.is_nan());
    }

    #[test]
    fn csv_missing_header_is_reported() {
        let text = "CITY,YEAR\nChicago,2018";
        let err = CsvSource::new("inline.csv")
            .load_from_reader(text.as_bytes(), &null_progress())
            .unwrap_err();
        assert!(matches!(err, DatasetError::MissingColumn { .. }));
    }

    #[test]
    fn missing_csv_file_is_not_found() {
        let err = CsvSource::new("/definitely/not/here.csv")
            .load_records(&null_progress())
            .unwrap_err();
        assert!(matches!(err, DatasetError::NotFound { .. }));
    }

    #[test]
    fn empty_csv_is_an_empty_dataset() {
        let source = CsvSource::new("inline.csv");
        let records = source
            .load_from_reader(csv_text(&[]).as_bytes(), &null_progress())
            .unwrap();
        assert!(records.is_empty());
        assert!(Dataset::from_records(records).is_none());
    }

    #[test]
    fn table_names_are_validated() {
        assert!(DuckDbSource::new("x.duckdb", "US_INCOME.PUBLIC.FINAL_CRIME_WITH_LATLON").is_ok());
        assert!(DuckDbSource::new("x.duckdb", "crime; DROP TABLE crime").is_err());
        assert!(DuckDbSource::new("x.duckdb", "a..b").is_err());
        assert!(DuckDbSource::new("x.duckdb", "").is_err());
    }

    #[test]
    fn missing_duckdb_file_is_not_found() {
        let source = DuckDbSource::new("/definitely/not/here.duckdb", "crime").unwrap();
        let err = source.load_records(&null_progress()).unwrap_err();
        assert!(matches!(err, DatasetError::NotFound { .. }));
    }

    #[test]
    fn loads_duckdb_table() {
        let conn = Connection::open_in_memory().unwrap();
        let bracket_cols: Vec<String> = IncomeBracket::ALL
            .iter()
            .map(|b| format!("{} DOUBLE", b.column()))
            .collect();
        conn.execute_batch(&format!(
            "CREATE TABLE crime (
                CITY TEXT, YEAR INTEGER, MONTH1 BIGINT, ZIP TEXT, LAT DOUBLE, LNG DOUBLE,
                OFFENSE_CATEGORY TEXT, TOTAL_CRIMES BIGINT, HOUSEHOLDS DOUBLE,
                HOUSEHOLDS_MEDIAN_INCOME DOUBLE, {});
             INSERT INTO crime VALUES
                ('Houston', 2020, 6, '77002', 29.75, -95.36, 'Burglary', 7, 900.0, 48000.0,
                 10, 10, 10, 10, 10, 10, 10, 10, 10, 10),
                ('Houston', 2021, 1, '77002', 29.75, -95.36, 'Burglary', NULL, 910.0, NULL,
                 10, 10, 10, 10, 10, 10, 10, 10, 10, 10);",
            bracket_cols.join(", ")
        ))
        .unwrap();

        let source = DuckDbSource::new("memory", "crime").unwrap();
        let records = source.load_from_connection(&conn, &null_progress()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].zip, "77002");
        assert_eq!(records[0].month, 6);
        assert_eq!(records[0].total_crimes, 7);
        assert_eq!(records[1].total_crimes, 0);
        assert!(records[1].median_income.is_nan());
    }
}
