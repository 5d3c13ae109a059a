//! Conversion of raw source rows into [`Record`]s.
//!
//! Both loaders expose their rows through [`RowAccess`], which looks cells up
//! by source column name. [`parse_record`] applies the shared typing rules:
//! NULL measures become NaN, NULL crime counts become 0, NULL text becomes
//! an empty string, and months outside 1-12 are rejected.

use income_crime_dataset_models::{BRACKET_COUNT, IncomeBracket, Record, columns};

use crate::DatasetError;

/// A single untyped cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
}

/// Column-name access to one source row.
pub trait RowAccess {
    /// Returns the cell in `column`.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::MissingColumn`] if the column does not exist.
    fn cell(&self, column: &str) -> Result<Cell, DatasetError>;
}

/// Every column the loaders require, in table order.
pub fn required_columns() -> impl Iterator<Item = &'static str> {
    [
        columns::CITY,
        columns::YEAR,
        columns::MONTH,
        columns::ZIP,
        columns::LATITUDE,
        columns::LONGITUDE,
        columns::OFFENSE_CATEGORY,
        columns::TOTAL_CRIMES,
        columns::HOUSEHOLDS,
        columns::HOUSEHOLDS_MEDIAN_INCOME,
    ]
    .into_iter()
    .chain(IncomeBracket::ALL.into_iter().map(IncomeBracket::column))
}

fn invalid(column: &str, row: u64, message: impl Into<String>) -> DatasetError {
    DatasetError::InvalidValue {
        column: column.to_string(),
        row,
        message: message.into(),
    }
}

fn text<R: RowAccess + ?Sized>(row: &R, column: &str) -> Result<String, DatasetError> {
    Ok(match row.cell(column)? {
        Cell::Null => String::new(),
        Cell::Int(v) => v.to_string(),
        Cell::Float(v) => v.to_string(),
        Cell::Text(s) => s,
    })
}

#[allow(clippy::cast_precision_loss)]
fn float<R: RowAccess + ?Sized>(row: &R, column: &str, row_number: u64) -> Result<f64, DatasetError> {
    match row.cell(column)? {
        Cell::Null => Ok(f64::NAN),
        Cell::Int(v) => Ok(v as f64),
        Cell::Float(v) => Ok(v),
        Cell::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|e| invalid(column, row_number, format!("'{s}': {e}"))),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn integer<R: RowAccess + ?Sized>(
    row: &R,
    column: &str,
    row_number: u64,
) -> Result<Option<i64>, DatasetError> {
    let as_integral = |v: f64| {
        if v.is_finite() && v.fract() == 0.0 {
            Ok(Some(v as i64))
        } else {
            Err(invalid(column, row_number, format!("{v} is not an integer")))
        }
    };

    match row.cell(column)? {
        Cell::Null => Ok(None),
        Cell::Int(v) => Ok(Some(v)),
        Cell::Float(v) => as_integral(v),
        Cell::Text(s) => {
            let trimmed = s.trim();
            if let Ok(v) = trimmed.parse::<i64>() {
                return Ok(Some(v));
            }
            let v = trimmed
                .parse::<f64>()
                .map_err(|e| invalid(column, row_number, format!("'{s}': {e}")))?;
            as_integral(v)
        }
    }
}

/// Converts one source row into a [`Record`].
///
/// `row_number` is 1-based and only used in error messages.
///
/// # Errors
///
/// Returns [`DatasetError::MissingColumn`] if a required column is absent,
/// or [`DatasetError::InvalidValue`] if a cell cannot be typed (including a
/// NULL year or month, or a month outside 1-12).
pub fn parse_record<R: RowAccess + ?Sized>(row: &R, row_number: u64) -> Result<Record, DatasetError> {
    let year = integer(row, columns::YEAR, row_number)?
        .ok_or_else(|| invalid(columns::YEAR, row_number, "year is NULL"))?;
    let year = i32::try_from(year)
        .map_err(|_| invalid(columns::YEAR, row_number, format!("{year} is out of range")))?;

    let month = integer(row, columns::MONTH, row_number)?
        .ok_or_else(|| invalid(columns::MONTH, row_number, "month is NULL"))?;
    let month = u8::try_from(month)
        .ok()
        .filter(|m| (1..=12).contains(m))
        .ok_or_else(|| invalid(columns::MONTH, row_number, format!("{month} is not in 1-12")))?;

    let total_crimes = integer(row, columns::TOTAL_CRIMES, row_number)?.unwrap_or(0);
    let total_crimes = u64::try_from(total_crimes).map_err(|_| {
        invalid(
            columns::TOTAL_CRIMES,
            row_number,
            format!("{total_crimes} is negative"),
        )
    })?;

    let mut brackets = [f64::NAN; BRACKET_COUNT];
    for bracket in IncomeBracket::ALL {
        brackets[bracket.index()] = float(row, bracket.column(), row_number)?;
    }

    Ok(Record {
        city: text(row, columns::CITY)?,
        year,
        month,
        zip: text(row, columns::ZIP)?,
        latitude: float(row, columns::LATITUDE, row_number)?,
        longitude: float(row, columns::LONGITUDE, row_number)?,
        offense_category: text(row, columns::OFFENSE_CATEGORY)?,
        total_crimes,
        households: float(row, columns::HOUSEHOLDS, row_number)?,
        median_income: float(row, columns::HOUSEHOLDS_MEDIAN_INCOME, row_number)?,
        brackets,
    })
}
