//! Loader/normalizer: raw tabular rows in, ordered typed bars out.
//!
//! Columns are located by name once, from the header. Each data row is then
//! parsed into a [`Bar`]; the first cell that fails to parse aborts the load.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::data::parquet::read_parquet_bars;
use crate::domain::Bar;
use crate::schema::ColumnIndex;

/// Errors from loading the input file.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("input {path} not found or unreadable ({reason}); run the acquisition step first")]
    SourceNotFound { path: PathBuf, reason: String },

    #[error("invalid input {path}: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: DataFormatError,
    },
}

/// Structural or cell-level problems in the input table.
///
/// Row numbers are 1-based data rows (the header is not counted).
#[derive(Debug, Error)]
pub enum DataFormatError {
    #[error("missing required column '{column}'")]
    MissingColumn { column: String },

    #[error("row {row}: column '{column}' is not a number: {value:?}")]
    InvalidNumber {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("row {row}: open_time is not a millisecond epoch timestamp: {value:?}")]
    InvalidTimestamp { row: usize, value: String },

    #[error("row {row}: open_time does not increase (rows must be in ascending time order)")]
    OutOfOrder { row: usize },

    #[error("column '{column}' has an unsupported type: {reason}")]
    ColumnType { column: String, reason: String },

    #[error("input has a header but no data rows")]
    NoRows,

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("parquet read failed: {0}")]
    Parquet(String),
}

/// Supported input encodings, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Parquet,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("parquet") => InputFormat::Parquet,
            _ => InputFormat::Csv,
        }
    }
}

/// Load and normalize bars from `path`.
pub fn load_bars(path: &Path) -> Result<Vec<Bar>, DataError> {
    let not_found = |reason: String| DataError::SourceNotFound {
        path: path.to_path_buf(),
        reason,
    };

    if !path.is_file() {
        return Err(not_found("no such file".into()));
    }
    let file = File::open(path).map_err(|e| not_found(e.to_string()))?;

    let parsed = match InputFormat::from_path(path) {
        InputFormat::Csv => read_csv_bars(file),
        InputFormat::Parquet => read_parquet_bars(file),
    };

    parsed.map_err(|source| DataError::Format {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse bars from CSV text with a header row.
pub fn read_csv_bars<R: Read>(reader: R) -> Result<Vec<Bar>, DataFormatError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let columns = ColumnIndex::locate(rdr.headers()?.iter()).map_err(|column| {
        DataFormatError::MissingColumn {
            column: column.to_string(),
        }
    })?;

    let mut bars = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        let row = i + 1;
        let cell = |idx: usize| record.get(idx).unwrap_or("");

        bars.push(Bar {
            open_time: parse_open_time(cell(columns.open_time), row)?,
            open: parse_number(cell(columns.open), row, "open")?,
            high: parse_number(cell(columns.high), row, "high")?,
            low: parse_number(cell(columns.low), row, "low")?,
            close: parse_number(cell(columns.close), row, "close")?,
            volume: parse_number(cell(columns.volume), row, "volume")?,
        });
    }

    validate_order(&bars)?;
    Ok(bars)
}

/// Interpret a cell as a millisecond epoch timestamp.
///
/// Integral float spellings (e.g. `1.7e12`) are accepted.
pub fn parse_open_time(raw: &str, row: usize) -> Result<DateTime<Utc>, DataFormatError> {
    let trimmed = raw.trim();
    let millis = trimmed.parse::<i64>().ok().or_else(|| {
        trimmed
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64)
            .map(|v| v as i64)
    });

    millis
        .and_then(DateTime::from_timestamp_millis)
        .ok_or_else(|| DataFormatError::InvalidTimestamp {
            row,
            value: raw.to_string(),
        })
}

/// Parse a numeric cell. Empty cells are errors; a literal `NaN` is kept.
pub fn parse_number(raw: &str, row: usize, column: &'static str) -> Result<f64, DataFormatError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| DataFormatError::InvalidNumber {
            row,
            column,
            value: raw.to_string(),
        })
}

/// Require a non-empty series with strictly increasing `open_time`.
pub fn validate_order(bars: &[Bar]) -> Result<(), DataFormatError> {
    if bars.is_empty() {
        return Err(DataFormatError::NoRows);
    }
    for (i, pair) in bars.windows(2).enumerate() {
        if pair[1].open_time <= pair[0].open_time {
            return Err(DataFormatError::OutOfOrder { row: i + 2 });
        }
    }
    Ok(())
}
