//! Parquet input: same required columns as CSV, read through Polars.
//!
//! `open_time` may be stored as an integer millisecond epoch or as any
//! Datetime unit; numeric columns must cast strictly to Float64. Nulls are
//! treated like empty CSV cells.

use std::fs::File;

use polars::prelude::{
    Column, DataFrame, DataType, Float64Chunked, Int64Chunked, ParquetReader, PolarsError,
    SerReader, TimeUnit,
};

use crate::data::ingest::{validate_order, DataFormatError};
use crate::domain::Bar;

/// Read bars from a Parquet file.
pub fn read_parquet_bars(file: File) -> Result<Vec<Bar>, DataFormatError> {
    let df = ParquetReader::new(file).finish().map_err(parquet_err)?;
    dataframe_to_bars(&df)
}

/// Convert a DataFrame carrying the input schema to bars.
pub fn dataframe_to_bars(df: &DataFrame) -> Result<Vec<Bar>, DataFormatError> {
    let open_time = timestamp_column(df)?;
    let open = float_column(df, "open")?;
    let high = float_column(df, "high")?;
    let low = float_column(df, "low")?;
    let close = float_column(df, "close")?;
    let volume = float_column(df, "volume")?;

    let mut bars = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        let row = i + 1;
        let millis = open_time.get(i);
        let open_time = millis
            .and_then(chrono::DateTime::from_timestamp_millis)
            .ok_or_else(|| DataFormatError::InvalidTimestamp {
                row,
                value: millis.map_or_else(|| "null".to_string(), |m| m.to_string()),
            })?;

        bars.push(Bar {
            open_time,
            open: float_at(&open, i, "open")?,
            high: float_at(&high, i, "high")?,
            low: float_at(&low, i, "low")?,
            close: float_at(&close, i, "close")?,
            volume: float_at(&volume, i, "volume")?,
        });
    }

    validate_order(&bars)?;
    Ok(bars)
}

fn required<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column, DataFormatError> {
    df.column(name)
        .map_err(|_| DataFormatError::MissingColumn {
            column: name.to_string(),
        })
}

fn timestamp_column(df: &DataFrame) -> Result<Int64Chunked, DataFormatError> {
    let column = required(df, "open_time")?;
    let millis = match column.dtype() {
        DataType::Datetime(_, _) => column
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
            .and_then(|c| c.cast(&DataType::Int64)),
        _ => column.strict_cast(&DataType::Int64),
    }
    .map_err(|e| DataFormatError::ColumnType {
        column: "open_time".to_string(),
        reason: e.to_string(),
    })?;

    millis.i64().cloned().map_err(parquet_err)
}

fn float_column(df: &DataFrame, name: &'static str) -> Result<Float64Chunked, DataFormatError> {
    let column = required(df, name)?;
    let floats = column
        .strict_cast(&DataType::Float64)
        .map_err(|e| DataFormatError::ColumnType {
            column: name.to_string(),
            reason: e.to_string(),
        })?;
    floats.f64().cloned().map_err(parquet_err)
}

fn float_at(ca: &Float64Chunked, i: usize, column: &'static str) -> Result<f64, DataFormatError> {
    ca.get(i).ok_or_else(|| DataFormatError::InvalidNumber {
        row: i + 1,
        column,
        value: "null".to_string(),
    })
}

fn parquet_err(e: PolarsError) -> DataFormatError {
    DataFormatError::Parquet(e.to_string())
}
