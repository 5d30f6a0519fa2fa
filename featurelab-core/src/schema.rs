//! Tabular schema contract for the input bars and the labeled output table.
//!
//! Column names, order, and types are fixed here and checked once at load
//! time; later stages work on typed records only.

use serde::{Deserialize, Serialize};

/// Column types used by the input and output tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchemaType {
    /// Millisecond epoch timestamp.
    TimestampMs,
    Float64,
    /// Class label code (0, 1, 2).
    Label,
}

/// A single field in a table schema.
#[derive(Debug, Clone, Serialize)]
pub struct SchemaField {
    pub name: &'static str,
    pub dtype: SchemaType,
}

const fn field(name: &'static str, dtype: SchemaType) -> SchemaField {
    SchemaField { name, dtype }
}

/// Required input columns. Any other input column is ignored.
pub const INPUT_SCHEMA: &[SchemaField] = &[
    field("open_time", SchemaType::TimestampMs),
    field("open", SchemaType::Float64),
    field("high", SchemaType::Float64),
    field("low", SchemaType::Float64),
    field("close", SchemaType::Float64),
    field("volume", SchemaType::Float64),
];

/// Derived feature columns, in output order.
pub const FEATURE_COLUMNS: [&str; 10] = [
    "rsi",
    "macd",
    "macd_signal",
    "sma_20",
    "sma_50",
    "bb_high",
    "bb_low",
    "pct_change_1d",
    "pct_change_7d",
    "volatility",
];

/// The labeled output table: input columns, features, then `label`.
pub const OUTPUT_SCHEMA: &[SchemaField] = &[
    field("open_time", SchemaType::TimestampMs),
    field("open", SchemaType::Float64),
    field("high", SchemaType::Float64),
    field("low", SchemaType::Float64),
    field("close", SchemaType::Float64),
    field("volume", SchemaType::Float64),
    field("rsi", SchemaType::Float64),
    field("macd", SchemaType::Float64),
    field("macd_signal", SchemaType::Float64),
    field("sma_20", SchemaType::Float64),
    field("sma_50", SchemaType::Float64),
    field("bb_high", SchemaType::Float64),
    field("bb_low", SchemaType::Float64),
    field("pct_change_1d", SchemaType::Float64),
    field("pct_change_7d", SchemaType::Float64),
    field("volatility", SchemaType::Float64),
    field("label", SchemaType::Label),
];

/// Output column names in order.
pub fn output_columns() -> Vec<&'static str> {
    OUTPUT_SCHEMA.iter().map(|f| f.name).collect()
}

/// Positions of the required input columns within a header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnIndex {
    pub open_time: usize,
    pub open: usize,
    pub high: usize,
    pub low: usize,
    pub close: usize,
    pub volume: usize,
}

impl ColumnIndex {
    /// Locate every required input column in `header`.
    ///
    /// Names are matched after trimming whitespace; the first occurrence
    /// wins. Returns the name of the first missing column on failure.
    pub fn locate<'a, I>(header: I) -> Result<Self, &'static str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let names: Vec<&str> = header.into_iter().map(str::trim).collect();
        let find = |name: &'static str| names.iter().position(|h| *h == name).ok_or(name);

        Ok(Self {
            open_time: find("open_time")?,
            open: find("open")?,
            high: find("high")?,
            low: find("low")?,
            close: find("close")?,
            volume: find("volume")?,
        })
    }
}
