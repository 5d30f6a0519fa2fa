//! FeatureRow: one row of the labeled output table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::bar::Bar;
use super::label::Label;

/// A bar's canonical columns, its derived features, and its label.
///
/// Produced only by the row filter, so every numeric field is defined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub open_time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub rsi: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub sma_20: f64,
    pub sma_50: f64,
    pub bb_high: f64,
    pub bb_low: f64,
    pub pct_change_1d: f64,
    pub pct_change_7d: f64,
    pub volatility: f64,
    pub label: Label,
}

impl FeatureRow {
    /// Numeric columns in output order (everything except `open_time` and `label`).
    pub fn numeric_values(&self) -> [f64; 15] {
        [
            self.open,
            self.high,
            self.low,
            self.close,
            self.volume,
            self.rsi,
            self.macd,
            self.macd_signal,
            self.sma_20,
            self.sma_50,
            self.bb_high,
            self.bb_low,
            self.pct_change_1d,
            self.pct_change_7d,
            self.volatility,
        ]
    }

    /// True when no numeric column is NaN.
    pub fn is_complete(&self) -> bool {
        self.numeric_values().iter().all(|v| !v.is_nan())
    }

    /// The bar this row was derived from.
    pub fn bar(&self) -> Bar {
        Bar {
            open_time: self.open_time,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume,
        }
    }
}
