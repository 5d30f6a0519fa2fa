//! Bar: the fundamental market data unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One OHLCV observation, normalized from a raw input row.
///
/// `open_time` comes from a millisecond epoch timestamp. Price and volume
/// cells may be `NaN` when the source carried an explicit `NaN` token; such
/// bars survive loading and are removed by the row filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub open_time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// Returns true if any price or volume field is NaN.
    pub fn has_missing(&self) -> bool {
        self.open.is_nan()
            || self.high.is_nan()
            || self.low.is_nan()
            || self.close.is_nan()
            || self.volume.is_nan()
    }

    /// Millisecond epoch timestamp of `open_time`.
    pub fn open_time_ms(&self) -> i64 {
        self.open_time.timestamp_millis()
    }
}

/// Extract the close series from a bar slice.
pub fn closes(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}
