//! The indicator seam and the column store its outputs land in.

use crate::domain::Bar;
use std::collections::HashMap;

/// A causal feature computed over a whole bar series.
///
/// `compute` returns one value per bar. On NaN-free input the first
/// `lookback()` values are NaN and every later one is defined. The value at
/// bar t never reads prices from t+1 or later.
pub trait Indicator: Send + Sync {
    /// Output column, e.g. `"sma_20"`.
    fn name(&self) -> &str;

    fn lookback(&self) -> usize;

    fn compute(&self, bars: &[Bar]) -> Vec<f64>;
}

/// Computed feature columns, one per output column name.
///
/// Anything the store does not hold reads as NaN, so an absent column or a
/// short series drops the affected rows in the filter instead of panicking.
#[derive(Debug, Clone, Default)]
pub struct FeatureColumns {
    columns: HashMap<String, Vec<f64>>,
}

impl FeatureColumns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a column, replacing any earlier one with the same name.
    pub fn insert(&mut self, name: impl Into<String>, values: Vec<f64>) {
        self.columns.insert(name.into(), values);
    }

    /// Cell `(name, row)`, NaN when undefined or absent.
    pub fn value(&self, name: &str, row: usize) -> f64 {
        self.columns
            .get(name)
            .and_then(|column| column.get(row))
            .copied()
            .unwrap_or(f64::NAN)
    }
}
