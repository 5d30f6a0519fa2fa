//! The fixed set of feature indicators, in output-column order.

use crate::components::indicator::{FeatureColumns, Indicator};
use crate::domain::Bar;

use super::{Bollinger, Macd, PctChange, Rsi, Sma, Volatility};

/// Ordered collection of indicators computed for every run.
pub struct FeatureSet {
    indicators: Vec<Box<dyn Indicator>>,
}

impl FeatureSet {
    /// The ten features of the output table.
    pub fn standard() -> Self {
        Self {
            indicators: vec![
                Box::new(Rsi::new(14)),
                Box::new(Macd::line(12, 26, 9)),
                Box::new(Macd::signal(12, 26, 9)),
                Box::new(Sma::new(20)),
                Box::new(Sma::new(50)),
                Box::new(Bollinger::upper(20, 2.0)),
                Box::new(Bollinger::lower(20, 2.0)),
                Box::new(PctChange::new(1)),
                Box::new(PctChange::new(7)),
                Box::new(Volatility::new(20)),
            ],
        }
    }

    pub fn indicators(&self) -> &[Box<dyn Indicator>] {
        &self.indicators
    }

    /// Column names in output order.
    pub fn names(&self) -> Vec<&str> {
        self.indicators.iter().map(|ind| ind.name()).collect()
    }

    /// Longest warmup across all indicators.
    pub fn max_lookback(&self) -> usize {
        self.indicators
            .iter()
            .map(|ind| ind.lookback())
            .max()
            .unwrap_or(0)
    }

    /// Compute every indicator across the full series.
    pub fn compute(&self, bars: &[Bar]) -> FeatureColumns {
        let mut columns = FeatureColumns::new();
        for indicator in &self.indicators {
            columns.insert(indicator.name(), indicator.compute(bars));
        }
        columns
    }
}

impl Default for FeatureSet {
    fn default() -> Self {
        Self::standard()
    }
}
