//! Percent change of close over a fixed number of bars.
//!
//! value[t] = (close[t] - close[t-periods]) / close[t-periods]
//! Lookback: periods.

use crate::components::indicator::Indicator;
use crate::domain::bar::{closes, Bar};
use crate::indicators::window::pct_change;

#[derive(Debug, Clone)]
pub struct PctChange {
    periods: usize,
    name: String,
}

impl PctChange {
    pub fn new(periods: usize) -> Self {
        assert!(periods >= 1, "PctChange periods must be >= 1");
        Self {
            periods,
            name: format!("pct_change_{periods}d"),
        }
    }
}

impl Indicator for PctChange {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.periods
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        pct_change(&closes(bars), self.periods)
    }
}
