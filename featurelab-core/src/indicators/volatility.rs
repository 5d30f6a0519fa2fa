//! Realized volatility: sample stddev of one-bar percent changes.
//!
//! value[t] = stddev(pct_change_1[t-period+1..=t]), divide by N - 1.
//! The first percent change is undefined, so lookback: period.

use crate::components::indicator::Indicator;
use crate::domain::bar::{closes, Bar};
use crate::indicators::window::{pct_change, rolling_std};

#[derive(Debug, Clone)]
pub struct Volatility {
    period: usize,
}

impl Volatility {
    pub fn new(period: usize) -> Self {
        assert!(period >= 2, "Volatility period must be >= 2");
        Self { period }
    }
}

impl Indicator for Volatility {
    fn name(&self) -> &str {
        "volatility"
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let returns = pct_change(&closes(bars), 1);
        rolling_std(&returns, self.period, 1)
    }
}
