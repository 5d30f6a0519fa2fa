//! Relative Strength Index (RSI).
//!
//! Close-to-close deltas are split into gains and losses; the undefined
//! first delta counts as no movement. Both are Wilder-smoothed
//! (exponential mean with alpha = 1/period, defined after `period`
//! observations).
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Lookback: period - 1.
//! Edge cases: no movement → 50; avg_loss == 0 → 100; avg_gain == 0 → 0.

use crate::components::indicator::Indicator;
use crate::domain::Bar;
use crate::indicators::window::ewm_mean;

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self { period }
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        "rsi"
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        let mut gains = vec![0.0; n];
        let mut losses = vec![0.0; n];

        for i in 1..n {
            let change = bars[i].close - bars[i - 1].close;
            // NaN compares false on both sides and stays at zero
            if change > 0.0 {
                gains[i] = change;
            } else if change < 0.0 {
                losses[i] = -change;
            }
        }

        let alpha = 1.0 / self.period as f64;
        let avg_gain = ewm_mean(&gains, alpha, self.period);
        let avg_loss = ewm_mean(&losses, alpha, self.period);

        avg_gain
            .iter()
            .zip(&avg_loss)
            .map(|(&g, &l)| {
                if g.is_nan() || l.is_nan() {
                    f64::NAN
                } else {
                    compute_rsi(g, l)
                }
            })
            .collect()
    }
}

fn compute_rsi(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 && avg_gain == 0.0 {
        50.0 // no movement
    } else if avg_loss == 0.0 {
        100.0
    } else if avg_gain == 0.0 {
        0.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}
