//! Bollinger Bands: moving average +/- standard deviation multiplier.
//!
//! Two bands (separate Indicator instances):
//! - Upper: SMA(close, period) + mult * stddev(close, period)
//! - Lower: SMA(close, period) - mult * stddev(close, period)
//!
//! Uses population stddev (divide by N).
//! Lookback: period - 1.

use crate::components::indicator::Indicator;
use crate::domain::bar::{closes, Bar};
use crate::indicators::window::{rolling_mean, rolling_std};

/// Which band of the Bollinger Bands to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BollingerBand {
    Upper,
    Lower,
}

#[derive(Debug, Clone)]
pub struct Bollinger {
    period: usize,
    multiplier: f64,
    band: BollingerBand,
}

impl Bollinger {
    pub fn upper(period: usize, multiplier: f64) -> Self {
        Self::with_band(period, multiplier, BollingerBand::Upper)
    }

    pub fn lower(period: usize, multiplier: f64) -> Self {
        Self::with_band(period, multiplier, BollingerBand::Lower)
    }

    fn with_band(period: usize, multiplier: f64, band: BollingerBand) -> Self {
        assert!(period >= 1, "Bollinger period must be >= 1");
        Self {
            period,
            multiplier,
            band,
        }
    }
}

impl Indicator for Bollinger {
    fn name(&self) -> &str {
        match self.band {
            BollingerBand::Upper => "bb_high",
            BollingerBand::Lower => "bb_low",
        }
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let close = closes(bars);
        let mean = rolling_mean(&close, self.period);
        let stddev = rolling_std(&close, self.period, 0);

        let sign = match self.band {
            BollingerBand::Upper => 1.0,
            BollingerBand::Lower => -1.0,
        };

        mean.iter()
            .zip(&stddev)
            .map(|(m, s)| m + sign * self.multiplier * s)
            .collect()
    }
}
