//! Moving Average Convergence/Divergence (MACD).
//!
//! Two outputs (separate Indicator instances):
//! - Line: EMA(close, fast) - EMA(close, slow)
//! - Signal: EMA(line, signal)
//!
//! EMA(n) is the recursive exponential mean with alpha = 2/(n+1), seeded with
//! the first observation and defined after n observations. The signal EMA
//! starts at the first defined line value.
//! Lookback: line = slow - 1, signal = slow + signal - 2.

use crate::components::indicator::Indicator;
use crate::domain::bar::{closes, Bar};
use crate::indicators::window::{ewm_mean, span_alpha};

/// Which MACD series to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacdOutput {
    Line,
    Signal,
}

#[derive(Debug, Clone)]
pub struct Macd {
    fast: usize,
    slow: usize,
    signal: usize,
    output: MacdOutput,
}

impl Macd {
    pub fn line(fast: usize, slow: usize, signal: usize) -> Self {
        Self::with_output(fast, slow, signal, MacdOutput::Line)
    }

    pub fn signal(fast: usize, slow: usize, signal: usize) -> Self {
        Self::with_output(fast, slow, signal, MacdOutput::Signal)
    }

    fn with_output(fast: usize, slow: usize, signal: usize, output: MacdOutput) -> Self {
        assert!(fast >= 1 && signal >= 1, "MACD periods must be >= 1");
        assert!(slow > fast, "MACD slow period must exceed fast period");
        Self {
            fast,
            slow,
            signal,
            output,
        }
    }

    fn line_series(&self, bars: &[Bar]) -> Vec<f64> {
        let close = closes(bars);
        let fast = ewm_mean(&close, span_alpha(self.fast), self.fast);
        let slow = ewm_mean(&close, span_alpha(self.slow), self.slow);
        fast.iter().zip(&slow).map(|(f, s)| f - s).collect()
    }
}

impl Indicator for Macd {
    fn name(&self) -> &str {
        match self.output {
            MacdOutput::Line => "macd",
            MacdOutput::Signal => "macd_signal",
        }
    }

    fn lookback(&self) -> usize {
        match self.output {
            MacdOutput::Line => self.slow - 1,
            MacdOutput::Signal => self.slow + self.signal - 2,
        }
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let line = self.line_series(bars);
        match self.output {
            MacdOutput::Line => line,
            MacdOutput::Signal => ewm_mean(&line, span_alpha(self.signal), self.signal),
        }
    }
}
