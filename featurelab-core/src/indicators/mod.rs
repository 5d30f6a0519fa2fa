//! Concrete indicator implementations.
//!
//! All indicators implement the `Indicator` trait from `components::indicator`
//! and are built on the window primitives in [`window`]. They are computed
//! once across the whole series; the row filter resolves warmup NaNs.
//!
//! Multi-series indicators (MACD, Bollinger) are exposed as separate named
//! instances per output, keeping the single-series `Indicator` trait
//! unchanged.

pub mod bollinger;
pub mod feature_set;
pub mod macd;
pub mod pct_change;
pub mod rsi;
pub mod sma;
pub mod volatility;
pub mod window;

pub use bollinger::{Bollinger, BollingerBand};
pub use feature_set::FeatureSet;
pub use macd::{Macd, MacdOutput};
pub use pct_change::PctChange;
pub use rsi::Rsi;
pub use sma::Sma;
pub use volatility::Volatility;

/// Create synthetic bars from close prices for testing.
///
/// Generates plausible OHLCV: open = prev_close (or close for first bar),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, volume = 1000,
/// one bar per day from 2024-01-01 UTC.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<crate::domain::Bar> {
    use crate::domain::Bar;
    const BASE_MS: i64 = 1_704_067_200_000;
    const DAY_MS: i64 = 86_400_000;
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                open_time: chrono::DateTime::from_timestamp_millis(BASE_MS + i as i64 * DAY_MS)
                    .unwrap(),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000.0,
            }
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
