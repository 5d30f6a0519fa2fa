//! Label generation from the next-period return.
//!
//! The return realized by holding from bar t to bar t+1 is folded back onto
//! row t, so each label is aligned with the features known at time t.

use crate::domain::{Bar, Label};

/// `(close[t+1] - close[t]) / close[t]` for every bar; NaN on the last bar.
pub fn future_returns(bars: &[Bar]) -> Vec<f64> {
    let mut result = vec![f64::NAN; bars.len()];
    for (i, pair) in bars.windows(2).enumerate() {
        let (current, next) = (pair[0].close, pair[1].close);
        result[i] = (next - current) / current;
    }
    result
}

/// Label for every bar; `None` where the forward return is undefined.
pub fn labels(bars: &[Bar]) -> Vec<Option<Label>> {
    future_returns(bars)
        .into_iter()
        .map(Label::from_return)
        .collect()
}
