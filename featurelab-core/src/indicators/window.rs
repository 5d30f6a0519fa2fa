//! Window primitives shared by the concrete indicators.
//!
//! Each function maps an ordered series to a series of the same length,
//! with NaN wherever the trailing window is not fully defined.

/// Rolling arithmetic mean over `period` trailing values.
///
/// NaN until `period` values are available, and NaN for any window that
/// contains a NaN.
pub fn rolling_mean(values: &[f64], period: usize) -> Vec<f64> {
    let mut result = vec![f64::NAN; values.len()];
    if period == 0 || values.len() < period {
        return result;
    }

    for (start, window) in values.windows(period).enumerate() {
        if window.iter().any(|v| v.is_nan()) {
            continue;
        }
        result[start + period - 1] = window.iter().sum::<f64>() / period as f64;
    }

    result
}

/// Rolling standard deviation over `period` trailing values.
///
/// `ddof = 0` gives the population deviation (divide by N), `ddof = 1` the
/// sample deviation (divide by N - 1). Windows with `period <= ddof` are
/// undefined.
pub fn rolling_std(values: &[f64], period: usize, ddof: usize) -> Vec<f64> {
    let mut result = vec![f64::NAN; values.len()];
    if period == 0 || period <= ddof || values.len() < period {
        return result;
    }

    for (start, window) in values.windows(period).enumerate() {
        if window.iter().any(|v| v.is_nan()) {
            continue;
        }
        let mean = window.iter().sum::<f64>() / period as f64;
        let sum_sq: f64 = window
            .iter()
            .map(|v| {
                let diff = v - mean;
                diff * diff
            })
            .sum();
        result[start + period - 1] = (sum_sq / (period - ddof) as f64).sqrt();
    }

    result
}

/// Recursive exponential mean: `s[t] = alpha * x[t] + (1 - alpha) * s[t-1]`.
///
/// Seeded with the first defined observation. Weights follow absolute
/// position: a NaN gap keeps decaying the previous state, so the next
/// observation counts for more, and the carried state is emitted at the NaN
/// position itself. Output is defined once `min_periods` defined
/// observations have been seen.
pub fn ewm_mean(values: &[f64], alpha: f64, min_periods: usize) -> Vec<f64> {
    let mut result = vec![f64::NAN; values.len()];
    let min_periods = min_periods.max(1);
    let mut state = f64::NAN;
    let mut old_weight = 1.0;
    let mut observed = 0usize;

    for (i, &x) in values.iter().enumerate() {
        let is_observation = !x.is_nan();
        if is_observation {
            observed += 1;
        }

        if state.is_nan() {
            state = x;
        } else {
            old_weight *= 1.0 - alpha;
            if is_observation {
                if state != x {
                    state = (old_weight * state + alpha * x) / (old_weight + alpha);
                }
                old_weight = 1.0;
            }
        }

        if observed >= min_periods {
            result[i] = state;
        }
    }

    result
}

/// Smoothing factor of an EMA with the given span: `2 / (span + 1)`.
pub fn span_alpha(span: usize) -> f64 {
    2.0 / (span as f64 + 1.0)
}

/// Fractional change against the value `periods` steps earlier.
pub fn pct_change(values: &[f64], periods: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if periods == 0 {
        return vec![0.0; n];
    }

    for i in periods..n {
        let prev = values[i - periods];
        result[i] = (values[i] - prev) / prev;
    }

    result
}
