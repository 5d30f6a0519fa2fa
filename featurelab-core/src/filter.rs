//! Row filter and feature table assembly.
//!
//! The filter is the only place rows leave the pipeline. A row with a single
//! undefined cell (price, feature, or label) is dropped whole; warmup NaNs at
//! the start of the series and the undefined forward return of the last bar
//! are both resolved here.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::components::indicator::FeatureColumns;
use crate::domain::{Bar, FeatureRow, Label, LabelDistribution};
use crate::indicators::FeatureSet;
use crate::labeling;
use crate::schema::FEATURE_COLUMNS;

/// Why a row was removed. Earlier variants take precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// A retained price or volume cell of the row itself is NaN.
    MissingPrice,
    /// No next bar, or the next close is undefined.
    ForwardReturnUndefined,
    /// At least one indicator is still inside its warmup window.
    IndicatorWarmup,
}

#[derive(Debug, Error)]
pub enum FeatureError {
    #[error(
        "no rows left after filtering {input_rows} input rows (at least {required_rows} bars are needed)"
    )]
    EmptyResult {
        input_rows: usize,
        required_rows: usize,
    },
}

/// The filtered, labeled table plus what the filter removed.
#[derive(Debug, Clone, Default)]
pub struct FeatureTable {
    pub rows: Vec<FeatureRow>,
    pub input_rows: usize,
    pub dropped: BTreeMap<DropReason, usize>,
}

impl FeatureTable {
    pub fn rows_dropped(&self) -> usize {
        self.dropped.values().sum()
    }

    pub fn label_distribution(&self) -> LabelDistribution {
        LabelDistribution::from_labels(self.rows.iter().map(|r| r.label))
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Keep every fully defined row, counting the rest by reason.
///
/// `features` must hold every column of `FEATURE_COLUMNS`; a missing series
/// reads as undefined. `labels` is aligned with `bars`.
pub fn filter_rows(
    bars: &[Bar],
    features: &FeatureColumns,
    labels: &[Option<Label>],
) -> FeatureTable {
    let mut table = FeatureTable {
        rows: Vec::with_capacity(bars.len()),
        input_rows: bars.len(),
        dropped: BTreeMap::new(),
    };

    for (i, bar) in bars.iter().enumerate() {
        let values = FEATURE_COLUMNS.map(|name| features.value(name, i));

        let reason = match labels.get(i).copied().flatten() {
            _ if bar.has_missing() => Err(DropReason::MissingPrice),
            None => Err(DropReason::ForwardReturnUndefined),
            Some(_) if values.iter().any(|v| v.is_nan()) => Err(DropReason::IndicatorWarmup),
            Some(label) => Ok(label),
        };

        let label = match reason {
            Ok(label) => label,
            Err(reason) => {
                *table.dropped.entry(reason).or_insert(0) += 1;
                continue;
            }
        };

        let [rsi, macd, macd_signal, sma_20, sma_50, bb_high, bb_low, pct_change_1d, pct_change_7d, volatility] =
            values;
        table.rows.push(FeatureRow {
            open_time: bar.open_time,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
            rsi,
            macd,
            macd_signal,
            sma_20,
            sma_50,
            bb_high,
            bb_low,
            pct_change_1d,
            pct_change_7d,
            volatility,
            label,
        });
    }

    table
}

/// Run the indicator engine, the label generator, and the row filter.
pub fn build_feature_table(bars: &[Bar]) -> Result<FeatureTable, FeatureError> {
    let feature_set = FeatureSet::standard();
    let features = feature_set.compute(bars);
    let labels = labeling::labels(bars);
    let table = filter_rows(bars, &features, &labels);

    if table.is_empty() {
        return Err(FeatureError::EmptyResult {
            input_rows: bars.len(),
            required_rows: feature_set.max_lookback() + 2,
        });
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_bars;

    fn defined_features(n: usize) -> FeatureColumns {
        let mut values = FeatureColumns::new();
        for name in FEATURE_COLUMNS {
            values.insert(name, vec![1.0; n]);
        }
        values
    }

    #[test]
    fn keeps_fully_defined_rows() {
        let bars = make_bars(&[100.0, 101.0, 102.0]);
        let labels = vec![Some(Label::Hold), Some(Label::Hold), None];
        let table = filter_rows(&bars, &defined_features(3), &labels);

        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.input_rows, 3);
        assert_eq!(table.dropped[&DropReason::ForwardReturnUndefined], 1);
        assert_eq!(table.rows_dropped(), 1);
    }

    #[test]
    fn single_undefined_feature_drops_row() {
        let bars = make_bars(&[100.0, 101.0, 102.0]);
        let mut features = defined_features(3);
        features.insert("volatility", vec![f64::NAN, 0.5, 0.5]);
        let labels = vec![Some(Label::Buy); 3];
        let table = filter_rows(&bars, &features, &labels);

        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.dropped[&DropReason::IndicatorWarmup], 1);
        assert_eq!(table.rows[0].open_time, bars[1].open_time);
    }

    #[test]
    fn missing_price_is_reported() {
        let mut bars = make_bars(&[100.0, 101.0, 102.0]);
        bars[1].volume = f64::NAN;
        let labels = vec![Some(Label::Sell); 3];
        let table = filter_rows(&bars, &defined_features(3), &labels);

        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.dropped[&DropReason::MissingPrice], 1);
    }

    #[test]
    fn missing_price_takes_precedence() {
        let mut bars = make_bars(&[100.0, 101.0, 102.0]);
        bars[1].close = f64::NAN;
        let features = FeatureColumns::new();
        // A NaN close leaves both its own label and the previous one undefined
        let labels = vec![None, None, None];
        let table = filter_rows(&bars, &features, &labels);

        assert!(table.rows.is_empty());
        assert_eq!(table.dropped[&DropReason::MissingPrice], 1);
        assert_eq!(table.dropped[&DropReason::ForwardReturnUndefined], 2);
        assert!(!table.dropped.contains_key(&DropReason::IndicatorWarmup));
    }

    #[test]
    fn forward_return_beats_warmup() {
        let bars = make_bars(&[100.0, 101.0]);
        let labels = vec![Some(Label::Hold), None];
        let table = filter_rows(&bars, &FeatureColumns::new(), &labels);

        assert_eq!(table.dropped[&DropReason::IndicatorWarmup], 1);
        assert_eq!(table.dropped[&DropReason::ForwardReturnUndefined], 1);
    }

    #[test]
    fn rows_copy_bar_and_feature_values() {
        let bars = make_bars(&[100.0, 101.0]);
        let mut features = defined_features(2);
        features.insert("rsi", vec![42.0, 43.0]);
        let table = filter_rows(&bars, &features, &[Some(Label::Buy), None]);

        let row = &table.rows[0];
        assert_eq!(row.bar(), bars[0]);
        assert_eq!(row.rsi, 42.0);
        assert_eq!(row.label, Label::Buy);
        assert!(row.is_complete());
    }

    #[test]
    fn short_series_is_empty_result() {
        let closes: Vec<f64> = (0..50).map(|i| 100.0 + i as f64).collect();
        let err = build_feature_table(&make_bars(&closes)).unwrap_err();
        match err {
            FeatureError::EmptyResult {
                input_rows,
                required_rows,
            } => {
                assert_eq!(input_rows, 50);
                assert_eq!(required_rows, 51);
            }
        }
    }

    #[test]
    fn minimum_series_yields_one_row() {
        let closes: Vec<f64> = (0..51).map(|i| 100.0 + (i % 5) as f64).collect();
        let table = build_feature_table(&make_bars(&closes)).unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.dropped[&DropReason::IndicatorWarmup], 49);
        assert_eq!(table.dropped[&DropReason::ForwardReturnUndefined], 1);
    }
}
