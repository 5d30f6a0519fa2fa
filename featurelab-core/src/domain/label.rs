//! Direction label derived from the next-period return.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Returns strictly above this are labeled `Buy`.
pub const BUY_THRESHOLD: f64 = 0.02;

/// Returns strictly below this are labeled `Sell`.
pub const SELL_THRESHOLD: f64 = -0.02;

/// Three-class target. Serialized as its integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Label {
    Sell,
    Hold,
    Buy,
}

impl Label {
    pub const ALL: [Label; 3] = [Label::Sell, Label::Hold, Label::Buy];

    /// Classify a forward return.
    ///
    /// Comparisons are strict: a return of exactly ±0.02 is `Hold`.
    /// Returns `None` for an undefined (NaN) return.
    pub fn from_return(future_return: f64) -> Option<Label> {
        if future_return.is_nan() {
            None
        } else if future_return > BUY_THRESHOLD {
            Some(Label::Buy)
        } else if future_return < SELL_THRESHOLD {
            Some(Label::Sell)
        } else {
            Some(Label::Hold)
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Label::Sell => 0,
            Label::Hold => 1,
            Label::Buy => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Label::Sell => "sell",
            Label::Hold => "hold",
            Label::Buy => "buy",
        }
    }
}

impl From<Label> for u8 {
    fn from(label: Label) -> u8 {
        label.code()
    }
}

impl TryFrom<u8> for Label {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Label::Sell),
            1 => Ok(Label::Hold),
            2 => Ok(Label::Buy),
            other => Err(format!("invalid label code {other} (expected 0, 1 or 2)")),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Row counts per label value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelDistribution {
    pub sell: usize,
    pub hold: usize,
    pub buy: usize,
}

impl LabelDistribution {
    pub fn from_labels(labels: impl IntoIterator<Item = Label>) -> Self {
        let mut dist = Self::default();
        for label in labels {
            dist.record(label);
        }
        dist
    }

    pub fn record(&mut self, label: Label) {
        match label {
            Label::Sell => self.sell += 1,
            Label::Hold => self.hold += 1,
            Label::Buy => self.buy += 1,
        }
    }

    pub fn count(&self, label: Label) -> usize {
        match label {
            Label::Sell => self.sell,
            Label::Hold => self.hold,
            Label::Buy => self.buy,
        }
    }

    pub fn total(&self) -> usize {
        self.sell + self.hold + self.buy
    }
}
