//! Domain types for FeatureLab

pub mod bar;
pub mod feature_row;
pub mod label;

pub use bar::Bar;
pub use feature_row::FeatureRow;
pub use label::{Label, LabelDistribution, BUY_THRESHOLD, SELL_THRESHOLD};
