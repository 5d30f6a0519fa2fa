//! Pipeline component traits.

pub mod indicator;

pub use indicator::{FeatureColumns, Indicator};
