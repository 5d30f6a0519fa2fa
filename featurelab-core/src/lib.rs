//! FeatureLab Core: bars in, labeled feature table out.
//!
//! This crate holds the whole transformation and no I/O beyond reading the
//! input file:
//! - Domain types (bars, feature rows, labels)
//! - Loader and normalizer for CSV and Parquet input
//! - Indicator engine (RSI, MACD, SMA, Bollinger, percent change, volatility)
//! - Label generator for the next-period return
//! - Row filter that drops warmup and undefined rows

pub mod components;
pub mod data;
pub mod domain;
pub mod filter;
pub mod indicators;
pub mod labeling;
pub mod schema;

pub use data::{load_bars, DataError, DataFormatError};
pub use domain::{Bar, FeatureRow, Label, LabelDistribution};
pub use filter::{build_feature_table, filter_rows, DropReason, FeatureError, FeatureTable};
pub use indicators::FeatureSet;
