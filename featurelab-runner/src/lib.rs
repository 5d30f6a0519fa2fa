//! FeatureLab Runner: configuration, orchestration, and output sinks.
//!
//! This crate builds on `featurelab-core` to provide:
//! - TOML pipeline configuration with defaults
//! - The end-to-end run (`run_pipeline`) and input validation (`check_input`)
//! - CSV and Parquet table export with atomic writes
//! - A structured run summary, optionally persisted as JSON

pub mod config;
pub mod export;
pub mod runner;

pub use config::{ConfigError, OutputFormat, PipelineConfig};
pub use export::{
    encode_table, export_features_csv, export_features_parquet, export_summary_json,
    features_to_dataframe, write_atomic, ExportError,
};
pub use runner::{
    check_input, compute_dataset_hash, run_pipeline, InputReport, PipelineOutput,
    PipelineSummary, RunError,
};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn config_is_send_sync() {
        assert_send::<PipelineConfig>();
        assert_sync::<PipelineConfig>();
    }

    #[test]
    fn output_is_send_sync() {
        assert_send::<PipelineOutput>();
        assert_sync::<PipelineOutput>();
        assert_send::<PipelineSummary>();
        assert_sync::<PipelineSummary>();
    }

    #[test]
    fn run_error_is_send_sync() {
        assert_send::<RunError>();
        assert_sync::<RunError>();
    }
}
