//! Pipeline runner: load → features → labels → filter → sink.
//!
//! Two entry points:
//! - `run_pipeline()`: the full run, ending in an atomic write. Used by `generate`.
//! - `check_input()`: loads and validates the input only. Used by `check`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use featurelab_core::data::{load_bars, DataError, DataFormatError};
use featurelab_core::domain::{Bar, FeatureRow, LabelDistribution};
use featurelab_core::filter::{build_feature_table, DropReason, FeatureError};
use featurelab_core::indicators::FeatureSet;

use crate::config::{ConfigError, OutputFormat, PipelineConfig};
use crate::export::{encode_table, export_summary_json, write_atomic, ExportError};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("input {path} not found or unreadable ({reason}); run the acquisition step first")]
    SourceNotFound { path: PathBuf, reason: String },
    #[error("invalid input {path}: {source}")]
    DataFormat {
        path: PathBuf,
        #[source]
        source: DataFormatError,
    },
    #[error(transparent)]
    EmptyResult(#[from] FeatureError),
    #[error("export error: {0}")]
    Export(#[from] ExportError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

impl From<DataError> for RunError {
    fn from(e: DataError) -> Self {
        match e {
            DataError::SourceNotFound { path, reason } => RunError::SourceNotFound { path, reason },
            DataError::Format { path, source } => RunError::DataFormat { path, source },
        }
    }
}

/// What a run produced, for the caller to report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineSummary {
    pub input_rows: usize,
    pub output_rows: usize,
    pub rows_dropped: usize,
    pub dropped_by_reason: BTreeMap<DropReason, usize>,
    pub label_distribution: LabelDistribution,
    /// blake3 of the normalized input bars.
    pub dataset_hash: String,
    pub first_open_time: DateTime<Utc>,
    pub last_open_time: DateTime<Utc>,
    pub output_path: PathBuf,
    pub format: OutputFormat,
}

/// The final table plus its summary.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub rows: Vec<FeatureRow>,
    pub summary: PipelineSummary,
}

/// Result of validating an input file without running the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputReport {
    pub path: PathBuf,
    pub bars: usize,
    pub first_open_time: DateTime<Utc>,
    pub last_open_time: DateTime<Utc>,
    /// Rows a run would keep if no cell is undefined.
    pub expected_rows: usize,
    /// Bars needed for a single output row.
    pub required_rows: usize,
    pub dataset_hash: String,
}

/// Run the whole pipeline and write the output table.
///
/// Nothing is written unless every earlier stage succeeded.
pub fn run_pipeline(config: &PipelineConfig) -> Result<PipelineOutput, RunError> {
    info!(input = %config.input.display(), "starting feature generation");

    let bars = load_input(&config.input)?;
    let dataset_hash = compute_dataset_hash(&bars);
    debug!(bars = bars.len(), %dataset_hash, "input loaded");

    let table = build_feature_table(&bars).inspect_err(|e| warn!("{e}"))?;
    for (reason, count) in &table.dropped {
        debug!(?reason, count, "rows dropped");
    }

    let format = config.output_format();
    let summary = PipelineSummary {
        input_rows: table.input_rows,
        output_rows: table.rows.len(),
        rows_dropped: table.rows_dropped(),
        dropped_by_reason: table.dropped.clone(),
        label_distribution: table.label_distribution(),
        dataset_hash,
        first_open_time: table.rows[0].open_time,
        last_open_time: table.rows[table.rows.len() - 1].open_time,
        output_path: config.output.clone(),
        format,
    };

    // Encode everything up front; the table is the last file to land.
    let table_bytes = encode_table(&table.rows, format)?;
    let summary_json = config
        .summary
        .as_ref()
        .map(|path| export_summary_json(&summary).map(|json| (path, json)))
        .transpose()?;

    if let Some((path, json)) = &summary_json {
        write_atomic(path, json.as_bytes())?;
        debug!(path = %path.display(), "summary written");
    }
    if let Err(e) = write_atomic(&config.output, &table_bytes) {
        if let Some((path, _)) = &summary_json {
            let _ = std::fs::remove_file(path);
        }
        return Err(e.into());
    }

    info!(
        output = %config.output.display(),
        rows = summary.output_rows,
        dropped = summary.rows_dropped,
        "feature generation complete"
    );

    Ok(PipelineOutput {
        rows: table.rows,
        summary,
    })
}

/// Load and validate the input, reporting what a run would produce.
pub fn check_input(path: &Path) -> Result<InputReport, RunError> {
    let bars = load_input(path)?;
    let max_lookback = FeatureSet::standard().max_lookback();

    Ok(InputReport {
        path: path.to_path_buf(),
        bars: bars.len(),
        first_open_time: bars[0].open_time,
        last_open_time: bars[bars.len() - 1].open_time,
        expected_rows: bars.len().saturating_sub(max_lookback + 1),
        required_rows: max_lookback + 2,
        dataset_hash: compute_dataset_hash(&bars),
    })
}

fn load_input(path: &Path) -> Result<Vec<Bar>, RunError> {
    load_bars(path).map_err(|e| {
        if let DataError::SourceNotFound { .. } = e {
            warn!(path = %path.display(), "input file not found");
        }
        RunError::from(e)
    })
}

/// Compute a deterministic hash over the normalized bars.
pub fn compute_dataset_hash(bars: &[Bar]) -> String {
    let mut hasher = blake3::Hasher::new();

    for bar in bars {
        hasher.update(&bar.open_time_ms().to_le_bytes());
        hasher.update(&bar.open.to_le_bytes());
        hasher.update(&bar.high.to_le_bytes());
        hasher.update(&bar.low.to_le_bytes());
        hasher.update(&bar.close.to_le_bytes());
        hasher.update(&bar.volume.to_le_bytes());
    }

    hasher.finalize().to_hex().to_string()
}
