//! Sink: the labeled table and the run summary, written atomically.
//!
//! Two table encodings:
//! - **CSV**: the 17 output columns, `open_time` as `YYYY-MM-DD HH:MM:SS`
//!   (with `.mmm` on every row once any row has milliseconds), floats in
//!   shortest round-trip form, label as an integer code
//! - **Parquet**: `open_time` as `Datetime(ms)`, features `Float64`, label `Int32`
//!
//! Every file goes through [`write_atomic`], so a failed run never leaves a
//! partial table behind.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Timelike, Utc};
use polars::prelude::{Column, DataFrame, DataType, ParquetWriter, PolarsError, TimeUnit};
use thiserror::Error;

use featurelab_core::domain::FeatureRow;
use featurelab_core::schema::output_columns;

use crate::config::OutputFormat;
use crate::runner::PipelineSummary;

/// Errors from writing output artifacts.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("CSV output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("Parquet encoding failed: {0}")]
    Parquet(#[from] PolarsError),
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Render `open_time` as `YYYY-MM-DD HH:MM:SS`, or with a `.mmm` suffix.
pub fn format_open_time(ts: &DateTime<Utc>, with_millis: bool) -> String {
    if with_millis {
        ts.format("%Y-%m-%d %H:%M:%S%.3f").to_string()
    } else {
        ts.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// Export feature rows as CSV text, header included.
///
/// The `open_time` resolution is chosen once for the whole column.
pub fn export_features_csv(rows: &[FeatureRow]) -> Result<String, ExportError> {
    let with_millis = rows.iter().any(|r| r.open_time.nanosecond() != 0);
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(output_columns())?;

    for row in rows {
        let mut record = Vec::with_capacity(17);
        record.push(format_open_time(&row.open_time, with_millis));
        record.extend(row.numeric_values().iter().map(|v| v.to_string()));
        record.push(row.label.code().to_string());
        wtr.write_record(&record)?;
    }

    let data = wtr
        .into_inner()
        .map_err(|e| ExportError::Csv(e.into_error().into()))?;
    Ok(String::from_utf8(data)?)
}

// ─── Parquet export ─────────────────────────────────────────────────

/// Build the output DataFrame in schema column order.
pub fn features_to_dataframe(rows: &[FeatureRow]) -> Result<DataFrame, ExportError> {
    let names = output_columns();
    let open_times: Vec<i64> = rows.iter().map(|r| r.open_time.timestamp_millis()).collect();
    let labels: Vec<i32> = rows.iter().map(|r| i32::from(r.label.code())).collect();

    let mut columns = Vec::with_capacity(names.len());
    columns.push(
        Column::new(names[0].into(), open_times)
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?,
    );
    // numeric_values() follows the output order between open_time and label
    for (k, name) in names[1..16].iter().enumerate() {
        let values: Vec<f64> = rows.iter().map(|r| r.numeric_values()[k]).collect();
        columns.push(Column::new((*name).into(), values));
    }
    columns.push(Column::new(names[16].into(), labels));

    Ok(DataFrame::new(columns)?)
}

/// Encode rows as Parquet bytes.
pub fn export_features_parquet(rows: &[FeatureRow]) -> Result<Vec<u8>, ExportError> {
    let mut df = features_to_dataframe(rows)?;
    let mut buf = Vec::new();
    ParquetWriter::new(&mut buf).finish(&mut df)?;
    Ok(buf)
}

/// Encode rows in `format`, ready for [`write_atomic`].
pub fn encode_table(rows: &[FeatureRow], format: OutputFormat) -> Result<Vec<u8>, ExportError> {
    match format {
        OutputFormat::Csv => Ok(export_features_csv(rows)?.into_bytes()),
        OutputFormat::Parquet => export_features_parquet(rows),
    }
}

// ─── Summary export ─────────────────────────────────────────────────

/// Serialize the run summary to pretty JSON.
pub fn export_summary_json(summary: &PipelineSummary) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(summary)?)
}

// ─── Atomic write ───────────────────────────────────────────────────

/// Write `bytes` to `path` via `<path>.tmp` and a rename.
///
/// Parent directories are created as needed. The temp file is removed if
/// either step fails.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
    let io_err = |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    let tmp_path = tmp_path_for(path);
    let result = fs::write(&tmp_path, bytes).and_then(|()| fs::rename(&tmp_path, path));
    if let Err(e) = result {
        let _ = fs::remove_file(&tmp_path);
        return Err(io_err(e));
    }
    Ok(())
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}
