//! Integration tests for the end-to-end pipeline.
//!
//! Each test writes a synthetic Binance-style kline CSV into a temp dir,
//! runs the pipeline against it, and inspects the files it leaves behind.

use std::fs;
use std::path::{Path, PathBuf};

use featurelab_core::data::DataFormatError;
use featurelab_core::filter::{DropReason, FeatureError};
use featurelab_runner::{
    check_input, run_pipeline, OutputFormat, PipelineConfig, PipelineSummary, RunError,
};

const BASE_MS: i64 = 1_704_067_200_000;
const HOUR_MS: i64 = 3_600_000;

/// Kline CSV with the extra exchange columns the loader must ignore.
fn kline_csv(n: usize) -> String {
    let mut out = String::from(
        "open_time,open,high,low,close,volume,close_time,quote_asset_volume,\
         number_of_trades,taker_buy_base,taker_buy_quote,ignore\n",
    );
    for i in 0..n {
        let t = i as f64;
        let close = 42_000.0 + 900.0 * (t * 0.07).sin() + 300.0 * (t * 0.53).cos();
        let open_time = BASE_MS + i as i64 * HOUR_MS;
        out.push_str(&format!(
            "{open_time},{open},{high},{low},{close},{volume},{close_time},1.0,10,0.5,0.5,0\n",
            open = close - 5.0,
            high = close + 25.0,
            low = close - 30.0,
            volume = 100.0 + t,
            close_time = open_time + HOUR_MS - 1,
        ));
    }
    out
}

fn setup(dir: &Path, csv: &str) -> PipelineConfig {
    let input = dir.join("raw/raw_data.csv");
    fs::create_dir_all(input.parent().unwrap()).unwrap();
    fs::write(&input, csv).unwrap();
    PipelineConfig {
        input,
        output: dir.join("feature_engineered/feature_engineered_data.csv"),
        format: None,
        summary: None,
    }
}

fn tmp_sibling(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

#[test]
fn thousand_rows_in_nine_hundred_fifty_out() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path(), &kline_csv(1000));

    let output = run_pipeline(&config).unwrap();
    assert_eq!(output.rows.len(), 950);
    assert_eq!(output.summary.input_rows, 1000);
    assert_eq!(output.summary.output_rows, 950);
    assert_eq!(output.summary.rows_dropped, 50);
    assert_eq!(output.summary.dropped_by_reason[&DropReason::IndicatorWarmup], 49);
    assert_eq!(output.summary.label_distribution.total(), 950);
    assert_eq!(output.summary.format, OutputFormat::Csv);

    let csv = fs::read_to_string(&config.output).unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next().unwrap(),
        "open_time,open,high,low,close,volume,rsi,macd,macd_signal,sma_20,sma_50,\
         bb_high,bb_low,pct_change_1d,pct_change_7d,volatility,label"
    );
    let first = lines.next().unwrap();
    // Bar 49: 2024-01-01 00:00 + 49h
    assert!(first.starts_with("2024-01-03 01:00:00,"), "{first}");
    assert_eq!(csv.lines().count(), 951);
    assert!(!csv.contains("NaN"));
    assert!(!tmp_sibling(&config.output).exists());
}

#[test]
fn reruns_are_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = setup(dir.path(), &kline_csv(300));
    config.summary = Some(dir.path().join("summary.json"));

    let first = run_pipeline(&config).unwrap();
    let table_a = fs::read(&config.output).unwrap();
    let summary_a = fs::read(config.summary.as_ref().unwrap()).unwrap();

    let second = run_pipeline(&config).unwrap();
    let table_b = fs::read(&config.output).unwrap();
    let summary_b = fs::read(config.summary.as_ref().unwrap()).unwrap();

    assert_eq!(table_a, table_b);
    assert_eq!(summary_a, summary_b);
    assert_eq!(first.summary, second.summary);
    assert_eq!(first.rows, second.rows);
}

#[test]
fn summary_json_matches_returned_summary() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = setup(dir.path(), &kline_csv(120));
    config.summary = Some(dir.path().join("reports/summary.json"));

    let output = run_pipeline(&config).unwrap();
    let json = fs::read_to_string(config.summary.as_ref().unwrap()).unwrap();
    let parsed: PipelineSummary = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, output.summary);
    assert_eq!(parsed.first_open_time, output.rows[0].open_time);
}

#[test]
fn failed_summary_write_leaves_no_table() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = setup(dir.path(), &kline_csv(120));
    // An occupied directory where the summary file should go
    let summary = dir.path().join("reports");
    fs::create_dir_all(summary.join("previous")).unwrap();
    config.summary = Some(summary.clone());

    let err = run_pipeline(&config).unwrap_err();
    assert!(matches!(err, RunError::Export(_)), "{err}");
    assert!(!config.output.exists());
    assert!(!tmp_sibling(&config.output).exists());
    assert!(summary.join("previous").is_dir());
}

#[test]
fn failed_table_write_removes_summary() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = setup(dir.path(), &kline_csv(120));
    fs::create_dir_all(config.output.join("occupied")).unwrap();
    let summary = dir.path().join("summary.json");
    config.summary = Some(summary.clone());

    let err = run_pipeline(&config).unwrap_err();
    assert!(matches!(err, RunError::Export(_)), "{err}");
    assert!(!summary.exists());
    assert!(!tmp_sibling(&summary).exists());
}

#[test]
fn missing_input_fails_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let config = PipelineConfig {
        input: dir.path().join("raw/absent.csv"),
        output: dir.path().join("out/features.csv"),
        ..PipelineConfig::default()
    };

    let err = run_pipeline(&config).unwrap_err();
    assert!(matches!(err, RunError::SourceNotFound { .. }), "{err}");
    assert!(!config.output.exists());
    assert!(!dir.path().join("out").exists());
}

#[test]
fn malformed_cell_is_data_format_error() {
    let dir = tempfile::tempdir().unwrap();
    let csv: Vec<String> = kline_csv(100)
        .lines()
        .enumerate()
        .map(|(i, line)| {
            if i == 2 {
                let mut fields: Vec<&str> = line.split(',').collect();
                fields[1] = "oops";
                fields.join(",")
            } else {
                line.to_string()
            }
        })
        .collect();
    let config = setup(dir.path(), &(csv.join("\n") + "\n"));

    let err = run_pipeline(&config).unwrap_err();
    match err {
        RunError::DataFormat { source, .. } => match source {
            DataFormatError::InvalidNumber { row, column, value } => {
                assert_eq!(row, 2);
                assert_eq!(column, "open");
                assert_eq!(value, "oops");
            }
            other => panic!("expected InvalidNumber, got {other}"),
        },
        other => panic!("expected DataFormat, got {other}"),
    }
    assert!(!config.output.exists());
}

#[test]
fn missing_column_is_data_format_error() {
    let dir = tempfile::tempdir().unwrap();
    let csv = kline_csv(100).replacen("volume", "vol", 1);
    let config = setup(dir.path(), &csv);

    let err = run_pipeline(&config).unwrap_err();
    assert!(matches!(
        err,
        RunError::DataFormat {
            source: DataFormatError::MissingColumn { .. },
            ..
        }
    ));
}

#[test]
fn short_input_is_empty_result() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path(), &kline_csv(50));

    let err = run_pipeline(&config).unwrap_err();
    assert!(matches!(
        err,
        RunError::EmptyResult(FeatureError::EmptyResult {
            input_rows: 50,
            required_rows: 51
        })
    ));
    assert!(!config.output.exists());
}

#[test]
fn parquet_output_by_extension() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = setup(dir.path(), &kline_csv(200));
    config.output = dir.path().join("out/features.parquet");

    let output = run_pipeline(&config).unwrap();
    assert_eq!(output.summary.format, OutputFormat::Parquet);

    let file = fs::File::open(&config.output).unwrap();
    use polars::prelude::{ParquetReader, SerReader};
    let df = ParquetReader::new(file).finish().unwrap();
    assert_eq!(df.shape(), (150, 17));
}

#[test]
fn parquet_input_matches_csv_input() {
    let dir = tempfile::tempdir().unwrap();
    let csv_config = setup(dir.path(), &kline_csv(150));
    let from_csv = run_pipeline(&csv_config).unwrap();

    // Feed the parquet output's source bars back in through a parquet input
    let bars = featurelab_core::data::load_bars(&csv_config.input).unwrap();
    let mut df = polars::prelude::df!(
        "open_time" => bars.iter().map(|b| b.open_time_ms()).collect::<Vec<_>>(),
        "open" => bars.iter().map(|b| b.open).collect::<Vec<_>>(),
        "high" => bars.iter().map(|b| b.high).collect::<Vec<_>>(),
        "low" => bars.iter().map(|b| b.low).collect::<Vec<_>>(),
        "close" => bars.iter().map(|b| b.close).collect::<Vec<_>>(),
        "volume" => bars.iter().map(|b| b.volume).collect::<Vec<_>>(),
    )
    .unwrap();
    let parquet_input = dir.path().join("raw/raw_data.parquet");
    polars::prelude::ParquetWriter::new(fs::File::create(&parquet_input).unwrap())
        .finish(&mut df)
        .unwrap();

    let parquet_config = PipelineConfig {
        input: parquet_input,
        output: dir.path().join("from_parquet.csv"),
        ..PipelineConfig::default()
    };
    let from_parquet = run_pipeline(&parquet_config).unwrap();

    assert_eq!(from_csv.rows, from_parquet.rows);
    assert_eq!(from_csv.summary.dataset_hash, from_parquet.summary.dataset_hash);
}

#[test]
fn check_reports_expected_rows_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path(), &kline_csv(1000));

    let report = check_input(&config.input).unwrap();
    assert_eq!(report.bars, 1000);
    assert_eq!(report.expected_rows, 950);
    assert_eq!(report.required_rows, 51);
    assert_eq!(report.first_open_time.timestamp_millis(), BASE_MS);
    assert!(!config.output.exists());
}

#[test]
fn config_file_drives_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let base = setup(dir.path(), &kline_csv(80));
    let toml_path = dir.path().join("featurelab.toml");
    fs::write(
        &toml_path,
        format!(
            "input = {:?}\noutput = {:?}\nformat = \"parquet\"\n",
            base.input.display().to_string(),
            dir.path().join("table.bin").display().to_string(),
        ),
    )
    .unwrap();

    let config = PipelineConfig::from_file(&toml_path).unwrap();
    assert_eq!(config.output_format(), OutputFormat::Parquet);
    let output = run_pipeline(&config).unwrap();
    assert_eq!(output.rows.len(), 30);
    assert!(dir.path().join("table.bin").exists());
}
