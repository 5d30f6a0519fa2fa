//! Data ingestion: CSV and Parquet input to typed bars.

pub mod ingest;
pub mod parquet;

pub use ingest::{load_bars, read_csv_bars, DataError, DataFormatError, InputFormat};
pub use parquet::{dataframe_to_bars, read_parquet_bars};
