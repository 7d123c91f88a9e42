//! CSV ingestion of exposure events and queries, and output of result rows.
//!
//! # Modules
//!
//! - [`reader`]: events and queries from CSV files or readers
//! - [`writer`]: result rows as CSV or JSON
//! - [`columns`]: configurable input column names
//! - [`datetime`]: timestamp cell parsing

pub mod columns;
pub mod datetime;
pub mod error;
pub mod reader;
pub mod writer;

pub use columns::ColumnNames;
pub use datetime::parse_timestamp;
pub use error::{IngestError, Result};
pub use reader::{read_events, read_events_from_reader, read_queries, read_queries_from_reader};
pub use writer::{OutputOptions, OutputRow, write_rows_csv, write_rows_json};
