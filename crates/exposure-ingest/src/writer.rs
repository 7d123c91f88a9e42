//! CSV and JSON output of query rows.

use std::fmt::Display;
use std::io::Write;

use chrono::NaiveDateTime;
use serde::Serialize;

use exposure_timeline::QueryRow;

use crate::error::{IngestError, Result};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const DAY_COLUMNS: [&str; 6] = [
    "patient_id",
    "start",
    "t",
    "before_days",
    "during_days",
    "after_days",
];
const SECOND_COLUMNS: [&str; 3] = ["before_seconds", "during_seconds", "after_seconds"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputOptions {
    /// Also emit exact durations in seconds next to the whole-day columns.
    pub include_timedelta: bool,
}

impl OutputOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timedelta(mut self, include: bool) -> Self {
        self.include_timedelta = include;
        self
    }

    pub fn header(&self) -> Vec<&'static str> {
        let mut header = DAY_COLUMNS.to_vec();
        if self.include_timedelta {
            header.extend(SECOND_COLUMNS);
        }
        header
    }
}

/// Output record shared by the CSV and JSON writers.
#[derive(Debug, Clone, Serialize)]
pub struct OutputRow {
    pub patient_id: String,
    pub start: NaiveDateTime,
    pub t: NaiveDateTime,
    pub before_days: i64,
    pub during_days: i64,
    pub after_days: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before_seconds: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub during_seconds: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after_seconds: Option<i64>,
}

impl OutputRow {
    pub fn from_row<K: Display>(row: &QueryRow<K>, options: OutputOptions) -> Self {
        let split = &row.split;
        let seconds = |delta: chrono::TimeDelta| options.include_timedelta.then(|| delta.num_seconds());
        Self {
            patient_id: row.entity.to_string(),
            start: row.window_start,
            t: row.query_time,
            before_days: split.before_days(),
            during_days: split.during_days(),
            after_days: split.after_days(),
            before_seconds: seconds(split.before),
            during_seconds: seconds(split.during),
            after_seconds: seconds(split.after),
        }
    }

    fn to_record(&self) -> Vec<String> {
        let mut record = vec![
            self.patient_id.clone(),
            self.start.format(TIMESTAMP_FORMAT).to_string(),
            self.t.format(TIMESTAMP_FORMAT).to_string(),
            self.before_days.to_string(),
            self.during_days.to_string(),
            self.after_days.to_string(),
        ];
        record.extend(
            [self.before_seconds, self.during_seconds, self.after_seconds]
                .into_iter()
                .flatten()
                .map(|seconds| seconds.to_string()),
        );
        record
    }
}

/// Writes rows as CSV with a header line.
pub fn write_rows_csv<W: Write, K: Display>(
    writer: W,
    rows: &[QueryRow<K>],
    options: OutputOptions,
) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    let write_err = |source| IngestError::CsvWrite { source };
    csv_writer.write_record(options.header()).map_err(write_err)?;
    for row in rows {
        csv_writer
            .write_record(OutputRow::from_row(row, options).to_record())
            .map_err(write_err)?;
    }
    csv_writer
        .flush()
        .map_err(|e| IngestError::CsvWrite { source: e.into() })
}

/// Writes rows as a pretty-printed JSON array.
pub fn write_rows_json<W: Write, K: Display>(
    writer: W,
    rows: &[QueryRow<K>],
    options: OutputOptions,
) -> Result<()> {
    let records: Vec<OutputRow> = rows
        .iter()
        .map(|row| OutputRow::from_row(row, options))
        .collect();
    serde_json::to_writer_pretty(writer, &records)
        .map_err(|source| IngestError::JsonWrite { source })
}
