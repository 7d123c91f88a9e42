//! Input column naming and header lookup.

use std::path::Path;

use csv::StringRecord;

use crate::error::{IngestError, Result};

pub const DEFAULT_PATIENT_COLUMN: &str = "patient_id";
pub const DEFAULT_EVENT_DATETIME_COLUMN: &str = "drug_event_datetime";
pub const DEFAULT_START_COLUMN: &str = "start";
pub const DEFAULT_WHEN_COLUMN: &str = "when";

/// Names of the input columns. Events use `patient` and `event_datetime`;
/// queries use `patient`, `start`, and `when`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnNames {
    pub patient: String,
    pub event_datetime: String,
    pub start: String,
    pub when: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            patient: DEFAULT_PATIENT_COLUMN.to_string(),
            event_datetime: DEFAULT_EVENT_DATETIME_COLUMN.to_string(),
            start: DEFAULT_START_COLUMN.to_string(),
            when: DEFAULT_WHEN_COLUMN.to_string(),
        }
    }
}

impl ColumnNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_patient(mut self, name: impl Into<String>) -> Self {
        self.patient = name.into();
        self
    }

    pub fn with_event_datetime(mut self, name: impl Into<String>) -> Self {
        self.event_datetime = name.into();
        self
    }

    pub fn with_start(mut self, name: impl Into<String>) -> Self {
        self.start = name.into();
        self
    }

    pub fn with_when(mut self, name: impl Into<String>) -> Self {
        self.when = name.into();
        self
    }
}

pub(crate) fn normalize_header(raw: &str) -> &str {
    raw.trim().trim_matches('\u{feff}').trim()
}

/// Position of `column` in `headers`, compared case-insensitively.
pub(crate) fn find_column(headers: &StringRecord, column: &str, path: &Path) -> Result<usize> {
    let wanted = normalize_header(column);
    headers
        .iter()
        .position(|header| normalize_header(header).eq_ignore_ascii_case(wanted))
        .ok_or_else(|| IngestError::MissingColumn {
            column: column.to_string(),
            path: path.to_path_buf(),
        })
}
