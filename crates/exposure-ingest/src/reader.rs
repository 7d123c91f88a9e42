//! Reading exposure events and queries from CSV.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDateTime;
use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, info};

use exposure_timeline::{ExposureEvent, ExposureQuery};

use crate::columns::{ColumnNames, find_column};
use crate::datetime::parse_timestamp;
use crate::error::{IngestError, Result};

/// Label used in errors for input that did not come from a named file.
pub const READER_LABEL: &str = "<input>";

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IngestError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IngestError::FileRead {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })
}

fn normalize_cell(raw: &str) -> &str {
    raw.trim().trim_matches('\u{feff}')
}

/// Data rows with their 1-based row numbers; all-blank rows are skipped.
struct Rows<'a> {
    path: &'a Path,
    headers: StringRecord,
    records: Vec<(usize, StringRecord)>,
}

fn read_rows<'a, R: Read>(mut reader: R, path: &'a Path) -> Result<Rows<'a>> {
    let mut input = Vec::new();
    reader
        .read_to_end(&mut input)
        .map_err(|source| IngestError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .from_reader(input.as_slice());
    let headers = reader
        .headers()
        .map_err(|source| IngestError::CsvParse {
            path: path.to_path_buf(),
            source,
        })?
        .clone();
    if headers.iter().all(|header| normalize_cell(header).is_empty()) {
        return Err(IngestError::EmptyCsv {
            path: path.to_path_buf(),
        });
    }

    let header_line = record_line(&input, &headers).unwrap_or(1);
    let mut records = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.map_err(|source| IngestError::CsvParse {
            path: path.to_path_buf(),
            source,
        })?;
        if record.iter().all(|value| normalize_cell(value).is_empty()) {
            continue;
        }
        let row = record_line(&input, &record)
            .map_or(idx + 1, |line| line.saturating_sub(header_line));
        records.push((row, record));
    }
    Ok(Rows {
        path,
        headers,
        records,
    })
}

/// 1-based physical line on which `record` starts.
///
/// The parser drops empty lines without yielding a record, and a record's
/// position may point at the empty lines in front of it, so those are
/// skipped here before counting.
fn record_line(input: &[u8], record: &StringRecord) -> Option<usize> {
    let byte = usize::try_from(record.position()?.byte()).ok()?;
    let start = byte.min(input.len());
    let content = start
        + input[start..]
            .iter()
            .take_while(|b| matches!(b, b'\r' | b'\n'))
            .count();
    Some(input[..content].iter().filter(|&&b| b == b'\n').count() + 1)
}

impl Rows<'_> {
    fn column(&self, name: &str) -> Result<Column> {
        Ok(Column {
            index: find_column(&self.headers, name, self.path)?,
            name: name.to_string(),
        })
    }

    fn entity(&self, row: usize, record: &StringRecord, column: &Column) -> Result<String> {
        let value = column.cell(record);
        if value.is_empty() {
            return Err(IngestError::EmptyEntity {
                path: self.path.to_path_buf(),
                row,
                column: column.name.clone(),
            });
        }
        Ok(value.to_string())
    }

    fn timestamp(&self, row: usize, record: &StringRecord, column: &Column) -> Result<NaiveDateTime> {
        let value = column.cell(record);
        parse_timestamp(value).ok_or_else(|| IngestError::InvalidTimestamp {
            path: self.path.to_path_buf(),
            row,
            column: column.name.clone(),
            value: value.to_string(),
        })
    }
}

struct Column {
    index: usize,
    name: String,
}

impl Column {
    fn cell<'r>(&self, record: &'r StringRecord) -> &'r str {
        record.get(self.index).map(normalize_cell).unwrap_or("")
    }
}

/// Reads `(patient, event datetime)` rows from a CSV file.
pub fn read_events(path: &Path, columns: &ColumnNames) -> Result<Vec<ExposureEvent<String>>> {
    let events = parse_events(open(path)?, path, columns)?;
    info!(path = %path.display(), event_count = events.len(), "events loaded");
    Ok(events)
}

/// Reads `(patient, event datetime)` rows from any reader.
pub fn read_events_from_reader<R: Read>(
    reader: R,
    columns: &ColumnNames,
) -> Result<Vec<ExposureEvent<String>>> {
    parse_events(reader, Path::new(READER_LABEL), columns)
}

fn parse_events<R: Read>(
    reader: R,
    path: &Path,
    columns: &ColumnNames,
) -> Result<Vec<ExposureEvent<String>>> {
    let rows = read_rows(reader, path)?;
    let patient = rows.column(&columns.patient)?;
    let at = rows.column(&columns.event_datetime)?;
    debug!(
        path = %path.display(),
        patient_index = patient.index,
        event_index = at.index,
        "event columns resolved"
    );

    rows.records
        .iter()
        .map(|(row, record)| {
            Ok(ExposureEvent::new(
                rows.entity(*row, record, &patient)?,
                rows.timestamp(*row, record, &at)?,
            ))
        })
        .collect()
}

/// Reads `(patient, start, when)` rows from a CSV file.
pub fn read_queries(path: &Path, columns: &ColumnNames) -> Result<Vec<ExposureQuery<String>>> {
    let queries = parse_queries(open(path)?, path, columns)?;
    info!(path = %path.display(), query_count = queries.len(), "queries loaded");
    Ok(queries)
}

/// Reads `(patient, start, when)` rows from any reader.
pub fn read_queries_from_reader<R: Read>(
    reader: R,
    columns: &ColumnNames,
) -> Result<Vec<ExposureQuery<String>>> {
    parse_queries(reader, Path::new(READER_LABEL), columns)
}

fn parse_queries<R: Read>(
    reader: R,
    path: &Path,
    columns: &ColumnNames,
) -> Result<Vec<ExposureQuery<String>>> {
    let rows = read_rows(reader, path)?;
    let patient = rows.column(&columns.patient)?;
    let start = rows.column(&columns.start)?;
    let when = rows.column(&columns.when)?;

    rows.records
        .iter()
        .map(|(row, record)| {
            Ok(ExposureQuery::new(
                rows.entity(*row, record, &patient)?,
                rows.timestamp(*row, record, &start)?,
                rows.timestamp(*row, record, &when)?,
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        chrono::NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_read_events_from_reader() {
        let data = "patient_id,drug_event_datetime\nalice,2018-01-05\nbob,2018-06-05 08:00\n";
        let events = read_events_from_reader(data.as_bytes(), &ColumnNames::default()).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], ExposureEvent::new("alice".to_string(), at(2018, 1, 5)));
        assert_eq!(events[1].entity, "bob");
    }

    #[test]
    fn test_extra_columns_and_order_ignored() {
        let data = "when,note,START,Patient_Id\n2018-02-01,x,2017-01-01,alice\n";
        let queries = read_queries_from_reader(data.as_bytes(), &ColumnNames::default()).unwrap();
        assert_eq!(
            queries,
            vec![ExposureQuery::new(
                "alice".to_string(),
                at(2017, 1, 1),
                at(2018, 2, 1)
            )]
        );
    }

    #[test]
    fn test_blank_rows_skipped_but_counted() {
        let data = "patient_id,drug_event_datetime\nalice,2018-01-05\n,\nbob,nope\n";
        let err = read_events_from_reader(data.as_bytes(), &ColumnNames::default()).unwrap_err();
        match err {
            IngestError::InvalidTimestamp { row, value, .. } => {
                assert_eq!(row, 3);
                assert_eq!(value, "nope");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_lines_still_counted() {
        let data = "patient_id,drug_event_datetime\nalice,2018-01-05\n\n\nbob,nope\n";
        let err = read_events_from_reader(data.as_bytes(), &ColumnNames::default()).unwrap_err();
        assert!(matches!(err, IngestError::InvalidTimestamp { row: 4, .. }));
    }

    #[test]
    fn test_leading_empty_lines_before_header() {
        let data = "\n\npatient_id,drug_event_datetime\nalice,never\n";
        let err = read_events_from_reader(data.as_bytes(), &ColumnNames::default()).unwrap_err();
        assert!(matches!(err, IngestError::InvalidTimestamp { row: 1, .. }));
    }

    #[test]
    fn test_empty_entity() {
        let data = "patient_id,drug_event_datetime\n  ,2018-01-05\n";
        let err = read_events_from_reader(data.as_bytes(), &ColumnNames::default()).unwrap_err();
        assert!(matches!(err, IngestError::EmptyEntity { row: 1, .. }));
    }

    #[test]
    fn test_empty_input() {
        let err = read_events_from_reader("".as_bytes(), &ColumnNames::default()).unwrap_err();
        assert!(matches!(err, IngestError::EmptyCsv { .. }));
    }

    #[test]
    fn test_custom_columns() {
        let data = "USUBJID,EXSTDTC\nS001,2024-01-15T09:00\n";
        let columns = ColumnNames::new()
            .with_patient("usubjid")
            .with_event_datetime("exstdtc");
        let events = read_events_from_reader(data.as_bytes(), &columns).unwrap();
        assert_eq!(events[0].entity, "S001");
    }
}
