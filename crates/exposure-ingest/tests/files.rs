//! Loading events and queries from files on disk.

use std::io::Write;
use std::path::PathBuf;

use chrono::TimeDelta;
use tempfile::{NamedTempFile, TempDir};

use exposure_ingest::{
    ColumnNames, IngestError, OutputOptions, read_events, read_queries, write_rows_csv,
};
use exposure_timeline::{SplitMode, build_timelines, query_batch};

fn create_temp_csv(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", content).unwrap();
    file
}

#[test]
fn test_events_with_bom_and_mixed_case_header() {
    let file = create_temp_csv(
        "\u{feff}Patient_ID,Drug_Event_Datetime\nalice,2018-01-05\nalice,2018-01-06T00:00:00\n",
    );
    let events = read_events(file.path(), &ColumnNames::default()).unwrap();
    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|event| event.entity == "alice"));
}

#[test]
fn test_missing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.csv");
    let err = read_events(&path, &ColumnNames::default()).unwrap_err();
    match err {
        IngestError::FileNotFound { path: reported } => assert_eq!(reported, path),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_missing_column_names_file() {
    let file = create_temp_csv("patient_id,start\nalice,2017-01-01\n");
    let err = read_queries(file.path(), &ColumnNames::default()).unwrap_err();
    match err {
        IngestError::MissingColumn { column, path } => {
            assert_eq!(column, "when");
            assert_eq!(path, PathBuf::from(file.path()));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_invalid_timestamp_reports_location() {
    let file = create_temp_csv("patient_id,start,when\nalice,2017-01-01,2018-01-01\nbob,2015-01-01,later\n");
    let err = read_queries(file.path(), &ColumnNames::default()).unwrap_err();
    let message = err.to_string();
    assert!(matches!(err, IngestError::InvalidTimestamp { row: 2, .. }));
    assert!(message.contains("'later'"));
    assert!(message.contains("column when"));
}

#[test]
fn test_files_through_batch_to_csv() {
    let events = create_temp_csv(
        "patient_id,drug_event_datetime\nalice,2018-01-05\nalice,2018-01-20\n",
    );
    let queries = create_temp_csv(
        "patient_id,start,when\nalice,2018-01-01,2018-01-02\nalice,2018-01-01,2018-01-11\nzack,2018-01-01,2018-01-11\n",
    );
    let columns = ColumnNames::default();
    let timelines = build_timelines(
        read_events(events.path(), &columns).unwrap(),
        TimeDelta::days(3),
    )
    .unwrap();
    let queries = read_queries(queries.path(), &columns).unwrap();
    let rows = query_batch(&timelines, &queries, SplitMode::Exposure).unwrap();

    let mut out = Vec::new();
    write_rows_csv(&mut out, &rows, OutputOptions::default()).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "patient_id,start,t,before_days,during_days,after_days\n\
         alice,2018-01-01T00:00:00,2018-01-02T00:00:00,0,0,0\n\
         alice,2018-01-01T00:00:00,2018-01-11T00:00:00,0,3,0\n\
         zack,2018-01-01T00:00:00,2018-01-11T00:00:00,0,0,0\n"
    );
}

#[test]
fn test_row_numbers_count_empty_crlf_lines() {
    let file = create_temp_csv(
        "patient_id,start,when\r\nalice,2017-01-01,2018-01-01\r\n\r\n\r\nbob,2015-01-01,later\r\n",
    );
    let err = read_queries(file.path(), &ColumnNames::default()).unwrap_err();
    assert!(matches!(err, IngestError::InvalidTimestamp { row: 4, .. }));
}
