//! Stages shared by the subcommands: load, compute, write.

use std::io::Write;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use chrono::TimeDelta;
use tracing::{debug, info, info_span};

use exposure_ingest::{
    ColumnNames, OutputOptions, read_events, read_queries, write_rows_csv, write_rows_json,
};
use exposure_model::{DurationUnit, duration_from_quantity};
use exposure_timeline::{
    CumulativeResult, ExposureEvent, ExposureQuery, QueryRow, TimelineOptions, Timelines,
    build_timelines, cumulative_time_on_drug,
};

/// Serialized output formats. Tables are rendered by the binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowFormat {
    Csv,
    Json,
}

#[derive(Debug, Clone)]
pub struct IngestResult {
    pub events: Vec<ExposureEvent<String>>,
    pub queries: Vec<ExposureQuery<String>>,
}

/// Converts `--duration`/`--units` into the length of one event.
pub fn event_duration(quantity: f64, unit: DurationUnit) -> Result<TimeDelta> {
    if quantity < 0.0 {
        bail!("event duration must not be negative: {quantity} {unit}");
    }
    duration_from_quantity(quantity, unit).context("event duration")
}

pub fn ingest(events: &Path, queries: &Path, columns: &ColumnNames) -> Result<IngestResult> {
    let span = info_span!("ingest");
    let _guard = span.enter();
    let start = Instant::now();
    let events =
        read_events(events, columns).with_context(|| format!("read {}", events.display()))?;
    let queries =
        read_queries(queries, columns).with_context(|| format!("read {}", queries.display()))?;
    debug!(
        event_count = events.len(),
        query_count = queries.len(),
        duration_ms = start.elapsed().as_millis(),
        "ingest complete"
    );
    Ok(IngestResult { events, queries })
}

pub fn load_timelines(
    path: &Path,
    columns: &ColumnNames,
    event_duration: TimeDelta,
) -> Result<Timelines<String>> {
    let events =
        read_events(path, columns).with_context(|| format!("read {}", path.display()))?;
    let timelines = build_timelines(events, event_duration).context("build timelines")?;
    info!(
        entity_count = timelines.len(),
        interval_count = timelines.interval_count(),
        "timelines loaded"
    );
    Ok(timelines)
}

pub fn compute(
    input: &IngestResult,
    event_duration: TimeDelta,
    options: TimelineOptions,
) -> Result<CumulativeResult<String>> {
    cumulative_time_on_drug(
        input.events.iter().cloned(),
        event_duration,
        &input.queries,
        options,
    )
    .context("compute cumulative exposure")
}

pub fn write_rows<W: Write>(
    writer: W,
    rows: &[QueryRow<String>],
    format: RowFormat,
    options: OutputOptions,
) -> Result<()> {
    match format {
        RowFormat::Csv => write_rows_csv(writer, rows, options).context("write CSV rows"),
        RowFormat::Json => write_rows_json(writer, rows, options).context("write JSON rows"),
    }
}
