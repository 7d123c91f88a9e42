//! Batch before/during/after queries over per-entity timelines.

use std::fmt;
use std::time::Instant;

use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span};

use exposure_model::{BeforeDuringAfter, IntervalStore};

use crate::error::{Result, TimelineError};
use crate::timelines::{ExposureEvent, Timelines, build_timelines};

/// Which split a query computes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitMode {
    /// Stored exposure, bucketed around `[window_start, query_time)`.
    #[default]
    Exposure,
    /// Elapsed time since `window_start`, bucketed into pre-treatment, on
    /// treatment, and off treatment.
    TreatmentCourse,
}

impl SplitMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SplitMode::Exposure => "exposure",
            SplitMode::TreatmentCourse => "treatment_course",
        }
    }

    /// Runs this split against a single store.
    pub fn split(
        self,
        store: &IntervalStore,
        window_start: NaiveDateTime,
        query_time: NaiveDateTime,
    ) -> exposure_model::Result<BeforeDuringAfter> {
        match self {
            SplitMode::Exposure => store.cumulative_before_during_after(window_start, query_time),
            SplitMode::TreatmentCourse => store.treatment_course_split(window_start, query_time),
        }
    }
}

impl fmt::Display for SplitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to do with a query whose window is inverted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Abort the batch at the first invalid query.
    #[default]
    Halt,
    /// Leave the query out of the result rows and report it as rejected.
    Skip,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExposureQuery<K> {
    pub entity: K,
    pub window_start: NaiveDateTime,
    pub query_time: NaiveDateTime,
}

impl<K> ExposureQuery<K> {
    pub fn new(entity: K, window_start: NaiveDateTime, query_time: NaiveDateTime) -> Self {
        Self {
            entity,
            window_start,
            query_time,
        }
    }
}

/// One output row: the query echoed back with its split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryRow<K> {
    pub entity: K,
    pub window_start: NaiveDateTime,
    pub query_time: NaiveDateTime,
    #[serde(flatten)]
    pub split: BeforeDuringAfter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimelineOptions {
    pub mode: SplitMode,
    pub on_error: ErrorPolicy,
}

impl TimelineOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: SplitMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_error_policy(mut self, on_error: ErrorPolicy) -> Self {
        self.on_error = on_error;
        self
    }
}

/// Rows for the accepted queries, in input order, plus the rejected ones.
#[derive(Debug, Clone, PartialEq)]
pub struct CumulativeResult<K> {
    pub rows: Vec<QueryRow<K>>,
    pub rejected: Vec<TimelineError>,
}

impl<K> CumulativeResult<K> {
    pub fn has_rejections(&self) -> bool {
        !self.rejected.is_empty()
    }
}

fn run_query<K: Ord + Clone>(
    timelines: &Timelines<K>,
    index: usize,
    query: &ExposureQuery<K>,
    mode: SplitMode,
) -> Result<QueryRow<K>> {
    let empty = IntervalStore::new();
    // An entity without events answers as an empty timeline.
    let store = timelines.get(&query.entity).unwrap_or(&empty);
    let split = mode
        .split(store, query.window_start, query.query_time)
        .map_err(|source| TimelineError::InvalidQuery { index, source })?;
    Ok(QueryRow {
        entity: query.entity.clone(),
        window_start: query.window_start,
        query_time: query.query_time,
        split,
    })
}

/// Answers every query in order. The first invalid query aborts the batch.
///
/// # Errors
///
/// Returns [`TimelineError::InvalidQuery`] carrying the zero-based index of
/// the first query whose window start is after its query time.
pub fn query_batch<K: Ord + Clone>(
    timelines: &Timelines<K>,
    queries: &[ExposureQuery<K>],
    mode: SplitMode,
) -> Result<Vec<QueryRow<K>>> {
    queries
        .iter()
        .enumerate()
        .map(|(index, query)| run_query(timelines, index, query, mode))
        .collect()
}

/// Answers every query in order, keeping one outcome per query.
pub fn query_batch_each<K: Ord + Clone>(
    timelines: &Timelines<K>,
    queries: &[ExposureQuery<K>],
    mode: SplitMode,
) -> Vec<Result<QueryRow<K>>> {
    queries
        .iter()
        .enumerate()
        .map(|(index, query)| run_query(timelines, index, query, mode))
        .collect()
}

/// Builds timelines from `events` and answers `queries` against them.
///
/// With [`ErrorPolicy::Halt`] the first invalid query is returned as the
/// error. With [`ErrorPolicy::Skip`] invalid queries are collected in
/// [`CumulativeResult::rejected`] and the remaining rows are kept in order.
///
/// # Errors
///
/// Fails if the timelines cannot be built, or under `Halt` for an invalid
/// query.
pub fn cumulative_time_on_drug<K, I>(
    events: I,
    event_duration: TimeDelta,
    queries: &[ExposureQuery<K>],
    options: TimelineOptions,
) -> Result<CumulativeResult<K>>
where
    K: Ord + Clone,
    I: IntoIterator<Item = ExposureEvent<K>>,
{
    let span = info_span!(
        "cumulative_time_on_drug",
        mode = %options.mode,
        event_duration_secs = event_duration.num_seconds(),
        query_count = queries.len()
    );
    let _guard = span.enter();
    let start = Instant::now();

    let timelines = build_timelines(events, event_duration)?;

    let (rows, rejected) = match options.on_error {
        ErrorPolicy::Halt => (query_batch(&timelines, queries, options.mode)?, Vec::new()),
        ErrorPolicy::Skip => {
            let mut rows = Vec::with_capacity(queries.len());
            let mut rejected = Vec::new();
            for outcome in query_batch_each(&timelines, queries, options.mode) {
                match outcome {
                    Ok(row) => rows.push(row),
                    Err(err) => {
                        debug!(index = err.index(), error = %err, "query rejected");
                        rejected.push(err);
                    }
                }
            }
            (rows, rejected)
        }
    };

    debug!(
        entity_count = timelines.len(),
        row_count = rows.len(),
        rejected_count = rejected.len(),
        duration_ms = start.elapsed().as_millis(),
        "queries answered"
    );
    info!(
        row_count = rows.len(),
        rejected_count = rejected.len(),
        "cumulative time on drug complete"
    );
    Ok(CumulativeResult { rows, rejected })
}
