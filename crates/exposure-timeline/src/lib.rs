//! Per-entity drug exposure timelines.
//!
//! Events are turned into fixed-length intervals, merged into one
//! [`IntervalStore`](exposure_model::IntervalStore) per entity, and queried in
//! batches for cumulative time before, during, and after a window.

pub mod error;
pub mod query;
pub mod timelines;

pub use error::{Result, TimelineError};
pub use query::{
    CumulativeResult, ErrorPolicy, ExposureQuery, QueryRow, SplitMode, TimelineOptions,
    cumulative_time_on_drug, query_batch, query_batch_each,
};
pub use timelines::{ExposureEvent, Timelines, build_timelines};
