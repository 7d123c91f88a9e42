//! Interval data model for drug exposure timelines.
//!
//! - **interval**: half-open `[start, end)` spans of time
//! - **store**: normalized, merge-on-insert interval collections and the
//!   cumulative before/during/after queries
//! - **split**: the before/during/after result type
//! - **units**: duration unit parsing and conversion
//! - **error**: model error taxonomy

pub mod error;
pub mod interval;
pub mod serde_seconds;
pub mod split;
pub mod store;
pub mod units;

pub use error::{ModelError, Result};
pub use interval::Interval;
pub use split::BeforeDuringAfter;
pub use store::{Flexibility, IntervalStore};
pub use units::{DurationUnit, convert_duration, duration_from_quantity};
