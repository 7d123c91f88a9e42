//! Error types for interval construction and timeline queries.

use chrono::{NaiveDateTime, TimeDelta};
use thiserror::Error;

/// Errors raised by the interval model.
///
/// All of these are deterministic functions of the input: nothing here is
/// transient, so callers should not retry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// An interval was constructed with its end before its start.
    #[error("invalid interval: end {end} is before start {start}")]
    InvalidInterval {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    /// A query window starts after the query time.
    #[error("invalid query: window start {window_start} is after query time {query_time}")]
    InvalidQuery {
        window_start: NaiveDateTime,
        query_time: NaiveDateTime,
    },

    /// A duration that must be non-negative was negative.
    #[error("duration must not be negative: {0}")]
    NegativeDuration(TimeDelta),

    /// A duration unit name was not recognised.
    #[error("unknown duration unit '{0}'")]
    UnknownUnit(String),

    /// A duration quantity could not be represented.
    #[error("invalid duration quantity {quantity} {unit}")]
    InvalidQuantity { quantity: f64, unit: String },
}

pub type Result<T> = std::result::Result<T, ModelError>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_error_display() {
        let err = ModelError::InvalidInterval {
            start: at(5),
            end: at(2),
        };
        assert_eq!(
            err.to_string(),
            "invalid interval: end 2024-01-02 00:00:00 is before start 2024-01-05 00:00:00"
        );
    }

    #[test]
    fn test_unknown_unit_display() {
        let err = ModelError::UnknownUnit("fortnights".to_string());
        assert_eq!(err.to_string(), "unknown duration unit 'fortnights'");
    }
}
