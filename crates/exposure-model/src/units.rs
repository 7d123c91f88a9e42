//! Duration units for converting exposure lengths at the boundary.
//!
//! Inside the model every duration is a [`TimeDelta`]. Floating-point
//! quantities only appear when a caller specifies "how long does one event
//! last" as a number plus a unit, or asks for a result in a given unit.

use std::fmt;
use std::str::FromStr;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

pub const SECONDS_PER_MINUTE: i64 = 60;
pub const SECONDS_PER_HOUR: i64 = 60 * SECONDS_PER_MINUTE;
pub const SECONDS_PER_DAY: i64 = 24 * SECONDS_PER_HOUR;
pub const SECONDS_PER_WEEK: i64 = 7 * SECONDS_PER_DAY;
/// Approximate: 365 days.
pub const SECONDS_PER_YEAR: i64 = 365 * SECONDS_PER_DAY;

const NANOS_PER_SECOND: f64 = 1_000_000_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
    Weeks,
    Years,
}

impl DurationUnit {
    pub fn seconds(self) -> i64 {
        match self {
            DurationUnit::Seconds => 1,
            DurationUnit::Minutes => SECONDS_PER_MINUTE,
            DurationUnit::Hours => SECONDS_PER_HOUR,
            DurationUnit::Days => SECONDS_PER_DAY,
            DurationUnit::Weeks => SECONDS_PER_WEEK,
            DurationUnit::Years => SECONDS_PER_YEAR,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DurationUnit::Seconds => "seconds",
            DurationUnit::Minutes => "minutes",
            DurationUnit::Hours => "hours",
            DurationUnit::Days => "days",
            DurationUnit::Weeks => "weeks",
            DurationUnit::Years => "years",
        }
    }
}

impl fmt::Display for DurationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DurationUnit {
    type Err = ModelError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "s" | "sec" | "second" | "seconds" => Ok(DurationUnit::Seconds),
            "m" | "min" | "minute" | "minutes" => Ok(DurationUnit::Minutes),
            "h" | "hr" | "hour" | "hours" => Ok(DurationUnit::Hours),
            "d" | "day" | "days" => Ok(DurationUnit::Days),
            "w" | "week" | "weeks" => Ok(DurationUnit::Weeks),
            "y" | "year" | "years" => Ok(DurationUnit::Years),
            _ => Err(ModelError::UnknownUnit(value.to_string())),
        }
    }
}

/// Expresses `delta` as a (possibly fractional) number of `unit`s.
///
/// # Examples
/// ```
/// use chrono::TimeDelta;
/// use exposure_model::units::{DurationUnit, convert_duration};
///
/// assert_eq!(convert_duration(TimeDelta::hours(36), DurationUnit::Days), 1.5);
/// assert_eq!(convert_duration(TimeDelta::weeks(4), DurationUnit::Days), 28.0);
/// ```
pub fn convert_duration(delta: TimeDelta, unit: DurationUnit) -> f64 {
    let seconds =
        delta.num_seconds() as f64 + f64::from(delta.subsec_nanos()) / NANOS_PER_SECOND;
    seconds / unit.seconds() as f64
}

/// Builds a duration from a quantity of `unit`s, e.g. `3.0` days.
///
/// Precision is kept to the millisecond.
///
/// # Errors
///
/// Returns [`ModelError::InvalidQuantity`] for NaN, infinite, or
/// out-of-range quantities.
pub fn duration_from_quantity(quantity: f64, unit: DurationUnit) -> Result<TimeDelta> {
    let invalid = || ModelError::InvalidQuantity {
        quantity,
        unit: unit.to_string(),
    };
    if !quantity.is_finite() {
        return Err(invalid());
    }
    let millis = (quantity * unit.seconds() as f64 * 1000.0).round();
    if millis.abs() >= i64::MAX as f64 {
        return Err(invalid());
    }
    TimeDelta::try_milliseconds(millis as i64).ok_or_else(invalid)
}
