//! Half-open time intervals.
//!
//! An [`Interval`] covers `[start, end)`: the start instant is included, the
//! end instant is not. Zero-length intervals (`start == end`) are valid.

use std::fmt;
use std::ops::Add;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Display format for interval endpoints (minute precision).
const DISPLAY_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// A contiguous span of time, `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl Interval {
    /// Creates an interval, rejecting `end < start`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidInterval`] if `end` precedes `start`.
    ///
    /// # Examples
    /// ```
    /// use chrono::NaiveDate;
    /// use exposure_model::Interval;
    ///
    /// let start = NaiveDate::from_ymd_opt(2018, 1, 5).unwrap().and_hms_opt(0, 0, 0).unwrap();
    /// let end = NaiveDate::from_ymd_opt(2018, 1, 8).unwrap().and_hms_opt(0, 0, 0).unwrap();
    ///
    /// assert!(Interval::new(start, end).is_ok());
    /// assert!(Interval::new(end, start).is_err());
    /// ```
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self> {
        if end < start {
            return Err(ModelError::InvalidInterval { start, end });
        }
        Ok(Self { start, end })
    }

    /// Creates an interval from two instants in either order.
    pub fn normalized(a: NaiveDateTime, b: NaiveDateTime) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// Creates `[start, start + duration)`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::NegativeDuration`] for a negative duration, and
    /// [`ModelError::InvalidInterval`] if the end cannot be represented.
    pub fn starting_at(start: NaiveDateTime, duration: TimeDelta) -> Result<Self> {
        if duration < TimeDelta::zero() {
            return Err(ModelError::NegativeDuration(duration));
        }
        let end = start
            .checked_add_signed(duration)
            .ok_or(ModelError::InvalidInterval { start, end: start })?;
        Ok(Self { start, end })
    }

    /// Inclusive start.
    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    /// Exclusive end.
    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    /// True for a zero-length interval.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// True if the intervals share any point or are adjacent.
    pub fn overlaps_or_touches(&self, other: &Interval) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// True if the intervals share a span of positive length.
    pub fn overlaps(&self, other: &Interval) -> bool {
        !(self.end <= other.start || self.start >= other.end)
    }

    /// Returns the interval spanning both.
    ///
    /// Only meaningful when [`overlaps_or_touches`](Self::overlaps_or_touches)
    /// holds; for disjoint inputs the result also covers the gap between them.
    pub fn union(&self, other: &Interval) -> Interval {
        Interval {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Returns the common part, or `None` if the intervals neither overlap
    /// nor touch. Touching intervals intersect in a zero-length interval.
    pub fn intersection(&self, other: &Interval) -> Option<Interval> {
        if !self.overlaps_or_touches(other) {
            return None;
        }
        Some(Interval {
            start: self.start.max(other.start),
            end: self.end.min(other.end),
        })
    }

    /// Length of the overlap with `[window_start, window_end)`, or zero.
    pub fn intersect_duration(
        &self,
        window_start: NaiveDateTime,
        window_end: NaiveDateTime,
    ) -> TimeDelta {
        let start = self.start.max(window_start);
        let end = self.end.min(window_end);
        if end > start {
            end - start
        } else {
            TimeDelta::zero()
        }
    }

    /// Does the interval contain `instant`, counting both endpoints?
    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        self.start <= instant && instant <= self.end
    }

    /// Does the interval contain `instant`, excluding both endpoints?
    pub fn contains_exclusive(&self, instant: NaiveDateTime) -> bool {
        self.start < instant && instant < self.end
    }

    /// Is this interval inside `other` (boundaries may coincide)?
    pub fn within(&self, other: &Interval) -> bool {
        self.start >= other.start && self.end <= other.end
    }

    /// Slices the interval at every knife that falls inside it.
    ///
    /// Knives outside the interval are ignored. With no usable knives the
    /// result is the interval itself.
    pub fn cut(&self, knives: &[NaiveDateTime]) -> Vec<Interval> {
        let mut points: Vec<NaiveDateTime> = knives
            .iter()
            .copied()
            .filter(|knife| self.contains(*knife))
            .collect();
        points.sort_unstable();
        points.dedup();

        let mut pieces = Vec::with_capacity(points.len() + 1);
        let mut cursor = self.start;
        for point in points {
            pieces.push(Interval {
                start: cursor,
                end: point,
            });
            cursor = point;
        }
        pieces.push(Interval {
            start: cursor,
            end: self.end,
        });
        pieces
    }

    /// Midnight-to-midnight interval covering `date`.
    pub fn whole_day(date: NaiveDate) -> Interval {
        let start = date.and_time(NaiveTime::MIN);
        Interval {
            start,
            end: start + TimeDelta::days(1),
        }
    }

    /// Interval from midnight at the start of `first` to midnight at the
    /// start of `last` (or of the day after `last` if `include_end`).
    ///
    /// Returns `None` if `last < first`, or if the dates are equal and
    /// `include_end` is set.
    pub fn day_span(first: NaiveDate, last: NaiveDate, include_end: bool) -> Option<Interval> {
        if last < first || (last == first && include_end) {
            return None;
        }
        let start = first.and_time(NaiveTime::MIN);
        let mut end = last.and_time(NaiveTime::MIN);
        if include_end {
            end += TimeDelta::days(1);
        }
        Some(Interval { start, end })
    }

    /// The part of this interval falling on `date`.
    pub fn component_on_date(&self, date: NaiveDate) -> Option<Interval> {
        self.intersection(&Interval::whole_day(date))
    }
}

/// Shifts both endpoints by the same amount.
impl Add<TimeDelta> for Interval {
    type Output = Interval;

    fn add(self, delta: TimeDelta) -> Interval {
        Interval {
            start: self.start + delta,
            end: self.end + delta,
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}",
            self.start.format(DISPLAY_FORMAT),
            self.end.format(DISPLAY_FORMAT)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(n: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2018, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + TimeDelta::days(n)
    }

    fn iv(start: i64, end: i64) -> Interval {
        Interval::new(day(start), day(end)).unwrap()
    }

    #[test]
    fn test_new_rejects_reversed() {
        let err = Interval::new(day(5), day(2)).unwrap_err();
        assert_eq!(
            err,
            ModelError::InvalidInterval {
                start: day(5),
                end: day(2)
            }
        );
    }

    #[test]
    fn test_new_allows_zero_length() {
        let interval = iv(3, 3);
        assert!(interval.is_empty());
        assert_eq!(interval.duration(), TimeDelta::zero());
    }

    #[test]
    fn test_normalized_swaps() {
        assert_eq!(Interval::normalized(day(5), day(2)), iv(2, 5));
        assert_eq!(Interval::normalized(day(2), day(5)), iv(2, 5));
    }

    #[test]
    fn test_starting_at() {
        assert_eq!(
            Interval::starting_at(day(5), TimeDelta::days(3)).unwrap(),
            iv(5, 8)
        );
        assert!(matches!(
            Interval::starting_at(day(5), TimeDelta::days(-1)),
            Err(ModelError::NegativeDuration(_))
        ));
    }

    #[test]
    fn test_overlaps_or_touches() {
        assert!(iv(0, 5).overlaps_or_touches(&iv(3, 8)));
        assert!(iv(0, 5).overlaps_or_touches(&iv(5, 8)));
        assert!(iv(5, 8).overlaps_or_touches(&iv(0, 5)));
        assert!(!iv(0, 5).overlaps_or_touches(&iv(6, 8)));
    }

    #[test]
    fn test_overlaps_excludes_touching() {
        assert!(iv(0, 5).overlaps(&iv(3, 8)));
        assert!(!iv(0, 5).overlaps(&iv(5, 8)));
    }

    #[test]
    fn test_union_and_intersection() {
        assert_eq!(iv(5, 8).union(&iv(6, 9)), iv(5, 9));
        assert_eq!(iv(5, 8).intersection(&iv(6, 9)), Some(iv(6, 8)));
        assert_eq!(iv(0, 5).intersection(&iv(5, 8)), Some(iv(5, 5)));
        assert_eq!(iv(0, 4).intersection(&iv(5, 8)), None);
    }

    #[test]
    fn test_intersect_duration() {
        assert_eq!(iv(5, 8).intersect_duration(day(0), day(6)), TimeDelta::days(1));
        assert_eq!(iv(5, 8).intersect_duration(day(0), day(10)), TimeDelta::days(3));
        assert_eq!(iv(5, 8).intersect_duration(day(8), day(10)), TimeDelta::zero());
        assert_eq!(iv(5, 8).intersect_duration(day(0), day(1)), TimeDelta::zero());
    }

    #[test]
    fn test_contains() {
        let interval = iv(5, 8);
        assert!(interval.contains(day(5)));
        assert!(interval.contains(day(8)));
        assert!(!interval.contains_exclusive(day(8)));
        assert!(interval.contains_exclusive(day(6)));
        assert!(iv(6, 7).within(&interval));
        assert!(!iv(4, 7).within(&interval));
    }

    #[test]
    fn test_cut() {
        let pieces = iv(0, 10).cut(&[day(7), day(3), day(20), day(3)]);
        assert_eq!(pieces, vec![iv(0, 3), iv(3, 7), iv(7, 10)]);
        assert_eq!(iv(0, 10).cut(&[]), vec![iv(0, 10)]);
    }

    #[test]
    fn test_shift() {
        assert_eq!(iv(0, 5) + TimeDelta::hours(24), iv(1, 6));
    }

    #[test]
    fn test_day_span() {
        let first = NaiveDate::from_ymd_opt(2018, 1, 1).unwrap();
        let third = NaiveDate::from_ymd_opt(2018, 1, 3).unwrap();
        assert_eq!(Interval::day_span(first, third, true), Some(iv(0, 3)));
        assert_eq!(Interval::day_span(first, third, false), Some(iv(0, 2)));
        assert_eq!(Interval::day_span(third, first, true), None);
        assert_eq!(Interval::day_span(first, first, true), None);
    }

    #[test]
    fn test_component_on_date() {
        let interval = Interval::new(day(0) + TimeDelta::hours(18), day(1) + TimeDelta::hours(6))
            .unwrap();
        let first = NaiveDate::from_ymd_opt(2018, 1, 1).unwrap();
        let component = interval.component_on_date(first).unwrap();
        assert_eq!(component.duration(), TimeDelta::hours(6));
    }

    #[test]
    fn test_display() {
        assert_eq!(iv(4, 7).to_string(), "2018-01-05T00:00 - 2018-01-08T00:00");
    }
}
