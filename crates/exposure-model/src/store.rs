//! Normalized interval collections for a single entity.
//!
//! An [`IntervalStore`] keeps its intervals sorted by start, with no two
//! intervals overlapping or touching: for consecutive intervals `a`, `b`,
//! `a.end() < b.start()`. Every mutation goes through [`IntervalStore::add`],
//! which merges as it inserts, so the invariant holds between any two calls.
//!
//! Two cumulative queries are offered:
//!
//! - [`IntervalStore::cumulative_before_during_after`] splits *stored
//!   exposure* into the part before a window start, the part inside
//!   `[window_start, query_time)`, and the part from `query_time` onwards.
//! - [`IntervalStore::treatment_course_split`] splits *elapsed time* in
//!   `[start, when)` into time before exposure first began, time on exposure,
//!   and time off exposure after it began.

use chrono::{NaiveDateTime, TimeDelta};
use serde::Serialize;

use crate::error::{ModelError, Result};
use crate::interval::Interval;
use crate::split::BeforeDuringAfter;

/// How loosely an interval must match a window to be kept by
/// [`IntervalStore::subset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Flexibility {
    /// Strictly inside the window; neither boundary may coincide.
    Within,
    /// Shares a span of positive length with the window.
    Overlapping,
    /// Overlaps the window or touches one of its boundaries.
    #[default]
    Adjoining,
}

/// Sorted, non-overlapping, non-adjacent intervals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct IntervalStore {
    intervals: Vec<Interval>,
}

impl IntervalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `interval`, merging it with every stored interval it overlaps
    /// or touches.
    ///
    /// The mergeable run is contiguous because the store is sorted, so it is
    /// located with two binary searches and replaced by a single union.
    /// Adding an interval that is already covered leaves the store unchanged.
    pub fn add(&mut self, interval: Interval) {
        // Ends are strictly increasing under the invariant, so both
        // predicates are monotone over the sequence.
        let first = self
            .intervals
            .partition_point(|stored| stored.end() < interval.start());
        let last = self
            .intervals
            .partition_point(|stored| stored.start() <= interval.end());

        if first == last {
            self.intervals.insert(first, interval);
            return;
        }

        let merged = self.intervals[first..last]
            .iter()
            .fold(interval, |acc, stored| acc.union(stored));
        self.intervals.splice(first..last, std::iter::once(merged));
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Interval> {
        self.intervals.iter()
    }

    pub fn as_slice(&self) -> &[Interval] {
        &self.intervals
    }

    /// Earliest start, or `None` if empty.
    pub fn start(&self) -> Option<NaiveDateTime> {
        self.intervals.first().map(Interval::start)
    }

    /// Latest end, or `None` if empty.
    pub fn end(&self) -> Option<NaiveDateTime> {
        self.intervals.last().map(Interval::end)
    }

    /// Interval from the earliest start to the latest end.
    pub fn extent(&self) -> Option<Interval> {
        match (self.intervals.first(), self.intervals.last()) {
            (Some(first), Some(last)) => Some(first.union(last)),
            _ => None,
        }
    }

    /// Total covered time. Stored intervals never overlap, so nothing is
    /// double-counted.
    pub fn total_duration(&self) -> TimeDelta {
        self.intervals
            .iter()
            .fold(TimeDelta::zero(), |acc, interval| acc + interval.duration())
    }

    pub fn durations(&self) -> Vec<TimeDelta> {
        self.intervals.iter().map(Interval::duration).collect()
    }

    /// First of the longest intervals.
    pub fn longest_interval(&self) -> Option<Interval> {
        let mut longest: Option<Interval> = None;
        for interval in &self.intervals {
            match longest {
                Some(current) if current.duration() >= interval.duration() => {}
                _ => longest = Some(*interval),
            }
        }
        longest
    }

    /// First of the shortest intervals.
    pub fn shortest_interval(&self) -> Option<Interval> {
        self.intervals.iter().copied().min_by_key(Interval::duration)
    }

    pub fn first_interval_starting(&self, start: NaiveDateTime) -> Option<Interval> {
        self.intervals
            .iter()
            .copied()
            .find(|interval| interval.start() == start)
    }

    pub fn first_interval_ending(&self, end: NaiveDateTime) -> Option<Interval> {
        self.intervals
            .iter()
            .copied()
            .find(|interval| interval.end() == end)
    }

    /// Is `instant` covered by a stored interval (`start <= instant < end`)?
    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        let index = self
            .intervals
            .partition_point(|stored| stored.end() <= instant);
        self.intervals
            .get(index)
            .is_some_and(|stored| stored.start() <= instant)
    }

    /// The gaps between consecutive intervals.
    pub fn gaps(&self) -> IntervalStore {
        self.intervals
            .windows(2)
            .map(|pair| Interval::normalized(pair[0].end(), pair[1].start()))
            .collect()
    }

    /// Shortest gap between intervals, if there are at least two.
    pub fn shortest_gap(&self) -> Option<Interval> {
        self.gaps().shortest_interval()
    }

    /// The intervals that match `window` under `flexibility`.
    pub fn subset(&self, window: &Interval, flexibility: Flexibility) -> IntervalStore {
        let intervals = self
            .intervals
            .iter()
            .copied()
            .filter(|interval| match flexibility {
                Flexibility::Within => {
                    interval.start() > window.start() && interval.end() < window.end()
                }
                Flexibility::Overlapping => {
                    interval.end() > window.start() && interval.start() < window.end()
                }
                Flexibility::Adjoining => {
                    interval.end() >= window.start() && interval.start() <= window.end()
                }
            })
            .collect();
        // A subsequence of a normalized sequence is still normalized.
        IntervalStore { intervals }
    }

    /// The gaps that match `window` under `flexibility`.
    pub fn gap_subset(&self, window: &Interval, flexibility: Flexibility) -> IntervalStore {
        self.gaps().subset(window, flexibility)
    }

    /// Stored time strictly before `when`.
    pub fn cumulative_time_to(&self, when: NaiveDateTime) -> TimeDelta {
        let mut cumulative = TimeDelta::zero();
        for interval in &self.intervals {
            if interval.start() >= when {
                break;
            }
            cumulative += interval.end().min(when) - interval.start();
        }
        cumulative
    }

    /// Gap time strictly before `when`.
    pub fn cumulative_gaps_to(&self, when: NaiveDateTime) -> TimeDelta {
        self.gaps().cumulative_time_to(when)
    }

    /// Time between the end of the last interval and `when`; zero if `when`
    /// is not after that end, `None` if the store is empty.
    pub fn time_afterwards_preceding(&self, when: NaiveDateTime) -> Option<TimeDelta> {
        let end = self.end()?;
        if when <= end {
            Some(TimeDelta::zero())
        } else {
            Some(when - end)
        }
    }

    /// Splits stored exposure into three buckets around a window.
    ///
    /// For every stored interval that begins before `query_time`:
    ///
    /// - the part before `window_start` counts as `before`;
    /// - the part inside `[window_start, query_time)` counts as `during`;
    /// - the part from `query_time` up to the interval's end counts as `after`.
    ///
    /// Intervals beginning at or after `query_time` have not started yet and
    /// contribute nothing. The buckets never share an instant. An empty store
    /// yields zeros.
    ///
    /// ```text
    /// window_start:      S
    /// query_time:                         Q
    /// store:         X-------X     X---X     X-----X  (not started)
    ///                                   X------X
    /// before:        ----
    /// during:            -----     -----X--
    /// after:                              ---
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidQuery`] if `window_start > query_time`.
    pub fn cumulative_before_during_after(
        &self,
        window_start: NaiveDateTime,
        query_time: NaiveDateTime,
    ) -> Result<BeforeDuringAfter> {
        check_window(window_start, query_time)?;
        let mut split = BeforeDuringAfter::zero();
        for interval in &self.intervals {
            if interval.start() >= query_time {
                break;
            }
            if interval.start() < window_start {
                split.before += interval.end().min(window_start) - interval.start();
            }
            split.during += interval.intersect_duration(window_start, query_time);
            if interval.end() > query_time {
                split.after += interval.end() - query_time;
            }
        }
        Ok(split)
    }

    /// Splits elapsed time in `[start, when)` by treatment course.
    ///
    /// - `before`: time from `start` until exposure first begins;
    /// - `during`: cumulative exposure up to `when`;
    /// - `after`: time off exposure once it has begun, up to `when`.
    ///
    /// ```text
    /// start:      S
    /// store:          X---X       X---X       X---X       X---X
    /// when:                                           W
    /// before:     ----
    /// during:         -----       -----       -----
    /// after:               -------     -------     ----
    /// ```
    ///
    /// If nothing has started by `when` the whole of `[start, when)` is
    /// `before`. Exposure that predates `start` still counts as `during`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidQuery`] if `start > when`.
    pub fn treatment_course_split(
        &self,
        start: NaiveDateTime,
        when: NaiveDateTime,
    ) -> Result<BeforeDuringAfter> {
        check_window(start, when)?;
        let zero = TimeDelta::zero();
        if when == start {
            return Ok(BeforeDuringAfter::zero());
        }
        let first_start = match self.start() {
            Some(first_start) if first_start < when => first_start,
            _ => return Ok(BeforeDuringAfter::new(when - start, zero, zero)),
        };

        let before = if first_start < start {
            zero
        } else {
            first_start - start
        };
        let during = self.cumulative_time_to(when);
        let after = self.cumulative_gaps_to(when)
            + self.time_afterwards_preceding(when).unwrap_or(zero);
        Ok(BeforeDuringAfter::new(before, during, after))
    }
}

fn check_window(window_start: NaiveDateTime, query_time: NaiveDateTime) -> Result<()> {
    if window_start > query_time {
        return Err(ModelError::InvalidQuery {
            window_start,
            query_time,
        });
    }
    Ok(())
}

impl FromIterator<Interval> for IntervalStore {
    fn from_iter<I: IntoIterator<Item = Interval>>(iter: I) -> Self {
        let mut store = IntervalStore::new();
        store.extend(iter);
        store
    }
}

impl Extend<Interval> for IntervalStore {
    fn extend<I: IntoIterator<Item = Interval>>(&mut self, iter: I) {
        for interval in iter {
            self.add(interval);
        }
    }
}

impl<'a> IntoIterator for &'a IntervalStore {
    type Item = &'a Interval;
    type IntoIter = std::slice::Iter<'a, Interval>;

    fn into_iter(self) -> Self::IntoIter {
        self.intervals.iter()
    }
}
