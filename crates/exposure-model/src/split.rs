//! Before/during/after duration buckets returned by timeline queries.

use std::ops::Add;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

/// Three disjoint duration totals relative to a window and a query time.
///
/// Durations are kept at full precision in memory; the `*_days` accessors
/// truncate to whole days for tabular output, and serde writes whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BeforeDuringAfter {
    #[serde(with = "crate::serde_seconds")]
    pub before: TimeDelta,
    #[serde(with = "crate::serde_seconds")]
    pub during: TimeDelta,
    #[serde(with = "crate::serde_seconds")]
    pub after: TimeDelta,
}

impl BeforeDuringAfter {
    pub fn new(before: TimeDelta, during: TimeDelta, after: TimeDelta) -> Self {
        Self {
            before,
            during,
            after,
        }
    }

    pub fn zero() -> Self {
        Self::new(TimeDelta::zero(), TimeDelta::zero(), TimeDelta::zero())
    }

    pub fn total(&self) -> TimeDelta {
        self.before + self.during + self.after
    }

    pub fn before_days(&self) -> i64 {
        self.before.num_days()
    }

    pub fn during_days(&self) -> i64 {
        self.during.num_days()
    }

    pub fn after_days(&self) -> i64 {
        self.after.num_days()
    }

    /// Whole-day triple, in bucket order.
    pub fn as_days(&self) -> (i64, i64, i64) {
        (self.before_days(), self.during_days(), self.after_days())
    }
}

impl Default for BeforeDuringAfter {
    fn default() -> Self {
        Self::zero()
    }
}

impl Add for BeforeDuringAfter {
    type Output = BeforeDuringAfter;

    fn add(self, other: BeforeDuringAfter) -> BeforeDuringAfter {
        BeforeDuringAfter {
            before: self.before + other.before,
            during: self.during + other.during,
            after: self.after + other.after,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_days_truncate() {
        let split = BeforeDuringAfter::new(
            TimeDelta::hours(36),
            TimeDelta::days(3),
            TimeDelta::hours(23),
        );
        assert_eq!(split.as_days(), (1, 3, 0));
        assert_eq!(split.total(), TimeDelta::hours(36 + 72 + 23));
    }

    #[test]
    fn test_add() {
        let a = BeforeDuringAfter::new(TimeDelta::days(1), TimeDelta::days(2), TimeDelta::days(3));
        assert_eq!((a + a).as_days(), (2, 4, 6));
        assert_eq!(BeforeDuringAfter::default(), BeforeDuringAfter::zero());
    }

    #[test]
    fn test_serializes_seconds() {
        let split = BeforeDuringAfter::new(TimeDelta::zero(), TimeDelta::days(1), TimeDelta::minutes(1));
        let json = serde_json::to_string(&split).expect("serialize split");
        assert_eq!(json, r#"{"before":0,"during":86400,"after":60}"#);
        let round: BeforeDuringAfter = serde_json::from_str(&json).expect("deserialize split");
        assert_eq!(round, split);
    }
}
