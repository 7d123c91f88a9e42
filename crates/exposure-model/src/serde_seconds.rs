//! Serde adapter storing a [`TimeDelta`] as whole seconds.
//!
//! Use with `#[serde(with = "exposure_model::serde_seconds")]`. Sub-second
//! precision is dropped on serialization.

use chrono::TimeDelta;
use serde::{Deserialize, Deserializer, Serializer};

pub fn serialize<S: Serializer>(delta: &TimeDelta, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_i64(delta.num_seconds())
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<TimeDelta, D::Error> {
    let seconds = i64::deserialize(deserializer)?;
    TimeDelta::try_seconds(seconds)
        .ok_or_else(|| serde::de::Error::custom(format!("duration out of range: {seconds}s")))
}
