//! Entity-keyed interval stores.

use std::collections::BTreeMap;

use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};
use tracing::debug;

use exposure_model::{Interval, IntervalStore, ModelError};

use crate::error::{Result, TimelineError};

/// A single drug event: `entity` was exposed from `at` for the event duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExposureEvent<K> {
    pub entity: K,
    pub at: NaiveDateTime,
}

impl<K> ExposureEvent<K> {
    pub fn new(entity: K, at: NaiveDateTime) -> Self {
        Self { entity, at }
    }
}

/// One independently owned [`IntervalStore`] per entity.
///
/// Keys iterate in order, so summaries and output are deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timelines<K: Ord> {
    stores: BTreeMap<K, IntervalStore>,
}

impl<K: Ord> Default for Timelines<K> {
    fn default() -> Self {
        Self {
            stores: BTreeMap::new(),
        }
    }
}

impl<K: Ord> Timelines<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The store for `entity`, created empty on first access.
    pub fn get_or_create_store(&mut self, entity: K) -> &mut IntervalStore {
        self.stores.entry(entity).or_default()
    }

    pub fn get(&self, entity: &K) -> Option<&IntervalStore> {
        self.stores.get(entity)
    }

    /// Number of entities with a store.
    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &IntervalStore)> {
        self.stores.iter()
    }

    /// Total number of normalized intervals across all entities.
    pub fn interval_count(&self) -> usize {
        self.stores.values().map(IntervalStore::len).sum()
    }
}

/// Builds one timeline per entity from `events`, each event lasting
/// `event_duration`.
///
/// # Errors
///
/// - [`TimelineError::Model`] wrapping [`ModelError::NegativeDuration`] if
///   `event_duration` is negative.
/// - [`TimelineError::InvalidEvent`] if an event's end time cannot be
///   represented.
pub fn build_timelines<K, I>(events: I, event_duration: TimeDelta) -> Result<Timelines<K>>
where
    K: Ord,
    I: IntoIterator<Item = ExposureEvent<K>>,
{
    if event_duration < TimeDelta::zero() {
        return Err(ModelError::NegativeDuration(event_duration).into());
    }

    let mut timelines = Timelines::new();
    let mut event_count = 0usize;
    for (index, event) in events.into_iter().enumerate() {
        let interval = Interval::starting_at(event.at, event_duration)
            .map_err(|source| TimelineError::InvalidEvent { index, source })?;
        timelines.get_or_create_store(event.entity).add(interval);
        event_count += 1;
    }

    debug!(
        event_count,
        entity_count = timelines.len(),
        interval_count = timelines.interval_count(),
        "timelines built"
    );
    Ok(timelines)
}
