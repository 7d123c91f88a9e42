//! End-to-end batch behaviour: exposure scenarios, the treatment-course
//! worked example, and ordering guarantees.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use proptest::prelude::*;

use exposure_timeline::{
    ExposureEvent, ExposureQuery, SplitMode, TimelineOptions, build_timelines,
    cumulative_time_on_drug, query_batch,
};

fn day(n: i64) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2018, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        + TimeDelta::days(n)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn three_days() -> TimeDelta {
    TimeDelta::days(3)
}

fn exposure_days(
    events: &[(&'static str, i64)],
    queries: &[(&'static str, i64, i64)],
) -> Vec<(i64, i64, i64)> {
    let events = events
        .iter()
        .map(|&(entity, at)| ExposureEvent::new(entity, day(at)));
    let timelines = build_timelines(events, three_days()).unwrap();
    let queries: Vec<_> = queries
        .iter()
        .map(|&(entity, start, t)| ExposureQuery::new(entity, day(start), day(t)))
        .collect();
    query_batch(&timelines, &queries, SplitMode::Exposure)
        .unwrap()
        .iter()
        .map(|row| row.split.as_days())
        .collect()
}

#[test]
fn alice_before_first_event() {
    let result = exposure_days(&[("alice", 5), ("alice", 20)], &[("alice", 0, 1)]);
    assert_eq!(result, vec![(0, 0, 0)]);
}

#[test]
fn alice_after_first_event() {
    let result = exposure_days(&[("alice", 5), ("alice", 20)], &[("alice", 0, 10)]);
    assert_eq!(result, vec![(0, 3, 0)]);
}

#[test]
fn alice_mid_event() {
    let result = exposure_days(&[("alice", 5), ("alice", 20)], &[("alice", 0, 6)]);
    assert_eq!(result, vec![(0, 1, 2)]);
}

#[test]
fn overlapping_events_become_one_interval() {
    let events = vec![ExposureEvent::new("alice", day(5)), ExposureEvent::new("alice", day(6))];
    let timelines = build_timelines(events, three_days()).unwrap();
    let store = timelines.get(&"alice").unwrap();
    assert_eq!(store.len(), 1);
    assert_eq!(store.total_duration(), TimeDelta::days(4));
}

#[test]
fn event_before_window_is_before() {
    let result = exposure_days(
        &[("alice", -10)],
        &[("alice", 0, 0), ("alice", 0, 1), ("alice", 0, 50)],
    );
    assert_eq!(result, vec![(3, 0, 0); 3]);
}

#[test]
fn unknown_entity_is_zero() {
    let result = exposure_days(&[("alice", 5)], &[("zack", 0, 10)]);
    assert_eq!(result, vec![(0, 0, 0)]);
}

#[test]
fn treatment_course_worked_example() {
    let events = vec![
        ExposureEvent::new("alice", date(2018, 1, 5)),
        ExposureEvent::new("alice", date(2018, 1, 20)),
        ExposureEvent::new("alice", date(2018, 4, 1)),
        ExposureEvent::new("bob", date(2018, 6, 5)),
        ExposureEvent::new("bob", date(2018, 8, 20)),
        ExposureEvent::new("bob", date(2018, 10, 1)),
    ];
    let alice_start = date(2017, 1, 1);
    let bob_start = date(2015, 1, 1);
    let queries = vec![
        ExposureQuery::new("alice", alice_start, date(2018, 1, 1)),
        ExposureQuery::new("alice", alice_start, date(2018, 1, 10)),
        ExposureQuery::new("alice", alice_start, date(2018, 2, 1)),
        ExposureQuery::new("bob", bob_start, date(2018, 1, 1)),
        ExposureQuery::new("bob", bob_start, date(2018, 9, 10)),
        ExposureQuery::new("bob", bob_start, date(2019, 2, 1)),
    ];
    let options = TimelineOptions::new().with_mode(SplitMode::TreatmentCourse);
    let result = cumulative_time_on_drug(events, three_days(), &queries, options).unwrap();
    let days: Vec<_> = result
        .rows
        .iter()
        .map(|row| (row.entity, row.split.as_days()))
        .collect();
    assert_eq!(
        days,
        vec![
            ("alice", (365, 0, 0)),
            ("alice", (369, 3, 2)),
            ("alice", (369, 6, 21)),
            ("bob", (1096, 0, 0)),
            ("bob", (1251, 6, 91)),
            ("bob", (1251, 9, 232)),
        ]
    );
    assert!(result.rejected.is_empty());
}

proptest! {
    #[test]
    fn prop_rows_follow_query_order(
        picks in prop::collection::vec((0usize..5, -20i64..40, 0i64..40), 0..30),
    ) {
        let names = ["e", "d", "c", "b", "a"];
        let events: Vec<_> = names
            .iter()
            .enumerate()
            .map(|(i, &name)| ExposureEvent::new(name, day(i as i64 * 4)))
            .collect();
        let timelines = build_timelines(events, three_days()).unwrap();
        let queries: Vec<_> = picks
            .iter()
            .map(|&(i, start, width)| ExposureQuery::new(names[i], day(start), day(start + width)))
            .collect();
        let rows = query_batch(&timelines, &queries, SplitMode::Exposure).unwrap();
        prop_assert_eq!(rows.len(), queries.len());
        for (row, query) in rows.iter().zip(&queries) {
            prop_assert_eq!(row.entity, query.entity);
            prop_assert_eq!(row.window_start, query.window_start);
            prop_assert_eq!(row.query_time, query.query_time);
        }
    }
}
