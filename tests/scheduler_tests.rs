use chrono::{FixedOffset, NaiveTime, TimeDelta};
use rworktimer::core::scheduler::{AlarmName, Alarms, next_daily};

mod common;
use common::ts;

#[test]
fn test_one_shot_alarm_fires_once() {
    let mut alarms = Alarms::new();
    alarms.set(AlarmName::AutoStop, ts("2024-01-01T11:00:00Z"), None);

    assert!(alarms.take_due(ts("2024-01-01T10:59:59Z")).is_empty());

    let fired = alarms.take_due(ts("2024-01-01T11:00:00Z"));
    assert_eq!(fired.len(), 1);
    assert_eq!(fired[0].name, AlarmName::AutoStop);
    assert!(alarms.get(AlarmName::AutoStop).is_none());
    assert!(alarms.take_due(ts("2024-01-01T12:00:00Z")).is_empty());
}

#[test]
fn test_late_periodic_alarm_skips_missed_periods() {
    let mut alarms = Alarms::new();
    alarms.set(
        AlarmName::EmailReport,
        ts("2024-01-01T09:00:00Z"),
        Some(TimeDelta::days(1)),
    );

    // process was down for three days
    let fired = alarms.take_due(ts("2024-01-04T10:00:00Z"));
    assert_eq!(fired.len(), 1);
    assert_eq!(fired[0].due, ts("2024-01-01T09:00:00Z"));
    assert_eq!(
        alarms.get(AlarmName::EmailReport).map(|a| a.due),
        Some(ts("2024-01-05T09:00:00Z"))
    );
}

#[test]
fn test_fired_in_due_order_and_replace() {
    let mut alarms = Alarms::new();
    alarms.set(AlarmName::Midnight, ts("2024-01-02T00:00:00Z"), None);
    alarms.set(AlarmName::AutoStop, ts("2024-01-01T23:00:00Z"), None);
    assert_eq!(alarms.next_due(), Some(ts("2024-01-01T23:00:00Z")));

    // rescheduling replaces the previous deadline
    alarms.set(AlarmName::AutoStop, ts("2024-01-02T01:00:00Z"), None);
    assert_eq!(alarms.next_due(), Some(ts("2024-01-02T00:00:00Z")));

    let fired = alarms.take_due(ts("2024-01-02T02:00:00Z"));
    let names: Vec<AlarmName> = fired.iter().map(|f| f.name).collect();
    assert_eq!(names, vec![AlarmName::Midnight, AlarmName::AutoStop]);

    assert!(!alarms.clear(AlarmName::AutoStop));
}

#[test]
fn test_next_daily() {
    let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
    let utc = chrono::Utc;

    assert_eq!(
        next_daily(&utc, nine, ts("2024-01-01T08:00:00Z")).unwrap(),
        ts("2024-01-01T09:00:00Z")
    );
    assert_eq!(
        next_daily(&utc, nine, ts("2024-01-01T09:00:00Z")).unwrap(),
        ts("2024-01-02T09:00:00Z")
    );

    let cet = FixedOffset::east_opt(3600).unwrap();
    assert_eq!(
        next_daily(&cet, nine, ts("2024-01-01T07:30:00Z")).unwrap(),
        ts("2024-01-01T08:00:00Z")
    );
}
