#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::collections::BTreeMap;

use chrono::Utc;
use tally_core::counters::{CounterField, CountersDocument, Delta, LAST_UPDATED_FIELD};
use tally_core::delta::{delta_for, RecordChange};
use tally_core::protocol::{Event, RecordWrite};

fn record(before: bool, after: bool) -> Event {
    Event::RecordWritten(RecordWrite {
        parent_id: "u2".into(),
        record_id: "r1".into(),
        existed_before: before,
        existed_after: after,
    })
}

#[test]
fn user_events() {
    let created = Event::UserCreated { user_id: "u1".into() };
    let deleted = Event::UserDeleted { user_id: "u1".into() };
    assert_eq!(delta_for(&created), Some(Delta::new(CounterField::TotalUsers, 1)));
    assert_eq!(delta_for(&deleted), Some(Delta::new(CounterField::TotalUsers, -1)));
}

#[test]
fn record_events() {
    assert_eq!(
        delta_for(&record(false, true)),
        Some(Delta::increment(CounterField::TotalReceipts))
    );
    assert_eq!(
        delta_for(&record(true, false)),
        Some(Delta::decrement(CounterField::TotalReceipts))
    );
    assert_eq!(delta_for(&record(true, true)), None);
    assert_eq!(delta_for(&record(false, false)), None);
}

#[test]
fn classify_covers_all_cases() {
    assert_eq!(RecordChange::classify(false, true), RecordChange::Created);
    assert_eq!(RecordChange::classify(true, false), RecordChange::Deleted);
    assert_eq!(RecordChange::classify(true, true), RecordChange::Updated);
    assert_eq!(RecordChange::classify(false, false), RecordChange::Absent);
}

#[test]
fn blank_ids_fail_validation() {
    let e = Event::UserDeleted { user_id: "".into() };
    assert_eq!(e.validate().unwrap_err().client_code().as_str(), "MALFORMED_EVENT");

    let e = Event::RecordWritten(RecordWrite {
        parent_id: "u2".into(),
        record_id: " ".into(),
        existed_before: false,
        existed_after: true,
    });
    assert!(e.validate().is_err());
}

#[test]
fn counter_names_round_trip_through_from_str() {
    for f in CounterField::ALL {
        assert_eq!(f.as_str().parse::<CounterField>().unwrap(), f);
    }
    let err = "totalWidgets".parse::<CounterField>().unwrap_err();
    assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
}

#[test]
fn document_view_defaults_missing_fields() {
    let empty = CountersDocument::from_fields(&BTreeMap::new(), &BTreeMap::new());
    assert_eq!(empty, CountersDocument::default());

    let now = Utc::now();
    let numbers = BTreeMap::from([("totalUsers".to_string(), 3)]);
    let stamps = BTreeMap::from([(LAST_UPDATED_FIELD.to_string(), now)]);
    let doc = CountersDocument::from_fields(&numbers, &stamps);
    assert_eq!(doc.total_users, 3);
    assert_eq!(doc.total_receipts, 0);
    assert_eq!(doc.last_updated, Some(now));

    let json = serde_json::to_value(&doc).unwrap();
    assert_eq!(json["totalUsers"], 3);
    assert!(json.get("lastUpdated").is_some());
}
