use docsheet_core::grouping::{partition_by_key, JoinKey};
use docsheet_core::{FieldValue, Record};

#[test]
fn partitions_by_typed_key_and_skips_missing_keys() {
    let records = vec![
        Record::new().with("eventId", "E1").with("n", 1i64),
        Record::new().with("eventId", "E1").with("n", 2i64),
        Record::new().with("eventId", 1i64),
        Record::new().with("eventId", "1"),
        Record::new().with("eventId", FieldValue::Null),
        Record::new().with("eventId", ""),
        Record::new().with("other", "x"),
    ];

    let partitions = partition_by_key(&records, "eventId");

    assert_eq!(partitions.len(), 3);
    assert_eq!(partitions[&JoinKey::Text("E1".into())].len(), 2);
    assert_eq!(partitions[&JoinKey::Integer(1)].len(), 1);
    assert_eq!(partitions[&JoinKey::Text("1".into())].len(), 1);
}

#[test]
fn whole_float_keys_join_integer_keys() {
    let records = vec![
        Record::new().with("eventId", 1i64),
        Record::new().with("eventId", 1.0),
        Record::new().with("eventId", 1.5),
    ];

    let partitions = partition_by_key(&records, "eventId");

    assert_eq!(partitions[&JoinKey::Integer(1)].len(), 2);
    assert_eq!(partitions[&JoinKey::Other("1.5".into())].len(), 1);

    let event = Record::new().with("eventId", FieldValue::Float(1.0));
    assert_eq!(
        JoinKey::from_record(&event, "eventId"),
        Some(JoinKey::Integer(1))
    );
}

#[test]
fn blank_keys_are_absent() {
    let record = Record::new().with("eventId", 0i64);
    assert_eq!(JoinKey::from_record(&record, "eventId"), None);
    assert_eq!(JoinKey::from_record(&record, "missing"), None);
}

#[test]
fn keys_display_their_raw_value() {
    assert_eq!(JoinKey::Integer(42).to_string(), "42");
    assert_eq!(JoinKey::Reference("abc".into()).to_string(), "abc");
}
