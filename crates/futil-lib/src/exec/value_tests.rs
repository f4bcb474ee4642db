use std::collections::BTreeMap;

use chrono::{TimeZone, Timelike, Utc};
use indexmap::IndexMap;

use super::{FieldError, Value};

fn record() -> Value {
    let mut fields = IndexMap::new();
    fields.insert("B".to_string(), Value::from("two"));
    fields.insert("A".to_string(), Value::Int(1));
    Value::Record(fields)
}

#[test]
fn truthiness() {
    assert!(!Value::Nil.is_truthy());
    assert!(!Value::Bool(false).is_truthy());
    assert!(!Value::Int(0).is_truthy());
    assert!(!Value::from("").is_truthy());
    assert!(!Value::List(Vec::new()).is_truthy());
    assert!(!Value::Map(BTreeMap::new()).is_truthy());

    assert!(Value::Int(-1).is_truthy());
    assert!(Value::from("x").is_truthy());
    assert!(record().is_truthy());
}

#[test]
fn display_collections() {
    let list = Value::List(vec![Value::from("a"), Value::Nil, Value::Int(3)]);
    insta::assert_snapshot!(list, @"[a <nil> 3]");

    let map: BTreeMap<String, &str> =
        BTreeMap::from([("z".to_string(), "last"), ("a".to_string(), "first")]);
    insta::assert_snapshot!(Value::from(map), @"map[a:first z:last]");

    insta::assert_snapshot!(record(), @"{two 1}");
}

#[test]
fn render_nil_at_top_level() {
    assert_eq!(Value::Nil.render(), "<no value>");
    assert_eq!(Value::Nil.to_string(), "<nil>");
    assert_eq!(Value::from("x").render(), "x");
}

#[test]
fn display_time() {
    let time = Utc.with_ymd_and_hms(2006, 1, 2, 15, 4, 5).unwrap();
    insta::assert_snapshot!(Value::Time(time), @"2006-01-02 15:04:05 +0000 UTC");

    let with_millis = time.with_nanosecond(123_000_000).unwrap();
    insta::assert_snapshot!(Value::Time(with_millis), @"2006-01-02 15:04:05.123 +0000 UTC");
}

#[test]
fn field_lookup() {
    let mut map = BTreeMap::new();
    map.insert("Int".to_string(), Value::from("int"));
    let map = Value::Map(map);

    assert_eq!(map.field_ref("Int"), Ok(&Value::from("int")));
    assert_eq!(map.field_ref("Missing"), Ok(&Value::Nil));

    assert_eq!(record().field_ref("A"), Ok(&Value::Int(1)));
    assert_eq!(
        record().field_ref("C"),
        Err(FieldError::Unknown { receiver: "record" })
    );
    assert_eq!(Value::Nil.field_ref("A"), Err(FieldError::Nil));
    assert_eq!(
        Value::Int(1).field_ref("A"),
        Err(FieldError::Unknown { receiver: "int" })
    );
}
