use chrono::{TimeZone, Utc};
use futil_core::TypeBindings;

use crate::context::GenerationContext;
use crate::exec::Value;

fn pinned() -> GenerationContext {
    let types = TypeBindings::from_pairs(["String=string", "Int=int"]).unwrap();
    GenerationContext::new("geom", types)
        .imports(["fmt", "strings"])
        .import("fmt")
        .timestamp(Utc.with_ymd_and_hms(2018, 6, 1, 12, 0, 0).unwrap())
}

#[test]
fn imports_keep_order_and_duplicates() {
    let context = pinned();
    assert_eq!(context.import_paths(), ["fmt", "strings", "fmt"]);
}

#[test]
fn value_exposes_fixed_fields() {
    let value = pinned().to_value();
    let Value::Record(fields) = &value else {
        panic!("context is a record");
    };
    let names: Vec<_> = fields.keys().map(String::as_str).collect();
    assert_eq!(names, ["PackageName", "Timestamp", "Types", "Imports"]);

    assert_eq!(value.field_ref("PackageName"), Ok(&Value::from("geom")));
    let types = value.field_ref("Types").unwrap();
    assert_eq!(types.field_ref("Int"), Ok(&Value::from("int")));
    assert_eq!(types.field_ref("Bool"), Ok(&Value::Nil));
}

#[test]
fn new_captures_current_time() {
    let before = Utc::now();
    let context = GenerationContext::new("p", TypeBindings::new());
    let after = Utc::now();
    assert!(context.captured_at() >= before && context.captured_at() <= after);
    assert_eq!(context.package_name(), "p");
    assert!(context.types().is_empty());
}

#[test]
fn serializes_for_dump() {
    let json = serde_json::to_string_pretty(&pinned()).unwrap();
    insta::assert_snapshot!(json, @r#"
    {
      "PackageName": "geom",
      "Timestamp": "2018-06-01T12:00:00Z",
      "Types": {
        "Int": "int",
        "String": "string"
      },
      "Imports": [
        "fmt",
        "strings",
        "fmt"
      ]
    }
    "#);
}
