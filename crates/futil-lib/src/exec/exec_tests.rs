use std::collections::BTreeMap;

use chrono::{TimeZone, Timelike, Utc};
use indexmap::IndexMap;

use super::{ExecError, ExecErrorKind, Value};
use crate::helpers::{HelperError, Helpers};
use crate::template::Template;

fn data() -> Value {
    let time = Utc
        .with_ymd_and_hms(2018, 3, 4, 5, 6, 7)
        .unwrap()
        .with_nanosecond(500_000_000)
        .unwrap();

    let mut fields = IndexMap::new();
    fields.insert("Name".to_string(), Value::from("futil"));
    fields.insert("L".to_string(), Value::from(vec!["a", "b"]));
    fields.insert("Empty".to_string(), Value::List(Vec::new()));
    fields.insert(
        "M".to_string(),
        Value::Map(BTreeMap::from([("k".to_string(), Value::from("v"))])),
    );
    fields.insert("N".to_string(), Value::from(vec![0i64, 1, 2, 3, 4]));
    fields.insert("T".to_string(), Value::Time(time));
    Value::Record(fields)
}

fn render_with(source: &str, helpers: &Helpers) -> String {
    Template::parse(source)
        .unwrap()
        .execute(&data(), helpers)
        .unwrap()
}

fn render(source: &str) -> String {
    render_with(source, &Helpers::standard())
}

fn fail(source: &str) -> ExecError {
    Template::parse(source)
        .unwrap()
        .execute(&data(), &Helpers::standard())
        .unwrap_err()
}

#[test]
fn text_is_verbatim() {
    insta::assert_snapshot!(render("package x\n\nfunc f() {}\n"), @r"
    package x

    func f() {}
    ");
}

#[test]
fn range_over_map_is_sorted() {
    let mut map = BTreeMap::new();
    map.insert("String".to_string(), Value::from("string"));
    map.insert("Int".to_string(), Value::from("int"));
    let template = Template::parse("{{range $k, $v := .}}{{$k}}={{$v}};{{end}}").unwrap();

    let out = template.execute(&Value::Map(map), &Helpers::standard()).unwrap();
    assert_eq!(out, "Int=int;String=string;");
}

#[test]
fn range_over_list() {
    assert_eq!(render("{{range $i, $e := .L}}{{$i}}:{{$e}} {{end}}"), "0:a 1:b ");
    assert_eq!(render("{{range $e := .L}}{{$e}}{{end}}"), "ab");
    assert_eq!(render("{{range .L}}<{{.}}>{{end}}"), "<a><b>");
}

#[test]
fn range_else_on_empty() {
    assert_eq!(render("{{range .Empty}}x{{else}}none{{end}}"), "none");
    assert_eq!(render("{{range .M.nope}}x{{else}}nil{{end}}"), "nil");
}

#[test]
fn range_over_int() {
    assert_eq!(render("{{range 3}}{{.}}{{end}}"), "012");
}

#[test]
fn range_stops_early_on_huge_int() {
    assert_eq!(render("{{range 1000000000000}}{{.}}{{break}}{{end}}"), "0");
    let source = "{{range $i := 9223372036854775807}}{{if eq $i 2}}{{break}}{{end}}{{$i}}{{end}}";
    assert_eq!(render(source), "01");
}

#[test]
fn break_inside_map_range() {
    let source = r#"{{range $k, $v := .M}}{{$k}}{{break}}{{end}}"#;
    assert_eq!(render(source), "k");
}

#[test]
fn break_and_continue() {
    let source = "{{range .N}}{{if eq . 3}}{{break}}{{end}}{{if eq . 1}}{{continue}}{{end}}{{.}}{{end}}";
    assert_eq!(render(source), "02");
}

#[test]
fn if_else_chain() {
    let source = "{{if .Empty}}a{{else if .Name}}b{{else}}c{{end}}";
    assert_eq!(render(source), "b");
    assert_eq!(render("{{if 0}}yes{{else}}no{{end}}"), "no");
    assert_eq!(render("{{if .L}}yes{{end}}"), "yes");
}

#[test]
fn with_rebinds_dot() {
    assert_eq!(render("{{with .Name}}[{{.}}]{{end}}"), "[futil]");
    assert_eq!(render("{{with .M.nope}}x{{else}}empty{{end}}"), "empty");
}

#[test]
fn variables_and_scopes() {
    assert_eq!(render("{{$x := 1}}{{if true}}{{$x = 2}}{{end}}{{$x}}"), "2");
    assert_eq!(render("{{$x := 1}}{{if true}}{{$x := 5}}{{$x}}{{end}}{{$x}}"), "51");
    assert_eq!(render("{{range .L}}{{$.Name}}{{end}}"), "futilfutil");
}

#[test]
fn printing_values() {
    assert_eq!(render("{{.L}} {{.M}} {{true}} {{-7}}"), "[a b] map[k:v] true -7");
    assert_eq!(render("{{.M.nope}}"), "<no value>");
    assert_eq!(render("{{.T}}"), "2018-03-04 05:06:07.5 +0000 UTC");
}

#[test]
fn trim_markers() {
    assert_eq!(render("a {{- 1 -}} b"), "a1b");
}

#[test]
fn logic_builtins() {
    assert_eq!(render(r#"{{and 1 0 "x"}}|{{or 0 "" "y"}}|{{and 1 2}}"#), "0|y|2");
    assert_eq!(render(r#"{{not ""}} {{not .Name}}"#), "true false");
}

#[test]
fn and_short_circuits() {
    // `index .L 9` would fail if evaluated.
    assert_eq!(render("{{and 0 (index .L 9)}}"), "0");
    assert_eq!(render("{{or 1 (index .L 9)}}"), "1");
}

#[test]
fn len_and_index() {
    assert_eq!(render(r#"{{len "héllo"}} {{len .L}} {{len .M}}"#), "6 2 1");
    assert_eq!(render(r#"{{index .L 1}} {{index .M "k"}} {{index .M "zz"}}"#), "b v <no value>");
}

#[test]
fn comparisons() {
    let source = r#"{{eq 1 2 1}} {{ne "a" "b"}} {{lt 1 2}} {{le 2 2}} {{gt "b" "a"}} {{ge 1 2}}"#;
    assert_eq!(render(source), "true true true true true false");
    assert_eq!(render("{{eq .M.nope nil}}"), "true");
}

#[test]
fn print_family() {
    assert_eq!(render(r#"{{print "a" 1 2 "b"}}"#), "a1 2b");
    assert_eq!(render(r#"{{println "a" 1}}"#), "a 1\n");
    assert_eq!(
        render(r#"{{printf "%s=%d %v %q %%" "x" 5 true "q\""}}"#),
        r#"x=5 true "q\"" %"#
    );
}

#[test]
fn printf_quotes_like_go() {
    let source = r#"{{printf "%q" "\x07\x1b\u0085\x7fé"}}"#;
    assert_eq!(render(source), r#""\a\x1b\u0085\x7fé""#);
}

#[test]
fn hex_literal_is_an_int() {
    assert_eq!(render("{{0x10}} {{printf \"%d\" 0b11}}"), "16 3");
}

#[test]
fn pipelines_feed_last_argument() {
    assert_eq!(render(r#"{{"String" | first}}"#), "s");
    assert_eq!(render(r#"{{.Name | printf "%s!"}}"#), "futil!");
    assert_eq!(render(r#"{{.Name | printf "%s-%s" "x" | upper}}"#), "X-FUTIL");
}

#[test]
fn helpers_shadow_builtins() {
    let helpers = Helpers::standard().with("len", |_| Ok("shadowed".to_string()));
    assert_eq!(render_with(r#"{{len "abc"}}"#, &helpers), "shadowed");
}

#[test]
fn date_formats_time() {
    assert_eq!(render(r#"{{date "%Y/%m/%d %H:%M" .T}}"#), "2018/03/04 05:06");
    assert_eq!(render(r#"{{.T | date "%Y"}}"#), "2018");
}

#[test]
fn unknown_record_field() {
    let err = fail("{{.Nope}}");
    insta::assert_snapshot!(err, @"can't evaluate field Nope in type record");
    assert_eq!(err.range, rowan::TextRange::new(2.into(), 7.into()));
}

#[test]
fn field_of_nil_and_scalar() {
    insta::assert_snapshot!(fail("{{.M.nope.X}}"), @"nil pointer evaluating field X");
    insta::assert_snapshot!(fail("{{.Name.X}}"), @"can't evaluate field X in type string");
}

#[test]
fn undefined_function() {
    insta::assert_snapshot!(fail("{{nope 1}}"), @r#"function "nope" not defined"#);
}

#[test]
fn helper_errors() {
    let err = fail(r#"{{first ""}}"#);
    assert_eq!(
        err.kind,
        ExecErrorKind::Helper {
            name: "first".to_string(),
            source: HelperError::EmptyString,
        }
    );
    insta::assert_snapshot!(err, @"error calling first: empty string");

    insta::assert_snapshot!(fail(r#"{{first "a" "b"}}"#), @"wrong number of args for first: want 1 got 2");
    insta::assert_snapshot!(fail("{{first 1}}"), @"wrong type for first: expected string, got int");
}

#[test]
fn arguments_to_non_function() {
    insta::assert_snapshot!(fail("{{.Name 1}}"), @"can't give argument to non-function .Name");
}

#[test]
fn range_over_scalar() {
    insta::assert_snapshot!(fail("{{range .Name}}{{end}}"), @"range can't iterate over string");
}

#[test]
fn builtin_argument_errors() {
    insta::assert_snapshot!(fail("{{index .L 5}}"), @"index out of range: 5");
    insta::assert_snapshot!(fail(r#"{{lt 1 "a"}}"#), @"incompatible types for comparison: int and string");
    insta::assert_snapshot!(fail(r#"{{printf "%d"}}"#), @"bad format: missing argument for %d");
    insta::assert_snapshot!(fail(r#"{{printf "x" 1}}"#), @"bad format: 1 extra argument(s)");
    insta::assert_snapshot!(fail(r#"{{date "%J" .T}}"#), @"bad format: invalid date format `%J`");
    insta::assert_snapshot!(fail("{{and}}"), @"wrong number of args for and: want at least 1 got 0");
    insta::assert_snapshot!(fail("{{not 1 2}}"), @"wrong number of args for not: want 1 got 2");
}

#[test]
fn first_error_stops_rendering() {
    let err = fail("{{.Nope}}{{nope}}");
    assert!(matches!(err.kind, ExecErrorKind::UnknownField { .. }));
}
