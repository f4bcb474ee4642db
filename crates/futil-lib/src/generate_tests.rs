use chrono::{TimeZone, Utc};
use futil_core::TypeBindings;
use indoc::indoc;

use crate::{Error, GenerationContext, Generator, HelperError, Helpers, Template, generate};

fn context(pairs: &[&str]) -> GenerationContext {
    let types = TypeBindings::from_pairs(pairs.iter().copied()).unwrap();
    GenerationContext::new("demo", types)
        .timestamp(Utc.with_ymd_and_hms(2018, 6, 1, 12, 0, 0).unwrap())
}

fn text(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes).unwrap()
}

#[test]
fn one_declaration_per_binding() {
    let context = context(&["String=string", "Int=int"]);
    let template = "{{range $l, $t := .Types}}func New{{$l}}() {{$t}} { return {{first $l}} }\n{{end}}";

    let out = text(generate(&context, template).unwrap());
    insta::assert_snapshot!(out, @r"
    func NewInt() int { return i }
    func NewString() string { return s }
    ");
}

#[test]
fn header_fields() {
    let context = context(&["Int=int"]).imports(["fmt", "strings"]);
    let template = indoc! {r#"
        // generated {{.Timestamp}}
        package {{.PackageName}}
        {{if .Imports}}
        import (
        {{- range .Imports}}
            "{{.}}"
        {{- end}}
        )
        {{end -}}
    "#};

    let out = text(generate(&context, template).unwrap());
    insta::assert_snapshot!(out, @r#"
    // generated 2018-06-01 12:00:00 +0000 UTC
    package demo

    import (
        "fmt"
        "strings"
    )
    "#);
}

#[test]
fn output_is_deterministic() {
    let context = context(&["B=bool", "A=int", "C=string"]);
    let template = "{{.Timestamp}} {{range $l, $t := .Types}}{{$l}}:{{$t}} {{end}}";

    let first = generate(&context, template).unwrap();
    let second = generate(&context, template).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        text(first),
        "2018-06-01 12:00:00 +0000 UTC A:int B:bool C:string "
    );
}

#[test]
fn basics_only() {
    let types = TypeBindings::new().with_basics();
    let context = GenerationContext::new("demo", types);
    let out = text(generate(&context, "{{len .Types}}").unwrap());
    assert_eq!(out, "19");
}

#[test]
fn parse_errors_are_collected() {
    let context = context(&["Int=int"]);
    let source = "{{end}}\n{{$x}}\n{{range .Types}}";
    let err = generate(&context, source).unwrap_err();

    let Error::Parse(diagnostics) = &err else {
        panic!("expected a parse error, got {err}");
    };
    assert_eq!(diagnostics.len(), 3);
    insta::assert_snapshot!(err, @"template parsing failed with 3 error(s)");
    insta::assert_snapshot!(err.summary(source), @"1:1: unexpected `{{end}}`");
}

#[test]
fn empty_label_fails_first() {
    let context = context(&["Int=int"]);
    let source = r#"{{first ""}}"#;
    let err = generate(&context, source).unwrap_err();

    assert!(matches!(err, Error::Execution(_)));
    insta::assert_snapshot!(err, @"template execution failed: error calling first: empty string");
    insta::assert_snapshot!(err.summary(source), @"1:3: error calling first: empty string");
}

#[test]
fn rendered_with_annotations() {
    let context = context(&["Int=int"]);
    let source = "package {{.Package}}\n";
    let err = generate(&context, source).unwrap_err();

    let rendered = err.diagnostics().printer(source).path("bad.tmpl").render();
    insta::assert_snapshot!(rendered, @r"
    error: can't evaluate field Package in type record
     --> bad.tmpl:1:11
      |
    1 | package {{.Package}}
      |           ^^^^^^^^
    ");
}

#[test]
fn custom_helpers() {
    fn plural(s: &str) -> Result<String, HelperError> {
        Ok(format!("{s}s"))
    }

    let context = context(&["Point=geom.Point"]);
    let generator = Generator::new().helpers(Helpers::standard().with("plural", plural));
    let out = generator
        .generate(&context, "{{range $l, $t := .Types}}type {{plural $l}} []{{$t}}{{end}}")
        .unwrap();
    assert_eq!(text(out), "type Points []geom.Point");
}

#[test]
fn render_reuses_parsed_template() {
    let template = Template::parse("{{.PackageName}}").unwrap();
    let generator = Generator::new();

    let a = GenerationContext::new("a", TypeBindings::new());
    let b = GenerationContext::new("b", TypeBindings::new());
    assert_eq!(text(generator.render(&a, &template).unwrap()), "a");
    assert_eq!(text(generator.render(&b, &template).unwrap()), "b");
}

#[test]
fn concurrent_generation() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Template>();
    assert_send_sync::<Helpers>();
    assert_send_sync::<GenerationContext>();

    let template = Template::parse("{{range $l, $t := .Types}}{{$l}}{{end}}").unwrap();
    let generator = Generator::new();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let template = &template;
                let generator = &generator;
                scope.spawn(move || {
                    let pair = format!("T{i}=int");
                    let context = context(&[pair.as_str()]);
                    text(generator.render(&context, template).unwrap())
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.join().unwrap(), format!("T{i}"));
        }
    });
}
