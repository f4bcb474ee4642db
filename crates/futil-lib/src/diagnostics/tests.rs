use rowan::TextRange;

use super::*;

fn range(start: u32, end: u32) -> TextRange {
    TextRange::new(start.into(), end.into())
}

#[test]
fn report_with_default_message() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UnexpectedEnd, range(0, 7))
        .emit();

    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics.has_errors());
    let first = diagnostics.first().unwrap();
    assert_eq!(first.kind(), DiagnosticKind::UnexpectedEnd);
    insta::assert_snapshot!(first.message(), @"unexpected `{{end}}`");
}

#[test]
fn report_with_custom_message() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UndefinedVariable, range(2, 4))
        .message("undefined variable `$x`")
        .emit();

    insta::assert_snapshot!(diagnostics.first().unwrap(), @"undefined variable `$x` at 2..4");
}

#[test]
fn empty_collection() {
    let diagnostics = Diagnostics::new();
    assert!(diagnostics.is_empty());
    assert!(!diagnostics.has_errors());
    assert_eq!(diagnostics.error_count(), 0);
    assert_eq!(diagnostics.summary("anything"), None);
    assert_eq!(diagnostics.printer("anything").render(), "");
}

#[test]
fn sort_orders_by_position() {
    let mut diagnostics = Diagnostics::new();
    diagnostics.report(DiagnosticKind::UnexpectedElse, range(10, 12)).emit();
    diagnostics.report(DiagnosticKind::UnclosedAction, range(0, 2)).emit();
    diagnostics.sort();

    let kinds: Vec<_> = diagnostics.iter().map(|d| d.kind()).collect();
    assert_eq!(
        kinds,
        [DiagnosticKind::UnclosedAction, DiagnosticKind::UnexpectedElse]
    );
}

#[test]
fn summary_uses_line_and_column() {
    let source = "one\ntwo {{end}}\n";
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UnexpectedEnd, range(8, 15))
        .emit();

    insta::assert_snapshot!(diagnostics.summary(source).unwrap(), @"2:5: unexpected `{{end}}`");
}

#[test]
fn line_col_counts_characters() {
    let source = "é{{x}}\nab";
    assert_eq!(line_col(source, 0), (1, 1));
    assert_eq!(line_col(source, 2), (1, 2));
    assert_eq!(line_col(source, 9), (2, 2));
    assert_eq!(line_col(source, 100), (2, 3));
}

#[test]
fn printer_single_annotation() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UnexpectedEnd, range(1, 8))
        .emit();

    let result = diagnostics.printer("a{{end}}").render();
    insta::assert_snapshot!(result, @r"
    error: unexpected `{{end}}`
      |
    1 | a{{end}}
      |  ^^^^^^^
    ");
}

#[test]
fn printer_shows_message_once() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::MissingPipeline, range(0, 4))
        .message("empty action")
        .emit();

    let result = diagnostics.printer("{{}}\n").render();
    assert_eq!(result.matches("empty action").count(), 1, "{result}");
}

#[test]
fn printer_with_related() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UnclosedBlock, range(0, 5))
        .message("primary")
        .related_to("related info", range(6, 10))
        .emit();

    let result = diagnostics.printer("hello world!").render();
    insta::assert_snapshot!(result, @r"
    error: primary
      |
    1 | hello world!
      | ^^^^^ ---- related info
    ");
}

#[test]
fn printer_with_path() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::MissingPipeline, range(0, 4))
        .message("empty action")
        .emit();

    let result = diagnostics
        .printer("{{}}")
        .path("templates/func.tmpl")
        .render();
    insta::assert_snapshot!(result, @r"
    error: empty action
     --> templates/func.tmpl:1:1
      |
    1 | {{}}
      | ^^^^
    ");
}

#[test]
fn printer_zero_width_span() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UnclosedAction, range(3, 3))
        .emit();

    let result = diagnostics.printer("abcdef").render();
    insta::assert_snapshot!(result, @r"
    error: unclosed action: missing `}}`
      |
    1 | abcdef
      |    ^
    ");
}
