use std::fs;
use std::path::{Path, PathBuf};

use indoc::indoc;
use tempfile::TempDir;

use super::error::CliError;
use super::generate::{GenerateArgs, run};

const FUNC_TEMPLATE: &str = indoc! {r#"
    package {{.PackageName}}
    {{range .Imports}}
    import "{{.}}"
    {{- end}}
    {{range $l, $t := .Types}}
    func New{{$l}}() {{$t}} { var {{first $l}} {{$t}}; return {{first $l}} }
    {{- end}}
"#};

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("templates")).unwrap();
        fs::write(dir.path().join("templates/func.tmpl"), FUNC_TEMPLATE).unwrap();
        fs::write(dir.path().join("geom.go"), "package geom\n").unwrap();
        Self { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn args(&self, kind: Option<&str>, bindings: &[&str]) -> GenerateArgs {
        GenerateArgs {
            kind: kind.map(str::to_string),
            bindings: bindings.iter().map(|s| s.to_string()).collect(),
            basics: false,
            imports: Vec::new(),
            output: None,
            ext: "go".to_string(),
            package: None,
            root: Some(self.path().to_path_buf()),
            template: None,
            dump_context: false,
            verbose: false,
            color: false,
            work_dir: self.path().to_path_buf(),
        }
    }

    fn read(&self, name: &str) -> String {
        fs::read_to_string(self.path().join(name)).unwrap()
    }
}

fn run_to_string(args: &GenerateArgs) -> Result<String, CliError> {
    let mut out = Vec::new();
    run(args, &mut out)?;
    Ok(String::from_utf8(out).unwrap())
}

#[test]
fn writes_default_output_file() {
    let ws = Workspace::new();
    let mut args = ws.args(Some("func"), &["Point=Point", "Int=int"]);
    args.imports = vec!["fmt".to_string()];

    assert_eq!(run_to_string(&args).unwrap(), "");
    insta::assert_snapshot!(ws.read("func.go"), @r#"
    package geom

    import "fmt"

    func NewInt() int { var i int; return i }
    func NewPoint() Point { var p Point; return p }
    "#);
}

#[test]
fn output_to_stdout() {
    let ws = Workspace::new();
    let mut args = ws.args(Some("func"), &["Int=int"]);
    args.output = Some(PathBuf::from("-"));
    args.package = Some("main".to_string());

    let out = run_to_string(&args).unwrap();
    assert!(out.starts_with("package main\n"));
    assert!(out.contains("func NewInt() int"));
    assert!(!ws.path().join("func.go").exists());
}

#[test]
fn relative_output_and_ext() {
    let ws = Workspace::new();
    let mut args = ws.args(Some("func"), &["Int=int"]);
    args.ext = "txt".to_string();
    run_to_string(&args).unwrap();
    assert!(ws.path().join("func.txt").exists());

    args.output = Some(PathBuf::from("gen_int.go"));
    run_to_string(&args).unwrap();
    assert!(ws.read("gen_int.go").contains("NewInt"));
}

#[test]
fn overwrites_existing_output() {
    let ws = Workspace::new();
    fs::write(ws.path().join("func.go"), "// stale\npackage geom\n").unwrap();
    run_to_string(&ws.args(Some("func"), &["Int=int"])).unwrap();
    assert!(ws.read("func.go").starts_with("package geom\n"));
}

#[test]
fn basics_without_bindings() {
    let ws = Workspace::new();
    fs::write(ws.path().join("templates/count.tmpl"), "{{len .Types}}").unwrap();
    let mut args = ws.args(Some("count"), &[]);
    args.basics = true;
    args.output = Some(PathBuf::from("-"));

    assert_eq!(run_to_string(&args).unwrap(), "19");
}

#[test]
fn user_binding_overrides_basic() {
    let ws = Workspace::new();
    fs::write(ws.path().join("templates/one.tmpl"), "{{index .Types \"Int\"}}").unwrap();
    let mut args = ws.args(Some("one"), &["Int=myint"]);
    args.basics = true;
    args.output = Some(PathBuf::from("-"));

    assert_eq!(run_to_string(&args).unwrap(), "myint");
}

#[test]
fn missing_type_fails_before_io() {
    let root = tempfile::tempdir().unwrap();
    let mut args = Workspace::new().args(None, &["Int=int"]);
    // Nothing exists here, so any file access would fail differently.
    args.work_dir = root.path().join("missing");

    let err = run_to_string(&args).unwrap_err();
    assert!(matches!(err, CliError::Usage(_)));
    insta::assert_snapshot!(err, @"type argument is required: use -t/--type <KIND>");
}

#[test]
fn kind_with_path_is_rejected() {
    let ws = Workspace::new();
    for kind in ["../func", "a/b", ".hidden", ""] {
        let err = run_to_string(&ws.args(Some(kind), &[])).unwrap_err();
        assert!(matches!(err, CliError::Usage(_)), "{kind:?} should be rejected");
    }
}

#[test]
fn malformed_binding() {
    let ws = Workspace::new();
    let err = run_to_string(&ws.args(Some("func"), &["Int"])).unwrap_err();
    insta::assert_snapshot!(err, @"malformed binding `Int`: expected `label=Type`");
}

#[test]
fn dump_context_as_json() {
    let ws = Workspace::new();
    let mut args = ws.args(Some("func"), &["Int=int"]);
    args.dump_context = true;
    args.imports = vec!["fmt".to_string(), "fmt".to_string()];

    let out = run_to_string(&args).unwrap();
    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json["PackageName"], "geom");
    assert_eq!(json["Types"]["Int"], "int");
    assert_eq!(json["Imports"], serde_json::json!(["fmt", "fmt"]));
    assert!(json["Timestamp"].is_string());
    assert!(!ws.path().join("func.go").exists());
}

#[test]
fn package_conflict() {
    let ws = Workspace::new();
    fs::write(ws.path().join("other.go"), "package other\n").unwrap();

    let err = run_to_string(&ws.args(Some("func"), &["Int=int"])).unwrap_err();
    assert!(matches!(err, CliError::PackageLookup(_)));
}

#[test]
fn missing_template_suggests_kind() {
    let ws = Workspace::new();
    let err = run_to_string(&ws.args(Some("fnuc"), &["Int=int"])).unwrap_err();
    assert!(matches!(err, CliError::TemplateRead { .. }));
    assert!(err.to_string().ends_with("(did you mean 'func'?)"));
    assert!(!ws.path().join("fnuc.go").exists());
}

#[test]
fn explicit_template_file() {
    let ws = Workspace::new();
    fs::write(ws.path().join("mine.tmpl"), "// {{.PackageName}}").unwrap();
    let mut args = ws.args(Some("mine"), &[]);
    args.template = Some(PathBuf::from("mine.tmpl"));
    args.output = Some(PathBuf::from("-"));

    assert_eq!(run_to_string(&args).unwrap(), "// geom");
}

#[test]
fn template_error_keeps_old_output() {
    let ws = Workspace::new();
    fs::write(ws.path().join("templates/bad.tmpl"), "package x\n{{.Nope}}\n").unwrap();
    fs::write(ws.path().join("bad.go"), "package geom // previous\n").unwrap();

    let err = run_to_string(&ws.args(Some("bad"), &["Int=int"])).unwrap_err();
    let message = err.to_string();
    assert!(message.ends_with("bad.tmpl:2:3: can't evaluate field Nope in type record"));
    assert_eq!(ws.read("bad.go"), "package geom // previous\n");

    let rendered = err.render_diagnostics(false).unwrap();
    assert!(rendered.contains("{{.Nope}}"));
    assert!(rendered.contains("^^^^^"));
}

#[test]
fn parse_error_summary() {
    let ws = Workspace::new();
    fs::write(ws.path().join("templates/bad.tmpl"), "{{if .X}}\n").unwrap();

    let err = run_to_string(&ws.args(Some("bad"), &[])).unwrap_err();
    assert!(matches!(err, CliError::Template { .. }));
    assert!(err.to_string().ends_with("bad.tmpl:1:1: missing `{{end}}` for `{{if}}`"));
}

#[test]
fn bundled_templates_render() {
    let repo_root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../..");
    let ws = Workspace::new();
    let expected = [
        ("func", "func MapPoint(ps []geom.Point, f func(geom.Point) geom.Point) []geom.Point {"),
        ("option", "func SomePoint(p geom.Point) OptionPoint {"),
        ("result", "func OkPoint(p geom.Point) ResultPoint {"),
        ("array", "func (a ArrayPoint) Push(v geom.Point) ArrayPoint { return append(a, v) }"),
    ];

    for (kind, declaration) in expected {
        let mut args = ws.args(Some(kind), &["Point=geom.Point", "Int=int", "Addr=net.Addr"]);
        args.root = Some(repo_root.clone());
        args.imports = vec!["example.com/geom".to_string()];
        args.output = Some(PathBuf::from("-"));

        let out = run_to_string(&args).unwrap();
        assert!(out.starts_with("// Code generated by futil at "), "{kind}: {out}");
        assert!(out.contains("\npackage geom\n\nimport (\n\t\"example.com/geom\"\n)\n"), "{kind}: {out}");
        assert!(out.contains(declaration), "{kind}: {out}");
        assert!(out.ends_with("}\n"), "{kind}: {out}");
        assert!(!has_clashing_receiver(&out), "{kind}: {out}");
    }

    let mut args = ws.args(Some("array"), &["Addr=net.Addr"]);
    args.root = Some(repo_root);
    args.output = Some(PathBuf::from("-"));
    let out = run_to_string(&args).unwrap();
    assert!(out.contains("func (a ArrayAddr) Push(v net.Addr) ArrayAddr { return append(a, v) }"));
    assert!(out.contains("func NewArrayAddr(as ...net.Addr) ArrayAddr {"));
}

/// A method whose first parameter reuses the receiver name, e.g.
/// `func (a T) M(a U)`.
fn has_clashing_receiver(out: &str) -> bool {
    out.lines().any(|line| {
        let Some(rest) = line.strip_prefix("func (") else {
            return false;
        };
        let Some((receiver, _)) = rest.split_once(' ') else {
            return false;
        };
        let Some((_, params)) = rest.split_once(") ").and_then(|(_, r)| r.split_once('(')) else {
            return false;
        };
        let params = params.split_once(')').map_or(params, |(list, _)| list);
        params.split(',').any(|param| {
            param.trim().split_once(' ').is_some_and(|(name, _)| name == receiver)
        })
    })
}
