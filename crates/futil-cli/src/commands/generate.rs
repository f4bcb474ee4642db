use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use futil_core::TypeBindings;
use futil_lib::{GenerationContext, Generator};

use super::error::CliError;
use super::package_locator::locate_package;
use super::template_loader::{load_template, resolve_root, template_path};

/// Output path that means stdout.
const STDOUT: &str = "-";

pub struct GenerateArgs {
    pub kind: Option<String>,
    pub bindings: Vec<String>,
    pub basics: bool,
    pub imports: Vec<String>,
    pub output: Option<PathBuf>,
    pub ext: String,
    pub package: Option<String>,
    pub root: Option<PathBuf>,
    pub template: Option<PathBuf>,
    pub dump_context: bool,
    pub verbose: bool,
    pub color: bool,
    pub work_dir: PathBuf,
}

/// Run one generation. Output is written only once rendering succeeded;
/// `out` receives stdout output (`-o -` or `--dump-context`).
pub fn run(args: &GenerateArgs, out: &mut dyn Write) -> Result<(), CliError> {
    let kind = validate(args)?;

    let mut types = TypeBindings::from_pairs(&args.bindings)?;
    if args.basics {
        types = types.with_basics();
    }
    tracing::debug!(kind, bindings = types.len(), "collected type bindings");

    let package = match &args.package {
        Some(name) => name.clone(),
        None => locate_package(&args.work_dir)?,
    };
    let context = GenerationContext::new(package, types).imports(args.imports.iter().cloned());

    if args.dump_context {
        serde_json::to_writer_pretty(&mut *out, &context)?;
        writeln!(out).map_err(|source| CliError::OutputWrite {
            path: PathBuf::from(STDOUT),
            source,
        })?;
        return Ok(());
    }

    let path = match &args.template {
        Some(path) => args.work_dir.join(path),
        None => {
            let gopath = std::env::var_os("GOPATH");
            let root = resolve_root(args.root.as_deref(), gopath.as_deref(), &args.work_dir);
            template_path(&root, kind)
        }
    };
    tracing::debug!(path = %path.display(), "loading template");
    let source = load_template(&path, args.template.is_none().then_some(kind))?;

    let rendered = Generator::new()
        .generate(&context, &source)
        .map_err(|err| CliError::Template {
            summary: err.summary(&source),
            diagnostics: err.diagnostics(),
            path: path.clone(),
            text: source.clone(),
        })?;

    write_output(&output_path(args, kind), &rendered, out)
}

/// The template kind, checked before any file is touched.
fn validate(args: &GenerateArgs) -> Result<&str, CliError> {
    let Some(kind) = args.kind.as_deref() else {
        return Err(CliError::Usage(
            "type argument is required: use -t/--type <KIND>",
        ));
    };
    if kind.is_empty() || kind.starts_with('.') || kind.contains(['/', '\\']) {
        return Err(CliError::Usage(
            "template kind must be a plain name such as `option`",
        ));
    }
    if args.ext.is_empty() {
        return Err(CliError::Usage("--ext must not be empty"));
    }
    Ok(kind)
}

fn output_path(args: &GenerateArgs, kind: &str) -> PathBuf {
    match &args.output {
        Some(path) if path.as_os_str() == STDOUT => path.clone(),
        Some(path) => args.work_dir.join(path),
        None => args.work_dir.join(format!("{kind}.{}", args.ext)),
    }
}

fn write_output(path: &Path, bytes: &[u8], out: &mut dyn Write) -> Result<(), CliError> {
    let result = if path.as_os_str() == STDOUT {
        out.write_all(bytes).and_then(|()| out.flush())
    } else {
        fs::write(path, bytes)
    };
    result.map_err(|source| CliError::OutputWrite {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "wrote output");
    Ok(())
}
