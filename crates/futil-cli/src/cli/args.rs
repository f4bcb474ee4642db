//! Argument builders for the `futil` command.
//!
//! Each function returns a `clap::Arg`; `commands.rs` composes them.

use std::path::PathBuf;

use clap::{Arg, ArgAction, value_parser};

/// Template kind (-t/--type). Checked after parsing so a missing value is a
/// usage error with our own message.
pub fn type_arg() -> Arg {
    Arg::new("type")
        .short('t')
        .long("type")
        .value_name("KIND")
        .help("Template to generate [func | option | result | array] (required)")
}

/// Type bindings (positional, repeatable).
pub fn bindings_arg() -> Arg {
    Arg::new("bindings")
        .value_name("LABEL=TYPE")
        .num_args(0..)
        .action(ArgAction::Append)
        .help("Type bindings, e.g. Point=geom.Point")
}

/// Merge the basics preset (--basics).
pub fn basics_arg() -> Arg {
    Arg::new("basics")
        .long("basics")
        .action(ArgAction::SetTrue)
        .help("Also generate for Go's basic types")
}

/// Import path (-i/--import, repeatable).
pub fn import_arg() -> Arg {
    Arg::new("imports")
        .short('i')
        .long("import")
        .value_name("PATH")
        .action(ArgAction::Append)
        .help("Package to import, can be repeated")
}

/// Output file (-o/--output).
pub fn output_arg() -> Arg {
    Arg::new("output")
        .short('o')
        .long("output")
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .help("Output file, `-` for stdout [default: <type>.<ext>]")
}

/// Extension of the default output file (--ext).
pub fn ext_arg() -> Arg {
    Arg::new("ext")
        .long("ext")
        .value_name("EXT")
        .default_value("go")
        .help("Extension used for the default output file name")
}

/// Package name override (-p/--package).
pub fn package_arg() -> Arg {
    Arg::new("package")
        .short('p')
        .long("package")
        .value_name("NAME")
        .help("Package name (skips looking it up in the current directory)")
}

/// Template root (--root, env FUTIL_ROOT).
pub fn root_arg() -> Arg {
    Arg::new("root")
        .long("root")
        .value_name("DIR")
        .env("FUTIL_ROOT")
        .value_parser(value_parser!(PathBuf))
        .help("Directory holding templates/<type>.tmpl")
}

/// Explicit template file (--template).
pub fn template_arg() -> Arg {
    Arg::new("template")
        .long("template")
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .help("Read the template from this file instead of the template root")
}

/// Print the generation context instead of rendering (--dump-context).
pub fn dump_context_arg() -> Arg {
    Arg::new("dump_context")
        .long("dump-context")
        .action(ArgAction::SetTrue)
        .help("Print the template data as JSON and exit")
}

/// Annotated template diagnostics (--verbose).
pub fn verbose_arg() -> Arg {
    Arg::new("verbose")
        .long("verbose")
        .action(ArgAction::SetTrue)
        .help("Show template errors with source snippets")
}

/// Color output control (--color).
pub fn color_arg() -> Arg {
    Arg::new("color")
        .long("color")
        .value_name("WHEN")
        .default_value("auto")
        .value_parser(["auto", "always", "never"])
        .help("Colorize diagnostics")
}
