//! Command builder for the CLI.

use clap::Command;

use super::args::*;

/// Build the `futil` command.
pub fn build_cli() -> Command {
    Command::new("futil")
        .about("Generate specialized Go source from a template and type bindings")
        .version(env!("CARGO_PKG_VERSION"))
        .override_usage(
            "\
  futil -t <KIND> [OPTIONS] [LABEL=TYPE]...
  futil -t <KIND> --basics [OPTIONS]",
        )
        .after_help(
            r#"EXAMPLES:
  futil -t option Point=geom.Point          # option.go for geom.Point
  futil -t result --basics -o results.go    # every basic type
  futil -t array -i geom Point=geom.Point   # with an import
  futil -t func --dump-context Int=int      # show what the template sees"#,
        )
        .arg(type_arg())
        .arg(basics_arg())
        .arg(import_arg())
        .arg(output_arg())
        .arg(ext_arg())
        .arg(package_arg())
        .arg(root_arg())
        .arg(template_arg())
        .arg(dump_context_arg())
        .arg(verbose_arg())
        .arg(color_arg())
        .arg(bindings_arg())
}
