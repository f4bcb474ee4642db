//! Dispatch: extract params from `ArgMatches` and convert them to command args.

use std::path::PathBuf;

use clap::ArgMatches;

use super::ColorChoice;
use crate::commands::generate::GenerateArgs;

pub struct GenerateParams {
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
    pub color: ColorChoice,
}

impl GenerateParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            kind: m.get_one::<String>("type").cloned(),
            bindings: strings(m, "bindings"),
            basics: m.get_flag("basics"),
            imports: strings(m, "imports"),
            output: m.get_one::<PathBuf>("output").cloned(),
            ext: m
                .get_one::<String>("ext")
                .cloned()
                .unwrap_or_else(|| "go".to_string()),
            package: m.get_one::<String>("package").cloned(),
            root: m.get_one::<PathBuf>("root").cloned(),
            template: m.get_one::<PathBuf>("template").cloned(),
            dump_context: m.get_flag("dump_context"),
            verbose: m.get_flag("verbose"),
            color: parse_color(m),
        }
    }
}

impl From<GenerateParams> for GenerateArgs {
    fn from(p: GenerateParams) -> Self {
        Self {
            kind: p.kind,
            bindings: p.bindings,
            basics: p.basics,
            imports: p.imports,
            output: p.output,
            ext: p.ext,
            package: p.package,
            root: p.root,
            template: p.template,
            dump_context: p.dump_context,
            verbose: p.verbose,
            color: p.color.should_colorize(),
            work_dir: PathBuf::from("."),
        }
    }
}

fn strings(m: &ArgMatches, id: &str) -> Vec<String> {
    m.get_many::<String>(id)
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

fn parse_color(m: &ArgMatches) -> ColorChoice {
    match m.get_one::<String>("color").map(|s| s.as_str()) {
        Some("always") => ColorChoice::Always,
        Some("never") => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}
