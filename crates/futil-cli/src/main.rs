mod cli;
mod commands;

use std::io;

use cli::{GenerateParams, build_cli};
use commands::generate::{self, GenerateArgs};

fn main() {
    cli::init_tracing();

    let matches = build_cli().get_matches();
    let args: GenerateArgs = GenerateParams::from_matches(&matches).into();

    let stdout = io::stdout();
    if let Err(err) = generate::run(&args, &mut stdout.lock()) {
        eprintln!("error: {err}");
        if args.verbose
            && let Some(rendered) = err.render_diagnostics(args.color)
        {
            eprintln!();
            eprint!("{rendered}");
        }
        std::process::exit(1);
    }
}
