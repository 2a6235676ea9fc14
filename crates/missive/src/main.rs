use std::io;
use std::process::ExitCode;

use clap::Parser;
use console::style;
use missive::{logging, Cli};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let _guard = match logging::init(cli.verbose, cli.log_file.as_deref()) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("{} {:?}", style("error:").red().bold().for_stderr(), err);
            return ExitCode::FAILURE;
        }
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match missive::run(&cli, &mut out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %format!("{:#}", err), "run failed");
            eprintln!("{} {:?}", style("error:").red().bold().for_stderr(), err);
            ExitCode::FAILURE
        }
    }
}
