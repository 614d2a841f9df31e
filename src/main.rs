//! `Lander` - Sequential mission-phase controller

use clap::Parser;
use clap::error::ErrorKind;

use lander::cli::args::Cli;
use lander::cli::commands;
use lander::error::ExitCode;
use lander::observability::init_logging;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::USAGE_ERROR,
            };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    if !cli.quiet {
        init_logging(cli.log_format, cli.verbose, cli.color);
    }

    match commands::dispatch(cli) {
        Ok(()) => std::process::exit(ExitCode::SUCCESS),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}
