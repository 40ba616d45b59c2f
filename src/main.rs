use std::process::ExitCode;

use clap::Parser;
use tally::cli::commands::Cli;
use tally::cli::handlers;
use tally::logging;

fn main() -> ExitCode {
    logging::init_logging();
    let cli = Cli::parse();

    match handlers::dispatch(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
