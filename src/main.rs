use std::process::ExitCode;

use clap::Parser;

use paintcore::cli;

fn main() -> ExitCode {
    paintcore::logger::init();
    cli::run(cli::CliArgs::parse())
}
