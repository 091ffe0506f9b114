#![allow(clippy::print_stderr)]

use anyhow::Result;
use clap::Parser;
use std::io::IsTerminal;
use std::process::ExitCode;

use genbind_cli::args::{CliArgs, Command};
use genbind_cli::driver::{self, Report};
use genbind_cli::tracing_config;

/// The query ran and answered negatively (inference or a constraint failed).
const EXIT_NEGATIVE: u8 = 1;
/// The inputs could not be used.
const EXIT_ERROR: u8 = 2;

fn main() -> ExitCode {
    tracing_config::init_tracing();
    let args = CliArgs::parse();

    match run(&args) {
        Ok(report) => {
            print!("{}", report.render(std::io::stdout().is_terminal()));
            if report.status.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(EXIT_NEGATIVE)
            }
        }
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn run(args: &CliArgs) -> Result<Report> {
    match &args.command {
        Command::Infer(infer) => driver::infer(infer),
        Command::Check(check) => driver::check(check),
    }
}
