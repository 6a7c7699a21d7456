//! Binary crate for the `pgacalc` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Logging setup
//! - Writing the single result value, or a placeholder, to stdout

use std::process::ExitCode;

use clap::Parser;

mod cli;
mod logging;

fn main() -> ExitCode {
    match cli::Cli::try_parse() {
        Ok(cmd) => cmd.run(),
        Err(err) => cli::parse_failure(err),
    }
}
