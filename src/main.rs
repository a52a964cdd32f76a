//! # ctf-migrate CLI
//!
//! This is the binary entry point for the `ctf-migrate` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Executing the appropriate command based on the parsed arguments.
//! - Turning the command's outcome into the process exit status. This is the
//!   only place the process status is decided.
//!
//! The rollback logic lives in the `ctf_migrate` library crate.

mod cli;
mod commands;

use std::process::ExitCode;

use clap::Parser;
use ctf_migrate::exit_codes;
use log::error;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    match cli.execute() {
        Ok(code) => code,
        Err(e) => {
            error!(target: "error", "{:#}", e);
            ExitCode::from(exit_codes::ERROR)
        }
    }
}
