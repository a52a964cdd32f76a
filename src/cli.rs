//! CLI argument parsing and command dispatch

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use ctf_migrate::logging;
use ctf_migrate::output::OutputConfig;
use log::LevelFilter;

use crate::commands;

/// ctf-migrate - Manage content-model migrations for a Contentful space
#[derive(Parser, Debug)]
#[command(name = "ctf-migrate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (off, error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "info")]
    log_level: LevelFilter,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Migrate down to a given migration or just the last one if not specified
    Down(commands::down::DownArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<ExitCode> {
        let output = OutputConfig::from_env_and_flag(&self.color);
        logging::init(self.log_level, output);

        match self.command {
            Commands::Down(args) => commands::down::execute(args, &output),
        }
    }
}
