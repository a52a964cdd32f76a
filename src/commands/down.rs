//! # Down Command Implementation
//!
//! This module implements the `down` subcommand, which rolls back migrations
//! of a single content type.
//!
//! ## Functionality
//!
//! - **Without a file**: reverts only the most recently applied migration.
//! - **With a file**: reverts every applied migration down to and including
//!   that one.
//! - **Dry run**: migration scripts are told to only print their planned
//!   changes, and the migration state is left untouched.
//!
//! Migrations are read from `./migrations/<content-type>/`.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;

use ctf_migrate::defaults::{self, ACCESS_TOKEN_ENV, DEFAULT_ENVIRONMENT_ID};
use ctf_migrate::loader::DirectoryLoader;
use ctf_migrate::output::{emoji, OutputConfig};
use ctf_migrate::request::{RollbackParams, RollbackRequest};
use ctf_migrate::rollback::{self, RollbackSummary};
use ctf_migrate::runner::ScriptRunner;
use ctf_migrate::state::{FileStateStore, StateStore};

/// Migrate down to a given migration or just the last one if not specified
#[derive(Args, Debug)]
pub struct DownArgs {
    /// If specified, roll back all migration scripts down to this one.
    #[arg(value_name = "FILE")]
    pub file: Option<String>,

    /// Contentful Management API access token.
    #[arg(
        short = 't',
        long,
        value_name = "TOKEN",
        env = ACCESS_TOKEN_ENV,
        hide_env_values = true
    )]
    pub access_token: Option<String>,

    /// Space id to use.
    #[arg(short, long, value_name = "ID")]
    pub space_id: Option<String>,

    /// Id of the environment within the space.
    #[arg(short, long, value_name = "ID", default_value = DEFAULT_ENVIRONMENT_ID)]
    pub environment_id: String,

    /// Single content type name to process.
    #[arg(short, long, value_name = "NAME")]
    pub content_type: Option<String>,

    /// Compiler to add, e.g. "ts:./tsnode.js".
    #[arg(long, value_name = "EXT:MODULE")]
    pub compiler: Option<String>,

    /// Only show the planned actions, don't write anything to Contentful.
    #[arg(short, long)]
    pub dry_run: bool,
}

impl From<DownArgs> for RollbackParams {
    fn from(args: DownArgs) -> Self {
        Self {
            access_token: args.access_token,
            space_id: args.space_id,
            environment_id: Some(args.environment_id),
            content_type: args.content_type,
            compiler: args.compiler,
            dry_run: args.dry_run,
            file: args.file,
        }
    }
}

/// Execute the `down` command.
///
/// Invalid arguments are returned as an error. Load and rollback failures
/// have already been logged by the time this returns, and only show up in
/// the exit code.
pub fn execute(args: DownArgs, output: &OutputConfig) -> Result<ExitCode> {
    let summary = run(args, output)?;
    Ok(ExitCode::from(summary.exit_code()))
}

fn run(args: DownArgs, output: &OutputConfig) -> Result<RollbackSummary> {
    let request = RollbackRequest::from_params(args.into())?;

    if request.dry_run {
        println!(
            "{} DRY RUN MODE - migration state will not be changed",
            emoji(output, "🔎", "[DRY RUN]")
        );
    }

    let dir = defaults::migrations_dir();
    let store: Arc<dyn StateStore> = Arc::new(FileStateStore::new(&dir));
    let loader = DirectoryLoader::new(store.clone());
    let runner = ScriptRunner::new(store);

    Ok(rollback::run(&request, &dir, &loader, &runner))
}
