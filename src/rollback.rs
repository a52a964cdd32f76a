//! # Rollback
//!
//! Orchestrates a `down` invocation:
//!
//! 1. Build the compiler table from the request, before anything is loaded.
//! 2. Ask the loader for one pending set per content type.
//! 3. Drive every successfully loaded set down, in parallel, to the requested
//!    file or to its current `last_run` migration.
//! 4. Wait for every set to settle, log each outcome in request order, and
//!    summarise.
//!
//! Nothing here exits the process. The caller turns
//! [`RollbackSummary::exit_code`] into a status.

use std::path::Path;

use log::{error, info};
use rayon::prelude::*;

use crate::compiler::CompilerTable;
use crate::error::{Error, Result};
use crate::exit_codes;
use crate::loader::{LoadRequest, MigrationLoader};
use crate::migration::MigrationSet;
use crate::request::RollbackRequest;
use crate::runner::MigrationRunner;

/// What happened to a single migration set.
#[derive(Debug)]
pub struct SetOutcome {
    pub content_type: String,
    /// Titles reverted, in order, or the error that stopped the set.
    pub result: Result<Vec<String>>,
}

impl SetOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Aggregate result of a rollback.
#[derive(Debug, Default)]
pub struct RollbackSummary {
    /// Set when no set could be loaded at all.
    pub load_error: Option<Error>,
    pub outcomes: Vec<SetOutcome>,
}

impl RollbackSummary {
    /// Successful when loading worked and every set succeeded.
    pub fn is_success(&self) -> bool {
        self.load_error.is_none() && self.outcomes.iter().all(SetOutcome::is_success)
    }

    pub fn exit_code(&self) -> u8 {
        if self.is_success() {
            exit_codes::SUCCESS
        } else {
            exit_codes::ERROR
        }
    }
}

/// The interpreters available to this request.
pub fn compilers_for(request: &RollbackRequest) -> CompilerTable {
    let mut compilers = CompilerTable::builtin();
    if let Some(spec) = &request.compiler {
        compilers.register(spec);
    }
    compilers
}

/// The migration to roll back to: the requested file, else the set's current
/// `last_run` pointer.
pub fn resolve_target(file: Option<&str>, set: &MigrationSet) -> Option<String> {
    file.or_else(|| set.last_run()).map(str::to_string)
}

/// Roll back every migration set for `request`.
pub fn run(
    request: &RollbackRequest,
    migrations_dir: &Path,
    loader: &dyn MigrationLoader,
    runner: &dyn MigrationRunner,
) -> RollbackSummary {
    let compilers = compilers_for(request);
    let load_request = LoadRequest::for_rollback(request, migrations_dir, compilers);

    let pending = match loader.load(&load_request) {
        Ok(pending) => pending,
        Err(e) => {
            error!(target: "error", "{}", e);
            return RollbackSummary {
                load_error: Some(e),
                outcomes: Vec::new(),
            };
        }
    };

    // A loader that returns too few sets must not make a content type vanish
    let mut pending = pending.into_iter();
    let sets: Vec<_> = load_request
        .content_types
        .into_iter()
        .map(|content_type| {
            let set = pending.next().unwrap_or_else(|| {
                Err(Error::SetNotLoaded {
                    content_type: content_type.clone(),
                })
            });
            (content_type, set)
        })
        .collect();

    let file = request.file.as_deref();
    let outcomes: Vec<SetOutcome> = sets
        .into_par_iter()
        .map(|(content_type, set)| SetOutcome {
            result: set.and_then(|mut set| process_set(&mut set, file, runner)),
            content_type,
        })
        .collect();

    for outcome in &outcomes {
        match &outcome.result {
            Ok(reverted) if reverted.is_empty() => {
                info!(
                    target: "migration",
                    "nothing to roll back for {}",
                    outcome.content_type
                );
                info!(target: "migration", "complete");
            }
            Ok(_) => info!(target: "migration", "complete"),
            Err(e) => error!(target: "error", "{}", e),
        }
    }

    RollbackSummary {
        load_error: None,
        outcomes,
    }
}

fn process_set(
    set: &mut MigrationSet,
    file: Option<&str>,
    runner: &dyn MigrationRunner,
) -> Result<Vec<String>> {
    match resolve_target(file, set) {
        Some(target) => runner.down(set, &target),
        None => Ok(Vec::new()),
    }
}
