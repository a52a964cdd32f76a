//! # Migration Runner
//!
//! Drives a `MigrationSet` down to a target migration.
//!
//! `ScriptRunner` executes every migration in the set's down plan as
//!
//! ```text
//! <interpreter> <migration-file> down
//! ```
//!
//! with the connection details in the environment (see the `ENV_*`
//! constants). The script is responsible for talking to the content API; the
//! runner only sequences the calls and records progress. After each step the
//! set's state is saved, so a failure part-way leaves the already reverted
//! migrations recorded as reverted.
//!
//! In dry-run mode the scripts still run, with `CONTENTFUL_MIGRATION_DRY_RUN`
//! set to `true` so they can print their planned changes, and no state is
//! written.

use std::process::{Command, Stdio};
use std::sync::Arc;

use log::{debug, info};

use crate::error::{Error, Result};
use crate::migration::{Migration, MigrationSet};
use crate::state::StateStore;

pub const ENV_ACCESS_TOKEN: &str = crate::defaults::ACCESS_TOKEN_ENV;
pub const ENV_SPACE_ID: &str = "CONTENTFUL_SPACE_ID";
pub const ENV_ENVIRONMENT_ID: &str = "CONTENTFUL_ENVIRONMENT_ID";
pub const ENV_CONTENT_TYPE: &str = "CONTENTFUL_CONTENT_TYPE";
pub const ENV_DRY_RUN: &str = "CONTENTFUL_MIGRATION_DRY_RUN";

/// Runs migrations in the down direction - allows mocking in tests
pub trait MigrationRunner: Send + Sync {
    /// Revert the set's applied migrations from its `last_run` pointer down to
    /// and including `target`. Returns the titles that were reverted, in order.
    fn down(&self, set: &mut MigrationSet, target: &str) -> Result<Vec<String>>;
}

/// Executes migration files as child processes.
pub struct ScriptRunner {
    store: Arc<dyn StateStore>,
}

impl ScriptRunner {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self { store }
    }

    fn execute(&self, set: &MigrationSet, migration: &Migration) -> Result<()> {
        let key = set.key();
        let output = Command::new(&migration.interpreter)
            .arg(&migration.path)
            .arg("down")
            .env(ENV_ACCESS_TOKEN, set.access_token())
            .env(ENV_SPACE_ID, &key.space_id)
            .env(ENV_ENVIRONMENT_ID, &key.environment_id)
            .env(ENV_CONTENT_TYPE, &key.content_type)
            .env(ENV_DRY_RUN, set.is_dry_run().to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| Error::Interpreter {
                program: migration.interpreter.clone(),
                message: e.to_string(),
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if !output.status.success() {
            return Err(Error::Script {
                migration: migration.title.clone(),
                code: output.status.code(),
                stderr,
            });
        }

        if !stderr.is_empty() {
            debug!(target: "down", "{}: {}", migration.title, stderr);
        }
        Ok(())
    }
}

impl MigrationRunner for ScriptRunner {
    fn down(&self, set: &mut MigrationSet, target: &str) -> Result<Vec<String>> {
        let plan = set.down_plan(target)?;
        let mut reverted = Vec::with_capacity(plan.len());

        for index in plan {
            let migration = set.migrations()[index].clone();
            info!(target: "down", "{}", migration.title);

            self.execute(set, &migration)?;

            if !set.is_dry_run() {
                set.mark_reverted(index);
                self.store.save(set.key(), &set.to_state())?;
            }
            reverted.push(migration.title);
        }

        Ok(reverted)
    }
}
