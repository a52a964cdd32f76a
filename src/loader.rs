//! # Migration Loader
//!
//! Turns a `LoadRequest` into one pending `MigrationSet` per requested content
//! type. Loading a single content type can fail without affecting the others,
//! so the loader returns a `Result` per set inside the overall `Result`; the
//! outer error is reserved for problems that affect every set, such as a
//! missing migrations directory.
//!
//! The `MigrationLoader` trait is the seam the rollback command depends on.
//! `DirectoryLoader` is the implementation used by the CLI: it discovers
//! migration files under `<migrations>/<content-type>/` and overlays the state
//! kept by a `StateStore`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::debug;
use walkdir::WalkDir;

use crate::compiler::CompilerTable;
use crate::error::{Error, Result};
use crate::migration::{Migration, MigrationSet};
use crate::request::RollbackRequest;
use crate::state::{SetKey, StateStore};

/// Everything the loader needs to build migration sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub migrations_directory: PathBuf,
    pub space_id: String,
    pub environment_id: String,
    pub access_token: String,
    pub dry_run: bool,
    pub content_types: Vec<String>,
    /// Interpreters for the migration file extensions that may be loaded.
    pub compilers: CompilerTable,
}

impl LoadRequest {
    /// Build the load request for a rollback.
    pub fn for_rollback(
        request: &RollbackRequest,
        migrations_directory: impl Into<PathBuf>,
        compilers: CompilerTable,
    ) -> Self {
        Self {
            migrations_directory: migrations_directory.into(),
            space_id: request.space_id.clone(),
            environment_id: request.environment_id.clone(),
            access_token: request.access_token.clone(),
            dry_run: request.dry_run,
            content_types: request.content_types(),
            compilers,
        }
    }
}

/// Produces migration sets - allows mocking in tests
pub trait MigrationLoader: Send + Sync {
    /// Load one set per entry of `request.content_types`, in the same order.
    fn load(&self, request: &LoadRequest) -> Result<Vec<Result<MigrationSet>>>;
}

/// Loads migration files from disk and their state from a `StateStore`.
pub struct DirectoryLoader {
    store: Arc<dyn StateStore>,
}

impl DirectoryLoader {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self { store }
    }

    fn load_set(&self, request: &LoadRequest, content_type: &str) -> Result<MigrationSet> {
        let dir = request.migrations_directory.join(content_type);
        if !dir.is_dir() {
            return Err(Error::UnknownContentType {
                content_type: content_type.to_string(),
                path: dir,
            });
        }

        let key = SetKey::new(
            request.space_id.as_str(),
            request.environment_id.as_str(),
            content_type,
        );

        let mut migrations = discover_migrations(&dir, &request.compilers)?;
        debug!(
            target: "load",
            "{}: {} migration file(s) in {} ({})",
            key,
            migrations.len(),
            dir.display(),
            request.compilers.extensions().collect::<Vec<_>>().join(", ")
        );
        let state = self.store.load(&key)?;

        for record in &state.migrations {
            if let Some(migration) = migrations.iter_mut().find(|m| m.title == record.title) {
                migration.timestamp = record.timestamp;
            }
        }

        if let Some(last_run) = &state.last_run {
            if !migrations.iter().any(|m| &m.title == last_run) {
                return Err(Error::UnknownLastRun {
                    content_type: content_type.to_string(),
                    title: last_run.clone(),
                });
            }
        }

        Ok(MigrationSet::new(
            key,
            migrations,
            state.last_run,
            request.access_token.as_str(),
            request.dry_run,
        ))
    }
}

impl MigrationLoader for DirectoryLoader {
    fn load(&self, request: &LoadRequest) -> Result<Vec<Result<MigrationSet>>> {
        if !request.migrations_directory.is_dir() {
            return Err(Error::MigrationsDirectory {
                path: request.migrations_directory.clone(),
                message: "directory not found".to_string(),
            });
        }

        Ok(request
            .content_types
            .iter()
            .map(|content_type| self.load_set(request, content_type))
            .collect())
    }
}

/// List the loadable migration files directly inside `dir`, sorted by name.
///
/// Hidden entries and files whose extension has no registered interpreter
/// are skipped.
pub fn discover_migrations(dir: &Path, compilers: &CompilerTable) -> Result<Vec<Migration>> {
    let mut migrations = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| Error::MigrationsDirectory {
            path: dir.to_path_buf(),
            message: e.to_string(),
        })?;

        if !entry.file_type().is_file() || entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }

        if let Some(interpreter) = compilers.interpreter_for(entry.path()) {
            migrations.push(Migration::new(entry.path(), interpreter));
        }
    }

    Ok(migrations)
}
