//! # Error Handling
//!
//! This module defines the centralized error type for `ctf-migrate`. It uses
//! the `thiserror` library to describe every failure the rollback can hit,
//! with enough context in each variant to make the logged line actionable.
//!
//! The variants fall into three groups:
//!
//! - **Configuration errors**: a required parameter is missing or malformed.
//!   These are raised while building a `RollbackRequest`, before any
//!   filesystem or network activity.
//! - **Load errors**: the migrations directory, a content type directory or a
//!   persisted state record cannot be resolved into a `MigrationSet`.
//! - **Runtime errors**: the runner fails while reverting a migration (the
//!   target is unknown, the interpreter cannot be started, or a script exits
//!   with a failure status).
//!
//! None of these are retried. Each one is logged once and turns into exit
//! code 1.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for ctf-migrate operations
#[derive(Error, Debug)]
pub enum Error {
    /// A required parameter was not supplied on the command line or through
    /// its environment fallback.
    #[error("Missing required parameter: {name}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    MissingParameter {
        name: String,
        /// Optional hint for how to provide the parameter
        hint: Option<String>,
    },

    /// A parameter was supplied but cannot be used as given.
    #[error("Invalid parameter {name}: {message}")]
    InvalidParameter { name: String, message: String },

    /// The `--compiler` value is not of the form `<extension>:<module-path>`.
    #[error("Invalid compiler '{spec}': {message}")]
    InvalidCompiler { spec: String, message: String },

    /// The migrations directory itself could not be read.
    #[error("Migrations directory error: {}: {message}", path.display())]
    MigrationsDirectory { path: PathBuf, message: String },

    /// There is no migration directory for the requested content type.
    #[error("Unknown content type '{content_type}': no migrations found at {}", path.display())]
    UnknownContentType { content_type: String, path: PathBuf },

    /// The persisted state points at a migration that is not on disk anymore.
    #[error("Last run migration '{title}' for content type '{content_type}' no longer exists")]
    UnknownLastRun { content_type: String, title: String },

    /// The rollback target does not name any migration in the set.
    #[error("Could not find migration: {name}")]
    MigrationNotFound { name: String },

    /// The rollback target is a stem shared by several migration files.
    #[error("Migration '{name}' is ambiguous, it matches: {}", candidates.join(", "))]
    AmbiguousMigration {
        name: String,
        candidates: Vec<String>,
    },

    /// The loader returned no set for a requested content type.
    #[error("No migration set was loaded for content type '{content_type}'")]
    SetNotLoaded { content_type: String },

    /// The persisted migration state could not be read or written.
    #[error("Migration state error: {}: {message}", path.display())]
    State { path: PathBuf, message: String },

    /// The program registered for a migration file could not be started.
    #[error("Failed to start interpreter {}: {message}", program.display())]
    Interpreter { program: PathBuf, message: String },

    /// A migration script ran but reported a failure.
    #[error("Migration {migration} failed{}: {stderr}", code.map(|c| format!(" with exit code {}", c)).unwrap_or_default())]
    Script {
        migration: String,
        code: Option<i32>,
        stderr: String,
    },

    /// A JSON error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
