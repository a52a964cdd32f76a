//! Default values for ctf-migrate.
//!
//! This module provides centralized default values used across commands,
//! ensuring consistency and avoiding duplication.

use std::path::{Path, PathBuf};

/// Environment variable consulted when `--access-token` is not given.
pub const ACCESS_TOKEN_ENV: &str = "CONTENTFUL_MANAGEMENT_ACCESS_TOKEN";

/// Environment used when `--environment-id` is not given.
pub const DEFAULT_ENVIRONMENT_ID: &str = "master";

/// Name of the directory holding one sub-directory of migrations per content type.
pub const MIGRATIONS_DIR: &str = "migrations";

/// Name of the per-content-type directory that stores migration state.
pub const STATE_DIR: &str = ".migrate";

/// Returns the migrations directory, relative to the working directory.
pub fn migrations_dir() -> PathBuf {
    Path::new(".").join(MIGRATIONS_DIR)
}
