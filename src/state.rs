//! # Migration State
//!
//! Which migrations of a set have been applied, and which one ran last, is
//! persisted per space, environment and content type. The `StateStore` trait
//! keeps the loader and runner independent of where that record lives;
//! `FileStateStore` keeps it as a JSON document next to the migrations:
//!
//! ```text
//! migrations/<content-type>/.migrate/<space-id>/<environment-id>.json
//! ```
//!
//! ```json
//! { "lastRun": "002-add-field.sh",
//!   "migrations": [{ "title": "001-init.sh", "timestamp": "2024-05-01T10:00:00Z" }] }
//! ```
//!
//! A missing document means nothing has been applied yet.

use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::defaults::STATE_DIR;
use crate::error::{Error, Result};

/// Identity of a migration set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SetKey {
    pub space_id: String,
    pub environment_id: String,
    pub content_type: String,
}

impl SetKey {
    pub fn new(
        space_id: impl Into<String>,
        environment_id: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            space_id: space_id.into(),
            environment_id: environment_id.into(),
            content_type: content_type.into(),
        }
    }
}

impl fmt::Display for SetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.space_id, self.environment_id, self.content_type
        )
    }
}

/// Persisted record of one applied (or reverted) migration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationRecord {
    pub title: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Persisted state of a migration set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetState {
    #[serde(default)]
    pub last_run: Option<String>,
    #[serde(default)]
    pub migrations: Vec<MigrationRecord>,
}

/// Storage for migration set state - allows mocking in tests
pub trait StateStore: Send + Sync {
    /// Load the state for `key`. A set that was never migrated has the
    /// default (empty) state.
    fn load(&self, key: &SetKey) -> Result<SetState>;

    /// Replace the state for `key`.
    fn save(&self, key: &SetKey, state: &SetState) -> Result<()>;
}

/// JSON documents under the migrations directory.
#[derive(Debug, Clone)]
pub struct FileStateStore {
    migrations_dir: PathBuf,
}

impl FileStateStore {
    pub fn new(migrations_dir: impl Into<PathBuf>) -> Self {
        Self {
            migrations_dir: migrations_dir.into(),
        }
    }

    /// Location of the document for `key`.
    pub fn path_for(&self, key: &SetKey) -> PathBuf {
        self.migrations_dir
            .join(&key.content_type)
            .join(STATE_DIR)
            .join(&key.space_id)
            .join(format!("{}.json", key.environment_id))
    }
}

fn state_error(path: &Path, message: impl fmt::Display) -> Error {
    Error::State {
        path: path.to_path_buf(),
        message: message.to_string(),
    }
}

impl StateStore for FileStateStore {
    fn load(&self, key: &SetKey) -> Result<SetState> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(SetState::default());
        }

        let content = fs::read_to_string(&path).map_err(|e| state_error(&path, e))?;
        serde_json::from_str(&content).map_err(|e| state_error(&path, e))
    }

    fn save(&self, key: &SetKey, state: &SetState) -> Result<()> {
        let path = self.path_for(key);
        let dir = path
            .parent()
            .ok_or_else(|| state_error(&path, "state path has no parent directory"))?;
        fs::create_dir_all(dir).map_err(|e| state_error(&path, e))?;

        let json = serde_json::to_string_pretty(state)?;

        // Write next to the target and rename so readers never see a partial document
        let mut file = tempfile::NamedTempFile::new_in(dir).map_err(|e| state_error(&path, e))?;
        file.write_all(json.as_bytes())
            .and_then(|_| file.write_all(b"\n"))
            .map_err(|e| state_error(&path, e))?;
        file.persist(&path).map_err(|e| state_error(&path, e.error))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn key() -> SetKey {
        SetKey::new("space1", "master", "post")
    }

    #[test]
    fn test_path_layout() {
        let store = FileStateStore::new("migrations");
        assert_eq!(
            store.path_for(&key()),
            Path::new("migrations/post/.migrate/space1/master.json")
        );
    }

    #[test]
    fn test_load_missing_state_is_empty() {
        let temp = TempDir::new().unwrap();
        let store = FileStateStore::new(temp.path());
        assert_eq!(store.load(&key()).unwrap(), SetState::default());
    }

    #[test]
    fn test_save_then_load() {
        let temp = TempDir::new().unwrap();
        let store = FileStateStore::new(temp.path());
        let state = SetState {
            last_run: Some("001-init.sh".to_string()),
            migrations: vec![
                MigrationRecord {
                    title: "001-init.sh".to_string(),
                    timestamp: Some("2024-05-01T10:00:00Z".parse().unwrap()),
                },
                MigrationRecord {
                    title: "002-add-field.sh".to_string(),
                    timestamp: None,
                },
            ],
        };

        store.save(&key(), &state).unwrap();
        assert!(store.path_for(&key()).exists());
        assert_eq!(store.load(&key()).unwrap(), state);
    }

    #[test]
    fn test_document_uses_camel_case() {
        let temp = TempDir::new().unwrap();
        let store = FileStateStore::new(temp.path());
        let state = SetState {
            last_run: Some("001-init.sh".to_string()),
            migrations: Vec::new(),
        };
        store.save(&key(), &state).unwrap();

        let content = fs::read_to_string(store.path_for(&key())).unwrap();
        assert!(content.contains("\"lastRun\""));
    }

    #[test]
    fn test_partial_document_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let store = FileStateStore::new(temp.path());
        let path = store.path_for(&key());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{}").unwrap();

        assert_eq!(store.load(&key()).unwrap(), SetState::default());
    }

    #[test]
    fn test_corrupt_document_is_state_error() {
        let temp = TempDir::new().unwrap();
        let store = FileStateStore::new(temp.path());
        let path = store.path_for(&key());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "not json").unwrap();

        let err = store.load(&key()).unwrap_err();
        assert!(matches!(err, Error::State { .. }));
        assert!(err.to_string().contains("master.json"));
    }

    #[test]
    fn test_keys_are_isolated_by_environment() {
        let temp = TempDir::new().unwrap();
        let store = FileStateStore::new(temp.path());
        let state = SetState {
            last_run: Some("001-init.sh".to_string()),
            migrations: Vec::new(),
        };
        store.save(&key(), &state).unwrap();

        let staging = SetKey::new("space1", "staging", "post");
        assert_eq!(store.load(&staging).unwrap(), SetState::default());
    }
}
