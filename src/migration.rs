//! # Migrations and Migration Sets
//!
//! A `MigrationSet` is the ordered history of migrations for one content type
//! in one space and environment. Migrations are ordered by file name, so the
//! usual `001-`, `002-` prefixes decide the order. Applied migrations carry the
//! time they were applied, and the set keeps a `last_run` pointer to the most
//! recently applied one.
//!
//! Rolling back walks the pointer backwards: [`MigrationSet::down_plan`]
//! lists the applied migrations from `last_run` down to and including the
//! target, and [`MigrationSet::mark_reverted`] moves the pointer after each
//! step.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::state::{MigrationRecord, SetKey, SetState};

/// One migration definition file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    /// File name, e.g. `003-rename-field.sh`.
    pub title: String,
    pub path: PathBuf,
    /// Program that executes the file.
    pub interpreter: PathBuf,
    /// When the migration was applied, `None` if it is pending.
    pub timestamp: Option<DateTime<Utc>>,
}

impl Migration {
    /// A pending migration.
    pub fn new(path: impl Into<PathBuf>, interpreter: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let title = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            title,
            path,
            interpreter: interpreter.into(),
            timestamp: None,
        }
    }

    /// Mark the migration as applied at `timestamp`.
    pub fn applied_at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn is_applied(&self) -> bool {
        self.timestamp.is_some()
    }

    /// The title without its extension, e.g. `003-rename-field`.
    pub fn stem(&self) -> &str {
        Path::new(&self.title)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(&self.title)
    }

    /// Whether `name` refers to this migration, by full title or by stem.
    pub fn matches(&self, name: &str) -> bool {
        self.title == name || self.stem() == name
    }
}

/// The migrations of one content type in one space and environment.
#[derive(Debug, Clone)]
pub struct MigrationSet {
    key: SetKey,
    migrations: Vec<Migration>,
    last_run: Option<String>,
    access_token: String,
    dry_run: bool,
}

impl MigrationSet {
    /// Build a set. `migrations` are sorted by title.
    pub fn new(
        key: SetKey,
        mut migrations: Vec<Migration>,
        last_run: Option<String>,
        access_token: impl Into<String>,
        dry_run: bool,
    ) -> Self {
        migrations.sort_by(|a, b| a.title.cmp(&b.title));
        Self {
            key,
            migrations,
            last_run,
            access_token: access_token.into(),
            dry_run,
        }
    }

    pub fn key(&self) -> &SetKey {
        &self.key
    }

    pub fn migrations(&self) -> &[Migration] {
        &self.migrations
    }

    /// Title of the most recently applied migration.
    pub fn last_run(&self) -> Option<&str> {
        self.last_run.as_deref()
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Index of the migration `name` refers to.
    ///
    /// An exact title wins. Otherwise `name` is a stem and must match exactly
    /// one file: `001-init` is ambiguous when both `001-init.sh` and
    /// `001-init.ts` exist.
    pub fn position(&self, name: &str) -> Result<usize> {
        if let Some(index) = self.migrations.iter().position(|m| m.title == name) {
            return Ok(index);
        }

        let candidates: Vec<usize> = self
            .migrations
            .iter()
            .enumerate()
            .filter(|(_, m)| m.matches(name))
            .map(|(i, _)| i)
            .collect();

        match candidates.as_slice() {
            [index] => Ok(*index),
            [] => Err(Error::MigrationNotFound {
                name: name.to_string(),
            }),
            _ => Err(Error::AmbiguousMigration {
                name: name.to_string(),
                candidates: candidates
                    .iter()
                    .map(|&i| self.migrations[i].title.clone())
                    .collect(),
            }),
        }
    }

    /// Indices of the migrations to revert to get down to `target`, in the
    /// order they must run.
    ///
    /// That is every applied migration from `last_run` back to and including
    /// `target`. The plan is empty when nothing has run or when `target` comes
    /// after `last_run`.
    pub fn down_plan(&self, target: &str) -> Result<Vec<usize>> {
        let target_index = self.position(target)?;

        let Some(last_index) = self.last_run.as_deref().and_then(|t| self.position(t).ok()) else {
            return Ok(Vec::new());
        };

        if target_index > last_index {
            return Ok(Vec::new());
        }

        Ok((target_index..=last_index)
            .rev()
            .filter(|&i| self.migrations[i].is_applied())
            .collect())
    }

    /// Record that the migration at `index` has been reverted.
    ///
    /// The `last_run` pointer moves to the closest applied migration before
    /// it, or to nothing.
    pub fn mark_reverted(&mut self, index: usize) {
        if let Some(migration) = self.migrations.get_mut(index) {
            migration.timestamp = None;
        }
        self.last_run = self.migrations[..index.min(self.migrations.len())]
            .iter()
            .rev()
            .find(|m| m.is_applied())
            .map(|m| m.title.clone());
    }

    /// The persisted form of the set.
    pub fn to_state(&self) -> SetState {
        SetState {
            last_run: self.last_run.clone(),
            migrations: self
                .migrations
                .iter()
                .map(|m| MigrationRecord {
                    title: m.title.clone(),
                    timestamp: m.timestamp,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(hour: u32) -> DateTime<Utc> {
        format!("2024-05-01T{:02}:00:00Z", hour).parse().unwrap()
    }

    fn migration(title: &str) -> Migration {
        Migration::new(format!("migrations/post/{}", title), "sh")
    }

    /// Three applied migrations and one pending.
    fn set() -> MigrationSet {
        MigrationSet::new(
            SetKey::new("space1", "master", "post"),
            vec![
                migration("003-rename-field.sh").applied_at(at(3)),
                migration("001-init.sh").applied_at(at(1)),
                migration("002-add-field.sh").applied_at(at(2)),
                migration("004-pending.sh"),
            ],
            Some("003-rename-field.sh".to_string()),
            "token",
            false,
        )
    }

    #[test]
    fn test_migration_title_and_stem() {
        let m = migration("001-init.sh");
        assert_eq!(m.title, "001-init.sh");
        assert_eq!(m.stem(), "001-init");
        assert!(m.matches("001-init.sh"));
        assert!(m.matches("001-init"));
        assert!(!m.matches("001"));
    }

    #[test]
    fn test_set_is_sorted_by_title() {
        let titles: Vec<_> = set().migrations().iter().map(|m| m.title.clone()).collect();
        assert_eq!(
            titles,
            vec![
                "001-init.sh",
                "002-add-field.sh",
                "003-rename-field.sh",
                "004-pending.sh"
            ]
        );
    }

    #[test]
    fn test_down_plan_single_step_to_last_run() {
        assert_eq!(set().down_plan("003-rename-field.sh").unwrap(), vec![2]);
    }

    #[test]
    fn test_down_plan_to_first_is_inclusive_and_reversed() {
        assert_eq!(set().down_plan("001-init").unwrap(), vec![2, 1, 0]);
    }

    #[test]
    fn test_down_plan_unknown_target() {
        let err = set().down_plan("999-missing").unwrap_err();
        assert!(matches!(err, Error::MigrationNotFound { .. }));
    }

    #[test]
    fn test_down_plan_rejects_stem_shared_by_two_files() {
        let set = MigrationSet::new(
            SetKey::new("space1", "master", "post"),
            vec![
                migration("001-init.sh").applied_at(at(1)),
                migration("001-init.ts").applied_at(at(2)),
            ],
            Some("001-init.ts".to_string()),
            "token",
            false,
        );

        let err = set.down_plan("001-init").unwrap_err();
        match err {
            Error::AmbiguousMigration { name, candidates } => {
                assert_eq!(name, "001-init");
                assert_eq!(candidates, vec!["001-init.sh", "001-init.ts"]);
            }
            other => panic!("expected AmbiguousMigration, got {:?}", other),
        }

        // The full title still selects a single file
        assert_eq!(set.down_plan("001-init.ts").unwrap(), vec![1]);
    }

    #[test]
    fn test_down_plan_target_after_last_run_is_empty() {
        assert!(set().down_plan("004-pending.sh").unwrap().is_empty());
    }

    #[test]
    fn test_down_plan_nothing_applied_is_empty() {
        let set = MigrationSet::new(
            SetKey::new("space1", "master", "post"),
            vec![migration("001-init.sh")],
            None,
            "token",
            false,
        );
        assert!(set.down_plan("001-init.sh").unwrap().is_empty());
    }

    #[test]
    fn test_down_plan_skips_unapplied_gaps() {
        let set = MigrationSet::new(
            SetKey::new("space1", "master", "post"),
            vec![
                migration("001-init.sh").applied_at(at(1)),
                migration("002-skipped.sh"),
                migration("003-rename-field.sh").applied_at(at(3)),
            ],
            Some("003-rename-field.sh".to_string()),
            "token",
            false,
        );
        assert_eq!(set.down_plan("001-init.sh").unwrap(), vec![2, 0]);
    }

    #[test]
    fn test_mark_reverted_moves_pointer_back() {
        let mut set = set();
        set.mark_reverted(2);
        assert_eq!(set.last_run(), Some("002-add-field.sh"));
        assert!(!set.migrations()[2].is_applied());

        set.mark_reverted(1);
        set.mark_reverted(0);
        assert_eq!(set.last_run(), None);
    }

    #[test]
    fn test_to_state_reflects_reverts() {
        let mut set = set();
        set.mark_reverted(2);
        let state = set.to_state();
        assert_eq!(state.last_run.as_deref(), Some("002-add-field.sh"));
        assert_eq!(state.migrations.len(), 4);
        assert_eq!(state.migrations[2].title, "003-rename-field.sh");
        assert_eq!(state.migrations[2].timestamp, None);
        assert_eq!(state.migrations[0].timestamp, Some(at(1)));
    }
}
