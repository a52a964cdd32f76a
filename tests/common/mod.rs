//! Shared test utilities for E2E tests.
//!
//! Add `mod common;` to a test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_migration("post", "001-init.sh", scripts::OK);
//!     fixture.down().args(["-c", "post"]).assert().success();
//! }
//! ```

use assert_cmd::Command;
use assert_fs::prelude::*;
use std::path::Path;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::scripts;
    #[allow(unused_imports)]
    pub use super::states;
    pub use super::TestFixture;
}

/// Migration scripts. Each one appends `<title> <direction> <dry-run>` to
/// `calls.log` in the working directory.
#[allow(dead_code)]
pub mod scripts {
    /// Succeeds.
    pub const OK: &str = r#"echo "$(basename "$0") $1 $CONTENTFUL_MIGRATION_DRY_RUN" >> calls.log
"#;

    /// Fails with exit code 4 after writing to stderr.
    pub const FAIL: &str = r#"echo "$(basename "$0") $1 $CONTENTFUL_MIGRATION_DRY_RUN" >> calls.log
echo "remote rejected the change" >&2
exit 4
"#;

    /// Records the connection details it received.
    pub const ENV: &str = r#"echo "$CONTENTFUL_MANAGEMENT_ACCESS_TOKEN $CONTENTFUL_SPACE_ID $CONTENTFUL_ENVIRONMENT_ID $CONTENTFUL_CONTENT_TYPE" >> env.log
"#;
}

/// Migration state documents.
#[allow(dead_code)]
pub mod states {
    /// `001-init.sh` and `002-add-field.sh` applied, `002` ran last.
    pub const TWO_APPLIED: &str = r#"{
  "lastRun": "002-add-field.sh",
  "migrations": [
    { "title": "001-init.sh", "timestamp": "2024-05-01T10:00:00Z" },
    { "title": "002-add-field.sh", "timestamp": "2024-05-02T10:00:00Z" }
  ]
}
"#;
}

/// A temporary project directory with a `migrations/` tree.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

#[allow(dead_code)]
impl TestFixture {
    /// Create a new test fixture with an empty `migrations/` directory.
    pub fn new() -> Self {
        let temp_dir = assert_fs::TempDir::new().expect("Failed to create temp directory");
        temp_dir
            .child("migrations")
            .create_dir_all()
            .expect("Failed to create migrations directory");
        Self { temp_dir }
    }

    /// Add a migration file for `content_type`.
    pub fn with_migration(self, content_type: &str, title: &str, script: &str) -> Self {
        self.temp_dir
            .child(format!("migrations/{}/{}", content_type, title))
            .write_str(script)
            .expect("Failed to write migration");
        self
    }

    /// Write the state document for `content_type` in `space1`/`master`.
    pub fn with_state(self, content_type: &str, state: &str) -> Self {
        self.temp_dir
            .child(Self::state_path(content_type))
            .write_str(state)
            .expect("Failed to write state");
        self
    }

    /// Read the state document for `content_type` in `space1`/`master`.
    pub fn state(&self, content_type: &str) -> serde_json::Value {
        let content = std::fs::read_to_string(self.path().join(Self::state_path(content_type)))
            .expect("Failed to read state");
        serde_json::from_str(&content).expect("State is not JSON")
    }

    /// Lines appended by the migration scripts.
    pub fn calls(&self) -> Vec<String> {
        self.read_lines("calls.log")
    }

    /// Lines of a file in the fixture, empty if it does not exist.
    pub fn read_lines(&self, name: &str) -> Vec<String> {
        std::fs::read_to_string(self.path().join(name))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// A `ctf-migrate` command running in the fixture, isolated from the
    /// caller's environment.
    pub fn command(&self) -> Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("ctf-migrate");
        cmd.current_dir(self.path())
            .env_remove(ctf_migrate::defaults::ACCESS_TOKEN_ENV)
            .env_remove("RUST_LOG")
            .arg("--color")
            .arg("never");
        cmd
    }

    /// `ctf-migrate down` with a token and `space1`.
    pub fn down(&self) -> Command {
        let mut cmd = self.command();
        cmd.args(["down", "--access-token", "token", "--space-id", "space1"]);
        cmd
    }

    fn state_path(content_type: &str) -> String {
        format!("migrations/{}/.migrate/space1/master.json", content_type)
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
