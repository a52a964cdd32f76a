//! # Migration Compilers
//!
//! A migration file is executed by an interpreter chosen from its extension.
//! The `CompilerTable` holds that mapping. It starts with the native `sh`
//! entry and can be extended with `--compiler <extension>:<module-path>`,
//! which makes files with another extension (for example TypeScript run
//! through a transpiling wrapper) loadable.
//!
//! The table is a plain value handed to the loader. Registering a compiler
//! never touches process-wide state.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{Error, Result};

/// Extension that is always loadable, run with the program of the same name.
pub const NATIVE_EXTENSION: &str = "sh";

/// A parsed `--compiler` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerSpec {
    extension: String,
    module: PathBuf,
}

impl CompilerSpec {
    /// Parse an `<extension>:<module-path>` string such as `ts:./tsnode.js`.
    ///
    /// A leading `.` on the extension is accepted and dropped. Only the first
    /// `:` separates the parts, so module paths may contain colons.
    pub fn parse(spec: &str) -> Result<Self> {
        let invalid = |message: &str| Error::InvalidCompiler {
            spec: spec.to_string(),
            message: message.to_string(),
        };

        let (extension, module) = spec
            .split_once(':')
            .ok_or_else(|| invalid("expected <extension>:<module-path>"))?;

        let extension = extension.trim().trim_start_matches('.');
        if extension.is_empty() {
            return Err(invalid("extension is empty"));
        }
        if extension.contains(['/', '\\', '.']) {
            return Err(invalid("extension must be a single file extension"));
        }

        let module = module.trim();
        if module.is_empty() {
            return Err(invalid("module path is empty"));
        }

        Ok(Self {
            extension: extension.to_string(),
            module: PathBuf::from(module),
        })
    }

    /// The file extension this compiler handles, without a leading dot.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// The program that executes files with this extension.
    pub fn module(&self) -> &Path {
        &self.module
    }
}

impl FromStr for CompilerSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for CompilerSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.extension, self.module.display())
    }
}

/// Interpreters keyed by file extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerTable {
    interpreters: BTreeMap<String, PathBuf>,
}

impl CompilerTable {
    /// A table that only knows the native extension.
    pub fn builtin() -> Self {
        let mut interpreters = BTreeMap::new();
        interpreters.insert(
            NATIVE_EXTENSION.to_string(),
            PathBuf::from(NATIVE_EXTENSION),
        );
        Self { interpreters }
    }

    /// Add (or replace) the interpreter for `spec`'s extension.
    pub fn register(&mut self, spec: &CompilerSpec) {
        self.interpreters
            .insert(spec.extension.clone(), spec.module.clone());
    }

    /// Builder form of [`register`](Self::register).
    pub fn with(mut self, spec: &CompilerSpec) -> Self {
        self.register(spec);
        self
    }

    /// Whether files with `extension` can be loaded.
    pub fn handles(&self, extension: &str) -> bool {
        self.interpreters.contains_key(extension)
    }

    /// The interpreter for a migration file, if its extension is known.
    pub fn interpreter_for(&self, path: &Path) -> Option<&Path> {
        let extension = path.extension()?.to_str()?;
        self.interpreters.get(extension).map(PathBuf::as_path)
    }

    /// Known extensions in sorted order.
    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.interpreters.keys().map(String::as_str)
    }
}

impl Default for CompilerTable {
    fn default() -> Self {
        Self::builtin()
    }
}
