//! # ctf-migrate Library
//!
//! This library provides the rollback side of content-model migrations for a
//! Contentful space. It is used by the `ctf-migrate` command-line tool but the
//! pieces are independent of the CLI, so the rollback can be driven (and
//! tested) without spawning a process.
//!
//! ## Quick Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use ctf_migrate::loader::DirectoryLoader;
//! use ctf_migrate::request::{RollbackParams, RollbackRequest};
//! use ctf_migrate::rollback;
//! use ctf_migrate::runner::ScriptRunner;
//! use ctf_migrate::state::FileStateStore;
//!
//! let request = RollbackRequest::from_params(RollbackParams {
//!     access_token: Some("CFPAT-...".to_string()),
//!     space_id: Some("space1".to_string()),
//!     content_type: Some("post".to_string()),
//!     ..Default::default()
//! })
//! .unwrap();
//!
//! let dir = ctf_migrate::defaults::migrations_dir();
//! let store = Arc::new(FileStateStore::new(&dir));
//! let summary = rollback::run(
//!     &request,
//!     &dir,
//!     &DirectoryLoader::new(store.clone()),
//!     &ScriptRunner::new(store),
//! );
//! println!("exit code {}", summary.exit_code());
//! ```
//!
//! ## Core Concepts
//!
//! - **Requests (`request`)**: validated rollback parameters.
//! - **Compilers (`compiler`)**: which program runs a migration file, chosen
//!   by extension.
//! - **Migration sets (`migration`, `state`)**: the ordered migrations of a
//!   content type plus the persisted record of which ones ran.
//! - **Loader and runner (`loader`, `runner`)**: trait seams that build sets
//!   and revert them, with filesystem and child-process implementations.
//! - **Rollback (`rollback`)**: ties the pieces together and reports a
//!   summary instead of exiting.

pub mod compiler;
pub mod defaults;
pub mod error;
pub mod exit_codes;
pub mod loader;
pub mod logging;
pub mod migration;
pub mod output;
pub mod request;
pub mod rollback;
pub mod runner;
pub mod state;

mod rollback_proptest;
