//! Process exit codes.
//!
//! Only the binary entry point turns these into a process status; library code
//! reports outcomes as values.

/// The rollback finished (or had nothing to do).
pub const SUCCESS: u8 = 0;

/// A validation, load or runtime error stopped the rollback.
pub const ERROR: u8 = 1;

/// Invalid command-line usage. Emitted by clap, listed here for completeness
/// of the documented contract.
pub const USAGE: u8 = 2;
