//! # CLI Command Implementations
//!
//! Each subcommand of `ctf-migrate` lives in its own file and provides:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args`, calls into the
//!   `ctf_migrate` library, and reports the exit status to return.

pub mod down;
