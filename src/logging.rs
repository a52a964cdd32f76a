//! # Logging
//!
//! Sets up the `log` facade with an `env_logger` backend. Every line is
//! written to stderr as
//!
//! ```text
//!   migration : complete
//!       error : Could not find migration: 001-init
//! ```
//!
//! The left column is the record's target, so call sites pick the key with
//! `info!(target: "migration", ...)`. `RUST_LOG` filters are applied on top
//! of the `--log-level` flag, which allows silencing a single key such as
//! `RUST_LOG=down=off`.

use std::io::Write;

use console::Style;
use log::{Level, LevelFilter};

use crate::output::OutputConfig;

/// Width the key column is right-aligned to.
const KEY_WIDTH: usize = 10;

/// Install the global logger.
///
/// Calling this more than once is harmless: later calls leave the first
/// logger in place.
pub fn init(level: LevelFilter, output: OutputConfig) {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(level)
        .target(env_logger::Target::Stderr);

    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }

    builder.format(move |buf, record| {
        writeln!(
            buf,
            "  {} : {}",
            format_key(record.target(), record.level(), output.use_color),
            record.args()
        )
    });

    // A logger may already be installed (tests, embedding applications).
    let _ = builder.try_init();
}

/// Right-align the key and color it by level when colors are enabled.
pub fn format_key(key: &str, level: Level, use_color: bool) -> String {
    let padded = format!("{:>width$}", key, width = KEY_WIDTH);
    if !use_color {
        return padded;
    }

    let style = match level {
        Level::Error => Style::new().red().bold(),
        Level::Warn => Style::new().yellow(),
        Level::Info => Style::new().cyan(),
        Level::Debug | Level::Trace => Style::new().dim(),
    };
    style.force_styling(true).apply_to(padded).to_string()
}
