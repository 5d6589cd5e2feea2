//! File-backed logging setup
//!
//! Hosts embedding the library call this once at startup; all modules log
//! through the `log` facade.

use std::fs::File;
use std::path::Path;

use simplelog::{Config, LevelFilter, WriteLogger};

/// Initialize file logging at the given level. Errors if a global logger is
/// already installed or the file cannot be created.
pub fn init_file_logging(path: &Path, level: LevelFilter) -> anyhow::Result<()> {
    WriteLogger::init(level, Config::default(), File::create(path)?)?;
    log::info!("folio logging initialized at {level}");
    Ok(())
}
