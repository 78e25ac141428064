//! Logging setup for the command-line driver
//!
//! Logs go to a file: stdout and stderr belong to the debugger or the shell
//! the driver was started from.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{fmt, EnvFilter};

/// Default filter when `RUST_LOG` is not set
pub const DEFAULT_FILTER: &str = "vimview=info";

/// Default log location: `<temp dir>/vimview-<pid>.log`
pub fn default_log_path() -> PathBuf {
    std::env::temp_dir().join(format!("vimview-{}.log", std::process::id()))
}

/// Build the filter from `RUST_LOG`, falling back to `default`
pub fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Install the global subscriber writing to `log_file`.
///
/// Returns false if the file cannot be opened or a subscriber is already
/// installed; the driver keeps running without logs in that case.
pub fn init_global(log_file: &Path, verbose: bool) -> bool {
    let file = match OpenOptions::new().create(true).append(true).open(log_file) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("vimview: cannot open log file {}: {}", log_file.display(), e);
            return false;
        }
    };

    let filter = if verbose {
        env_filter("vimview=debug")
    } else {
        env_filter(DEFAULT_FILTER)
    };

    fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .is_ok()
}
