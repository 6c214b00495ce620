//! Diagnostic logging.
//!
//! The chat loop owns stdout, so tracing output only goes to a file. Without
//! a log file no subscriber is installed and events are dropped.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

pub const DEFAULT_DIRECTIVES: &str = "parley=info";

/// Install the global subscriber writing to `log_file`.
///
/// `directives` uses `EnvFilter` syntax; invalid directives fall back to
/// [`DEFAULT_DIRECTIVES`]. Returns whether a subscriber was installed.
pub fn init_tracing(log_file: Option<&Path>, directives: Option<&str>) -> io::Result<bool> {
    let Some(path) = log_file else {
        return Ok(false);
    };
    let file = open_log_file(path)?;

    let installed = tracing_subscriber::registry()
        .with(build_filter(directives))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .try_init()
        .is_ok();
    Ok(installed)
}

fn build_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVES))
}

/// Open `path` for appending, creating parent directories as needed.
pub fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}
