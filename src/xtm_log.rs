// File logging
// The terminal belongs to the UI, so tracing output goes to a log file in the data directory

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

pub const LOG_FILE: &str = "xtmines.log";
pub const LOG_ENV: &str = "XTMINES_LOG";

/// Install the global subscriber writing to `<dir>/xtmines.log`
/// Filter comes from XTMINES_LOG (EnvFilter syntax), default "info"
/// Returns false when the file cannot be opened; logging then stays off
pub fn init(dir: &Path) -> bool {
    if fs::create_dir_all(dir).is_err() {
        return false;
    }
    let file = match OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(LOG_FILE))
    {
        Ok(f) => f,
        Err(_) => return false,
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .is_ok()
}
