use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directives
pub const LOG_ENV: &str = "TYPERATE_LOG";

const DEFAULT_FILTER: &str = "info";

/// Install a global subscriber appending to `path`.
///
/// The terminal belongs to the TUI, so events only ever go to the file. Returns
/// false (and leaves logging disabled) when the file cannot be opened or a
/// subscriber is already installed.
pub fn init(path: &Path) -> bool {
    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return false;
        }
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(path) else {
        return false;
    };

    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn init_writes_events_to_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logs").join("typerate.log");
        assert!(init(&path));
        tracing::info!("hello from the test");
        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("hello from the test"));
        // a second subscriber cannot be installed
        assert!(!init(&path));
    }
}
