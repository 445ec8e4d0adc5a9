//! Where settings live.
//!
//!   Linux:   ~/.config/geo-compliance/settings.toml
//!   macOS:   ~/Library/Application Support/geo-compliance/settings.toml
//!   Windows: %APPDATA%\geo-compliance\settings.toml
//!
//! `--config <PATH>` on the command line bypasses this lookup.

use std::path::{Path, PathBuf};

const APP_DIR: &str = "geo-compliance";
const SETTINGS_FILE: &str = "settings.toml";

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub settings_file: PathBuf,
}

impl AppPaths {
    /// Platform config dir from `dirs`, or `./geo-compliance` when the
    /// platform has none.
    pub fn new() -> Self {
        let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::under(&base)
    }

    /// Layout rooted at `base` instead of the platform config dir.
    pub fn under(base: &Path) -> Self {
        let config_dir = base.join(APP_DIR);
        Self {
            settings_file: config_dir.join(SETTINGS_FILE),
            config_dir,
        }
    }

    /// Settings file to read: `explicit` if given, else the default one.
    pub fn settings_path(explicit: Option<&Path>) -> PathBuf {
        explicit
            .map(Path::to_path_buf)
            .unwrap_or_else(|| Self::new().settings_file)
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}
