//! Path management for chatstream configuration files.
//!
//! ```text
//! ~/.config/chatstream/        # Config directory (platform config dir)
//! └── events.toml              # Migration settings
//! ```

use chatstream_core::error::{ChatstreamError, Result};
use std::path::PathBuf;

const APP_DIR_NAME: &str = "chatstream";
const CONFIG_FILE_NAME: &str = "events.toml";

/// Resolves per-user locations for chatstream files.
pub struct ChatstreamPaths;

impl ChatstreamPaths {
    /// Returns the chatstream configuration directory.
    ///
    /// Uses the platform config directory (XDG on Linux, Application Support
    /// on macOS, AppData on Windows).
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .ok_or_else(|| ChatstreamError::config("Cannot find config directory"))
    }

    /// Returns the path of the migration settings file.
    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }
}
