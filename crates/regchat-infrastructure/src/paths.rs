//! Path management for regchat configuration files.
//!
//! ```text
//! ~/.config/regchat/          # Config directory
//! ├── config.toml             # Client configuration
//! └── state.json              # Selected regulation, legacy user id, ID token
//! ```

use regchat_core::{RegchatError, Result};
use std::path::PathBuf;

const APP_DIR: &str = "regchat";

/// Platform paths of the regchat client.
pub struct RegchatPaths;

impl RegchatPaths {
    /// Returns the regchat configuration directory (e.g. `~/.config/regchat/`).
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| RegchatError::config("Cannot find config directory"))
    }

    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    pub fn state_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("state.json"))
    }
}
