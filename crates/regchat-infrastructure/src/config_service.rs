//! Configuration loading.
//!
//! Priority, highest first: environment variables, `config.toml`, defaults.
//! Command-line flags are applied on top by the binary.

use crate::paths::RegchatPaths;
use regchat_core::config::ClientConfig;
use regchat_core::{RegchatError, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_API_BASE_URL: &str = "API_BASE_URL";
pub const ENV_SSO_REDIRECT_BASE_URL: &str = "SSO_REDIRECT_BASE_URL";
pub const ENV_OIDC_ISSUER_URL: &str = "OIDC_ISSUER_URL";
pub const ENV_OIDC_CLIENT_ID: &str = "OIDC_CLIENT_ID";
pub const ENV_PORT: &str = "PORT";
pub const ENV_STATIC_DIR: &str = "REGCHAT_STATIC_DIR";
pub const ENV_CONTEXT_WINDOW: &str = "REGCHAT_CONTEXT_WINDOW";

/// Loads [`ClientConfig`] from a TOML file and the process environment.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
}

impl ConfigService {
    /// Uses `~/.config/regchat/config.toml`.
    pub fn new() -> Result<Self> {
        Ok(Self::with_path(RegchatPaths::config_file()?))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File values overlaid by environment variables.
    pub fn load(&self) -> Result<ClientConfig> {
        let config = self.load_file()?;
        apply_env_overrides(config, |key| std::env::var(key).ok())
    }

    /// File values only. A missing file yields the defaults.
    pub fn load_file(&self) -> Result<ClientConfig> {
        if !self.path.exists() {
            tracing::debug!(
                "[Config] {} not found, using defaults",
                self.path.display()
            );
            return Ok(ClientConfig::default());
        }

        let content = fs::read_to_string(&self.path)?;
        let config: ClientConfig = toml::from_str(&content)?;
        tracing::debug!("[Config] Loaded {}", self.path.display());
        Ok(config)
    }
}

/// Overlays variables returned by `lookup` onto `config`.
///
/// Empty values are ignored. Numeric variables that do not parse are a
/// configuration error.
pub fn apply_env_overrides<F>(mut config: ClientConfig, lookup: F) -> Result<ClientConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if let Some(value) = get(ENV_API_BASE_URL) {
        config.api_base_url = value;
    }
    if let Some(value) = get(ENV_SSO_REDIRECT_BASE_URL) {
        config.sso_redirect_base_url = value;
    }
    if let Some(value) = get(ENV_OIDC_ISSUER_URL) {
        config.identity.issuer_url = value;
    }
    if let Some(value) = get(ENV_OIDC_CLIENT_ID) {
        config.identity.client_id = value;
    }
    if let Some(value) = get(ENV_PORT) {
        config.server.port = value
            .trim()
            .parse()
            .map_err(|_| RegchatError::config(format!("{ENV_PORT} is not a port: {value}")))?;
    }
    if let Some(value) = get(ENV_STATIC_DIR) {
        config.server.static_dir = PathBuf::from(value);
    }
    if let Some(value) = get(ENV_CONTEXT_WINDOW) {
        config.context_window_pairs = value.trim().parse().map_err(|_| {
            RegchatError::config(format!("{ENV_CONTEXT_WINDOW} is not a number: {value}"))
        })?;
    }

    Ok(config)
}
