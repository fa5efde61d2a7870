//! Client configuration model.
//!
//! Loaded from `config.toml` and overlaid by environment variables in the
//! infrastructure layer. Every field has a default so a missing file or a
//! partial one is valid.

use crate::conversation::DEFAULT_WINDOW_PAIRS;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the summarization API
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Origin the identity provider redirects back to
    #[serde(default = "default_sso_redirect_base_url")]
    pub sso_redirect_base_url: String,
    /// Message pairs kept in the backend's context
    #[serde(default = "default_context_window_pairs")]
    pub context_window_pairs: usize,
    #[serde(default)]
    pub identity: IdentityConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            sso_redirect_base_url: default_sso_redirect_base_url(),
            context_window_pairs: default_context_window_pairs(),
            identity: IdentityConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityConfig {
    #[serde(default = "default_issuer_url")]
    pub issuer_url: String,
    #[serde(default = "default_client_id")]
    pub client_id: String,
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            issuer_url: default_issuer_url(),
            client_id: default_client_id(),
            scopes: default_scopes(),
        }
    }
}

/// Settings of `regchat serve`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory holding `index.html` and the bundled assets
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            static_dir: default_static_dir(),
        }
    }
}

fn default_api_base_url() -> String {
    "http://localhost:7071/api".to_string()
}

fn default_sso_redirect_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_context_window_pairs() -> usize {
    DEFAULT_WINDOW_PAIRS
}

fn default_issuer_url() -> String {
    "https://milliman.okta.com".to_string()
}

fn default_client_id() -> String {
    "0oa1uj3zlj5hatOW91d8".to_string()
}

fn default_scopes() -> Vec<String> {
    ["openid", "profile", "email"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_port() -> u16 {
    3000
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("public")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: ClientConfig = toml::from_str("").unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.context_window_pairs, 7);
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.identity.scopes, vec!["openid", "profile", "email"]);
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let config: ClientConfig = toml::from_str(
            r#"
            api_base_url = "https://api.example.com"

            [server]
            port = 8080
            "#,
        )
        .unwrap();

        assert_eq!(config.api_base_url, "https://api.example.com");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.static_dir, PathBuf::from("public"));
        assert_eq!(config.identity.client_id, "0oa1uj3zlj5hatOW91d8");
    }
}
