//! Error types for the regchat client.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse classification used by UI handlers to decide how an error surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// No token, or the token has expired. The user must log in again.
    AuthRequired,
    /// The request was rejected or answered with a non-2xx status.
    NetworkFailure,
    /// Data returned by the API contradicts other data the client holds.
    DataInconsistency,
    /// Anything else (local I/O, configuration, bugs).
    Local,
}

/// A shared error type for the entire regchat client.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum RegchatError {
    /// No usable identity token is available
    #[error("Authentication required: {0}")]
    AuthRequired(String),

    /// Remote request failed (transport error or non-success status)
    #[error("Network failure{}: {message}", .status.map(|s| format!(" (status {s})")).unwrap_or_default())]
    Network { status: Option<u16>, message: String },

    /// A conversation refers to a regulation that is no longer offered
    #[error("Regulation '{regulation}' referenced by conversation '{conversation_id}' is not available")]
    DataInconsistency {
        regulation: String,
        conversation_id: String,
    },

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RegchatError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates an AuthRequired error
    pub fn auth_required(message: impl Into<String>) -> Self {
        Self::AuthRequired(message.into())
    }

    /// Creates a Network error
    pub fn network(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Network {
            status,
            message: message.into(),
        }
    }

    /// Creates a DataInconsistency error
    pub fn data_inconsistency(
        regulation: impl Into<String>,
        conversation_id: impl Into<String>,
    ) -> Self {
        Self::DataInconsistency {
            regulation: regulation.into(),
            conversation_id: conversation_id.into(),
        }
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Classifies this error for presentation.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AuthRequired(_) => ErrorKind::AuthRequired,
            Self::Network { .. } => ErrorKind::NetworkFailure,
            Self::DataInconsistency { .. } => ErrorKind::DataInconsistency,
            _ => ErrorKind::Local,
        }
    }

    /// Check if this is an AuthRequired error
    pub fn is_auth_required(&self) -> bool {
        matches!(self, Self::AuthRequired(_))
    }

    /// Check if this is a Network error
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    /// Check if this is a DataInconsistency error
    pub fn is_data_inconsistency(&self) -> bool {
        matches!(self, Self::DataInconsistency { .. })
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for RegchatError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for RegchatError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for RegchatError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for RegchatError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// Conversion from anyhow::Error (used at the binary boundary)
impl From<anyhow::Error> for RegchatError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, RegchatError>`.
pub type Result<T> = std::result::Result<T, RegchatError>;
