//! Error types used throughout the adapter

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the practice-management adapter.
///
/// Every variant that originates downstream carries the remote message
/// verbatim; schema-translation failures are only diagnosable from that text.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum BridgeError {
    /// Rejected before any network call (missing credential, identifier, bad date).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Connection failure, timeout or 5xx. Safe for the caller to retry.
    #[error("Network error: {0}")]
    Network(String),

    /// Well-formed protocol fault document.
    #[error("Protocol fault [{code}]: {message}")]
    Fault { code: String, message: String },

    /// Success-shaped envelope whose payload flags an internal failure.
    #[error("Remote application error: {0}")]
    Application(String),

    /// Credentials rejected or the user lacks access to the practice.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Response body is not well-formed markup.
    #[error("Malformed response: {0}")]
    Parse(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BridgeError {
    /// Only transport failures are worth retrying by the caller.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// The downstream (or validation) message without the category prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::InvalidInput(msg)
            | Self::Config(msg)
            | Self::Network(msg)
            | Self::Application(msg)
            | Self::Auth(msg)
            | Self::Parse(msg)
            | Self::NotFound(msg)
            | Self::Internal(msg) => msg,
            Self::Fault { message, .. } => message,
        }
    }

    /// Rewrite the carried message, keeping the category (and fault code).
    pub fn map_message(self, f: impl FnOnce(&str) -> String) -> Self {
        match self {
            Self::InvalidInput(msg) => Self::InvalidInput(f(&msg)),
            Self::Config(msg) => Self::Config(f(&msg)),
            Self::Network(msg) => Self::Network(f(&msg)),
            Self::Application(msg) => Self::Application(f(&msg)),
            Self::Auth(msg) => Self::Auth(f(&msg)),
            Self::Parse(msg) => Self::Parse(f(&msg)),
            Self::NotFound(msg) => Self::NotFound(f(&msg)),
            Self::Internal(msg) => Self::Internal(f(&msg)),
            Self::Fault { code, message } => Self::Fault { code, message: f(&message) },
        }
    }

    /// Stable label suitable for structured log fields.
    pub fn label(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::Config(_) => "config",
            Self::Network(_) => "network",
            Self::Fault { .. } => "fault",
            Self::Application(_) => "application",
            Self::Auth(_) => "auth",
            Self::Parse(_) => "parse",
            Self::NotFound(_) => "not_found",
            Self::Internal(_) => "internal",
        }
    }
}

/// Result type alias for adapter operations
pub type Result<T> = std::result::Result<T, BridgeError>;
