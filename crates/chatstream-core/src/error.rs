//! Error types for the chatstream crates.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the event pipeline.
///
/// Migration "no path" results are not errors on the lenient path; these
/// variants only surface through the strict APIs and the ingestion layer.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum ChatstreamError {
    /// An event type string that is not part of the known set
    #[error("Unknown event type: '{0}'")]
    UnknownEventType(String),

    /// No chain of registered migrations connects the two versions
    #[error("No migration path for {event_type}: {from} -> {to}")]
    NoMigrationPath {
        event_type: String,
        from: String,
        to: String,
    },

    /// A registered transform rejected its input
    #[error("Migration step {step} failed for {event_type} ({from} -> {to}): {message}")]
    TransformFailed {
        event_type: String,
        from: String,
        to: String,
        step: usize,
        message: String,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", "SSE"
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Cross-tab channel error
    #[error("Channel error: {0}")]
    Channel(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ChatstreamError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a NoMigrationPath error
    pub fn no_migration_path(
        event_type: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        Self::NoMigrationPath {
            event_type: event_type.into(),
            from: from.into(),
            to: to.into(),
        }
    }

    /// Creates a Serialization error
    pub fn serialization(format: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Serialization {
            format: format.into(),
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a Channel error
    pub fn channel(message: impl Into<String>) -> Self {
        Self::Channel(message.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a NoMigrationPath error
    pub fn is_no_migration_path(&self) -> bool {
        matches!(self, Self::NoMigrationPath { .. })
    }

    /// Check if this is a TransformFailed error
    pub fn is_transform_failed(&self) -> bool {
        matches!(self, Self::TransformFailed { .. })
    }

    /// Check if this is a serialization error
    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }

    /// Check if this is a config error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Check if this is a channel error
    pub fn is_channel(&self) -> bool {
        matches!(self, Self::Channel(_))
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for ChatstreamError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for ChatstreamError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for ChatstreamError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<anyhow::Error> for ChatstreamError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(format!("{:#}", err))
    }
}

/// A type alias for `Result<T, ChatstreamError>`.
pub type Result<T> = std::result::Result<T, ChatstreamError>;
