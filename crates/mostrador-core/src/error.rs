//! Error types for the Mostrador application.

use thiserror::Error;

/// A shared error type for the entire Mostrador application.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait.
#[derive(Error, Debug, Clone)]
pub enum MostradorError {
    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Catalog could not be loaded or queried
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", "CSV"
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A tool received arguments it cannot work with
    #[error("Invalid arguments for '{tool}': {message}")]
    InvalidArguments { tool: String, message: String },

    /// Language model backend error
    #[error("Model error: {0}")]
    Model(String),

    /// Prompt rendering error
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MostradorError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

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

    /// Creates a Catalog error
    pub fn catalog(message: impl Into<String>) -> Self {
        Self::Catalog(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an InvalidArguments error
    pub fn invalid_arguments(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArguments {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Creates a Model error
    pub fn model(message: impl Into<String>) -> Self {
        Self::Model(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is an IO error
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    /// Check if this is a config error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Check if this error came from the model backend
    pub fn is_model(&self) -> bool {
        matches!(self, Self::Model(_))
    }

    /// Check if this error means the catalog file is absent.
    ///
    /// Returns true for `NotFound` errors and for `Io` errors whose message
    /// mentions a missing file.
    pub fn is_not_found_or_missing(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Io { message } => {
                let lower = message.to_lowercase();
                lower.contains("not found") || lower.contains("no such file")
            }
            _ => false,
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for MostradorError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for MostradorError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for MostradorError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<csv::Error> for MostradorError {
    fn from(err: csv::Error) -> Self {
        if let csv::ErrorKind::Io(io_err) = err.kind() {
            return Self::Io {
                message: format!("{} (kind: {:?})", io_err, io_err.kind()),
            };
        }
        Self::Serialization {
            format: "CSV".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<crate::model::AgentError> for MostradorError {
    fn from(err: crate::model::AgentError) -> Self {
        Self::Model(err.to_string())
    }
}

/// Conversion from String (for error messages)
impl From<String> for MostradorError {
    fn from(err: String) -> Self {
        Self::Internal(err)
    }
}

/// A type alias for `Result<T, MostradorError>`.
pub type Result<T> = std::result::Result<T, MostradorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_io_error_is_detected() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "No such file or directory");
        let err: MostradorError = io.into();
        assert!(err.is_io());
        assert!(err.is_not_found_or_missing());
    }

    #[test]
    fn test_config_error_is_not_missing() {
        let err = MostradorError::config("bad detection mode");
        assert!(err.is_config());
        assert!(!err.is_not_found_or_missing());
        assert_eq!(err.to_string(), "Configuration error: bad detection mode");
    }
}
