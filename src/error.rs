//! Custom error types for SoulVault
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions. Every cryptographic and persistence failure
//! is returned as a value; the CLI layer turns them into messages.

use thiserror::Error;

/// The main error type for SoulVault operations
#[derive(Error, Debug)]
pub enum VaultError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Bad shape, length or charset on user-supplied names
    #[error("Validation error: {0}")]
    Validation(String),

    /// Registration attempted for an existing username
    #[error("Username already taken: {0}")]
    UsernameTaken(String),

    /// Entity name already present in the user's registry
    #[error("A soul named '{0}' already exists")]
    DuplicateName(String),

    /// Unknown user or wrong password; deliberately indistinguishable
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Wrong key or corrupted envelope
    #[error("Decryption failed: wrong key or corrupted data")]
    Decryption,

    /// A store file exists but is not a structurally valid envelope
    #[error("Corrupt store: {0}")]
    CorruptStore(String),

    /// Key of the wrong size handed to the cipher
    #[error("Invalid key: expected {expected} bytes, got {actual}")]
    InvalidKey { expected: usize, actual: usize },

    /// Malformed input to key derivation
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),
}

impl VaultError {
    /// Create a "not found" error for souls
    pub fn soul_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Soul",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Errors the user can fix by re-entering input
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::UsernameTaken(_)
                | Self::DuplicateName(_)
                | Self::InvalidCredentials
        )
    }
}

impl From<std::io::Error> for VaultError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for VaultError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for SoulVault operations
pub type VaultResult<T> = Result<T, VaultError>;
