//! Credential record model
//!
//! One record per registered user. The password salt and the encryption salt
//! come from independent random draws; only the verifier is stored, never the
//! password.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::crypto::{KdfParams, Salt, Verifier};

/// Minimum username length
pub const USERNAME_MIN_LEN: usize = 3;

/// Maximum username length
pub const USERNAME_MAX_LEN: usize = 20;

/// Minimum password length accepted at registration
pub const PASSWORD_MIN_LEN: usize = 8;

/// A stored credential
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialRecord {
    /// Salt for the password verifier
    pub password_salt: Salt,

    /// Slow hash of (password, password_salt)
    pub password_verifier: Verifier,

    /// Salt for the record-encryption key
    pub encryption_salt: Salt,

    /// When the user registered
    pub created_at: DateTime<Utc>,

    /// KDF parameters the verifier and record key were derived with
    #[serde(default)]
    pub kdf: KdfParams,
}

/// Check username shape: 3-20 chars of `[A-Za-z0-9_-]`
pub fn validate_username(username: &str) -> Result<(), CredentialValidationError> {
    let len = username.chars().count();
    if len < USERNAME_MIN_LEN {
        return Err(CredentialValidationError::TooShort(len));
    }
    if len > USERNAME_MAX_LEN {
        return Err(CredentialValidationError::TooLong(len));
    }
    if let Some(c) = username
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
    {
        return Err(CredentialValidationError::InvalidCharacter(c));
    }
    Ok(())
}

/// Check a new password's length
pub fn validate_password(password: &str) -> Result<(), CredentialValidationError> {
    if password.chars().count() < PASSWORD_MIN_LEN {
        return Err(CredentialValidationError::PasswordTooShort);
    }
    Ok(())
}

/// Validation errors for registration input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialValidationError {
    TooShort(usize),
    TooLong(usize),
    InvalidCharacter(char),
    PasswordTooShort,
}

impl fmt::Display for CredentialValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort(len) => write!(
                f,
                "Username too short ({} chars, min {})",
                len, USERNAME_MIN_LEN
            ),
            Self::TooLong(len) => write!(
                f,
                "Username too long ({} chars, max {})",
                len, USERNAME_MAX_LEN
            ),
            Self::InvalidCharacter(c) => write!(
                f,
                "Username contains '{}'; only letters, digits, '_' and '-' are allowed",
                c
            ),
            Self::PasswordTooShort => write!(
                f,
                "Password must be at least {} characters",
                PASSWORD_MIN_LEN
            ),
        }
    }
}

impl std::error::Error for CredentialValidationError {}
