//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod account;
pub mod consult;
pub mod export;
pub mod soul;

pub use account::handle_register;
pub use consult::handle_consult;
pub use export::handle_export;
pub use soul::{handle_soul_command, SoulCommands};

use crate::config::{Settings, VaultPaths};
use crate::crypto::SecureString;
use crate::error::{VaultError, VaultResult};
use crate::services::Session;

/// Everything a command needs besides its own arguments
pub struct CliContext {
    pub paths: VaultPaths,
    pub settings: Settings,
    user: Option<String>,
    password: Option<SecureString>,
}

impl CliContext {
    pub fn new(
        paths: VaultPaths,
        settings: Settings,
        user: Option<String>,
        password: Option<String>,
    ) -> Self {
        Self {
            paths,
            settings,
            user,
            password: password.map(SecureString::new),
        }
    }

    /// The `--user` value, required by every command that opens a session
    pub fn require_user(&self) -> VaultResult<&str> {
        self.user.as_deref().ok_or_else(|| {
            VaultError::InvalidInput(
                "No user given. Pass --user or set SOULVAULT_USER".to_string(),
            )
        })
    }

    /// The `--password` value, or prompt for it
    pub fn password(&self, prompt: &str) -> VaultResult<SecureString> {
        match &self.password {
            Some(password) => Ok(SecureString::new(password.as_str())),
            None => prompt_password(prompt),
        }
    }

    /// Whether a password was supplied up front
    pub fn has_password(&self) -> bool {
        self.password.is_some()
    }

    /// Log in and open the user's registry
    pub fn unlock(&self) -> VaultResult<Session> {
        let username = self.require_user()?;
        let password = self.password("Password: ")?;
        Session::unlock(&self.paths, self.settings.kdf, username, &password)
    }
}

/// Prompt for a password (hidden input)
pub(crate) fn prompt_password(prompt: &str) -> VaultResult<SecureString> {
    rpassword::prompt_password(prompt)
        .map(SecureString::new)
        .map_err(|e| VaultError::Io(format!("Failed to read password: {}", e)))
}
