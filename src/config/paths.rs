//! Path management for SoulVault
//!
//! Resolves the storage directory once at startup.
//!
//! ## Path Resolution Order
//!
//! 1. `SOULVAULT_DATA_DIR` environment variable (if set)
//! 2. The platform config directory from `directories`
//!    (`~/.config/soulvault` on Linux, `~/Library/Application Support/soulvault` on macOS,
//!    `%APPDATA%\soulvault\config` on Windows)

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::VaultError;

/// Environment variable overriding the base directory
pub const DATA_DIR_ENV: &str = "SOULVAULT_DATA_DIR";

/// Manages all paths used by SoulVault
#[derive(Debug, Clone)]
pub struct VaultPaths {
    /// Base directory for all SoulVault data
    base_dir: PathBuf,
}

impl VaultPaths {
    /// Create a new VaultPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn new() -> Result<Self, VaultError> {
        let base_dir = match std::env::var_os(DATA_DIR_ENV) {
            Some(custom) => PathBuf::from(custom),
            None => ProjectDirs::from("", "", "soulvault")
                .map(|dirs| dirs.config_dir().to_path_buf())
                .ok_or_else(|| {
                    VaultError::Config("Could not determine a home directory".into())
                })?,
        };

        Ok(Self { base_dir })
    }

    /// Create VaultPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the data directory (<base>/data/)
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Get the directory holding one record store per user
    pub fn souls_dir(&self) -> PathBuf {
        self.data_dir().join("souls")
    }

    /// Get the default export directory
    pub fn export_dir(&self) -> PathBuf {
        self.base_dir.join("exports")
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the path to the credential store
    pub fn credentials_file(&self) -> PathBuf {
        self.data_dir().join("credentials.json")
    }

    /// Get the path to a user's record store
    ///
    /// Usernames are restricted to `[A-Za-z0-9_-]`, so they are safe as file names.
    pub fn record_file(&self, username: &str) -> PathBuf {
        self.souls_dir().join(format!("{}.json", username))
    }

    /// Ensure all required directories exist
    pub fn ensure_directories(&self) -> Result<(), VaultError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| VaultError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.souls_dir())
            .map_err(|e| VaultError::Io(format!("Failed to create data directory: {}", e)))?;

        Ok(())
    }
}
