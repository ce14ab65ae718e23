//! User settings for SoulVault
//!
//! Holds the KDF profile used for new registrations and the external enhancer
//! configuration. Every field has a default, so a partial `config.json` works.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::paths::VaultPaths;
use crate::crypto::KdfParams;
use crate::error::VaultError;
use crate::storage::file_io::write_json_atomic;

/// External enhancer settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancerSettings {
    /// Whether the enhancer is consulted at all
    #[serde(default)]
    pub enabled: bool,

    /// Executable to run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<PathBuf>,

    /// Extra arguments passed to the executable
    #[serde(default)]
    pub args: Vec<String>,

    /// How long to wait before falling back to the plain reading
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    3000
}

impl Default for EnhancerSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            command: None,
            args: Vec::new(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// User settings for SoulVault
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// KDF profile applied to new registrations
    #[serde(default)]
    pub kdf: KdfParams,

    /// External enhancer
    #[serde(default)]
    pub enhancer: EnhancerSettings,
}

fn default_schema_version() -> u32 {
    1
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            kdf: KdfParams::default(),
            enhancer: EnhancerSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or use defaults if the file doesn't exist
    pub fn load_or_create(paths: &VaultPaths) -> Result<Self, VaultError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path)
                .map_err(|e| VaultError::Io(format!("Failed to read settings file: {}", e)))?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                VaultError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &VaultPaths) -> Result<(), VaultError> {
        paths.ensure_directories()?;
        write_json_atomic(paths.settings_file(), self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.kdf, KdfParams::pbkdf2(100_000));
        assert!(!settings.enhancer.enabled);
        assert_eq!(settings.enhancer.timeout_ms, 3000);
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = VaultPaths::with_base_dir(temp_dir.path().to_path_buf());

        let mut settings = Settings::default();
        settings.kdf = KdfParams::argon2id();
        settings.enhancer.enabled = true;
        settings.enhancer.command = Some(PathBuf::from("/usr/local/bin/enhance"));

        settings.save(&paths).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded.kdf, KdfParams::argon2id());
        assert_eq!(loaded.enhancer, settings.enhancer);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let paths = VaultPaths::with_base_dir(temp_dir.path().to_path_buf());
        std::fs::write(
            paths.settings_file(),
            r#"{"kdf": {"algorithm": "pbkdf2-sha512", "iterations": 1000}}"#,
        )
        .unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded.kdf, KdfParams::pbkdf2(1000));
        assert_eq!(loaded.enhancer.timeout_ms, 3000);
        assert_eq!(loaded.schema_version, 1);
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let paths = VaultPaths::with_base_dir(temp_dir.path().to_path_buf());
        std::fs::write(paths.settings_file(), "not json").unwrap();

        assert!(matches!(
            Settings::load_or_create(&paths),
            Err(VaultError::Config(_))
        ));
    }
}
