//! Configuration module for SoulVault
//!
//! This module provides configuration management including:
//! - Storage directory resolution
//! - User settings persistence (KDF profile, enhancer)

pub mod paths;
pub mod settings;

pub use paths::VaultPaths;
pub use settings::{EnhancerSettings, Settings};
