//! SoulVault - password-protected oracle journal
//!
//! This library provides the core of SoulVault: a local, single-user-at-a-time
//! tool that derives keys from user credentials, keeps each user's souls in an
//! authenticated-encrypted record store, and computes deterministic readings
//! from (question, seed, sequence number).
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `crypto`: Key derivation and AES-256-GCM envelopes
//! - `models`: Core data models (credentials, souls, readings, stats)
//! - `storage`: Encrypted credential store and per-user record stores
//! - `oracle`: Deterministic reading generator
//! - `enhancer`: Optional external enhancement process
//! - `services`: Session and consultation flows
//! - `cli`, `display`, `export`: Command-line front end
//!
//! # Example
//!
//! ```rust,ignore
//! use soulvault::config::{Settings, VaultPaths};
//! use soulvault::services::{consult, Session};
//!
//! let paths = VaultPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let mut session = Session::unlock(&paths, settings.kdf, "alice", "correcthorse1")?;
//! let event = consult(&mut session, "Self", "What now?", None, false).await?;
//! ```

pub mod cli;
pub mod config;
pub mod crypto;
pub mod display;
pub mod enhancer;
pub mod error;
pub mod export;
pub mod models;
pub mod oracle;
pub mod services;
pub mod storage;

pub use error::{VaultError, VaultResult};
