//! Core data models for SoulVault
//!
//! This module contains the data structures persisted by the stores:
//! credential records, souls with their event logs, readings and the
//! statistics derived from them.

pub mod credential;
pub mod reading;
pub mod registry;
pub mod soul;
pub mod stats;

pub use credential::{validate_password, validate_username, CredentialRecord};
pub use reading::{Enhancement, Message, Pattern, Reading, Trend};
pub use registry::Registry;
pub use soul::{Event, Seed, Soul};
pub use stats::SoulStats;
