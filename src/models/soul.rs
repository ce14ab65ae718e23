//! Soul and event models
//!
//! A soul owns an immutable random seed and an append-only log of events.
//! Sequence numbers are 1-based and assigned as `events.len() + 1`.

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::OsRng;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use super::reading::Reading;

/// Size of a soul seed in bytes
pub const SEED_SIZE: usize = 32;

/// Maximum soul name length
pub const SOUL_NAME_MAX_LEN: usize = 50;

/// A soul's 32-byte random seed
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Seed(#[serde(with = "hex::serde")] [u8; SEED_SIZE]);

impl Seed {
    /// Draw a fresh seed from the OS RNG
    pub fn generate() -> Self {
        let mut bytes = [0u8; SEED_SIZE];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Wrap existing seed bytes
    pub fn from_bytes(bytes: [u8; SEED_SIZE]) -> Self {
        Self(bytes)
    }

    /// Get the seed bytes
    pub fn as_bytes(&self) -> &[u8; SEED_SIZE] {
        &self.0
    }

    /// Lowercase hex text, as fed to the oracle hash
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// First 8 hex chars; the only part of a seed ever shared with the enhancer
    pub fn partial(&self) -> String {
        self.to_hex()[..8].to_string()
    }

    /// First 8 hex chars of SHA-256 over the seed's hex text
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.to_hex().as_bytes());
        hex::encode(&digest[..4])
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Seed({}..)", self.partial())
    }
}

/// One consultation in a soul's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// 1-based, strictly increasing per soul
    pub sequence_number: u32,
    /// The question asked
    pub input: String,
    pub timestamp: DateTime<Utc>,
    pub reading: Reading,
}

/// A named record in a user's registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Soul {
    /// Unique within the owning registry
    pub name: String,

    /// Immutable for the soul's lifetime
    pub seed: Seed,

    /// When the soul was created
    pub created_at: DateTime<Utc>,

    /// When the latest event was appended
    pub last_event_at: Option<DateTime<Utc>>,

    /// Append-only event log
    #[serde(default)]
    pub events: Vec<Event>,
}

impl Soul {
    /// Create a new soul with a fresh seed and no events
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_seed(name, Seed::generate())
    }

    /// Create a soul with a known seed
    pub fn with_seed(name: impl Into<String>, seed: Seed) -> Self {
        Self {
            name: name.into(),
            seed,
            created_at: Utc::now(),
            last_event_at: None,
            events: Vec::new(),
        }
    }

    /// Sequence number the next event will receive
    pub fn next_sequence_number(&self) -> u32 {
        self.events.len() as u32 + 1
    }

    /// Number of recorded events
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// The most recent event, if any
    pub fn latest_event(&self) -> Option<&Event> {
        self.events.last()
    }

    /// Validate a soul name
    pub fn validate_name(name: &str) -> Result<(), SoulValidationError> {
        if name.trim().is_empty() {
            return Err(SoulValidationError::EmptyName);
        }

        let len = name.chars().count();
        if len > SOUL_NAME_MAX_LEN {
            return Err(SoulValidationError::NameTooLong(len));
        }

        Ok(())
    }
}

/// Validation errors for souls
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SoulValidationError {
    EmptyName,
    NameTooLong(usize),
}

impl fmt::Display for SoulValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Soul name cannot be empty"),
            Self::NameTooLong(len) => {
                write!(
                    f,
                    "Soul name too long ({} chars, max {})",
                    len, SOUL_NAME_MAX_LEN
                )
            }
        }
    }
}

impl std::error::Error for SoulValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_soul() {
        let soul = Soul::new("Self");
        assert_eq!(soul.name, "Self");
        assert!(soul.events.is_empty());
        assert!(soul.last_event_at.is_none());
        assert_eq!(soul.next_sequence_number(), 1);
    }

    #[test]
    fn test_seeds_are_random() {
        assert_ne!(Seed::generate(), Seed::generate());
    }

    #[test]
    fn test_seed_hex_forms() {
        let seed = Seed::from_bytes([0u8; SEED_SIZE]);
        assert_eq!(seed.to_hex(), "0".repeat(64));
        assert_eq!(seed.partial(), "00000000");
        assert_eq!(seed.fingerprint(), "60e05bd1");
    }

    #[test]
    fn test_validate_name() {
        assert!(Soul::validate_name("Self").is_ok());
        assert!(Soul::validate_name(&"x".repeat(50)).is_ok());
        assert_eq!(
            Soul::validate_name("   "),
            Err(SoulValidationError::EmptyName)
        );
        assert_eq!(
            Soul::validate_name(&"x".repeat(51)),
            Err(SoulValidationError::NameTooLong(51))
        );
    }

    #[test]
    fn test_serialized_shape() {
        let soul = Soul::with_seed("Self", Seed::from_bytes([1u8; SEED_SIZE]));
        let json = serde_json::to_value(&soul).unwrap();
        assert_eq!(json["name"], "Self");
        assert_eq!(json["seed"], "01".repeat(32));
        assert!(json["lastEventAt"].is_null());
        assert!(json["events"].as_array().unwrap().is_empty());
        assert!(json.get("createdAt").is_some());
    }
}
