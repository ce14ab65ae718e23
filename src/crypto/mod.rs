//! Cryptographic functions for SoulVault
//!
//! Provides PBKDF2/Argon2id key derivation, constant-time password
//! verification and AES-256-GCM envelopes for data at rest.

pub mod encryption;
pub mod key_derivation;
pub mod secure_memory;

pub use encryption::{decrypt, encrypt, open_json, seal_json, Envelope};
pub use key_derivation::{
    derive_fixed_system_key, derive_record_key, derive_verifier, verify, DerivedKey, KdfParams,
    Salt, Verifier,
};
pub use secure_memory::SecureString;
