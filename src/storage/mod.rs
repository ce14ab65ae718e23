//! Storage layer for SoulVault
//!
//! Provides the encrypted credential store and the per-user record stores,
//! both written as whole-file JSON envelopes with atomic replacement.

pub mod credentials;
pub mod file_io;
pub mod records;

pub use credentials::{CredentialStore, UnlockMaterial};
pub use file_io::{read_sealed, write_json_atomic, write_sealed_atomic};
pub use records::RecordStore;
