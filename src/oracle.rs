//! Deterministic reading generation
//!
//! `generate_reading` hashes `input ‖ hex(seed) ‖ decimal(sequence_number)` with
//! SHA-256 and reads the result as:
//!
//! - bytes 0..4: four bounded fields, each `(byte % 100) + 1`
//! - bytes 4..8: big-endian u32, `% 16` selects the pattern
//! - bytes 8..12: big-endian u32, `% 16` selects the message
//!
//! The function is pure. Any enhancement is attached later by the caller.

use sha2::{Digest, Sha256};

use crate::models::{Message, Pattern, Reading, Seed};

/// Raw digest for an oracle query
pub fn reading_digest(input: &str, seed: &Seed, sequence_number: u32) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hasher.update(seed.to_hex().as_bytes());
    hasher.update(sequence_number.to_string().as_bytes());
    hasher.finalize().into()
}

fn bounded(byte: u8) -> u8 {
    byte % 100 + 1
}

fn word(digest: &[u8; 32], start: usize) -> u32 {
    u32::from_be_bytes([
        digest[start],
        digest[start + 1],
        digest[start + 2],
        digest[start + 3],
    ])
}

/// Compute the reading for (input, seed, sequence number)
pub fn generate_reading(input: &str, seed: &Seed, sequence_number: u32) -> Reading {
    let digest = reading_digest(input, seed, sequence_number);

    Reading {
        resonance: bounded(digest[0]),
        clarity: bounded(digest[1]),
        flux: bounded(digest[2]),
        emergence: bounded(digest[3]),
        pattern: Pattern::from_index(word(&digest, 4)),
        message: Message::from_index(word(&digest, 8)),
        enhancement: None,
    }
}
