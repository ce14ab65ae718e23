//! AES-256-GCM envelope encryption
//!
//! Provides authenticated encryption for data at rest. Each encryption draws a
//! fresh 16-byte IV, and the 16-byte tag is kept apart from the ciphertext so
//! the on-disk envelope reads `{version, iv, authTag, data}`.

use aes_gcm::aead::consts::U16;
use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::{AeadInPlace, KeyInit, OsRng};
use aes_gcm::aes::Aes256;
use aes_gcm::{AesGcm, Nonce, Tag};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::error::{VaultError, VaultResult};

use super::key_derivation::KEY_SIZE;
use super::DerivedKey;

/// AES-256-GCM with a 128-bit nonce
type Aes256Gcm16 = AesGcm<Aes256, U16>;

/// Size of the IV in bytes
pub const IV_SIZE: usize = 16;

/// Size of the authentication tag in bytes
pub const TAG_SIZE: usize = 16;

/// Current envelope format version
pub const ENVELOPE_VERSION: u8 = 1;

/// Self-contained, tamper-evident ciphertext bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// Version for future algorithm upgrades
    #[serde(default = "default_version")]
    pub version: u8,
    /// Random IV used for this encryption
    #[serde(with = "hex::serde")]
    pub iv: Vec<u8>,
    /// GCM authentication tag
    #[serde(with = "hex::serde")]
    pub auth_tag: Vec<u8>,
    /// Ciphertext without the tag
    #[serde(rename = "data", with = "hex::serde")]
    pub ciphertext: Vec<u8>,
}

fn default_version() -> u8 {
    ENVELOPE_VERSION
}

fn cipher_for(key: &DerivedKey) -> VaultResult<Aes256Gcm16> {
    Aes256Gcm16::new_from_slice(key.as_bytes()).map_err(|_| VaultError::InvalidKey {
        expected: KEY_SIZE,
        actual: key.as_bytes().len(),
    })
}

/// Encrypt plaintext bytes under `key`
pub fn encrypt(plaintext: &[u8], key: &DerivedKey) -> VaultResult<Envelope> {
    let cipher = cipher_for(key)?;

    let mut iv = [0u8; IV_SIZE];
    OsRng.fill_bytes(&mut iv);

    let mut buffer = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(Nonce::<U16>::from_slice(&iv), b"", &mut buffer)
        .map_err(|_| VaultError::InvalidInput("plaintext too large to encrypt".into()))?;

    Ok(Envelope {
        version: ENVELOPE_VERSION,
        iv: iv.to_vec(),
        auth_tag: tag.to_vec(),
        ciphertext: buffer,
    })
}

/// Decrypt an envelope, verifying the tag before any plaintext is released
pub fn decrypt(envelope: &Envelope, key: &DerivedKey) -> VaultResult<Vec<u8>> {
    if envelope.version != ENVELOPE_VERSION {
        return Err(VaultError::Decryption);
    }
    if envelope.iv.len() != IV_SIZE || envelope.auth_tag.len() != TAG_SIZE {
        return Err(VaultError::Decryption);
    }

    let cipher = cipher_for(key)?;
    let mut buffer = envelope.ciphertext.clone();

    let result = cipher.decrypt_in_place_detached(
        Nonce::<U16>::from_slice(&envelope.iv),
        b"",
        &mut buffer,
        Tag::from_slice(&envelope.auth_tag),
    );

    match result {
        Ok(()) => Ok(buffer),
        Err(_) => {
            buffer.zeroize();
            Err(VaultError::Decryption)
        }
    }
}

/// Serialize a value to JSON and encrypt it
pub fn seal_json<T: Serialize>(value: &T, key: &DerivedKey) -> VaultResult<Envelope> {
    let mut plaintext = serde_json::to_vec(value)?;
    let envelope = encrypt(&plaintext, key);
    plaintext.zeroize();
    envelope
}

/// Decrypt an envelope and parse its JSON payload
///
/// A payload that decrypts but does not parse is reported as a corrupt store,
/// never as an empty one.
pub fn open_json<T: DeserializeOwned>(envelope: &Envelope, key: &DerivedKey) -> VaultResult<T> {
    let mut plaintext = decrypt(envelope, key)?;
    let parsed = serde_json::from_slice(&plaintext)
        .map_err(|e| VaultError::CorruptStore(format!("Invalid decrypted payload: {}", e)));
    plaintext.zeroize();
    parsed
}
