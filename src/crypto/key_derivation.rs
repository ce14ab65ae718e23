//! Key derivation for credentials and record keys
//!
//! Turns a password and a salt into either a storable verifier (64 bytes) or a
//! 32-byte AES-256 key. Both go through the same slow, salted primitive:
//! PBKDF2-HMAC-SHA512 by default, Argon2id when configured.
//!
//! The fixed system key is different in kind: it is a plain SHA-256 of a
//! constant label and protects nothing from anyone who has read this file. It
//! only keeps the credential store from being readable with a text editor.

use std::fmt;

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::OsRng;
use argon2::{Algorithm, Argon2, Params, Version};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha512};
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{VaultError, VaultResult};

/// Size of an AES-256 key in bytes
pub const KEY_SIZE: usize = 32;

/// Size of every random salt in bytes
pub const SALT_SIZE: usize = 32;

/// Size of a password verifier in bytes
pub const VERIFIER_SIZE: usize = 64;

/// Default PBKDF2 iteration count
pub const DEFAULT_ITERATIONS: u32 = 100_000;

/// Label hashed into the credential-store key
pub const SYSTEM_KEY_LABEL: &str = "soulvault/credential-store/v1";

/// Parameters for the slow key-derivation function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "algorithm", rename_all = "kebab-case")]
pub enum KdfParams {
    /// PBKDF2 with HMAC-SHA512
    #[serde(rename_all = "camelCase")]
    Pbkdf2Sha512 { iterations: u32 },

    /// Argon2id v0x13
    #[serde(rename_all = "camelCase")]
    Argon2id {
        /// Memory cost in KiB
        memory_cost: u32,
        /// Time cost (passes)
        time_cost: u32,
        /// Parallelism degree
        parallelism: u32,
    },
}

impl Default for KdfParams {
    fn default() -> Self {
        Self::Pbkdf2Sha512 {
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

impl KdfParams {
    /// PBKDF2-HMAC-SHA512 with a specific iteration count
    pub fn pbkdf2(iterations: u32) -> Self {
        Self::Pbkdf2Sha512 { iterations }
    }

    /// Argon2id with the 64 MiB / 3 passes / 4 lanes profile
    pub fn argon2id() -> Self {
        Self::Argon2id {
            memory_cost: 65536,
            time_cost: 3,
            parallelism: 4,
        }
    }

    /// Human-readable algorithm name
    pub fn algorithm_name(&self) -> &'static str {
        match self {
            Self::Pbkdf2Sha512 { .. } => "PBKDF2-HMAC-SHA512",
            Self::Argon2id { .. } => "Argon2id",
        }
    }
}

/// A 32-byte random salt
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Salt(#[serde(with = "hex::serde")] [u8; SALT_SIZE]);

impl Salt {
    /// Draw a fresh salt from the OS RNG
    pub fn generate() -> Self {
        let mut bytes = [0u8; SALT_SIZE];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Wrap existing salt bytes
    pub fn from_bytes(bytes: [u8; SALT_SIZE]) -> Self {
        Self(bytes)
    }

    /// Get the salt bytes
    pub fn as_bytes(&self) -> &[u8; SALT_SIZE] {
        &self.0
    }
}

impl fmt::Debug for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Salt({}..)", hex::encode(&self.0[..4]))
    }
}

/// Stored slow-hash output used to check a password
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Verifier(#[serde(with = "hex::serde")] Vec<u8>);

impl Verifier {
    /// Get the verifier bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Verifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Verifier").field("len", &self.0.len()).finish()
    }
}

/// A derived encryption key, zeroed on drop
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey {
    key: [u8; KEY_SIZE],
}

impl DerivedKey {
    /// Build a key from raw bytes; anything but exactly 32 bytes is rejected
    pub fn from_slice(bytes: &[u8]) -> VaultResult<Self> {
        if bytes.len() != KEY_SIZE {
            return Err(VaultError::InvalidKey {
                expected: KEY_SIZE,
                actual: bytes.len(),
            });
        }
        let mut key = [0u8; KEY_SIZE];
        key.copy_from_slice(bytes);
        Ok(Self { key })
    }

    /// Get the key bytes
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.key
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DerivedKey([REDACTED])")
    }
}

/// Run the configured KDF, filling `out` completely
fn derive_into(
    password: &str,
    salt: &[u8],
    params: &KdfParams,
    out: &mut [u8],
) -> VaultResult<()> {
    if password.is_empty() {
        return Err(VaultError::InvalidInput("password must not be empty".into()));
    }
    if salt.is_empty() {
        return Err(VaultError::InvalidInput("salt must not be empty".into()));
    }

    match *params {
        KdfParams::Pbkdf2Sha512 { iterations } => {
            if iterations == 0 {
                return Err(VaultError::InvalidInput(
                    "iteration count must be positive".into(),
                ));
            }
            pbkdf2::pbkdf2_hmac::<Sha512>(password.as_bytes(), salt, iterations, out);
        }
        KdfParams::Argon2id {
            memory_cost,
            time_cost,
            parallelism,
        } => {
            let argon2_params = Params::new(memory_cost, time_cost, parallelism, Some(out.len()))
                .map_err(|e| VaultError::InvalidInput(format!("Invalid Argon2 parameters: {}", e)))?;

            Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params)
                .hash_password_into(password.as_bytes(), salt, out)
                .map_err(|e| VaultError::InvalidInput(format!("Key derivation failed: {}", e)))?;
        }
    }

    Ok(())
}

/// Derive the storable password verifier
pub fn derive_verifier(password: &str, salt: &Salt, params: &KdfParams) -> VaultResult<Verifier> {
    let mut out = vec![0u8; VERIFIER_SIZE];
    derive_into(password, salt.as_bytes(), params, &mut out)?;
    Ok(Verifier(out))
}

/// Derive the key that encrypts a user's record store
///
/// Must be called with the user's encryption salt, never the password salt.
pub fn derive_record_key(password: &str, salt: &Salt, params: &KdfParams) -> VaultResult<DerivedKey> {
    let mut key = [0u8; KEY_SIZE];
    derive_into(password, salt.as_bytes(), params, &mut key)?;
    let derived = DerivedKey { key };
    key.zeroize();
    Ok(derived)
}

/// Deterministic, non-secret key for the credential-store envelope
///
/// Anyone with the source can recompute this. It obscures casual access only.
pub fn derive_fixed_system_key(label: &str) -> DerivedKey {
    let digest = Sha256::digest(label.as_bytes());
    let mut key = [0u8; KEY_SIZE];
    key.copy_from_slice(&digest);
    DerivedKey { key }
}

/// Check a password against a stored verifier in constant time
pub fn verify(
    password: &str,
    salt: &Salt,
    expected: &Verifier,
    params: &KdfParams,
) -> VaultResult<bool> {
    let candidate = derive_verifier(password, salt, params)?;
    Ok(constant_time_eq(candidate.as_bytes(), expected.as_bytes()))
}

/// Byte comparison that does not stop at the first difference
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}
