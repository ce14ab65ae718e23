//! Credential store
//!
//! Persists every user's credential record in one envelope file encrypted
//! under the fixed system key. That key is derivable by anyone with the source
//! and only keeps the file from casual inspection; the real secrets are the
//! slow-hashed verifiers inside it.
//!
//! The whole file is read on open and before each authentication, and
//! rewritten on each registration.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::crypto::key_derivation::{self, SYSTEM_KEY_LABEL};
use crate::crypto::{open_json, seal_json, DerivedKey, KdfParams, Salt};
use crate::error::{VaultError, VaultResult};
use crate::models::{validate_password, validate_username, CredentialRecord};

use super::file_io::{read_sealed, write_sealed_atomic};

/// What a successful login hands back for unlocking the record store
#[derive(Debug, Clone)]
pub struct UnlockMaterial {
    /// Salt for `derive_record_key`
    pub encryption_salt: Salt,
    /// KDF profile the user registered with
    pub kdf: KdfParams,
}

/// Repository for credential persistence
pub struct CredentialStore {
    path: PathBuf,
    key: DerivedKey,
    default_kdf: KdfParams,
    users: BTreeMap<String, CredentialRecord>,
}

impl CredentialStore {
    /// Open the store at `path`, loading it if the file exists
    ///
    /// `default_kdf` is applied to new registrations only.
    pub fn open(path: PathBuf, default_kdf: KdfParams) -> VaultResult<Self> {
        let mut store = Self {
            path,
            key: key_derivation::derive_fixed_system_key(SYSTEM_KEY_LABEL),
            default_kdf,
            users: BTreeMap::new(),
        };
        store.load()?;
        Ok(store)
    }

    /// Reload the store from disk
    ///
    /// A missing file is an empty store. A file that fails to decrypt or parse
    /// is an error, and the in-memory map is left untouched.
    pub fn load(&mut self) -> VaultResult<()> {
        let users = match read_sealed(&self.path)? {
            Some(envelope) => open_json(&envelope, &self.key)?,
            None => BTreeMap::new(),
        };
        debug!(users = users.len(), path = %self.path.display(), "loaded credential store");
        self.users = users;
        Ok(())
    }

    fn persist(&self) -> VaultResult<()> {
        let envelope = seal_json(&self.users, &self.key)?;
        write_sealed_atomic(&self.path, &envelope)
    }

    /// Register a new user
    pub fn register(&mut self, username: &str, password: &str) -> VaultResult<()> {
        validate_username(username).map_err(|e| VaultError::Validation(e.to_string()))?;
        validate_password(password).map_err(|e| VaultError::Validation(e.to_string()))?;

        if self.users.contains_key(username) {
            return Err(VaultError::UsernameTaken(username.to_string()));
        }

        let password_salt = self.fresh_salt(&[]);
        let encryption_salt = self.fresh_salt(&[&password_salt]);

        let record = CredentialRecord {
            password_verifier: key_derivation::derive_verifier(
                password,
                &password_salt,
                &self.default_kdf,
            )?,
            password_salt,
            encryption_salt,
            created_at: Utc::now(),
            kdf: self.default_kdf,
        };

        self.users.insert(username.to_string(), record);

        if let Err(e) = self.persist() {
            self.users.remove(username);
            warn!(error = %e, "registration rolled back");
            return Err(e);
        }

        info!(username, "registered user");
        Ok(())
    }

    /// Draw a salt not equal to `also_avoid` or to any salt already stored
    fn fresh_salt(&self, also_avoid: &[&Salt]) -> Salt {
        loop {
            let salt = Salt::generate();
            let reused = also_avoid.iter().any(|s| **s == salt)
                || self
                    .users
                    .values()
                    .any(|r| r.password_salt == salt || r.encryption_salt == salt);
            if !reused {
                return salt;
            }
        }
    }

    /// Verify a username and password
    ///
    /// Unknown users and wrong passwords produce the same `InvalidCredentials`
    /// error, and both pay for one verifier derivation.
    pub fn authenticate(&mut self, username: &str, password: &str) -> VaultResult<UnlockMaterial> {
        self.load()?;

        let Some(record) = self.users.get(username) else {
            let _ = key_derivation::derive_verifier(
                password,
                &Salt::from_bytes([0u8; 32]),
                &self.dummy_kdf(),
            );
            warn!("authentication failed");
            return Err(VaultError::InvalidCredentials);
        };

        let valid = key_derivation::verify(
            password,
            &record.password_salt,
            &record.password_verifier,
            &record.kdf,
        )
        .unwrap_or(false);

        if !valid {
            warn!("authentication failed");
            return Err(VaultError::InvalidCredentials);
        }

        debug!(username, "authenticated");
        Ok(UnlockMaterial {
            encryption_salt: record.encryption_salt.clone(),
            kdf: record.kdf,
        })
    }

    /// Params for the decoy derivation run on unknown usernames
    ///
    /// Matches what a stored user costs, even after the configured default changes.
    fn dummy_kdf(&self) -> KdfParams {
        self.users
            .values()
            .next()
            .map(|record| record.kdf)
            .unwrap_or(self.default_kdf)
    }

    /// Whether a username is registered
    pub fn contains(&self, username: &str) -> bool {
        self.users.contains_key(username)
    }

    /// Registered usernames in sorted order
    pub fn usernames(&self) -> Vec<String> {
        self.users.keys().cloned().collect()
    }

    /// Look up a credential record
    pub fn get(&self, username: &str) -> Option<&CredentialRecord> {
        self.users.get(username)
    }

    /// Count registered users
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Check if no users are registered
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_store() -> (TempDir, CredentialStore) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("credentials.json");
        let store = CredentialStore::open(path, KdfParams::pbkdf2(1_000)).unwrap();
        (temp_dir, store)
    }

    #[test]
    fn test_absent_file_is_empty() {
        let (_temp_dir, store) = create_test_store();
        assert!(store.is_empty());
    }

    #[test]
    fn test_register_and_duplicate() {
        let (_temp_dir, mut store) = create_test_store();

        store.register("alice", "correcthorse1").unwrap();
        assert!(store.contains("alice"));

        let err = store.register("alice", "anotherpassword").unwrap_err();
        assert!(matches!(err, VaultError::UsernameTaken(ref u) if u == "alice"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_usernames_are_case_sensitive() {
        let (_temp_dir, mut store) = create_test_store();

        store.register("alice", "correcthorse1").unwrap();
        store.register("Alice", "correcthorse1").unwrap();
        assert_eq!(store.usernames(), vec!["Alice", "alice"]);
    }

    #[test]
    fn test_register_validation() {
        let (_temp_dir, mut store) = create_test_store();

        assert!(store.register("al", "correcthorse1").unwrap_err().is_validation());
        assert!(store.register("al ice", "correcthorse1").unwrap_err().is_validation());
        assert!(store.register("alice", "short").unwrap_err().is_validation());
        assert!(store.is_empty());
    }

    #[test]
    fn test_salts_are_distinct() {
        let (_temp_dir, mut store) = create_test_store();
        store.register("alice", "correcthorse1").unwrap();
        store.register("bob_1", "correcthorse1").unwrap();

        let alice = store.get("alice").unwrap();
        let bob = store.get("bob_1").unwrap();
        assert_ne!(alice.password_salt, alice.encryption_salt);
        assert_ne!(alice.password_salt, bob.password_salt);
        assert_ne!(alice.encryption_salt, bob.encryption_salt);
        assert_ne!(alice.password_verifier, bob.password_verifier);
    }

    #[test]
    fn test_authenticate() {
        let (_temp_dir, mut store) = create_test_store();
        store.register("alice", "correcthorse1").unwrap();

        let unlock = store.authenticate("alice", "correcthorse1").unwrap();
        assert_eq!(
            unlock.encryption_salt,
            store.get("alice").unwrap().encryption_salt
        );
        assert_eq!(unlock.kdf, KdfParams::pbkdf2(1_000));
    }

    #[test]
    fn test_wrong_password_and_unknown_user_look_the_same() {
        let (_temp_dir, mut store) = create_test_store();
        store.register("alice", "correcthorse1").unwrap();

        let wrong = store.authenticate("alice", "wrongpassword").unwrap_err();
        let unknown = store.authenticate("bob", "correcthorse1").unwrap_err();

        assert!(matches!(wrong, VaultError::InvalidCredentials));
        assert!(matches!(unknown, VaultError::InvalidCredentials));
        assert_eq!(wrong.to_string(), unknown.to_string());
    }

    #[test]
    fn test_persisted_and_reloaded() {
        let (temp_dir, mut store) = create_test_store();
        store.register("alice", "correcthorse1").unwrap();

        let path = temp_dir.path().join("credentials.json");
        let contents = fs::read_to_string(&path).unwrap();
        assert!(!contents.contains("alice"));
        assert!(contents.contains("authTag"));

        let mut reopened = CredentialStore::open(path, KdfParams::pbkdf2(1_000)).unwrap();
        assert!(reopened.contains("alice"));
        assert!(reopened.authenticate("alice", "correcthorse1").is_ok());
    }

    #[test]
    fn test_stored_kdf_survives_default_change() {
        let (temp_dir, mut store) = create_test_store();
        store.register("alice", "correcthorse1").unwrap();

        let path = temp_dir.path().join("credentials.json");
        let mut reopened = CredentialStore::open(path, KdfParams::pbkdf2(2_000)).unwrap();
        let unlock = reopened.authenticate("alice", "correcthorse1").unwrap();
        assert_eq!(unlock.kdf, KdfParams::pbkdf2(1_000));
    }

    #[test]
    fn test_unknown_user_costs_like_stored_users() {
        let (temp_dir, store) = create_test_store();
        assert_eq!(store.dummy_kdf(), KdfParams::pbkdf2(1_000));

        let mut store = store;
        store.register("alice", "correcthorse1").unwrap();

        let path = temp_dir.path().join("credentials.json");
        let mut reopened = CredentialStore::open(path, KdfParams::pbkdf2(2_000)).unwrap();
        assert_eq!(reopened.dummy_kdf(), KdfParams::pbkdf2(1_000));
        assert!(matches!(
            reopened.authenticate("bob", "correcthorse1"),
            Err(VaultError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_corrupt_store_fails_closed() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("credentials.json");

        fs::write(&path, r#"{"iv": "00", "authTag": "00", "data": "00"}"#).unwrap();
        assert!(matches!(
            CredentialStore::open(path.clone(), KdfParams::pbkdf2(1_000)),
            Err(VaultError::Decryption)
        ));

        fs::write(&path, "{}").unwrap();
        assert!(matches!(
            CredentialStore::open(path, KdfParams::pbkdf2(1_000)),
            Err(VaultError::CorruptStore(_))
        ));
    }

    #[test]
    fn test_tampered_store_fails_on_authenticate() {
        let (temp_dir, mut store) = create_test_store();
        store.register("alice", "correcthorse1").unwrap();

        let path = temp_dir.path().join("credentials.json");
        let mut json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        let data = json["data"].as_str().unwrap().to_string();
        let flipped = if data.starts_with('0') { "1" } else { "0" };
        json["data"] = serde_json::Value::String(format!("{}{}", flipped, &data[1..]));
        fs::write(&path, json.to_string()).unwrap();

        assert!(matches!(
            store.authenticate("alice", "correcthorse1"),
            Err(VaultError::Decryption)
        ));
        // in-memory state survives the failed reload
        assert!(store.contains("alice"));
    }

    #[test]
    fn test_failed_persist_rolls_back() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("credentials.json");
        let mut store = CredentialStore::open(path, KdfParams::pbkdf2(1_000)).unwrap();

        fs::create_dir(temp_dir.path().join("credentials.json.tmp")).unwrap();

        assert!(store.register("alice", "correcthorse1").is_err());
        assert!(!store.contains("alice"));
    }
}
