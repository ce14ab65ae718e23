//! Unlocked user session
//!
//! `Session::unlock` runs the login flow: authenticate against the credential
//! store, derive the record key from the password and the user's encryption
//! salt, then load the registry. The session owns the key and the decrypted
//! registry until it is dropped.

use tracing::{info, warn};

use crate::config::VaultPaths;
use crate::crypto::{derive_record_key, DerivedKey, KdfParams};
use crate::error::{VaultError, VaultResult};
use crate::models::{Event, Reading, Registry, Soul, SoulStats};
use crate::storage::{CredentialStore, RecordStore};

/// An authenticated user's open registry
pub struct Session {
    username: String,
    key: DerivedKey,
    store: RecordStore,
    registry: Registry,
}

impl Session {
    /// Authenticate and load the user's registry
    pub fn unlock(
        paths: &VaultPaths,
        default_kdf: KdfParams,
        username: &str,
        password: &str,
    ) -> VaultResult<Self> {
        let mut credentials = CredentialStore::open(paths.credentials_file(), default_kdf)?;
        let unlock = credentials.authenticate(username, password)?;

        let key = derive_record_key(password, &unlock.encryption_salt, &unlock.kdf)?;
        let store = RecordStore::new(paths.record_file(username));
        let registry = store.load(&key)?;

        info!(username, souls = registry.len(), "session unlocked");
        Ok(Self {
            username: username.to_string(),
            key,
            store,
            registry,
        })
    }

    /// The logged-in username
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The decrypted registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The record store backing this session
    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Look up a soul or fail with `NotFound`
    pub fn soul(&self, name: &str) -> VaultResult<&Soul> {
        self.registry
            .get(name)
            .ok_or_else(|| VaultError::soul_not_found(name))
    }

    /// Create and persist a soul
    ///
    /// If the save fails the soul is removed again, so memory keeps matching disk.
    pub fn create_soul(&mut self, name: &str) -> VaultResult<Soul> {
        let soul = self
            .store
            .create_entity(&mut self.registry, name)
            .map(Soul::clone)?;

        if let Err(e) = self.save() {
            self.registry.remove(name);
            warn!(error = %e, soul = name, "soul creation rolled back");
            return Err(e);
        }

        Ok(soul)
    }

    /// Append an event to a soul and persist it
    ///
    /// If the save fails the event is dropped and `last_event_at` restored.
    pub fn record_event(&mut self, name: &str, input: &str, reading: Reading) -> VaultResult<Event> {
        let soul = self
            .registry
            .get_mut(name)
            .ok_or_else(|| VaultError::soul_not_found(name))?;
        let previous_last_event = soul.last_event_at;
        let event = self.store.append_event(soul, input, reading);

        if let Err(e) = self.save() {
            if let Some(soul) = self.registry.get_mut(name) {
                soul.events.pop();
                soul.last_event_at = previous_last_event;
            }
            self.store.forget_stats(name);
            warn!(error = %e, soul = name, "event rolled back");
            return Err(e);
        }

        Ok(event)
    }

    /// Stats for one soul; `None` if it has no events yet
    pub fn stats(&self, name: &str) -> VaultResult<Option<SoulStats>> {
        let soul = self.soul(name)?;
        Ok(self.store.compute_stats(soul))
    }

    /// Persist the registry
    pub fn save(&self) -> VaultResult<()> {
        self.store.save(&self.registry, &self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::generate_reading;
    use tempfile::TempDir;

    fn setup() -> (TempDir, VaultPaths) {
        let temp_dir = TempDir::new().unwrap();
        let paths = VaultPaths::with_base_dir(temp_dir.path().to_path_buf());
        paths.ensure_directories().unwrap();
        let mut credentials =
            CredentialStore::open(paths.credentials_file(), KdfParams::pbkdf2(1_000)).unwrap();
        credentials.register("alice", "correcthorse1").unwrap();
        (temp_dir, paths)
    }

    #[test]
    fn test_unlock_fresh_user_has_empty_registry() {
        let (_temp_dir, paths) = setup();
        let session =
            Session::unlock(&paths, KdfParams::pbkdf2(1_000), "alice", "correcthorse1").unwrap();
        assert_eq!(session.username(), "alice");
        assert!(session.registry().is_empty());
    }

    #[test]
    fn test_unlock_rejects_bad_credentials() {
        let (_temp_dir, paths) = setup();
        assert!(matches!(
            Session::unlock(&paths, KdfParams::pbkdf2(1_000), "alice", "wrongpassword"),
            Err(VaultError::InvalidCredentials)
        ));
        assert!(matches!(
            Session::unlock(&paths, KdfParams::pbkdf2(1_000), "bob", "correcthorse1"),
            Err(VaultError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_changes_survive_relogin() {
        let (_temp_dir, paths) = setup();
        {
            let mut session =
                Session::unlock(&paths, KdfParams::pbkdf2(1_000), "alice", "correcthorse1")
                    .unwrap();
            let soul = session.create_soul("Self").unwrap();
            let reading = generate_reading("What now?", &soul.seed, 1);
            session.record_event("Self", "What now?", reading).unwrap();
        }

        let session =
            Session::unlock(&paths, KdfParams::pbkdf2(1_000), "alice", "correcthorse1").unwrap();
        let soul = session.soul("Self").unwrap();
        assert_eq!(soul.events.len(), 1);
        assert_eq!(session.stats("Self").unwrap().unwrap().total_events, 1);
    }

    #[test]
    fn test_users_are_isolated() {
        let (_temp_dir, paths) = setup();
        let mut credentials =
            CredentialStore::open(paths.credentials_file(), KdfParams::pbkdf2(1_000)).unwrap();
        credentials.register("carol", "anotherpass1").unwrap();

        let mut alice =
            Session::unlock(&paths, KdfParams::pbkdf2(1_000), "alice", "correcthorse1").unwrap();
        alice.create_soul("Self").unwrap();

        let carol =
            Session::unlock(&paths, KdfParams::pbkdf2(1_000), "carol", "anotherpass1").unwrap();
        assert!(carol.registry().is_empty());
        assert!(carol.soul("Self").unwrap_err().is_not_found());
    }

    fn block_saves(paths: &VaultPaths, username: &str) {
        let temp = paths.record_file(username).with_extension("json.tmp");
        std::fs::create_dir_all(temp).unwrap();
    }

    #[test]
    fn test_failed_save_rolls_back_new_soul() {
        let (_temp_dir, paths) = setup();
        let mut session =
            Session::unlock(&paths, KdfParams::pbkdf2(1_000), "alice", "correcthorse1").unwrap();
        block_saves(&paths, "alice");

        assert!(session.create_soul("Self").is_err());
        assert!(session.registry().is_empty());
        assert!(session.soul("Self").unwrap_err().is_not_found());
    }

    #[test]
    fn test_failed_save_rolls_back_event() {
        let (_temp_dir, paths) = setup();
        let mut session =
            Session::unlock(&paths, KdfParams::pbkdf2(1_000), "alice", "correcthorse1").unwrap();
        let soul = session.create_soul("Self").unwrap();
        let first = generate_reading("What now?", &soul.seed, 1);
        session.record_event("Self", "What now?", first).unwrap();
        let last_event_at = session.soul("Self").unwrap().last_event_at;
        assert_eq!(session.stats("Self").unwrap().unwrap().total_events, 1);

        block_saves(&paths, "alice");
        let second = generate_reading("What now?", &soul.seed, 2);
        assert!(matches!(
            session.record_event("Self", "What now?", second),
            Err(VaultError::Io(_))
        ));

        let soul = session.soul("Self").unwrap();
        assert_eq!(soul.events.len(), 1);
        assert_eq!(soul.last_event_at, last_event_at);
        assert_eq!(soul.next_sequence_number(), 2);
        assert_eq!(session.stats("Self").unwrap().unwrap().total_events, 1);
    }
}
