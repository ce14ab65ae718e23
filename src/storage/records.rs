//! Per-user record store
//!
//! Each user's soul registry lives in its own envelope file, encrypted under
//! a key derived from that user's password and encryption salt. A missing
//! file is a fresh user; a file that will not decrypt is an error, never an
//! empty registry.
//!
//! Mutations happen in memory. Callers decide when to `save`.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use chrono::Utc;
use tracing::debug;

use crate::crypto::{open_json, seal_json, DerivedKey};
use crate::error::{VaultError, VaultResult};
use crate::models::{Event, Reading, Registry, Soul, SoulStats};

use super::file_io::{read_sealed, write_sealed_atomic};

/// Cached stats plus the event count they were computed at
#[derive(Debug, Clone)]
struct CachedStats {
    event_count: usize,
    stats: SoulStats,
}

/// Repository for one user's souls
pub struct RecordStore {
    path: PathBuf,
    /// Side table: soul name -> stats at a known event count
    stats_cache: RwLock<HashMap<String, CachedStats>>,
}

impl RecordStore {
    /// Create a record store backed by `path`
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            stats_cache: RwLock::new(HashMap::new()),
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Load and decrypt the registry
    pub fn load(&self, key: &DerivedKey) -> VaultResult<Registry> {
        let registry = match read_sealed(&self.path)? {
            Some(envelope) => open_json(&envelope, key)?,
            None => Registry::new(),
        };
        debug!(souls = registry.len(), path = %self.path.display(), "loaded record store");
        Ok(registry)
    }

    /// Encrypt and write the whole registry
    pub fn save(&self, registry: &Registry, key: &DerivedKey) -> VaultResult<()> {
        let envelope = seal_json(registry, key)?;
        write_sealed_atomic(&self.path, &envelope)?;
        debug!(souls = registry.len(), path = %self.path.display(), "saved record store");
        Ok(())
    }

    /// Add a new soul with a fresh seed
    pub fn create_entity<'r>(&self, registry: &'r mut Registry, name: &str) -> VaultResult<&'r Soul> {
        Soul::validate_name(name).map_err(|e| VaultError::Validation(e.to_string()))?;

        if registry.contains(name) {
            return Err(VaultError::DuplicateName(name.to_string()));
        }

        registry.insert(Soul::new(name));
        registry
            .get(name)
            .ok_or_else(|| VaultError::soul_not_found(name))
    }

    /// Append an event with the next sequence number
    ///
    /// Does not persist; the caller must `save` afterwards.
    pub fn append_event(&self, soul: &mut Soul, input: &str, reading: Reading) -> Event {
        let now = Utc::now();
        let event = Event {
            sequence_number: soul.next_sequence_number(),
            input: input.to_string(),
            timestamp: now,
            reading,
        };
        soul.events.push(event.clone());
        soul.last_event_at = Some(now);
        event
    }

    /// Stats for a soul, served from the cache while its event count is unchanged
    pub fn compute_stats(&self, soul: &Soul) -> Option<SoulStats> {
        let event_count = soul.event_count();

        if let Ok(cache) = self.stats_cache.read() {
            if let Some(cached) = cache.get(&soul.name) {
                if cached.event_count == event_count {
                    return Some(cached.stats.clone());
                }
            }
        }

        let stats = SoulStats::compute(soul);

        if let Ok(mut cache) = self.stats_cache.write() {
            match &stats {
                Some(stats) => {
                    cache.insert(
                        soul.name.clone(),
                        CachedStats {
                            event_count,
                            stats: stats.clone(),
                        },
                    );
                }
                None => {
                    cache.remove(&soul.name);
                }
            }
        }

        stats
    }

    /// Drop any cached stats for a soul
    pub(crate) fn forget_stats(&self, name: &str) {
        if let Ok(mut cache) = self.stats_cache.write() {
            cache.remove(name);
        }
    }

    /// Number of souls with cached stats
    pub fn cached_stats_len(&self) -> usize {
        self.stats_cache.read().map(|c| c.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::generate_reading;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_store() -> (TempDir, RecordStore) {
        let temp_dir = TempDir::new().unwrap();
        let store = RecordStore::new(temp_dir.path().join("souls").join("alice.json"));
        (temp_dir, store)
    }

    fn key(byte: u8) -> DerivedKey {
        DerivedKey::from_slice(&[byte; 32]).unwrap()
    }

    #[test]
    fn test_missing_file_is_empty_registry() {
        let (_temp_dir, store) = create_test_store();
        assert!(store.load(&key(1)).unwrap().is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let (_temp_dir, store) = create_test_store();
        let mut registry = Registry::new();
        store.create_entity(&mut registry, "Self").unwrap();

        store.save(&registry, &key(1)).unwrap();
        let loaded = store.load(&key(1)).unwrap();
        assert_eq!(loaded, registry);
    }

    #[test]
    fn test_wrong_key_is_not_empty() {
        let (_temp_dir, store) = create_test_store();
        let mut registry = Registry::new();
        store.create_entity(&mut registry, "Self").unwrap();
        store.save(&registry, &key(1)).unwrap();

        assert!(matches!(store.load(&key(2)), Err(VaultError::Decryption)));
    }

    #[test]
    fn test_file_is_opaque() {
        let (_temp_dir, store) = create_test_store();
        let mut registry = Registry::new();
        store.create_entity(&mut registry, "VerySecretName").unwrap();
        store.save(&registry, &key(1)).unwrap();

        let contents = fs::read_to_string(store.path()).unwrap();
        assert!(!contents.contains("VerySecretName"));
    }

    #[test]
    fn test_create_entity_rules() {
        let (_temp_dir, store) = create_test_store();
        let mut registry = Registry::new();

        let soul = store.create_entity(&mut registry, "Self").unwrap();
        assert!(soul.events.is_empty());
        let seed = soul.seed.clone();

        assert!(matches!(
            store.create_entity(&mut registry, "Self"),
            Err(VaultError::DuplicateName(_))
        ));
        assert!(store.create_entity(&mut registry, "self").is_ok());
        assert!(store.create_entity(&mut registry, "").unwrap_err().is_validation());
        assert!(store
            .create_entity(&mut registry, &"x".repeat(51))
            .unwrap_err()
            .is_validation());

        // the duplicate attempt did not replace the original
        assert_eq!(registry.get("Self").unwrap().seed, seed);
    }

    #[test]
    fn test_sequence_monotonicity() {
        let (_temp_dir, store) = create_test_store();
        let mut soul = Soul::new("Self");

        for expected in 1..=25u32 {
            let reading = generate_reading("q", &soul.seed, soul.next_sequence_number());
            let event = store.append_event(&mut soul, "q", reading);
            assert_eq!(event.sequence_number, expected);
        }

        let numbers: Vec<u32> = soul.events.iter().map(|e| e.sequence_number).collect();
        assert_eq!(numbers, (1..=25).collect::<Vec<_>>());
        assert_eq!(soul.last_event_at, Some(soul.events[24].timestamp));
    }

    #[test]
    fn test_stats_cache_invalidated_on_new_event() {
        let (_temp_dir, store) = create_test_store();
        let mut soul = Soul::new("Self");

        assert!(store.compute_stats(&soul).is_none());
        assert_eq!(store.cached_stats_len(), 0);

        let reading = generate_reading("q", &soul.seed, 1);
        store.append_event(&mut soul, "q", reading);
        let first = store.compute_stats(&soul).unwrap();
        assert_eq!(first.total_events, 1);
        assert_eq!(store.cached_stats_len(), 1);

        // served from cache
        assert_eq!(store.compute_stats(&soul).unwrap(), first);

        let reading = generate_reading("q", &soul.seed, 2);
        store.append_event(&mut soul, "q", reading);
        let second = store.compute_stats(&soul).unwrap();
        assert_eq!(second.total_events, 2);
        assert_eq!(second, SoulStats::compute(&soul).unwrap());
    }
}
