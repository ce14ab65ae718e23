//! Per-user soul registry
//!
//! Serialized as a plain JSON object keyed by soul name.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::soul::Soul;

/// Name-keyed collection of a user's souls
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Registry {
    souls: BTreeMap<String, Soul>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a soul by exact name
    pub fn get(&self, name: &str) -> Option<&Soul> {
        self.souls.get(name)
    }

    /// Look up a soul by exact name for mutation
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Soul> {
        self.souls.get_mut(name)
    }

    /// Whether a soul with this exact name exists
    pub fn contains(&self, name: &str) -> bool {
        self.souls.contains_key(name)
    }

    /// Insert a soul under its own name; callers check uniqueness first
    pub(crate) fn insert(&mut self, soul: Soul) {
        self.souls.insert(soul.name.clone(), soul);
    }

    /// Remove a soul by name
    pub(crate) fn remove(&mut self, name: &str) -> Option<Soul> {
        self.souls.remove(name)
    }

    /// Soul names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.souls.keys().map(String::as_str)
    }

    /// All souls in name order
    pub fn iter(&self) -> impl Iterator<Item = &Soul> {
        self.souls.values()
    }

    /// Number of souls
    pub fn len(&self) -> usize {
        self.souls.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.souls.is_empty()
    }
}
