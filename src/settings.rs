//! Matcher configuration and the preference store it reads category flags from.

use std::collections::HashMap;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Default LRU cache size
pub const DEFAULT_CACHE_SIZE: usize = 1024;

/// Read access to persisted boolean preferences.
///
/// Implemented by the application's settings layer; the matcher only reads
/// from it at construction and when told a key changed.
pub trait SettingsStore: Send + Sync {
    /// Current value of `key`, or `default` when it was never set
    fn get_boolean(&self, key: &str, default: bool) -> bool;
}

/// In-memory preference store.
#[derive(Debug, Default)]
pub struct MemorySettings {
    values: RwLock<HashMap<String, bool>>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_boolean(&self, key: impl Into<String>, value: bool) {
        self.values.write().insert(key.into(), value);
    }

    pub fn remove(&self, key: &str) {
        self.values.write().remove(key);
    }
}

impl SettingsStore for MemorySettings {
    fn get_boolean(&self, key: &str, default: bool) -> bool {
        self.values.read().get(key).copied().unwrap_or(default)
    }
}

/// Matcher options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// LRU capacity of the decision cache
    pub cache_size: usize,
    /// Never block a resource served from the page's own host
    pub allow_first_party: bool,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            cache_size: DEFAULT_CACHE_SIZE,
            allow_first_party: true,
        }
    }
}

impl MatcherConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON object; missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Set cache size.
    pub fn with_cache_size(mut self, size: usize) -> Self {
        self.cache_size = size;
        self
    }

    pub fn with_first_party_allowed(mut self, allow: bool) -> Self {
        self.allow_first_party = allow;
        self
    }
}
