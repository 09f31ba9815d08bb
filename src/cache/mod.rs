//! Query cache for dashboard reads.
//!
//! The surrounding order workflow reads item lists far more often than it
//! mutates them. Responses are cached under typed keys and invalidated by an
//! explicit rule set driven by mutation events (see [`invalidation`]), rather
//! than ad hoc per-call key juggling.

use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use thiserror::Error;
use uuid::Uuid;

use crate::models::ItemCategory;

pub mod invalidation;

pub use invalidation::CacheInvalidator;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Cache lock poisoned")]
    Poisoned,
}

/// Typed cache key for the query layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    AllItems,
    Category(ItemCategory),
    LowStock,
    Item(Uuid),
}

impl CacheKey {
    pub fn as_string(&self) -> String {
        match self {
            CacheKey::AllItems => "items:all".to_string(),
            CacheKey::Category(category) => format!("items:category:{}", category.as_str()),
            CacheKey::LowStock => "items:low_stock".to_string(),
            CacheKey::Item(id) => format!("items:id:{}", id),
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn new(value: String, ttl: Option<Duration>) -> Self {
        Self {
            value,
            expires_at: ttl.map(|d| Instant::now() + d),
        }
    }

    fn is_expired(&self) -> bool {
        if let Some(expires_at) = self.expires_at {
            Instant::now() > expires_at
        } else {
            false
        }
    }
}

/// In-memory TTL cache keyed by [`CacheKey`].
#[derive(Debug, Clone, Default)]
pub struct QueryCache {
    store: Arc<RwLock<HashMap<CacheKey, CacheEntry>>>,
    default_ttl: Option<Duration>,
}

impl QueryCache {
    pub fn new(default_ttl: Option<Duration>) -> Self {
        Self {
            store: Arc::new(RwLock::new(HashMap::new())),
            default_ttl,
        }
    }

    pub fn get(&self, key: &CacheKey) -> Result<Option<String>, CacheError> {
        let store = self.store.read().map_err(|_| CacheError::Poisoned)?;
        if let Some(entry) = store.get(key) {
            if entry.is_expired() {
                drop(store);
                let mut store = self.store.write().map_err(|_| CacheError::Poisoned)?;
                store.remove(key);
                Ok(None)
            } else {
                Ok(Some(entry.value.clone()))
            }
        } else {
            Ok(None)
        }
    }

    pub fn set(&self, key: CacheKey, value: String) -> Result<(), CacheError> {
        let mut store = self.store.write().map_err(|_| CacheError::Poisoned)?;
        store.insert(key, CacheEntry::new(value, self.default_ttl));
        Ok(())
    }

    pub fn delete(&self, key: &CacheKey) -> Result<(), CacheError> {
        let mut store = self.store.write().map_err(|_| CacheError::Poisoned)?;
        store.remove(key);
        Ok(())
    }

    pub fn clear(&self) -> Result<(), CacheError> {
        let mut store = self.store.write().map_err(|_| CacheError::Poisoned)?;
        store.clear();
        Ok(())
    }

    /// Fetch and decode a cached query result.
    pub fn get_json<T: DeserializeOwned>(&self, key: &CacheKey) -> Result<Option<T>, CacheError> {
        match self.get(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Encode and store a query result.
    pub fn set_json<T: Serialize>(&self, key: CacheKey, value: &T) -> Result<(), CacheError> {
        self.set(key, serde_json::to_string(value)?)
    }
}
