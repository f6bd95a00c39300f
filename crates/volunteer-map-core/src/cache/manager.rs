use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, de::IgnoredAny, Deserialize, Serialize};
use tracing::debug;

use crate::models::Event;
use crate::store::KeyValueStore;

/// Cache key for the event list snapshot
pub const EVENTS_KEY: &str = "events";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    pub fn age_minutes(&self) -> i64 {
        let now = Utc::now();
        (now - self.cached_at).num_minutes()
    }

    pub fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        if minutes < 1 {
            // Also covers clock skew
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            let hours = minutes / 60;
            let remaining_mins = minutes % 60;
            if remaining_mins >= 30 {
                format!("{}h ago", hours + 1)
            } else {
                format!("{}h ago", hours)
            }
        } else {
            let days = minutes / 1440;
            let remaining_hours = (minutes % 1440) / 60;
            if remaining_hours >= 12 {
                format!("{}d ago", days + 1)
            } else {
                format!("{}d ago", days)
            }
        }
    }
}

/// Snapshots of the last successful fetch per resource.
///
/// Entries are only written after a successful fetch and never expire;
/// `cached_at` is kept for display only.
#[derive(Clone)]
pub struct CacheManager {
    store: Arc<dyn KeyValueStore>,
}

impl CacheManager {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<CachedData<T>>> {
        let Some(contents) = self.store.get(key)? else {
            return Ok(None);
        };

        let cached: CachedData<T> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse cache entry: {}", key))?;

        Ok(Some(cached))
    }

    pub fn save<T: Serialize>(&self, key: &str, data: &T) -> Result<()> {
        let cached = CachedData::new(data);
        let contents = serde_json::to_string_pretty(&cached)
            .with_context(|| format!("Failed to serialize cache entry: {}", key))?;
        self.store.set(key, &contents)
    }

    // ===== Events =====

    pub fn load_events(&self) -> Result<Option<CachedData<Vec<Event>>>> {
        self.load(EVENTS_KEY)
    }

    pub fn save_events(&self, events: &[Event]) -> Result<()> {
        self.save(EVENTS_KEY, &events)
    }

    // ===== Cache Age Information =====

    /// Age of the snapshot under `key` for display, None if there is none
    pub fn cache_age(&self, key: &str) -> Option<String> {
        match self.load::<IgnoredAny>(key) {
            Ok(Some(cached)) => Some(cached.age_display()),
            Ok(None) => None,
            Err(e) => {
                debug!(cache = key, error = %e, "Failed to load cache for age display");
                None
            }
        }
    }

    pub fn events_age(&self) -> String {
        self.cache_age(EVENTS_KEY)
            .unwrap_or_else(|| "never".to_string())
    }
}

// ============================================================================
// Tests
// ============================================================================
