//! In-memory query cache.
//!
//! Entries are keyed by call identity (resource name + arguments) and
//! carry two deadlines:
//!   - `stale_at`   : past this, the value is stale but still servable
//!                    while a refresh is in flight
//!   - `expires_at` : past this, the value is gone (reads are misses)
//!
//! Values are stored JSON-encoded. There is no persistence: every entry
//! is a read-only projection of remote state, invalidated purely by time.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, RwLock};
use tokio::sync::Mutex as AsyncMutex;

/// Per-query freshness windows, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    pub stale_after_ms: i64,
    pub expires_after_ms: i64,
}

impl CachePolicy {
    pub const fn new(stale_after_ms: i64, expires_after_ms: i64) -> Self {
        Self {
            stale_after_ms,
            expires_after_ms,
        }
    }
}

struct Entry {
    value: String,
    stale_at: i64,
    expires_at: i64,
}

#[derive(Default)]
pub struct QueryCache {
    entries: RwLock<HashMap<String, Entry>>,
    // Per-key gates so concurrent fetches for the same key coalesce.
    inflight: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the raw value and whether it is still fresh. Expired
    /// entries are misses.
    fn get_raw_at(&self, key: &str, now: DateTime<Utc>) -> Option<(String, bool)> {
        let now_ms = now.timestamp_millis();
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(key).and_then(|entry| {
            if entry.expires_at > now_ms {
                Some((entry.value.clone(), entry.stale_at > now_ms))
            } else {
                None
            }
        })
    }

    fn set_raw_at(&self, key: &str, value: String, policy: CachePolicy, now: DateTime<Utc>) {
        let now_ms = now.timestamp_millis();
        let entry = Entry {
            value,
            stale_at: now_ms + policy.stale_after_ms,
            expires_at: now_ms + policy.expires_after_ms,
        };
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), entry);
    }

    /// Typed read. Returns the value and a freshness flag; an entry that
    /// no longer decodes is treated as a miss.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<(T, bool)> {
        let (raw, fresh) = self.get_raw_at(key, Utc::now())?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some((value, fresh)),
            Err(e) => {
                tracing::warn!("[cache] dropping undecodable entry {}: {}", key, e);
                None
            }
        }
    }

    pub fn set<T: Serialize>(&self, key: &str, value: &T, policy: CachePolicy) -> Result<()> {
        let raw = serde_json::to_string(value).context("cache: failed to encode value")?;
        self.set_raw_at(key, raw, policy, Utc::now());
        Ok(())
    }

    /// Physically removes expired entries. Returns the number removed.
    pub fn cleanup(&self) -> usize {
        self.cleanup_at(Utc::now())
    }

    pub fn cleanup_at(&self, now: DateTime<Utc>) -> usize {
        let now_ms = now.timestamp_millis();
        let removed = {
            let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
            let before = entries.len();
            entries.retain(|_, entry| entry.expires_at > now_ms);
            before - entries.len()
        };

        // Keys embed caller-supplied parameters, so idle gates must not
        // accumulate forever. A gate nobody holds is recreated on demand.
        let mut inflight = self.inflight.lock().unwrap_or_else(|e| e.into_inner());
        inflight.retain(|_, gate| Arc::strong_count(gate) > 1);

        removed
    }

    fn gate(&self, key: &str) -> Arc<AsyncMutex<()>> {
        let mut inflight = self.inflight.lock().unwrap_or_else(|e| e.into_inner());
        inflight
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    /// Cached, deduplicated fetch.
    ///
    /// - fresh hit: served from cache, `fetch` never runs
    /// - miss: single caller runs `fetch`; concurrent callers for the
    ///   same key wait and read the stored result
    /// - stale hit while a refresh is in flight: served stale immediately
    pub async fn fetch_with<T, F, Fut>(&self, key: &str, policy: CachePolicy, fetch: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some((value, true)) = self.get::<T>(key) {
            tracing::debug!("[cache] fresh hit for {}", key);
            return Ok(value);
        }

        let gate = self.gate(key);
        if let Ok(_guard) = gate.try_lock() {
            // Won the refresh. Another winner may have just finished.
            if let Some((value, true)) = self.get::<T>(key) {
                return Ok(value);
            }
            tracing::debug!("[cache] miss for {}, fetching", key);
            let value = fetch().await?;
            self.set(key, &value, policy)?;
            return Ok(value);
        }

        // A refresh is already in flight. Stale data is servable.
        if let Some((value, _)) = self.get::<T>(key) {
            tracing::debug!("[cache] stale hit for {} while refresh in flight", key);
            return Ok(value);
        }
        // Nothing to serve; wait for the in-flight fetch.
        let _guard = gate.lock().await;
        match self.get::<T>(key) {
            Some((value, _)) => Ok(value),
            None => {
                // The winner failed; try ourselves.
                let value = fetch().await?;
                self.set(key, &value, policy)?;
                Ok(value)
            }
        }
    }
}
