//! Core Store: key to value-list mapping with TTL support
//!
//! This module implements the heart of stashkv: a mapping from text keys to
//! ordered lists of opaque byte-string values, plus an expiry index that
//! records which keys expire and when.
//!
//! ## Design Decisions
//!
//! 1. **Single Mutex**: The item mapping and the expiry index are guarded by
//!    one `std::sync::Mutex`, so every operation is linearizable relative to
//!    every other operation and to the background sweeper. The two collections
//!    are never observed in a torn state (a key deleted from the mapping with
//!    its expiry entry still present, or vice versa).
//! 2. **Keyed Expiry Index**: Expiry entries live in a `HashMap<String, i64>`
//!    of absolute Unix-second deadlines. The map key gives us "at most one
//!    entry per key" structurally and O(1) removal on delete.
//! 3. **Short Critical Sections**: Every operation locks once, performs an
//!    in-memory mutation, and unlocks. There is no nested acquisition and no
//!    call-out while the lock is held, so no deadlock is possible. The only
//!    exceptions are snapshot save/load (see `storage::snapshot`), which hold
//!    the lock for a full file pass by design.
//!
//! ## Concurrency Model
//!
//! ```text
//! ┌────────────────────────────────────────────────┐
//! │                     Store                      │
//! │  ┌──────────────────────────────────────────┐  │
//! │  │                  Mutex                   │  │
//! │  │  items:    HashMap<String, Vec<Bytes>>   │  │
//! │  │  expiries: HashMap<String, i64>          │  │
//! │  └──────────────────────────────────────────┘  │
//! └────────────────────────────────────────────────┘
//!            ▲                         ▲
//!            │                         │
//!     connection tasks            Sweeper task
//! ```

use bytes::Bytes;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};

/// Returns the current wall-clock time in whole Unix seconds.
pub(crate) fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// The two collections guarded together by the store's mutex.
///
/// Invariant: every key present in `expiries` is also present in `items`.
#[derive(Debug, Default)]
pub(crate) struct StoreInner {
    /// Key to ordered value list. A key exists iff it has an entry here;
    /// an empty list still counts as present.
    pub(crate) items: HashMap<String, Vec<Bytes>>,
    /// Key to absolute expiration deadline in Unix seconds.
    pub(crate) expiries: HashMap<String, i64>,
}

/// The main store for stashkv.
///
/// Each key maps to an ordered sequence of opaque byte strings. Values keep
/// insertion order and duplicates are allowed. Keys may carry an expiration
/// deadline, enforced by the background [`Sweeper`](crate::storage::Sweeper).
///
/// # Thread Safety
///
/// Designed to be wrapped in an `Arc` and shared across all connection tasks
/// plus the sweeper. All operations serialize on one internal mutex.
///
/// # Example
///
/// ```
/// use stashkv::storage::Store;
/// use bytes::Bytes;
///
/// let store = Store::new();
///
/// store.set("greeting", Bytes::from("hello"));
/// store.append("greeting", vec![Bytes::from("world")]);
///
/// assert_eq!(
///     store.get("greeting"),
///     vec![Bytes::from("hello"), Bytes::from("world")]
/// );
/// ```
#[derive(Debug, Default)]
pub struct Store {
    inner: Mutex<StoreInner>,
}

impl Store {
    /// Creates a new, empty store.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap()
    }

    /// Returns true iff the key is present in the mapping.
    pub fn has_key(&self, key: &str) -> bool {
        self.lock().items.contains_key(key)
    }

    /// Sets a key to a single-element value list, replacing any existing list.
    ///
    /// An existing expiry entry is left untouched: TTL survives overwrite.
    ///
    /// # Returns
    ///
    /// Returns `true`; the key is present afterwards.
    pub fn set(&self, key: &str, value: Bytes) -> bool {
        let mut inner = self.lock();
        inner.items.insert(key.to_string(), vec![value]);
        true
    }

    /// Appends one or more values to the key's list, creating it if absent.
    ///
    /// # Returns
    ///
    /// Returns `true`; the key is present afterwards.
    pub fn append(&self, key: &str, values: Vec<Bytes>) -> bool {
        let mut inner = self.lock();
        inner.items.entry(key.to_string()).or_default().extend(values);
        true
    }

    /// Returns the full value list for a key, or an empty list if absent.
    pub fn get(&self, key: &str) -> Vec<Bytes> {
        self.lock().items.get(key).cloned().unwrap_or_default()
    }

    /// Deletes a key and its expiry entry, if any.
    ///
    /// Deleting an absent key is a no-op.
    ///
    /// # Returns
    ///
    /// Returns `true` iff the key is absent afterwards, which is always the
    /// case: delete is idempotent.
    pub fn delete(&self, key: &str) -> bool {
        let mut inner = self.lock();
        inner.items.remove(key);
        inner.expiries.remove(key);
        !inner.items.contains_key(key)
    }

    /// Sets or updates the key's expiration deadline to `now + secs`.
    ///
    /// `secs` may be zero or negative, in which case the key is evicted on the
    /// next sweep. No entry is created for an absent key.
    ///
    /// # Returns
    ///
    /// Returns whether the key was present.
    pub fn expire(&self, key: &str, secs: i64) -> bool {
        let mut inner = self.lock();
        if !inner.items.contains_key(key) {
            return false;
        }
        // Map insert replaces any prior deadline in place. The deadline
        // saturates: secs comes off the wire and may be i64::MAX.
        inner.expiries.insert(key.to_string(), now_unix().saturating_add(secs));
        true
    }

    /// Returns the remaining seconds before the key expires, or 0 if the key
    /// has no expiry entry.
    pub fn time_to_live(&self, key: &str) -> i64 {
        self.lock()
            .expiries
            .get(key)
            .map(|deadline| deadline.saturating_sub(now_unix()))
            .unwrap_or(0)
    }

    /// Returns a sub-sequence of the key's value list.
    ///
    /// - one index `i`: the single value at `i`, if in bounds
    /// - two indices `(a, b)`: the half-open range `[a, b)`, if
    ///   `a <= b <= len`
    /// - any other arity, a negative index, or an out-of-range index yields
    ///   an empty result; no error is raised
    pub fn get_range(&self, key: &str, indices: &[i64]) -> Vec<Bytes> {
        let inner = self.lock();
        let Some(list) = inner.items.get(key) else {
            return Vec::new();
        };
        match *indices {
            [i] => {
                if i >= 0 && (i as usize) < list.len() {
                    vec![list[i as usize].clone()]
                } else {
                    Vec::new()
                }
            }
            [a, b] => {
                if a >= 0 && a <= b && (b as usize) <= list.len() {
                    list[a as usize..b as usize].to_vec()
                } else {
                    Vec::new()
                }
            }
            _ => Vec::new(),
        }
    }

    /// Removes every byte-exact occurrence of `value` from the key's list,
    /// preserving the relative order of the remaining values.
    ///
    /// A key whose list is emptied by this operation remains present with an
    /// empty list; `has_key` still reports it.
    ///
    /// # Returns
    ///
    /// Returns whether the key existed, regardless of whether any value
    /// matched.
    pub fn delete_value(&self, key: &str, value: &[u8]) -> bool {
        let mut inner = self.lock();
        match inner.items.get_mut(key) {
            Some(list) => {
                list.retain(|v| v.as_ref() != value);
                true
            }
            None => false,
        }
    }

    /// Removes all keys and all expiry entries.
    ///
    /// # Returns
    ///
    /// Returns `true` iff both collections are empty afterwards.
    pub fn purge(&self) -> bool {
        let mut inner = self.lock();
        inner.items.clear();
        inner.expiries.clear();
        inner.items.is_empty() && inner.expiries.is_empty()
    }

    /// Evicts every key whose expiration deadline has passed.
    ///
    /// For each expired key the item and its expiry entry are removed as one
    /// atomic step under the lock. Eviction is "no earlier than" the deadline:
    /// a key is only removed once `deadline <= now`.
    ///
    /// Called by the background sweeper; exposed so callers can also force a
    /// sweep cycle directly.
    ///
    /// # Returns
    ///
    /// Returns the number of keys evicted.
    pub fn sweep_expired(&self) -> usize {
        let now = now_unix();
        let mut inner = self.lock();
        let due: Vec<String> = inner
            .expiries
            .iter()
            .filter(|(_, &deadline)| deadline <= now)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &due {
            inner.items.remove(key);
            inner.expiries.remove(key);
        }
        due.len()
    }

    /// Returns the number of keys currently in the store.
    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    /// Returns true if the store holds no keys.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of outstanding expiry entries.
    pub fn expiry_count(&self) -> usize {
        self.lock().expiries.len()
    }
}
