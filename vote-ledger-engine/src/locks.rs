use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use vote_ledger_shared::types::{ItemId, UserId};

/// Per-(item, user) locks serializing vote transitions.
pub type VoteLocks = KeyedLocks<(ItemId, UserId)>;

/// Per-key async locks.
///
/// Work on one key is serialized; different keys proceed concurrently. Entries
/// are created on demand and removed as soon as nobody holds or waits on them,
/// including when the holding or waiting future is dropped before completing.
pub struct KeyedLocks<K> {
    locks: Mutex<HashMap<K, Arc<AsyncMutex<()>>>>,
}

impl<K> Default for KeyedLocks<K> {
    fn default() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }
}

impl<K> KeyedLocks<K> {
    fn map(&self) -> MutexGuard<'_, HashMap<K, Arc<AsyncMutex<()>>>> {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of keys that currently have a lock entry.
    pub fn active_keys(&self) -> usize {
        self.map().len()
    }
}

impl<K: Eq + Hash + Clone> KeyedLocks<K> {
    pub fn new() -> Self {
        Self::default()
    }

    fn register(&self, key: K) -> Registration<'_, K> {
        let lock = self
            .map()
            .entry(key.clone())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone();
        Registration {
            locks: self,
            key,
            lock,
        }
    }

    /// Waits for exclusive access to the key.
    ///
    /// The key stays locked until the returned guard is dropped.
    pub async fn acquire(&self, key: K) -> KeyedLockGuard<'_, K> {
        let registration = self.register(key);
        let guard = Arc::clone(&registration.lock).lock_owned().await;
        KeyedLockGuard {
            _guard: guard,
            _registration: registration,
        }
    }
}

/// Exclusive access to one key of a [`KeyedLocks`].
///
/// Dropping the guard unlocks the key and forgets its entry if it went idle.
#[must_use = "the key is unlocked as soon as the guard is dropped"]
pub struct KeyedLockGuard<'a, K: Eq + Hash> {
    // Field order matters: the lock is released before the entry is checked.
    _guard: OwnedMutexGuard<()>,
    _registration: Registration<'a, K>,
}

/// A reference to a key's lock entry held by a waiter or a holder.
struct Registration<'a, K: Eq + Hash> {
    locks: &'a KeyedLocks<K>,
    key: K,
    lock: Arc<AsyncMutex<()>>,
}

impl<K: Eq + Hash> Drop for Registration<'_, K> {
    fn drop(&mut self) {
        let mut locks = self.locks.map();
        // Idle when only the map and this registration still reference the lock.
        let idle = locks
            .get(&self.key)
            .is_some_and(|lock| Arc::ptr_eq(lock, &self.lock) && Arc::strong_count(lock) == 2);
        if idle {
            locks.remove(&self.key);
        }
    }
}
