//! InMemoryResourceCache - HashMap-backed resource cache.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use event_emitter_rs::EventEmitter;

use super::{CacheEntry, CacheError, CacheEvent, CacheEventKind, ResourceCache};
use crate::resource::{Resource, ResourceKey, Versioned};

/// Internal stored representation of a cache entry.
enum EntryState {
    Fresh(Vec<u8>),
    Stale(Vec<u8>),
    Pending,
    Failed(String),
}

struct StoredEntry {
    state: EntryState,
    version: u64,
}

/// In-memory resource cache backed by a HashMap.
///
/// Storage key is `"collection:id"`. Clone-friendly via Arc: clones share
/// entries and subscriptions. Subscriber callbacks are dispatched by the
/// event emitter and may run on another thread.
#[derive(Clone)]
pub struct InMemoryResourceCache {
    storage: Arc<RwLock<HashMap<String, StoredEntry>>>,
    emitter: Arc<Mutex<EventEmitter>>,
}

impl Default for InMemoryResourceCache {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryResourceCache {
    /// Create a new empty cache.
    pub fn new() -> Self {
        Self {
            storage: Arc::new(RwLock::new(HashMap::new())),
            emitter: Arc::new(Mutex::new(EventEmitter::new())),
        }
    }

    /// Number of entries, in any state.
    pub fn len(&self) -> Result<usize, CacheError> {
        let storage = self
            .storage
            .read()
            .map_err(|_| CacheError::LockPoisoned("read"))?;
        Ok(storage.len())
    }

    pub fn is_empty(&self) -> Result<bool, CacheError> {
        Ok(self.len()? == 0)
    }

    fn notify(&self, key: &ResourceKey, kind: CacheEventKind) -> Result<(), CacheError> {
        let mut emitter = self
            .emitter
            .lock()
            .map_err(|_| CacheError::LockPoisoned("emitter"))?;
        let _ = emitter.emit(
            &key.storage_key(),
            CacheEvent {
                key: key.clone(),
                kind,
            },
        );
        Ok(())
    }

    fn set_state(&self, key: &ResourceKey, state: EntryState) -> Result<u64, CacheError> {
        let mut storage = self
            .storage
            .write()
            .map_err(|_| CacheError::LockPoisoned("write"))?;
        let storage_key = key.storage_key();
        let version = storage.get(&storage_key).map(|e| e.version).unwrap_or(0);
        storage.insert(storage_key, StoredEntry { state, version });
        Ok(version)
    }
}

impl ResourceCache for InMemoryResourceCache {
    fn get<R: Resource>(&self, id: &str) -> Result<CacheEntry<R>, CacheError> {
        let key = R::key_for(id).storage_key();
        let storage = self
            .storage
            .read()
            .map_err(|_| CacheError::LockPoisoned("read"))?;

        let Some(stored) = storage.get(&key) else {
            return Ok(CacheEntry::Missing);
        };
        let entry = match &stored.state {
            EntryState::Fresh(bytes) => CacheEntry::Fresh(Versioned {
                data: serde_json::from_slice(bytes)?,
                version: stored.version,
            }),
            EntryState::Stale(bytes) => CacheEntry::Stale(Versioned {
                data: serde_json::from_slice(bytes)?,
                version: stored.version,
            }),
            EntryState::Pending => CacheEntry::Pending,
            EntryState::Failed(message) => CacheEntry::Failed(message.clone()),
        };
        Ok(entry)
    }

    fn put<R: Resource>(&self, resource: &R) -> Result<Versioned<R>, CacheError> {
        let key = resource.key();
        let bytes = serde_json::to_vec(resource)?;

        let version = {
            let mut storage = self
                .storage
                .write()
                .map_err(|_| CacheError::LockPoisoned("write"))?;
            let storage_key = key.storage_key();
            let version = storage.get(&storage_key).map(|e| e.version + 1).unwrap_or(1);
            storage.insert(
                storage_key,
                StoredEntry {
                    state: EntryState::Fresh(bytes),
                    version,
                },
            );
            version
        };

        self.notify(&key, CacheEventKind::Updated)?;
        Ok(Versioned {
            data: resource.clone(),
            version,
        })
    }

    fn begin_fetch(&self, key: &ResourceKey) -> Result<(), CacheError> {
        self.set_state(key, EntryState::Pending)?;
        Ok(())
    }

    fn fail_fetch(&self, key: &ResourceKey, message: &str) -> Result<(), CacheError> {
        self.set_state(key, EntryState::Failed(message.to_string()))?;
        log::warn!("fetch of {} failed: {}", key, message);
        self.notify(key, CacheEventKind::Failed)
    }

    fn invalidate(&self, key: &ResourceKey) -> Result<bool, CacheError> {
        let existed = {
            let mut storage = self
                .storage
                .write()
                .map_err(|_| CacheError::LockPoisoned("write"))?;
            match storage.get_mut(&key.storage_key()) {
                Some(stored) => {
                    let state = std::mem::replace(&mut stored.state, EntryState::Pending);
                    let (state, had_snapshot) = match state {
                        EntryState::Fresh(bytes) | EntryState::Stale(bytes) => {
                            (EntryState::Stale(bytes), true)
                        }
                        other => (other, false),
                    };
                    stored.state = state;
                    had_snapshot
                }
                None => false,
            }
        };

        log::debug!("invalidated {}", key);
        self.notify(key, CacheEventKind::Invalidated)?;
        Ok(existed)
    }

    fn invalidate_collection(&self, collection: &str) -> Result<usize, CacheError> {
        let prefix = format!("{}:", collection);
        let keys: Vec<ResourceKey> = {
            let storage = self
                .storage
                .read()
                .map_err(|_| CacheError::LockPoisoned("read"))?;
            storage
                .keys()
                .filter_map(|k| k.strip_prefix(&prefix))
                .map(|id| ResourceKey::new(collection, id))
                .collect()
        };

        let mut count = 0;
        for key in keys {
            if self.invalidate(&key)? {
                count += 1;
            }
        }
        Ok(count)
    }

    fn remove(&self, key: &ResourceKey) -> Result<bool, CacheError> {
        let removed = self
            .storage
            .write()
            .map_err(|_| CacheError::LockPoisoned("write"))?
            .remove(&key.storage_key())
            .is_some();
        if removed {
            self.notify(key, CacheEventKind::Removed)?;
        }
        Ok(removed)
    }

    fn subscribe<F>(&self, key: &ResourceKey, callback: F) -> Result<String, CacheError>
    where
        F: Fn(CacheEvent) + Send + Sync + 'static,
    {
        let mut emitter = self
            .emitter
            .lock()
            .map_err(|_| CacheError::LockPoisoned("emitter"))?;
        Ok(emitter.on(&key.storage_key(), callback))
    }

    fn unsubscribe(&self, subscription: &str) -> Result<(), CacheError> {
        let mut emitter = self
            .emitter
            .lock()
            .map_err(|_| CacheError::LockPoisoned("emitter"))?;
        let _ = emitter.remove_listener(subscription);
        Ok(())
    }
}
