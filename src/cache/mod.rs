//! Resource cache - fetched snapshots keyed by [`ResourceKey`].
//!
//! The cache is shared by every component that displays the same resource.
//! Components only read through it and request invalidation; writes happen
//! on the server, after which the owning key is invalidated so the next read
//! refetches.
//!
//! ## Example
//!
//! ```ignore
//! let cache = InMemoryResourceCache::new();
//! cache.put(&company)?;
//!
//! let id = cache.subscribe(&company.key(), |event| println!("{:?}", event.kind))?;
//! cache.invalidate(&company.key())?;   // entry turns stale, subscribers notified
//!
//! let query = Query::new(&cache, &remote);
//! let state = query.load::<Company>("acme").await; // refetches
//! ```

mod in_memory;
mod query;
mod store;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::resource::{ResourceKey, Versioned};

pub use in_memory::InMemoryResourceCache;
pub use query::{FetchError, FetchState, Query};
pub use store::ResourceCache;

/// What a read from the cache finds.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheEntry<T> {
    /// Authoritative snapshot.
    Fresh(Versioned<T>),
    /// Invalidated snapshot; still displayable, but the next load refetches.
    Stale(Versioned<T>),
    /// A fetch is in flight.
    Pending,
    /// The last fetch failed; stays failed until retried.
    Failed(String),
    /// Never fetched.
    Missing,
}

impl<T> CacheEntry<T> {
    /// Snapshot to display, fresh or stale.
    pub fn snapshot(&self) -> Option<&Versioned<T>> {
        match self {
            CacheEntry::Fresh(v) | CacheEntry::Stale(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_fresh(&self) -> bool {
        matches!(self, CacheEntry::Fresh(_))
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, CacheEntry::Stale(_))
    }
}

/// Notification delivered to subscribers of a key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEvent {
    pub key: ResourceKey,
    pub kind: CacheEventKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CacheEventKind {
    Updated,
    Invalidated,
    Failed,
    Removed,
}

/// Error type for cache operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    LockPoisoned(&'static str),
    /// Serialization/deserialization error.
    Serde(String),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::LockPoisoned(operation) => {
                write!(f, "cache lock poisoned during {}", operation)
            }
            CacheError::Serde(msg) => write!(f, "cache serialization error: {}", msg),
        }
    }
}

impl std::error::Error for CacheError {}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        CacheError::Serde(err.to_string())
    }
}
