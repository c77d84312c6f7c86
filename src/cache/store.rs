//! ResourceCache - abstract snapshot storage with invalidation and subscriptions.

use super::{CacheEntry, CacheError, CacheEvent};
use crate::resource::{Resource, ResourceKey, Versioned};

/// Abstract client-side resource cache.
///
/// Reads go through `get`; only fetches (`put`, `begin_fetch`, `fail_fetch`)
/// and invalidation change entries. Components never edit cached data.
pub trait ResourceCache: Send + Sync {
    /// Read the entry for a resource id.
    fn get<R: Resource>(&self, id: &str) -> Result<CacheEntry<R>, CacheError>;

    /// Store a freshly fetched snapshot. Bumps the entry version.
    fn put<R: Resource>(&self, resource: &R) -> Result<Versioned<R>, CacheError>;

    /// Mark a fetch for `key` as in flight.
    fn begin_fetch(&self, key: &ResourceKey) -> Result<(), CacheError>;

    /// Record a failed fetch for `key`.
    fn fail_fetch(&self, key: &ResourceKey, message: &str) -> Result<(), CacheError>;

    /// Mark `key` stale so the next load refetches. Returns true if a
    /// snapshot existed.
    fn invalidate(&self, key: &ResourceKey) -> Result<bool, CacheError>;

    /// Invalidate every entry of a collection. Returns the number of entries marked stale.
    fn invalidate_collection(&self, collection: &str) -> Result<usize, CacheError>;

    /// Drop the entry for `key`.
    fn remove(&self, key: &ResourceKey) -> Result<bool, CacheError>;

    /// Register a callback for changes to `key`. Returns a subscription id.
    fn subscribe<F>(&self, key: &ResourceKey, callback: F) -> Result<String, CacheError>
    where
        F: Fn(CacheEvent) + Send + Sync + 'static;

    /// Remove a subscription.
    fn unsubscribe(&self, subscription: &str) -> Result<(), CacheError>;
}
