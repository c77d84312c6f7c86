//! Resources - server-owned records displayed by the client.
//!
//! A resource is immutable from the client's point of view except through a
//! successful round-trip write. Every resource lives in a collection and is
//! addressed by a [`ResourceKey`] (`collection:id`), which is also the cache key.
//!
//! ## Example
//!
//! ```ignore
//! use optimistic_rust::Resource;
//!
//! #[derive(Clone, Serialize, Deserialize, Resource)]
//! #[resource(collection = "companies")]
//! struct Company {
//!     pub id: String,
//!     pub num_followers: u32,
//! }
//!
//! let key = company.key(); // "companies:acme"
//! ```

use std::fmt;

use serde::{de::DeserializeOwned, Deserialize, Serialize};

pub use optimistic_rust_macros::Resource;

/// Trait for types fetched from the remote service and held in the cache.
pub trait Resource: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// The collection name for this resource type (e.g., "posts", "companies").
    const COLLECTION: &'static str;

    /// Returns the stable identifier of this resource instance.
    fn id(&self) -> String;

    /// The cache key of this resource instance.
    fn key(&self) -> ResourceKey {
        ResourceKey::new(Self::COLLECTION, self.id())
    }

    /// Key for a resource of this type with the given id.
    fn key_for(id: &str) -> ResourceKey {
        ResourceKey::new(Self::COLLECTION, id)
    }

    /// Endpoint used to fetch a single resource.
    fn endpoint(id: &str) -> String {
        format!("/{}/{}", Self::COLLECTION, id)
    }
}

/// Stable identifier of a resource: its collection plus its id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceKey {
    pub collection: String,
    pub id: String,
}

impl ResourceKey {
    pub fn new(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            id: id.into(),
        }
    }

    /// Storage key: `"collection:id"`.
    pub fn storage_key(&self) -> String {
        format!("{}:{}", self.collection, self.id)
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.collection, self.id)
    }
}

/// A versioned wrapper around a cached resource snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    pub data: T,
    pub version: u64,
}
