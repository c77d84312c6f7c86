//! Query - cache-first resource loading with manual retry.

use std::fmt;

use super::{CacheEntry, CacheError, ResourceCache};
use crate::remote::{Remote, RemoteError, RemoteRequest};
use crate::resource::{Resource, ResourceKey, Versioned};

/// Result of loading a resource for display.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchState<R> {
    /// Another load for this key is in flight.
    Loading,
    Ready(Versioned<R>),
    /// Section-level error; shown with a retry action.
    Failed(FetchError),
}

impl<R> FetchState<R> {
    pub fn ready(&self) -> Option<&R> {
        match self {
            FetchState::Ready(v) => Some(&v.data),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, FetchState::Failed(_))
    }
}

/// Initial resource load failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    Remote { key: ResourceKey, source: RemoteError },
    Decode { key: ResourceKey, message: String },
    /// A previous failure recorded in the cache; call `retry` to fetch again.
    Cached { key: ResourceKey, message: String },
    Cache(CacheError),
}

impl FetchError {
    pub fn message(&self) -> String {
        match self {
            FetchError::Remote { source, .. } => source.message.clone(),
            FetchError::Decode { message, .. } | FetchError::Cached { message, .. } => {
                message.clone()
            }
            FetchError::Cache(err) => err.to_string(),
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Remote { key, source } => write!(f, "fetching {} failed: {}", key, source),
            FetchError::Decode { key, message } => {
                write!(f, "decoding {} failed: {}", key, message)
            }
            FetchError::Cached { key, message } => {
                write!(f, "fetching {} failed earlier: {}", key, message)
            }
            FetchError::Cache(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for FetchError {}

impl From<CacheError> for FetchError {
    fn from(err: CacheError) -> Self {
        FetchError::Cache(err)
    }
}

/// Loads resources through the cache, fetching from the remote on a miss.
pub struct Query<'a, C, X> {
    cache: &'a C,
    remote: &'a X,
}

impl<'a, C: ResourceCache, X: Remote> Query<'a, C, X> {
    pub fn new(cache: &'a C, remote: &'a X) -> Self {
        Self { cache, remote }
    }

    /// Serve a fresh snapshot from the cache, or fetch when the entry is
    /// missing or stale. A recorded failure is returned as-is; it is never
    /// retried automatically.
    pub async fn load<R: Resource>(&self, id: &str) -> FetchState<R> {
        let key = R::key_for(id);
        match self.cache.get::<R>(id) {
            Ok(CacheEntry::Fresh(snapshot)) => FetchState::Ready(snapshot),
            Ok(CacheEntry::Pending) => FetchState::Loading,
            Ok(CacheEntry::Failed(message)) => {
                FetchState::Failed(FetchError::Cached { key, message })
            }
            Ok(CacheEntry::Stale(_)) | Ok(CacheEntry::Missing) => self.fetch::<R>(id).await,
            Err(err) => FetchState::Failed(err.into()),
        }
    }

    /// Fetch again after a failure. Manual: triggered by the user.
    pub async fn retry<R: Resource>(&self, id: &str) -> FetchState<R> {
        log::info!("retrying fetch of {}", R::key_for(id));
        self.fetch::<R>(id).await
    }

    async fn fetch<R: Resource>(&self, id: &str) -> FetchState<R> {
        match self.try_fetch::<R>(id).await {
            Ok(snapshot) => FetchState::Ready(snapshot),
            Err(err) => {
                let key = R::key_for(id);
                if let Err(cache_err) = self.cache.fail_fetch(&key, &err.message()) {
                    log::warn!("could not record fetch failure for {}: {}", key, cache_err);
                }
                FetchState::Failed(err)
            }
        }
    }

    async fn try_fetch<R: Resource>(&self, id: &str) -> Result<Versioned<R>, FetchError> {
        let key = R::key_for(id);
        self.cache.begin_fetch(&key)?;
        log::debug!("fetching {}", key);

        let body = self
            .remote
            .call(&RemoteRequest::get(R::endpoint(id)))
            .await
            .map_err(|source| FetchError::Remote {
                key: key.clone(),
                source,
            })?;
        let resource: R = serde_json::from_value(body).map_err(|e| FetchError::Decode {
            key: key.clone(),
            message: e.to_string(),
        })?;

        Ok(self.cache.put(&resource)?)
    }
}
