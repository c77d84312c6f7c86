//! Feed - cursor-paginated lists for infinite scrolling.
//!
//! Each page is `GET {endpoint}?limit={n}&cursor={c}` (cursor percent-encoded) answering
//! `{ "items": [...], "nextCursor": "..." }`. A null cursor ends the feed.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cache::{CacheError, ResourceCache};
use crate::remote::{Remote, RemoteError, RemoteRequest};
use crate::resource::Resource;

/// One page of a feed as returned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<R> {
    pub items: Vec<R>,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedError {
    Remote(RemoteError),
    Decode(String),
    Cache(CacheError),
    /// `load_more` called after the last page.
    Exhausted,
}

impl fmt::Display for FeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedError::Remote(err) => write!(f, "loading page failed: {}", err),
            FeedError::Decode(msg) => write!(f, "decoding page failed: {}", msg),
            FeedError::Cache(err) => write!(f, "{}", err),
            FeedError::Exhausted => write!(f, "no more pages"),
        }
    }
}

impl std::error::Error for FeedError {}

impl From<CacheError> for FeedError {
    fn from(err: CacheError) -> Self {
        FeedError::Cache(err)
    }
}

/// Accumulated items of a paginated list.
#[derive(Debug, Clone)]
pub struct Feed<R> {
    endpoint: String,
    limit: usize,
    write_through: bool,
    items: Vec<R>,
    seen: HashSet<String>,
    cursor: Option<String>,
    exhausted: bool,
    error: Option<FeedError>,
}

impl<R: Resource> Feed<R> {
    pub fn new(endpoint: impl Into<String>, limit: usize) -> Self {
        Self {
            endpoint: endpoint.into(),
            limit: limit.max(1),
            write_through: false,
            items: Vec::new(),
            seen: HashSet::new(),
            cursor: None,
            exhausted: false,
            error: None,
        }
    }

    /// Also store every loaded item in the resource cache, so cards opened
    /// from the feed render without a second fetch.
    pub fn write_through(mut self, enabled: bool) -> Self {
        self.write_through = enabled;
        self
    }

    pub fn items(&self) -> &[R] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_more(&self) -> bool {
        !self.exhausted
    }

    /// Error of the last page load, if it failed.
    pub fn error(&self) -> Option<&FeedError> {
        self.error.as_ref()
    }

    /// Request for the next page.
    pub fn next_request(&self) -> RemoteRequest {
        let mut endpoint = format!("{}?limit={}", self.endpoint, self.limit);
        if let Some(cursor) = &self.cursor {
            endpoint.push_str("&cursor=");
            endpoint.push_str(&urlencoding::encode(cursor));
        }
        RemoteRequest::get(endpoint)
    }

    /// Load the next page and append its unseen items. Returns how many were
    /// added. A failed page leaves the feed as it was; calling again retries.
    pub async fn load_more<X, C>(&mut self, remote: &X, cache: &C) -> Result<usize, FeedError>
    where
        X: Remote,
        C: ResourceCache,
    {
        if self.exhausted {
            return Err(FeedError::Exhausted);
        }

        match self.fetch_page(remote).await {
            Ok(page) => {
                self.error = None;
                let added = self.append(page, cache)?;
                Ok(added)
            }
            Err(err) => {
                log::warn!("{}: {}", self.endpoint, err);
                self.error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Drop every loaded item and start from the first page.
    pub fn reset(&mut self) {
        self.items.clear();
        self.seen.clear();
        self.cursor = None;
        self.exhausted = false;
        self.error = None;
    }

    async fn fetch_page<X: Remote>(&self, remote: &X) -> Result<Page<R>, FeedError> {
        let request = self.next_request();
        log::debug!("loading {}", request);
        let body = remote.call(&request).await.map_err(FeedError::Remote)?;
        serde_json::from_value(body).map_err(|e| FeedError::Decode(e.to_string()))
    }

    fn append<C: ResourceCache>(&mut self, page: Page<R>, cache: &C) -> Result<usize, FeedError> {
        let mut added = 0;
        for item in page.items {
            if self.write_through {
                cache.put(&item)?;
            }
            if self.seen.insert(item.id()) {
                self.items.push(item);
                added += 1;
            }
        }
        self.exhausted = page.next_cursor.is_none();
        self.cursor = page.next_cursor;
        log::debug!(
            "{}: {} new items, {} total",
            self.endpoint,
            added,
            self.items.len()
        );
        Ok(added)
    }
}
