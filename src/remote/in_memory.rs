//! InMemoryRemote - a route table of handler closures standing in for the backend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::Value;

use super::{Method, Remote, RemoteError, RemoteRequest};

type Handler = Box<dyn Fn(&RemoteRequest) -> Result<Value, RemoteError> + Send + Sync>;

/// A remote that dispatches requests to registered handlers.
///
/// Routes are matched on exact method and endpoint. Unmatched requests go to
/// the fallback handler if one is set, otherwise they fail with status 404.
/// Every request is recorded, so tests can count network calls.
///
/// ## Example
///
/// ```ignore
/// let remote = InMemoryRemote::new()
///     .route(Method::Post, "/company/acme/follow", |_| Ok(json!({ "ok": true })))
///     .route(Method::Delete, "/company/acme/follow", |_| {
///         Err(RemoteError::with_status(500, "unfollow failed"))
///     });
/// ```
#[derive(Clone, Default)]
pub struct InMemoryRemote {
    routes: Arc<HashMap<(Method, String), Handler>>,
    fallback: Option<Arc<Handler>>,
    calls: Arc<Mutex<Vec<RemoteRequest>>>,
}

impl InMemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a method and endpoint.
    ///
    /// Uses builder pattern; must be called before the remote is cloned.
    pub fn route<F>(mut self, method: Method, endpoint: &str, handler: F) -> Self
    where
        F: Fn(&RemoteRequest) -> Result<Value, RemoteError> + Send + Sync + 'static,
    {
        if let Some(routes) = Arc::get_mut(&mut self.routes) {
            routes.insert((method, endpoint.to_string()), Box::new(handler));
        } else {
            log::warn!("route {} {} ignored: remote already shared", method, endpoint);
        }
        self
    }

    /// Register a handler for every request without a matching route.
    pub fn fallback<F>(mut self, handler: F) -> Self
    where
        F: Fn(&RemoteRequest) -> Result<Value, RemoteError> + Send + Sync + 'static,
    {
        self.fallback = Some(Arc::new(Box::new(handler)));
        self
    }

    /// Requests received so far, in arrival order.
    pub fn calls(&self) -> Vec<RemoteRequest> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    /// Number of requests received for a method and endpoint.
    pub fn call_count(&self, method: Method, endpoint: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.method == method && call.endpoint == endpoint)
            .count()
    }

    /// List registered routes.
    pub fn routes(&self) -> Vec<(Method, &str)> {
        self.routes
            .keys()
            .map(|(method, endpoint)| (*method, endpoint.as_str()))
            .collect()
    }

    fn dispatch(&self, request: &RemoteRequest) -> Result<Value, RemoteError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(request.clone());
        }

        let route = (request.method, request.endpoint.clone());
        match (self.routes.get(&route), &self.fallback) {
            (Some(handler), _) => handler(request),
            (None, Some(fallback)) => fallback(request),
            (None, None) => Err(RemoteError::with_status(
                404,
                format!("no route for {}", request),
            )),
        }
    }
}

impl Remote for InMemoryRemote {
    async fn call(&self, request: &RemoteRequest) -> Result<Value, RemoteError> {
        self.dispatch(request)
    }
}
