//! Remote - the request/response contract to the backend service.
//!
//! Every read and write leaves the client through a [`Remote`]. Endpoints
//! are opaque REST-ish paths (`/company`, `/jobs/apply`, `/posts/p1/save`)
//! with JSON bodies; a call resolves to the decoded JSON payload or a
//! [`RemoteError`] carrying a message and an optional status code.
//!
//! ## Implementations
//!
//! - [`InMemoryRemote`] routes requests to registered handler closures; used
//!   by tests and local development.
//! - `HttpRemote` (requires the `http` feature) sends requests with reqwest.

mod in_memory;

#[cfg(feature = "http")]
mod http;

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use in_memory::InMemoryRemote;

#[cfg(feature = "http")]
pub use http::HttpRemote;

/// HTTP-style method of a remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }

    /// Whether this method writes on the server.
    pub fn is_write(&self) -> bool {
        !matches!(self, Method::Get)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single call to the remote service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteRequest {
    pub method: Method,
    pub endpoint: String,
    pub payload: Option<Value>,
}

impl RemoteRequest {
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            payload: None,
        }
    }

    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(Method::Get, endpoint)
    }

    pub fn post(endpoint: impl Into<String>) -> Self {
        Self::new(Method::Post, endpoint)
    }

    pub fn put(endpoint: impl Into<String>) -> Self {
        Self::new(Method::Put, endpoint)
    }

    pub fn delete(endpoint: impl Into<String>) -> Self {
        Self::new(Method::Delete, endpoint)
    }

    /// Attach a JSON body.
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }
}

impl fmt::Display for RemoteRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.endpoint)
    }
}

/// A failed or rejected remote call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteError {
    pub message: String,
    pub status: Option<u16>,
}

impl RemoteError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
        }
    }

    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: Some(status),
        }
    }

    /// Transport-level failure (no response at all).
    pub fn is_transport(&self) -> bool {
        self.status.is_none()
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} (status {})", self.message, status),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for RemoteError {}

/// The request/response contract to the backend.
///
/// Calls never block; the returned future resolves once the service answers.
pub trait Remote: Send + Sync {
    fn call(&self, request: &RemoteRequest)
        -> impl Future<Output = Result<Value, RemoteError>> + Send;
}

impl<X: Remote> Remote for Arc<X> {
    fn call(
        &self,
        request: &RemoteRequest,
    ) -> impl Future<Output = Result<Value, RemoteError>> + Send {
        (**self).call(request)
    }
}

impl<X: Remote> Remote for &X {
    fn call(
        &self,
        request: &RemoteRequest,
    ) -> impl Future<Output = Result<Value, RemoteError>> + Send {
        (**self).call(request)
    }
}
