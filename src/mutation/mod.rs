//! Mutation - a remote write with a pending/success/error lifecycle.
//!
//! ## Example
//!
//! ```ignore
//! let mut mutation = Mutation::new(RemoteRequest::post("/company/acme/follow"))
//!     .on_pending(|req| log::debug!("sending {}", req))
//!     .on_error(|err| log::warn!("follow failed: {}", err));
//!
//! let body = mutation.execute(&remote).await?;
//! assert_eq!(mutation.status(), MutationStatus::Success);
//! ```

use std::fmt;

use serde_json::Value;

use crate::remote::{Remote, RemoteError, RemoteRequest};

/// Lifecycle of a single mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MutationStatus {
    #[default]
    Idle,
    Pending,
    Success,
    Error,
}

impl MutationStatus {
    pub fn is_settled(self) -> bool {
        matches!(self, MutationStatus::Success | MutationStatus::Error)
    }
}

/// A failed mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationError {
    /// The remote call failed or was rejected.
    Remote {
        request: String,
        source: RemoteError,
    },
    /// `execute` was called on a mutation that already ran.
    AlreadyExecuted(MutationStatus),
}

impl MutationError {
    /// HTTP-style status of the rejection, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            MutationError::Remote { source, .. } => source.status,
            MutationError::AlreadyExecuted(_) => None,
        }
    }

    /// Message suitable for display to the user.
    pub fn user_message(&self) -> String {
        match self {
            MutationError::Remote { source, .. } => source.message.clone(),
            MutationError::AlreadyExecuted(_) => "request already sent".to_string(),
        }
    }
}

impl fmt::Display for MutationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MutationError::Remote { request, source } => {
                write!(f, "{} failed: {}", request, source)
            }
            MutationError::AlreadyExecuted(status) => {
                write!(f, "mutation already executed (status {:?})", status)
            }
        }
    }
}

impl std::error::Error for MutationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MutationError::Remote { source, .. } => Some(source),
            MutationError::AlreadyExecuted(_) => None,
        }
    }
}

type PendingHook = Box<dyn Fn(&RemoteRequest) + Send + Sync>;
type SuccessHook = Box<dyn Fn(&Value) + Send + Sync>;
type ErrorHook = Box<dyn Fn(&MutationError) + Send + Sync>;

/// One remote write and its lifecycle callbacks.
///
/// A mutation runs at most once; create a new one for the next write.
pub struct Mutation {
    request: RemoteRequest,
    status: MutationStatus,
    on_pending: Vec<PendingHook>,
    on_success: Vec<SuccessHook>,
    on_error: Vec<ErrorHook>,
}

impl Mutation {
    pub fn new(request: RemoteRequest) -> Self {
        Self {
            request,
            status: MutationStatus::Idle,
            on_pending: Vec::new(),
            on_success: Vec::new(),
            on_error: Vec::new(),
        }
    }

    /// Called right before the request is sent.
    pub fn on_pending<F>(mut self, hook: F) -> Self
    where
        F: Fn(&RemoteRequest) + Send + Sync + 'static,
    {
        self.on_pending.push(Box::new(hook));
        self
    }

    /// Called with the decoded response body on success.
    pub fn on_success<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.on_success.push(Box::new(hook));
        self
    }

    /// Called once with the error on failure.
    pub fn on_error<F>(mut self, hook: F) -> Self
    where
        F: Fn(&MutationError) + Send + Sync + 'static,
    {
        self.on_error.push(Box::new(hook));
        self
    }

    pub fn request(&self) -> &RemoteRequest {
        &self.request
    }

    pub fn status(&self) -> MutationStatus {
        self.status
    }

    /// Send the request and run the matching hooks. Never retried.
    pub async fn execute<X: Remote>(&mut self, remote: &X) -> Result<Value, MutationError> {
        if self.status != MutationStatus::Idle {
            return Err(MutationError::AlreadyExecuted(self.status));
        }

        self.status = MutationStatus::Pending;
        for hook in &self.on_pending {
            hook(&self.request);
        }

        match remote.call(&self.request).await {
            Ok(body) => {
                self.status = MutationStatus::Success;
                for hook in &self.on_success {
                    hook(&body);
                }
                Ok(body)
            }
            Err(source) => {
                self.status = MutationStatus::Error;
                let err = MutationError::Remote {
                    request: self.request.to_string(),
                    source,
                };
                for hook in &self.on_error {
                    hook(&err);
                }
                Err(err)
            }
        }
    }
}

impl fmt::Debug for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mutation")
            .field("request", &self.request)
            .field("status", &self.status)
            .finish()
    }
}
