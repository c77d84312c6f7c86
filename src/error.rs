use std::fmt;

use crate::cache::{CacheError, FetchError};
use crate::feed::FeedError;
use crate::forms::{FormError, ValidationErrors};
use crate::mutation::MutationError;
use crate::optimistic::StoreError;

/// Which class of failure an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Local, field-level; shown inline and never sent to the server.
    Validation,
    /// Remote write failed; optimistic state reverted, one-shot message shown.
    Mutation,
    /// Initial load failed; section-level error with manual retry.
    Fetch,
    /// Client-side bookkeeping failure (poisoned lock, bad state transition).
    Internal,
}

/// Umbrella error for container operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    Validation(ValidationErrors),
    Mutation(MutationError),
    Fetch(FetchError),
    Feed(FeedError),
    Store(StoreError),
    Cache(CacheError),
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Validation(_) => ErrorKind::Validation,
            AppError::Mutation(_) => ErrorKind::Mutation,
            AppError::Fetch(_) | AppError::Feed(_) => ErrorKind::Fetch,
            AppError::Store(_) | AppError::Cache(_) => ErrorKind::Internal,
        }
    }

    /// Map this error to an HTTP-style status code.
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::Validation(_) => 400,
            AppError::Mutation(err) => err.status().unwrap_or(502),
            AppError::Fetch(FetchError::Remote { source, .. }) => source.status.unwrap_or(502),
            AppError::Fetch(_) => 500,
            AppError::Feed(FeedError::Remote(source)) => source.status.unwrap_or(502),
            AppError::Feed(_) => 500,
            AppError::Store(StoreError::MutationPending { .. }) => 409,
            AppError::Store(_) | AppError::Cache(_) => 500,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(e) => write!(f, "validation failed: {}", e),
            AppError::Mutation(e) => write!(f, "mutation failed: {}", e),
            AppError::Fetch(e) => write!(f, "fetch failed: {}", e),
            AppError::Feed(e) => write!(f, "feed failed: {}", e),
            AppError::Store(e) => write!(f, "store error: {}", e),
            AppError::Cache(e) => write!(f, "cache error: {}", e),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Validation(e) => Some(e),
            AppError::Mutation(e) => Some(e),
            AppError::Fetch(e) => Some(e),
            AppError::Feed(e) => Some(e),
            AppError::Store(e) => Some(e),
            AppError::Cache(e) => Some(e),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::Validation(err)
    }
}

impl From<MutationError> for AppError {
    fn from(err: MutationError) -> Self {
        AppError::Mutation(err)
    }
}

impl From<FetchError> for AppError {
    fn from(err: FetchError) -> Self {
        AppError::Fetch(err)
    }
}

impl From<FeedError> for AppError {
    fn from(err: FeedError) -> Self {
        AppError::Feed(err)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Store(err)
    }
}

impl From<CacheError> for AppError {
    fn from(err: CacheError) -> Self {
        AppError::Cache(err)
    }
}

impl From<FormError> for AppError {
    fn from(err: FormError) -> Self {
        match err {
            FormError::Invalid(errors) => AppError::Validation(errors),
            FormError::Mutation(err) => AppError::Mutation(err),
            FormError::Cache(err) => AppError::Cache(err),
        }
    }
}
