//! Forms - local validation followed by a single remote write.
//!
//! Validation errors are field-level and never leave the client: an invalid
//! form is not sent. A valid form is submitted once; on success the
//! resources it affects are invalidated in the cache.
//!
//! ## Example
//!
//! ```ignore
//! let form = JobApplicationForm {
//!     job_id: "j1".into(),
//!     email: "ada@example.com".into(),
//!     ..Default::default()
//! };
//! match submit(&form, ctx.remote(), ctx.cache()).await {
//!     Err(FormError::Invalid(errors)) => show_inline(errors.for_field("phone")),
//!     Err(FormError::Mutation(err)) => toast(err.user_message()),
//!     Ok(_) => navigate_back(),
//! }
//! ```

mod company;
mod job_application;
mod profile;
mod validator;

use std::fmt;

use serde_json::Value;

use crate::cache::{CacheError, ResourceCache};
use crate::mutation::{Mutation, MutationError};
use crate::remote::{Remote, RemoteRequest};
use crate::resource::ResourceKey;

pub use company::{CompanyForm, CompanySize};
pub use job_application::JobApplicationForm;
pub use profile::ProfileForm;
pub use validator::{FieldError, ValidationErrors, Validator};

/// A form that validates locally and submits as one remote write.
pub trait Form {
    /// Field-level checks. Pure; no network.
    fn validate(&self) -> Result<(), ValidationErrors>;

    /// The write that persists this form.
    fn request(&self) -> RemoteRequest;

    /// Cached resources made stale by a successful submit.
    fn invalidates(&self) -> Vec<ResourceKey> {
        Vec::new()
    }
}

/// Error type for form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    Invalid(ValidationErrors),
    Mutation(MutationError),
    Cache(CacheError),
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormError::Invalid(errors) => write!(f, "form is invalid: {}", errors),
            FormError::Mutation(err) => write!(f, "{}", err),
            FormError::Cache(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for FormError {}

impl From<ValidationErrors> for FormError {
    fn from(errors: ValidationErrors) -> Self {
        FormError::Invalid(errors)
    }
}

impl From<MutationError> for FormError {
    fn from(err: MutationError) -> Self {
        FormError::Mutation(err)
    }
}

impl From<CacheError> for FormError {
    fn from(err: CacheError) -> Self {
        FormError::Cache(err)
    }
}

/// Validate and submit a form.
pub async fn submit<F, X, C>(form: &F, remote: &X, cache: &C) -> Result<Value, FormError>
where
    F: Form,
    X: Remote,
    C: ResourceCache,
{
    if let Err(errors) = form.validate() {
        log::debug!("form rejected locally: {}", errors);
        return Err(errors.into());
    }

    let mut mutation = Mutation::new(form.request());
    let body = mutation.execute(remote).await.map_err(|err| {
        log::warn!("{}", err);
        err
    })?;

    for key in form.invalidates() {
        cache.invalidate(&key)?;
    }
    Ok(body)
}
