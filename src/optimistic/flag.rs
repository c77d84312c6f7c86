use std::fmt;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::remote::RemoteRequest;
use crate::resource::{Resource, ResourceKey};

/// A per-viewer value derived from a resource that the viewer can change
/// optimistically (liked, saved, followed, current reaction kind).
///
/// A flag is a lens over its resource plus the remote call that persists a
/// new value. `write` owns every side effect of the change on the displayed
/// resource, such as moving a follower count, so restoring a previous value
/// with `write` also restores those side effects.
///
/// ## Example
///
/// ```ignore
/// pub struct CompanyFollowed;
///
/// impl Flag for CompanyFollowed {
///     type Resource = Company;
///     type Value = bool;
///     const NAME: &'static str = "followed";
///
///     fn read(company: &Company) -> bool {
///         company.is_followed
///     }
///
///     fn write(company: &mut Company, followed: &bool) {
///         adjust_count(&mut company.num_followers, company.is_followed, *followed);
///         company.is_followed = *followed;
///     }
///
///     fn request(company: &Company, followed: &bool) -> RemoteRequest {
///         let endpoint = format!("/company/{}/follow", company.id);
///         if *followed { RemoteRequest::post(endpoint) } else { RemoteRequest::delete(endpoint) }
///     }
/// }
/// ```
pub trait Flag: 'static {
    type Resource: Resource;
    type Value: Clone + PartialEq + fmt::Debug + Serialize + DeserializeOwned + Send + Sync;

    /// Name of the flag, unique per resource type.
    const NAME: &'static str;

    /// Derive the flag value from a resource snapshot.
    fn read(resource: &Self::Resource) -> Self::Value;

    /// Set the flag on a resource, including its side effects.
    fn write(resource: &mut Self::Resource, value: &Self::Value);

    /// Remote write that persists `value` for `resource`.
    fn request(resource: &Self::Resource, value: &Self::Value) -> RemoteRequest;

    /// Cached state besides the owning resource made stale by a confirmed
    /// write of `value`.
    fn invalidates(_resource: &Self::Resource, _value: &Self::Value) -> Vec<Invalidation> {
        Vec::new()
    }
}

/// Cached state to mark stale after a confirmed write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invalidation {
    Key(ResourceKey),
    /// Every cached resource of a collection.
    Collection(&'static str),
}

/// Moves a counter by one when a boolean flag changes.
pub fn adjust_count(count: &mut u32, was: bool, now: bool) {
    match (was, now) {
        (false, true) => *count = count.saturating_add(1),
        (true, false) => *count = count.saturating_sub(1),
        _ => {}
    }
}

pub(crate) type ReadFn<R> = fn(&R) -> Result<Value, serde_json::Error>;
pub(crate) type WriteFn<R> = fn(&mut R, &Value) -> Result<(), serde_json::Error>;

pub(crate) fn read_erased<F: Flag>(resource: &F::Resource) -> Result<Value, serde_json::Error> {
    serde_json::to_value(F::read(resource))
}

pub(crate) fn write_erased<F: Flag>(
    resource: &mut F::Resource,
    value: &Value,
) -> Result<(), serde_json::Error> {
    let value: F::Value = serde_json::from_value(value.clone())?;
    F::write(resource, &value);
    Ok(())
}
