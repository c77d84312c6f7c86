//! Domain resources and the flags a viewer can change on them.
//!
//! | Resource | Flags |
//! |---|---|
//! | [`Post`] | [`PostReaction`], [`PostSaved`], [`PostReposted`], [`PostReported`], [`PostAuthorFollowed`] |
//! | [`Job`] | [`JobSaved`], [`JobReported`], [`JobApplied`] |
//! | [`Company`] | [`CompanyFollowed`] |
//! | [`Profile`] | none; edited through [`ProfileForm`](crate::forms::ProfileForm) |

mod company;
mod job;
mod post;
mod profile;

pub use company::{Company, CompanyFollowed};
pub use job::{Job, JobApplied, JobReported, JobSaved};
pub use post::{
    Post, PostAuthorFollowed, PostReaction, PostReported, PostReposted, PostSaved, Reaction,
};
pub use profile::Profile;

use crate::remote::RemoteRequest;

/// `POST endpoint` when turning a flag on, `DELETE endpoint` when turning it off.
pub(crate) fn toggle_request(endpoint: String, on: bool) -> RemoteRequest {
    if on {
        RemoteRequest::post(endpoint)
    } else {
        RemoteRequest::delete(endpoint)
    }
}
