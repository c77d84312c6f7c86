//! Containers - data and actions for one displayed resource.
//!
//! A container owns the optimistic store of its resource and exposes a typed
//! props record for presentation. Presentation never sees the cache, the
//! remote or the store; it renders props and calls container actions.
//!
//! ```ignore
//! let card = PostCard::load(&ctx, "p1").await?.expect("loaded");
//! render(card.props()?);
//! card.react(Some(Reaction::Like)).await?;
//! render(card.props()?); // confirmed or reverted
//! ```

mod company;
mod job;
mod post;

pub use company::{CompanyHeader, CompanyProps};
pub use job::{JobCard, JobPending, JobProps};
pub use post::{PostCard, PostPending, PostProps};

use crate::cache::{FetchState, ResourceCache};
use crate::error::AppError;
use crate::optimistic::StoreHandle;
use crate::remote::Remote;
use crate::resource::Resource;
use crate::session::AppContext;

/// Create the store of a freshly mounted container.
fn mount<R: Resource, C: ResourceCache, X: Remote>(
    ctx: &AppContext<C, X>,
    resource: R,
) -> StoreHandle<R> {
    log::debug!("mounting {}", resource.key());
    StoreHandle::initialize(resource, ctx.config().reconcile.pending_policy)
}

/// Load a resource for a container. `None` while another load is in flight.
async fn load<R: Resource, C: ResourceCache, X: Remote>(
    ctx: &AppContext<C, X>,
    id: &str,
) -> Result<Option<R>, AppError> {
    match ctx.query().load::<R>(id).await {
        FetchState::Ready(snapshot) => Ok(Some(snapshot.data)),
        FetchState::Loading => Ok(None),
        FetchState::Failed(err) => Err(err.into()),
    }
}
