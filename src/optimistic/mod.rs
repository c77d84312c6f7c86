//! Optimistic state - per-entity flags that change before the server confirms.
//!
//! A displayed resource gets an [`OptimisticStore`] derived from its last
//! snapshot. User actions set flags immediately through
//! [`OptimisticStore::apply_optimistic`]; each action yields a [`Ticket`]
//! that is later reconciled against the mutation outcome:
//!
//! - success: the value stands and the resource is invalidated in the cache,
//! - failure: the flag reverts to its last-known-good value and an error is
//!   recorded for one-shot display,
//! - superseded or unmounted: nothing displayed changes.
//!
//! ## Example
//!
//! ```ignore
//! let mut store = OptimisticStore::initialize(company, PendingPolicy::Ignore);
//! let ticket = store.apply_optimistic::<CompanyFollowed>(true)?;
//! store.mark_sent(&ticket)?;
//! // ... remote call resolves ...
//! match store.reconcile(&ticket, &MutationOutcome::Success)? {
//!     Reconciliation::Confirmed { key } => cache.invalidate(&key)?,
//!     _ => {}
//! }
//! ```

mod flag;
mod policy;
mod store;

pub use flag::{adjust_count, Flag, Invalidation};
pub use policy::{
    MutationOutcome, PendingPolicy, Phase, PhaseEvent, PolicyError, Reconciliation,
};
pub use store::{OptimisticStore, StoreError, StoreHandle, Ticket, WeakStore};
