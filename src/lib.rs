// Lets the Resource derive refer to `optimistic_rust::Resource` inside this crate.
extern crate self as optimistic_rust;

pub mod cache;
pub mod config;
pub mod domain;
pub mod error;
pub mod feed;
pub mod forms;
pub mod mutation;
pub mod notify;
pub mod optimistic;
pub mod reconciler;
pub mod remote;
pub mod resource;
pub mod session;
pub mod view;

pub use cache::{
    CacheEntry, CacheError, CacheEvent, CacheEventKind, FetchError, FetchState,
    InMemoryResourceCache, Query, ResourceCache,
};
pub use config::{AppConfig, ClientConfig, ConfigError, ReconcileConfig};
pub use error::{AppError, ErrorKind};
pub use feed::{Feed, FeedError, Page};
pub use forms::{submit, Form, FormError, ValidationErrors, Validator};
pub use mutation::{Mutation, MutationError, MutationStatus};
pub use notify::{LogNotifier, Notifier, Toast, ToastBuffer, ToastLevel};
pub use optimistic::{
    adjust_count, Flag, Invalidation, MutationOutcome, OptimisticStore, PendingPolicy, Phase,
    PhaseEvent, PolicyError, Reconciliation, StoreError, StoreHandle, Ticket, WeakStore,
};
pub use reconciler::{InFlight, Reconciler};
pub use remote::{InMemoryRemote, Method, Remote, RemoteError, RemoteRequest};
#[cfg(feature = "http")]
pub use remote::HttpRemote;
pub use resource::{Resource, ResourceKey, Versioned};
pub use session::{AppContext, Session, Theme};
