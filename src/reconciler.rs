//! Reconciler - the one reconciling-mutation path shared by every flag.
//!
//! 1. apply the new flag value to the store, synchronously,
//! 2. send the flag's remote write,
//! 3. reconcile the store with the outcome,
//! 4. on success invalidate the owning resource in the cache, along with
//!    whatever else the flag names in [`Flag::invalidates`],
//! 5. on failure (after the store reverted) show one error toast.
//!
//! [`Reconciler::begin`] performs step 1 eagerly and returns an [`InFlight`]
//! whose [`settle`](InFlight::settle) future performs the rest. The in-flight
//! mutation only holds a weak reference to the store, so a component that
//! unmounts while the request is out is never written to afterwards.
//!
//! Dropping an [`InFlight`] (or its `settle` future) before the outcome is
//! known cancels the action: the flag returns to its last-known-good value
//! and, if the write was already sent, the resource is invalidated.

use crate::cache::{FetchState, Query, ResourceCache};
use crate::config::ReconcileConfig;
use crate::error::AppError;
use crate::mutation::Mutation;
use crate::notify::{Notifier, Toast};
use crate::optimistic::{
    Flag, Invalidation, MutationOutcome, Reconciliation, StoreError, StoreHandle, Ticket,
    WeakStore,
};
use crate::remote::{Remote, RemoteRequest};
use crate::resource::Resource;

pub struct Reconciler<'a, C, X> {
    cache: &'a C,
    remote: &'a X,
    notifier: &'a dyn Notifier,
    config: ReconcileConfig,
}

impl<'a, C: ResourceCache, X: Remote> Reconciler<'a, C, X> {
    pub fn new(
        cache: &'a C,
        remote: &'a X,
        notifier: &'a dyn Notifier,
        config: ReconcileConfig,
    ) -> Self {
        Self {
            cache,
            remote,
            notifier,
            config,
        }
    }

    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    /// Apply `value` to flag `F` now and prepare its remote write.
    ///
    /// Fails without side effects when the store rejects the action (pending
    /// mutation under the ignore policy, unchanged value, unmounted store).
    pub fn begin<F: Flag>(
        &self,
        store: &StoreHandle<F::Resource>,
        value: F::Value,
    ) -> Result<InFlight<'a, F::Resource, C, X>, AppError> {
        let (ticket, request, invalidates) = store.with(|store| {
            let request = F::request(store.view(), &value);
            let mut invalidates = vec![Invalidation::Key(store.key().clone())];
            invalidates.extend(F::invalidates(store.view(), &value));
            let ticket = store.apply_optimistic::<F>(value)?;
            Ok((ticket, request, invalidates))
        })?;
        log::debug!(
            "{} on {} set optimistically (generation {})",
            F::NAME,
            ticket.key(),
            ticket.generation()
        );

        Ok(InFlight {
            ticket,
            request,
            invalidates,
            sent: false,
            settled: false,
            store: store.downgrade(),
            cache: self.cache,
            remote: self.remote,
            notifier: self.notifier,
            config: self.config,
        })
    }

    /// Apply, send and reconcile in one go.
    pub async fn mutate<F: Flag>(
        &self,
        store: &StoreHandle<F::Resource>,
        value: F::Value,
    ) -> Result<Reconciliation, AppError> {
        self.begin::<F>(store, value)?.settle().await
    }

    /// Flip a boolean flag.
    pub async fn toggle<F: Flag<Value = bool>>(
        &self,
        store: &StoreHandle<F::Resource>,
    ) -> Result<Reconciliation, AppError> {
        let current = store.value::<F>()?;
        self.mutate::<F>(store, !current).await
    }

    /// Reload the store's resource through the cache and rebase the store
    /// on it. A stale or missing entry is refetched.
    pub async fn refresh<R: Resource>(
        &self,
        store: &StoreHandle<R>,
    ) -> Result<FetchState<R>, AppError> {
        let key = store.key()?;
        let state = Query::new(self.cache, self.remote).load::<R>(&key.id).await;
        if let FetchState::Ready(snapshot) = &state {
            match store.refresh(snapshot.data.clone()) {
                Ok(()) | Err(StoreError::Unmounted(_)) => {}
                Err(err) => return Err(err.into()),
            }
        }
        Ok(state)
    }
}

/// A mutation whose optimistic value is already displayed.
pub struct InFlight<'a, R: Resource, C: ResourceCache, X: Remote> {
    ticket: Ticket,
    request: RemoteRequest,
    invalidates: Vec<Invalidation>,
    sent: bool,
    settled: bool,
    store: WeakStore<R>,
    cache: &'a C,
    remote: &'a X,
    notifier: &'a dyn Notifier,
    config: ReconcileConfig,
}

impl<'a, R: Resource, C: ResourceCache, X: Remote> InFlight<'a, R, C, X> {
    pub fn ticket(&self) -> &Ticket {
        &self.ticket
    }

    pub fn request(&self) -> &RemoteRequest {
        &self.request
    }

    /// Send the write and reconcile its outcome. Never retried.
    pub async fn settle(mut self) -> Result<Reconciliation, AppError> {
        if let Some(store) = self.store.upgrade() {
            store.with(|store| store.mark_sent(&self.ticket))?;
        }
        self.sent = true;

        let mut mutation = Mutation::new(self.request.clone());
        let outcome = match mutation.execute(self.remote).await {
            Ok(_) => MutationOutcome::Success,
            Err(err) => {
                log::warn!("{}", err);
                MutationOutcome::Failure(err.user_message())
            }
        };
        self.settled = true;

        let reconciliation = self.store.reconcile(&self.ticket, &outcome)?;
        // A confirmed write changed the server even when a newer action now
        // owns the display.
        if outcome.is_success() && self.config.invalidate_on_success {
            self.invalidate()?;
        }
        match (&outcome, &reconciliation) {
            (MutationOutcome::Success, Reconciliation::Superseded { .. }) => {
                log::debug!(
                    "{} generation {} confirmed after being superseded",
                    self.ticket.flag(),
                    self.ticket.generation()
                );
            }
            (MutationOutcome::Success, _) => {}
            (MutationOutcome::Failure(_), Reconciliation::Reverted { key, flag, message }) => {
                log::info!("reverted {} on {}", flag, key);
                if self.config.notify_on_error {
                    self.notifier.notify(Toast::error(message.clone()));
                }
            }
            (MutationOutcome::Failure(message), _) => {
                log::debug!(
                    "dropped failure for {} on {}: {}",
                    self.ticket.flag(),
                    self.ticket.key(),
                    message
                );
            }
        }

        Ok(reconciliation)
    }

    fn invalidate(&self) -> Result<(), AppError> {
        for target in &self.invalidates {
            match target {
                Invalidation::Key(key) => {
                    self.cache.invalidate(key)?;
                }
                Invalidation::Collection(collection) => {
                    let count = self.cache.invalidate_collection(collection)?;
                    log::debug!("invalidated {} cached {}", count, collection);
                }
            }
        }
        Ok(())
    }
}

impl<'a, R: Resource, C: ResourceCache, X: Remote> Drop for InFlight<'a, R, C, X> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }

        if let Some(store) = self.store.upgrade() {
            match store.with(|store| store.cancel(&self.ticket)) {
                Ok(true) => log::info!(
                    "{} on {} cancelled before settling, restored",
                    self.ticket.flag(),
                    self.ticket.key()
                ),
                Ok(false) => {}
                Err(err) => log::error!("cancelling {}: {}", self.ticket.flag(), err),
            }
        }
        // The write may have landed.
        if self.sent {
            if let Err(err) = self.invalidate() {
                log::error!("invalidating after cancel: {}", err);
            }
        }
    }
}
