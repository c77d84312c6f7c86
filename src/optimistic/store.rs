use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use serde_json::Value;

use super::flag::{read_erased, write_erased, Flag, ReadFn, WriteFn};
use super::policy::{
    MutationOutcome, PendingPolicy, Phase, PhaseEvent, PolicyError, Reconciliation,
};
use crate::resource::{Resource, ResourceKey};

/// Error type for optimistic store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    LockPoisoned(&'static str),
    /// A mutation for this flag is still in flight and the policy ignores new actions.
    MutationPending { key: ResourceKey, flag: &'static str },
    /// The requested value is already displayed.
    Unchanged { key: ResourceKey, flag: &'static str },
    /// The owning component has been unmounted.
    Unmounted(ResourceKey),
    /// No action was ever applied to this flag.
    UnknownFlag { key: ResourceKey, flag: &'static str },
    /// A ticket or snapshot for another resource was handed to this store.
    KeyMismatch {
        expected: ResourceKey,
        actual: ResourceKey,
    },
    Policy(PolicyError),
    Serde(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::LockPoisoned(operation) => {
                write!(f, "optimistic store lock poisoned during {}", operation)
            }
            StoreError::MutationPending { key, flag } => {
                write!(f, "mutation already pending for {} on {}", flag, key)
            }
            StoreError::Unchanged { key, flag } => {
                write!(f, "{} on {} already has the requested value", flag, key)
            }
            StoreError::Unmounted(key) => write!(f, "store for {} is unmounted", key),
            StoreError::UnknownFlag { key, flag } => {
                write!(f, "no state for flag {} on {}", flag, key)
            }
            StoreError::KeyMismatch { expected, actual } => {
                write!(f, "key mismatch (expected {}, got {})", expected, actual)
            }
            StoreError::Policy(err) => write!(f, "reconciliation policy: {}", err),
            StoreError::Serde(msg) => write!(f, "flag value serialization error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<PolicyError> for StoreError {
    fn from(err: PolicyError) -> Self {
        StoreError::Policy(err)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serde(err.to_string())
    }
}

/// Receipt for one optimistic action, handed back on reconciliation.
///
/// The generation orders actions on the same store; only the newest
/// generation of a flag may change what is displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    key: ResourceKey,
    flag: &'static str,
    generation: u64,
}

impl Ticket {
    pub fn key(&self) -> &ResourceKey {
        &self.key
    }

    pub fn flag(&self) -> &'static str {
        self.flag
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Per-flag bookkeeping. The typed read/write functions are captured when the
/// flag is first touched so the store can restore values without knowing `F`.
struct FlagSlot<R> {
    phase: Phase,
    /// Generation of the newest action.
    generation: u64,
    /// Last-known-good value.
    confirmed: Value,
    confirmed_generation: u64,
    in_flight: Vec<(u64, Value)>,
    read: ReadFn<R>,
    write: WriteFn<R>,
}

impl<R> FlagSlot<R> {
    fn take_in_flight(&mut self, generation: u64) -> Option<Value> {
        let index = self.in_flight.iter().position(|(g, _)| *g == generation)?;
        Some(self.in_flight.remove(index).1)
    }

    fn latest_in_flight(&self) -> Option<&Value> {
        self.in_flight
            .iter()
            .find(|(g, _)| *g == self.generation)
            .map(|(_, value)| value)
    }
}

/// Transient, per-viewer state of one displayed resource.
///
/// Holds the last server snapshot, the displayed view (snapshot plus
/// optimistic overlays), and one state machine per flag.
pub struct OptimisticStore<R: Resource> {
    key: ResourceKey,
    snapshot: R,
    view: R,
    slots: HashMap<&'static str, FlagSlot<R>>,
    policy: PendingPolicy,
    next_generation: u64,
    mounted: bool,
    error: Option<String>,
}

impl<R: Resource> OptimisticStore<R> {
    /// Derive the initial state from a resource snapshot. Pure: the same
    /// snapshot always yields the same state.
    pub fn initialize(resource: R, policy: PendingPolicy) -> Self {
        Self {
            key: resource.key(),
            view: resource.clone(),
            snapshot: resource,
            slots: HashMap::new(),
            policy,
            next_generation: 0,
            mounted: true,
            error: None,
        }
    }

    pub fn key(&self) -> &ResourceKey {
        &self.key
    }

    /// Last server-confirmed snapshot.
    pub fn snapshot(&self) -> &R {
        &self.snapshot
    }

    /// The resource as it should be displayed right now.
    pub fn view(&self) -> &R {
        &self.view
    }

    pub fn policy(&self) -> PendingPolicy {
        self.policy
    }

    /// Current (possibly optimistic) value of a flag.
    pub fn value<F: Flag<Resource = R>>(&self) -> F::Value {
        F::read(&self.view)
    }

    /// Last-known-good value of a flag.
    pub fn confirmed<F: Flag<Resource = R>>(&self) -> Result<F::Value, StoreError> {
        match self.slots.get(F::NAME) {
            Some(slot) => Ok(serde_json::from_value(slot.confirmed.clone())?),
            None => Ok(F::read(&self.snapshot)),
        }
    }

    pub fn phase<F: Flag<Resource = R>>(&self) -> Phase {
        self.phase_of(F::NAME)
    }

    /// Phase of a flag by name.
    pub fn phase_of(&self, flag: &str) -> Phase {
        self.slots
            .get(flag)
            .map(|slot| slot.phase)
            .unwrap_or_default()
    }

    pub fn is_pending<F: Flag<Resource = R>>(&self) -> bool {
        self.phase::<F>().is_pending()
    }

    /// Whether any flag on this resource has a mutation outstanding.
    pub fn any_pending(&self) -> bool {
        self.slots.values().any(|slot| slot.phase.is_pending())
    }

    /// Error from the most recent reverted mutation, if not yet taken.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Take the error message for one-shot display.
    pub fn take_error(&mut self) -> Option<String> {
        self.error.take()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Stop accepting actions and reconciliation results.
    pub fn unmount(&mut self) {
        self.mounted = false;
    }

    /// Set a flag immediately, before any network confirmation.
    ///
    /// Returns the ticket to reconcile once the matching mutation resolves.
    pub fn apply_optimistic<F: Flag<Resource = R>>(
        &mut self,
        value: F::Value,
    ) -> Result<Ticket, StoreError> {
        if !self.mounted {
            return Err(StoreError::Unmounted(self.key.clone()));
        }

        let current = F::read(&self.view);
        let slot = self.slots.entry(F::NAME).or_insert_with(|| FlagSlot {
            phase: Phase::Idle,
            generation: 0,
            confirmed: Value::Null,
            confirmed_generation: 0,
            in_flight: Vec::new(),
            read: read_erased::<F>,
            write: write_erased::<F>,
        });

        if slot.phase.is_pending() && self.policy == PendingPolicy::Ignore {
            return Err(StoreError::MutationPending {
                key: self.key.clone(),
                flag: F::NAME,
            });
        }
        if current == value {
            return Err(StoreError::Unchanged {
                key: self.key.clone(),
                flag: F::NAME,
            });
        }

        if slot.phase == Phase::Idle {
            slot.confirmed = serde_json::to_value(&current)?;
        }
        let encoded = serde_json::to_value(&value)?;
        slot.phase = slot.phase.next(PhaseEvent::Act)?;

        self.next_generation += 1;
        let generation = self.next_generation;
        slot.generation = generation;
        slot.in_flight.push((generation, encoded));
        F::write(&mut self.view, &value);

        Ok(Ticket {
            key: self.key.clone(),
            flag: F::NAME,
            generation,
        })
    }

    /// Record that the mutation for `ticket` has been sent.
    pub fn mark_sent(&mut self, ticket: &Ticket) -> Result<(), StoreError> {
        self.check_key(&ticket.key)?;
        let slot = self.slot_mut(ticket.flag)?;
        if ticket.generation == slot.generation && slot.phase == Phase::OptimisticallySet {
            slot.phase = slot.phase.next(PhaseEvent::Send)?;
        }
        Ok(())
    }

    /// Apply the outcome of the mutation behind `ticket`.
    ///
    /// On success the optimistic value stands and the caller must invalidate
    /// the owning resource. On failure the flag (and its side effects) is
    /// restored to the last-known-good value and the error is recorded.
    /// Outcomes of superseded actions never touch the displayed value.
    pub fn reconcile(
        &mut self,
        ticket: &Ticket,
        outcome: &MutationOutcome,
    ) -> Result<Reconciliation, StoreError> {
        self.check_key(&ticket.key)?;
        if !self.mounted {
            return Ok(Reconciliation::Discarded);
        }

        let key = self.key.clone();
        let slot = self
            .slots
            .get_mut(ticket.flag)
            .ok_or_else(|| StoreError::UnknownFlag {
                key: key.clone(),
                flag: ticket.flag,
            })?;

        let superseded = Reconciliation::Superseded {
            flag: ticket.flag,
            generation: ticket.generation,
        };
        let Some(value) = slot.take_in_flight(ticket.generation) else {
            return Ok(superseded);
        };

        if ticket.generation != slot.generation {
            if outcome.is_success() && ticket.generation > slot.confirmed_generation {
                slot.confirmed = value;
                slot.confirmed_generation = ticket.generation;
            }
            return Ok(superseded);
        }

        if slot.phase == Phase::OptimisticallySet {
            slot.phase = slot.phase.next(PhaseEvent::Send)?;
        }

        match outcome {
            MutationOutcome::Success => {
                slot.phase = slot.phase.next(PhaseEvent::Succeed)?;
                slot.confirmed = value;
                slot.confirmed_generation = ticket.generation;
                Ok(Reconciliation::Confirmed { key })
            }
            MutationOutcome::Failure(message) => {
                slot.phase = slot.phase.next(PhaseEvent::Fail)?;
                (slot.write)(&mut self.view, &slot.confirmed)?;
                slot.phase = slot.phase.next(PhaseEvent::Restored)?;
                self.error = Some(message.clone());
                Ok(Reconciliation::Reverted {
                    key,
                    flag: ticket.flag,
                    message: message.clone(),
                })
            }
        }
    }

    /// Withdraw the action behind `ticket` when its outcome will never be
    /// known. The newest action restores the last-known-good value without
    /// recording an error; an older one is simply forgotten.
    ///
    /// Returns whether the displayed value changed.
    pub fn cancel(&mut self, ticket: &Ticket) -> Result<bool, StoreError> {
        self.check_key(&ticket.key)?;
        if !self.mounted {
            return Ok(false);
        }

        let key = self.key.clone();
        let slot = self
            .slots
            .get_mut(ticket.flag)
            .ok_or(StoreError::UnknownFlag {
                key,
                flag: ticket.flag,
            })?;
        if slot.take_in_flight(ticket.generation).is_none()
            || ticket.generation != slot.generation
        {
            return Ok(false);
        }

        if slot.phase == Phase::OptimisticallySet {
            slot.phase = slot.phase.next(PhaseEvent::Send)?;
        }
        slot.phase = slot.phase.next(PhaseEvent::Fail)?;
        (slot.write)(&mut self.view, &slot.confirmed)?;
        slot.phase = slot.phase.next(PhaseEvent::Restored)?;
        Ok(true)
    }

    /// Replace the baseline with a freshly fetched snapshot.
    ///
    /// The refetch wins for idle flags; flags with an outstanding action keep
    /// their optimistic value on top of the new snapshot.
    pub fn refresh(&mut self, snapshot: R) -> Result<(), StoreError> {
        self.check_key(&snapshot.key())?;
        if !self.mounted {
            return Err(StoreError::Unmounted(self.key.clone()));
        }

        let mut view = snapshot.clone();
        for slot in self.slots.values_mut() {
            slot.confirmed = (slot.read)(&snapshot)?;
            if slot.phase.is_pending() {
                if let Some(latest) = slot.latest_in_flight() {
                    (slot.write)(&mut view, latest)?;
                }
            }
        }
        self.view = view;
        self.snapshot = snapshot;
        Ok(())
    }

    fn check_key(&self, key: &ResourceKey) -> Result<(), StoreError> {
        if *key == self.key {
            Ok(())
        } else {
            Err(StoreError::KeyMismatch {
                expected: self.key.clone(),
                actual: key.clone(),
            })
        }
    }

    fn slot_mut(&mut self, flag: &'static str) -> Result<&mut FlagSlot<R>, StoreError> {
        let key = &self.key;
        self.slots
            .get_mut(flag)
            .ok_or_else(|| StoreError::UnknownFlag {
                key: key.clone(),
                flag,
            })
    }
}

/// Shared handle to an [`OptimisticStore`], owned by the displaying component.
///
/// In-flight mutations hold only a [`WeakStore`], so dropping every handle
/// releases the state and late results are discarded.
pub struct StoreHandle<R: Resource> {
    inner: Arc<Mutex<OptimisticStore<R>>>,
}

impl<R: Resource> Clone for StoreHandle<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: Resource> StoreHandle<R> {
    pub fn new(store: OptimisticStore<R>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    pub fn initialize(resource: R, policy: PendingPolicy) -> Self {
        Self::new(OptimisticStore::initialize(resource, policy))
    }

    fn lock(&self) -> Result<MutexGuard<'_, OptimisticStore<R>>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::LockPoisoned("store"))
    }

    /// Run `f` with exclusive access to the store.
    pub fn with<T>(
        &self,
        f: impl FnOnce(&mut OptimisticStore<R>) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut store = self.lock()?;
        f(&mut store)
    }

    /// Run `f` with read access to the store.
    pub fn read<T>(&self, f: impl FnOnce(&OptimisticStore<R>) -> T) -> Result<T, StoreError> {
        let store = self.lock()?;
        Ok(f(&store))
    }

    pub fn key(&self) -> Result<ResourceKey, StoreError> {
        self.read(|store| store.key().clone())
    }

    pub fn view(&self) -> Result<R, StoreError> {
        self.read(|store| store.view().clone())
    }

    pub fn value<F: Flag<Resource = R>>(&self) -> Result<F::Value, StoreError> {
        self.read(|store| store.value::<F>())
    }

    pub fn phase<F: Flag<Resource = R>>(&self) -> Result<Phase, StoreError> {
        self.read(|store| store.phase::<F>())
    }

    pub fn take_error(&self) -> Result<Option<String>, StoreError> {
        self.with(|store| Ok(store.take_error()))
    }

    pub fn refresh(&self, snapshot: R) -> Result<(), StoreError> {
        self.with(|store| store.refresh(snapshot))
    }

    pub fn unmount(&self) -> Result<(), StoreError> {
        self.with(|store| {
            store.unmount();
            Ok(())
        })
    }

    pub fn downgrade(&self) -> WeakStore<R> {
        WeakStore {
            inner: Arc::downgrade(&self.inner),
        }
    }
}

/// Non-owning reference held by in-flight mutations.
pub struct WeakStore<R: Resource> {
    inner: Weak<Mutex<OptimisticStore<R>>>,
}

impl<R: Resource> Clone for WeakStore<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<R: Resource> WeakStore<R> {
    pub fn upgrade(&self) -> Option<StoreHandle<R>> {
        self.inner.upgrade().map(|inner| StoreHandle { inner })
    }

    /// Reconcile if the store is still alive; otherwise `Discarded`.
    pub fn reconcile(
        &self,
        ticket: &Ticket,
        outcome: &MutationOutcome,
    ) -> Result<Reconciliation, StoreError> {
        match self.upgrade() {
            Some(store) => store.with(|store| store.reconcile(ticket, outcome)),
            None => Ok(Reconciliation::Discarded),
        }
    }
}
