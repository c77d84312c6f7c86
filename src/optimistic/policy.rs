//! Reconciliation policy: the per-(resource, flag) state machine and the
//! rules for trusting, rolling back, or discarding optimistic values.
//!
//! ```text
//!            Act                Send                Succeed
//!   Idle ──────────▶ Optimistically ──────▶ Confirming ──────────▶ Idle
//!                        Set                    │
//!                                               │ Fail
//!                                               ▼
//!                                           Reverting ──Restored──▶ Idle
//! ```
//!
//! Under [`PendingPolicy::Supersede`] a new `Act` is also accepted while
//! optimistically set or confirming; it returns the machine to
//! `OptimisticallySet` for the newer action.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::resource::ResourceKey;

/// Phase of one (resource, flag) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Phase {
    #[default]
    Idle,
    OptimisticallySet,
    Confirming,
    Reverting,
}

/// Inputs to the phase machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseEvent {
    /// User action; flag flipped locally.
    Act,
    /// Mutation request sent.
    Send,
    /// Remote write confirmed.
    Succeed,
    /// Remote write failed or was rejected.
    Fail,
    /// Pre-action value restored after a failure.
    Restored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyError {
    pub phase: Phase,
    pub event: PhaseEvent,
}

impl fmt::Display for PolicyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "illegal transition {:?} on {:?}", self.phase, self.event)
    }
}

impl std::error::Error for PolicyError {}

impl Phase {
    /// Apply an event, returning the next phase.
    ///
    /// `Act` while a mutation is outstanding is legal here; whether it is
    /// allowed is decided by [`PendingPolicy`] before the machine is driven.
    pub fn next(self, event: PhaseEvent) -> Result<Phase, PolicyError> {
        use Phase::*;
        use PhaseEvent::*;

        match (self, event) {
            (Idle, Act) => Ok(OptimisticallySet),
            (OptimisticallySet, Act) | (Confirming, Act) => Ok(OptimisticallySet),
            (OptimisticallySet, Send) => Ok(Confirming),
            (Confirming, Succeed) => Ok(Idle),
            (Confirming, Fail) => Ok(Reverting),
            (Reverting, Restored) => Ok(Idle),
            (phase, event) => Err(PolicyError { phase, event }),
        }
    }

    /// Whether a mutation for this flag is outstanding.
    pub fn is_pending(self) -> bool {
        matches!(self, Phase::OptimisticallySet | Phase::Confirming)
    }
}

/// What to do with a user action on a flag whose previous mutation has not
/// resolved yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingPolicy {
    /// Reject the new action; exactly one request is in flight per flag.
    #[default]
    Ignore,
    /// Apply the new action and send it; the older response no longer
    /// affects what is displayed.
    Supersede,
}

/// How a mutation resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    Success,
    Failure(String),
}

impl MutationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, MutationOutcome::Success)
    }
}

impl<T, E: fmt::Display> From<&Result<T, E>> for MutationOutcome {
    fn from(result: &Result<T, E>) -> Self {
        match result {
            Ok(_) => MutationOutcome::Success,
            Err(e) => MutationOutcome::Failure(e.to_string()),
        }
    }
}

/// Result of reconciling one resolved mutation against the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    /// The optimistic value stands; the owning resource must be invalidated
    /// so the next read is authoritative.
    Confirmed { key: ResourceKey },
    /// The flag was restored to its last-known-good value.
    Reverted {
        key: ResourceKey,
        flag: &'static str,
        message: String,
    },
    /// A newer action on the same flag owns the displayed value.
    Superseded {
        flag: &'static str,
        generation: u64,
    },
    /// The owning store was unmounted; nothing was applied.
    Discarded,
}

impl Reconciliation {
    /// Key to invalidate, if this reconciliation asks for one.
    pub fn invalidates(&self) -> Option<&ResourceKey> {
        match self {
            Reconciliation::Confirmed { key } => Some(key),
            _ => None,
        }
    }
}
