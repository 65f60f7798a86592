#![forbid(unsafe_code)]

//! The synchronization-engine contract.
//!
//! Engines are external collaborators: they subscribe to a [`Source`] and
//! mirror it into the bound local property, using only the [`MutationOps`]
//! surface handed to them. The orchestration layer consumes them through
//! [`SyncEngine`] and owns the returned [`Detach`] token.
//!
//! # Invariants
//!
//! 1. An engine guarantees at most one outstanding subscription per returned
//!    [`Detach`], and stops all further local mutation once it is released.
//! 2. [`Detach::release`] consumes the token: exactly one release, exactly
//!    once, enforced by ownership transfer.
//! 3. A [`Detach`] dropped without an explicit release still runs its
//!    teardown, with [`Reset::Keep`] (the property is left untouched).
//! 4. Releasing a detach does not guarantee the pending settlement never
//!    fires; the engine owns settlement timing.

use std::fmt;
use std::rc::Rc;

use crate::error::SyncError;
use crate::ops::MutationOps;
use crate::options::{BindConfig, Reset};
use crate::snapshot::Snapshot;
use crate::source::Source;
use crate::ticket::{Settler, Ticket};
use crate::value::SharedStore;

/// Caller-side settlement handle for a bind's first stable snapshot.
pub type SyncTicket = Ticket<Snapshot, SyncError>;

/// Engine-side settlement handle for a bind's first stable snapshot.
pub type SyncSettler = Settler<Snapshot, SyncError>;

/// Everything an engine needs to establish one subscription.
pub struct EngineCtx {
    /// The component's property store; the engine mutates only `key`.
    pub store: SharedStore,
    /// The bound property's name.
    pub key: String,
    /// The remote source to mirror.
    pub source: Source,
    /// Settled with the first stable snapshot, or the failure that prevented
    /// one.
    pub settler: SyncSettler,
    /// The only sanctioned mutation surface for the bound property.
    pub ops: Rc<dyn MutationOps>,
    /// Effective configuration for this binding.
    pub config: BindConfig,
}

impl fmt::Debug for EngineCtx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineCtx")
            .field("key", &self.key)
            .field("source", &self.source)
            .field("config", &self.config)
            .finish()
    }
}

/// A synchronization engine: one entry point per binding mode.
pub trait SyncEngine {
    /// Subscribe `ctx.key` (a single-value target) to `ctx.source`.
    fn attach_item(&self, ctx: EngineCtx) -> Detach;

    /// Subscribe `ctx.key` (an ordered-collection target) to `ctx.source`.
    fn attach_list(&self, ctx: EngineCtx) -> Detach;
}

/// Teardown token for one established subscription.
///
/// The teardown closure receives the [`Reset`] to apply to the local
/// property and is responsible for detaching the remote listener.
pub struct Detach {
    teardown: Option<Box<dyn FnOnce(&Reset)>>,
}

impl Detach {
    #[must_use]
    pub fn new(teardown: impl FnOnce(&Reset) + 'static) -> Self {
        Self {
            teardown: Some(Box::new(teardown)),
        }
    }

    /// A token with no teardown work.
    #[must_use]
    pub fn noop() -> Self {
        Self { teardown: None }
    }

    /// Release the subscription, applying `reset` to the local property.
    pub fn release(mut self, reset: &Reset) {
        if let Some(teardown) = self.teardown.take() {
            teardown(reset);
        }
    }
}

impl Drop for Detach {
    fn drop(&mut self) {
        if let Some(teardown) = self.teardown.take() {
            teardown(&Reset::Keep);
        }
    }
}

impl fmt::Debug for Detach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Detach")
            .field("released", &self.teardown.is_none())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
