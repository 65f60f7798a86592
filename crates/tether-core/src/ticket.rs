#![forbid(unsafe_code)]

//! Single-threaded settlement primitive.
//!
//! [`ticket`] creates a connected pair: the [`Ticket`] a bind call hands back
//! to its caller, and the [`Settler`] the synchronization engine uses to
//! settle it from an event-delivery continuation. Nothing blocks; callbacks
//! registered with [`Ticket::on_settle`] run on the settling call's stack.
//!
//! # Invariants
//!
//! 1. A pair settles at most once; after the first [`Settler::resolve`] or
//!    [`Settler::reject`], later settlement calls are no-ops.
//! 2. Callbacks registered before settlement fire in registration order,
//!    exactly once each, during the settling call.
//! 3. Callbacks registered after settlement fire immediately with the stored
//!    outcome.
//! 4. No `RefCell` borrow is held while a callback runs, so callbacks may
//!    freely inspect or register against the same ticket.
//!
//! # Failure Modes
//!
//! - Callback panic: propagates to whoever triggered settlement (typically
//!   the engine's delivery continuation); remaining callbacks do not run.
//! - All tickets dropped: settlement still records the outcome; it is simply
//!   unobserved.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Observable settlement state of a [`Ticket`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SettleState {
    Pending,
    Resolved,
    Rejected,
}

type Callback<T, E> = Box<dyn FnOnce(&Result<T, E>)>;

struct Shared<T, E> {
    outcome: Option<Rc<Result<T, E>>>,
    callbacks: Vec<Callback<T, E>>,
}

/// Caller-side half of a settlement pair.
pub struct Ticket<T, E> {
    shared: Rc<RefCell<Shared<T, E>>>,
}

/// Engine-side half of a settlement pair.
pub struct Settler<T, E> {
    shared: Rc<RefCell<Shared<T, E>>>,
}

/// Create a connected `(Ticket, Settler)` pair.
#[must_use]
pub fn ticket<T: 'static, E: 'static>() -> (Ticket<T, E>, Settler<T, E>) {
    let shared = Rc::new(RefCell::new(Shared {
        outcome: None,
        callbacks: Vec::new(),
    }));
    (
        Ticket {
            shared: Rc::clone(&shared),
        },
        Settler { shared },
    )
}

impl<T: 'static, E: 'static> Ticket<T, E> {
    #[must_use]
    pub fn state(&self) -> SettleState {
        match self.shared.borrow().outcome.as_deref() {
            None => SettleState::Pending,
            Some(Ok(_)) => SettleState::Resolved,
            Some(Err(_)) => SettleState::Rejected,
        }
    }

    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.state() != SettleState::Pending
    }

    /// Clone out the outcome, if settled.
    #[must_use]
    pub fn outcome(&self) -> Option<Result<T, E>>
    where
        T: Clone,
        E: Clone,
    {
        self.shared
            .borrow()
            .outcome
            .as_deref()
            .map(|outcome| outcome.as_ref().map(T::clone).map_err(E::clone))
    }

    /// Run `callback` when the pair settles. If it already has, the callback
    /// runs immediately with the stored outcome.
    pub fn on_settle(&self, callback: impl FnOnce(&Result<T, E>) + 'static) {
        {
            let mut shared = self.shared.borrow_mut();
            if shared.outcome.is_none() {
                shared.callbacks.push(Box::new(callback));
                return;
            }
        }
        let outcome = {
            let shared = self.shared.borrow();
            Rc::clone(shared.outcome.as_ref().expect("checked settled above"))
        };
        callback(&outcome);
    }
}

impl<T: 'static, E: 'static> Settler<T, E> {
    /// Settle with a success outcome. A no-op if the pair already settled.
    pub fn resolve(&self, value: T) {
        self.settle(Ok(value));
    }

    /// Settle with a failure outcome. A no-op if the pair already settled.
    pub fn reject(&self, error: E) {
        self.settle(Err(error));
    }

    fn settle(&self, outcome: Result<T, E>) {
        let (outcome, callbacks) = {
            let mut shared = self.shared.borrow_mut();
            if shared.outcome.is_some() {
                return;
            }
            let outcome = Rc::new(outcome);
            shared.outcome = Some(Rc::clone(&outcome));
            (outcome, std::mem::take(&mut shared.callbacks))
        };
        for callback in callbacks {
            callback(&outcome);
        }
    }
}

impl<T, E> Clone for Ticket<T, E> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<T, E> Clone for Settler<T, E> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<T: 'static, E: 'static> fmt::Debug for Ticket<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ticket").field("state", &self.state()).finish()
    }
}

impl<T, E> fmt::Debug for Settler<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settler").finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
