#![forbid(unsafe_code)]

//! Test doubles and fixtures for Tether crates.
//!
//! The centerpiece is [`FakeEngine`], a scripted synchronization engine that
//! records every attach, release, and settlement in an ordered event log and
//! leaves settlement timing to the test. Its detach handles honor the real
//! engine contract: they apply the received reset to the bound property and
//! stop all further mutation for that attachment.
//!
//! # Usage
//!
//! ```ignore
//! let engine = FakeEngine::new();
//! let store = store_with([("items", LocalValue::list())]);
//! let binder = Binder::new(Rc::clone(&store), Rc::new(engine.clone()));
//!
//! let ticket = binder.bind("items", Source::query("rooms/1/items"), &BindOptions::new())?;
//! engine.resolve_with("items", json!([{"body": "hi"}]));
//! assert!(ticket.is_settled());
//! ```

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tether_core::{
    BindConfig, Detach, EngineCtx, LocalValue, Mode, MutationOps, PropertyStore, Reset,
    SharedStore, Snapshot, Source, SyncEngine, SyncError, SyncSettler, Value, shared,
};

// ---------------------------------------------------------------------------
// Event log
// ---------------------------------------------------------------------------

/// Comparable summary of a [`Reset`], for event-log assertions.
#[derive(Clone, Debug, PartialEq)]
pub enum ResetKind {
    Keep,
    Clear,
    Value(Value),
    With,
}

impl ResetKind {
    #[must_use]
    pub fn of(reset: &Reset) -> Self {
        match reset {
            Reset::Keep => Self::Keep,
            Reset::Clear => Self::Clear,
            Reset::Value(value) => Self::Value(value.clone()),
            Reset::With(_) => Self::With,
        }
    }
}

/// One entry in the fake engine's ordered event log.
#[derive(Clone, Debug, PartialEq)]
pub enum EngineEvent {
    Attach {
        key: String,
        mode: Mode,
        reference: String,
    },
    Release {
        key: String,
        reset: ResetKind,
    },
    Resolve {
        key: String,
    },
    Reject {
        key: String,
    },
}

// ---------------------------------------------------------------------------
// FakeEngine
// ---------------------------------------------------------------------------

struct Attachment {
    key: String,
    source: Source,
    settler: SyncSettler,
    store: SharedStore,
    ops: Rc<dyn MutationOps>,
    config: BindConfig,
    mode: Mode,
    alive: Rc<Cell<bool>>,
}

#[derive(Default)]
struct Inner {
    events: Vec<EngineEvent>,
    attachments: Vec<Attachment>,
}

/// Scripted synchronization engine with manual settlement control.
///
/// Clones share the same event log and attachment table, so a test can keep
/// one clone and hand another to the binder.
#[derive(Clone, Default)]
pub struct FakeEngine {
    inner: Rc<RefCell<Inner>>,
}

impl FakeEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the ordered event log.
    #[must_use]
    pub fn events(&self) -> Vec<EngineEvent> {
        self.inner.borrow().events.clone()
    }

    /// Total attachments ever made (released ones included).
    #[must_use]
    pub fn attach_count(&self) -> usize {
        self.inner.borrow().attachments.len()
    }

    /// Attachments whose detach handle has not been released.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.inner
            .borrow()
            .attachments
            .iter()
            .filter(|attachment| attachment.alive.get())
            .count()
    }

    /// Whether `key` currently has a live attachment.
    #[must_use]
    pub fn is_live(&self, key: &str) -> bool {
        self.inner
            .borrow()
            .attachments
            .iter()
            .any(|attachment| attachment.key == key && attachment.alive.get())
    }

    /// Deliver the initial snapshot for `key`'s latest live attachment:
    /// mutate the bound property through the attachment's mutation ops, then
    /// resolve its ticket.
    ///
    /// # Panics
    ///
    /// Panics if `key` has no live attachment, or if a list-mode delivery is
    /// not an array.
    pub fn resolve_with(&self, key: &str, value: Value) {
        tracing::trace!(key, "fake engine delivering snapshot");
        let (settler, snapshot) = {
            let mut inner = self.inner.borrow_mut();
            let attachment = inner
                .attachments
                .iter()
                .rev()
                .find(|attachment| attachment.key == key && attachment.alive.get())
                .unwrap_or_else(|| panic!("no live attachment for `{key}`"));

            let snapshot = Snapshot::new(attachment.source.canonical_ref(), value);
            let serialized = (attachment.config.serialize)(&snapshot);

            let mut store = attachment.store.borrow_mut();
            let local = store
                .get_mut(&attachment.key)
                .unwrap_or_else(|| panic!("property `{key}` vanished from the store"));
            match attachment.mode {
                Mode::Item => {
                    let container = local
                        .as_item_mut()
                        .unwrap_or_else(|| panic!("attachment for `{key}` expected an item"));
                    attachment.ops.set(container, "", serialized);
                }
                Mode::List => {
                    let Value::Array(elements) = serialized else {
                        panic!("list delivery for `{key}` requires an array snapshot");
                    };
                    let sequence = local
                        .as_list_mut()
                        .unwrap_or_else(|| panic!("attachment for `{key}` expected a list"));
                    sequence.clear();
                    for (index, element) in elements.into_iter().enumerate() {
                        attachment.ops.insert(sequence, index, element);
                    }
                }
            }
            drop(store);

            let settler = attachment.settler.clone();
            inner.events.push(EngineEvent::Resolve { key: key.to_owned() });
            (settler, snapshot)
        };
        settler.resolve(snapshot);
    }

    /// Reject `key`'s latest live attachment without touching the property.
    ///
    /// # Panics
    ///
    /// Panics if `key` has no live attachment.
    pub fn reject_with(&self, key: &str, error: SyncError) {
        let settler = {
            let mut inner = self.inner.borrow_mut();
            let settler = inner
                .attachments
                .iter()
                .rev()
                .find(|attachment| attachment.key == key && attachment.alive.get())
                .map(|attachment| attachment.settler.clone())
                .unwrap_or_else(|| panic!("no live attachment for `{key}`"));
            inner.events.push(EngineEvent::Reject { key: key.to_owned() });
            settler
        };
        settler.reject(error);
    }

    fn attach(&self, mode: Mode, ctx: EngineCtx) -> Detach {
        let EngineCtx {
            store,
            key,
            source,
            settler,
            ops,
            config,
        } = ctx;
        let alive = Rc::new(Cell::new(true));
        {
            let mut inner = self.inner.borrow_mut();
            inner.events.push(EngineEvent::Attach {
                key: key.clone(),
                mode,
                reference: source.canonical_ref().to_string(),
            });
            inner.attachments.push(Attachment {
                key: key.clone(),
                source,
                settler,
                store: Rc::clone(&store),
                ops,
                config,
                mode,
                alive: Rc::clone(&alive),
            });
        }

        let log = Rc::clone(&self.inner);
        Detach::new(move |reset| {
            alive.set(false);
            if let Some(local) = store.borrow_mut().get_mut(&key) {
                reset.apply(local);
            }
            log.borrow_mut().events.push(EngineEvent::Release {
                key,
                reset: ResetKind::of(reset),
            });
        })
    }
}

impl SyncEngine for FakeEngine {
    fn attach_item(&self, ctx: EngineCtx) -> Detach {
        self.attach(Mode::Item, ctx)
    }

    fn attach_list(&self, ctx: EngineCtx) -> Detach {
        self.attach(Mode::List, ctx)
    }
}

// ---------------------------------------------------------------------------
// Store fixtures
// ---------------------------------------------------------------------------

/// An empty shared property store.
#[must_use]
pub fn empty_store() -> SharedStore {
    shared(PropertyStore::new())
}

/// A shared property store pre-declared with `entries`.
#[must_use]
pub fn store_with<'a>(entries: impl IntoIterator<Item = (&'a str, LocalValue)>) -> SharedStore {
    let mut store = PropertyStore::new();
    for (key, value) in entries {
        store.declare(key, value);
    }
    shared(store)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
