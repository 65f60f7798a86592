#![forbid(unsafe_code)]

//! The per-component binding service.
//!
//! A [`Binder`] is constructed once per component instance, owns that
//! instance's [`BindingRegistry`], and exposes the public bind/unbind entry
//! points plus the read-only canonical-reference projection. The host
//! framework's lifecycle hooks call into it; nothing is injected into the
//! component's own namespace.
//!
//! # Invariants
//!
//! 1. Rebinding a key releases the prior detach handle strictly before the
//!    new engine attach, inside the same synchronous call.
//! 2. The binding mode is read once per bind, from the local property's
//!    pre-existing tag — never from the source.
//! 3. Once [`Binder::destroy`] begins, no further binds are accepted.
//! 4. Keys are independent: teardown of one never touches another.
//!
//! # Failure Modes
//!
//! - Engine cannot establish the subscription: the returned ticket rejects;
//!   the registry entry stays until unbind/rebind/destroy (the engine owns
//!   retry policy, this layer has none).
//! - Detach handle panics during teardown: propagates to the caller; the
//!   registry was already purged of the key, so the binder stays consistent.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tether_core::{
    BindConfig, BindError, BindOptions, EngineCtx, JsonOps, Mode, MutationOps, Reset, SharedStore,
    Source, SourceRef, SyncEngine, SyncTicket, ticket,
};

use crate::rebind::teardown_reset;
use crate::registry::BindingRegistry;

/// Lifetime phase of a binder.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Phase {
    /// Accepting binds; the registry is live.
    Active,
    /// Destruction has begun or completed; binds are rejected.
    Destroyed,
}

/// Binding orchestration for one component instance.
pub struct Binder {
    store: SharedStore,
    engine: Rc<dyn SyncEngine>,
    ops: Rc<dyn MutationOps>,
    defaults: BindConfig,
    registry: RefCell<BindingRegistry>,
    phase: Cell<Phase>,
}

impl Binder {
    /// Create a binder over a component's property store. The registry
    /// starts empty; defaults are [`BindConfig::default`] and mutations go
    /// through [`JsonOps`].
    #[must_use]
    pub fn new(store: SharedStore, engine: Rc<dyn SyncEngine>) -> Self {
        Self {
            store,
            engine,
            ops: Rc::new(JsonOps),
            defaults: BindConfig::default(),
            registry: RefCell::new(BindingRegistry::new()),
            phase: Cell::new(Phase::Active),
        }
    }

    /// Replace the global default configuration applied to every bind.
    #[must_use]
    pub fn with_defaults(mut self, defaults: BindConfig) -> Self {
        self.defaults = defaults;
        self
    }

    /// Replace the mutation-ops adapter handed to engines.
    #[must_use]
    pub fn with_ops(mut self, ops: Rc<dyn MutationOps>) -> Self {
        self.ops = ops;
        self
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase.get()
    }

    /// Bind `key` to `source`.
    ///
    /// If `key` is already bound, the prior binding is torn down first with
    /// the reset computed by [`teardown_reset`] from the new effective
    /// configuration. The local property's tag is then read once to select
    /// the engine entry point, and the new entry is recorded before this
    /// returns. The ticket settles when the engine delivers its first stable
    /// snapshot, or rejects on an unrecoverable synchronization error.
    pub fn bind(
        &self,
        key: &str,
        source: Source,
        overrides: &BindOptions,
    ) -> Result<SyncTicket, BindError> {
        if self.phase.get() == Phase::Destroyed {
            return Err(BindError::Destroyed);
        }
        let config = BindConfig::resolve(&self.defaults, overrides);

        let prior = self.registry.borrow_mut().remove(key);
        if let Some((prior_source, prior_detach)) = prior {
            let reset = teardown_reset(&config);
            tracing::trace!(
                key,
                prior = %prior_source.canonical_ref(),
                reset = ?reset,
                "rebind: tearing down prior binding"
            );
            prior_detach.release(&reset);
        }

        let mode = {
            let store = self.store.borrow();
            match store.get(key) {
                Some(local) => local.mode(),
                None => return Err(BindError::UnknownProperty(key.to_owned())),
            }
        };
        tracing::debug!(key, source = %source, mode = ?mode, "bind");

        let (ticket, settler) = ticket();
        let ctx = EngineCtx {
            store: Rc::clone(&self.store),
            key: key.to_owned(),
            source: source.clone(),
            settler,
            ops: Rc::clone(&self.ops),
            config,
        };
        let detach = match mode {
            Mode::Item => self.engine.attach_item(ctx),
            Mode::List => self.engine.attach_list(ctx),
        };
        self.registry.borrow_mut().insert(key, source, detach);
        Ok(ticket)
    }

    /// Tear down the binding for `key`, releasing its detach handle with
    /// `reset` (`None` leaves the property at its last value). The key is
    /// purged from the registry before the handle runs.
    pub fn unbind(&self, key: &str, reset: Option<Reset>) -> Result<(), BindError> {
        let removed = self.registry.borrow_mut().remove(key);
        let Some((source, detach)) = removed else {
            return Err(BindError::NotBound(key.to_owned()));
        };
        tracing::debug!(key, source = %source, "unbind");
        detach.release(&reset.unwrap_or(Reset::Keep));
        Ok(())
    }

    /// Tear down every binding and stop accepting new ones. Handles are
    /// released with [`Reset::Keep`] — properties keep their last value.
    /// Idempotent; the second call is a no-op.
    pub fn destroy(&self) {
        if self.phase.get() == Phase::Destroyed {
            return;
        }
        self.phase.set(Phase::Destroyed);

        let handles = self.registry.borrow_mut().drain();
        tracing::debug!(bindings = handles.len(), "destroying binder");
        for (key, detach) in handles {
            tracing::trace!(key = %key, "releasing binding");
            detach.release(&Reset::Keep);
        }
    }

    /// Whether `key` is currently bound.
    #[must_use]
    pub fn is_bound(&self, key: &str) -> bool {
        self.registry.borrow().contains(key)
    }

    /// Number of currently bound keys.
    #[must_use]
    pub fn binding_count(&self) -> usize {
        self.registry.borrow().len()
    }

    /// Canonical reference for one bound key.
    #[must_use]
    pub fn source_ref(&self, key: &str) -> Option<SourceRef> {
        self.registry.borrow().source_ref(key).cloned()
    }

    /// Read-only projection of canonical references for all bound keys,
    /// sorted by key for stable iteration.
    #[must_use]
    pub fn refs(&self) -> Vec<(String, SourceRef)> {
        let registry = self.registry.borrow();
        let mut refs: Vec<_> = registry
            .refs()
            .map(|(key, sref)| (key.to_owned(), sref.clone()))
            .collect();
        refs.sort_by(|a, b| a.0.cmp(&b.0));
        refs
    }

    /// The shared property store this binder mutates through its engines.
    #[must_use]
    pub fn store(&self) -> &SharedStore {
        &self.store
    }
}

impl std::fmt::Debug for Binder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binder")
            .field("phase", &self.phase.get())
            .field("bound", &self.registry.borrow().len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tether_core::LocalValue;
    use tether_harness::{EngineEvent, FakeEngine, ResetKind, store_with};

    use super::*;

    fn binder_with(engine: &FakeEngine, entries: Vec<(&'static str, LocalValue)>) -> Binder {
        Binder::new(store_with(entries), Rc::new(engine.clone()))
    }

    #[test]
    fn bind_unknown_property_is_a_precondition_violation() {
        let engine = FakeEngine::new();
        let binder = binder_with(&engine, vec![]);
        let err = binder
            .bind("ghost", Source::reference("x"), &BindOptions::new())
            .unwrap_err();
        assert_eq!(err, BindError::UnknownProperty("ghost".into()));
        assert_eq!(engine.attach_count(), 0, "no engine attach on violation");
    }

    #[test]
    fn mode_dispatch_follows_local_tag() {
        let engine = FakeEngine::new();
        let binder = binder_with(
            &engine,
            vec![("items", LocalValue::list()), ("profile", LocalValue::item())],
        );

        binder
            .bind("items", Source::query("rooms/1/items"), &BindOptions::new())
            .expect("list bind");
        binder
            .bind("profile", Source::reference("users/ada"), &BindOptions::new())
            .expect("item bind");

        let modes: Vec<_> = engine
            .events()
            .into_iter()
            .filter_map(|event| match event {
                EngineEvent::Attach { key, mode, .. } => Some((key, mode)),
                _ => None,
            })
            .collect();
        assert_eq!(
            modes,
            vec![("items".into(), Mode::List), ("profile".into(), Mode::Item)]
        );
    }

    #[test]
    fn bind_records_registry_entry_synchronously() {
        let engine = FakeEngine::new();
        let binder = binder_with(&engine, vec![("items", LocalValue::list())]);

        let ticket = binder
            .bind("items", Source::query("rooms/1/items"), &BindOptions::new())
            .expect("bind");
        assert!(!ticket.is_settled(), "settlement is the engine's call");
        assert!(binder.is_bound("items"));
        assert_eq!(
            binder.source_ref("items").map(|sref| sref.to_string()),
            Some("rooms/1/items".to_owned())
        );
    }

    #[test]
    fn unbind_never_bound_key_errors() {
        let engine = FakeEngine::new();
        let binder = binder_with(&engine, vec![("items", LocalValue::list())]);
        assert_eq!(
            binder.unbind("items", None),
            Err(BindError::NotBound("items".into()))
        );
    }

    #[test]
    fn unbind_releases_with_given_reset_and_purges() {
        let engine = FakeEngine::new();
        let binder = binder_with(
            &engine,
            vec![("profile", LocalValue::Item(json!({"name": "Ada"})))],
        );
        binder
            .bind("profile", Source::reference("users/ada"), &BindOptions::new())
            .expect("bind");

        binder
            .unbind("profile", Some(Reset::Value(json!("offline"))))
            .expect("unbind");
        assert!(!binder.is_bound("profile"));
        assert!(binder.source_ref("profile").is_none());
        assert_eq!(
            engine.events().last(),
            Some(&EngineEvent::Release {
                key: "profile".into(),
                reset: ResetKind::Value(json!("offline")),
            })
        );
        assert_eq!(
            binder.store().borrow().get("profile"),
            Some(&LocalValue::Item(json!("offline")))
        );
    }

    #[test]
    fn destroy_rejects_further_binds() {
        let engine = FakeEngine::new();
        let binder = binder_with(&engine, vec![("items", LocalValue::list())]);
        binder.destroy();
        assert_eq!(binder.phase(), Phase::Destroyed);
        let err = binder
            .bind("items", Source::query("x"), &BindOptions::new())
            .unwrap_err();
        assert_eq!(err, BindError::Destroyed);
    }

    #[test]
    fn destroy_is_idempotent() {
        let engine = FakeEngine::new();
        let binder = binder_with(&engine, vec![("items", LocalValue::list())]);
        binder
            .bind("items", Source::query("rooms/1/items"), &BindOptions::new())
            .expect("bind");

        binder.destroy();
        binder.destroy();
        let releases = engine
            .events()
            .into_iter()
            .filter(|event| matches!(event, EngineEvent::Release { .. }))
            .count();
        assert_eq!(releases, 1);
        assert_eq!(binder.binding_count(), 0);
    }
}
