#![forbid(unsafe_code)]

//! Bind configuration: reset policy, per-call overrides, effective config.
//!
//! Every bind call resolves a [`BindConfig`] exactly once by merging the
//! binder's defaults with the caller's [`BindOptions`], field by field. The
//! resolved config is immutable for the lifetime of the binding.
//!
//! # Invariants
//!
//! 1. Resolution is a pure merge: an override wins for the fields it
//!    specifies, defaults fill the rest. No side effects, no failure modes.
//! 2. `BindConfig::default()` is the documented baseline:
//!    [`default_serialize`] / [`Reset::Clear`] / `wait = false`.
//! 3. A [`Reset`] value never mutates anything by itself; it is interpreted
//!    by the teardown handle that receives it.

use std::fmt;
use std::rc::Rc;

use crate::snapshot::{SerializeFn, Snapshot, default_serialize};
use crate::value::{LocalValue, Value};

// ---------------------------------------------------------------------------
// Reset policy
// ---------------------------------------------------------------------------

/// What happens to a local property when its binding is torn down.
#[derive(Clone)]
pub enum Reset {
    /// Leave the property at its last value.
    Keep,
    /// Restore the mode default: `Null` for an item, empty for a list.
    Clear,
    /// Replace the property with a literal value.
    Value(Value),
    /// Replace the property with the producer's output, computed at
    /// teardown time.
    With(Rc<dyn Fn() -> Value>),
}

impl Reset {
    /// Build a producer reset from a closure.
    #[must_use]
    pub fn with(producer: impl Fn() -> Value + 'static) -> Self {
        Self::With(Rc::new(producer))
    }

    #[must_use]
    pub fn is_with(&self) -> bool {
        matches!(self, Self::With(_))
    }

    /// Apply this policy to a local container. [`Reset::Keep`] is a no-op;
    /// literal and produced values re-derive the container tag from their
    /// shape (see [`LocalValue::assign`]).
    pub fn apply(&self, local: &mut LocalValue) {
        match self {
            Self::Keep => {}
            Self::Clear => local.clear(),
            Self::Value(value) => local.assign(value.clone()),
            Self::With(producer) => local.assign(producer()),
        }
    }
}

impl fmt::Debug for Reset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Keep => f.write_str("Keep"),
            Self::Clear => f.write_str("Clear"),
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::With(_) => f.write_str("With(..)"),
        }
    }
}

// ---------------------------------------------------------------------------
// Per-call overrides and effective configuration
// ---------------------------------------------------------------------------

/// Per-call overrides for a bind. Unset fields fall back to the binder's
/// defaults at resolution time.
#[derive(Clone, Default)]
pub struct BindOptions {
    pub serialize: Option<Rc<SerializeFn>>,
    pub reset: Option<Reset>,
    pub wait: Option<bool>,
}

impl BindOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn serialize(mut self, serialize: impl Fn(&Snapshot) -> Value + 'static) -> Self {
        self.serialize = Some(Rc::new(serialize));
        self
    }

    #[must_use]
    pub fn reset(mut self, reset: Reset) -> Self {
        self.reset = Some(reset);
        self
    }

    #[must_use]
    pub fn wait(mut self, wait: bool) -> Self {
        self.wait = Some(wait);
        self
    }
}

impl fmt::Debug for BindOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindOptions")
            .field("serialize", &self.serialize.as_ref().map(|_| "fn"))
            .field("reset", &self.reset)
            .field("wait", &self.wait)
            .finish()
    }
}

/// Effective configuration, resolved once per bind call.
///
/// `wait = true` means the local property is not mutated until the binding's
/// engine resolves its initial snapshot; the old value is retained during
/// the transition instead of being eagerly reset.
#[derive(Clone)]
pub struct BindConfig {
    pub serialize: Rc<SerializeFn>,
    pub reset: Reset,
    pub wait: bool,
}

impl Default for BindConfig {
    fn default() -> Self {
        Self {
            serialize: Rc::new(default_serialize),
            reset: Reset::Clear,
            wait: false,
        }
    }
}

impl BindConfig {
    /// Merge `defaults` with `overrides`, override winning field by field.
    #[must_use]
    pub fn resolve(defaults: &Self, overrides: &BindOptions) -> Self {
        Self {
            serialize: overrides
                .serialize
                .clone()
                .unwrap_or_else(|| Rc::clone(&defaults.serialize)),
            reset: overrides.reset.clone().unwrap_or_else(|| defaults.reset.clone()),
            wait: overrides.wait.unwrap_or(defaults.wait),
        }
    }
}

impl fmt::Debug for BindConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindConfig")
            .field("reset", &self.reset)
            .field("wait", &self.wait)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
