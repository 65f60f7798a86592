#![forbid(unsafe_code)]

//! Local containers for bound properties.
//!
//! A bound property is a [`LocalValue`]: an explicit tagged choice between a
//! single-value target ([`LocalValue::Item`]) and an ordered-collection
//! target ([`LocalValue::List`]). The tag is the binding's mode decision —
//! the runtime reads it once, before synchronization starts, and dispatches
//! to the matching engine entry point. Callers initialize the property to the
//! intended shape before binding; there is no inspection of the remote
//! source's shape.
//!
//! # Invariants
//!
//! 1. [`LocalValue::clear`] preserves the tag: a list clears to an empty
//!    list, an item clears to `Null`.
//! 2. [`LocalValue::assign`] follows the assigned value: arrays become
//!    lists, everything else becomes an item. A literal reset value is the
//!    one place a property's mode may change, and only the caller supplies
//!    those.
//! 3. [`PropertyStore`] never invents keys: lookups on undeclared keys
//!    return `None`.

use std::cell::RefCell;
use std::rc::Rc;

use ahash::AHashMap;

pub use serde_json::Value;

/// Whether a binding targets a single value or an ordered collection.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Mode {
    /// Single addressable value or record.
    Item,
    /// Ordered collection mirrored element-by-element.
    List,
}

/// A component-local container kept in sync by a binding.
#[derive(Clone, Debug, PartialEq)]
pub enum LocalValue {
    /// A single value / record target.
    Item(Value),
    /// An ordered-collection target.
    List(Vec<Value>),
}

impl LocalValue {
    /// An empty single-value target (`Null`).
    #[must_use]
    pub fn item() -> Self {
        Self::Item(Value::Null)
    }

    /// An empty ordered-collection target.
    #[must_use]
    pub fn list() -> Self {
        Self::List(Vec::new())
    }

    /// Wrap a raw value, deriving the tag from its shape: arrays become
    /// lists, everything else an item.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Array(items) => Self::List(items),
            other => Self::Item(other),
        }
    }

    /// The binding mode this container selects.
    #[must_use]
    pub fn mode(&self) -> Mode {
        match self {
            Self::Item(_) => Mode::Item,
            Self::List(_) => Mode::List,
        }
    }

    #[must_use]
    pub fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    #[must_use]
    pub fn as_item(&self) -> Option<&Value> {
        match self {
            Self::Item(value) => Some(value),
            Self::List(_) => None,
        }
    }

    #[must_use]
    pub fn as_item_mut(&mut self) -> Option<&mut Value> {
        match self {
            Self::Item(value) => Some(value),
            Self::List(_) => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            Self::Item(_) => None,
        }
    }

    #[must_use]
    pub fn as_list_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Self::List(items) => Some(items),
            Self::Item(_) => None,
        }
    }

    /// Restore the mode default: `Null` for an item, empty for a list.
    pub fn clear(&mut self) {
        match self {
            Self::Item(value) => *value = Value::Null,
            Self::List(items) => items.clear(),
        }
    }

    /// Replace the container with `value`, re-deriving the tag from its
    /// shape (see [`LocalValue::from_value`]).
    pub fn assign(&mut self, value: Value) {
        *self = Self::from_value(value);
    }
}

/// Keyed storage of a component's bindable properties.
#[derive(Clone, Debug, Default)]
pub struct PropertyStore {
    props: AHashMap<String, LocalValue>,
}

impl PropertyStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare (or replace) a property. Binding a key requires the property
    /// to have been declared with the intended tag beforehand.
    pub fn declare(&mut self, key: impl Into<String>, value: LocalValue) {
        self.props.insert(key.into(), value);
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&LocalValue> {
        self.props.get(key)
    }

    #[must_use]
    pub fn get_mut(&mut self, key: &str) -> Option<&mut LocalValue> {
        self.props.get_mut(key)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.props.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.props.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }

    /// Iterate over declared property names.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.props.keys().map(String::as_str)
    }
}

/// Shared handle to a component's property store.
///
/// Single-threaded shared ownership: the host component and the binder both
/// hold the store through this handle, and synchronization engines receive a
/// clone of it in their attach context.
pub type SharedStore = Rc<RefCell<PropertyStore>>;

/// Wrap a store for shared ownership.
#[must_use]
pub fn shared(store: PropertyStore) -> SharedStore {
    Rc::new(RefCell::new(store))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
