#![forbid(unsafe_code)]

//! The sanctioned mutation surface for synchronization engines.
//!
//! Engines never touch a bound property directly: every local mutation goes
//! through a [`MutationOps`] adapter, which gives the host a single seam to
//! make mutations visible to its reactivity mechanism. [`JsonOps`] is the
//! stock adapter for `serde_json::Value` containers.
//!
//! # Invariants
//!
//! 1. `set` with an empty path replaces the whole container.
//! 2. `set` creates missing intermediate objects; a non-object intermediate
//!    is replaced by an object (last write wins).
//! 3. `insert` clamps the index to the sequence length (an out-of-range
//!    insert appends).
//! 4. `remove` requires a valid index; engines own their indices.

use serde_json::{Map, Value};

/// Primitive mutation operations against a bound property's current value.
pub trait MutationOps {
    /// Point-set `value` at a `/`-separated `path` inside `container`.
    fn set(&self, container: &mut Value, path: &str, value: Value);

    /// Insert `value` at `index` in an ordered sequence.
    fn insert(&self, sequence: &mut Vec<Value>, index: usize, value: Value);

    /// Remove and return the element at `index` in an ordered sequence.
    fn remove(&self, sequence: &mut Vec<Value>, index: usize) -> Value;
}

/// Stock adapter over `serde_json::Value` containers.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonOps;

impl MutationOps for JsonOps {
    fn set(&self, container: &mut Value, path: &str, value: Value) {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let Some((last, body)) = segments.split_last() else {
            *container = value;
            return;
        };

        let mut current = container;
        for segment in body {
            if !current.is_object() {
                *current = Value::Object(Map::new());
            }
            current = current
                .as_object_mut()
                .expect("object ensured above")
                .entry(*segment)
                .or_insert(Value::Null);
        }
        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        current
            .as_object_mut()
            .expect("object ensured above")
            .insert((*last).to_owned(), value);
    }

    fn insert(&self, sequence: &mut Vec<Value>, index: usize, value: Value) {
        let index = index.min(sequence.len());
        sequence.insert(index, value);
    }

    fn remove(&self, sequence: &mut Vec<Value>, index: usize) -> Value {
        assert!(
            index < sequence.len(),
            "remove index {index} out of bounds (len {})",
            sequence.len()
        );
        sequence.remove(index)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
