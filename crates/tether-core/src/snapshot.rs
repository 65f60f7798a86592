#![forbid(unsafe_code)]

//! Remote snapshots and the serialize hook.
//!
//! A [`Snapshot`] is the raw remote datum a synchronization engine delivers:
//! the canonical reference it was read from plus its value. The serialize
//! hook converts a snapshot into the local representation written into the
//! bound property; [`default_serialize`] merges the reference's terminal key
//! into object snapshots under [`KEY_FIELD`] and passes scalars through
//! unchanged, so list elements stay addressable after they land locally.

use serde_json::Value;

use crate::source::SourceRef;

/// Field name the default serializer uses to carry a snapshot's key.
pub const KEY_FIELD: &str = ".key";

/// Raw remote datum delivered by a synchronization engine.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    /// Canonical reference the snapshot was read from.
    pub reference: SourceRef,
    /// The remote value at that reference.
    pub value: Value,
}

impl Snapshot {
    #[must_use]
    pub fn new(reference: SourceRef, value: Value) -> Self {
        Self { reference, value }
    }

    /// The snapshot's key: the terminal segment of its reference.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.reference.key()
    }
}

/// Converts a raw snapshot into the local representation.
pub type SerializeFn = dyn Fn(&Snapshot) -> Value;

/// Default serialize hook.
///
/// Object snapshots gain a [`KEY_FIELD`] entry holding the snapshot's key;
/// everything else is passed through as-is.
#[must_use]
pub fn default_serialize(snapshot: &Snapshot) -> Value {
    match &snapshot.value {
        Value::Object(fields) => {
            let mut out = fields.clone();
            if let Some(key) = snapshot.key() {
                out.insert(KEY_FIELD.to_owned(), Value::String(key.to_owned()));
            }
            Value::Object(out)
        }
        other => other.clone(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
