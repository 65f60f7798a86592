#![forbid(unsafe_code)]

//! Error types for the binding layer.
//!
//! Two distinct failure families, surfaced through different channels:
//! [`BindError`] for precondition violations and lifecycle misuse (returned
//! immediately from the orchestration entry points) and [`SyncError`] for
//! synchronization failures (reported by an engine through ticket
//! rejection). The orchestration layer never retries either.

use thiserror::Error;

use crate::source::SourceRef;

/// Precondition violations and lifecycle misuse at the bind/unbind entry
/// points. Programming errors; there is no recovery path.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum BindError {
    /// The key names no declared local property, so no mode can be selected.
    #[error("no local property named `{0}` to bind")]
    UnknownProperty(String),
    /// Unbind was called for a key that is not bound.
    #[error("property `{0}` is not bound")]
    NotBound(String),
    /// Destruction has begun; no further binds are accepted.
    #[error("binder is destroyed")]
    Destroyed,
}

/// A synchronization engine could not establish or maintain its
/// subscription.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum SyncError {
    #[error("permission denied for {reference}")]
    PermissionDenied { reference: SourceRef },
    #[error("malformed query against {reference}: {detail}")]
    MalformedQuery { reference: SourceRef, detail: String },
    #[error("connection to the remote store was lost")]
    ConnectionLost,
    /// Engine-specific failure with no dedicated variant.
    #[error("{0}")]
    Engine(String),
}
