#![forbid(unsafe_code)]

//! Foundation types for Tether: live data binding for component UIs.
//!
//! This crate defines the vocabulary shared by the Tether runtime and by
//! synchronization engines:
//!
//! - [`LocalValue`] / [`PropertyStore`]: the component-side containers a
//!   binding keeps in sync with a remote source.
//! - [`Source`] / [`SourceRef`]: opaque handles to remote values and ordered
//!   queries, with a canonical reference for display and debugging.
//! - [`Reset`] / [`BindOptions`] / [`BindConfig`]: the teardown policy and the
//!   per-call configuration surface.
//! - [`ticket`]: the single-threaded settlement pair connecting a bind call
//!   to the engine's first stable snapshot.
//! - [`MutationOps`] / [`JsonOps`]: the only sanctioned mutation surface a
//!   synchronization engine may use against a bound property.
//! - [`SyncEngine`] / [`EngineCtx`] / [`Detach`]: the engine contract and the
//!   single-release teardown token.
//!
//! The orchestration itself (binding registry, rebind policy, component
//! lifecycle) lives in `tether-runtime`.

pub mod engine;
pub mod error;
pub mod ops;
pub mod options;
pub mod snapshot;
pub mod source;
pub mod ticket;
pub mod value;

pub use engine::{Detach, EngineCtx, SyncEngine, SyncSettler, SyncTicket};
pub use error::{BindError, SyncError};
pub use ops::{JsonOps, MutationOps};
pub use options::{BindConfig, BindOptions, Reset};
pub use snapshot::{KEY_FIELD, SerializeFn, Snapshot, default_serialize};
pub use source::{OrderBy, Source, SourceRef};
pub use ticket::{SettleState, Settler, Ticket, ticket};
pub use value::{LocalValue, Mode, PropertyStore, SharedStore, Value, shared};
