#![forbid(unsafe_code)]

//! Binding orchestration for Tether.
//!
//! This crate turns the `tether-core` vocabulary into a running service: a
//! [`Binder`] per component instance that sequences bind requests, selects
//! the synchronization mode from the local property's tag, tears down a
//! previously active binding before a new one replaces it, and tears down
//! every active binding together when the component goes away.
//!
//! A typical host integration:
//!
//! ```ignore
//! // pre-creation: construct the service over the component's store
//! let binder = Binder::new(store, engine);
//!
//! // creation: mount the component's declarative bindings
//! binder.mount(Some(&Declaration::of(plan! {
//!     "items" => Source::query("rooms/1/items").order_by_key(),
//!     "profile" => Source::reference("users/ada"),
//! })))?;
//!
//! // pre-destruction: tear everything down
//! binder.destroy();
//! ```

pub mod binder;
pub mod lifecycle;
pub mod rebind;
pub mod registry;

pub use binder::{Binder, Phase};
pub use lifecycle::{BindingPlan, Declaration};
pub use rebind::teardown_reset;
pub use registry::BindingRegistry;

pub use tether_core::{
    BindConfig, BindError, BindOptions, Reset, Source, SyncError, SyncTicket,
};
