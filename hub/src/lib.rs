//! Type-checked, synchronous, in-process event hub.
//!
//! Callers declare a [`Schema`] and one [`Event`] type per event name, then
//! register [`Listener`]s on a [`Hub`] and [`emit`](Hub::emit) payloads to
//! them. Payload and listener types are checked against the schema at compile
//! time; storage underneath is the untyped [`Emitter`].
//!
//! Dispatch is synchronous and runs on the caller's stack. See the
//! [`emitter`] module for the ordering, once and re-entrancy rules.

// Lets `::typed_hub::...` paths generated by the derive macros resolve inside
// this crate too.
extern crate self as typed_hub;

pub mod config;
pub mod emitter;
pub mod error;
pub mod event;
pub mod hub;
pub mod listener;

pub use config::HubConfig;
pub use emitter::Emitter;
pub use error::{Error, ListenerError, Result};
pub use event::{Event, EventKey, Schema, Symbol};
pub use hub::Hub;
pub use listener::{IntoListenerResult, Listener, ListenerId, RawListener};

pub use typed_hub_macros::{Event, Schema};
