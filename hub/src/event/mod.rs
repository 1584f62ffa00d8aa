pub mod key;

pub use key::{EventKey, Symbol};

use crate::listener::{IntoListenerResult, Listener};

/// Marker trait for a compile-time event schema.
///
/// A schema has no runtime representation. It only ties a set of [`Event`]
/// types to one [`Hub`](crate::Hub) so the hub refuses events from any other
/// schema at compile time.
///
/// Usually derived:
///
/// ```rust,ignore
/// #[derive(Schema)]
/// struct Chat;
/// ```
pub trait Schema: 'static {}

/// A named event with a fixed payload shape.
///
/// - `Schema`: the schema the event belongs to
/// - `Args`: the tuple delivered to listeners, `()` for events without payload
///
/// Events are normally unit structs declared through the derive macro:
///
/// ```rust,ignore
/// #[derive(Event)]
/// #[event(schema = Chat, args = (String, u32), name = "message")]
/// struct Message;
/// ```
///
/// Implement the trait by hand when the key is only known at runtime, for
/// instance one event type covering several numbered channels:
///
/// ```rust,ignore
/// struct Channel(i64);
///
/// impl Event for Channel {
///     type Schema = Chat;
///     type Args = (String,);
///
///     fn key(&self) -> EventKey {
///         EventKey::Index(self.0)
///     }
/// }
/// ```
pub trait Event: 'static {
    type Schema: Schema;
    type Args: 'static;

    /// The runtime name this event is stored under.
    fn key(&self) -> EventKey;

    /// Builds a listener whose parameter type matches this event's payload.
    fn listener<F, R>(f: F) -> Listener<Self::Args>
    where
        Self: Sized,
        F: Fn(&Self::Args) -> R + 'static,
        R: IntoListenerResult,
    {
        Listener::new(f)
    }
}
