use crate::event::EventKey;

/// Failure raised by a listener.
///
/// Anything implementing `std::error::Error + Send + Sync` converts into it
/// with `?`, including `anyhow::Error`.
pub type ListenerError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A listener failed. The dispatch pass stopped at that listener.
    #[error(transparent)]
    Listener(ListenerError),

    /// A typed listener was handed a payload of another type through the
    /// untyped [`Emitter`](crate::Emitter).
    #[error("listener for `{event}` expected a payload of type `{expected}`")]
    PayloadMismatch {
        event: EventKey,
        expected: &'static str,
    },
}

impl Error {
    /// Returns the listener's own error, if this is a listener failure.
    pub fn listener_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Error::Listener(err) => Some(&**err),
            Error::PayloadMismatch { .. } => None,
        }
    }
}
