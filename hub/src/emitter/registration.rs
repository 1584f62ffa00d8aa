//! Entries of the per-event listener sequence.

use std::{cell::Cell, rc::Rc};

use crate::listener::{ListenerId, RawListener};

/// Unique id of one registration within an emitter.
///
/// Two registrations of the same listener share a [`ListenerId`] but never a
/// `RegistrationId`, which lets a fired once-registration remove exactly
/// itself.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) struct RegistrationId(pub(crate) u64);

/// Where a new registration goes in its sequence.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Placement {
    Append,
    Prepend,
}

/// One listener bound to one event name.
///
/// Cloning is cheap and clones share the fired flag, so a dispatch snapshot
/// and the live table agree on whether a once-registration has run.
#[derive(Clone, Debug)]
pub(crate) struct Registration {
    id: RegistrationId,
    listener: RawListener,
    /// `Some` for once-registrations; set when the single invocation starts.
    fired: Option<Rc<Cell<bool>>>,
}

impl Registration {
    pub(crate) fn new(id: RegistrationId, listener: RawListener, once: bool) -> Self {
        Self {
            id,
            listener,
            fired: once.then(|| Rc::new(Cell::new(false))),
        }
    }

    #[inline]
    pub(crate) fn id(&self) -> RegistrationId {
        self.id
    }

    #[inline]
    pub(crate) fn listener(&self) -> &RawListener {
        &self.listener
    }

    #[inline]
    pub(crate) fn listener_id(&self) -> ListenerId {
        self.listener.id()
    }

    #[inline]
    pub(crate) fn is_once(&self) -> bool {
        self.fired.is_some()
    }

    /// Claims the single invocation of a once-registration.
    ///
    /// Returns `true` for persistent registrations and for the first claim of
    /// a once-registration, `false` afterwards.
    pub(crate) fn claim(&self) -> bool {
        match &self.fired {
            Some(fired) => !fired.replace(true),
            None => true,
        }
    }
}
