//! Listener handles.
//!
//! A [`Listener<A>`] is a shared callable taking `&A`. Each constructed
//! listener draws a fresh [`ListenerId`] that is never handed out again:
//! clones of a listener are the same listener, two listeners built from equal
//! closures are not. Identity is what [`Hub::off`](crate::Hub::off) matches on.
//!
//! The emitter stores listeners in their erased form, [`RawListener`], which
//! takes the payload as `&dyn Any`. Converting a typed listener to a raw one
//! keeps its [`ListenerId`] and remembers the typed original, so the hub can
//! hand the same typed handle back from [`Hub::listeners`](crate::Hub::listeners).

use std::{
    any::{Any, type_name},
    fmt,
    rc::Rc,
    sync::atomic::{AtomicU64, Ordering},
};

use crate::{
    error::{Error, ListenerError, Result},
    event::EventKey,
};

/// Conversion of a listener's return value into the dispatch outcome.
///
/// Implemented for `()` (infallible listeners) and for `Result<(), E>` with
/// any error convertible into [`ListenerError`].
pub trait IntoListenerResult {
    fn into_listener_result(self) -> std::result::Result<(), ListenerError>;
}

impl IntoListenerResult for () {
    #[inline]
    fn into_listener_result(self) -> std::result::Result<(), ListenerError> {
        Ok(())
    }
}

impl<E: Into<ListenerError>> IntoListenerResult for std::result::Result<(), E> {
    #[inline]
    fn into_listener_result(self) -> std::result::Result<(), ListenerError> {
        self.map_err(Into::into)
    }
}

/// Source of ids for [`ListenerId::next`].
static NEXT_LISTENER: AtomicU64 = AtomicU64::new(0);

/// Identity of a listener, stable across clones and never reused.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ListenerId(u64);

impl ListenerId {
    fn next() -> Self {
        Self(NEXT_LISTENER.fetch_add(1, Ordering::Relaxed))
    }
}

type TypedCallback<A> = dyn Fn(&A) -> std::result::Result<(), ListenerError>;
type RawCallback = dyn Fn(&dyn Any) -> Result<()>;

/// A typed listener for payloads of type `A`.
pub struct Listener<A: 'static> {
    id: ListenerId,
    callback: Rc<TypedCallback<A>>,
}

impl<A: 'static> Listener<A> {
    /// Wraps a closure.
    ///
    /// The closure may return `()` or a `Result<(), E>`; an `Err` stops the
    /// dispatch pass and is returned from `emit`.
    pub fn new<F, R>(f: F) -> Self
    where
        F: Fn(&A) -> R + 'static,
        R: IntoListenerResult,
    {
        Self {
            id: ListenerId::next(),
            callback: Rc::new(move |args: &A| f(args).into_listener_result()),
        }
    }

    /// Recovers a typed listener from its erased form.
    ///
    /// Returns the original handle when `raw` was built from a `Listener<A>`.
    /// Otherwise the raw listener is wrapped, keeping its identity.
    pub fn from_raw(raw: &RawListener) -> Self {
        if let Some(typed) = raw.origin::<A>() {
            return typed.clone();
        }

        let raw = raw.clone();
        let id = raw.id();
        Self {
            id,
            callback: Rc::new(move |args: &A| match raw.call(args) {
                Ok(()) => Ok(()),
                // Hand the listener's own error back unchanged
                Err(Error::Listener(err)) => Err(err),
                Err(err) => Err(ListenerError::from(err)),
            }),
        }
    }

    #[inline]
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Invokes the listener directly, outside of any dispatch.
    pub fn call(&self, args: &A) -> std::result::Result<(), ListenerError> {
        (self.callback)(args)
    }

    /// Erases the payload type so the listener can live in an
    /// [`Emitter`](crate::Emitter) table under `event`.
    pub fn to_raw(&self, event: &EventKey) -> RawListener {
        let typed = self.clone();
        let event = event.clone();
        RawListener {
            id: self.id,
            callback: Rc::new(move |payload: &dyn Any| match payload.downcast_ref::<A>() {
                Some(args) => typed.call(args).map_err(Error::Listener),
                None => Err(Error::PayloadMismatch {
                    event: event.clone(),
                    expected: type_name::<A>(),
                }),
            }),
            origin: Some(Rc::new(self.clone())),
        }
    }
}

impl<A: 'static> Clone for Listener<A> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            callback: Rc::clone(&self.callback),
        }
    }
}

impl<A: 'static> PartialEq for Listener<A> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<A: 'static> Eq for Listener<A> {}

impl<A: 'static> fmt::Debug for Listener<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("id", &self.id)
            .field("args", &type_name::<A>())
            .finish()
    }
}

/// A listener with its payload type erased.
#[derive(Clone)]
pub struct RawListener {
    id: ListenerId,
    callback: Rc<RawCallback>,
    /// The typed listener this one was erased from, if any.
    origin: Option<Rc<dyn Any>>,
}

impl RawListener {
    /// Wraps a closure over an erased payload.
    pub fn new<F, R>(f: F) -> Self
    where
        F: Fn(&dyn Any) -> R + 'static,
        R: IntoListenerResult,
    {
        Self {
            id: ListenerId::next(),
            callback: Rc::new(move |payload: &dyn Any| {
                f(payload).into_listener_result().map_err(Error::Listener)
            }),
            origin: None,
        }
    }

    #[inline]
    pub fn id(&self) -> ListenerId {
        self.id
    }

    pub fn call(&self, payload: &dyn Any) -> Result<()> {
        (self.callback)(payload)
    }

    fn origin<A: 'static>(&self) -> Option<&Listener<A>> {
        self.origin.as_ref()?.downcast_ref::<Listener<A>>()
    }
}

impl PartialEq for RawListener {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for RawListener {}

impl fmt::Debug for RawListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawListener")
            .field("id", &self.id)
            .field("typed", &self.origin.is_some())
            .finish()
    }
}
