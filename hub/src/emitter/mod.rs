//! Untyped, synchronous publish/subscribe table.
//!
//! This module provides [`Emitter`], the storage layer beneath
//! [`Hub`](crate::Hub). It maps each [`EventKey`] to an ordered sequence of
//! registrations and knows nothing about payload types: listeners receive the
//! payload as `&dyn Any`.
//!
//! # Dispatch rules
//!
//! - Registrations fire in sequence order. Prepended entries come first, the
//!   most recently prepended one before the others.
//! - [`emit()`](Emitter::emit) works on a snapshot of the sequence taken when
//!   it starts. Listeners added while it runs wait for the next `emit`;
//!   listeners removed while it runs are still visited by this pass.
//! - A once-registration is taken out of the table right before its single
//!   invocation. A nested `emit` of the same event cannot invoke it again.
//! - A listener error ends the pass and is returned from `emit` as is.
//!
//! # Re-entrancy
//!
//! Every method takes `&self`. No internal borrow is held while a listener
//! runs, so listeners may register, remove or emit on the emitter that is
//! calling them.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::any::Any;
//! use typed_hub::{Emitter, EventKey, RawListener};
//!
//! let emitter = Emitter::new();
//! let greet = RawListener::new(|payload: &dyn Any| {
//!     if let Some(name) = payload.downcast_ref::<String>() {
//!         println!("hello {name}");
//!     }
//! });
//!
//! emitter.add_listener(&EventKey::name("greet"), greet);
//! emitter.emit(&EventKey::name("greet"), &String::from("world"))?;
//! ```

mod registration;

use std::{
    any::Any,
    cell::{Cell, RefCell},
    collections::{HashMap, hash_map},
    fmt,
};

use log::{debug, trace, warn};

use crate::{
    config::HubConfig,
    error::Result,
    event::EventKey,
    listener::{ListenerId, RawListener},
};

use registration::{Placement, Registration, RegistrationId};

/// Registrations for one event name.
#[derive(Default)]
struct Sequence {
    registrations: Vec<Registration>,
    /// Set once the leak warning was logged for this sequence.
    warned: bool,
}

/// The registration table.
struct Table {
    sequences: HashMap<EventKey, Sequence>,
    /// Keys with a live sequence, in order of first registration.
    names: Vec<EventKey>,
}

impl Table {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            sequences: HashMap::with_capacity(capacity),
            names: Vec::with_capacity(capacity),
        }
    }

    /// Drops the sequence for `event` if it has no registrations left.
    fn prune(&mut self, event: &EventKey) {
        let empty = self
            .sequences
            .get(event)
            .is_some_and(|sequence| sequence.registrations.is_empty());
        if empty {
            self.sequences.remove(event);
            self.names.retain(|name| name != event);
        }
    }
}

/// Dynamic event emitter.
///
/// Registration methods return `&Self` so calls can be chained:
///
/// ```rust,ignore
/// emitter
///     .add_listener(&key, first)
///     .prepend_once_listener(&key, second);
/// ```
///
/// # Thread Safety
///
/// `Emitter` is neither `Send` nor `Sync`. Listeners are reference counted
/// and the table lives in a `RefCell`; dispatch always happens on the calling
/// thread.
pub struct Emitter {
    table: RefCell<Table>,
    max_listeners: Cell<Option<usize>>,
    next_registration: Cell<u64>,
}

impl Emitter {
    /// Creates an emitter with the default [`HubConfig`].
    pub fn new() -> Self {
        Self::with_config(HubConfig::default())
    }

    pub fn with_config(config: HubConfig) -> Self {
        Self {
            table: RefCell::new(Table::with_capacity(config.capacity)),
            max_listeners: Cell::new(config.max_listeners),
            next_registration: Cell::new(0),
        }
    }

    // ==================== Dispatch ====================

    /// Invokes every registration for `event` with `payload`.
    ///
    /// Returns `Ok(true)` if the event had listeners when dispatch began,
    /// `Ok(false)` otherwise. The first listener error stops the pass and is
    /// returned unchanged; later listeners are not invoked.
    ///
    /// No payload validation happens here: typed listeners check the payload
    /// type themselves and fail with
    /// [`Error::PayloadMismatch`](crate::Error::PayloadMismatch).
    pub fn emit(&self, event: &EventKey, payload: &dyn Any) -> Result<bool> {
        let snapshot = match self.table.borrow().sequences.get(event) {
            Some(sequence) => sequence.registrations.clone(),
            None => {
                trace!("emit `{event}`: no listeners");
                return Ok(false);
            }
        };

        trace!("emit `{event}` to {} listener(s)", snapshot.len());
        for registration in &snapshot {
            if !registration.claim() {
                // Already fired by a nested emit
                continue;
            }
            if registration.is_once() {
                self.detach(event, registration.id());
            }
            registration.listener().call(payload)?;
        }

        Ok(true)
    }

    // ==================== Registration ====================

    /// Appends a persistent registration.
    pub fn add_listener(&self, event: &EventKey, listener: RawListener) -> &Self {
        self.insert(event, listener, Placement::Append, false);
        self
    }

    /// Alias of [`add_listener()`](Self::add_listener).
    pub fn on(&self, event: &EventKey, listener: RawListener) -> &Self {
        self.add_listener(event, listener)
    }

    /// Appends a registration that fires at most once.
    pub fn once(&self, event: &EventKey, listener: RawListener) -> &Self {
        self.insert(event, listener, Placement::Append, true);
        self
    }

    /// Inserts a persistent registration at the front.
    pub fn prepend_listener(&self, event: &EventKey, listener: RawListener) -> &Self {
        self.insert(event, listener, Placement::Prepend, false);
        self
    }

    /// Inserts a registration that fires at most once at the front.
    pub fn prepend_once_listener(&self, event: &EventKey, listener: RawListener) -> &Self {
        self.insert(event, listener, Placement::Prepend, true);
        self
    }

    // ==================== Removal ====================

    /// Removes the earliest registration of `listener` for `event`.
    ///
    /// Persistent and once-registrations are treated alike. Does nothing if
    /// the listener is not registered.
    pub fn remove_listener(&self, event: &EventKey, listener: ListenerId) -> &Self {
        let mut table = self.table.borrow_mut();
        let removed = table.sequences.get_mut(event).and_then(|sequence| {
            let index = sequence
                .registrations
                .iter()
                .position(|registration| registration.listener_id() == listener)?;
            Some(sequence.registrations.remove(index))
        });

        if removed.is_some() {
            table.prune(event);
            debug!("removed listener {listener:?} from `{event}`");
        }
        self
    }

    /// Alias of [`remove_listener()`](Self::remove_listener).
    pub fn off(&self, event: &EventKey, listener: ListenerId) -> &Self {
        self.remove_listener(event, listener)
    }

    /// Removes every registration for `event`.
    pub fn remove_all_listeners(&self, event: &EventKey) -> &Self {
        let mut table = self.table.borrow_mut();
        if let Some(sequence) = table.sequences.remove(event) {
            table.names.retain(|name| name != event);
            debug!(
                "removed {} listener(s) from `{event}`",
                sequence.registrations.len()
            );
        }
        self
    }

    /// Removes every registration for every event.
    pub fn clear(&self) -> &Self {
        let mut table = self.table.borrow_mut();
        table.sequences.clear();
        table.names.clear();
        self
    }

    // ==================== Introspection ====================

    /// Number of registrations for `event` that have not fired yet.
    pub fn listener_count(&self, event: &EventKey) -> usize {
        self.table
            .borrow()
            .sequences
            .get(event)
            .map_or(0, |sequence| sequence.registrations.len())
    }

    /// Copy of the listeners for `event`, in dispatch order.
    pub fn listeners(&self, event: &EventKey) -> Vec<RawListener> {
        self.table
            .borrow()
            .sequences
            .get(event)
            .map(|sequence| {
                sequence
                    .registrations
                    .iter()
                    .map(|registration| registration.listener().clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Same as [`listeners()`](Self::listeners).
    ///
    /// Kept as a separate name because callers of dynamic emitters expect it;
    /// listeners are never wrapped, so there is nothing else to expose.
    pub fn raw_listeners(&self, event: &EventKey) -> Vec<RawListener> {
        self.listeners(event)
    }

    /// Events with at least one registration, in order of first registration.
    pub fn event_names(&self) -> Vec<EventKey> {
        self.table.borrow().names.clone()
    }

    #[inline]
    pub fn max_listeners(&self) -> Option<usize> {
        self.max_listeners.get()
    }

    /// Changes the leak warning threshold. `None` turns the warning off.
    pub fn set_max_listeners(&self, max_listeners: Option<usize>) -> &Self {
        self.max_listeners.set(max_listeners);
        self
    }

    // ==================== Internals ====================

    fn next_registration_id(&self) -> RegistrationId {
        let id = self.next_registration.get();
        self.next_registration.set(id + 1);
        RegistrationId(id)
    }

    fn insert(&self, event: &EventKey, listener: RawListener, placement: Placement, once: bool) {
        let registration = Registration::new(self.next_registration_id(), listener, once);
        let listener_id = registration.listener_id();

        let mut table = self.table.borrow_mut();
        let table = &mut *table;
        let sequence = match table.sequences.entry(event.clone()) {
            hash_map::Entry::Occupied(entry) => entry.into_mut(),
            hash_map::Entry::Vacant(entry) => {
                table.names.push(event.clone());
                entry.insert(Sequence::default())
            }
        };

        match placement {
            Placement::Append => sequence.registrations.push(registration),
            Placement::Prepend => sequence.registrations.insert(0, registration),
        }

        debug!(
            "registered {}listener {listener_id:?} on `{event}` ({placement:?})",
            if once { "once " } else { "" }
        );

        let count = sequence.registrations.len();
        if let Some(max) = self.max_listeners.get() {
            if count > max && !sequence.warned {
                sequence.warned = true;
                warn!(
                    "possible listener leak: {count} listeners registered on `{event}` \
                     (max {max}); raise the limit with set_max_listeners"
                );
            }
        }
    }

    /// Removes one specific registration, if still present.
    fn detach(&self, event: &EventKey, id: RegistrationId) {
        let mut table = self.table.borrow_mut();
        let Some(sequence) = table.sequences.get_mut(event) else {
            return;
        };
        if let Some(index) = sequence
            .registrations
            .iter()
            .position(|registration| registration.id() == id)
        {
            sequence.registrations.remove(index);
            table.prune(event);
        }
    }
}

impl Default for Emitter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Emitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = self.table.borrow();
        f.debug_struct("Emitter")
            .field(
                "events",
                &table
                    .names
                    .iter()
                    .map(|name| {
                        let count = table
                            .sequences
                            .get(name)
                            .map_or(0, |sequence| sequence.registrations.len());
                        (name, count)
                    })
                    .collect::<Vec<_>>(),
            )
            .field("max_listeners", &self.max_listeners.get())
            .finish()
    }
}
