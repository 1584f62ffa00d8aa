//! The typed event hub.
//!
//! [`Hub<S>`] narrows the untyped [`Emitter`] to one [`Schema`]: every
//! operation takes an event value whose type implements
//! [`Event<Schema = S>`](Event), and listeners and payloads are checked
//! against that event's `Args` at compile time. The runtime table is the
//! emitter's; the hub adds no state of its own.
//!
//! # Example
//!
//! ```rust,ignore
//! use typed_hub::{Event, Hub, Schema};
//!
//! #[derive(Schema)]
//! struct Chat;
//!
//! #[derive(Event)]
//! #[event(schema = Chat, args = (String, u32), name = "message")]
//! struct Message;
//!
//! let hub = Hub::<Chat>::new();
//! let print = Message::listener(|(text, room)| println!("[{room}] {text}"));
//!
//! hub.on(Message, &print);
//! assert!(hub.emit(Message, ("hello".into(), 1))?);
//!
//! hub.off(Message, &print);
//! assert_eq!(hub.listener_count(Message), 0);
//! ```
//!
//! To call back into the hub from a listener, share it through an `Rc` and
//! capture a `Weak` in the listener.

use std::{fmt, marker::PhantomData};

use crate::{
    config::HubConfig,
    emitter::Emitter,
    error::Result,
    event::{Event, EventKey, Schema},
    listener::Listener,
};

/// Type-checked event hub for the schema `S`.
pub struct Hub<S: Schema> {
    emitter: Emitter,
    schema: PhantomData<fn() -> S>,
}

impl<S: Schema> Hub<S> {
    pub fn new() -> Self {
        Self::with_config(HubConfig::default())
    }

    pub fn with_config(config: HubConfig) -> Self {
        Self {
            emitter: Emitter::with_config(config),
            schema: PhantomData,
        }
    }

    /// Emits `event` with `args` to every current listener.
    ///
    /// Returns whether the event had listeners. A listener error stops the
    /// dispatch and is returned as is.
    pub fn emit<E: Event<Schema = S>>(&self, event: E, args: E::Args) -> Result<bool> {
        self.emitter.emit(&event.key(), &args)
    }

    /// Appends `listener` to the listeners of `event`.
    pub fn on<E: Event<Schema = S>>(&self, event: E, listener: &Listener<E::Args>) -> &Self {
        let key = event.key();
        self.emitter.add_listener(&key, listener.to_raw(&key));
        self
    }

    /// Alias of [`on()`](Self::on).
    pub fn add_listener<E: Event<Schema = S>>(
        &self,
        event: E,
        listener: &Listener<E::Args>,
    ) -> &Self {
        self.on(event, listener)
    }

    /// Appends `listener`; it is removed right before its first invocation.
    pub fn once<E: Event<Schema = S>>(&self, event: E, listener: &Listener<E::Args>) -> &Self {
        let key = event.key();
        self.emitter.once(&key, listener.to_raw(&key));
        self
    }

    /// Puts `listener` in front of the listeners of `event`.
    pub fn prepend_listener<E: Event<Schema = S>>(
        &self,
        event: E,
        listener: &Listener<E::Args>,
    ) -> &Self {
        let key = event.key();
        self.emitter.prepend_listener(&key, listener.to_raw(&key));
        self
    }

    /// Puts a fire-once `listener` in front of the listeners of `event`.
    pub fn prepend_once_listener<E: Event<Schema = S>>(
        &self,
        event: E,
        listener: &Listener<E::Args>,
    ) -> &Self {
        let key = event.key();
        self.emitter.prepend_once_listener(&key, listener.to_raw(&key));
        self
    }

    /// Removes the earliest registration of `listener` for `event`, if any.
    pub fn remove_listener<E: Event<Schema = S>>(
        &self,
        event: E,
        listener: &Listener<E::Args>,
    ) -> &Self {
        self.emitter.remove_listener(&event.key(), listener.id());
        self
    }

    /// Alias of [`remove_listener()`](Self::remove_listener).
    pub fn off<E: Event<Schema = S>>(&self, event: E, listener: &Listener<E::Args>) -> &Self {
        self.remove_listener(event, listener)
    }

    pub fn remove_all_listeners<E: Event<Schema = S>>(&self, event: E) -> &Self {
        self.emitter.remove_all_listeners(&event.key());
        self
    }

    /// Removes every listener of every event.
    pub fn clear(&self) -> &Self {
        self.emitter.clear();
        self
    }

    pub fn listener_count<E: Event<Schema = S>>(&self, event: E) -> usize {
        self.emitter.listener_count(&event.key())
    }

    /// Copy of the listeners of `event`, in dispatch order.
    pub fn listeners<E: Event<Schema = S>>(&self, event: E) -> Vec<Listener<E::Args>> {
        self.emitter
            .listeners(&event.key())
            .iter()
            .map(Listener::from_raw)
            .collect()
    }

    /// Same as [`listeners()`](Self::listeners).
    pub fn raw_listeners<E: Event<Schema = S>>(&self, event: E) -> Vec<Listener<E::Args>> {
        self.emitter
            .raw_listeners(&event.key())
            .iter()
            .map(Listener::from_raw)
            .collect()
    }

    /// Names of the events that currently have listeners.
    pub fn event_names(&self) -> Vec<EventKey> {
        self.emitter.event_names()
    }

    #[inline]
    pub fn max_listeners(&self) -> Option<usize> {
        self.emitter.max_listeners()
    }

    pub fn set_max_listeners(&self, max_listeners: Option<usize>) -> &Self {
        self.emitter.set_max_listeners(max_listeners);
        self
    }

    /// The untyped emitter underneath.
    ///
    /// Nothing checks what goes through it. Typed listeners given a payload
    /// of the wrong type fail with
    /// [`Error::PayloadMismatch`](crate::Error::PayloadMismatch).
    #[inline]
    pub fn emitter(&self) -> &Emitter {
        &self.emitter
    }
}

impl<S: Schema> Default for Hub<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Schema> fmt::Debug for Hub<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hub")
            .field("schema", &std::any::type_name::<S>())
            .field("emitter", &self.emitter)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::{
        cell::{Cell, RefCell},
        rc::Rc,
    };

    use typed_hub_macros::{Event, Schema};

    use super::*;
    use crate::{error::Error, event::Symbol};

    #[derive(Schema)]
    struct Chat;

    #[derive(Event)]
    #[event(schema = Chat, args = (String,), name = "message")]
    struct Message;

    #[derive(Event)]
    #[event(schema = Chat, args = (u32, String))]
    struct Joined;

    #[derive(Event)]
    #[event(schema = Chat, index = 0)]
    struct Ping;

    /// An event whose key is picked at runtime.
    struct Room(i64);

    impl Event for Room {
        type Schema = Chat;
        type Args = (String,);

        fn key(&self) -> EventKey {
            EventKey::Index(1000 + self.0)
        }
    }

    /// Shared call log for ordering assertions.
    #[derive(Clone, Default)]
    struct Journal(Rc<RefCell<Vec<String>>>);

    impl Journal {
        fn message(&self, label: &'static str) -> Listener<(String,)> {
            let journal = self.clone();
            Message::listener(move |(text,)| {
                journal.0.borrow_mut().push(format!("{label}({text})"));
            })
        }

        fn entries(&self) -> Vec<String> {
            self.0.borrow().clone()
        }
    }

    fn text(value: &str) -> (String,) {
        (value.to_string(),)
    }

    #[derive(Debug, thiserror::Error)]
    #[error("listener refused `{0}`")]
    struct Refused(String);

    // ==================== Emit ====================

    #[test]
    fn untouched_event_has_no_listeners() {
        let hub = Hub::<Chat>::new();

        assert_eq!(hub.listener_count(Message), 0);
        assert!(!hub.emit(Message, text("hi")).unwrap());
        assert!(hub.listeners(Message).is_empty());
    }

    #[test]
    fn emit_passes_payload_to_each_listener_in_order() {
        // Given
        let hub = Hub::<Chat>::new();
        let journal = Journal::default();
        hub.on(Message, &journal.message("a"))
            .add_listener(Message, &journal.message("b"))
            .on(Message, &journal.message("c"));

        // When
        let had_listeners = hub.emit(Message, text("hi")).unwrap();

        // Then
        assert!(had_listeners);
        assert_eq!(hub.listener_count(Message), 3);
        assert_eq!(journal.entries(), vec!["a(hi)", "b(hi)", "c(hi)"]);
    }

    #[test]
    fn emit_without_payload() {
        let hub = Hub::<Chat>::new();
        let pings = Rc::new(Cell::new(0));
        let listener = Ping::listener({
            let pings = Rc::clone(&pings);
            move |_| pings.set(pings.get() + 1)
        });

        hub.on(Ping, &listener);
        hub.emit(Ping, ()).unwrap();

        assert_eq!(pings.get(), 1);
    }

    #[test]
    fn events_are_dispatched_independently() {
        // Given
        let hub = Hub::<Chat>::new();
        let journal = Journal::default();
        let joined = Joined::listener({
            let journal = journal.clone();
            move |(id, name)| journal.0.borrow_mut().push(format!("joined({id}, {name})"))
        });
        hub.on(Message, &journal.message("message")).on(Joined, &joined);

        // When
        hub.emit(Joined, (7, "ada".into())).unwrap();
        hub.emit(Message, text("hello")).unwrap();

        // Then
        assert_eq!(journal.entries(), vec!["joined(7, ada)", "message(hello)"]);
    }

    #[test]
    fn runtime_keys_select_separate_sequences() {
        let hub = Hub::<Chat>::new();
        let journal = Journal::default();
        hub.on(Room(1), &journal.message("one"))
            .on(Room(2), &journal.message("two"));

        hub.emit(Room(2), text("x")).unwrap();

        assert_eq!(journal.entries(), vec!["two(x)"]);
        assert_eq!(hub.listener_count(Room(1)), 1);
    }

    #[test]
    fn listener_error_preempts_remaining_listeners() {
        // Given
        let hub = Hub::<Chat>::new();
        let journal = Journal::default();
        let refuse = Message::listener(|(text,)| Err::<(), _>(Refused(text.clone())));
        hub.on(Message, &journal.message("before"))
            .on(Message, &refuse)
            .on(Message, &journal.message("after"));

        // When
        let err = hub.emit(Message, text("spam")).unwrap_err();

        // Then
        assert_eq!(err.to_string(), "listener refused `spam`");
        assert!(err.listener_error().unwrap().downcast_ref::<Refused>().is_some());
        assert_eq!(journal.entries(), vec!["before(spam)"]);
    }

    // ==================== Once ====================

    #[test]
    fn once_fires_only_on_first_emit() {
        // Given
        let hub = Hub::<Chat>::new();
        let journal = Journal::default();
        hub.once(Message, &journal.message("once"));

        // When
        hub.emit(Message, text("first")).unwrap();
        let count_after_first = hub.listener_count(Message);
        hub.emit(Message, text("second")).unwrap();

        // Then
        assert_eq!(count_after_first, 0);
        assert_eq!(journal.entries(), vec!["once(first)"]);
    }

    #[test]
    fn several_once_listeners_all_fire_once() {
        let hub = Hub::<Chat>::new();
        let journal = Journal::default();
        hub.once(Message, &journal.message("a"))
            .once(Message, &journal.message("b"));

        hub.emit(Message, text("1")).unwrap();
        hub.emit(Message, text("2")).unwrap();

        assert_eq!(journal.entries(), vec!["a(1)", "b(1)"]);
    }

    #[test]
    fn reentrant_emit_from_once_listener_does_not_refire_it() {
        // Given
        let hub = Rc::new(Hub::<Chat>::new());
        let calls = Rc::new(Cell::new(0));
        let listener = Message::listener({
            let hub = Rc::downgrade(&hub);
            let calls = Rc::clone(&calls);
            move |(text,)| -> Result<()> {
                calls.set(calls.get() + 1);
                if let Some(hub) = hub.upgrade() {
                    hub.emit(Message, (format!("{text}!"),))?;
                }
                Ok(())
            }
        });
        hub.once(Message, &listener);

        // When
        hub.emit(Message, text("echo")).unwrap();

        // Then
        assert_eq!(calls.get(), 1);
        assert_eq!(hub.listener_count(Message), 0);
    }

    // ==================== Prepend ====================

    #[test]
    fn prepend_listener_goes_first() {
        // Given
        let hub = Hub::<Chat>::new();
        let journal = Journal::default();
        let l1 = journal.message("l1");
        let l2 = journal.message("l2");
        let l3 = journal.message("l3");
        hub.add_listener(Message, &l1).prepend_listener(Message, &l2);
        assert_eq!(hub.listeners(Message), vec![l2.clone(), l1.clone()]);

        // When
        hub.prepend_listener(Message, &l3);
        hub.emit(Message, text("x")).unwrap();

        // Then
        assert_eq!(hub.listeners(Message), vec![l3, l2, l1]);
        assert_eq!(journal.entries(), vec!["l3(x)", "l2(x)", "l1(x)"]);
    }

    #[test]
    fn prepend_once_then_persistent_scenario() {
        // Given
        let hub = Hub::<Chat>::new();
        let journal = Journal::default();
        let a = journal.message("A");
        let b = journal.message("B");
        hub.on(Message, &a).prepend_once_listener(Message, &b);

        // When
        hub.emit(Message, text("x")).unwrap();

        // Then
        assert_eq!(journal.entries(), vec!["B(x)", "A(x)"]);
        assert_eq!(hub.listener_count(Message), 1);
        assert_eq!(hub.listeners(Message), vec![a]);

        hub.emit(Message, text("y")).unwrap();
        assert_eq!(journal.entries(), vec!["B(x)", "A(x)", "A(y)"]);
    }

    // ==================== Removal ====================

    #[test]
    fn remove_listener_removes_only_that_listener() {
        let hub = Hub::<Chat>::new();
        let journal = Journal::default();
        let first = journal.message("first");
        hub.on(Message, &first).on(Message, &journal.message("second"));

        hub.remove_listener(Message, &first);
        hub.emit(Message, text("x")).unwrap();

        assert_eq!(journal.entries(), vec!["second(x)"]);
    }

    #[test]
    fn duplicate_registration_is_removed_one_at_a_time() {
        // Given
        let hub = Hub::<Chat>::new();
        let journal = Journal::default();
        let twice = journal.message("twice");
        hub.on(Message, &twice).on(Message, &twice);

        hub.emit(Message, text("1")).unwrap();
        assert_eq!(journal.entries(), vec!["twice(1)", "twice(1)"]);

        // When
        hub.remove_listener(Message, &twice);
        hub.emit(Message, text("2")).unwrap();

        // Then
        assert_eq!(hub.listener_count(Message), 1);
        assert_eq!(journal.entries(), vec!["twice(1)", "twice(1)", "twice(2)"]);
    }

    #[test]
    fn remove_listener_also_removes_once_registrations() {
        let hub = Hub::<Chat>::new();
        let journal = Journal::default();
        let once = journal.message("once");
        hub.once(Message, &once);

        hub.off(Message, &once);

        assert!(!hub.emit(Message, text("x")).unwrap());
        assert!(journal.entries().is_empty());
    }

    #[test]
    fn off_and_remove_listener_are_interchangeable() {
        let journal = Journal::default();
        let a = journal.message("a");
        let b = journal.message("b");
        let build = || {
            let hub = Hub::<Chat>::new();
            hub.on(Message, &a).on(Message, &b).on(Message, &a);
            hub
        };
        let via_off = build();
        let via_remove = build();

        via_off.off(Message, &a).off(Message, &b);
        via_remove.remove_listener(Message, &a).remove_listener(Message, &b);

        assert_eq!(
            via_off.listener_count(Message),
            via_remove.listener_count(Message)
        );
        assert_eq!(via_off.listeners(Message), via_remove.listeners(Message));
    }

    #[test]
    fn removing_unknown_listener_changes_nothing() {
        // Given
        let hub = Hub::<Chat>::new();
        let journal = Journal::default();
        hub.on(Message, &journal.message("kept"));

        // When
        hub.remove_listener(Message, &journal.message("stranger"))
            .off(Room(9), &journal.message("stranger"));

        // Then
        assert_eq!(hub.listener_count(Message), 1);
        assert_eq!(hub.listener_count(Room(9)), 0);
    }

    #[test]
    fn remove_all_listeners_and_clear() {
        let hub = Hub::<Chat>::new();
        let journal = Journal::default();
        hub.on(Message, &journal.message("a"))
            .on(Room(1), &journal.message("b"));

        hub.remove_all_listeners(Message);
        assert_eq!(hub.listener_count(Message), 0);
        assert_eq!(hub.event_names(), vec![EventKey::Index(1001)]);

        hub.clear();
        assert!(hub.event_names().is_empty());
    }

    // ==================== Introspection ====================

    #[test]
    fn listeners_and_raw_listeners_agree() {
        let hub = Hub::<Chat>::new();
        let journal = Journal::default();
        let a = journal.message("a");
        let b = journal.message("b");
        hub.on(Message, &a).once(Message, &b).prepend_listener(Message, &b);

        assert_eq!(hub.listeners(Message), hub.raw_listeners(Message));
        assert_eq!(hub.listeners(Message), vec![b.clone(), a, b]);
    }

    #[test]
    fn listeners_snapshot_is_detached_from_hub() {
        // Given
        let hub = Hub::<Chat>::new();
        let journal = Journal::default();
        hub.on(Message, &journal.message("a"));

        // When
        let mut snapshot = hub.listeners(Message);
        snapshot.push(journal.message("b"));
        snapshot.remove(0);

        // Then
        assert_eq!(hub.listener_count(Message), 1);
        assert_ne!(hub.listeners(Message), snapshot);
    }

    #[test]
    fn returned_listeners_are_callable() {
        let hub = Hub::<Chat>::new();
        let journal = Journal::default();
        hub.on(Message, &journal.message("direct"));

        for listener in hub.listeners(Message) {
            listener.call(&text("by hand")).unwrap();
        }

        assert_eq!(journal.entries(), vec!["direct(by hand)"]);
    }

    #[test]
    fn event_names_use_event_keys() {
        let hub = Hub::<Chat>::new();
        let journal = Journal::default();
        let joined = Joined::listener(|_| {});
        hub.on(Message, &journal.message("a")).on(Joined, &joined);

        assert_eq!(
            hub.event_names(),
            vec![
                EventKey::name("message"),
                EventKey::Symbol(Symbol::of::<Joined>())
            ]
        );
    }

    // ==================== Escape Hatch ====================

    #[test]
    fn emitter_forwards_unchecked_payloads() {
        // Given
        let hub = Hub::<Chat>::new();
        let journal = Journal::default();
        hub.on(Message, &journal.message("typed"));

        // When
        let err = hub
            .emitter()
            .emit(&Message.key(), &(42_u32,))
            .unwrap_err();

        // Then
        assert!(matches!(err, Error::PayloadMismatch { .. }));
        assert!(journal.entries().is_empty());
    }

    #[test]
    fn emitter_with_matching_payload_reaches_typed_listeners() {
        let hub = Hub::<Chat>::new();
        let journal = Journal::default();
        hub.on(Message, &journal.message("typed"));

        hub.emitter().emit(&Message.key(), &text("raw")).unwrap();

        assert_eq!(journal.entries(), vec!["typed(raw)"]);
    }

    // ==================== Configuration ====================

    #[test]
    fn max_listeners_follows_config() {
        let hub = Hub::<Chat>::with_config(HubConfig::default().with_max_listeners(Some(2)));
        let journal = Journal::default();
        assert_eq!(hub.max_listeners(), Some(2));

        for label in ["a", "b", "c"] {
            hub.on(Message, &journal.message(label));
        }

        assert_eq!(hub.listener_count(Message), 3);
        hub.set_max_listeners(None);
        assert_eq!(hub.max_listeners(), None);
    }
}
