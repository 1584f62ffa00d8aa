//! Schema and events shared by the benchmarks.

use std::{cell::Cell, rc::Rc};

use typed_hub::{Event, Hub, HubConfig, Listener, Schema};

#[derive(Schema)]
pub struct Bench;

/// Payload-free event, measures pure dispatch overhead.
#[derive(Event)]
#[event(schema = Bench, name = "tick")]
pub struct Tick;

/// Event with an owned payload, closer to real use.
#[derive(Event)]
#[event(schema = Bench, args = (u64, String), name = "sample")]
pub struct Sample;

/// A hub without the leak warning, so large sequences do not log.
pub fn quiet_hub() -> Hub<Bench> {
    Hub::with_config(HubConfig::default().with_max_listeners(None))
}

/// A `Tick` listener that counts its calls into `counter`.
pub fn counting(counter: &Rc<Cell<u64>>) -> Listener<()> {
    let counter = Rc::clone(counter);
    Tick::listener(move |_| counter.set(counter.get() + 1))
}

/// A hub with `n` persistent `Tick` listeners sharing one counter.
pub fn hub_with_ticks(n: usize) -> (Hub<Bench>, Rc<Cell<u64>>) {
    let hub = quiet_hub();
    let counter = Rc::new(Cell::new(0));
    for _ in 0..n {
        hub.on(Tick, &counting(&counter));
    }
    (hub, counter)
}
