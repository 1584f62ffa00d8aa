//! A chat room that publishes its activity through a typed hub.
//!
//! Run with `RUST_LOG=debug cargo run -p typed_hub --example chat_room` to see
//! registrations and dispatches logged.

use std::{cell::RefCell, rc::Rc};

use typed_hub::{Event, Hub, Listener, Schema};

#[derive(Schema)]
struct RoomEvents;

#[derive(Event)]
#[event(schema = RoomEvents, args = (String,), name = "joined")]
struct Joined;

#[derive(Event)]
#[event(schema = RoomEvents, args = (String, String), name = "message")]
struct Message;

#[derive(Event)]
#[event(schema = RoomEvents)]
struct Closed;

#[derive(Debug, thiserror::Error)]
#[error("`{0}` is muted")]
struct Muted(String);

/// A room owns its hub and exposes it for subscriptions.
struct Room {
    name: String,
    members: RefCell<Vec<String>>,
    events: Hub<RoomEvents>,
}

impl Room {
    fn new(name: &str) -> Rc<Self> {
        Rc::new(Self {
            name: name.to_string(),
            members: RefCell::new(Vec::new()),
            events: Hub::new(),
        })
    }

    fn join(&self, member: &str) -> typed_hub::Result<()> {
        self.members.borrow_mut().push(member.to_string());
        self.events.emit(Joined, (member.to_string(),))?;
        Ok(())
    }

    fn say(&self, member: &str, text: &str) -> typed_hub::Result<bool> {
        self.events
            .emit(Message, (member.to_string(), text.to_string()))
    }

    fn close(&self) -> typed_hub::Result<()> {
        self.events.emit(Closed, ())?;
        self.events.clear();
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let room = Room::new("lobby");

    let transcript = Rc::new(RefCell::new(Vec::<String>::new()));
    let record: Listener<(String, String)> = Message::listener({
        let transcript = Rc::clone(&transcript);
        move |(member, text)| transcript.borrow_mut().push(format!("{member}: {text}"))
    });
    let moderate = Message::listener(|(member, _)| {
        if member == "troll" {
            return Err(Muted(member.clone()));
        }
        Ok(())
    });

    // The greeter answers each newcomer through the same hub
    let greet = Joined::listener({
        let room = Rc::downgrade(&room);
        move |(member,)| -> typed_hub::Result<()> {
            if let Some(room) = room.upgrade() {
                room.say("bot", &format!("welcome to {}, {member}", room.name))?;
            }
            Ok(())
        }
    });

    let farewell = Closed::listener(|_| println!("room closed"));

    room.events
        .on(Message, &record)
        .prepend_listener(Message, &moderate)
        .on(Joined, &greet)
        .once(Closed, &farewell);

    room.join("ada")?;
    room.say("ada", "hello")?;

    if let Err(err) = room.say("troll", "spam") {
        println!("dropped: {err}");
    }

    room.events.off(Message, &moderate);
    room.say("troll", "sorry")?;

    println!(
        "{} member(s), {} message listener(s)",
        room.members.borrow().len(),
        room.events.listener_count(Message)
    );
    for line in transcript.borrow().iter() {
        println!("{line}");
    }

    room.close()?;
    assert!(!room.say("ada", "anyone?")?);

    Ok(())
}
