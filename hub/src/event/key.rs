//! Runtime identity of an event name.
//!
//! The emitter never interprets a key: it is hashed, compared and printed,
//! nothing else. Three flavours exist so that callers can name events the
//! way that suits them:
//!
//! - [`EventKey::Name`]: a string, e.g. `"message"`
//! - [`EventKey::Index`]: a number, e.g. an opcode
//! - [`EventKey::Symbol`]: a [`Symbol`], unique by construction
//!
//! A string key and a numeric key never collide, even when they print the
//! same (`"1"` vs `1`).

use std::{
    any::{TypeId, type_name},
    borrow::Cow,
    fmt,
    hash::{Hash, Hasher},
    sync::atomic::{AtomicU64, Ordering},
};

/// Source of ids for [`Symbol::new`].
static NEXT_SYMBOL: AtomicU64 = AtomicU64::new(0);

/// A key with an identity of its own.
///
/// Two symbols are equal only if they come from the same [`Symbol::new`] call
/// (or copies of it), or from [`Symbol::of`] with the same type. The
/// description is for display only and takes no part in equality.
#[derive(Clone, Copy)]
pub struct Symbol {
    id: SymbolId,
    description: &'static str,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
enum SymbolId {
    Type(TypeId),
    Unique(u64),
}

impl Symbol {
    /// Creates a fresh symbol, distinct from every other symbol.
    pub fn new(description: &'static str) -> Self {
        Self {
            id: SymbolId::Unique(NEXT_SYMBOL.fetch_add(1, Ordering::Relaxed)),
            description,
        }
    }

    /// Returns the symbol bound to the type `T`.
    ///
    /// Every call with the same `T` yields an equal symbol. This is the key
    /// `#[derive(Event)]` gives an event type when no explicit name is set.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: SymbolId::Type(TypeId::of::<T>()),
            description: type_name::<T>(),
        }
    }

    #[inline]
    pub fn description(&self) -> &'static str {
        self.description
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.description)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.description)
    }
}

/// An opaque event name.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum EventKey {
    Name(Cow<'static, str>),
    Index(i64),
    Symbol(Symbol),
}

impl EventKey {
    /// Shorthand for a borrowed static string key.
    pub const fn name(name: &'static str) -> Self {
        EventKey::Name(Cow::Borrowed(name))
    }
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKey::Name(name) => f.write_str(name),
            EventKey::Index(index) => write!(f, "{index}"),
            EventKey::Symbol(symbol) => write!(f, "{symbol}"),
        }
    }
}

impl From<&'static str> for EventKey {
    fn from(name: &'static str) -> Self {
        EventKey::Name(Cow::Borrowed(name))
    }
}

impl From<String> for EventKey {
    fn from(name: String) -> Self {
        EventKey::Name(Cow::Owned(name))
    }
}

impl From<i64> for EventKey {
    fn from(index: i64) -> Self {
        EventKey::Index(index)
    }
}

impl From<Symbol> for EventKey {
    fn from(symbol: Symbol) -> Self {
        EventKey::Symbol(symbol)
    }
}
