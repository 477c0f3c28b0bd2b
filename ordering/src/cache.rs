// cache.rs — Identity-keyed caches for comparator composition
//
// Lookups are keyed by reference identity (the address of an `Rc`
// allocation), never by value. Each entry tracks its keys through `Weak`
// handles so a stale address left behind by a dropped key can never alias a
// newer allocation: a dead key invalidates the entry on the next access.
// Values are also held weakly, so a cached composition never keeps its own
// inputs alive; while any caller still holds the composed value, repeated
// lookups return that same allocation.
//
// Preconditions: keys and values are `Rc`-allocated.
// Postconditions: a hit is pointer-identical to the value stored while it
//                 is still externally alive.
// Failure modes: none; stale entries degrade to a miss.
// Side effects: dead entries are pruned during lookups and inserts.

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

/// Entries above this count trigger a sweep of dead slots before insert.
const PRUNE_LEN: usize = 64;

/// Reference identity of an `Rc` allocation: its address plus a liveness
/// handle that distinguishes it from any later allocation reusing the
/// address.
pub struct IdentityKey {
    addr: usize,
    live: Weak<dyn Any>,
}

impl IdentityKey {
    pub fn of<U: 'static>(rc: &Rc<U>) -> Self {
        let any: Rc<dyn Any> = rc.clone();
        IdentityKey {
            addr: Rc::as_ptr(rc) as usize,
            live: Rc::downgrade(&any),
        }
    }

    pub fn addr(&self) -> usize {
        self.addr
    }
}

struct Slot {
    keys: Vec<Weak<dyn Any>>,
    value: Weak<dyn Any>,
}

impl Slot {
    fn keys_alive(&self) -> bool {
        self.keys.iter().all(|k| k.strong_count() > 0)
    }
}

// ── Single-key cache ─────────────────────────────────────────────────────

/// Cache keyed by one reference identity.
pub struct IdentityCache {
    slots: RefCell<HashMap<usize, Slot>>,
}

impl IdentityCache {
    pub fn new() -> Self {
        IdentityCache {
            slots: RefCell::new(HashMap::new()),
        }
    }

    pub fn get<V: 'static>(&self, key: usize) -> Option<Rc<V>> {
        let mut slots = self.slots.borrow_mut();
        let value = match slots.get(&key) {
            None => return None,
            Some(slot) if slot.keys_alive() => slot.value.upgrade(),
            Some(_) => None,
        };
        match value {
            Some(value) => value.downcast::<V>().ok(),
            None => {
                slots.remove(&key);
                None
            }
        }
    }

    pub fn set<V: 'static>(&self, key: IdentityKey, value: &Rc<V>) {
        let mut slots = self.slots.borrow_mut();
        if slots.len() >= PRUNE_LEN {
            slots.retain(|_, slot| slot.keys_alive() && slot.value.strong_count() > 0);
        }
        let any: Rc<dyn Any> = value.clone();
        slots.insert(
            key.addr,
            Slot {
                keys: vec![key.live],
                value: Rc::downgrade(&any),
            },
        );
    }
}

impl Default for IdentityCache {
    fn default() -> Self {
        Self::new()
    }
}

// ── Two-key cache ────────────────────────────────────────────────────────

/// Cache keyed by an ordered pair of reference identities.
pub struct TwoKeyIdentityCache {
    slots: RefCell<HashMap<(usize, usize), Slot>>,
}

impl TwoKeyIdentityCache {
    pub fn new() -> Self {
        TwoKeyIdentityCache {
            slots: RefCell::new(HashMap::new()),
        }
    }

    pub fn get<V: 'static>(&self, key1: usize, key2: usize) -> Option<Rc<V>> {
        let mut slots = self.slots.borrow_mut();
        let value = match slots.get(&(key1, key2)) {
            None => return None,
            Some(slot) if slot.keys_alive() => slot.value.upgrade(),
            Some(_) => None,
        };
        match value {
            Some(value) => value.downcast::<V>().ok(),
            None => {
                slots.remove(&(key1, key2));
                None
            }
        }
    }

    pub fn set<V: 'static>(&self, key1: IdentityKey, key2: IdentityKey, value: &Rc<V>) {
        let mut slots = self.slots.borrow_mut();
        if slots.len() >= PRUNE_LEN {
            slots.retain(|_, slot| slot.keys_alive() && slot.value.strong_count() > 0);
        }
        let any: Rc<dyn Any> = value.clone();
        slots.insert(
            (key1.addr, key2.addr),
            Slot {
                keys: vec![key1.live, key2.live],
                value: Rc::downgrade(&any),
            },
        );
    }
}

impl Default for TwoKeyIdentityCache {
    fn default() -> Self {
        Self::new()
    }
}
