//! Ordered listener registry for socket events.
//!
//! Listeners fire in registration order. Emission works on a snapshot of
//! the handler list, so a listener may add or remove listeners (including
//! itself) without affecting the dispatch already in flight.

use std::collections::HashMap;
use std::hash::Hash;
use std::rc::Rc;

/// Handle returned by [`Emitter::on`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerId(u64);

pub struct Emitter<K, E> {
    next_id: u64,
    listeners: HashMap<K, Vec<(ListenerId, Rc<dyn Fn(&E)>)>>,
}

impl<K: Copy + Eq + Hash, E> Emitter<K, E> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            listeners: HashMap::new(),
        }
    }

    /// Register a listener for one event kind.
    pub fn on(&mut self, key: K, handler: impl Fn(&E) + 'static) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.listeners
            .entry(key)
            .or_default()
            .push((id, Rc::new(handler)));
        id
    }

    /// Remove the first listener registered under `id`. Returns whether
    /// anything was removed.
    pub fn off(&mut self, key: K, id: ListenerId) -> bool {
        let Some(handlers) = self.listeners.get_mut(&key) else {
            return false;
        };
        let Some(position) = handlers.iter().position(|(handler_id, _)| *handler_id == id) else {
            return false;
        };
        handlers.remove(position);
        true
    }

    /// Snapshot the handlers for one event kind, in registration order.
    pub fn handlers(&self, key: K) -> Vec<Rc<dyn Fn(&E)>> {
        self.listeners
            .get(&key)
            .map(|handlers| handlers.iter().map(|(_, handler)| handler.clone()).collect())
            .unwrap_or_default()
    }
}

impl<K: Copy + Eq + Hash, E> Default for Emitter<K, E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn listeners_fire_in_registration_order() {
        let mut emitter: Emitter<u8, String> = Emitter::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        for label in ["first", "second", "third"] {
            let seen = seen.clone();
            emitter.on(0, move |event: &String| {
                seen.borrow_mut().push(format!("{label}:{event}"));
            });
        }

        for handler in emitter.handlers(0) {
            handler(&"x".to_string());
        }
        assert_eq!(*seen.borrow(), vec!["first:x", "second:x", "third:x"]);
    }

    #[test]
    fn off_removes_only_the_matching_listener() {
        let mut emitter: Emitter<u8, String> = Emitter::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let keep = {
            let seen = seen.clone();
            emitter.on(0, move |_: &String| seen.borrow_mut().push("keep"))
        };
        let drop_me = {
            let seen = seen.clone();
            emitter.on(0, move |_: &String| seen.borrow_mut().push("drop"))
        };

        assert!(emitter.off(0, drop_me));
        assert!(!emitter.off(0, drop_me));

        for handler in emitter.handlers(0) {
            handler(&String::new());
        }
        assert_eq!(*seen.borrow(), vec!["keep"]);

        assert!(emitter.off(0, keep));
    }

    #[test]
    fn emit_with_no_listeners_is_a_no_op() {
        let emitter: Emitter<u8, String> = Emitter::new();
        assert!(emitter.handlers(9).is_empty());
    }

    #[test]
    fn snapshot_survives_reentrant_removal() {
        let mut emitter: Emitter<u8, String> = Emitter::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let first = {
            let seen = seen.clone();
            emitter.on(0, move |_: &String| seen.borrow_mut().push("first"))
        };
        {
            let seen = seen.clone();
            emitter.on(0, move |_: &String| seen.borrow_mut().push("second"));
        }

        // Simulate a listener unsubscribing its sibling mid-dispatch: the
        // snapshot taken before iteration still runs both handlers.
        let snapshot = emitter.handlers(0);
        emitter.off(0, first);
        for handler in snapshot {
            handler(&String::new());
        }
        assert_eq!(*seen.borrow(), vec!["first", "second"]);
        assert_eq!(emitter.handlers(0).len(), 1);
    }

    #[test]
    fn kinds_are_isolated() {
        let mut emitter: Emitter<u8, String> = Emitter::new();
        let seen = Rc::new(RefCell::new(0));
        {
            let seen = seen.clone();
            emitter.on(1, move |_: &String| *seen.borrow_mut() += 1);
        }
        assert!(emitter.handlers(2).is_empty());
        assert_eq!(emitter.handlers(1).len(), 1);
    }
}
