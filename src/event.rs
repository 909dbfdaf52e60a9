//! Synchronous change notification.
//!
//! Stores that mutate observable state (palette, workspace) own an
//! `Observers<E>` list. Callbacks run on the mutating thread, after the
//! mutation has completed, in subscription order. `subscribe` hands back a
//! [`Subscription`] token that `unsubscribe` accepts later — there is no
//! implicit lifetime tie between a listener and the store.

/// Token returned by [`Observers::subscribe`]; pass it to
/// [`Observers::unsubscribe`] to detach the callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Subscription(u64);

type Callback<E> = Box<dyn FnMut(&E)>;

pub struct Observers<E> {
    next_id: u64,
    entries: Vec<(u64, Callback<E>)>,
}

impl<E> Default for Observers<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> std::fmt::Debug for Observers<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl<E> Observers<E> {
    pub fn new() -> Self {
        Self { next_id: 0, entries: Vec::new() }
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&E) + 'static) -> Subscription {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push((id, Box::new(callback)));
        Subscription(id)
    }

    /// Detach a callback. Returns `false` when the token was already
    /// unsubscribed (not an error — drop-order races are common).
    pub fn unsubscribe(&mut self, sub: Subscription) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(id, _)| *id != sub.0);
        self.entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Deliver `event` to every subscriber, in subscription order.
    pub fn emit(&mut self, event: &E) {
        for (_, callback) in &mut self.entries {
            callback(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn emit_reaches_all_subscribers_in_order() {
        let log: Rc<std::cell::RefCell<Vec<u32>>> = Rc::default();
        let mut obs: Observers<u32> = Observers::new();

        let l1 = Rc::clone(&log);
        obs.subscribe(move |e| l1.borrow_mut().push(*e * 10));
        let l2 = Rc::clone(&log);
        obs.subscribe(move |e| l2.borrow_mut().push(*e * 10 + 1));

        obs.emit(&1);
        obs.emit(&2);
        assert_eq!(*log.borrow(), vec![10, 11, 20, 21]);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let hits = Rc::new(Cell::new(0));
        let mut obs: Observers<()> = Observers::new();

        let h = Rc::clone(&hits);
        let sub = obs.subscribe(move |_| h.set(h.get() + 1));

        obs.emit(&());
        assert!(obs.unsubscribe(sub));
        obs.emit(&());

        assert_eq!(hits.get(), 1);
        assert!(!obs.unsubscribe(sub)); // second detach is a no-op
    }
}
