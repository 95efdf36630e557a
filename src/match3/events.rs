use crate::match3::prelude::*;

/// Notifications a board publishes to whoever is presenting it.
#[derive(Clone, Debug)]
pub enum BoardEvent {
    /// The grid was (re)built.
    Prepared,
    /// The initial fill finished.
    Filled,
    /// A sequence is about to be consumed; the payload is an independent snapshot of it.
    SequenceConsumed(Sequence),
    /// The remaining moves just reached zero and the board locked itself.
    SpentAllMoves,
    Swapped { from: Coord, to: Coord },
    SwapRejected { from: Coord, to: Coord },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(usize);

type Listener<E> = Box<dyn FnMut(&E)>;

/// A synchronous observer list. Events reach every registered listener in registration order,
/// before `emit` returns.
pub struct Notifier<E> {
    next_id: usize,
    listeners: Vec<(ListenerId, Listener<E>)>,
}

impl<E> Default for Notifier<E> {
    fn default() -> Self {
        Notifier { next_id: 0, listeners: vec![] }
    }
}

impl<E> std::fmt::Debug for Notifier<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier").field("listeners", &self.listeners.len()).finish()
    }
}

impl<E> Notifier<E> {
    /// Registers a listener; keep the id to unsubscribe later.
    pub fn subscribe(&mut self, listener: impl FnMut(&E) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Removes a listener. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        before != self.listeners.len()
    }

    pub fn emit(&mut self, event: &E) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}
