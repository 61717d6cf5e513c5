//! Ordered, synchronous notification lists.

use std::fmt;

/// Handle returned by [`Signal::connect`], used to disconnect later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(u64);

/// A list of subscriber callbacks invoked in registration order.
///
/// Emission is synchronous: every callback has returned by the time
/// [`emit`](Signal::emit) does.  There is no global dispatcher; whoever owns
/// the signal decides when it fires.
pub struct Signal<T> {
    slots: Vec<(SlotId, Box<dyn FnMut(&T)>)>,
    next_id: u64,
}

impl<T> Signal<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            next_id: 0,
        }
    }

    /// Append `f` to the subscriber list.
    pub fn connect(&mut self, f: impl FnMut(&T) + 'static) -> SlotId {
        let id = SlotId(self.next_id);
        self.next_id += 1;
        self.slots.push((id, Box::new(f)));
        id
    }

    /// Remove a subscriber.  Returns `false` if `id` was not connected.
    pub fn disconnect(&mut self, id: SlotId) -> bool {
        let before = self.slots.len();
        self.slots.retain(|(slot, _)| *slot != id);
        self.slots.len() != before
    }

    pub fn disconnect_all(&mut self) {
        self.slots.clear();
    }

    /// Invoke every subscriber with `value`, oldest first.
    pub fn emit(&mut self, value: &T) {
        for (_, slot) in self.slots.iter_mut() {
            slot(value);
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl<T> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("subscribers", &self.slots.len())
            .finish()
    }
}
