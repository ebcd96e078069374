use indexmap::IndexMap;

use crate::action::ActionId;

/// Ordered set of actions whose interval currently contains the playhead.
///
/// Each entry remembers the scan position (index into the time-sorted id
/// sequence) at which the enter scan discovered it. The scan cursor advances
/// monotonically while time moves forward, so each action is examined once
/// per forward sweep; the cursor must be reset whenever time moves backward
/// or the index is rebuilt.
#[derive(Debug, Default)]
pub struct ActiveSet {
    entries: IndexMap<ActionId, usize>,
    cursor: usize,
}

impl ActiveSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current enter-scan position.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Rewinds the enter scan to the start of the sorted sequence.
    pub fn reset_cursor(&mut self) {
        self.cursor = 0;
    }

    /// Moves the enter scan past the entry it just examined.
    pub fn advance_cursor(&mut self) {
        self.cursor += 1;
    }

    /// Records an action as active, keyed by the scan position at which it
    /// was discovered.
    pub fn insert(&mut self, action_id: ActionId, scan_position: usize) {
        self.entries.insert(action_id, scan_position);
    }

    /// Removes one action, preserving the order of the rest.
    pub fn remove(&mut self, action_id: &str) -> bool {
        self.entries.shift_remove(action_id).is_some()
    }

    pub fn contains(&self, action_id: &str) -> bool {
        self.entries.contains_key(action_id)
    }

    /// Active ids in discovery order.
    pub fn ids(&self) -> impl Iterator<Item = &ActionId> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes every entry, returning the ids in discovery order, and resets
    /// the cursor. Used when tracks are reassigned.
    pub fn drain(&mut self) -> Vec<ActionId> {
        self.cursor = 0;
        self.entries.drain(..).map(|(id, _)| id).collect()
    }
}
