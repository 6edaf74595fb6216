//! Ticket key interning.
//!
//! Maps an epic's ticket keys to dense integer IDs so the dependency graph can be
//! stored in plain vectors.

use rustc_hash::FxHashMap;

/// Interned ticket ID, also the ticket's position in its epic's ticket list.
pub type TicketId = u32;

/// Key -> ID mapping; IDs are handed out in insertion order.
#[derive(Debug, Clone)]
pub struct TicketInterner<'a> {
    to_id: FxHashMap<&'a str, TicketId>,
}

impl<'a> TicketInterner<'a> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            to_id: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    /// Intern a key, returning its ID. Duplicate keys return the first ID.
    pub fn intern(&mut self, key: &'a str) -> TicketId {
        let next = self.to_id.len() as TicketId;
        *self.to_id.entry(key).or_insert(next)
    }

    #[inline]
    pub fn get(&self, key: &str) -> Option<TicketId> {
        self.to_id.get(key).copied()
    }
}
