//! Card instance identification.
//!
//! Every card instance in a match has a stable `EntityId` allocated by the
//! match when the card is created. The id never changes for the lifetime of
//! the instance: zone moves and control changes are relationship updates on
//! the instance, never a new identity.
//!
//! ## Usage
//!
//! ```
//! use ccg_resolver::core::{EntityId, IdAllocator};
//!
//! let mut ids = IdAllocator::default();
//! let first = EntityId(ids.next());
//! let second = EntityId(ids.next());
//!
//! assert_ne!(first, second);
//! assert_eq!(first.raw() + 1, second.raw());
//! ```

use serde::{Deserialize, Serialize};

/// Stable identifier of a card instance within one match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    /// Create an entity ID from a raw value.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl From<u32> for EntityId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card#{}", self.0)
    }
}

/// Monotonic id source.
///
/// Ids start at 1 so that 0 can stand for "not yet assigned" where a type
/// needs that. Allocation order doubles as registration order, which the
/// resolver relies on for tie-breaks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdAllocator {
    next: u32,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdAllocator {
    /// Allocate the next id.
    pub fn next(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Peek at the id the next call to `next` will return.
    #[must_use]
    pub fn peek(&self) -> u32 {
        self.next
    }

    /// Make sure future ids are strictly greater than `used`.
    ///
    /// Used when restoring a match from a snapshot.
    pub fn reserve_past(&mut self, used: u32) {
        if used >= self.next {
            self.next = used + 1;
        }
    }
}
