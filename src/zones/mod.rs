//! Zone system for card locations.
//!
//! Zones are configured per match via `ZoneConfig`; each has an owner and a
//! `ZoneRole` (hand, draw deck, discard pile, dead pile, play area, plot deck)
//! that operations use to find it.
//!
//! ## Key Types
//!
//! - `ZoneId`: Opaque zone identifier (from `core::config`)
//! - `ZoneConfig`: Zone properties (role, visibility, ordering, ownership)
//! - `ZoneManager`: Card location tracking and movement
//! - `ZonePosition`: Position specifier for insertion

pub mod manager;

pub use manager::{ZoneManager, ZonePosition};

// Re-export zone types from core for convenience
pub use crate::core::config::{ZoneConfig, ZoneId, ZoneRole, ZoneVisibility};
