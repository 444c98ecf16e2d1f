//! Card instances - runtime card state.
//!
//! `CardInstance` is one physical card in a match. Its `entity_id` never
//! changes; zone moves and control changes are field updates.
//!
//! - `owner` is fixed at creation.
//! - `controller` starts as the owner and only changes through control
//!   transfer (or reverts when the card leaves play).
//! - `zone` mirrors the `ZoneManager`; only `GameState::move_card` updates it.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::definition::CardId;
use crate::core::config::ZoneId;
use crate::core::entity::EntityId;
use crate::core::player::PlayerId;

/// A card instance in a match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardInstance {
    /// Unique entity ID for this instance.
    pub entity_id: EntityId,

    /// Reference to the card definition.
    pub card_id: CardId,

    owner: PlayerId,
    controller: PlayerId,
    zone: ZoneId,

    /// Knelt (exhausted) cards stand again during the standing phase.
    pub kneeling: bool,

    /// Sequence number of the last time this card entered play.
    /// `None` while out of play.
    pub entered_play: Option<u64>,

    /// Free-form per-instance counters (power, tokens, ...).
    #[serde(default)]
    pub state: FxHashMap<String, i64>,
}

impl CardInstance {
    /// Create a card instance controlled by its owner.
    #[must_use]
    pub fn new(entity_id: EntityId, card_id: CardId, owner: PlayerId, zone: ZoneId) -> Self {
        Self {
            entity_id,
            card_id,
            owner,
            controller: owner,
            zone,
            kneeling: false,
            entered_play: None,
            state: FxHashMap::default(),
        }
    }

    /// The player who started the match with this card.
    #[must_use]
    pub fn owner(&self) -> PlayerId {
        self.owner
    }

    /// The player currently controlling this card.
    #[must_use]
    pub fn controller(&self) -> PlayerId {
        self.controller
    }

    /// The zone this card is in.
    #[must_use]
    pub fn zone(&self) -> ZoneId {
        self.zone
    }

    pub(crate) fn set_controller(&mut self, controller: PlayerId) {
        self.controller = controller;
    }

    pub(crate) fn set_zone(&mut self, zone: ZoneId) {
        self.zone = zone;
    }

    /// Get a counter value with a default.
    #[must_use]
    pub fn get_state(&self, key: &str, default: i64) -> i64 {
        self.state.get(key).copied().unwrap_or(default)
    }

    /// Set a counter value.
    pub fn set_state(&mut self, key: impl Into<String>, value: i64) {
        self.state.insert(key.into(), value);
    }

    /// Modify a counter value by delta.
    pub fn modify_state(&mut self, key: &str, delta: i64) {
        let current = self.get_state(key, 0);
        self.state.insert(key.to_string(), current + delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_controller_defaults_to_owner() {
        let card = CardInstance::new(EntityId(1), CardId::new(1), PlayerId::new(1), ZoneId::new(0));
        assert_eq!(card.owner(), PlayerId::new(1));
        assert_eq!(card.controller(), PlayerId::new(1));
        assert!(!card.kneeling);
        assert_eq!(card.entered_play, None);
    }

    #[test]
    fn test_control_change_keeps_owner() {
        let mut card = CardInstance::new(EntityId(1), CardId::new(1), PlayerId::new(0), ZoneId::new(0));
        card.set_controller(PlayerId::new(1));
        assert_eq!(card.owner(), PlayerId::new(0));
        assert_eq!(card.controller(), PlayerId::new(1));
    }

    #[test]
    fn test_state_counters() {
        let mut card = CardInstance::new(EntityId(1), CardId::new(1), PlayerId::new(0), ZoneId::new(0));
        assert_eq!(card.get_state("power", 0), 0);
        card.modify_state("power", 2);
        card.modify_state("power", 1);
        assert_eq!(card.get_state("power", 0), 3);
    }

    #[test]
    fn test_serialization() {
        let mut card = CardInstance::new(EntityId(7), CardId::new(3), PlayerId::new(1), ZoneId::new(4));
        card.kneeling = true;
        card.set_state("power", 1);

        let json = serde_json::to_string(&card).unwrap();
        let back: CardInstance = serde_json::from_str(&json).unwrap();
        assert_eq!(card, back);
    }
}
