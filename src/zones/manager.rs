//! Zone manager for card locations and movement.
//!
//! The `ZoneManager` is the single source of truth for where a card is.
//! It supports:
//! - Ordered card lists for every zone (deterministic iteration everywhere)
//! - Card lookup by entity ID
//! - Lookup of zones by owner and role
//! - A consistency check that a card sits in exactly one zone

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::config::{ZoneConfig, ZoneId, ZoneRole};
use crate::core::entity::EntityId;
use crate::core::error::{EngineError, EngineResult};
use crate::core::player::PlayerId;
use crate::core::rng::GameRng;

/// Position for inserting a card into a zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZonePosition {
    /// Add to top of zone (end of the list; top of a deck).
    Top,
    /// Add to bottom of zone.
    Bottom,
    /// Insert at specific index (0 = bottom).
    Index(usize),
}

/// Tracks card locations across the configured zones.
///
/// ## Usage
///
/// ```
/// use ccg_resolver::zones::{ZoneManager, ZonePosition};
/// use ccg_resolver::core::{EntityId, PlayerId, ZoneConfig, ZoneId, ZoneRole};
///
/// let deck = ZoneId::new(0);
/// let hand = ZoneId::new(1);
/// let mut manager = ZoneManager::new(vec![
///     ZoneConfig::new(deck, "Deck", ZoneRole::DrawDeck).with_owner(PlayerId::new(0)),
///     ZoneConfig::new(hand, "Hand", ZoneRole::Hand).with_owner(PlayerId::new(0)),
/// ]);
///
/// manager.add_to_zone(EntityId(10), deck, ZonePosition::Top).unwrap();
/// manager.add_to_zone(EntityId(11), deck, ZonePosition::Top).unwrap();
///
/// let top = manager.top_card(deck).unwrap();
/// manager.move_to_zone(top, hand, ZonePosition::Top).unwrap();
/// assert_eq!(manager.cards_in_zone(hand), &[EntityId(11)]);
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ZoneManager {
    configs: Vec<ZoneConfig>,

    /// Card lists parallel to `configs`, bottom first.
    contents: Vec<Vec<EntityId>>,

    /// Card locations: entity_id -> zone_id
    locations: FxHashMap<EntityId, ZoneId>,
}

impl ZoneManager {
    /// Create a manager for the given zones, all empty.
    #[must_use]
    pub fn new(configs: Vec<ZoneConfig>) -> Self {
        let contents = vec![Vec::new(); configs.len()];
        Self {
            configs,
            contents,
            locations: FxHashMap::default(),
        }
    }

    fn slot(&self, zone: ZoneId) -> Option<usize> {
        self.configs.iter().position(|c| c.id == zone)
    }

    fn slot_or_err(&self, zone: ZoneId) -> EngineResult<usize> {
        self.slot(zone)
            .ok_or_else(|| EngineError::illegal(format!("unknown zone {zone}")))
    }

    /// All zone configs in configuration order.
    #[must_use]
    pub fn configs(&self) -> &[ZoneConfig] {
        &self.configs
    }

    /// Config of a zone.
    #[must_use]
    pub fn config(&self, zone: ZoneId) -> Option<&ZoneConfig> {
        self.slot(zone).map(|i| &self.configs[i])
    }

    /// Find the zone a player owns for a role.
    #[must_use]
    pub fn zone_for(&self, owner: PlayerId, role: ZoneRole) -> Option<ZoneId> {
        self.configs
            .iter()
            .find(|c| c.owner == Some(owner) && c.role == role)
            .map(|c| c.id)
    }

    /// Add a new card to a zone.
    ///
    /// A card already tracked somewhere is an invariant violation: it would
    /// end up in two zones.
    pub fn add_to_zone(
        &mut self,
        entity: EntityId,
        zone: ZoneId,
        position: ZonePosition,
    ) -> EngineResult<()> {
        if let Some(existing) = self.locations.get(&entity) {
            return Err(EngineError::invariant(format!(
                "{entity} is already in {existing}, cannot also add it to {zone}"
            )));
        }
        let slot = self.slot_or_err(zone)?;
        insert_at(&mut self.contents[slot], entity, position);
        self.locations.insert(entity, zone);
        Ok(())
    }

    /// Move a card from its current zone to another.
    ///
    /// Returns the old zone. Moving to the zone it is already in is a no-op.
    pub fn move_to_zone(
        &mut self,
        entity: EntityId,
        new_zone: ZoneId,
        position: ZonePosition,
    ) -> EngineResult<ZoneId> {
        let old_zone = self
            .locations
            .get(&entity)
            .copied()
            .ok_or_else(|| EngineError::illegal(format!("{entity} is not in any zone")))?;

        if old_zone == new_zone {
            return Ok(old_zone);
        }

        let new_slot = self.slot_or_err(new_zone)?;
        if let Some(old_slot) = self.slot(old_zone) {
            self.contents[old_slot].retain(|&e| e != entity);
        }
        insert_at(&mut self.contents[new_slot], entity, position);
        self.locations.insert(entity, new_zone);

        Ok(old_zone)
    }

    /// Remove a card from the manager entirely.
    pub fn remove(&mut self, entity: EntityId) -> Option<ZoneId> {
        let zone = self.locations.remove(&entity)?;
        if let Some(slot) = self.slot(zone) {
            self.contents[slot].retain(|&e| e != entity);
        }
        Some(zone)
    }

    /// Get the zone a card is in.
    #[must_use]
    pub fn get_zone(&self, entity: EntityId) -> Option<ZoneId> {
        self.locations.get(&entity).copied()
    }

    /// Check if a card is in a specific zone.
    #[must_use]
    pub fn is_in_zone(&self, entity: EntityId, zone: ZoneId) -> bool {
        self.locations.get(&entity) == Some(&zone)
    }

    /// Role of the zone a card is in.
    #[must_use]
    pub fn role_of(&self, entity: EntityId) -> Option<ZoneRole> {
        let zone = self.get_zone(entity)?;
        self.config(zone).map(|c| c.role)
    }

    /// Whether a card is currently in a play area.
    #[must_use]
    pub fn is_in_play(&self, entity: EntityId) -> bool {
        self.role_of(entity).is_some_and(ZoneRole::is_in_play)
    }

    /// Cards in a zone, bottom first.
    #[must_use]
    pub fn cards_in_zone(&self, zone: ZoneId) -> &[EntityId] {
        self.slot(zone).map_or(&[][..], |i| self.contents[i].as_slice())
    }

    /// Get the number of cards in a zone.
    #[must_use]
    pub fn zone_size(&self, zone: ZoneId) -> usize {
        self.cards_in_zone(zone).len()
    }

    /// Get the top card of a zone (last in the list).
    #[must_use]
    pub fn top_card(&self, zone: ZoneId) -> Option<EntityId> {
        self.cards_in_zone(zone).last().copied()
    }

    /// Shuffle a zone.
    pub fn shuffle_zone(&mut self, zone: ZoneId, rng: &mut GameRng) {
        if let Some(slot) = self.slot(zone) {
            rng.shuffle(&mut self.contents[slot]);
        }
    }

    /// Every card in every play area, in zone order then entry order.
    pub fn in_play(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.configs
            .iter()
            .zip(&self.contents)
            .filter(|(config, _)| config.is_in_play())
            .flat_map(|(_, cards)| cards.iter().copied())
    }

    /// Every tracked card, in zone order.
    pub fn all_cards(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.contents.iter().flat_map(|cards| cards.iter().copied())
    }

    /// Get total number of cards tracked.
    #[must_use]
    pub fn total_cards(&self) -> usize {
        self.locations.len()
    }

    /// Check if the manager contains an entity.
    #[must_use]
    pub fn contains(&self, entity: EntityId) -> bool {
        self.locations.contains_key(&entity)
    }

    /// Verify that each card is listed exactly once, in the zone its
    /// location says.
    pub fn check_consistency(&self) -> EngineResult<()> {
        let mut seen: FxHashMap<EntityId, ZoneId> = FxHashMap::default();
        for (config, cards) in self.configs.iter().zip(&self.contents) {
            for &card in cards {
                if let Some(other) = seen.insert(card, config.id) {
                    return Err(EngineError::invariant(format!(
                        "{card} is listed in both {other} and {}",
                        config.id
                    )));
                }
                if self.locations.get(&card) != Some(&config.id) {
                    return Err(EngineError::invariant(format!(
                        "{card} is listed in {} but located elsewhere",
                        config.id
                    )));
                }
            }
        }
        if seen.len() != self.locations.len() {
            return Err(EngineError::invariant("zone lists and locations disagree"));
        }
        Ok(())
    }
}

fn insert_at(order: &mut Vec<EntityId>, entity: EntityId, position: ZonePosition) {
    match position {
        ZonePosition::Top => order.push(entity),
        ZonePosition::Bottom => order.insert(0, entity),
        ZonePosition::Index(i) => {
            let idx = i.min(order.len());
            order.insert(idx, entity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DECK: ZoneId = ZoneId(0);
    const HAND: ZoneId = ZoneId(1);
    const PLAY: ZoneId = ZoneId(2);

    fn manager() -> ZoneManager {
        let owner = PlayerId::new(0);
        ZoneManager::new(vec![
            ZoneConfig::new(DECK, "Deck", ZoneRole::DrawDeck).with_owner(owner),
            ZoneConfig::new(HAND, "Hand", ZoneRole::Hand).with_owner(owner),
            ZoneConfig::new(PLAY, "Play", ZoneRole::PlayArea).with_owner(owner),
        ])
    }

    #[test]
    fn test_add_and_get() {
        let mut manager = manager();
        manager.add_to_zone(EntityId(10), HAND, ZonePosition::Top).unwrap();

        assert_eq!(manager.get_zone(EntityId(10)), Some(HAND));
        assert_eq!(manager.get_zone(EntityId(99)), None);
        assert_eq!(manager.role_of(EntityId(10)), Some(ZoneRole::Hand));
        assert!(!manager.is_in_play(EntityId(10)));
    }

    #[test]
    fn test_add_twice_is_invariant_violation() {
        let mut manager = manager();
        manager.add_to_zone(EntityId(10), HAND, ZonePosition::Top).unwrap();
        let err = manager.add_to_zone(EntityId(10), PLAY, ZonePosition::Top).unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(manager.get_zone(EntityId(10)), Some(HAND));
    }

    #[test]
    fn test_positions() {
        let mut manager = manager();
        manager.add_to_zone(EntityId(10), DECK, ZonePosition::Top).unwrap();
        manager.add_to_zone(EntityId(11), DECK, ZonePosition::Bottom).unwrap();
        manager.add_to_zone(EntityId(12), DECK, ZonePosition::Index(1)).unwrap();

        assert_eq!(
            manager.cards_in_zone(DECK),
            &[EntityId(11), EntityId(12), EntityId(10)]
        );
        assert_eq!(manager.top_card(DECK), Some(EntityId(10)));
    }

    #[test]
    fn test_move_between_zones() {
        let mut manager = manager();
        manager.add_to_zone(EntityId(10), HAND, ZonePosition::Top).unwrap();

        let old = manager.move_to_zone(EntityId(10), PLAY, ZonePosition::Top).unwrap();

        assert_eq!(old, HAND);
        assert!(manager.is_in_play(EntityId(10)));
        assert_eq!(manager.zone_size(HAND), 0);
        assert_eq!(manager.in_play().collect::<Vec<_>>(), vec![EntityId(10)]);
        manager.check_consistency().unwrap();
    }

    #[test]
    fn test_move_unknown_card_is_illegal() {
        let mut manager = manager();
        let err = manager.move_to_zone(EntityId(5), PLAY, ZonePosition::Top).unwrap_err();
        assert!(matches!(err, EngineError::IllegalAction(_)));
    }

    #[test]
    fn test_remove() {
        let mut manager = manager();
        manager.add_to_zone(EntityId(10), PLAY, ZonePosition::Top).unwrap();

        assert_eq!(manager.remove(EntityId(10)), Some(PLAY));
        assert!(!manager.contains(EntityId(10)));
        assert_eq!(manager.zone_size(PLAY), 0);
    }

    #[test]
    fn test_shuffle() {
        let mut manager = manager();
        for i in 0..20 {
            manager.add_to_zone(EntityId(i), DECK, ZonePosition::Top).unwrap();
        }
        let before = manager.cards_in_zone(DECK).to_vec();

        manager.shuffle_zone(DECK, &mut GameRng::new(42));

        let after = manager.cards_in_zone(DECK).to_vec();
        assert_eq!(before.len(), after.len());
        assert_ne!(before, after);
        manager.check_consistency().unwrap();
    }

    #[test]
    fn test_zone_for() {
        let manager = manager();
        assert_eq!(manager.zone_for(PlayerId::new(0), ZoneRole::PlayArea), Some(PLAY));
        assert_eq!(manager.zone_for(PlayerId::new(1), ZoneRole::PlayArea), None);
    }
}
