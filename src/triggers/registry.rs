//! Ability registry.
//!
//! The registry stores live abilities and finds the ones that should fire
//! for an event. Cards register abilities when they enter play and the
//! engine unregisters them when they leave.
//!
//! ## Ordering
//!
//! `eligible` returns abilities in resolution order:
//! 1. forced before optional
//! 2. APNAP by controller (active player first, then seat order)
//! 3. registration order
//!
//! The order is total, so the same state always resolves the same way.

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::cards::CardRegistry;
use crate::core::{EntityId, GameState, PlayerId};

use super::ability::{Ability, AbilityCategory, AbilityId, TriggerTiming};
use super::condition::ConditionContext;
use super::event::{EventTypeId, GameEvent};

/// Registry for abilities.
#[derive(Clone, Debug, Default)]
pub struct AbilityRegistry {
    /// All registered abilities.
    abilities: FxHashMap<AbilityId, Ability>,

    /// Index by event type for fast lookup.
    by_event_type: FxHashMap<EventTypeId, Vec<AbilityId>>,

    /// Last ability ID allocated.
    next_id: u32,
}

impl AbilityRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an ability, returns its ID.
    pub fn register(&mut self, mut ability: Ability) -> AbilityId {
        self.next_id += 1;
        let id = AbilityId::new(self.next_id);
        ability.id = id;

        for event_type in &ability.event_types {
            self.by_event_type.entry(*event_type).or_default().push(id);
        }

        debug!(ability = %id, name = %ability.name, source = ?ability.source, "ability registered");
        self.abilities.insert(id, ability);
        id
    }

    /// Unregister an ability.
    pub fn unregister(&mut self, id: AbilityId) -> Option<Ability> {
        let ability = self.abilities.remove(&id)?;
        for event_type in &ability.event_types {
            if let Some(list) = self.by_event_type.get_mut(event_type) {
                list.retain(|&other| other != id);
                if list.is_empty() {
                    self.by_event_type.remove(event_type);
                }
            }
        }
        Some(ability)
    }

    /// Remove all abilities granted by a card. Returns how many were removed.
    pub fn unregister_all(&mut self, source: EntityId) -> usize {
        let mut to_remove: Vec<_> = self
            .abilities
            .values()
            .filter(|a| a.source == Some(source))
            .map(|a| a.id)
            .collect();
        to_remove.sort_unstable();

        for &id in &to_remove {
            self.unregister(id);
        }
        to_remove.len()
    }

    /// Get an ability by ID.
    #[must_use]
    pub fn get(&self, id: AbilityId) -> Option<&Ability> {
        self.abilities.get(&id)
    }

    /// Whether an ability is still registered.
    #[must_use]
    pub fn contains(&self, id: AbilityId) -> bool {
        self.abilities.contains_key(&id)
    }

    /// Who controls an ability right now: the source card's controller, else
    /// the fixed controller, else the active player.
    #[must_use]
    pub fn controller_of(ability: &Ability, state: &GameState) -> PlayerId {
        ability
            .source
            .and_then(|source| state.card(source))
            .map(|card| card.controller())
            .or(ability.controller)
            .unwrap_or(state.public.active_player)
    }

    /// Condition context for an ability.
    #[must_use]
    pub fn context_for<'a>(
        ability: &Ability,
        event: Option<&'a GameEvent>,
        state: &'a GameState,
        cards: &'a CardRegistry,
    ) -> ConditionContext<'a> {
        ConditionContext::new(event, state, cards, Self::controller_of(ability, state))
            .with_this(ability.source)
    }

    /// Abilities that should fire for an event at a timing, in resolution order.
    #[must_use]
    pub fn eligible(
        &self,
        event: &GameEvent,
        timing: TriggerTiming,
        state: &GameState,
        cards: &CardRegistry,
    ) -> Vec<AbilityId> {
        let Some(ids) = self.by_event_type.get(&event.event_type) else {
            return Vec::new();
        };

        let mut found: Vec<(bool, usize, AbilityId)> = ids
            .iter()
            .filter_map(|id| self.abilities.get(id))
            .filter(|ability| ability.timing() == Some(timing))
            .filter_map(|ability| {
                let ctx = Self::context_for(ability, Some(event), state, cards);
                ability.condition_holds(&ctx).then(|| {
                    (
                        !ability.is_forced(),
                        state.public.apnap_rank(ctx.controller),
                        ability.id,
                    )
                })
            })
            .collect();

        found.sort_unstable();
        found.into_iter().map(|(_, _, id)| id).collect()
    }

    /// Action abilities a player may trigger now, in registration order.
    #[must_use]
    pub fn actions_for(
        &self,
        player: PlayerId,
        state: &GameState,
        cards: &CardRegistry,
    ) -> Vec<AbilityId> {
        let mut found: Vec<AbilityId> = self
            .abilities
            .values()
            .filter(|ability| ability.category == AbilityCategory::Action)
            .filter(|ability| {
                let ctx = Self::context_for(ability, None, state, cards);
                ctx.controller == player && ability.condition_holds(&ctx)
            })
            .map(|ability| ability.id)
            .collect();
        found.sort_unstable();
        found
    }

    /// Abilities granted by a card, in registration order.
    #[must_use]
    pub fn abilities_for_source(&self, source: EntityId) -> Vec<&Ability> {
        let mut found: Vec<&Ability> = self
            .abilities
            .values()
            .filter(|a| a.source == Some(source))
            .collect();
        found.sort_unstable_by_key(|a| a.id);
        found
    }

    /// Get total ability count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.abilities.len()
    }

    /// Check if registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.abilities.is_empty()
    }

    /// Iterate all abilities (unordered).
    pub fn iter(&self) -> impl Iterator<Item = &Ability> {
        self.abilities.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardDefinition, CardId, CardTypeId};
    use crate::core::{MatchConfig, ZoneRole};
    use crate::triggers::{events, TriggerCondition};

    struct Fixture {
        state: GameState,
        cards: CardRegistry,
        p0_card: EntityId,
        p1_card: EntityId,
    }

    fn fixture() -> Fixture {
        let mut cards = CardRegistry::new();
        cards
            .register(CardDefinition::new(CardId::new(1), "Soldier", CardTypeId::new(1)))
            .unwrap();
        let mut state = GameState::new(&MatchConfig::new(2).with_standard_zones());
        let play0 = state.zone_for(PlayerId::new(0), ZoneRole::PlayArea).unwrap();
        let play1 = state.zone_for(PlayerId::new(1), ZoneRole::PlayArea).unwrap();
        let p0_card = state.create_card(CardId::new(1), PlayerId::new(0), play0).unwrap();
        let p1_card = state.create_card(CardId::new(1), PlayerId::new(1), play1).unwrap();
        Fixture { state, cards, p0_card, p1_card }
    }

    #[test]
    fn test_register_and_unregister() {
        let f = fixture();
        let mut registry = AbilityRegistry::new();
        let a = registry.register(Ability::reaction("A").on(events::CARD_KNEELED).with_source(f.p0_card));
        let b = registry.register(Ability::reaction("B").on(events::CARD_KNEELED).with_source(f.p0_card));
        let c = registry.register(Ability::reaction("C").on(events::CARD_KNEELED).with_source(f.p1_card));

        assert!(a < b && b < c);
        assert_eq!(registry.abilities_for_source(f.p0_card).len(), 2);
        assert_eq!(registry.unregister_all(f.p0_card), 2);
        assert_eq!(registry.len(), 1);
        assert!(registry.contains(c));
        assert!(registry.unregister(a).is_none());
    }

    #[test]
    fn test_eligible_filters_timing_and_condition() {
        let f = fixture();
        let mut registry = AbilityRegistry::new();
        let reaction = registry.register(
            Ability::reaction("Mine")
                .on(events::CARD_KNEELED)
                .with_source(f.p0_card)
                .with_condition(TriggerCondition::TargetIsThis),
        );
        registry.register(Ability::interrupt("Early").on(events::CARD_KNEELED).with_source(f.p0_card));
        registry.register(Ability::reaction("Other event").on(events::CARD_STOOD).with_source(f.p0_card));

        let event = GameEvent::new(events::CARD_KNEELED).with_target(f.p0_card);
        assert_eq!(
            registry.eligible(&event, TriggerTiming::After, &f.state, &f.cards),
            vec![reaction]
        );

        let elsewhere = GameEvent::new(events::CARD_KNEELED).with_target(f.p1_card);
        assert!(registry.eligible(&elsewhere, TriggerTiming::After, &f.state, &f.cards).is_empty());
    }

    #[test]
    fn test_eligible_order_forced_then_apnap_then_registration() {
        let mut f = fixture();
        f.state.public.active_player = PlayerId::new(1);
        let mut registry = AbilityRegistry::new();

        let p0_first = registry.register(Ability::reaction("p0 a").on(events::PHASE_STARTED).with_source(f.p0_card));
        let p1_optional = registry.register(Ability::reaction("p1").on(events::PHASE_STARTED).with_source(f.p1_card));
        let p0_second = registry.register(Ability::reaction("p0 b").on(events::PHASE_STARTED).with_source(f.p0_card));
        let p0_forced = registry.register(Ability::forced_reaction("p0 forced").on(events::PHASE_STARTED).with_source(f.p0_card));

        let event = GameEvent::new(events::PHASE_STARTED);
        let order = registry.eligible(&event, TriggerTiming::After, &f.state, &f.cards);
        assert_eq!(order, vec![p0_forced, p1_optional, p0_first, p0_second]);
    }

    #[test]
    fn test_controller_follows_card() {
        let mut f = fixture();
        let ability = Ability::reaction("x").with_source(f.p0_card);
        assert_eq!(AbilityRegistry::controller_of(&ability, &f.state), PlayerId::new(0));

        f.state.set_controller(f.p0_card, PlayerId::new(1)).unwrap();
        assert_eq!(AbilityRegistry::controller_of(&ability, &f.state), PlayerId::new(1));

        let engine = Ability::reaction("rule").with_controller(PlayerId::new(1));
        assert_eq!(AbilityRegistry::controller_of(&engine, &f.state), PlayerId::new(1));
        let unowned = Ability::reaction("global");
        assert_eq!(AbilityRegistry::controller_of(&unowned, &f.state), f.state.public.active_player);
    }

    #[test]
    fn test_actions_for_player() {
        let f = fixture();
        let mut registry = AbilityRegistry::new();
        let mine = registry.register(Ability::action("Mine").with_source(f.p0_card));
        registry.register(Ability::action("Theirs").with_source(f.p1_card));
        registry.register(Ability::action("Disabled").with_source(f.p0_card).with_condition(TriggerCondition::Never));

        assert_eq!(registry.actions_for(PlayerId::new(0), &f.state, &f.cards), vec![mine]);
    }
}
