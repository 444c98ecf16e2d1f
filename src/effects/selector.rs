//! Card selectors.
//!
//! A `CardSelector` is a data-only predicate over card instances. Modifiers
//! use one to say which cards they affect, dynamic modifiers use one to say
//! which cards they count, and prompts use one to say which cards may be
//! chosen. Selectors are evaluated against live state every time, so a
//! selector never goes stale.
//!
//! Relative variants (`This`, `SameControllerAsThis`, ...) refer to the
//! card in `SelectorContext::this`: the modifier's source, the prompt's
//! source, or the card being evaluated when counting.

use serde::{Deserialize, Serialize};

use crate::cards::{CardDefinition, CardInstance, CardRegistry, CardTypeId};
use crate::core::{EntityId, GameState, PlayerId, ZoneRole};

/// Predicate over card instances.
///
/// ```
/// use ccg_resolver::effects::CardSelector;
///
/// let standing_knights = CardSelector::all([
///     CardSelector::InPlay,
///     CardSelector::Standing,
///     CardSelector::HasTrait("Knight".into()),
/// ]);
/// assert!(matches!(standing_knights, CardSelector::All(ref parts) if parts.len() == 3));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardSelector {
    /// Every card.
    Everything,
    /// One specific card.
    Card(EntityId),
    /// The context card.
    This,
    /// Any card but the context card.
    NotThis,

    // === Location ===
    /// Cards in a play area.
    InPlay,
    /// Cards in a zone with the given role.
    InZoneRole(ZoneRole),

    // === Players ===
    ControlledBy(PlayerId),
    OwnedBy(PlayerId),
    /// Controlled by the context card's controller.
    SameControllerAsThis,
    /// Owned by the context card's owner.
    SameOwnerAsThis,

    // === Printed data ===
    HasTrait(String),
    HasFaction(String),
    HasCardType(CardTypeId),

    // === Card state ===
    Kneeling,
    Standing,

    // === Combinators ===
    All(Vec<CardSelector>),
    Any(Vec<CardSelector>),
    Not(Box<CardSelector>),
}

/// What a selector is evaluated against.
#[derive(Clone, Copy)]
pub struct SelectorContext<'a> {
    pub state: &'a GameState,
    pub cards: &'a CardRegistry,
    pub this: Option<EntityId>,
}

impl<'a> SelectorContext<'a> {
    /// Create a context with no context card.
    #[must_use]
    pub fn new(state: &'a GameState, cards: &'a CardRegistry) -> Self {
        Self {
            state,
            cards,
            this: None,
        }
    }

    /// Set the context card.
    #[must_use]
    pub fn with_this(mut self, this: Option<EntityId>) -> Self {
        self.this = this;
        self
    }

    /// Instance and definition of a card.
    #[must_use]
    pub fn lookup(&self, card: EntityId) -> Option<(&'a CardInstance, &'a CardDefinition)> {
        let instance = self.state.card(card)?;
        let definition = self.cards.get(instance.card_id)?;
        Some((instance, definition))
    }

    fn this_instance(&self) -> Option<&'a CardInstance> {
        self.this.and_then(|id| self.state.card(id))
    }
}

impl CardSelector {
    /// Create an AND selector.
    pub fn all(parts: impl IntoIterator<Item = CardSelector>) -> Self {
        Self::All(parts.into_iter().collect())
    }

    /// Create an OR selector.
    pub fn any(parts: impl IntoIterator<Item = CardSelector>) -> Self {
        Self::Any(parts.into_iter().collect())
    }

    /// Negate this selector.
    #[must_use]
    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Add another selector with AND.
    #[must_use]
    pub fn and(self, other: CardSelector) -> Self {
        match self {
            Self::All(mut parts) => {
                parts.push(other);
                Self::All(parts)
            }
            _ => Self::All(vec![self, other]),
        }
    }

    /// Does `card` satisfy this selector? Unknown cards never match.
    #[must_use]
    pub fn matches(&self, ctx: &SelectorContext<'_>, card: EntityId) -> bool {
        let Some((instance, definition)) = ctx.lookup(card) else {
            return false;
        };
        self.matches_card(ctx, instance, definition)
    }

    fn matches_card(
        &self,
        ctx: &SelectorContext<'_>,
        instance: &CardInstance,
        definition: &CardDefinition,
    ) -> bool {
        let id = instance.entity_id;
        match self {
            CardSelector::Everything => true,
            CardSelector::Card(target) => id == *target,
            CardSelector::This => ctx.this == Some(id),
            CardSelector::NotThis => ctx.this != Some(id),

            CardSelector::InPlay => ctx.state.is_in_play(id),
            CardSelector::InZoneRole(role) => ctx.state.zones.role_of(id) == Some(*role),

            CardSelector::ControlledBy(player) => instance.controller() == *player,
            CardSelector::OwnedBy(player) => instance.owner() == *player,
            CardSelector::SameControllerAsThis => ctx
                .this_instance()
                .is_some_and(|this| this.controller() == instance.controller()),
            CardSelector::SameOwnerAsThis => ctx
                .this_instance()
                .is_some_and(|this| this.owner() == instance.owner()),

            CardSelector::HasTrait(name) => definition.has_trait(name),
            CardSelector::HasFaction(faction) => definition.is_faction(faction),
            CardSelector::HasCardType(card_type) => definition.card_type == *card_type,

            CardSelector::Kneeling => instance.kneeling,
            CardSelector::Standing => !instance.kneeling,

            CardSelector::All(parts) => parts
                .iter()
                .all(|p| p.matches_card(ctx, instance, definition)),
            CardSelector::Any(parts) => parts
                .iter()
                .any(|p| p.matches_card(ctx, instance, definition)),
            CardSelector::Not(inner) => !inner.matches_card(ctx, instance, definition),
        }
    }

    /// Every matching card, in zone order.
    #[must_use]
    pub fn select(&self, ctx: &SelectorContext<'_>) -> Vec<EntityId> {
        ctx.state
            .zones
            .all_cards()
            .filter(|&card| self.matches(ctx, card))
            .collect()
    }

    /// Number of matching cards in play, never counting `evaluated`.
    ///
    /// Relative variants are resolved against `evaluated`.
    #[must_use]
    pub fn count_in_play(&self, ctx: &SelectorContext<'_>, evaluated: EntityId) -> usize {
        let relative = ctx.with_this(Some(evaluated));
        ctx.state
            .zones
            .in_play()
            .filter(|&card| card != evaluated && self.matches(&relative, card))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardId, CardTypeId};
    use crate::core::MatchConfig;

    const CHARACTER: CardTypeId = CardTypeId(1);
    const LOCATION: CardTypeId = CardTypeId(2);

    struct Fixture {
        state: GameState,
        cards: CardRegistry,
        wolf_a: EntityId,
        wolf_b: EntityId,
        wolf_in_hand: EntityId,
        keep: EntityId,
        enemy_wolf: EntityId,
    }

    fn fixture() -> Fixture {
        let mut cards = CardRegistry::new();
        cards
            .register(
                CardDefinition::new(CardId::new(1), "Wolf", CHARACTER)
                    .with_faction("stark")
                    .with_trait("Direwolf"),
            )
            .unwrap();
        cards
            .register(CardDefinition::new(CardId::new(2), "Keep", LOCATION).with_faction("stark"))
            .unwrap();

        let mut state = GameState::new(&MatchConfig::new(2).with_standard_zones());
        let p0 = PlayerId::new(0);
        let p1 = PlayerId::new(1);
        let play0 = state.zone_for(p0, ZoneRole::PlayArea).unwrap();
        let hand0 = state.zone_for(p0, ZoneRole::Hand).unwrap();
        let play1 = state.zone_for(p1, ZoneRole::PlayArea).unwrap();

        let wolf_a = state.create_card(CardId::new(1), p0, play0).unwrap();
        let wolf_b = state.create_card(CardId::new(1), p0, play0).unwrap();
        let wolf_in_hand = state.create_card(CardId::new(1), p0, hand0).unwrap();
        let keep = state.create_card(CardId::new(2), p0, play0).unwrap();
        let enemy_wolf = state.create_card(CardId::new(1), p1, play1).unwrap();
        state.card_mut(wolf_b).unwrap().kneeling = true;

        Fixture { state, cards, wolf_a, wolf_b, wolf_in_hand, keep, enemy_wolf }
    }

    #[test]
    fn test_basic_filters() {
        let f = fixture();
        let ctx = SelectorContext::new(&f.state, &f.cards);

        assert!(CardSelector::InPlay.matches(&ctx, f.wolf_a));
        assert!(!CardSelector::InPlay.matches(&ctx, f.wolf_in_hand));
        assert!(CardSelector::InZoneRole(ZoneRole::Hand).matches(&ctx, f.wolf_in_hand));
        assert!(CardSelector::HasTrait("direwolf".into()).matches(&ctx, f.wolf_a));
        assert!(!CardSelector::HasTrait("Direwolf".into()).matches(&ctx, f.keep));
        assert!(CardSelector::HasCardType(LOCATION).matches(&ctx, f.keep));
        assert!(CardSelector::Kneeling.matches(&ctx, f.wolf_b));
        assert!(CardSelector::Standing.matches(&ctx, f.wolf_a));
        assert!(CardSelector::ControlledBy(PlayerId::new(1)).matches(&ctx, f.enemy_wolf));
        assert!(!CardSelector::Everything.matches(&ctx, EntityId(999)));
    }

    #[test]
    fn test_relative_filters() {
        let f = fixture();
        let ctx = SelectorContext::new(&f.state, &f.cards).with_this(Some(f.wolf_a));

        assert!(CardSelector::This.matches(&ctx, f.wolf_a));
        assert!(CardSelector::NotThis.matches(&ctx, f.wolf_b));
        assert!(CardSelector::SameControllerAsThis.matches(&ctx, f.keep));
        assert!(!CardSelector::SameControllerAsThis.matches(&ctx, f.enemy_wolf));

        let no_this = SelectorContext::new(&f.state, &f.cards);
        assert!(!CardSelector::SameOwnerAsThis.matches(&no_this, f.keep));
    }

    #[test]
    fn test_combinators() {
        let f = fixture();
        let ctx = SelectorContext::new(&f.state, &f.cards);
        let standing_stark = CardSelector::all([
            CardSelector::HasFaction("stark".into()),
            CardSelector::Standing,
        ])
        .and(CardSelector::InPlay);

        assert!(standing_stark.matches(&ctx, f.wolf_a));
        assert!(!standing_stark.matches(&ctx, f.wolf_b));
        assert!(CardSelector::HasTrait("Direwolf".into()).negate().matches(&ctx, f.keep));
        assert!(CardSelector::any([CardSelector::Kneeling, CardSelector::HasCardType(LOCATION)])
            .matches(&ctx, f.keep));
    }

    #[test]
    fn test_count_in_play_excludes_evaluated_card() {
        let f = fixture();
        let ctx = SelectorContext::new(&f.state, &f.cards);
        let allies = CardSelector::all([
            CardSelector::HasTrait("Direwolf".into()),
            CardSelector::SameControllerAsThis,
        ]);

        // wolf_b in play counts; wolf_a itself, the hand wolf, and the enemy wolf do not.
        assert_eq!(allies.count_in_play(&ctx, f.wolf_a), 1);
        assert_eq!(allies.count_in_play(&ctx, f.wolf_b), 1);
    }

    #[test]
    fn test_select_in_zone_order() {
        let f = fixture();
        let ctx = SelectorContext::new(&f.state, &f.cards);
        let wolves = CardSelector::HasTrait("Direwolf".into()).select(&ctx);
        assert_eq!(wolves.len(), 4);
        assert!(wolves.contains(&f.wolf_in_hand));
    }
}
