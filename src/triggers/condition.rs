//! Trigger conditions.
//!
//! Conditions determine when an ability fires based on event data and the
//! current state. They are data, so cards can declare them once and the
//! engine re-checks them at every point the ability could resolve. An
//! ability that needs logic beyond these variants adds a predicate closure
//! on top (see `Ability::when`).

use serde::{Deserialize, Serialize};

use crate::cards::CardRegistry;
use crate::core::{EntityId, GameState, PlayerId};
use crate::effects::{CardSelector, SelectorContext};

use super::event::GameEvent;

/// A condition that must be met for an ability to fire.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerCondition {
    // === Entity Filters ===

    /// Source must be a specific entity.
    SourceIs(EntityId),

    /// Target must be a specific entity.
    TargetIs(EntityId),

    /// The event's source is the ability's own card.
    SourceIsThis,

    /// The event's target is the ability's own card.
    TargetIsThis,

    /// The ability's own card is the source, target, or among the others.
    ThisInvolved,

    /// The event's target matches a selector (relative to the ability's card).
    TargetMatches(CardSelector),

    // === Player Filters ===

    /// `event.player` is the ability's controller.
    ForController,

    /// `event.player` is an opponent of the ability's controller.
    ForOpponent,

    /// `event.other_player` is the ability's controller.
    OtherPlayerIsController,

    // === Value Filters ===

    /// Value at index must be at least N.
    ValueAtLeast { index: usize, min: i64 },

    // === Tag Filters ===

    /// Event must have specified tag.
    HasTag(String),

    /// Event must not have specified tag.
    NotTag(String),

    // === Combinators ===

    /// All conditions must be true.
    All(Vec<TriggerCondition>),

    /// At least one condition must be true.
    Any(Vec<TriggerCondition>),

    /// Condition must be false.
    Not(Box<TriggerCondition>),

    // === Special ===

    /// Always matches (no filter).
    Always,

    /// Never matches (disabled ability).
    Never,
}

impl TriggerCondition {
    /// Create a minimum value condition.
    pub fn value_at_least(index: usize, min: i64) -> Self {
        Self::ValueAtLeast { index, min }
    }

    /// Create a tag condition.
    pub fn tag(tag: impl Into<String>) -> Self {
        Self::HasTag(tag.into())
    }

    /// Create an AND condition.
    pub fn all(conditions: impl IntoIterator<Item = TriggerCondition>) -> Self {
        Self::All(conditions.into_iter().collect())
    }

    /// Create an OR condition.
    pub fn any(conditions: impl IntoIterator<Item = TriggerCondition>) -> Self {
        Self::Any(conditions.into_iter().collect())
    }

    /// Negate this condition.
    #[must_use]
    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Add another condition with AND.
    #[must_use]
    pub fn and(self, other: TriggerCondition) -> Self {
        match self {
            Self::Always => other,
            Self::All(mut conditions) => {
                conditions.push(other);
                Self::All(conditions)
            }
            _ => Self::All(vec![self, other]),
        }
    }

    /// Add another condition with OR.
    #[must_use]
    pub fn or(self, other: TriggerCondition) -> Self {
        match self {
            Self::Any(mut conditions) => {
                conditions.push(other);
                Self::Any(conditions)
            }
            _ => Self::Any(vec![self, other]),
        }
    }
}

/// Context for evaluating trigger conditions.
///
/// `event` is `None` for action abilities, which are checked outside of any
/// event; event filters then fail.
#[derive(Clone, Copy)]
pub struct ConditionContext<'a> {
    /// The event being checked.
    pub event: Option<&'a GameEvent>,
    /// Current game state.
    pub state: &'a GameState,
    /// Card definitions, for selector filters.
    pub cards: &'a CardRegistry,
    /// The card that owns the ability.
    pub this: Option<EntityId>,
    /// The player who would control the ability.
    pub controller: PlayerId,
}

impl<'a> ConditionContext<'a> {
    /// Create a new context.
    pub fn new(
        event: Option<&'a GameEvent>,
        state: &'a GameState,
        cards: &'a CardRegistry,
        controller: PlayerId,
    ) -> Self {
        Self {
            event,
            state,
            cards,
            this: None,
            controller,
        }
    }

    /// Set the ability's own card.
    #[must_use]
    pub fn with_this(mut self, this: Option<EntityId>) -> Self {
        self.this = this;
        self
    }

    /// Selector context relative to the ability's card.
    #[must_use]
    pub fn selector_context(&self) -> SelectorContext<'a> {
        SelectorContext::new(self.state, self.cards).with_this(self.this)
    }
}

/// Evaluator for trigger conditions.
pub struct ConditionEvaluator;

impl ConditionEvaluator {
    /// Check if a condition is satisfied.
    pub fn evaluate(condition: &TriggerCondition, ctx: &ConditionContext<'_>) -> bool {
        let on_event = |check: &dyn Fn(&GameEvent) -> bool| ctx.event.is_some_and(check);

        match condition {
            TriggerCondition::SourceIs(entity) => on_event(&|e| e.source == Some(*entity)),

            TriggerCondition::TargetIs(entity) => on_event(&|e| e.target == Some(*entity)),

            TriggerCondition::SourceIsThis => {
                ctx.this.is_some() && on_event(&|e| e.source == ctx.this)
            }

            TriggerCondition::TargetIsThis => {
                ctx.this.is_some() && on_event(&|e| e.target == ctx.this)
            }

            TriggerCondition::ThisInvolved => {
                ctx.this.is_some_and(|this| on_event(&|e| e.involves(this)))
            }

            TriggerCondition::TargetMatches(selector) => on_event(&|e| {
                e.target
                    .is_some_and(|target| selector.matches(&ctx.selector_context(), target))
            }),

            TriggerCondition::ForController => on_event(&|e| e.player == Some(ctx.controller)),

            TriggerCondition::ForOpponent => {
                on_event(&|e| e.player.is_some_and(|player| player != ctx.controller))
            }

            TriggerCondition::OtherPlayerIsController => {
                on_event(&|e| e.other_player == Some(ctx.controller))
            }

            TriggerCondition::ValueAtLeast { index, min } => {
                on_event(&|e| e.value(*index, i64::MIN) >= *min)
            }

            TriggerCondition::HasTag(tag) => on_event(&|e| e.has_tag(tag)),

            TriggerCondition::NotTag(tag) => on_event(&|e| !e.has_tag(tag)),

            TriggerCondition::All(conditions) => {
                conditions.iter().all(|c| Self::evaluate(c, ctx))
            }

            TriggerCondition::Any(conditions) => {
                conditions.iter().any(|c| Self::evaluate(c, ctx))
            }

            TriggerCondition::Not(inner) => !Self::evaluate(inner, ctx),

            TriggerCondition::Always => true,

            TriggerCondition::Never => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardDefinition, CardId, CardTypeId};
    use crate::core::{MatchConfig, ZoneRole};
    use crate::triggers::event::{events, playing_types};

    struct Fixture {
        state: GameState,
        cards: CardRegistry,
        knight: EntityId,
    }

    fn fixture() -> Fixture {
        let mut cards = CardRegistry::new();
        cards
            .register(CardDefinition::new(CardId::new(1), "Knight", CardTypeId::new(1)).with_trait("Knight"))
            .unwrap();
        let mut state = GameState::new(&MatchConfig::new(2).with_standard_zones());
        let play = state.zone_for(PlayerId::new(0), ZoneRole::PlayArea).unwrap();
        let knight = state.create_card(CardId::new(1), PlayerId::new(0), play).unwrap();
        Fixture { state, cards, knight }
    }

    fn check(f: &Fixture, event: &GameEvent, condition: &TriggerCondition) -> bool {
        let ctx = ConditionContext::new(Some(event), &f.state, &f.cards, PlayerId::new(0))
            .with_this(Some(f.knight));
        ConditionEvaluator::evaluate(condition, &ctx)
    }

    #[test]
    fn test_source_target_conditions() {
        let f = fixture();
        let event = GameEvent::new(events::CARD_KNEELED)
            .with_source(EntityId(10))
            .with_target(f.knight);

        assert!(check(&f, &event, &TriggerCondition::SourceIs(EntityId(10))));
        assert!(!check(&f, &event, &TriggerCondition::SourceIs(EntityId(20))));
        assert!(check(&f, &event, &TriggerCondition::TargetIsThis));
        assert!(!check(&f, &event, &TriggerCondition::SourceIsThis));
        assert!(check(&f, &event, &TriggerCondition::ThisInvolved));
    }

    #[test]
    fn test_player_conditions() {
        let f = fixture();
        let event = GameEvent::for_player(events::AFTER_CHALLENGE, PlayerId::new(1))
            .with_other_player(PlayerId::new(0));

        assert!(!check(&f, &event, &TriggerCondition::ForController));
        assert!(check(&f, &event, &TriggerCondition::ForOpponent));
        assert!(check(&f, &event, &TriggerCondition::OtherPlayerIsController));
    }

    #[test]
    fn test_target_matches_selector() {
        let f = fixture();
        let event = GameEvent::new(events::CARD_KNEELED).with_target(f.knight);

        let knights = TriggerCondition::TargetMatches(CardSelector::HasTrait("Knight".into()));
        let lords = TriggerCondition::TargetMatches(CardSelector::HasTrait("Lord".into()));
        assert!(check(&f, &event, &knights));
        assert!(!check(&f, &event, &lords));
    }

    #[test]
    fn test_value_and_tag_conditions() {
        let f = fixture();
        let event = GameEvent::new(events::CARD_ENTERS_PLAY)
            .with_value(5)
            .with_tag(playing_types::MARSHAL);

        assert!(check(&f, &event, &TriggerCondition::value_at_least(0, 5)));
        assert!(!check(&f, &event, &TriggerCondition::value_at_least(0, 6)));
        assert!(!check(&f, &event, &TriggerCondition::value_at_least(1, 0)));
        assert!(check(&f, &event, &TriggerCondition::tag(playing_types::MARSHAL)));
        assert!(check(&f, &event, &TriggerCondition::NotTag(playing_types::PUT.into())));
    }

    #[test]
    fn test_combinators() {
        let f = fixture();
        let event = GameEvent::new(events::CARD_KNEELED).with_target(f.knight);

        let both = TriggerCondition::TargetIsThis.and(TriggerCondition::tag("x"));
        assert!(!check(&f, &event, &both));
        assert!(check(&f, &event, &both.clone().negate()));
        assert!(check(&f, &event, &TriggerCondition::any([TriggerCondition::Never, TriggerCondition::TargetIsThis])));
        assert_eq!(TriggerCondition::Always.and(TriggerCondition::ForController), TriggerCondition::ForController);
    }

    #[test]
    fn test_no_event_fails_event_filters() {
        let f = fixture();
        let ctx = ConditionContext::new(None, &f.state, &f.cards, PlayerId::new(0));
        assert!(ConditionEvaluator::evaluate(&TriggerCondition::Always, &ctx));
        assert!(!ConditionEvaluator::evaluate(&TriggerCondition::ForController, &ctx));
        assert!(ConditionEvaluator::evaluate(&TriggerCondition::ForController.negate(), &ctx));
    }

    #[test]
    fn test_condition_serialization() {
        let condition = TriggerCondition::All(vec![
            TriggerCondition::TargetIsThis,
            TriggerCondition::ValueAtLeast { index: 0, min: 5 },
        ]);

        let json = serde_json::to_string(&condition).unwrap();
        let deserialized: TriggerCondition = serde_json::from_str(&json).unwrap();
        assert_eq!(condition, deserialized);
    }
}
