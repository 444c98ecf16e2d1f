//! Ability bindings.
//!
//! An `Ability` binds a card (or the engine itself, when `source` is `None`)
//! to one or more event types with a resolution category, a declarative
//! condition, an optional predicate closure, and a handler. Categories are a
//! closed set; everything card-specific lives in the condition and handler.
//!
//! ```
//! use ccg_resolver::triggers::{events, playing_types, Ability, AbilityCategory, TriggerCondition};
//!
//! let on_marshal = Ability::reaction("Queen's Men")
//!     .on(events::CARD_ENTERS_PLAY)
//!     .with_condition(TriggerCondition::TargetIsThis.and(TriggerCondition::tag(playing_types::MARSHAL)))
//!     .handler(|ctx| {
//!         ctx.game.add_message("{0} uses Queen's Men", &[ctx.controller.into()]);
//!         Ok(())
//!     });
//!
//! assert_eq!(on_marshal.category, AbilityCategory::Reaction);
//! assert!(!on_marshal.is_forced());
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{EngineError, EngineResult, EntityId, PlayerId};
use crate::effects::CardSelector;
use crate::game::AbilityContext;

use super::condition::{ConditionContext, ConditionEvaluator, TriggerCondition};
use super::event::EventTypeId;

/// Unique identifier for a registered ability. Allocation order is
/// registration order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AbilityId(pub u32);

impl AbilityId {
    /// Create a new ability ID.
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

impl std::fmt::Display for AbilityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ability({})", self.0)
    }
}

/// Resolution category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbilityCategory {
    /// Optional, before the default effect; may cancel.
    Interrupt,
    /// Mandatory, before the default effect; may cancel.
    ForcedInterrupt,
    /// Optional, after the default effect.
    Reaction,
    /// Mandatory, after the default effect.
    ForcedReaction,
    /// Triggered by its controller in an open action window.
    Action,
}

impl AbilityCategory {
    /// When the category fires relative to an event's default effect.
    #[must_use]
    pub fn timing(self) -> Option<TriggerTiming> {
        match self {
            AbilityCategory::Interrupt | AbilityCategory::ForcedInterrupt => {
                Some(TriggerTiming::Before)
            }
            AbilityCategory::Reaction | AbilityCategory::ForcedReaction => {
                Some(TriggerTiming::After)
            }
            AbilityCategory::Action => None,
        }
    }

    /// Whether the category resolves without its controller's consent.
    #[must_use]
    pub fn is_forced(self) -> bool {
        matches!(self, AbilityCategory::ForcedInterrupt | AbilityCategory::ForcedReaction)
    }

    /// Whether abilities of this category may cancel their event.
    #[must_use]
    pub fn can_cancel(self) -> bool {
        self.timing() == Some(TriggerTiming::Before)
    }
}

/// When in the event resolution process an ability fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerTiming {
    /// Before the default effect (interrupts).
    Before,
    /// After the default effect (reactions).
    After,
}

/// Cards the controller must choose one of before the handler runs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSpec {
    pub selector: CardSelector,
    pub title: String,
}

/// Handler invoked when an ability resolves.
pub type AbilityHandler = Arc<dyn Fn(&mut AbilityContext<'_>) -> EngineResult<()> + Send + Sync>;

/// Extra eligibility check beyond the declarative condition.
pub type AbilityPredicate = Arc<dyn Fn(&ConditionContext<'_>) -> bool + Send + Sync>;

/// A registered (or about to be registered) ability.
#[derive(Clone)]
pub struct Ability {
    /// Assigned on registration.
    pub id: AbilityId,

    /// Human-readable name (for logs and menus).
    pub name: String,

    /// The card that grants the ability. `None` for engine abilities.
    pub source: Option<EntityId>,

    /// Fixed controller for abilities without a source card.
    pub controller: Option<PlayerId>,

    pub category: AbilityCategory,

    /// Event types the ability listens for. Empty for actions.
    pub event_types: SmallVec<[EventTypeId; 2]>,

    pub condition: TriggerCondition,

    predicate: Option<AbilityPredicate>,

    /// Target chosen by the controller before the handler runs.
    pub target: Option<TargetSpec>,

    /// Ask the controller before resolving (non-forced categories only).
    pub optional: bool,

    handler: AbilityHandler,
}

impl std::fmt::Debug for Ability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ability")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("source", &self.source)
            .field("controller", &self.controller)
            .field("category", &self.category)
            .field("event_types", &self.event_types)
            .field("condition", &self.condition)
            .field("target", &self.target)
            .field("optional", &self.optional)
            .finish_non_exhaustive()
    }
}

impl Ability {
    /// Create an ability of a category with no events and no handler.
    pub fn new(name: impl Into<String>, category: AbilityCategory) -> Self {
        let name = name.into();
        let missing = name.clone();
        Self {
            id: AbilityId::default(),
            name,
            source: None,
            controller: None,
            category,
            event_types: SmallVec::new(),
            condition: TriggerCondition::Always,
            predicate: None,
            target: None,
            optional: false,
            handler: Arc::new(move |_| {
                Err(EngineError::misconfigured(format!("{missing} has no handler")))
            }),
        }
    }

    /// Optional ability after the default effect.
    pub fn reaction(name: impl Into<String>) -> Self {
        Self::new(name, AbilityCategory::Reaction)
    }

    /// Optional ability before the default effect.
    pub fn interrupt(name: impl Into<String>) -> Self {
        Self::new(name, AbilityCategory::Interrupt)
    }

    /// Mandatory ability after the default effect.
    pub fn forced_reaction(name: impl Into<String>) -> Self {
        Self::new(name, AbilityCategory::ForcedReaction)
    }

    /// Mandatory ability before the default effect.
    pub fn forced_interrupt(name: impl Into<String>) -> Self {
        Self::new(name, AbilityCategory::ForcedInterrupt)
    }

    /// Ability its controller triggers in an action window.
    pub fn action(name: impl Into<String>) -> Self {
        Self::new(name, AbilityCategory::Action)
    }

    /// Plain event listener: a forced reaction on one event type with no
    /// further condition.
    pub fn listener(name: impl Into<String>, event_type: EventTypeId) -> Self {
        Self::forced_reaction(name).on(event_type)
    }

    /// Listen for an event type (builder pattern).
    #[must_use]
    pub fn on(mut self, event_type: EventTypeId) -> Self {
        if !self.event_types.contains(&event_type) {
            self.event_types.push(event_type);
        }
        self
    }

    /// Set the source card (builder pattern).
    #[must_use]
    pub fn with_source(mut self, source: EntityId) -> Self {
        self.source = Some(source);
        self
    }

    /// Set a fixed controller (builder pattern).
    #[must_use]
    pub fn with_controller(mut self, controller: PlayerId) -> Self {
        self.controller = Some(controller);
        self
    }

    /// Set the condition (builder pattern).
    #[must_use]
    pub fn with_condition(mut self, condition: TriggerCondition) -> Self {
        self.condition = condition;
        self
    }

    /// Add a predicate closure (builder pattern).
    #[must_use]
    pub fn when(
        mut self,
        predicate: impl Fn(&ConditionContext<'_>) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.predicate = Some(Arc::new(predicate));
        self
    }

    /// Require a target (builder pattern).
    #[must_use]
    pub fn with_target(mut self, selector: CardSelector, title: impl Into<String>) -> Self {
        self.target = Some(TargetSpec {
            selector,
            title: title.into(),
        });
        self
    }

    /// Ask the controller before resolving (builder pattern).
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Set the handler (builder pattern).
    #[must_use]
    pub fn handler(
        mut self,
        handler: impl Fn(&mut AbilityContext<'_>) -> EngineResult<()> + Send + Sync + 'static,
    ) -> Self {
        self.handler = Arc::new(handler);
        self
    }

    /// Whether the ability resolves without its controller's consent.
    #[must_use]
    pub fn is_forced(&self) -> bool {
        self.category.is_forced()
    }

    /// Timing of the ability, `None` for actions.
    #[must_use]
    pub fn timing(&self) -> Option<TriggerTiming> {
        self.category.timing()
    }

    /// Whether the confirm prompt applies.
    #[must_use]
    pub fn asks_first(&self) -> bool {
        self.optional && !self.is_forced()
    }

    /// Whether the condition and predicate hold.
    #[must_use]
    pub fn condition_holds(&self, ctx: &ConditionContext<'_>) -> bool {
        ConditionEvaluator::evaluate(&self.condition, ctx)
            && self.predicate.as_ref().map_or(true, |predicate| predicate(ctx))
    }

    /// Shared handle to the handler.
    #[must_use]
    pub fn handler_fn(&self) -> AbilityHandler {
        Arc::clone(&self.handler)
    }
}
