//! Events and the abilities that respond to them.
//!
//! ## Key Components
//!
//! - [`EventTypeId`] / [`GameEvent`]: what happened, with its payload
//! - [`TriggerCondition`]: declarative filters checked against event and state
//! - [`Ability`]: a card's binding of category, events, condition, and handler
//! - [`AbilityRegistry`]: storage and ordered lookup of live abilities
//!
//! Resolution itself (interrupts, default effect, reactions) is driven by
//! the event window in `stack`; this module only decides *which* abilities
//! fire and in *what order*.
//!
//! ## Example Usage
//!
//! ```
//! use ccg_resolver::cards::CardRegistry;
//! use ccg_resolver::core::{GameState, MatchConfig, PlayerId};
//! use ccg_resolver::triggers::{events, Ability, AbilityRegistry, GameEvent, TriggerTiming};
//!
//! let mut registry = AbilityRegistry::new();
//! let watcher = registry.register(
//!     Ability::listener("Phase watcher", events::PHASE_STARTED)
//!         .with_controller(PlayerId::new(1)),
//! );
//!
//! let state = GameState::new(&MatchConfig::new(2).with_standard_zones());
//! let cards = CardRegistry::new();
//! let event = GameEvent::new(events::PHASE_STARTED).with_value(1);
//!
//! let fired = registry.eligible(&event, TriggerTiming::After, &state, &cards);
//! assert_eq!(fired, vec![watcher]);
//! ```

mod ability;
mod condition;
mod event;
mod registry;

pub use ability::{
    Ability, AbilityCategory, AbilityHandler, AbilityId, AbilityPredicate, TargetSpec,
    TriggerTiming,
};
pub use condition::{ConditionContext, ConditionEvaluator, TriggerCondition};
pub use event::{events, playing_types, EventId, EventTypeId, GameEvent};
pub use registry::AbilityRegistry;
