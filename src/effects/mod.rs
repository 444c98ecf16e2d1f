//! Modifier/effect engine.
//!
//! - `selector`: `CardSelector`, a data-only predicate over cards
//! - `modifier`: `Modifier`, `ModifierSpec`, operations, and durations
//! - `engine`: `ModifierEngine`, which folds modifiers into derived values
//!
//! ## Example
//!
//! ```
//! use ccg_resolver::cards::{attrs, CardDefinition, CardId, CardRegistry, CardTypeId};
//! use ccg_resolver::core::{GameState, MatchConfig, PlayerId, ZoneRole};
//! use ccg_resolver::effects::{CardSelector, ModifierEngine, ModifierSpec, SelectorContext};
//!
//! let mut cards = CardRegistry::new();
//! cards.register(
//!     CardDefinition::new(CardId::new(1), "Pup", CardTypeId::new(1)).with_trait("Direwolf"),
//! ).unwrap();
//!
//! let mut state = GameState::new(&MatchConfig::new(2).with_standard_zones());
//! let play = state.zone_for(PlayerId::new(0), ZoneRole::PlayArea).unwrap();
//! let a = state.create_card(CardId::new(1), PlayerId::new(0), play).unwrap();
//! let b = state.create_card(CardId::new(1), PlayerId::new(0), play).unwrap();
//!
//! let mut engine = ModifierEngine::new();
//! for pup in [a, b] {
//!     engine.apply(Some(pup), ModifierSpec::add_per_card(
//!         attrs::STRENGTH, 1, CardSelector::HasTrait("Direwolf".into()),
//!     ));
//! }
//!
//! let ctx = SelectorContext::new(&state, &cards);
//! assert_eq!(engine.compute_attribute(&ctx, a, attrs::STRENGTH), 1);
//! assert_eq!(engine.compute_attribute(&ctx, b, attrs::STRENGTH), 1);
//! ```

pub mod engine;
pub mod modifier;
pub mod selector;

pub use engine::ModifierEngine;
pub use modifier::{Duration, Modifier, ModifierId, ModifierOp, ModifierSpec};
pub use selector::{CardSelector, SelectorContext};
