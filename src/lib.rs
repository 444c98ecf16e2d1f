//! # ccg-resolver
//!
//! The rules-resolution core of a turn-based multiplayer card game server:
//! events, triggered and action abilities, continuous modifiers, player
//! prompts, and the phase/round structure that hosts them.
//!
//! ## Design Principles
//!
//! 1. **Content Over Core**: Zones, phases, windows, card types, and card
//!    text are configuration and scripts. The engine knows none of them.
//!
//! 2. **N-Player First**: Ordering is APNAP (active player, then seat
//!    order) for any player count. Nothing assumes exactly two seats.
//!
//! 3. **One Pipeline**: Event windows, ability resolution, prompts, and
//!    phase steps all run on one LIFO pipeline. Work created while a step
//!    runs finishes before its parent continues.
//!
//! 4. **Derived, Not Stored**: Attribute values are recomputed from base
//!    values and active modifiers on every read, so an expiring modifier can
//!    never leave a stale value behind.
//!
//! ## Modules
//!
//! - `core`: ids, players, configuration, state store, actions, RNG, errors
//! - `zones`: zone contents and card movement
//! - `cards`: definitions, instances, scripts, and the card registry
//! - `effects`: selectors, modifiers, and the modifier engine
//! - `triggers`: events, conditions, abilities, and the ability registry
//! - `prompts`: prompt schemas and the prompt engine
//! - `stack`: the resolution pipeline and its steps
//! - `phases`: the phase controller
//! - `game`: the [`Match`] aggregate hosts talk to
//! - `games`: sample content

pub mod cards;
pub mod core;
pub mod effects;
pub mod game;
pub mod games;
pub mod phases;
pub mod prompts;
pub mod stack;
pub mod triggers;
pub mod zones;

// Re-export commonly used types
pub use crate::core::{
    EngineError, EngineResult, EntityId, GameState, MatchConfig, PhaseConfig, PhaseId,
    PlayerAction, PlayerId, PlayerMap, PlayerSettings, PublicState, WindowConfig, WindowId,
    ZoneConfig, ZoneId, ZoneRole, ZoneVisibility,
};

pub use crate::zones::{ZoneManager, ZonePosition};

pub use crate::cards::{attrs, CardDefinition, CardId, CardInstance, CardRegistry, CardScript, CardTypeId};

pub use crate::effects::{CardSelector, Duration, Modifier, ModifierEngine, ModifierId, ModifierSpec};

pub use crate::triggers::{
    events, playing_types, Ability, AbilityCategory, AbilityId, AbilityRegistry, EventId,
    EventTypeId, GameEvent, TriggerCondition, TriggerTiming,
};

pub use crate::prompts::{MenuButton, MenuSchema, PromptAnswer, PromptEngine, PromptId, SelectSchema};

pub use crate::stack::{EventStatus, ResolutionStatus};

pub use crate::phases::{PhaseAdvance, PhaseController};

pub use crate::game::{AbilityContext, Match, MatchSnapshot, MatchStatus, MatchView, Outbound};
