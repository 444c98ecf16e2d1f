//! Core engine types: entities, players, state, actions, RNG, configuration,
//! and errors.
//!
//! This module holds the game-agnostic building blocks of the state store.
//! Content configures zones, phases, and windows through `MatchConfig`
//! rather than by modifying the core.

pub mod action;
pub mod config;
pub mod entity;
pub mod error;
pub mod player;
pub mod rng;
pub mod state;

pub use action::{ActionRecord, PlayerAction};
pub use config::{
    MatchConfig, PhaseConfig, PhaseId, PlayerSettings, WindowConfig, WindowId, ZoneConfig,
    ZoneId, ZoneRole, ZoneVisibility,
};
pub use entity::{EntityId, IdAllocator};
pub use error::{EngineError, EngineResult, ResponseRejection};
pub use player::{PlayerId, PlayerMap};
pub use rng::{GameRng, GameRngState};
pub use state::{GameState, PublicState};
