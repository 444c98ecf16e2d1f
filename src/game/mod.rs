//! The match aggregate.
//!
//! A [`Match`] owns everything one game needs: configuration, card catalog,
//! state store, ability registry, modifier engine, prompt engine, phase
//! controller, and the resolution pipeline. Hosts drive it with player
//! actions and phase advance requests; cards drive it through
//! [`AbilityContext`] while their handlers run.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use ccg_resolver::cards::CardRegistry;
//! use ccg_resolver::core::{MatchConfig, PhaseConfig, PhaseId};
//! use ccg_resolver::game::Match;
//! use ccg_resolver::stack::ResolutionStatus;
//!
//! let config = MatchConfig::new(2)
//!     .with_standard_zones()
//!     .with_phase(PhaseConfig::new(PhaseId::new(1), "draw"))
//!     .with_phase(PhaseConfig::new(PhaseId::new(2), "marshaling").allowing_marshal());
//!
//! let mut game = Match::new(config, Arc::new(CardRegistry::new())).unwrap();
//! assert_eq!(game.start().unwrap(), ResolutionStatus::Complete);
//! assert_eq!(game.state().public.round, 1);
//!
//! game.request_phase_advance().unwrap();
//! assert_eq!(game.current_phase().unwrap().name, "marshaling");
//! ```
//!
//! ## Modules
//!
//! - `interaction`: player actions, prompts, connection handling
//! - `operations`: card state changes raised as events
//! - `context`: [`AbilityContext`] handed to ability handlers
//! - `snapshot`: persistence and per-viewer views
//! - `log`: the human-readable game log

mod context;
mod interaction;
mod log;
mod operations;
mod snapshot;

pub use context::AbilityContext;
pub use log::{render, LogArg, LogMessage};
pub use snapshot::{CardView, MatchSnapshot, MatchView, PlayerView};

use std::collections::VecDeque;
use std::sync::Arc;

use im::Vector;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cards::CardRegistry;
use crate::core::{
    EngineError, EngineResult, EntityId, GameState, MatchConfig, PhaseConfig, PhaseId, PlayerId,
    PlayerMap, ZoneRole,
};
use crate::effects::{Modifier, ModifierEngine, ModifierId, ModifierSpec, SelectorContext};
use crate::phases::{PhaseAdvance, PhaseController, PhaseStep};
use crate::prompts::{PromptEngine, PromptView};
use crate::stack::{DefaultEffect, EventLedger, EventStatus, EventWindow, Pipeline, ResolutionStatus};
use crate::triggers::{Ability, AbilityId, AbilityRegistry, EventId, GameEvent};

/// Connection state of one seat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    pub connected: bool,
    pub conceded: bool,
}

impl Default for Seat {
    fn default() -> Self {
        Self {
            connected: true,
            conceded: false,
        }
    }
}

/// Lifecycle of a match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchStatus {
    Active,
    /// Every other player conceded.
    Finished { winner: PlayerId },
    /// Stopped by the host or by an invariant violation.
    Terminated { reason: String },
}

/// Messages for the transport, drained with [`Match::drain_outbound`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outbound {
    /// A prompt became active.
    Prompt(PromptView),
    /// A prompt was answered and resolved.
    PromptClosed {
        prompt: crate::prompts::PromptId,
        player: PlayerId,
    },
    /// A game log line.
    Message(LogMessage),
    PhaseChanged {
        phase: PhaseId,
        name: String,
        round: u32,
    },
    Finished { winner: PlayerId },
    Terminated { reason: String },
}

/// One match in progress.
pub struct Match {
    pub(crate) config: MatchConfig,
    pub(crate) cards: Arc<CardRegistry>,
    pub(crate) state: GameState,
    pub(crate) abilities: AbilityRegistry,
    pub(crate) modifiers: ModifierEngine,
    pub(crate) prompts: PromptEngine,
    pub(crate) phases: PhaseController,
    pub(crate) pipeline: Pipeline,
    pub(crate) events: EventLedger,
    pub(crate) seats: PlayerMap<Seat>,
    pub(crate) log: Vector<LogMessage>,
    pub(crate) outbound: VecDeque<Outbound>,
    pub(crate) status: MatchStatus,
}

impl std::fmt::Debug for Match {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Match")
            .field("status", &self.status)
            .field("round", &self.state.public.round)
            .field("phase", &self.state.public.phase)
            .field("pipeline", &self.pipeline)
            .field("prompts", &self.prompts.len())
            .field("abilities", &self.abilities.len())
            .field("modifiers", &self.modifiers.len())
            .finish()
    }
}

impl Match {
    /// Create a match. The configuration is validated first.
    pub fn new(config: MatchConfig, cards: Arc<CardRegistry>) -> EngineResult<Self> {
        config.validate()?;
        let state = GameState::new(&config);
        let seats = PlayerMap::with_default(config.player_count);
        info!(players = config.player_count, seed = config.seed, "match created");
        Ok(Self {
            config,
            cards,
            state,
            abilities: AbilityRegistry::new(),
            modifiers: ModifierEngine::new(),
            prompts: PromptEngine::new(),
            phases: PhaseController::new(),
            pipeline: Pipeline::new(),
            events: EventLedger::new(),
            seats,
            log: Vector::new(),
            outbound: VecDeque::new(),
            status: MatchStatus::Active,
        })
    }

    /// Create a card for `owner` in their zone for `role`.
    ///
    /// Setup only: no events are raised. A card created in play gets its
    /// abilities and persistent effects immediately.
    pub fn add_card(
        &mut self,
        card: crate::cards::CardId,
        owner: PlayerId,
        role: ZoneRole,
    ) -> EngineResult<EntityId> {
        self.ensure_active()?;
        if !self.cards.contains(card) {
            return Err(EngineError::illegal(format!("{card} is not in the card registry")));
        }
        let zone = self.state.zone_for(owner, role)?;
        let entity = self.state.create_card(card, owner, zone)?;
        if self.state.is_in_play(entity) {
            self.attach_script(entity)?;
        }
        Ok(entity)
    }

    /// Begin round one: enter the first phase.
    pub fn start(&mut self) -> EngineResult<ResolutionStatus> {
        self.ensure_active()?;
        if self.phases.is_started() {
            return Err(EngineError::illegal("match already started"));
        }
        self.phases.mark_started();
        let public = &mut self.state.public;
        public.round = 1;
        public.active_player = public.first_player;
        info!(first_player = %public.first_player, "match started");
        self.enqueue(Box::new(PhaseStep::start()))
    }

    /// Ask the phase controller to move on.
    ///
    /// Runs immediately when nothing is pending, otherwise once the
    /// pipeline drains.
    pub fn request_phase_advance(&mut self) -> EngineResult<PhaseAdvance> {
        self.ensure_active()?;
        if !self.phases.is_started() {
            return Err(EngineError::illegal("match has not started"));
        }
        if self.is_idle() {
            self.enqueue(Box::new(PhaseStep::next()))?;
            Ok(PhaseAdvance::Advanced)
        } else {
            debug!(pending = self.pipeline.depth(), "phase advance deferred");
            self.phases.defer_advance();
            Ok(PhaseAdvance::Deferred)
        }
    }

    /// Raise an event with no default effect.
    pub fn raise_event(&mut self, event: GameEvent) -> EngineResult<EventId> {
        self.raise(event, None)
    }

    /// Raise an event whose default effect runs between interrupts and
    /// reactions unless the event is canceled.
    pub fn raise_event_with<F>(&mut self, event: GameEvent, default: F) -> EngineResult<EventId>
    where
        F: FnOnce(&mut Match, &GameEvent) -> EngineResult<()> + Send + 'static,
    {
        self.raise(event, Some(Box::new(default)))
    }

    fn raise(&mut self, mut event: GameEvent, default: Option<DefaultEffect>) -> EngineResult<EventId> {
        self.ensure_active()?;
        if !event.id.is_assigned() {
            event.id = self.events.assign();
        }
        let id = event.id;
        debug!(event = %id, event_type = %event.event_type, "event raised");
        self.enqueue(Box::new(EventWindow::new(event, default)))?;
        Ok(id)
    }

    /// Resolution status of an event occurrence.
    #[must_use]
    pub fn event_status(&self, id: EventId) -> Option<EventStatus> {
        self.events.status(id)
    }

    /// Effective value of a card attribute.
    #[must_use]
    pub fn compute_attribute(&self, card: EntityId, attribute: &str) -> i64 {
        let ctx = SelectorContext::new(&self.state, &self.cards);
        self.modifiers.compute_attribute(&ctx, card, attribute)
    }

    /// Register a modifier created by `source`.
    pub fn apply_effect(&mut self, source: Option<EntityId>, spec: ModifierSpec) -> ModifierId {
        self.modifiers.apply(source, spec)
    }

    /// Remove a modifier explicitly.
    pub fn remove_effect(&mut self, id: ModifierId) -> EngineResult<Modifier> {
        self.modifiers.remove(id)
    }

    /// Register an ability not granted by a card script.
    pub fn register_ability(&mut self, ability: Ability) -> AbilityId {
        self.abilities.register(ability)
    }

    /// Remove one ability.
    pub fn unregister_ability(&mut self, id: AbilityId) -> Option<Ability> {
        self.abilities.unregister(id)
    }

    /// The next player after `player` in seat order who is still playing.
    #[must_use]
    pub fn opponent_of(&self, player: PlayerId) -> Option<PlayerId> {
        self.opponents_of(player).into_iter().next()
    }

    /// Every other player still playing, in seat order after `player`.
    #[must_use]
    pub fn opponents_of(&self, player: PlayerId) -> Vec<PlayerId> {
        PlayerId::apnap(player, self.config.player_count)
            .skip(1)
            .filter(|&other| !self.has_conceded(other))
            .collect()
    }

    /// Take every queued outbound message.
    pub fn drain_outbound(&mut self) -> Vec<Outbound> {
        self.outbound.drain(..).collect()
    }

    pub(crate) fn emit(&mut self, message: Outbound) {
        self.outbound.push_back(message);
    }

    /// Whether a player can answer prompts right now.
    #[must_use]
    pub fn can_answer(&self, player: PlayerId) -> bool {
        self.seats
            .get(player)
            .is_some_and(|seat| seat.connected && !seat.conceded)
    }

    /// Whether a player has left the match.
    #[must_use]
    pub fn has_conceded(&self, player: PlayerId) -> bool {
        self.seats.get(player).is_some_and(|seat| seat.conceded)
    }

    /// Seat state of a player.
    #[must_use]
    pub fn seat(&self, player: PlayerId) -> Option<Seat> {
        self.seats.get(player).copied()
    }

    pub(crate) fn require_seat(&self, player: PlayerId) -> EngineResult<()> {
        if self.seats.contains(player) {
            Ok(())
        } else {
            Err(EngineError::illegal(format!("{player} is not seated")))
        }
    }

    /// Whether the match still accepts input.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == MatchStatus::Active
    }

    pub(crate) fn ensure_active(&self) -> EngineResult<()> {
        match &self.status {
            MatchStatus::Active => Ok(()),
            MatchStatus::Finished { winner } => {
                Err(EngineError::Terminated(format!("{winner} has won")))
            }
            MatchStatus::Terminated { reason } => Err(EngineError::Terminated(reason.clone())),
        }
    }

    /// Stop the match. Pending resolution and prompts are dropped; completed
    /// effects stay.
    pub fn terminate(&mut self, reason: impl Into<String>) {
        if !self.is_active() {
            return;
        }
        let reason = reason.into();
        info!(reason = %reason, "match terminated");
        self.status = MatchStatus::Terminated {
            reason: reason.clone(),
        };
        self.abandon_all();
        self.prompts.clear();
        self.emit(Outbound::Terminated { reason });
    }

    pub(crate) fn finish(&mut self, winner: PlayerId) {
        info!(winner = %winner, "match finished");
        self.status = MatchStatus::Finished { winner };
        self.abandon_all();
        self.prompts.clear();
        self.emit(Outbound::Finished { winner });
    }

    /// Whether nothing is pending or resolving.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.pipeline.is_idle() && !self.pipeline.is_running()
    }

    /// Where resolution stands right now.
    #[must_use]
    pub fn resolution_status(&self) -> ResolutionStatus {
        if !self.is_active() {
            return ResolutionStatus::Terminated;
        }
        if let Some(prompt) = self.prompts.active() {
            return ResolutionStatus::AwaitingInput {
                player: prompt.player,
                prompt: prompt.id,
            };
        }
        if self.pipeline.is_idle() {
            ResolutionStatus::Complete
        } else {
            ResolutionStatus::Processing
        }
    }

    /// Configuration of the current phase, once the match has started.
    #[must_use]
    pub fn current_phase(&self) -> Option<&PhaseConfig> {
        if !self.phases.is_started() {
            return None;
        }
        self.config.phases.get(self.phases.phase_index)
    }

    // === Read access ===

    #[must_use]
    pub fn status(&self) -> &MatchStatus {
        &self.status
    }

    #[must_use]
    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    #[must_use]
    pub fn cards(&self) -> &CardRegistry {
        &self.cards
    }

    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Mutable state for host-side setup (counters, deck order). Changes
    /// made here raise no events.
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    #[must_use]
    pub fn abilities(&self) -> &AbilityRegistry {
        &self.abilities
    }

    #[must_use]
    pub fn modifiers(&self) -> &ModifierEngine {
        &self.modifiers
    }

    #[must_use]
    pub fn prompts(&self) -> &PromptEngine {
        &self.prompts
    }

    #[must_use]
    pub fn phases(&self) -> &PhaseController {
        &self.phases
    }

    #[must_use]
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }
}
