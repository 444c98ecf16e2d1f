//! Match state: the canonical store of players, zones, and cards.
//!
//! ## PublicState
//!
//! Information every player may see:
//! - Phase, round, first and active player
//! - Per-player counters (gold, power, ...)
//! - Action history
//!
//! ## GameState
//!
//! Complete match state:
//! - Public state
//! - Zone manager (card locations)
//! - Card instances
//! - RNG
//!
//! All card movement goes through `GameState::move_card`, which keeps the
//! zone manager and each instance's `zone` field in agreement and maintains
//! the enter-play bookkeeping.

use im::Vector;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::action::ActionRecord;
use super::config::{MatchConfig, PhaseId, ZoneId, ZoneRole};
use super::entity::{EntityId, IdAllocator};
use super::error::{EngineError, EngineResult};
use super::player::{PlayerId, PlayerMap};
use super::rng::{GameRng, GameRngState};
use crate::cards::{CardId, CardInstance};
use crate::zones::{ZoneManager, ZonePosition};

/// Public match state - observable by all players.
///
/// Uses `im` persistent vectors for the history so snapshots stay cheap.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicState {
    player_count: usize,

    /// Current phase.
    pub phase: PhaseId,

    /// Round number (starts at 1 when the match starts).
    pub round: u32,

    /// First player of the current round.
    pub first_player: PlayerId,

    /// Player who has precedence for APNAP ordering.
    pub active_player: PlayerId,

    /// Accepted player actions so far.
    pub action_sequence: u32,

    /// Per-player counters - content defines keys.
    pub player_state: PlayerMap<FxHashMap<String, i64>>,

    /// Accepted player actions.
    pub action_history: Vector<ActionRecord>,
}

impl PublicState {
    /// Create a new public state.
    #[must_use]
    pub fn new(player_count: usize, first_player: PlayerId) -> Self {
        Self {
            player_count,
            phase: PhaseId::default(),
            round: 0,
            first_player,
            active_player: first_player,
            action_sequence: 0,
            player_state: PlayerMap::with_default(player_count),
            action_history: Vector::new(),
        }
    }

    /// Get player count.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.player_count
    }

    /// Iterate over all player IDs.
    pub fn player_ids(&self) -> impl Iterator<Item = PlayerId> {
        PlayerId::all(self.player_count)
    }

    /// Players in APNAP order from the active player.
    pub fn apnap_order(&self) -> impl Iterator<Item = PlayerId> {
        PlayerId::apnap(self.active_player, self.player_count)
    }

    /// APNAP position of a player.
    #[must_use]
    pub fn apnap_rank(&self, player: PlayerId) -> usize {
        player.apnap_rank(self.active_player, self.player_count)
    }

    /// Get a player counter with default.
    #[must_use]
    pub fn get_player_state(&self, player: PlayerId, key: &str, default: i64) -> i64 {
        self.player_state
            .get(player)
            .and_then(|m| m.get(key).copied())
            .unwrap_or(default)
    }

    /// Set a player counter.
    pub fn set_player_state(&mut self, player: PlayerId, key: impl Into<String>, value: i64) {
        self.player_state[player].insert(key.into(), value);
    }

    /// Modify a player counter by delta.
    pub fn modify_player_state(&mut self, player: PlayerId, key: &str, delta: i64) {
        let current = self.get_player_state(player, key, 0);
        self.player_state[player].insert(key.to_string(), current + delta);
    }

    /// Record an accepted action.
    pub fn record_action(&mut self, player: PlayerId, action: super::action::PlayerAction) {
        let sequence = self.action_sequence;
        self.action_sequence += 1;
        self.action_history
            .push_back(ActionRecord::new(player, action, self.round, sequence));
    }
}

/// Full match state including hidden information.
#[derive(Clone, Debug)]
pub struct GameState {
    /// Public state (observable by all).
    pub public: PublicState,

    /// Zone manager for card locations.
    pub zones: ZoneManager,

    /// Card instances by entity ID.
    cards: FxHashMap<EntityId, CardInstance>,

    /// Deterministic RNG.
    pub rng: GameRng,

    ids: IdAllocator,

    /// Counter stamped on cards as they enter play.
    play_sequence: u64,
}

impl GameState {
    /// Create an empty state for a configuration.
    #[must_use]
    pub fn new(config: &MatchConfig) -> Self {
        Self {
            public: PublicState::new(config.player_count, config.first_player),
            zones: ZoneManager::new(config.zones.clone()),
            cards: FxHashMap::default(),
            rng: GameRng::new(config.seed),
            ids: IdAllocator::default(),
            play_sequence: 0,
        }
    }

    pub(crate) fn from_parts(
        public: PublicState,
        zones: ZoneManager,
        cards: Vec<CardInstance>,
        rng: &GameRngState,
        play_sequence: u64,
    ) -> EngineResult<Self> {
        let mut ids = IdAllocator::default();
        let mut map = FxHashMap::default();
        for card in cards {
            ids.reserve_past(card.entity_id.raw());
            if map.insert(card.entity_id, card).is_some() {
                return Err(EngineError::Snapshot("duplicate card in snapshot".into()));
            }
        }
        let state = Self {
            public,
            zones,
            cards: map,
            rng: GameRng::from_state(rng),
            ids,
            play_sequence,
        };
        state
            .check_consistency()
            .map_err(|e| EngineError::Snapshot(e.to_string()))?;
        Ok(state)
    }

    /// Create a new card instance in a zone and return its id.
    pub fn create_card(
        &mut self,
        card_id: CardId,
        owner: PlayerId,
        zone: ZoneId,
    ) -> EngineResult<EntityId> {
        if !self.public.player_state.contains(owner) {
            return Err(EngineError::illegal(format!("{owner} is not seated")));
        }
        let entity = EntityId(self.ids.peek());
        self.zones.add_to_zone(entity, zone, ZonePosition::Top)?;
        self.ids.next();

        let mut instance = CardInstance::new(entity, card_id, owner, zone);
        if self.zones.is_in_play(entity) {
            self.play_sequence += 1;
            instance.entered_play = Some(self.play_sequence);
        }
        self.cards.insert(entity, instance);
        Ok(entity)
    }

    /// Get a card instance.
    #[must_use]
    pub fn card(&self, id: EntityId) -> Option<&CardInstance> {
        self.cards.get(&id)
    }

    pub(crate) fn card_mut(&mut self, id: EntityId) -> Option<&mut CardInstance> {
        self.cards.get_mut(&id)
    }

    /// Get a card instance or reject the request.
    pub fn require_card(&self, id: EntityId) -> EngineResult<&CardInstance> {
        self.cards
            .get(&id)
            .ok_or_else(|| EngineError::illegal(format!("unknown card {id}")))
    }

    /// Every card instance in zone order.
    pub fn cards(&self) -> impl Iterator<Item = &CardInstance> + '_ {
        self.zones.all_cards().filter_map(|id| self.cards.get(&id))
    }

    /// Whether a card is in a play area.
    #[must_use]
    pub fn is_in_play(&self, id: EntityId) -> bool {
        self.zones.is_in_play(id)
    }

    /// Cards in play, in zone order then entry order.
    #[must_use]
    pub fn cards_in_play(&self) -> Vec<EntityId> {
        self.zones.in_play().collect()
    }

    /// Find a player's zone for a role.
    pub fn zone_for(&self, owner: PlayerId, role: ZoneRole) -> EngineResult<ZoneId> {
        self.zones
            .zone_for(owner, role)
            .ok_or_else(|| EngineError::illegal(format!("{owner} has no {role:?} zone")))
    }

    /// Move a card, keeping the instance in step with the zone manager.
    ///
    /// Entering play stamps `entered_play`; leaving play stands the card,
    /// clears the stamp, and returns control to the owner.
    pub fn move_card(
        &mut self,
        id: EntityId,
        to: ZoneId,
        position: ZonePosition,
    ) -> EngineResult<ZoneId> {
        if !self.cards.contains_key(&id) {
            return Err(EngineError::illegal(format!("unknown card {id}")));
        }
        let was_in_play = self.zones.is_in_play(id);
        let from = self.zones.move_to_zone(id, to, position)?;
        let now_in_play = self.zones.is_in_play(id);

        let entered = !was_in_play && now_in_play;
        if entered {
            self.play_sequence += 1;
        }
        let sequence = self.play_sequence;

        let card = self
            .cards
            .get_mut(&id)
            .ok_or_else(|| EngineError::invariant(format!("{id} vanished during a move")))?;
        card.set_zone(to);
        if entered {
            card.entered_play = Some(sequence);
        } else if was_in_play && !now_in_play {
            card.entered_play = None;
            card.kneeling = false;
            let owner = card.owner();
            card.set_controller(owner);
        }
        Ok(from)
    }

    /// Change a card's controller. Returns the previous controller.
    pub fn set_controller(&mut self, id: EntityId, controller: PlayerId) -> EngineResult<PlayerId> {
        if !self.public.player_state.contains(controller) {
            return Err(EngineError::illegal(format!("{controller} is not seated")));
        }
        let card = self
            .cards
            .get_mut(&id)
            .ok_or_else(|| EngineError::illegal(format!("unknown card {id}")))?;
        let previous = card.controller();
        card.set_controller(controller);
        Ok(previous)
    }

    /// Shuffle a zone with the match RNG.
    pub fn shuffle(&mut self, zone: ZoneId) {
        self.zones.shuffle_zone(zone, &mut self.rng);
    }

    pub(crate) fn play_sequence(&self) -> u64 {
        self.play_sequence
    }

    /// Verify that zones and card instances agree.
    pub fn check_consistency(&self) -> EngineResult<()> {
        self.zones.check_consistency()?;
        if self.zones.total_cards() != self.cards.len() {
            return Err(EngineError::invariant(format!(
                "{} cards tracked by zones, {} instances",
                self.zones.total_cards(),
                self.cards.len()
            )));
        }
        for card in self.cards.values() {
            if self.zones.get_zone(card.entity_id) != Some(card.zone()) {
                return Err(EngineError::invariant(format!(
                    "{} believes it is in {} but is elsewhere",
                    card.entity_id,
                    card.zone()
                )));
            }
        }
        Ok(())
    }
}
