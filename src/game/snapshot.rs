//! Persistence and per-viewer views.
//!
//! ## MatchSnapshot
//!
//! Everything needed to rebuild an idle match: configuration, state store,
//! modifiers, phase controller, seats, and the game log. Abilities are
//! closures and are not stored; restoring re-registers the abilities of
//! every card in play from its script, in the order the cards entered play.
//! Abilities registered directly with `Match::register_ability` are not
//! restored.
//!
//! Snapshots can only be taken while nothing is resolving and no prompt is
//! outstanding, since pending continuations cannot be serialized.
//!
//! ## MatchView
//!
//! What one player may see: public zones, their own hand, counts for
//! everything hidden, and their active prompt.

use std::sync::Arc;

use im::Vector;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{LogMessage, Match, MatchStatus, Seat};
use crate::cards::{attrs, CardId, CardInstance, CardRegistry};
use crate::core::{
    EngineError, EngineResult, EntityId, GameRngState, GameState, MatchConfig, PhaseId, PlayerId,
    PlayerMap, PublicState, WindowId, ZoneId, ZoneRole, ZoneVisibility,
};
use crate::effects::{Modifier, ModifierEngine, SelectorContext};
use crate::phases::PhaseController;
use crate::prompts::{PromptEngine, PromptView};
use crate::stack::{EventLedger, Pipeline};
use crate::triggers::AbilityRegistry;
use crate::zones::ZoneManager;

/// Serializable state of an idle match.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub config: MatchConfig,
    pub public: PublicState,
    pub zones: ZoneManager,
    pub cards: Vec<CardInstance>,
    pub rng: GameRngState,
    pub play_sequence: u64,
    pub modifiers: Vec<Modifier>,
    pub phases: PhaseController,
    pub seats: PlayerMap<Seat>,
    pub log: Vector<LogMessage>,
    pub last_event: u64,
    pub status: MatchStatus,
}

impl MatchSnapshot {
    /// Encode with bincode.
    pub fn to_bytes(&self) -> EngineResult<Vec<u8>> {
        bincode::serialize(self).map_err(|e| EngineError::Snapshot(e.to_string()))
    }

    /// Decode from bincode.
    pub fn from_bytes(bytes: &[u8]) -> EngineResult<Self> {
        bincode::deserialize(bytes).map_err(|e| EngineError::Snapshot(e.to_string()))
    }
}

/// A card as one viewer sees it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardView {
    pub entity: EntityId,
    pub card: CardId,
    pub zone: ZoneId,
    pub owner: PlayerId,
    pub controller: PlayerId,
    pub kneeling: bool,
    /// Effective strength, for cards in play.
    pub strength: Option<i64>,
}

/// A seat as one viewer sees it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    pub player: PlayerId,
    pub name: String,
    pub connected: bool,
    pub conceded: bool,
    pub counters: FxHashMap<String, i64>,
    pub hand_size: usize,
    pub deck_size: usize,
}

/// The match from one player's seat.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchView {
    pub viewer: PlayerId,
    pub round: u32,
    pub phase: PhaseId,
    pub first_player: PlayerId,
    pub active_player: PlayerId,
    pub open_window: Option<WindowId>,
    pub players: Vec<PlayerView>,
    /// Only cards the viewer may see.
    pub cards: Vec<CardView>,
    /// The viewer's active prompt.
    pub prompt: Option<PromptView>,
}

impl Match {
    /// Capture the match for persistence.
    pub fn snapshot(&self) -> EngineResult<MatchSnapshot> {
        if !self.is_idle() || !self.prompts.is_empty() {
            return Err(EngineError::Snapshot(
                "cannot snapshot while resolution is pending".into(),
            ));
        }
        Ok(MatchSnapshot {
            config: self.config.clone(),
            public: self.state.public.clone(),
            zones: self.state.zones.clone(),
            cards: self.state.cards().cloned().collect(),
            rng: self.state.rng.state(),
            play_sequence: self.state.play_sequence(),
            modifiers: self.modifiers.modifiers().to_vec(),
            phases: self.phases.clone(),
            seats: self.seats.clone(),
            log: self.log.clone(),
            last_event: self.events.last_id(),
            status: self.status.clone(),
        })
    }

    /// Rebuild a match from a snapshot.
    pub fn restore(snapshot: MatchSnapshot, cards: Arc<CardRegistry>) -> EngineResult<Self> {
        snapshot.config.validate()?;
        if let Some(missing) = snapshot.cards.iter().find(|c| !cards.contains(c.card_id)) {
            return Err(EngineError::Snapshot(format!(
                "{} is not in the card registry",
                missing.card_id
            )));
        }
        let state = GameState::from_parts(
            snapshot.public,
            snapshot.zones,
            snapshot.cards,
            &snapshot.rng,
            snapshot.play_sequence,
        )?;

        let mut game = Self {
            config: snapshot.config,
            cards,
            state,
            abilities: AbilityRegistry::new(),
            modifiers: ModifierEngine::from_modifiers(snapshot.modifiers),
            prompts: PromptEngine::new(),
            phases: snapshot.phases,
            pipeline: Pipeline::new(),
            events: EventLedger::resume_after(snapshot.last_event),
            seats: snapshot.seats,
            log: snapshot.log,
            outbound: Default::default(),
            status: snapshot.status,
        };

        let mut in_play: Vec<(Option<u64>, EntityId, CardId)> = game
            .state
            .cards()
            .filter(|card| card.entered_play.is_some())
            .map(|card| (card.entered_play, card.entity_id, card.card_id))
            .collect();
        in_play.sort_unstable();
        for (_, entity, card_id) in in_play {
            if let Some(script) = game.cards.script(card_id) {
                for ability in script.abilities(entity) {
                    game.abilities.register(ability.with_source(entity));
                }
            }
        }

        info!(
            round = game.state.public.round,
            abilities = game.abilities.len(),
            "match restored"
        );
        Ok(game)
    }

    /// What `viewer` may see.
    pub fn view_for(&self, viewer: PlayerId) -> EngineResult<MatchView> {
        self.require_seat(viewer)?;
        let zones = &self.state.zones;
        let ctx = SelectorContext::new(&self.state, &self.cards);

        let players = self
            .seats
            .iter()
            .map(|(player, seat)| {
                let size = |role| zones.zone_for(player, role).map_or(0, |z| zones.zone_size(z));
                PlayerView {
                    player,
                    name: self.config.settings_for(player).name,
                    connected: seat.connected,
                    conceded: seat.conceded,
                    counters: self.state.public.player_state[player].clone(),
                    hand_size: size(ZoneRole::Hand),
                    deck_size: size(ZoneRole::DrawDeck),
                }
            })
            .collect();

        let cards = self
            .state
            .cards()
            .filter(|card| {
                zones.config(card.zone()).is_some_and(|zone| match zone.visibility {
                    ZoneVisibility::Public => true,
                    ZoneVisibility::OwnerOnly => zone.owner == Some(viewer),
                    ZoneVisibility::Hidden => false,
                })
            })
            .map(|card| {
                let in_play = self.state.is_in_play(card.entity_id);
                CardView {
                    entity: card.entity_id,
                    card: card.card_id,
                    zone: card.zone(),
                    owner: card.owner(),
                    controller: card.controller(),
                    kneeling: card.kneeling,
                    strength: in_play.then(|| {
                        self.modifiers
                            .compute_attribute(&ctx, card.entity_id, attrs::STRENGTH)
                    }),
                }
            })
            .collect();

        let prompt = self
            .prompts
            .active()
            .filter(|prompt| prompt.player == viewer)
            .map(|prompt| prompt.view(&ctx));

        let public = &self.state.public;
        Ok(MatchView {
            viewer,
            round: public.round,
            phase: public.phase,
            first_player: public.first_player,
            active_player: public.active_player,
            open_window: self.phases.open_window,
            players,
            cards,
            prompt,
        })
    }
}
