//! Card state changes.
//!
//! Every change a card can undergo is raised as an event whose default
//! effect performs it, so interrupts may cancel it and reactions see the
//! result. Each default effect re-checks that the change still makes sense
//! when it runs (the card may have moved while interrupts resolved) and
//! does nothing otherwise.
//!
//! | Operation | Event |
//! |---|---|
//! | `enter_play` / `put_into_play` | `CARD_ENTERS_PLAY` |
//! | `leave_play` | `CARD_LEFT_PLAY` |
//! | `kneel` / `stand` | `CARD_KNEELED` / `CARD_STOOD` |
//! | `discard_from_hand` | `CARD_DISCARDED` |
//! | `take_control` | `CONTROL_CHANGED` |
//! | `draw_cards` | `CARDS_DRAWN` |
//! | `after_challenge` | `AFTER_CHALLENGE` (no default effect) |

use rustc_hash::FxHashSet;
use tracing::debug;

use super::Match;
use crate::core::{EngineError, EngineResult, EntityId, PlayerId, ZoneRole};
use crate::effects::Duration;
use crate::triggers::{events, playing_types, EventId, GameEvent};
use crate::zones::ZonePosition;

impl Match {
    /// Register what a card's script grants while it is in play.
    pub(crate) fn attach_script(&mut self, card: EntityId) -> EngineResult<()> {
        let card_id = self.state.require_card(card)?.card_id;
        let Some(script) = self.cards.script(card_id) else {
            return Ok(());
        };
        for ability in script.abilities(card) {
            self.abilities.register(ability.with_source(card));
        }
        for spec in script.persistent_effects(card) {
            self.modifiers
                .apply(Some(card), spec.until(Duration::WhileSourceInPlay));
        }
        Ok(())
    }

    /// Drop everything a card granted or was singled out by.
    fn detach(&mut self, card: EntityId) {
        let abilities = self.abilities.unregister_all(card);
        let sourced = self.modifiers.expire_source(card);
        let targeted = self.modifiers.expire_target(card);
        debug!(card = %card, abilities, sourced, targeted, "card detached");
    }

    /// Bring a card into its controller's play area.
    ///
    /// `playing_type` tags the event (`playing_types::MARSHAL`,
    /// `playing_types::PUT`) so abilities can tell how the card arrived.
    pub fn enter_play(
        &mut self,
        card: EntityId,
        controller: PlayerId,
        playing_type: &str,
    ) -> EngineResult<EventId> {
        self.require_seat(controller)?;
        let from = self.state.require_card(card)?.zone();
        if self.state.is_in_play(card) {
            return Err(EngineError::illegal(format!("{card} is already in play")));
        }
        let to = self.state.zone_for(controller, ZoneRole::PlayArea)?;
        let event = GameEvent::for_card(events::CARD_ENTERS_PLAY, card, controller)
            .with_zone(from)
            .with_zone(to)
            .with_tag(playing_type)
            .cancelable();

        self.raise_event_with(event, move |game, _| {
            if game.state.zones.get_zone(card) != Some(from) {
                debug!(card = %card, "card moved before entering play");
                return Ok(());
            }
            game.state.move_card(card, to, ZonePosition::Top)?;
            game.state.set_controller(card, controller)?;
            game.attach_script(card)
        })
    }

    /// Put a card into play under its owner's control by an effect.
    pub fn put_into_play(&mut self, card: EntityId) -> EngineResult<EventId> {
        let owner = self.state.require_card(card)?.owner();
        self.enter_play(card, owner, playing_types::PUT)
    }

    /// Move cards from play to their owners' zones for `role`.
    ///
    /// Cards leaving simultaneously resolve in APNAP order of their
    /// controllers, then in the order they entered play.
    pub fn leave_play(&mut self, cards: &[EntityId], role: ZoneRole) -> EngineResult<Vec<EventId>> {
        let mut seen = FxHashSet::default();
        let mut leaving = Vec::with_capacity(cards.len());
        for &card in cards {
            if !seen.insert(card) {
                return Err(EngineError::illegal(format!("{card} listed twice")));
            }
            let instance = self.state.require_card(card)?;
            if !self.state.is_in_play(card) {
                return Err(EngineError::illegal(format!("{card} is not in play")));
            }
            let to = self.state.zone_for(instance.owner(), role)?;
            let rank = self.state.public.apnap_rank(instance.controller());
            leaving.push((rank, instance.entered_play, card, instance.controller(), instance.zone(), to));
        }
        leaving.sort_unstable_by_key(|&(rank, entered, card, ..)| (rank, entered, card));

        let mut raised = Vec::with_capacity(leaving.len());
        for (_, _, card, controller, from, to) in leaving {
            let event = GameEvent::for_card(events::CARD_LEFT_PLAY, card, controller)
                .with_zone(from)
                .with_zone(to)
                .cancelable();
            let id = self.raise_event_with(event, move |game, _| {
                if !game.state.is_in_play(card) {
                    debug!(card = %card, "card already left play");
                    return Ok(());
                }
                game.detach(card);
                game.state.move_card(card, to, ZonePosition::Top)?;
                Ok(())
            })?;
            raised.push(id);
        }
        Ok(raised)
    }

    /// Kneel a standing card in play.
    pub fn kneel(&mut self, card: EntityId) -> EngineResult<EventId> {
        let controller = self.require_in_play(card, false)?;
        let event = GameEvent::for_card(events::CARD_KNEELED, card, controller).cancelable();
        self.raise_event_with(event, move |game, _| {
            game.set_kneeling(card, true);
            Ok(())
        })
    }

    /// Stand a knelt card in play.
    pub fn stand(&mut self, card: EntityId) -> EngineResult<EventId> {
        let controller = self.require_in_play(card, true)?;
        let event = GameEvent::for_card(events::CARD_STOOD, card, controller).cancelable();
        self.raise_event_with(event, move |game, _| {
            game.set_kneeling(card, false);
            Ok(())
        })
    }

    fn require_in_play(&self, card: EntityId, kneeling: bool) -> EngineResult<PlayerId> {
        let instance = self.state.require_card(card)?;
        if !self.state.is_in_play(card) {
            return Err(EngineError::illegal(format!("{card} is not in play")));
        }
        if instance.kneeling != kneeling {
            let state = if instance.kneeling { "knelt" } else { "standing" };
            return Err(EngineError::illegal(format!("{card} is already {state}")));
        }
        Ok(instance.controller())
    }

    fn set_kneeling(&mut self, card: EntityId, kneeling: bool) {
        let in_play = self.state.is_in_play(card);
        match self.state.card_mut(card) {
            Some(instance) if in_play => instance.kneeling = kneeling,
            _ => debug!(card = %card, "card left play before the kneel state changed"),
        }
    }

    /// Discard a card from its owner's hand.
    pub fn discard_from_hand(&mut self, card: EntityId) -> EngineResult<EventId> {
        let instance = self.state.require_card(card)?;
        let owner = instance.owner();
        let from = instance.zone();
        if self.state.zones.role_of(card) != Some(ZoneRole::Hand) {
            return Err(EngineError::illegal(format!("{card} is not in a hand")));
        }
        let to = self.state.zone_for(owner, ZoneRole::DiscardPile)?;
        let event = GameEvent::for_card(events::CARD_DISCARDED, card, owner)
            .with_zone(from)
            .with_zone(to)
            .cancelable();
        self.raise_event_with(event, move |game, _| {
            if game.state.zones.get_zone(card) != Some(from) {
                debug!(card = %card, "card left hand before the discard");
                return Ok(());
            }
            game.state.move_card(card, to, ZonePosition::Top)?;
            Ok(())
        })
    }

    /// Give control of a card in play to another player.
    pub fn take_control(&mut self, card: EntityId, controller: PlayerId) -> EngineResult<EventId> {
        self.require_seat(controller)?;
        let previous = self.state.require_card(card)?.controller();
        if !self.state.is_in_play(card) {
            return Err(EngineError::illegal(format!("{card} is not in play")));
        }
        if previous == controller {
            return Err(EngineError::illegal(format!("{controller} already controls {card}")));
        }
        let to = self.state.zone_for(controller, ZoneRole::PlayArea)?;
        let event = GameEvent::for_card(events::CONTROL_CHANGED, card, controller)
            .with_other_player(previous)
            .with_zone(to)
            .cancelable();
        self.raise_event_with(event, move |game, _| {
            if !game.state.is_in_play(card) {
                debug!(card = %card, "card left play before control changed");
                return Ok(());
            }
            game.state.move_card(card, to, ZonePosition::Top)?;
            game.state.set_controller(card, controller)?;
            Ok(())
        })
    }

    /// Draw up to `count` cards from the top of the player's draw deck.
    pub fn draw_cards(&mut self, player: PlayerId, count: usize) -> EngineResult<EventId> {
        let deck = self.state.zone_for(player, ZoneRole::DrawDeck)?;
        let hand = self.state.zone_for(player, ZoneRole::Hand)?;
        let event = GameEvent::for_player(events::CARDS_DRAWN, player)
            .with_value(i64::try_from(count).unwrap_or(i64::MAX))
            .cancelable();
        self.raise_event_with(event, move |game, _| {
            for _ in 0..count {
                let Some(top) = game.state.zones.top_card(deck) else {
                    debug!(player = %player, "draw deck empty");
                    break;
                };
                game.state.move_card(top, hand, ZonePosition::Top)?;
            }
            Ok(())
        })
    }

    /// Announce the result of a challenge.
    ///
    /// `participants` are the attacking and defending cards; the challenge
    /// type is carried as a tag.
    pub fn after_challenge(
        &mut self,
        winner: PlayerId,
        loser: PlayerId,
        challenge: &str,
        participants: &[EntityId],
    ) -> EngineResult<EventId> {
        self.require_seat(winner)?;
        self.require_seat(loser)?;
        let event = participants.iter().fold(
            GameEvent::for_player(events::AFTER_CHALLENGE, winner)
                .with_other_player(loser)
                .with_tag(challenge),
            |event, &card| event.with_entity(card),
        );
        self.raise_event(event)
    }
}
