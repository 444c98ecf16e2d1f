//! Snapshot and view integration tests.
//!
//! These tests verify that an idle match survives a bincode round-trip with
//! its modifiers, abilities, and phase position intact, and that per-player
//! views only show what each seat may see.

use std::sync::Arc;

use ccg_resolver::cards::{attrs, CardRegistry};
use ccg_resolver::core::{EngineError, PlayerAction, PlayerId, ZoneRole};
use ccg_resolver::effects::{CardSelector, Duration, ModifierSpec};
use ccg_resolver::game::{Match, MatchSnapshot, MatchView};
use ccg_resolver::games::thrones::{self, card_ids, phases};
use ccg_resolver::prompts::PromptAnswer;
use ccg_resolver::stack::ResolutionStatus;
use ccg_resolver::triggers::{events, GameEvent};

const P0: PlayerId = PlayerId::new(0);
const P1: PlayerId = PlayerId::new(1);

fn registry() -> Arc<CardRegistry> {
    Arc::new(thrones::sample_registry().unwrap())
}

fn marshaling_match() -> Match {
    let mut game = Match::new(thrones::standard_config(2, 99), registry()).unwrap();
    game.start().unwrap();
    game.request_phase_advance().unwrap();
    game.request_phase_advance().unwrap();
    assert_eq!(game.current_phase().unwrap().id, phases::MARSHALING);
    game
}

fn round_trip(game: &Match) -> Match {
    let bytes = game.snapshot().unwrap().to_bytes().unwrap();
    let snapshot = MatchSnapshot::from_bytes(&bytes).unwrap();
    Match::restore(snapshot, registry()).unwrap()
}

#[test]
fn test_restore_preserves_derived_values() {
    let mut game = marshaling_match();
    let pup = game.add_card(card_ids::DIREWOLF_PUP, P0, ZoneRole::PlayArea).unwrap();
    let wolf = game.add_card(card_ids::GREY_WIND, P0, ZoneRole::PlayArea).unwrap();
    game.add_card(card_ids::QUEENS_MEN, P0, ZoneRole::PlayArea).unwrap();
    game.apply_effect(
        None,
        ModifierSpec::add(attrs::STRENGTH, 3)
            .on(CardSelector::Card(wolf))
            .until(Duration::UntilEndOfPhase),
    );
    game.kneel(wolf).unwrap();
    game.add_message("{0} prepares", &[P0.into()]);

    let restored = round_trip(&game);
    assert_eq!(restored.state().public, game.state().public);
    assert_eq!(restored.phases(), game.phases());
    assert_eq!(restored.modifiers().modifiers(), game.modifiers().modifiers());
    assert_eq!(restored.abilities().len(), game.abilities().len());
    assert_eq!(restored.log().count(), game.log().count());
    assert_eq!(restored.compute_attribute(pup, attrs::STRENGTH), 1);
    assert_eq!(restored.compute_attribute(wolf, attrs::STRENGTH), 7);
    assert!(restored.state().card(wolf).unwrap().kneeling);
    assert!(restored.state().check_consistency().is_ok());
}

#[test]
fn test_restored_match_keeps_playing() {
    let mut game = marshaling_match();
    let queens_men = game.add_card(card_ids::QUEENS_MEN, P0, ZoneRole::Hand).unwrap();
    let knight = game.add_card(card_ids::HEDGE_KNIGHT, P0, ZoneRole::PlayArea).unwrap();
    let location = game.add_card(card_ids::THE_KINGSROAD, P1, ZoneRole::Hand).unwrap();
    let last_event = game.raise_event(GameEvent::new(events::AFTER_CHALLENGE)).unwrap();

    let mut restored = round_trip(&game);
    let status = restored.perform(P0, PlayerAction::PlayCard { card: queens_men }).unwrap();
    let ResolutionStatus::AwaitingInput { prompt, .. } = status else {
        panic!("expected the reveal prompt, got {status:?}");
    };
    let status = restored.respond(P0, prompt, PromptAnswer::Button(0)).unwrap();
    let ResolutionStatus::AwaitingInput { prompt, .. } = status else {
        panic!("expected the kneel prompt, got {status:?}");
    };
    restored.respond(P0, prompt, PromptAnswer::card(knight)).unwrap();
    assert_eq!(restored.state().zones.role_of(location), Some(ZoneRole::DiscardPile));

    // Event ids continue after the restored ones
    let next = restored.raise_event(GameEvent::new(events::AFTER_CHALLENGE)).unwrap();
    assert!(next > last_event);

    // The original is unaffected
    assert_eq!(game.state().zones.role_of(location), Some(ZoneRole::Hand));
}

#[test]
fn test_snapshot_requires_idle_match() {
    let mut game = marshaling_match();
    let queens_men = game.add_card(card_ids::QUEENS_MEN, P0, ZoneRole::Hand).unwrap();
    game.add_card(card_ids::HEDGE_KNIGHT, P1, ZoneRole::Hand).unwrap();
    game.play_card(P0, queens_men).unwrap();

    assert!(game.resolution_status().is_waiting());
    assert!(matches!(game.snapshot(), Err(EngineError::Snapshot(_))));
}

#[test]
fn test_restore_rejects_unknown_cards_and_bad_bytes() {
    let mut game = marshaling_match();
    game.add_card(card_ids::HEDGE_KNIGHT, P0, ZoneRole::Hand).unwrap();
    let snapshot = game.snapshot().unwrap();

    let empty = Arc::new(CardRegistry::new());
    assert!(matches!(Match::restore(snapshot, empty), Err(EngineError::Snapshot(_))));
    assert!(matches!(
        MatchSnapshot::from_bytes(&[0xff, 0x01]),
        Err(EngineError::Snapshot(_))
    ));
}

#[test]
fn test_view_hides_other_hands() {
    let mut game = marshaling_match();
    let mine = game.add_card(card_ids::HEDGE_KNIGHT, P0, ZoneRole::Hand).unwrap();
    let theirs = game.add_card(card_ids::STANNIS_BARATHEON, P1, ZoneRole::Hand).unwrap();
    let deck = game.add_card(card_ids::GREY_WIND, P0, ZoneRole::DrawDeck).unwrap();
    let wolf = game.add_card(card_ids::GREY_WIND, P1, ZoneRole::PlayArea).unwrap();

    let view = game.view_for(P0).unwrap();
    let visible: Vec<_> = view.cards.iter().map(|card| card.entity).collect();
    assert!(visible.contains(&mine));
    assert!(visible.contains(&wolf));
    assert!(!visible.contains(&theirs));
    assert!(!visible.contains(&deck));

    let wolf_view = view.cards.iter().find(|card| card.entity == wolf).unwrap();
    assert_eq!(wolf_view.strength, Some(4));
    let hand_view = view.cards.iter().find(|card| card.entity == mine).unwrap();
    assert_eq!(hand_view.strength, None);

    assert_eq!(view.players[1].hand_size, 1);
    assert_eq!(view.players[0].deck_size, 1);
    assert_eq!(view.phase, phases::MARSHALING);

    // Views are plain data for the transport
    let json = serde_json::to_string(&view).unwrap();
    let decoded: MatchView = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, view);

    assert!(game.view_for(PlayerId::new(5)).is_err());
}

#[test]
fn test_view_shows_only_own_prompt() {
    let mut game = marshaling_match();
    let queens_men = game.add_card(card_ids::QUEENS_MEN, P0, ZoneRole::Hand).unwrap();
    game.add_card(card_ids::HEDGE_KNIGHT, P1, ZoneRole::Hand).unwrap();
    game.play_card(P0, queens_men).unwrap();

    assert!(game.view_for(P0).unwrap().prompt.is_some());
    assert!(game.view_for(P1).unwrap().prompt.is_none());
}
