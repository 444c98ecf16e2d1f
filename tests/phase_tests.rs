//! Phase controller integration tests.
//!
//! These tests walk the standard round: window prompts, deferred phase
//! advances, the round wrap, and which player actions each phase allows.

use std::sync::{Arc, Mutex};

use ccg_resolver::core::{EngineError, PhaseId, PlayerAction, PlayerId, PlayerSettings, ZoneRole};
use ccg_resolver::game::{Match, Outbound};
use ccg_resolver::games::thrones::{self, card_ids, phases, windows};
use ccg_resolver::phases::PhaseAdvance;
use ccg_resolver::prompts::PromptAnswer;
use ccg_resolver::stack::ResolutionStatus;
use ccg_resolver::triggers::{events, Ability};

const P0: PlayerId = PlayerId::new(0);
const P1: PlayerId = PlayerId::new(1);
const P2: PlayerId = PlayerId::new(2);

fn new_match(players: usize) -> Match {
    let registry = thrones::sample_registry().unwrap();
    Match::new(thrones::standard_config(players, 7), Arc::new(registry)).unwrap()
}

/// Advance phase by phase, passing every window prompt on the way.
fn advance_to(game: &mut Match, phase: PhaseId) {
    while game.current_phase().map(|p| p.id) != Some(phase) {
        while let Some(player) = window_holder(game) {
            game.pass(player).unwrap();
        }
        assert_eq!(game.request_phase_advance().unwrap(), PhaseAdvance::Advanced);
    }
}

fn window_holder(game: &Match) -> Option<PlayerId> {
    game.prompts()
        .active()
        .filter(|prompt| prompt.window.is_some())
        .map(|prompt| prompt.player)
}

#[test]
fn test_round_structure() {
    let mut game = new_match(2);
    game.start().unwrap();
    assert_eq!(game.current_phase().unwrap().id, phases::PLOT);
    assert_eq!(game.state().public.round, 1);

    advance_to(&mut game, phases::MARSHALING);
    let entered: Vec<String> = game
        .drain_outbound()
        .into_iter()
        .filter_map(|message| match message {
            Outbound::PhaseChanged { name, round, .. } => Some(format!("{name}@{round}")),
            _ => None,
        })
        .collect();
    assert_eq!(entered, vec!["plot@1", "draw@1", "marshaling@1"]);
}

/// A phase advance requested while a window prompt is outstanding waits
/// until every window of the phase has closed.
#[test]
fn test_advance_deferred_until_windows_close() {
    let mut game = new_match(2);
    game.start().unwrap();
    advance_to(&mut game, phases::MARSHALING);

    assert_eq!(game.request_phase_advance().unwrap(), PhaseAdvance::Advanced);
    assert_eq!(game.current_phase().unwrap().id, phases::CHALLENGES);
    assert_eq!(game.phases().open_window, Some(windows::ATTACKERS_DECLARED));
    assert_eq!(window_holder(&game), Some(P0));

    assert_eq!(game.request_phase_advance().unwrap(), PhaseAdvance::Deferred);
    assert!(game.phases().has_pending_advance());
    assert_eq!(game.current_phase().unwrap().id, phases::CHALLENGES);

    // attackers declared: P0 then P1; defenders declared: P0 then P1
    for expected in [P0, P1, P0] {
        assert_eq!(window_holder(&game), Some(expected));
        let status = game.perform(expected, PlayerAction::Pass).unwrap();
        assert!(status.is_waiting());
    }
    assert_eq!(game.phases().open_window, Some(windows::DEFENDERS_DECLARED));
    assert_eq!(game.pass(P1).unwrap(), ResolutionStatus::Complete);

    assert_eq!(game.current_phase().unwrap().id, phases::DOMINANCE);
    assert!(!game.phases().has_pending_advance());
    assert_eq!(game.phases().open_window, None);
}

/// A transition requested while a card's reaction prompt is unanswered
/// waits for that prompt, then runs.
#[test]
fn test_advance_deferred_until_reaction_prompt_resolves() {
    let mut game = new_match(2);
    game.start().unwrap();
    advance_to(&mut game, phases::MARSHALING);
    let queens_men = game.add_card(card_ids::QUEENS_MEN, P0, ZoneRole::Hand).unwrap();
    game.add_card(card_ids::HEDGE_KNIGHT, P1, ZoneRole::Hand).unwrap();

    let ResolutionStatus::AwaitingInput { player, prompt } = game.play_card(P0, queens_men).unwrap()
    else {
        panic!("expected the reveal prompt");
    };
    assert_eq!(player, P0);
    assert_eq!(window_holder(&game), None);

    assert_eq!(game.request_phase_advance().unwrap(), PhaseAdvance::Deferred);
    assert_eq!(game.current_phase().unwrap().id, phases::MARSHALING);
    assert!(game.phases().has_pending_advance());

    let status = game.respond(P0, prompt, PromptAnswer::Done).unwrap();
    assert!(status.is_waiting());
    assert_eq!(game.current_phase().unwrap().id, phases::CHALLENGES);
    assert_eq!(window_holder(&game), Some(P0));
    assert!(!game.phases().has_pending_advance());
}

/// Each deferred request moves the match one phase.
#[test]
fn test_deferred_requests_are_counted() {
    let mut game = new_match(2);
    game.start().unwrap();
    advance_to(&mut game, phases::CHALLENGES);
    assert_eq!(window_holder(&game), Some(P0));

    assert_eq!(game.request_phase_advance().unwrap(), PhaseAdvance::Deferred);
    assert_eq!(game.request_phase_advance().unwrap(), PhaseAdvance::Deferred);
    assert_eq!(game.phases().pending_advances(), 2);

    for player in [P0, P1, P0] {
        game.pass(player).unwrap();
    }
    assert_eq!(game.pass(P1).unwrap(), ResolutionStatus::Complete);

    // dominance and standing have no prompting windows by default
    assert_eq!(game.current_phase().unwrap().id, phases::STANDING);
    assert_eq!(game.phases().pending_advances(), 0);
}

#[test]
fn test_only_window_holder_may_pass() {
    let mut game = new_match(2);
    game.start().unwrap();
    advance_to(&mut game, phases::CHALLENGES);

    assert!(matches!(game.pass(P1), Err(EngineError::IllegalAction(_))));
    assert_eq!(window_holder(&game), Some(P0));
}

#[test]
fn test_player_settings_choose_prompting_windows() {
    let registry = thrones::sample_registry().unwrap();
    let config = thrones::standard_config(3, 7)
        .with_player(PlayerSettings::new("Arya").with_prompt_windows([]))
        .with_player(PlayerSettings::new("Bran").with_prompt_windows([windows::DOMINANCE]))
        .with_player(PlayerSettings::new("Catelyn"));
    let mut game = Match::new(config, Arc::new(registry)).unwrap();
    game.start().unwrap();

    advance_to(&mut game, phases::CHALLENGES);
    assert_eq!(window_holder(&game), Some(P2));
    game.pass(P2).unwrap();
    assert_eq!(window_holder(&game), Some(P2));
    assert_eq!(game.pass(P2).unwrap(), ResolutionStatus::Complete);

    game.request_phase_advance().unwrap();
    assert_eq!(game.current_phase().unwrap().id, phases::DOMINANCE);
    assert_eq!(window_holder(&game), Some(P1));
    assert_eq!(game.pass(P1).unwrap(), ResolutionStatus::Complete);
}

#[test]
fn test_round_wrap_raises_boundary_events() {
    let mut game = new_match(2);
    let seen = Arc::new(Mutex::new(Vec::new()));

    for (name, event_type) in [
        ("phase ended", events::PHASE_ENDED),
        ("round ended", events::ROUND_ENDED),
        ("phase started", events::PHASE_STARTED),
    ] {
        let log = Arc::clone(&seen);
        game.register_ability(
            Ability::listener(name, event_type)
                .with_controller(P0)
                .handler(move |ctx| {
                    let event = ctx.require_event()?;
                    log.lock().unwrap().push((ctx.name.clone(), event.value(0, 0)));
                    Ok(())
                }),
        );
    }
    game.start().unwrap();
    advance_to(&mut game, phases::TAXATION);
    seen.lock().unwrap().clear();

    assert_eq!(game.request_phase_advance().unwrap(), PhaseAdvance::Advanced);
    assert_eq!(game.state().public.round, 2);
    assert_eq!(game.state().public.active_player, game.state().public.first_player);
    assert_eq!(game.current_phase().unwrap().id, phases::PLOT);
    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            ("phase ended".to_string(), i64::from(phases::TAXATION.0)),
            ("round ended".to_string(), 1),
            ("phase started".to_string(), i64::from(phases::PLOT.0)),
        ]
    );
}

#[test]
fn test_play_card_only_when_marshaling_and_idle() {
    let mut game = new_match(2);
    let knight = game.add_card(card_ids::HEDGE_KNIGHT, P0, ZoneRole::Hand).unwrap();
    let enemy = game.add_card(card_ids::HEDGE_KNIGHT, P1, ZoneRole::Hand).unwrap();

    assert!(matches!(game.play_card(P0, knight), Err(EngineError::IllegalAction(_))));
    game.start().unwrap();
    assert!(matches!(game.play_card(P0, knight), Err(EngineError::IllegalAction(_))));

    advance_to(&mut game, phases::MARSHALING);
    assert!(matches!(game.play_card(P0, enemy), Err(EngineError::IllegalAction(_))));
    assert_eq!(
        game.perform(P0, PlayerAction::PlayCard { card: knight }).unwrap(),
        ResolutionStatus::Complete
    );
    assert!(game.state().is_in_play(knight));
    assert_eq!(game.state().public.action_history.len(), 1);

    // Not while a window prompt is outstanding
    let second = game.add_card(card_ids::HEDGE_KNIGHT, P1, ZoneRole::Hand).unwrap();
    game.request_phase_advance().unwrap();
    assert!(game.resolution_status().is_waiting());
    assert!(matches!(game.play_card(P1, second), Err(EngineError::IllegalAction(_))));
}

#[test]
fn test_actions_in_windows() {
    let mut game = new_match(2);
    let used = Arc::new(Mutex::new(Vec::new()));

    let mut register = |player: PlayerId| {
        let log = Arc::clone(&used);
        game.register_ability(
            Ability::action("Muster")
                .with_controller(player)
                .handler(move |ctx| {
                    log.lock().unwrap().push(ctx.controller);
                    Ok(())
                }),
        )
    };
    let mine = register(P0);
    let theirs = register(P1);

    game.start().unwrap();
    // The plot phase has no action window
    assert!(matches!(
        game.trigger_ability(P0, mine),
        Err(EngineError::IllegalAction(_))
    ));

    // Idle in a phase with an action window
    advance_to(&mut game, phases::MARSHALING);
    assert_eq!(
        game.perform(P0, PlayerAction::TriggerAbility { ability: mine }).unwrap(),
        ResolutionStatus::Complete
    );
    assert!(matches!(game.trigger_ability(P1, mine), Err(EngineError::IllegalAction(_))));

    // Inside the window prompt of the acting player only
    game.request_phase_advance().unwrap();
    assert_eq!(window_holder(&game), Some(P0));
    assert!(matches!(game.trigger_ability(P1, theirs), Err(EngineError::IllegalAction(_))));
    let status = game.trigger_ability(P0, mine).unwrap();
    assert_eq!(window_holder(&game), Some(P0));
    assert!(status.is_waiting());

    assert_eq!(*used.lock().unwrap(), vec![P0, P0]);
}

#[test]
fn test_conceded_players_are_not_prompted() {
    let mut game = new_match(3);
    game.start().unwrap();
    game.concede(P1).unwrap();

    advance_to(&mut game, phases::CHALLENGES);
    let mut prompted = Vec::new();
    while let Some(player) = window_holder(&game) {
        prompted.push(player);
        game.pass(player).unwrap();
    }
    assert_eq!(prompted, vec![P0, P2, P0, P2]);
}
