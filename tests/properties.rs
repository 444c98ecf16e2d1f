use std::sync::{Arc, Mutex};

use proptest::prelude::*;

use ccg_resolver::cards::{attrs, CardDefinition, CardId, CardRegistry, CardTypeId};
use ccg_resolver::core::{MatchConfig, PhaseConfig, PhaseId, PlayerId, ZoneRole};
use ccg_resolver::effects::{CardSelector, ModifierSpec};
use ccg_resolver::game::{render, LogArg, Match};
use ccg_resolver::triggers::{events, Ability, EventTypeId, GameEvent};

const SOLDIER: CardId = CardId::new(1);
const RALLIED: EventTypeId = EventTypeId::new(events::FIRST_CUSTOM);

fn new_match(players: usize, first: u8) -> Match {
    let mut cards = CardRegistry::new();
    cards
        .register(
            CardDefinition::new(SOLDIER, "Soldier", CardTypeId::new(1)).with_attr(attrs::STRENGTH, 2),
        )
        .unwrap();
    let config = MatchConfig::new(players)
        .with_standard_zones()
        .with_first_player(PlayerId::new(first))
        .with_phase(PhaseConfig::new(PhaseId::new(1), "main"));
    let mut game = Match::new(config, Arc::new(cards)).unwrap();
    game.start().unwrap();
    game
}

fn setup() -> impl Strategy<Value = (usize, u8)> {
    (2usize..=8).prop_flat_map(|players| (Just(players), 0..players as u8))
}

#[derive(Clone, Debug)]
enum Op {
    Add(i64),
    Set(i64),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![(-5i64..=5).prop_map(Op::Add), (0i64..=9).prop_map(Op::Set)]
}

proptest! {
    /// Every seat appears once, starting with the active player, at its rank.
    #[test]
    fn apnap_is_a_rotation((players, active) in setup()) {
        let active = PlayerId::new(active);
        let order: Vec<PlayerId> = PlayerId::apnap(active, players).collect();

        prop_assert_eq!(order.len(), players);
        prop_assert_eq!(order[0], active);
        for (rank, player) in order.iter().enumerate() {
            prop_assert_eq!(player.apnap_rank(active, players), rank);
        }
        let mut sorted = order.clone();
        sorted.sort();
        prop_assert_eq!(sorted, PlayerId::all(players).collect::<Vec<_>>());
    }

    /// Templates without placeholders render unchanged.
    #[test]
    fn render_without_braces_is_identity(template in "[^{}]*") {
        let rendered = render(&template, &[LogArg::from(7i64)], |_| "X".to_string());
        prop_assert_eq!(rendered, template);
    }

    /// Arbitrary templates never panic, and text outside braces survives.
    #[test]
    fn render_accepts_any_template(template in "\\PC*", args in 0usize..3) {
        let args: Vec<LogArg> = (0..args as i64).map(LogArg::from).collect();
        let rendered = render(&template, &args, |_| String::new());
        let kept: String = template.chars().filter(|c| !"{}+0123456789".contains(*c)).collect();
        let survived: String = rendered.chars().filter(|c| !"{}+0123456789".contains(*c)).collect();
        prop_assert_eq!(survived, kept);
    }

    /// Forced abilities resolve before optional ones, then by APNAP rank of
    /// the controller, then by registration.
    #[test]
    fn reactions_resolve_in_order(
        (players, first) in setup(),
        specs in prop::collection::vec((any::<bool>(), 0u8..8), 0..12),
    ) {
        let mut game = new_match(players, first);
        let trace = Arc::new(Mutex::new(Vec::new()));

        let specs: Vec<(bool, u8)> = specs
            .into_iter()
            .map(|(forced, seat)| (forced, seat % players as u8))
            .collect();
        for (index, &(forced, seat)) in specs.iter().enumerate() {
            let ability = if forced {
                Ability::forced_reaction("Rally")
            } else {
                Ability::reaction("Rally")
            };
            let seen = Arc::clone(&trace);
            game.register_ability(
                ability
                    .on(RALLIED)
                    .with_controller(PlayerId::new(seat))
                    .handler(move |_ctx| {
                        seen.lock().unwrap().push(index);
                        Ok(())
                    }),
            );
        }
        game.raise_event(GameEvent::new(RALLIED)).unwrap();

        let mut expected: Vec<(bool, usize, usize)> = specs
            .iter()
            .enumerate()
            .map(|(index, &(forced, seat))| {
                let rank = PlayerId::new(seat).apnap_rank(PlayerId::new(first), players);
                (!forced, rank, index)
            })
            .collect();
        expected.sort_unstable();
        let expected: Vec<usize> = expected.into_iter().map(|(_, _, index)| index).collect();
        prop_assert_eq!(trace.lock().unwrap().clone(), expected);
        prop_assert!(game.is_idle());
    }

    /// Modifiers fold over the printed value in the order they were applied.
    #[test]
    fn modifiers_fold_in_order(ops in prop::collection::vec(op(), 0..10)) {
        let mut game = new_match(2, 0);
        let card = game.add_card(SOLDIER, PlayerId::new(0), ZoneRole::PlayArea).unwrap();

        let mut expected = 2;
        for op in &ops {
            let spec = match *op {
                Op::Add(value) => {
                    expected += value;
                    ModifierSpec::add(attrs::STRENGTH, value)
                }
                Op::Set(value) => {
                    expected = value;
                    ModifierSpec::set(attrs::STRENGTH, value)
                }
            };
            game.apply_effect(None, spec.on(CardSelector::Card(card)));
        }
        prop_assert_eq!(game.compute_attribute(card, attrs::STRENGTH), expected);
    }
}
