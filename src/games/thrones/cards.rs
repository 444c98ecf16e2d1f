//! Scripted sample cards.

use tracing::debug;

use super::card_types;
use crate::cards::{attrs, CardScript};
use crate::core::{EngineError, EngineResult, EntityId, ZoneRole};
use crate::effects::{CardSelector, Duration, ModifierSpec, SelectorContext};
use crate::game::AbilityContext;
use crate::prompts::SelectSchema;
use crate::triggers::{events, playing_types, Ability, TriggerCondition};

/// Challenge icons with the attribute each one is stored under.
pub const ICONS: [(&str, &str); 3] = [
    ("military", attrs::ICON_MILITARY),
    ("intrigue", attrs::ICON_INTRIGUE),
    ("power", attrs::ICON_POWER),
];

/// Reaction: after Queen's Men is marshaled, look at an opponent's hand.
/// You may kneel a non-Baratheon character you control to discard a
/// non-character card from it.
pub struct QueensMen;

impl CardScript for QueensMen {
    fn abilities(&self, _card: EntityId) -> Vec<Ability> {
        vec![Ability::reaction("Queen's Men")
            .on(events::CARD_ENTERS_PLAY)
            .with_condition(
                TriggerCondition::TargetIsThis.and(TriggerCondition::tag(playing_types::MARSHAL)),
            )
            .handler(look_at_hand)]
    }
}

fn look_at_hand(ctx: &mut AbilityContext<'_>) -> EngineResult<()> {
    let Some(opponent) = ctx.opponent() else {
        debug!(ability = %ctx.name, "no opponent to look at");
        return Ok(());
    };
    let source = ctx
        .source
        .ok_or_else(|| EngineError::misconfigured("Queen's Men without a card"))?;
    let controller = ctx.controller;
    let hand = ctx.game.state().zone_for(opponent, ZoneRole::Hand)?;
    let revealed = ctx.game.state().zones.cards_in_zone(hand).to_vec();

    let title = "Choose whether to discard a non-character card, or click done";
    ctx.game.prompt_for_card_button(controller, title, revealed, move |game, chosen| {
        game.add_message(
            "{0} uses {1} to look at {2}'s hand",
            &[controller.into(), source.into(), opponent.into()],
        );
        let Some(to_discard) = chosen else {
            return Ok(());
        };
        let is_character = game
            .definition_of(to_discard)
            .is_some_and(|definition| definition.card_type == card_types::CHARACTER);
        let kneelable = CardSelector::all([
            CardSelector::InPlay,
            CardSelector::ControlledBy(controller),
            CardSelector::HasCardType(card_types::CHARACTER),
            CardSelector::Standing,
            CardSelector::HasFaction("baratheon".into()).negate(),
        ]);
        let ctx = SelectorContext::new(game.state(), game.cards());
        if is_character || kneelable.select(&ctx).is_empty() {
            return Ok(());
        }

        let schema = SelectSchema::new("Select a character", kneelable).with_source(source);
        game.prompt_for_select(controller, schema, move |game, answer| {
            let Some(to_kneel) = answer.first_card() else {
                return Ok(());
            };
            game.kneel(to_kneel)?;
            game.discard_from_hand(to_discard)?;
            game.add_message(
                "{0} then kneels {1} to discard {2} from {3}'s hand",
                &[controller.into(), to_kneel.into(), to_discard.into(), opponent.into()],
            );
            Ok(())
        })?;
        Ok(())
    })?;
    Ok(())
}

/// Reaction: after you lose a challenge in which Maester Caleotte is
/// participating, choose a character. Until the end of the phase it loses
/// an icon of your choice.
pub struct MaesterCaleotte;

impl CardScript for MaesterCaleotte {
    fn abilities(&self, _card: EntityId) -> Vec<Ability> {
        vec![Ability::reaction("Maester Caleotte")
            .on(events::AFTER_CHALLENGE)
            .with_condition(
                TriggerCondition::OtherPlayerIsController.and(TriggerCondition::ThisInvolved),
            )
            .with_target(
                CardSelector::all([
                    CardSelector::InPlay,
                    CardSelector::HasCardType(card_types::CHARACTER),
                ]),
                "Select a character",
            )
            .handler(remove_icon)]
    }
}

fn remove_icon(ctx: &mut AbilityContext<'_>) -> EngineResult<()> {
    let target = ctx.require_target()?;
    let source = ctx
        .source
        .ok_or_else(|| EngineError::misconfigured("Maester Caleotte without a card"))?;
    let controller = ctx.controller;
    let choices = ICONS.iter().map(|(icon, _)| (*icon).to_string()).collect();

    ctx.game.prompt_for_choice(controller, "Select an icon to remove", choices, move |game, icon| {
        let attribute = ICONS
            .iter()
            .find(|(name, _)| *name == icon)
            .map(|(_, attribute)| *attribute)
            .ok_or_else(|| EngineError::invariant(format!("unknown icon {icon}")))?;
        game.apply_effect(
            Some(source),
            ModifierSpec::set(attribute, 0)
                .on(CardSelector::Card(target))
                .until(Duration::UntilEndOfPhase),
        );
        let article = if icon == "intrigue" { "an" } else { "a" };
        game.add_message(
            "{0} uses {1} to remove {2} {3} icon from {4}",
            &[controller.into(), source.into(), article.into(), icon.into(), target.into()],
        );
        Ok(())
    })?;
    Ok(())
}

/// +1 strength for each other Direwolf its controller has in play.
pub struct DirewolfPup;

impl CardScript for DirewolfPup {
    fn persistent_effects(&self, _card: EntityId) -> Vec<ModifierSpec> {
        vec![ModifierSpec::add_per_card(
            attrs::STRENGTH,
            1,
            CardSelector::all([
                CardSelector::HasTrait("Direwolf".into()),
                CardSelector::SameControllerAsThis,
            ]),
        )]
    }
}
