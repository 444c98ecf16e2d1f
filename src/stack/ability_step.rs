//! Ability steps: resolving one ability.
//!
//! ```text
//! Confirm (optional abilities) → Target (abilities with a target) → Execute
//! ```
//!
//! The confirm and target stages prompt the controller; the continuation of
//! that prompt queues a new step at the next stage. Before every stage the
//! ability must still be registered, its event must not have been canceled,
//! and its condition must still hold, otherwise the ability fizzles quietly.

use std::sync::Arc;

use tracing::debug;

use super::{Step, StepOutcome};
use crate::core::{EngineError, EngineResult, EntityId, PlayerId};
use crate::effects::SelectorContext;
use crate::game::{AbilityContext, Match};
use crate::prompts::{MenuButton, MenuSchema, PromptAnswer, SelectSchema};
use crate::triggers::{Ability, AbilityId, AbilityRegistry, GameEvent};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stage {
    Confirm,
    Target,
    Execute,
}

/// Resolution of one ability, for an event or as a player action.
pub struct AbilityStep {
    ability: AbilityId,
    event: Option<Arc<GameEvent>>,
    stage: Stage,
    target: Option<EntityId>,
}

impl AbilityStep {
    /// Resolve an ability from the start.
    pub fn new(ability: AbilityId, event: Option<Arc<GameEvent>>) -> Self {
        Self {
            ability,
            event,
            stage: Stage::Confirm,
            target: None,
        }
    }

    fn at(&self, stage: Stage, target: Option<EntityId>) -> Self {
        Self {
            ability: self.ability,
            event: self.event.clone(),
            stage,
            target,
        }
    }

    /// The ability and its controller, if it may still resolve.
    fn live(&self, game: &Match) -> Option<(Ability, PlayerId)> {
        let Some(ability) = game.abilities.get(self.ability) else {
            debug!(ability = %self.ability, "ability gone before resolving");
            return None;
        };
        if let Some(event) = &self.event {
            if game.events.is_canceled(event.id) {
                debug!(ability = %self.ability, event = %event.id, "event canceled, ability skipped");
                return None;
            }
        }
        let ctx = AbilityRegistry::context_for(ability, self.event.as_deref(), &game.state, &game.cards);
        if !ability.condition_holds(&ctx) {
            debug!(ability = %self.ability, name = %ability.name, "condition no longer holds");
            return None;
        }
        Some((ability.clone(), ctx.controller))
    }

    fn confirm(&self, game: &mut Match, ability: &Ability, controller: PlayerId) -> EngineResult<()> {
        let next = self.at(Stage::Target, None);
        let menu = MenuSchema::new(format!("Trigger {}?", ability.name))
            .with_button(MenuButton::new("Yes"))
            .with_button(MenuButton::new("No"))
            .with_default(1);
        game.prompt_with_menu(controller, menu, move |game, answer| {
            if answer == PromptAnswer::Button(0) {
                game.pipeline.push_child(Box::new(next));
            }
            Ok(())
        })?;
        Ok(())
    }

    fn choose_target(
        &self,
        game: &mut Match,
        ability: &Ability,
        controller: PlayerId,
    ) -> EngineResult<bool> {
        let Some(spec) = &ability.target else {
            return Ok(false);
        };
        let mut schema = SelectSchema::new(spec.title.clone(), spec.selector.clone());
        if let Some(source) = ability.source {
            schema = schema.with_source(source);
        }
        if !ability.is_forced() {
            schema = schema.with_done("Cancel");
        }

        let ctx = SelectorContext::new(&game.state, &game.cards);
        if schema.legal_cards(&ctx).is_empty() {
            debug!(ability = %self.ability, name = %ability.name, "no legal target, ability skipped");
            return Ok(true);
        }

        let template = self.at(Stage::Execute, None);
        game.prompt_for_select(controller, schema, move |game, answer| {
            match answer.first_card() {
                Some(target) => game
                    .pipeline
                    .push_child(Box::new(template.at(Stage::Execute, Some(target)))),
                None => debug!(ability = %template.ability, "target declined"),
            }
            Ok(())
        })?;
        Ok(true)
    }

    fn execute(&self, game: &mut Match, ability: &Ability, controller: PlayerId) -> EngineResult<()> {
        if ability.target.is_some() && self.target.is_none() {
            return Err(EngineError::misconfigured(format!(
                "{} promised a target but has none",
                ability.name
            )));
        }
        debug!(ability = %self.ability, name = %ability.name, controller = %controller, "ability resolving");
        let handler = ability.handler_fn();
        let mut ctx = AbilityContext {
            game,
            ability: self.ability,
            name: ability.name.clone(),
            source: ability.source,
            controller,
            category: ability.category,
            event: self.event.clone(),
            target: self.target,
        };
        handler(&mut ctx)
    }
}

impl Step for AbilityStep {
    fn name(&self) -> &'static str {
        "ability"
    }

    fn advance(&mut self, game: &mut Match) -> EngineResult<StepOutcome> {
        let Some((ability, controller)) = self.live(game) else {
            return Ok(StepOutcome::Done);
        };

        match self.stage {
            Stage::Confirm if ability.asks_first() => {
                self.confirm(game, &ability, controller)?;
            }
            Stage::Confirm | Stage::Target => {
                if !self.choose_target(game, &ability, controller)? {
                    self.execute(game, &ability, controller)?;
                }
            }
            Stage::Execute => self.execute(game, &ability, controller)?,
        }
        Ok(StepOutcome::Done)
    }
}
