//! Player input: actions, prompts, and connection handling.
//!
//! Card code asks players through `prompt_for_select`, `prompt_with_menu`,
//! and `prompt_for_choice`. Each takes a continuation that runs with the
//! answer once the player responds; the continuation may prompt again.
//! Players answer through `PlayerAction::Respond`. Invalid answers are
//! rejected without consuming the prompt.
//!
//! A player who disconnects, concedes, or times out has their prompts
//! resolved with the prompt's default answer, which skips where the prompt
//! allows it.

use tracing::{debug, info, warn};

use super::{Match, Outbound};
use crate::cards::CardId;
use crate::core::{EngineError, EngineResult, EntityId, PlayerAction, PlayerId, ZoneRole};
use crate::effects::SelectorContext;
use crate::prompts::{MenuButton, MenuSchema, PromptAnswer, PromptId, PromptKind, SelectSchema};
use crate::stack::{AbilityStep, Continuation, PromptStep, ResolutionStatus};
use crate::triggers::{playing_types, AbilityCategory, AbilityId, AbilityRegistry};

impl Match {
    /// Apply a player request.
    ///
    /// Accepted actions are recorded in the action history. A rejected
    /// action leaves the match unchanged.
    pub fn perform(&mut self, player: PlayerId, action: PlayerAction) -> EngineResult<ResolutionStatus> {
        self.ensure_active()?;
        self.require_seat(player)?;
        debug!(player = %player, action = action.kind(), "player action");

        let result = match &action {
            PlayerAction::PlayCard { card } => self.play_card(player, *card),
            PlayerAction::TriggerAbility { ability } => self.trigger_ability(player, *ability),
            PlayerAction::Respond { prompt, answer } => self.respond(player, *prompt, answer.clone()),
            PlayerAction::Pass => self.pass(player),
            PlayerAction::Concede => self.concede(player),
        };
        match &result {
            Ok(_) => self.state.public.record_action(player, action),
            Err(err) => warn!(player = %player, error = %err, "player action rejected"),
        }
        result
    }

    /// Play (marshal) a card from the player's hand.
    ///
    /// Legal only while nothing is resolving, in a phase that allows
    /// marshaling.
    pub fn play_card(&mut self, player: PlayerId, card: EntityId) -> EngineResult<ResolutionStatus> {
        self.ensure_active()?;
        if !self.is_idle() {
            return Err(EngineError::illegal("cards cannot be played while resolution is pending"));
        }
        let phase = self
            .current_phase()
            .ok_or_else(|| EngineError::illegal("match has not started"))?;
        if !phase.allows_marshal {
            return Err(EngineError::illegal(format!(
                "cards cannot be played during {}",
                phase.name
            )));
        }
        let hand = self.state.zone_for(player, ZoneRole::Hand)?;
        if self.state.require_card(card)?.zone() != hand {
            return Err(EngineError::illegal(format!("{card} is not in {player}'s hand")));
        }
        self.enter_play(card, player, playing_types::MARSHAL)?;
        Ok(self.resolution_status())
    }

    /// Trigger an action ability.
    ///
    /// Legal for the ability's controller while they hold the open window
    /// prompt, or while the match is idle in a phase with an action window.
    pub fn trigger_ability(
        &mut self,
        player: PlayerId,
        ability: AbilityId,
    ) -> EngineResult<ResolutionStatus> {
        self.ensure_active()?;
        let found = self
            .abilities
            .get(ability)
            .ok_or_else(|| EngineError::illegal(format!("no such {ability}")))?;
        if found.category != AbilityCategory::Action {
            return Err(EngineError::illegal(format!("{} is not an action", found.name)));
        }
        let ctx = AbilityRegistry::context_for(found, None, &self.state, &self.cards);
        if ctx.controller != player {
            return Err(EngineError::illegal(format!("{player} does not control {}", found.name)));
        }
        if !found.condition_holds(&ctx) {
            return Err(EngineError::illegal(format!("{} cannot be used now", found.name)));
        }

        let holds_window = self
            .prompts
            .active()
            .is_some_and(|prompt| prompt.player == player && prompt.window.is_some());
        let step = Box::new(AbilityStep::new(ability, None));
        if holds_window {
            self.push_now(step)
        } else if self.is_idle() && self.current_phase().is_some_and(|phase| phase.action_window) {
            self.enqueue(step)
        } else {
            Err(EngineError::illegal("no action window is open"))
        }
    }

    /// Answer a prompt. The prompt stays outstanding if the answer is
    /// rejected.
    pub fn respond(
        &mut self,
        player: PlayerId,
        prompt: PromptId,
        answer: PromptAnswer,
    ) -> EngineResult<ResolutionStatus> {
        self.ensure_active()?;
        let ctx = SelectorContext::new(&self.state, &self.cards);
        if let Err(rejection) = self.prompts.submit(prompt, player, answer, &ctx) {
            warn!(prompt = %prompt, player = %player, reason = %rejection, "prompt answer rejected");
            return Err(rejection.into());
        }
        self.run()
    }

    /// Close the player's open window prompt.
    pub fn pass(&mut self, player: PlayerId) -> EngineResult<ResolutionStatus> {
        let prompt = self
            .prompts
            .active()
            .filter(|prompt| prompt.player == player && prompt.window.is_some())
            .map(|prompt| prompt.id)
            .ok_or_else(|| EngineError::illegal(format!("{player} has no open window to pass")))?;
        self.respond(player, prompt, PromptAnswer::Done)
    }

    /// Leave the match. Outstanding prompts of the player resolve to their
    /// defaults; the last player standing wins.
    pub fn concede(&mut self, player: PlayerId) -> EngineResult<ResolutionStatus> {
        self.ensure_active()?;
        self.require_seat(player)?;
        if self.seats[player].conceded {
            return Err(EngineError::illegal(format!("{player} already conceded")));
        }
        self.seats[player].conceded = true;
        self.add_message("{0} concedes", &[player.into()]);
        info!(player = %player, "player conceded");

        let remaining: Vec<PlayerId> = self
            .seats
            .iter()
            .filter(|(_, seat)| !seat.conceded)
            .map(|(player, _)| player)
            .collect();
        if let [winner] = remaining.as_slice() {
            self.finish(*winner);
            return Ok(ResolutionStatus::Terminated);
        }
        self.default_prompts_of(player);
        self.run()
    }

    /// Mark a player disconnected; their prompts resolve to defaults.
    pub fn disconnect(&mut self, player: PlayerId) -> EngineResult<ResolutionStatus> {
        self.ensure_active()?;
        self.require_seat(player)?;
        self.seats[player].connected = false;
        info!(player = %player, "player disconnected");
        self.default_prompts_of(player);
        self.run()
    }

    /// Mark a player connected again. Their active prompt, if any, is sent
    /// again.
    pub fn reconnect(&mut self, player: PlayerId) -> EngineResult<()> {
        self.ensure_active()?;
        self.require_seat(player)?;
        self.seats[player].connected = true;
        info!(player = %player, "player reconnected");

        let ctx = SelectorContext::new(&self.state, &self.cards);
        let view = self
            .prompts
            .active()
            .filter(|prompt| prompt.player == player)
            .map(|prompt| prompt.view(&ctx));
        if let Some(view) = view {
            self.emit(Outbound::Prompt(view));
        }
        Ok(())
    }

    /// Resolve a prompt with its default answer (host-side timeout).
    pub fn expire_prompt(&mut self, prompt: PromptId) -> EngineResult<ResolutionStatus> {
        self.ensure_active()?;
        if self.prompts.answer_default(prompt).is_none() {
            return Err(EngineError::illegal(format!("{prompt} is not outstanding")));
        }
        debug!(prompt = %prompt, "prompt timed out");
        self.run()
    }

    fn default_prompts_of(&mut self, player: PlayerId) {
        for prompt in self.prompts.pending_for(player) {
            self.prompts.answer_default(prompt);
        }
    }

    // === Prompt API for card code ===

    /// Ask a player to choose cards.
    pub fn prompt_for_select<F>(
        &mut self,
        player: PlayerId,
        schema: SelectSchema,
        then: F,
    ) -> EngineResult<PromptId>
    where
        F: FnOnce(&mut Match, PromptAnswer) -> EngineResult<()> + Send + 'static,
    {
        self.open_prompt(player, PromptKind::Select(schema), Box::new(then))
    }

    /// Ask a player to pick a menu button.
    pub fn prompt_with_menu<F>(
        &mut self,
        player: PlayerId,
        schema: MenuSchema,
        then: F,
    ) -> EngineResult<PromptId>
    where
        F: FnOnce(&mut Match, PromptAnswer) -> EngineResult<()> + Send + 'static,
    {
        self.open_prompt(player, PromptKind::Menu(schema), Box::new(then))
    }

    /// Ask a player to pick one of several named options (an icon, a
    /// challenge type). The first option is the default.
    pub fn prompt_for_choice<F>(
        &mut self,
        player: PlayerId,
        title: impl Into<String>,
        choices: Vec<String>,
        then: F,
    ) -> EngineResult<PromptId>
    where
        F: FnOnce(&mut Match, String) -> EngineResult<()> + Send + 'static,
    {
        if choices.is_empty() {
            return Err(EngineError::misconfigured("choice prompt with no choices"));
        }
        let menu = choices.iter().fold(MenuSchema::new(title), |menu, choice| {
            menu.with_button(MenuButton::new(choice.clone()).with_value(choice.clone()))
        });
        self.prompt_with_menu(player, menu, move |game, answer| match answer {
            PromptAnswer::Button(index) => {
                let choice = choices
                    .get(index)
                    .cloned()
                    .ok_or_else(|| EngineError::invariant(format!("choice {index} out of range")))?;
                then(game, choice)
            }
            _ => Ok(()),
        })
    }

    /// Ask a player to choose one card from a list of buttons, with a
    /// "Done" option to choose none.
    pub fn prompt_for_card_button<F>(
        &mut self,
        player: PlayerId,
        title: impl Into<String>,
        candidates: Vec<EntityId>,
        then: F,
    ) -> EngineResult<PromptId>
    where
        F: FnOnce(&mut Match, Option<EntityId>) -> EngineResult<()> + Send + 'static,
    {
        let names: Vec<String> = candidates
            .iter()
            .map(|&card| self.card_name(card))
            .collect();
        let menu = candidates
            .iter()
            .zip(names)
            .fold(MenuSchema::new(title).with_done("Done"), |menu, (&card, name)| {
                menu.with_button(MenuButton::for_card(name, card))
            });
        self.prompt_with_menu(player, menu, move |game, answer| match answer {
            PromptAnswer::Button(index) => then(game, candidates.get(index).copied()),
            _ => then(game, None),
        })
    }

    fn open_prompt(
        &mut self,
        player: PlayerId,
        kind: PromptKind,
        continuation: Continuation,
    ) -> EngineResult<PromptId> {
        self.ensure_active()?;
        self.require_seat(player)?;
        let prompt = self.prompts.open(player, kind, None);
        self.enqueue(Box::new(PromptStep::new(prompt, Some(continuation))))?;
        Ok(prompt)
    }

    /// Printed name of a card instance.
    #[must_use]
    pub fn card_name(&self, card: EntityId) -> String {
        self.definition_of(card)
            .map_or_else(|| card.to_string(), |definition| definition.name.clone())
    }

    /// Definition of a card instance.
    #[must_use]
    pub fn definition_of(&self, card: EntityId) -> Option<&crate::cards::CardDefinition> {
        let card_id: CardId = self.state.card(card)?.card_id;
        self.cards.get(card_id)
    }
}
