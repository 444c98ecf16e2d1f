//! Prompt steps: suspending resolution on a player's decision.

use tracing::debug;

use super::{Step, StepOutcome};
use crate::core::{EngineError, EngineResult};
use crate::effects::SelectorContext;
use crate::game::{Match, Outbound};
use crate::prompts::{PromptAnswer, PromptId, PromptStatus};

/// Code waiting for a prompt's answer.
pub type Continuation = Box<dyn FnOnce(&mut Match, PromptAnswer) -> EngineResult<()> + Send>;

/// Delivers one prompt and resumes its continuation with the answer.
///
/// A queued prompt is activated and sent to its player; the step then waits.
/// If the player cannot answer (disconnected or conceded) the prompt
/// resolves to its default immediately.
pub struct PromptStep {
    prompt: PromptId,
    continuation: Option<Continuation>,
}

impl PromptStep {
    /// Create a step for an opened prompt.
    pub fn new(prompt: PromptId, continuation: Option<Continuation>) -> Self {
        Self {
            prompt,
            continuation,
        }
    }
}

impl Step for PromptStep {
    fn name(&self) -> &'static str {
        "prompt"
    }

    fn advance(&mut self, game: &mut Match) -> EngineResult<StepOutcome> {
        let id = self.prompt;
        let Some(prompt) = game.prompts.get(id) else {
            return Err(EngineError::invariant(format!("{id} vanished while pending")));
        };
        let player = prompt.player;

        match prompt.status {
            PromptStatus::Answered(_) => {
                let answer = game
                    .prompts
                    .take_answer(id)
                    .ok_or_else(|| EngineError::invariant(format!("{id} lost its answer")))?;
                debug!(prompt = %id, player = %player, ?answer, "prompt answered");
                game.emit(Outbound::PromptClosed { prompt: id, player });
                if let Some(continuation) = self.continuation.take() {
                    continuation(game, answer)?;
                }
                Ok(StepOutcome::Done)
            }
            PromptStatus::Queued if !game.can_answer(player) => {
                game.prompts.answer_default(id);
                Ok(StepOutcome::Continue)
            }
            PromptStatus::Queued => {
                let prompt = game.prompts.activate(id)?;
                let ctx = SelectorContext::new(&game.state, &game.cards);
                let view = prompt.view(&ctx);
                game.emit(Outbound::Prompt(view));
                Ok(StepOutcome::Waiting)
            }
            PromptStatus::Active => Ok(StepOutcome::Waiting),
        }
    }

    fn abandon(&mut self, game: &mut Match) {
        if game.prompts.discard(self.prompt) {
            debug!(prompt = %self.prompt, "prompt dropped with its resolution");
        }
    }
}
