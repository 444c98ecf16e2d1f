//! Resolution pipeline.
//!
//! Everything the engine resolves (an event window, one ability, a prompt,
//! a phase transition) is a [`Step`] on a LIFO stack owned by the match.
//! The match pops the top step and advances it:
//!
//! - `Done`: the step is finished
//! - `Continue`: the step has more work; it goes back under its children
//! - `Waiting`: the step needs a prompt answer; resolution suspends
//!
//! Steps created while a step advances (nested events, ability steps, new
//! prompts) are its children: they go on top of it, in creation order, so
//! they resolve completely before it advances again. That gives the strict
//! nesting events need: a handler's events resolve, recursively, before the
//! next ability of the outer event.
//!
//! Work arriving from outside while resolution is suspended is queued at the
//! bottom of the stack, behind the current resolution.
//!
//! ## Steps
//!
//! - [`EventWindow`]: interrupts → default effect → reactions for one event
//! - [`AbilityStep`]: confirm → choose target → run handler for one ability
//! - [`PromptStep`]: activate a prompt and deliver its answer

mod ability_step;
mod event_window;
mod pipeline;
mod prompt_step;

pub use ability_step::AbilityStep;
pub use event_window::{DefaultEffect, EventLedger, EventStatus, EventWindow};
pub use prompt_step::{Continuation, PromptStep};

use serde::{Deserialize, Serialize};

use crate::core::{EngineResult, PlayerId};
use crate::game::Match;
use crate::prompts::PromptId;

/// Status returned by resolution processing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionStatus {
    /// Resolution is complete, the stack is empty.
    Complete,

    /// Waiting for a player to answer a prompt.
    AwaitingInput { player: PlayerId, prompt: PromptId },

    /// Resolution is already running further up the call stack; the work
    /// was queued and will be picked up there.
    Processing,

    /// The match has been stopped.
    Terminated,
}

impl ResolutionStatus {
    /// Whether resolution is suspended on a prompt.
    #[must_use]
    pub fn is_waiting(&self) -> bool {
        matches!(self, ResolutionStatus::AwaitingInput { .. })
    }
}

/// What a step reports after advancing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// Finished; discard the step.
    Done,
    /// More to do once its children have resolved.
    Continue,
    /// Suspended on the active prompt.
    Waiting,
}

/// One unit of resolution work.
pub trait Step: Send {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Do the next piece of work.
    ///
    /// Steps queued through `Match` while this runs become children of this
    /// step.
    fn advance(&mut self, game: &mut Match) -> EngineResult<StepOutcome>;

    /// Release anything the step holds after it failed or was dropped
    /// unfinished.
    fn abandon(&mut self, _game: &mut Match) {}
}

/// Stack of pending steps.
#[derive(Default)]
pub struct Pipeline {
    stack: Vec<Box<dyn Step>>,
    incoming: Vec<Box<dyn Step>>,
    running: bool,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stack", &self.stack.iter().map(|s| s.name()).collect::<Vec<_>>())
            .field("incoming", &self.incoming.len())
            .field("running", &self.running)
            .finish()
    }
}

impl Pipeline {
    /// Create an empty pipeline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether nothing is pending.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.stack.is_empty() && self.incoming.is_empty()
    }

    /// Number of pending steps.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len() + self.incoming.len()
    }

    /// Whether a step is being advanced right now.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Names of pending steps, top first.
    #[must_use]
    pub fn describe(&self) -> Vec<&'static str> {
        self.stack.iter().rev().map(|s| s.name()).collect()
    }

    pub(crate) fn push_child(&mut self, step: Box<dyn Step>) {
        self.incoming.push(step);
    }

    pub(crate) fn push_top(&mut self, step: Box<dyn Step>) {
        self.stack.push(step);
    }

    pub(crate) fn push_bottom(&mut self, step: Box<dyn Step>) {
        self.stack.insert(0, step);
    }

    fn pop(&mut self) -> Option<Box<dyn Step>> {
        self.stack.pop()
    }

    /// Move children onto the stack so the first queued runs first.
    fn adopt_children(&mut self) -> usize {
        let count = self.incoming.len();
        while let Some(step) = self.incoming.pop() {
            self.stack.push(step);
        }
        count
    }

    fn take_children(&mut self) -> Vec<Box<dyn Step>> {
        std::mem::take(&mut self.incoming)
    }

    fn take_all(&mut self) -> Vec<Box<dyn Step>> {
        let mut steps = std::mem::take(&mut self.stack);
        steps.append(&mut self.incoming);
        steps
    }
}
