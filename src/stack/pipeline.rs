//! Driving the pipeline.

use tracing::{debug, error, warn};

use super::{ResolutionStatus, Step, StepOutcome};
use crate::core::{EngineError, EngineResult};
use crate::game::Match;
use crate::phases::PhaseStep;

impl Match {
    /// Queue a step.
    ///
    /// While a step is advancing, the new step becomes its child. Otherwise
    /// it goes behind everything already pending and resolution runs.
    pub(crate) fn enqueue(&mut self, step: Box<dyn Step>) -> EngineResult<ResolutionStatus> {
        self.ensure_active()?;
        if self.pipeline.running {
            self.pipeline.push_child(step);
            return Ok(ResolutionStatus::Processing);
        }
        self.pipeline.push_bottom(step);
        self.run()
    }

    /// Queue a step ahead of everything pending (player actions taken in an
    /// open window).
    pub(crate) fn push_now(&mut self, step: Box<dyn Step>) -> EngineResult<ResolutionStatus> {
        self.ensure_active()?;
        if self.pipeline.running {
            self.pipeline.push_child(step);
            return Ok(ResolutionStatus::Processing);
        }
        self.pipeline.push_top(step);
        self.run()
    }

    /// Advance pending steps until the stack drains or a prompt suspends it.
    ///
    /// A fatal error terminates the match before it is returned.
    pub(crate) fn run(&mut self) -> EngineResult<ResolutionStatus> {
        if self.pipeline.running {
            return Ok(ResolutionStatus::Processing);
        }
        if !self.is_active() {
            return Ok(ResolutionStatus::Terminated);
        }

        self.pipeline.running = true;
        let result = self.drive();
        self.pipeline.running = false;

        match result {
            Err(err) if err.is_fatal() => {
                error!(error = %err, "invariant violated, terminating match");
                self.terminate(err.to_string());
                Err(err)
            }
            other => other,
        }
    }

    fn drive(&mut self) -> EngineResult<ResolutionStatus> {
        loop {
            if !self.is_active() {
                self.abandon_all();
                return Ok(ResolutionStatus::Terminated);
            }

            let Some(mut step) = self.pipeline.pop() else {
                if self.phases.take_pending_advance() {
                    debug!("resolution drained, running deferred phase advance");
                    self.pipeline.push_top(Box::new(PhaseStep::next()));
                    continue;
                }
                return Ok(ResolutionStatus::Complete);
            };

            match step.advance(self) {
                Ok(StepOutcome::Done) => {
                    self.pipeline.adopt_children();
                }
                Ok(StepOutcome::Continue) => {
                    self.pipeline.push_top(step);
                    self.pipeline.adopt_children();
                }
                Ok(StepOutcome::Waiting) => {
                    self.pipeline.push_top(step);
                    if self.pipeline.adopt_children() == 0 {
                        let prompt = self.prompts.active().ok_or_else(|| {
                            EngineError::invariant("resolution waiting with no active prompt")
                        })?;
                        return Ok(ResolutionStatus::AwaitingInput {
                            player: prompt.player,
                            prompt: prompt.id,
                        });
                    }
                }
                Err(err) => {
                    let children = self.pipeline.take_children();
                    for mut child in children {
                        child.abandon(self);
                    }
                    step.abandon(self);
                    if err.is_fatal() {
                        return Err(err);
                    }
                    warn!(step = step.name(), error = %err, "step abandoned");
                }
            }
        }
    }

    /// Drop every pending step.
    pub(crate) fn abandon_all(&mut self) {
        for mut step in self.pipeline.take_all() {
            step.abandon(self);
        }
    }
}
