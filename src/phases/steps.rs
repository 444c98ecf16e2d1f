//! Phase transition and action window steps.

use tracing::{debug, info};

use crate::core::{EngineError, EngineResult, PlayerId, WindowId};
use crate::game::{Match, Outbound};
use crate::prompts::{MenuSchema, PromptKind};
use crate::stack::{PromptStep, Step, StepOutcome};
use crate::triggers::{events, GameEvent};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stage {
    Exit,
    ExpirePhase,
    EndRound,
    NewRound,
    Enter,
}

/// Move the match into its next phase.
#[derive(Debug)]
pub struct PhaseStep {
    stage: Stage,
    target: usize,
}

impl PhaseStep {
    /// Leave the current phase and enter the next one.
    #[must_use]
    pub fn next() -> Self {
        Self {
            stage: Stage::Exit,
            target: 0,
        }
    }

    /// Enter the first phase of the match.
    #[must_use]
    pub fn start() -> Self {
        Self {
            stage: Stage::Enter,
            target: 0,
        }
    }
}

impl Step for PhaseStep {
    fn name(&self) -> &'static str {
        "phase"
    }

    fn advance(&mut self, game: &mut Match) -> EngineResult<StepOutcome> {
        match self.stage {
            Stage::Exit => {
                let index = game.phases.phase_index;
                let phase = game
                    .config
                    .phases
                    .get(index)
                    .ok_or_else(|| EngineError::invariant(format!("no phase at index {index}")))?;
                debug!(phase = %phase.name, "phase ending");
                let ended = GameEvent::new(events::PHASE_ENDED).with_value(i64::from(phase.id.0));
                self.target = game.phases.next_index(game.config.phases.len());
                game.raise_event(ended)?;
                self.stage = Stage::ExpirePhase;
            }
            Stage::ExpirePhase => {
                let expired = game.modifiers.expire_phase();
                if expired > 0 {
                    debug!(count = expired, "phase modifiers expired");
                }
                self.stage = if self.target == 0 {
                    Stage::EndRound
                } else {
                    Stage::Enter
                };
            }
            Stage::EndRound => {
                let round = game.state.public.round;
                game.raise_event(GameEvent::new(events::ROUND_ENDED).with_value(i64::from(round)))?;
                self.stage = Stage::NewRound;
            }
            Stage::NewRound => {
                game.modifiers.expire_round();
                let public = &mut game.state.public;
                public.round += 1;
                public.active_player = public.first_player;
                info!(round = public.round, first_player = %public.first_player, "round started");
                self.stage = Stage::Enter;
            }
            Stage::Enter => {
                let index = self.target;
                let phase = game
                    .config
                    .phases
                    .get(index)
                    .cloned()
                    .ok_or_else(|| EngineError::invariant(format!("no phase at index {index}")))?;
                game.phases.phase_index = index;
                game.phases.open_window = None;
                game.state.public.phase = phase.id;
                let round = game.state.public.round;

                info!(phase = %phase.name, round, "phase started");
                game.emit(Outbound::PhaseChanged {
                    phase: phase.id,
                    name: phase.name.clone(),
                    round,
                });
                game.raise_event(GameEvent::new(events::PHASE_STARTED).with_value(i64::from(phase.id.0)))?;
                for window in phase.windows {
                    game.pipeline.push_child(Box::new(WindowStep::new(window)));
                }
                return Ok(StepOutcome::Done);
            }
        }
        Ok(StepOutcome::Continue)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum WindowStage {
    Open,
    Prompt(usize),
    Close,
}

/// One action window: a pass prompt for each player who wants one.
#[derive(Debug)]
pub struct WindowStep {
    window: WindowId,
    stage: WindowStage,
    order: Vec<PlayerId>,
}

impl WindowStep {
    /// Create a step that opens `window`.
    #[must_use]
    pub fn new(window: WindowId) -> Self {
        Self {
            window,
            stage: WindowStage::Open,
            order: Vec::new(),
        }
    }
}

impl Step for WindowStep {
    fn name(&self) -> &'static str {
        "window"
    }

    fn advance(&mut self, game: &mut Match) -> EngineResult<StepOutcome> {
        match self.stage {
            WindowStage::Open => {
                let config = game
                    .config
                    .get_window(self.window)
                    .ok_or_else(|| EngineError::invariant(format!("unknown {}", self.window)))?;
                self.order = game
                    .state
                    .public
                    .apnap_order()
                    .filter(|&player| !game.has_conceded(player))
                    .filter(|&player| game.config.settings_for(player).prompts_at(config))
                    .collect();
                debug!(window = %config.name, prompted = self.order.len(), "window opened");
                game.phases.open_window = Some(self.window);
                self.stage = WindowStage::Prompt(0);
            }
            WindowStage::Prompt(index) => {
                let Some(&player) = self.order.get(index) else {
                    self.stage = WindowStage::Close;
                    return Ok(StepOutcome::Continue);
                };
                let title = game
                    .config
                    .get_window(self.window)
                    .map_or_else(String::new, |w| w.name.clone());
                let kind = PromptKind::Menu(MenuSchema::new(title).with_done("Pass"));
                let prompt = game.prompts.open(player, kind, Some(self.window));
                game.pipeline.push_child(Box::new(PromptStep::new(prompt, None)));
                self.stage = WindowStage::Prompt(index + 1);
            }
            WindowStage::Close => {
                if game.phases.open_window == Some(self.window) {
                    game.phases.open_window = None;
                }
                return Ok(StepOutcome::Done);
            }
        }
        Ok(StepOutcome::Continue)
    }

    fn abandon(&mut self, game: &mut Match) {
        if game.phases.open_window == Some(self.window) {
            game.phases.open_window = None;
        }
    }
}
