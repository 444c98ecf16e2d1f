//! Event windows: resolving one event occurrence.
//!
//! ```text
//! Open → Interrupts → Default effect → Reactions → Close
//! ```
//!
//! Each ability stage queues one `AbilityStep` per eligible ability, in
//! resolution order, as children of the window; they resolve completely
//! (prompts and nested events included) before the window moves on. A
//! canceled event skips its default effect and its reactions.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{AbilityStep, Step, StepOutcome};
use crate::core::{EngineError, EngineResult};
use crate::game::Match;
use crate::triggers::{EventId, GameEvent, TriggerTiming};

/// What happens when an event is not canceled.
pub type DefaultEffect = Box<dyn FnOnce(&mut Match, &GameEvent) -> EngineResult<()> + Send>;

/// Where an event occurrence is in its resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventStatus {
    /// Raised, waiting behind other work.
    Pending,
    Resolving { canceled: bool },
    Resolved { canceled: bool },
    /// Dropped unfinished because the step that raised it failed or the
    /// match stopped. It never resolves.
    Abandoned,
}

impl EventStatus {
    /// Whether the event has been canceled.
    #[must_use]
    pub fn is_canceled(self) -> bool {
        matches!(
            self,
            EventStatus::Resolving { canceled: true } | EventStatus::Resolved { canceled: true }
        )
    }

    /// Whether the occurrence is finished, one way or another.
    #[must_use]
    pub fn is_settled(self) -> bool {
        matches!(self, EventStatus::Resolved { .. } | EventStatus::Abandoned)
    }
}

/// Every event occurrence of a match, so none resolves twice.
///
/// Ids are assigned in increasing order. Occurrences that are still pending
/// or resolving are tracked individually; once settled, only the unusual
/// outcomes (canceled, abandoned) are kept. An assigned id missing from both
/// maps resolved normally.
#[derive(Clone, Debug, Default)]
pub struct EventLedger {
    live: FxHashMap<EventId, EventStatus>,
    settled: FxHashMap<EventId, EventStatus>,
    last_id: u64,
}

impl EventLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue numbering after a restored match.
    pub(crate) fn resume_after(last_id: u64) -> Self {
        Self {
            last_id,
            ..Self::default()
        }
    }

    /// Last assigned id.
    #[must_use]
    pub fn last_id(&self) -> u64 {
        self.last_id
    }

    /// Assign a fresh id to a new occurrence.
    pub fn assign(&mut self) -> EventId {
        self.last_id += 1;
        let id = EventId(self.last_id);
        self.live.insert(id, EventStatus::Pending);
        id
    }

    fn was_assigned(&self, id: EventId) -> bool {
        id.is_assigned() && id.0 <= self.last_id
    }

    /// Status of an occurrence.
    #[must_use]
    pub fn status(&self, id: EventId) -> Option<EventStatus> {
        if let Some(status) = self.live.get(&id).or_else(|| self.settled.get(&id)) {
            return Some(*status);
        }
        self.was_assigned(id)
            .then_some(EventStatus::Resolved { canceled: false })
    }

    /// Whether an occurrence has been canceled.
    #[must_use]
    pub fn is_canceled(&self, id: EventId) -> bool {
        self.status(id).is_some_and(EventStatus::is_canceled)
    }

    /// Number of occurrences not yet settled.
    #[must_use]
    pub fn unsettled(&self) -> usize {
        self.live.len()
    }

    /// Start resolving an occurrence. Resolving one twice is an invariant
    /// violation.
    pub fn begin(&mut self, id: EventId) -> EngineResult<()> {
        let was_assigned = self.was_assigned(id);
        match self.live.get_mut(&id) {
            Some(status) if *status == EventStatus::Pending => {
                *status = EventStatus::Resolving { canceled: false };
                Ok(())
            }
            Some(_) => Err(EngineError::invariant(format!("{id} resolved twice"))),
            None if was_assigned => {
                Err(EngineError::invariant(format!("{id} resolved twice")))
            }
            None => Err(EngineError::invariant(format!("{id} was never raised"))),
        }
    }

    /// Cancel an occurrence that is resolving. Returns `false` if it was
    /// already canceled.
    pub fn cancel(&mut self, id: EventId) -> EngineResult<bool> {
        match self.live.get_mut(&id) {
            Some(EventStatus::Resolving { canceled }) => Ok(!std::mem::replace(canceled, true)),
            _ => Err(EngineError::illegal(format!("{id} is not resolving"))),
        }
    }

    /// Mark an occurrence resolved.
    pub fn finish(&mut self, id: EventId) {
        if let Some(status) = self.live.remove(&id) {
            if status.is_canceled() {
                self.settled.insert(id, EventStatus::Resolved { canceled: true });
            }
        }
    }

    /// Mark an occurrence dropped before it finished resolving.
    pub fn abandon(&mut self, id: EventId) {
        if self.live.remove(&id).is_some() {
            self.settled.insert(id, EventStatus::Abandoned);
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stage {
    Open,
    Interrupts,
    Default,
    Reactions,
    Close,
}

/// Resolution of one event occurrence.
pub struct EventWindow {
    event: Arc<GameEvent>,
    default: Option<DefaultEffect>,
    stage: Stage,
}

impl EventWindow {
    /// Create a window for an event with an assigned id.
    pub fn new(event: GameEvent, default: Option<DefaultEffect>) -> Self {
        Self {
            event: Arc::new(event),
            default,
            stage: Stage::Open,
        }
    }

    /// The event being resolved.
    #[must_use]
    pub fn event(&self) -> &GameEvent {
        &self.event
    }

    fn queue_abilities(&self, game: &mut Match, timing: TriggerTiming) {
        let eligible = game
            .abilities
            .eligible(&self.event, timing, &game.state, &game.cards);
        for ability in eligible {
            game.pipeline
                .push_child(Box::new(AbilityStep::new(ability, Some(Arc::clone(&self.event)))));
        }
    }
}

impl Step for EventWindow {
    fn name(&self) -> &'static str {
        "event window"
    }

    fn advance(&mut self, game: &mut Match) -> EngineResult<StepOutcome> {
        let id = self.event.id;
        match self.stage {
            Stage::Open => {
                game.events.begin(id)?;
                debug!(event = %id, event_type = %self.event.event_type, "event resolving");
                self.stage = Stage::Interrupts;
            }
            Stage::Interrupts => {
                self.queue_abilities(game, TriggerTiming::Before);
                self.stage = Stage::Default;
            }
            Stage::Default => {
                self.stage = Stage::Reactions;
                if game.events.is_canceled(id) {
                    debug!(event = %id, "event canceled, default effect skipped");
                } else if let Some(default) = self.default.take() {
                    default(game, self.event.as_ref())?;
                }
            }
            Stage::Reactions => {
                if !game.events.is_canceled(id) {
                    self.queue_abilities(game, TriggerTiming::After);
                }
                self.stage = Stage::Close;
            }
            Stage::Close => {
                game.events.finish(id);
                return Ok(StepOutcome::Done);
            }
        }
        Ok(StepOutcome::Continue)
    }

    fn abandon(&mut self, game: &mut Match) {
        debug!(event = %self.event.id, stage = ?self.stage, "event abandoned");
        game.events.abandon(self.event.id);
    }
}
