//! What an ability handler sees.

use std::sync::Arc;

use tracing::debug;

use super::Match;
use crate::core::{EngineError, EngineResult, EntityId, PlayerId};
use crate::triggers::{AbilityCategory, AbilityId, GameEvent};

/// Handler context: the match plus everything known about the firing.
///
/// ```
/// use ccg_resolver::triggers::{events, Ability};
///
/// let veto = Ability::interrupt("Veto")
///     .on(events::CARD_KNEELED)
///     .handler(|ctx| {
///         ctx.cancel_event()?;
///         Ok(())
///     });
/// assert!(veto.category.can_cancel());
/// ```
pub struct AbilityContext<'a> {
    pub game: &'a mut Match,
    pub ability: AbilityId,
    pub name: String,

    /// Card granting the ability, if any.
    pub source: Option<EntityId>,

    /// Controller at the moment the handler started.
    pub controller: PlayerId,

    pub category: AbilityCategory,

    /// Event being resolved; `None` for player actions.
    pub event: Option<Arc<GameEvent>>,

    /// Target chosen before the handler ran.
    pub target: Option<EntityId>,
}

impl AbilityContext<'_> {
    /// Cancel the event being resolved.
    ///
    /// Only interrupts may cancel, and only cancelable events. Canceling
    /// twice is harmless; returns `false` the second time.
    pub fn cancel_event(&mut self) -> EngineResult<bool> {
        if !self.category.can_cancel() {
            return Err(EngineError::misconfigured(format!(
                "{} is not an interrupt and cannot cancel",
                self.name
            )));
        }
        let Some(event) = &self.event else {
            return Err(EngineError::misconfigured(format!(
                "{} has no event to cancel",
                self.name
            )));
        };
        if !event.cancelable {
            return Err(EngineError::misconfigured(format!(
                "{} tried to cancel {}, which is not cancelable",
                self.name, event.id
            )));
        }
        let canceled = self.game.events.cancel(event.id)?;
        if canceled {
            debug!(event = %event.id, ability = %self.ability, "event canceled");
        }
        Ok(canceled)
    }

    /// The event, or a misconfiguration error for handlers that need one.
    pub fn require_event(&self) -> EngineResult<Arc<GameEvent>> {
        self.event
            .clone()
            .ok_or_else(|| EngineError::misconfigured(format!("{} needs an event", self.name)))
    }

    /// The chosen target, or a misconfiguration error.
    pub fn require_target(&self) -> EngineResult<EntityId> {
        self.target
            .ok_or_else(|| EngineError::misconfigured(format!("{} has no target", self.name)))
    }

    /// First opponent of the controller in APNAP order.
    #[must_use]
    pub fn opponent(&self) -> Option<PlayerId> {
        self.game.opponent_of(self.controller)
    }
}
