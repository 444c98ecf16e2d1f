//! Turn/phase controller.
//!
//! Phases run in configured order and wrap into the next round. A phase
//! transition is a [`PhaseStep`] on the resolution pipeline:
//!
//! ```text
//! PHASE_ENDED → expire phase modifiers → [ROUND_ENDED → expire round modifiers → round + 1]
//!             → enter next phase → PHASE_STARTED → each configured window
//! ```
//!
//! Each window is a [`WindowStep`]: it opens, gives every player whose
//! settings ask for it a "pass" prompt in APNAP order, and closes.
//!
//! Transitions are requested by the host (`Match::request_phase_advance`).
//! A request made while resolution is pending is remembered and runs as soon
//! as the pipeline drains. Requests are counted: two deferred requests move
//! the match two phases, each one after the previous transition's windows
//! have closed.

mod steps;

pub use steps::{PhaseStep, WindowStep};

use serde::{Deserialize, Serialize};

use crate::core::WindowId;

/// Outcome of a phase advance request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhaseAdvance {
    /// The transition ran (it may itself be waiting on a prompt).
    Advanced,
    /// Resolution is pending; the transition runs once it drains.
    Deferred,
}

/// Where the match is in its round.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseController {
    /// Index into the configured phases.
    pub phase_index: usize,

    /// Window currently open, if any.
    pub open_window: Option<WindowId>,

    pending_advances: u32,
    started: bool,
}

impl PhaseController {
    /// Create a controller for a match that has not started.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the first phase has been entered.
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.started
    }

    pub(crate) fn mark_started(&mut self) {
        self.started = true;
    }

    /// Whether a transition is waiting for resolution to drain.
    #[must_use]
    pub fn has_pending_advance(&self) -> bool {
        self.pending_advances > 0
    }

    /// Number of deferred transitions.
    #[must_use]
    pub fn pending_advances(&self) -> u32 {
        self.pending_advances
    }

    pub(crate) fn defer_advance(&mut self) {
        self.pending_advances = self.pending_advances.saturating_add(1);
    }

    /// Consume one deferred transition, if any.
    pub(crate) fn take_pending_advance(&mut self) -> bool {
        if self.pending_advances == 0 {
            return false;
        }
        self.pending_advances -= 1;
        true
    }

    /// Index of the phase after the current one, wrapping at `count`.
    #[must_use]
    pub fn next_index(&self, count: usize) -> usize {
        if count == 0 {
            0
        } else {
            (self.phase_index + 1) % count
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_index_wraps() {
        let mut controller = PhaseController::new();
        assert_eq!(controller.next_index(3), 1);
        controller.phase_index = 2;
        assert_eq!(controller.next_index(3), 0);
        assert_eq!(controller.next_index(0), 0);
    }

    #[test]
    fn test_pending_advances_are_counted() {
        let mut controller = PhaseController::new();
        assert!(!controller.take_pending_advance());
        controller.defer_advance();
        controller.defer_advance();
        assert_eq!(controller.pending_advances(), 2);
        assert!(controller.take_pending_advance());
        assert!(controller.has_pending_advance());
        assert!(controller.take_pending_advance());
        assert!(!controller.take_pending_advance());
        assert!(!controller.has_pending_advance());
    }

    #[test]
    fn test_serialization() {
        let mut controller = PhaseController::new();
        controller.mark_started();
        controller.phase_index = 4;
        controller.open_window = Some(WindowId::new(2));

        let json = serde_json::to_string(&controller).unwrap();
        let back: PhaseController = serde_json::from_str(&json).unwrap();
        assert_eq!(controller, back);
    }
}
