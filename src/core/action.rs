//! Player-initiated requests.
//!
//! Everything a connected player can ask of the engine is a `PlayerAction`.
//! The transport decodes requests into this type and hands them to
//! `Match::perform`; accepted actions are recorded in the action history.

use serde::{Deserialize, Serialize};

use super::entity::EntityId;
use super::player::PlayerId;
use crate::prompts::{PromptAnswer, PromptId};
use crate::triggers::AbilityId;

/// A request from a player.
///
/// ```
/// use ccg_resolver::core::{EntityId, PlayerAction};
/// use ccg_resolver::prompts::{PromptAnswer, PromptId};
///
/// let play = PlayerAction::PlayCard { card: EntityId(12) };
/// let skip = PlayerAction::Respond { prompt: PromptId(3), answer: PromptAnswer::Done };
/// assert_ne!(play, skip);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerAction {
    /// Play (marshal) a card from hand.
    PlayCard { card: EntityId },

    /// Trigger an action ability the player controls.
    TriggerAbility { ability: AbilityId },

    /// Answer an outstanding prompt.
    Respond { prompt: PromptId, answer: PromptAnswer },

    /// Close the player's open window prompt.
    Pass,

    /// Leave the match.
    Concede,
}

impl PlayerAction {
    /// Short name for logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            PlayerAction::PlayCard { .. } => "play_card",
            PlayerAction::TriggerAbility { .. } => "trigger_ability",
            PlayerAction::Respond { .. } => "respond",
            PlayerAction::Pass => "pass",
            PlayerAction::Concede => "concede",
        }
    }
}

/// An accepted action with metadata for history tracking.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    /// The player who took this action.
    pub player: PlayerId,

    /// The action taken.
    pub action: PlayerAction,

    /// Round number when the action was taken.
    pub round: u32,

    /// Sequence number within the match.
    pub sequence: u32,
}

impl ActionRecord {
    /// Create a new action record.
    #[must_use]
    pub fn new(player: PlayerId, action: PlayerAction, round: u32, sequence: u32) -> Self {
        Self {
            player,
            action,
            round,
            sequence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    #[test]
    fn test_kind() {
        assert_eq!(PlayerAction::Pass.kind(), "pass");
        assert_eq!(PlayerAction::PlayCard { card: EntityId(1) }.kind(), "play_card");
    }

    #[test]
    fn test_action_record_serialization() {
        let action = PlayerAction::Respond {
            prompt: PromptId(4),
            answer: PromptAnswer::Cards(smallvec![EntityId(5), EntityId(6)]),
        };
        let record = ActionRecord::new(PlayerId::new(1), action, 2, 3);

        let json = serde_json::to_string(&record).unwrap();
        let deserialized: ActionRecord = serde_json::from_str(&json).unwrap();

        assert_eq!(record, deserialized);
    }
}
