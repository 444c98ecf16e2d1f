//! A standard configuration and sample cards for a throne-war style game.
//!
//! ## Round structure
//!
//! | Phase | Windows | Player actions |
//! |---|---|---|
//! | plot | plot | |
//! | draw | draw | |
//! | marshaling | | marshal cards, actions |
//! | challenges | challenge begin, attackers declared, defenders declared | |
//! | dominance | dominance | |
//! | standing | standing | |
//! | taxation | | |
//!
//! Only the attackers-declared and defenders-declared windows prompt by
//! default; players opt into the others through `PlayerSettings`.
//!
//! ```
//! use ccg_resolver::games::thrones;
//!
//! let config = thrones::standard_config(2, 42);
//! assert!(config.validate().is_ok());
//! assert_eq!(config.phases.len(), 7);
//! ```

mod cards;

pub use cards::{DirewolfPup, MaesterCaleotte, QueensMen, ICONS};

use crate::cards::{attrs, CardDefinition, CardId, CardRegistry};
use crate::core::{EngineResult, MatchConfig, PhaseConfig, WindowConfig, WindowId};

/// Card types.
pub mod card_types {
    use crate::cards::CardTypeId;

    pub const CHARACTER: CardTypeId = CardTypeId::new(1);
    pub const LOCATION: CardTypeId = CardTypeId::new(2);
    pub const ATTACHMENT: CardTypeId = CardTypeId::new(3);
    pub const EVENT: CardTypeId = CardTypeId::new(4);
    pub const PLOT: CardTypeId = CardTypeId::new(5);
}

/// Phase ids of the standard round.
pub mod phases {
    use crate::core::PhaseId;

    pub const PLOT: PhaseId = PhaseId::new(1);
    pub const DRAW: PhaseId = PhaseId::new(2);
    pub const MARSHALING: PhaseId = PhaseId::new(3);
    pub const CHALLENGES: PhaseId = PhaseId::new(4);
    pub const DOMINANCE: PhaseId = PhaseId::new(5);
    pub const STANDING: PhaseId = PhaseId::new(6);
    pub const TAXATION: PhaseId = PhaseId::new(7);
}

/// Action window ids of the standard round.
pub mod windows {
    use crate::core::WindowId;

    pub const PLOT: WindowId = WindowId::new(1);
    pub const DRAW: WindowId = WindowId::new(2);
    pub const CHALLENGE_BEGIN: WindowId = WindowId::new(3);
    pub const ATTACKERS_DECLARED: WindowId = WindowId::new(4);
    pub const DEFENDERS_DECLARED: WindowId = WindowId::new(5);
    pub const DOMINANCE: WindowId = WindowId::new(6);
    pub const STANDING: WindowId = WindowId::new(7);
}

/// Card ids of the sample catalog.
pub mod card_ids {
    use crate::cards::CardId;

    pub const QUEENS_MEN: CardId = CardId::new(1);
    pub const MAESTER_CALEOTTE: CardId = CardId::new(2);
    pub const DIREWOLF_PUP: CardId = CardId::new(3);
    pub const GREY_WIND: CardId = CardId::new(4);
    pub const HEDGE_KNIGHT: CardId = CardId::new(5);
    pub const STANNIS_BARATHEON: CardId = CardId::new(6);
    pub const THE_KINGSROAD: CardId = CardId::new(7);
}

/// The standard round for `players` players.
#[must_use]
pub fn standard_config(players: usize, seed: u64) -> MatchConfig {
    let window = |id: WindowId, name: &str| WindowConfig::new(id, name);
    MatchConfig::new(players)
        .with_standard_zones()
        .with_seed(seed)
        .with_window(window(windows::PLOT, "plot"))
        .with_window(window(windows::DRAW, "draw"))
        .with_window(window(windows::CHALLENGE_BEGIN, "challenge begin"))
        .with_window(window(windows::ATTACKERS_DECLARED, "attackers declared").prompting())
        .with_window(window(windows::DEFENDERS_DECLARED, "defenders declared").prompting())
        .with_window(window(windows::DOMINANCE, "dominance"))
        .with_window(window(windows::STANDING, "standing"))
        .with_phase(PhaseConfig::new(phases::PLOT, "plot").with_window(windows::PLOT))
        .with_phase(PhaseConfig::new(phases::DRAW, "draw").with_window(windows::DRAW))
        .with_phase(
            PhaseConfig::new(phases::MARSHALING, "marshaling")
                .allowing_marshal()
                .with_action_window(),
        )
        .with_phase(
            PhaseConfig::new(phases::CHALLENGES, "challenges")
                .with_window(windows::CHALLENGE_BEGIN)
                .with_window(windows::ATTACKERS_DECLARED)
                .with_window(windows::DEFENDERS_DECLARED),
        )
        .with_phase(PhaseConfig::new(phases::DOMINANCE, "dominance").with_window(windows::DOMINANCE))
        .with_phase(PhaseConfig::new(phases::STANDING, "standing").with_window(windows::STANDING))
        .with_phase(PhaseConfig::new(phases::TAXATION, "taxation"))
}

fn character(id: CardId, name: &str, faction: &str, strength: i64) -> CardDefinition {
    CardDefinition::new(id, name, card_types::CHARACTER)
        .with_faction(faction)
        .with_attr(attrs::STRENGTH, strength)
}

/// The sample catalog: three scripted cards and a few vanilla ones.
pub fn sample_registry() -> EngineResult<CardRegistry> {
    let mut registry = CardRegistry::new();
    registry.register_scripted(
        character(card_ids::QUEENS_MEN, "Queen's Men", "baratheon", 3)
            .with_code("08008")
            .with_trait("Ally")
            .with_attr(attrs::ICON_POWER, 1),
        QueensMen,
    )?;
    registry.register_scripted(
        character(card_ids::MAESTER_CALEOTTE, "Maester Caleotte", "martell", 1)
            .with_code("01107")
            .with_trait("Maester")
            .with_attr(attrs::ICON_INTRIGUE, 1),
        MaesterCaleotte,
    )?;
    registry.register_scripted(
        character(card_ids::DIREWOLF_PUP, "Direwolf Pup", "stark", 0)
            .with_code("01149")
            .with_trait("Direwolf")
            .with_attr(attrs::ICON_MILITARY, 1),
        DirewolfPup,
    )?;
    registry.register(
        character(card_ids::GREY_WIND, "Grey Wind", "stark", 4)
            .with_trait("Direwolf")
            .with_attr(attrs::ICON_MILITARY, 1)
            .with_attr(attrs::ICON_POWER, 1),
    )?;
    registry.register(
        character(card_ids::HEDGE_KNIGHT, "Hedge Knight", "neutral", 2)
            .with_trait("Knight")
            .with_attr(attrs::ICON_MILITARY, 1),
    )?;
    registry.register(
        character(card_ids::STANNIS_BARATHEON, "Stannis Baratheon", "baratheon", 7)
            .with_trait("Lord")
            .with_trait("King")
            .with_attr(attrs::ICON_MILITARY, 1)
            .with_attr(attrs::ICON_POWER, 1),
    )?;
    registry.register(
        CardDefinition::new(card_ids::THE_KINGSROAD, "The Kingsroad", card_types::LOCATION)
            .with_attr(attrs::COST, 0),
    )?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PhaseId;

    #[test]
    fn test_default_prompting_windows() {
        let config = standard_config(2, 0);
        let prompting: Vec<WindowId> = config
            .windows
            .iter()
            .filter(|w| w.prompt_by_default)
            .map(|w| w.id)
            .collect();
        assert_eq!(prompting, vec![windows::ATTACKERS_DECLARED, windows::DEFENDERS_DECLARED]);
    }

    #[test]
    fn test_only_marshaling_allows_marshal() {
        let config = standard_config(4, 0);
        let marshal: Vec<PhaseId> = config
            .phases
            .iter()
            .filter(|p| p.allows_marshal)
            .map(|p| p.id)
            .collect();
        assert_eq!(marshal, vec![phases::MARSHALING]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_sample_registry() {
        let registry = sample_registry().unwrap();
        assert_eq!(registry.len(), 7);
        assert!(registry.script(card_ids::QUEENS_MEN).is_some());
        assert!(registry.script(card_ids::GREY_WIND).is_none());
        assert_eq!(
            registry.find_by_code("01149").map(|c| c.id),
            Some(card_ids::DIREWOLF_PUP)
        );
    }
}
