//! Match configuration types.
//!
//! Hosts configure a match at creation by providing:
//! - `ZoneConfig`: the zones each player owns (hand, draw deck, play area, ...)
//! - `WindowConfig`: named action windows and whether they prompt by default
//! - `PhaseConfig`: the ordered phases of a round and the windows inside them
//! - `PlayerSettings`: per-seat display name and window prompt preferences
//! - `MatchConfig`: everything above plus the RNG seed and first player
//!
//! Every config type derives serde so hosts may load them from any format.
//! `MatchConfig::validate` rejects inconsistent setups before a match exists.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use super::error::{EngineError, EngineResult};
use super::PlayerId;

/// Zone identifier.
///
/// Opaque to the engine; the zone's meaning comes from its `ZoneRole`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ZoneId(pub u16);

impl ZoneId {
    /// Create a new zone ID.
    #[must_use]
    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }
}

impl std::fmt::Display for ZoneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Zone({})", self.0)
    }
}

/// What a zone is for. Operations look zones up by owner and role.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoneRole {
    Hand,
    DrawDeck,
    DiscardPile,
    DeadPile,
    PlayArea,
    PlotDeck,
}

impl ZoneRole {
    /// All roles in the order player zones are laid out.
    pub const ALL: [ZoneRole; 6] = [
        ZoneRole::Hand,
        ZoneRole::DrawDeck,
        ZoneRole::DiscardPile,
        ZoneRole::DeadPile,
        ZoneRole::PlayArea,
        ZoneRole::PlotDeck,
    ];

    /// Cards in this zone are "in play".
    #[must_use]
    pub fn is_in_play(self) -> bool {
        matches!(self, ZoneRole::PlayArea)
    }

    /// Default visibility for a zone of this role.
    #[must_use]
    pub fn default_visibility(self) -> ZoneVisibility {
        match self {
            ZoneRole::Hand | ZoneRole::PlotDeck => ZoneVisibility::OwnerOnly,
            ZoneRole::DrawDeck => ZoneVisibility::Hidden,
            ZoneRole::DiscardPile | ZoneRole::DeadPile | ZoneRole::PlayArea => {
                ZoneVisibility::Public
            }
        }
    }

    fn label(self) -> &'static str {
        match self {
            ZoneRole::Hand => "hand",
            ZoneRole::DrawDeck => "draw deck",
            ZoneRole::DiscardPile => "discard pile",
            ZoneRole::DeadPile => "dead pile",
            ZoneRole::PlayArea => "play area",
            ZoneRole::PlotDeck => "plot deck",
        }
    }
}

/// Zone visibility rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZoneVisibility {
    /// All cards visible to all players (play area, discard pile).
    Public,
    /// Cards visible only to the zone owner (hand).
    OwnerOnly,
    /// Cards not visible to anyone (draw deck).
    Hidden,
}

/// Configuration for a single zone.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneConfig {
    /// Unique identifier for this zone.
    pub id: ZoneId,

    /// Human-readable name (for debugging/display).
    pub name: String,

    /// Zone owner. `None` for shared zones.
    pub owner: Option<PlayerId>,

    /// What the zone is used for.
    pub role: ZoneRole,

    /// Visibility rules for cards in this zone.
    pub visibility: ZoneVisibility,

    /// Is card order significant to players? (draw deck, discard pile)
    pub ordered: bool,
}

impl ZoneConfig {
    /// Create a new zone configuration with the role's default visibility.
    pub fn new(id: ZoneId, name: impl Into<String>, role: ZoneRole) -> Self {
        Self {
            id,
            name: name.into(),
            owner: None,
            role,
            visibility: role.default_visibility(),
            ordered: matches!(role, ZoneRole::DrawDeck | ZoneRole::DiscardPile),
        }
    }

    /// Set the zone owner.
    #[must_use]
    pub fn with_owner(mut self, owner: PlayerId) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Override the visibility.
    #[must_use]
    pub fn with_visibility(mut self, visibility: ZoneVisibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Whether cards in this zone are in play.
    #[must_use]
    pub fn is_in_play(&self) -> bool {
        self.role.is_in_play()
    }
}

/// Opaque phase identifier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhaseId(pub u32);

impl PhaseId {
    /// Create a new phase ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for PhaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Phase({})", self.0)
    }
}

/// Action window identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowId(pub u16);

impl WindowId {
    /// Create a new window ID.
    #[must_use]
    pub const fn new(id: u16) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for WindowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Window({})", self.0)
    }
}

/// A named action window inside a phase.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowConfig {
    pub id: WindowId,
    pub name: String,
    /// Prompt players for responses here unless their settings say otherwise.
    pub prompt_by_default: bool,
}

impl WindowConfig {
    /// Create a window that does not prompt by default.
    pub fn new(id: WindowId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            prompt_by_default: false,
        }
    }

    /// Prompt for responses here by default.
    #[must_use]
    pub fn prompting(mut self) -> Self {
        self.prompt_by_default = true;
        self
    }
}

/// A phase of the round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseConfig {
    pub id: PhaseId,
    pub name: String,

    /// Windows opened, in order, when the phase begins.
    pub windows: Vec<WindowId>,

    /// Non-forced player actions are legal while the match is idle in this phase.
    pub action_window: bool,

    /// Cards may be played (marshaled) from hand in this phase.
    pub allows_marshal: bool,
}

impl PhaseConfig {
    /// Create a phase with no windows and no player actions.
    pub fn new(id: PhaseId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            windows: Vec::new(),
            action_window: false,
            allows_marshal: false,
        }
    }

    /// Add a window (builder pattern).
    #[must_use]
    pub fn with_window(mut self, window: WindowId) -> Self {
        self.windows.push(window);
        self
    }

    /// Allow player actions while idle in this phase.
    #[must_use]
    pub fn with_action_window(mut self) -> Self {
        self.action_window = true;
        self
    }

    /// Allow cards to be played from hand in this phase.
    #[must_use]
    pub fn allowing_marshal(mut self) -> Self {
        self.allows_marshal = true;
        self
    }
}

/// Per-seat settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSettings {
    pub name: String,

    /// Windows where this player wants a pause-and-confirm prompt.
    /// `None` falls back to each window's `prompt_by_default`.
    pub prompt_windows: Option<Vec<WindowId>>,
}

impl PlayerSettings {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prompt_windows: None,
        }
    }

    /// Prompt exactly at the given windows.
    #[must_use]
    pub fn with_prompt_windows(mut self, windows: impl IntoIterator<Item = WindowId>) -> Self {
        self.prompt_windows = Some(windows.into_iter().collect());
        self
    }

    /// Whether this player is prompted when `window` opens.
    #[must_use]
    pub fn prompts_at(&self, window: &WindowConfig) -> bool {
        match &self.prompt_windows {
            Some(windows) => windows.contains(&window.id),
            None => window.prompt_by_default,
        }
    }
}

/// Complete match configuration.
///
/// ```
/// use ccg_resolver::core::{MatchConfig, PhaseConfig, PhaseId, PlayerId, ZoneRole};
///
/// let config = MatchConfig::new(2)
///     .with_standard_zones()
///     .with_phase(PhaseConfig::new(PhaseId::new(1), "marshaling").allowing_marshal())
///     .with_seed(7);
///
/// assert!(config.validate().is_ok());
/// assert!(config.zone_for(PlayerId::new(1), ZoneRole::Hand).is_some());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Number of players (2-255).
    pub player_count: usize,

    pub zones: Vec<ZoneConfig>,
    pub phases: Vec<PhaseConfig>,
    pub windows: Vec<WindowConfig>,

    /// Per-seat settings. Empty means "Player N" names and window defaults.
    pub players: Vec<PlayerSettings>,

    pub seed: u64,
    pub first_player: PlayerId,
}

impl MatchConfig {
    /// Create an empty configuration.
    pub fn new(player_count: usize) -> Self {
        Self {
            player_count,
            zones: Vec::new(),
            phases: Vec::new(),
            windows: Vec::new(),
            players: Vec::new(),
            seed: 0,
            first_player: PlayerId::new(0),
        }
    }

    /// Add one zone of every role for every player.
    ///
    /// Zone ids are `seat * 16 + role index`.
    #[must_use]
    pub fn with_standard_zones(mut self) -> Self {
        for player in PlayerId::all(self.player_count) {
            for (index, role) in ZoneRole::ALL.iter().enumerate() {
                let id = ZoneId::new(player.index() as u16 * 16 + index as u16);
                let name = format!("{} {}", player, role.label());
                self.zones.push(ZoneConfig::new(id, name, *role).with_owner(player));
            }
        }
        self
    }

    /// Add a zone configuration.
    #[must_use]
    pub fn with_zone(mut self, zone: ZoneConfig) -> Self {
        self.zones.push(zone);
        self
    }

    /// Append a phase.
    #[must_use]
    pub fn with_phase(mut self, phase: PhaseConfig) -> Self {
        self.phases.push(phase);
        self
    }

    /// Add a window definition.
    #[must_use]
    pub fn with_window(mut self, window: WindowConfig) -> Self {
        self.windows.push(window);
        self
    }

    /// Add settings for the next seat.
    #[must_use]
    pub fn with_player(mut self, settings: PlayerSettings) -> Self {
        self.players.push(settings);
        self
    }

    /// Set the RNG seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the first player of round one.
    #[must_use]
    pub fn with_first_player(mut self, player: PlayerId) -> Self {
        self.first_player = player;
        self
    }

    /// Get a zone config by ID.
    #[must_use]
    pub fn get_zone(&self, id: ZoneId) -> Option<&ZoneConfig> {
        self.zones.iter().find(|z| z.id == id)
    }

    /// Find the zone a player owns for a role.
    #[must_use]
    pub fn zone_for(&self, owner: PlayerId, role: ZoneRole) -> Option<ZoneId> {
        self.zones
            .iter()
            .find(|z| z.owner == Some(owner) && z.role == role)
            .map(|z| z.id)
    }

    /// Get a window config by ID.
    #[must_use]
    pub fn get_window(&self, id: WindowId) -> Option<&WindowConfig> {
        self.windows.iter().find(|w| w.id == id)
    }

    /// Position of a phase in the round.
    #[must_use]
    pub fn phase_index(&self, id: PhaseId) -> Option<usize> {
        self.phases.iter().position(|p| p.id == id)
    }

    /// Settings for a seat, falling back to defaults.
    #[must_use]
    pub fn settings_for(&self, player: PlayerId) -> PlayerSettings {
        self.players
            .get(player.index())
            .cloned()
            .unwrap_or_else(|| PlayerSettings::new(player.to_string()))
    }

    /// Check the configuration for inconsistencies.
    pub fn validate(&self) -> EngineResult<()> {
        if self.player_count < 2 || self.player_count > 255 {
            return Err(EngineError::config(format!(
                "player count must be between 2 and 255, got {}",
                self.player_count
            )));
        }
        if !self.players.is_empty() && self.players.len() != self.player_count {
            return Err(EngineError::config(format!(
                "{} player settings for {} players",
                self.players.len(),
                self.player_count
            )));
        }
        if self.first_player.index() >= self.player_count {
            return Err(EngineError::config(format!(
                "first player {} is not seated",
                self.first_player
            )));
        }

        let mut zone_ids = FxHashSet::default();
        for zone in &self.zones {
            if !zone_ids.insert(zone.id) {
                return Err(EngineError::config(format!("duplicate zone {}", zone.id)));
            }
            if zone.owner.is_some_and(|o| o.index() >= self.player_count) {
                return Err(EngineError::config(format!(
                    "zone {} is owned by an unseated player",
                    zone.id
                )));
            }
        }
        for player in PlayerId::all(self.player_count) {
            for role in [ZoneRole::Hand, ZoneRole::DrawDeck, ZoneRole::DiscardPile, ZoneRole::PlayArea] {
                if self.zone_for(player, role).is_none() {
                    return Err(EngineError::config(format!(
                        "{} has no {}",
                        player,
                        role.label()
                    )));
                }
            }
        }

        if self.phases.is_empty() {
            return Err(EngineError::config("at least one phase is required"));
        }
        let mut phase_ids = FxHashSet::default();
        for phase in &self.phases {
            if !phase_ids.insert(phase.id) {
                return Err(EngineError::config(format!("duplicate phase {}", phase.id)));
            }
            for window in &phase.windows {
                if self.get_window(*window).is_none() {
                    return Err(EngineError::config(format!(
                        "phase '{}' opens unknown {}",
                        phase.name, window
                    )));
                }
            }
        }

        let mut window_ids = FxHashSet::default();
        for window in &self.windows {
            if !window_ids.insert(window.id) {
                return Err(EngineError::config(format!("duplicate window {}", window.id)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> MatchConfig {
        MatchConfig::new(2)
            .with_standard_zones()
            .with_phase(PhaseConfig::new(PhaseId::new(1), "marshaling"))
    }

    #[test]
    fn test_zone_id() {
        let id = ZoneId::new(5);
        assert_eq!(id.raw(), 5);
        assert_eq!(format!("{}", id), "Zone(5)");
    }

    #[test]
    fn test_zone_config_defaults_follow_role() {
        let hand = ZoneConfig::new(ZoneId::new(0), "Hand", ZoneRole::Hand);
        assert_eq!(hand.visibility, ZoneVisibility::OwnerOnly);
        assert!(!hand.ordered);

        let deck = ZoneConfig::new(ZoneId::new(1), "Deck", ZoneRole::DrawDeck);
        assert_eq!(deck.visibility, ZoneVisibility::Hidden);
        assert!(deck.ordered);

        let play = ZoneConfig::new(ZoneId::new(2), "Play", ZoneRole::PlayArea);
        assert!(play.is_in_play());
    }

    #[test]
    fn test_standard_zones() {
        let config = minimal();
        assert_eq!(config.zones.len(), 12);
        assert_eq!(
            config.zone_for(PlayerId::new(1), ZoneRole::PlayArea),
            Some(ZoneId::new(20))
        );
        assert_eq!(config.zone_for(PlayerId::new(2), ZoneRole::Hand), None);
    }

    #[test]
    fn test_player_settings_window_fallback() {
        let attackers = WindowConfig::new(WindowId::new(3), "attackers declared").prompting();
        let plot = WindowConfig::new(WindowId::new(0), "plot");

        let default = PlayerSettings::new("alice");
        assert!(default.prompts_at(&attackers));
        assert!(!default.prompts_at(&plot));

        let custom = PlayerSettings::new("bob").with_prompt_windows([WindowId::new(0)]);
        assert!(!custom.prompts_at(&attackers));
        assert!(custom.prompts_at(&plot));
    }

    #[test]
    fn test_validate_accepts_minimal() {
        assert!(minimal().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_single_player() {
        let config = MatchConfig::new(1).with_standard_zones();
        assert!(matches!(config.validate(), Err(EngineError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_rejects_unknown_window() {
        let config = MatchConfig::new(2).with_standard_zones().with_phase(
            PhaseConfig::new(PhaseId::new(1), "challenges").with_window(WindowId::new(9)),
        );
        assert!(matches!(config.validate(), Err(EngineError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_rejects_missing_zones() {
        let config = MatchConfig::new(2).with_phase(PhaseConfig::new(PhaseId::new(1), "draw"));
        assert!(matches!(config.validate(), Err(EngineError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_rejects_duplicate_zone() {
        let config = minimal().with_zone(ZoneConfig::new(ZoneId::new(0), "again", ZoneRole::PlayArea));
        assert!(matches!(config.validate(), Err(EngineError::InvalidConfig(_))));
    }

    #[test]
    fn test_settings_for_falls_back_to_seat_name() {
        let config = minimal();
        assert_eq!(config.settings_for(PlayerId::new(1)).name, "Player 1");
    }

    #[test]
    fn test_config_json_roundtrip() {
        let config = minimal().with_seed(99);
        let json = serde_json::to_string(&config).unwrap();
        let back: MatchConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }
}
