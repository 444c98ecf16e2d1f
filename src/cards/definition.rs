//! Card definitions - static card data.
//!
//! `CardDefinition` holds the printed properties of a card: name, type,
//! faction, traits, and base attribute values such as strength or challenge
//! icons. Runtime data (zone, controller, kneel state) lives in
//! `CardInstance`, and derived values come from the modifier engine.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Well-known attribute keys.
pub mod attrs {
    pub const STRENGTH: &str = "strength";
    pub const COST: &str = "cost";
    pub const ICON_MILITARY: &str = "icon.military";
    pub const ICON_INTRIGUE: &str = "icon.intrigue";
    pub const ICON_POWER: &str = "icon.power";
}

/// Unique identifier for a card definition.
///
/// Identifies the printed card (e.g. "Queen's Men"), not an instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CardId(pub u32);

impl CardId {
    /// Create a new card ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card({})", self.0)
    }
}

/// Card type identifier (character, location, event, ...).
///
/// Opaque to the engine; content defines the values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardTypeId(pub u32);

impl CardTypeId {
    /// Create a new card type ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Static card definition.
///
/// ## Example
///
/// ```
/// use ccg_resolver::cards::{attrs, CardDefinition, CardId, CardTypeId};
///
/// let pup = CardDefinition::new(CardId::new(1), "Direwolf Pup", CardTypeId::new(1))
///     .with_code("01155")
///     .with_faction("stark")
///     .with_trait("Direwolf")
///     .with_attr(attrs::STRENGTH, 0);
///
/// assert!(pup.has_trait("direwolf"));
/// assert_eq!(pup.base(attrs::STRENGTH), 0);
/// assert_eq!(pup.base(attrs::ICON_MILITARY), 0);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDefinition {
    pub id: CardId,

    /// Set code from the card database.
    pub code: String,

    pub name: String,
    pub card_type: CardTypeId,
    pub faction: String,
    pub traits: Vec<String>,

    /// Base values of integer attributes.
    pub attributes: FxHashMap<String, i64>,
}

impl CardDefinition {
    /// Create a new card definition.
    #[must_use]
    pub fn new(id: CardId, name: impl Into<String>, card_type: CardTypeId) -> Self {
        Self {
            id,
            code: String::new(),
            name: name.into(),
            card_type,
            faction: String::from("neutral"),
            traits: Vec::new(),
            attributes: FxHashMap::default(),
        }
    }

    /// Set the database code (builder pattern).
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    /// Set the faction (builder pattern).
    #[must_use]
    pub fn with_faction(mut self, faction: impl Into<String>) -> Self {
        self.faction = faction.into();
        self
    }

    /// Add a trait (builder pattern).
    #[must_use]
    pub fn with_trait(mut self, name: impl Into<String>) -> Self {
        self.traits.push(name.into());
        self
    }

    /// Set a base attribute value (builder pattern).
    #[must_use]
    pub fn with_attr(mut self, key: impl Into<String>, value: i64) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    /// Base value of an attribute; absent attributes are 0.
    #[must_use]
    pub fn base(&self, key: &str) -> i64 {
        self.attributes.get(key).copied().unwrap_or(0)
    }

    /// Trait check, case-insensitive.
    #[must_use]
    pub fn has_trait(&self, name: &str) -> bool {
        self.traits.iter().any(|t| t.eq_ignore_ascii_case(name))
    }

    /// Faction check, case-insensitive.
    #[must_use]
    pub fn is_faction(&self, faction: &str) -> bool {
        self.faction.eq_ignore_ascii_case(faction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_id() {
        let id = CardId::new(42);
        assert_eq!(id.raw(), 42);
        assert_eq!(format!("{}", id), "Card(42)");
    }

    #[test]
    fn test_card_ids_sort_by_number() {
        let mut ids = vec![CardId::new(7), CardId::new(1), CardId::new(3)];
        ids.sort_unstable();
        assert_eq!(ids, vec![CardId::new(1), CardId::new(3), CardId::new(7)]);
    }

    #[test]
    fn test_card_definition_builder() {
        let card = CardDefinition::new(CardId::new(1), "Maester Caleotte", CardTypeId::new(1))
            .with_faction("Martell")
            .with_trait("Maester")
            .with_attr(attrs::STRENGTH, 1)
            .with_attr(attrs::ICON_INTRIGUE, 1);

        assert_eq!(card.base(attrs::STRENGTH), 1);
        assert_eq!(card.base(attrs::ICON_POWER), 0);
        assert!(card.is_faction("martell"));
        assert!(!card.is_faction("stark"));
        assert!(card.has_trait("MAESTER"));
    }

    #[test]
    fn test_default_faction_is_neutral() {
        let card = CardDefinition::new(CardId::new(2), "Nobody", CardTypeId::new(1));
        assert!(card.is_faction("neutral"));
    }

    #[test]
    fn test_card_definition_serialization() {
        let card = CardDefinition::new(CardId::new(1), "Test", CardTypeId::new(0))
            .with_attr(attrs::COST, 2);

        let json = serde_json::to_string(&card).unwrap();
        let deserialized: CardDefinition = serde_json::from_str(&json).unwrap();

        assert_eq!(card, deserialized);
    }
}
