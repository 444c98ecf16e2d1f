//! Card registry: definitions and their behaviour scripts.
//!
//! The `CardRegistry` stores every card definition a match may use, plus the
//! optional `CardScript` that gives a definition its abilities. A match holds
//! it behind an `Arc` so many matches can share one catalog.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::definition::{CardDefinition, CardId};
use super::script::CardScript;
use crate::core::error::{EngineError, EngineResult};

/// Registry of card definitions.
///
/// ## Example
///
/// ```
/// use ccg_resolver::cards::{CardRegistry, CardDefinition, CardId, CardTypeId};
///
/// let mut registry = CardRegistry::new();
/// registry
///     .register(CardDefinition::new(CardId::new(1), "Winterfell Steward", CardTypeId::new(1)))
///     .unwrap();
///
/// let found = registry.get(CardId::new(1)).unwrap();
/// assert_eq!(found.name, "Winterfell Steward");
/// assert!(registry.script(CardId::new(1)).is_none());
/// ```
#[derive(Clone, Default)]
pub struct CardRegistry {
    cards: FxHashMap<CardId, CardDefinition>,
    scripts: FxHashMap<CardId, Arc<dyn CardScript>>,
}

impl std::fmt::Debug for CardRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardRegistry")
            .field("cards", &self.cards.len())
            .field("scripts", &self.scripts.len())
            .finish()
    }
}

impl CardRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a vanilla card definition.
    pub fn register(&mut self, card: CardDefinition) -> EngineResult<()> {
        if self.cards.contains_key(&card.id) {
            return Err(EngineError::config(format!(
                "card {} registered twice",
                card.id
            )));
        }
        self.cards.insert(card.id, card);
        Ok(())
    }

    /// Register a card definition together with its behaviour.
    pub fn register_scripted(
        &mut self,
        card: CardDefinition,
        script: impl CardScript + 'static,
    ) -> EngineResult<()> {
        let id = card.id;
        self.register(card)?;
        self.scripts.insert(id, Arc::new(script));
        Ok(())
    }

    /// Get a card definition by ID.
    #[must_use]
    pub fn get(&self, id: CardId) -> Option<&CardDefinition> {
        self.cards.get(&id)
    }

    /// Behaviour script of a card, if it has one.
    #[must_use]
    pub fn script(&self, id: CardId) -> Option<Arc<dyn CardScript>> {
        self.scripts.get(&id).cloned()
    }

    /// Find a card by its database code.
    #[must_use]
    pub fn find_by_code(&self, code: &str) -> Option<&CardDefinition> {
        self.cards.values().find(|c| c.code == code)
    }

    /// Check if a card ID is registered.
    #[must_use]
    pub fn contains(&self, id: CardId) -> bool {
        self.cards.contains_key(&id)
    }

    /// Get the number of registered cards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Iterate over all card definitions.
    pub fn iter(&self) -> impl Iterator<Item = &CardDefinition> {
        self.cards.values()
    }
}
