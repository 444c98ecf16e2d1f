//! Modifiers: duration-scoped adjustments to card attributes.
//!
//! A modifier is a (selector, attribute, operation, duration) tuple owned by
//! the match. `ModifierSpec` is the unregistered form handed to
//! `Match::apply_effect` or returned by a card script; the engine stamps it
//! with an id and a source when it registers it.

use serde::{Deserialize, Serialize};

use super::selector::CardSelector;
use crate::core::EntityId;

/// Unique identifier of a registered modifier. Allocation order is
/// registration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ModifierId(pub u32);

impl std::fmt::Display for ModifierId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Modifier({})", self.0)
    }
}

/// How a modifier changes an attribute.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModifierOp {
    /// Add a fixed amount.
    Add(i64),

    /// Replace the value computed so far.
    Set(i64),

    /// Add `amount` for each card in play matching `counted`.
    ///
    /// The card being evaluated is never counted, and `counted` sees it as
    /// its context card, so `SameControllerAsThis` means "same controller
    /// as the card whose attribute is being computed".
    AddPerCard { amount: i64, counted: CardSelector },
}

/// When a modifier stops applying.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Duration {
    /// Removed when the current phase ends.
    UntilEndOfPhase,
    /// Removed when the current round ends.
    UntilEndOfRound,
    /// Applies only while the source card is in play; removed when it leaves.
    WhileSourceInPlay,
    /// Never removed.
    Permanent,
    /// Removed only by an explicit `remove_effect`.
    UntilRemoved,
}

/// A modifier before registration.
///
/// ```
/// use ccg_resolver::cards::attrs;
/// use ccg_resolver::core::EntityId;
/// use ccg_resolver::effects::{CardSelector, Duration, ModifierSpec};
///
/// let blank_icon = ModifierSpec::set(attrs::ICON_MILITARY, 0)
///     .on(CardSelector::Card(EntityId(9)))
///     .until(Duration::UntilEndOfPhase);
/// assert_eq!(blank_icon.duration, Duration::UntilEndOfPhase);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifierSpec {
    pub selector: CardSelector,
    pub attribute: String,
    pub op: ModifierOp,
    pub duration: Duration,
}

impl ModifierSpec {
    /// A modifier on the source card itself, lasting while it is in play.
    pub fn new(attribute: impl Into<String>, op: ModifierOp) -> Self {
        Self {
            selector: CardSelector::This,
            attribute: attribute.into(),
            op,
            duration: Duration::WhileSourceInPlay,
        }
    }

    /// Fixed bonus.
    pub fn add(attribute: impl Into<String>, amount: i64) -> Self {
        Self::new(attribute, ModifierOp::Add(amount))
    }

    /// Absolute override.
    pub fn set(attribute: impl Into<String>, value: i64) -> Self {
        Self::new(attribute, ModifierOp::Set(value))
    }

    /// Dynamic bonus per matching card in play.
    pub fn add_per_card(attribute: impl Into<String>, amount: i64, counted: CardSelector) -> Self {
        Self::new(attribute, ModifierOp::AddPerCard { amount, counted })
    }

    /// Choose the affected cards (builder pattern).
    #[must_use]
    pub fn on(mut self, selector: CardSelector) -> Self {
        self.selector = selector;
        self
    }

    /// Set the duration (builder pattern).
    #[must_use]
    pub fn until(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

/// A registered modifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifier {
    pub id: ModifierId,

    /// Card that created the modifier, if any.
    pub source: Option<EntityId>,

    pub selector: CardSelector,
    pub attribute: String,
    pub op: ModifierOp,
    pub duration: Duration,
}

impl Modifier {
    /// Fold this modifier into `value` for `evaluated`.
    ///
    /// `count` supplies the number of counted cards for dynamic modifiers.
    pub(crate) fn apply(&self, value: i64, count: impl FnOnce(&CardSelector) -> usize) -> i64 {
        match &self.op {
            ModifierOp::Add(amount) => value.saturating_add(*amount),
            ModifierOp::Set(fixed) => *fixed,
            ModifierOp::AddPerCard { amount, counted } => {
                let count = i64::try_from(count(counted)).unwrap_or(i64::MAX);
                value.saturating_add(amount.saturating_mul(count))
            }
        }
    }

    /// Whether the selector names exactly one card.
    #[must_use]
    pub fn targets_only(&self, card: EntityId) -> bool {
        self.selector == CardSelector::Card(card)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn modifier(op: ModifierOp) -> Modifier {
        Modifier {
            id: ModifierId(1),
            source: None,
            selector: CardSelector::Everything,
            attribute: "strength".into(),
            op,
            duration: Duration::Permanent,
        }
    }

    #[test]
    fn test_apply_ops() {
        assert_eq!(modifier(ModifierOp::Add(2)).apply(3, |_| 0), 5);
        assert_eq!(modifier(ModifierOp::Set(0)).apply(3, |_| 0), 0);
        let per_card = modifier(ModifierOp::AddPerCard {
            amount: 2,
            counted: CardSelector::InPlay,
        });
        assert_eq!(per_card.apply(1, |_| 3), 7);
    }

    #[test]
    fn test_apply_saturates() {
        assert_eq!(modifier(ModifierOp::Add(i64::MAX)).apply(5, |_| 0), i64::MAX);
        assert_eq!(modifier(ModifierOp::Add(-5)).apply(i64::MIN, |_| 0), i64::MIN);
        let per_card = modifier(ModifierOp::AddPerCard {
            amount: i64::MAX / 2,
            counted: CardSelector::InPlay,
        });
        assert_eq!(per_card.apply(10, |_| 3), i64::MAX);
        assert_eq!(per_card.apply(0, |_| usize::MAX), i64::MAX);
    }

    #[test]
    fn test_spec_defaults_to_self_while_in_play() {
        let spec = ModifierSpec::add("strength", 1);
        assert_eq!(spec.selector, CardSelector::This);
        assert_eq!(spec.duration, Duration::WhileSourceInPlay);
    }

    #[test]
    fn test_targets_only() {
        let mut m = modifier(ModifierOp::Add(1));
        m.selector = CardSelector::Card(EntityId(4));
        assert!(m.targets_only(EntityId(4)));
        assert!(!m.targets_only(EntityId(5)));
    }
}
