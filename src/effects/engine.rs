//! Modifier engine: derived attribute computation.
//!
//! `compute_attribute` starts from the printed base value and folds every
//! active modifier that matches the card, in registration order. Nothing is
//! cached: each read recomputes from live state, so a card entering or
//! leaving play is reflected by the next read with no invalidation calls.
//!
//! Expiry boundaries remove modifiers eagerly:
//! - `expire_phase` / `expire_round` at the end of a phase or round
//! - `expire_source` when a source card leaves play
//! - `expire_target` when the single card a modifier names leaves play
//!
//! Reads additionally skip `WhileSourceInPlay` modifiers whose source is not
//! in play, so no expired modifier is ever observable.

use tracing::debug;

use super::modifier::{Duration, Modifier, ModifierId, ModifierSpec};
use super::selector::SelectorContext;
use crate::core::{EngineError, EngineResult, EntityId, GameState};

/// Registered modifiers of one match.
#[derive(Clone, Debug, Default)]
pub struct ModifierEngine {
    /// In registration order.
    modifiers: Vec<Modifier>,
    next_id: u32,
}

impl ModifierEngine {
    /// Create an empty engine.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_modifiers(modifiers: Vec<Modifier>) -> Self {
        let next_id = modifiers.iter().map(|m| m.id.0 + 1).max().unwrap_or(0);
        Self { modifiers, next_id }
    }

    /// Register a modifier.
    pub fn apply(&mut self, source: Option<EntityId>, spec: ModifierSpec) -> ModifierId {
        let id = ModifierId(self.next_id);
        self.next_id += 1;
        debug!(modifier = %id, attribute = %spec.attribute, duration = ?spec.duration, "modifier applied");
        self.modifiers.push(Modifier {
            id,
            source,
            selector: spec.selector,
            attribute: spec.attribute,
            op: spec.op,
            duration: spec.duration,
        });
        id
    }

    /// Remove a modifier explicitly.
    ///
    /// Permanent modifiers cannot be removed.
    pub fn remove(&mut self, id: ModifierId) -> EngineResult<Modifier> {
        let index = self
            .modifiers
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| EngineError::illegal(format!("no active {id}")))?;
        if self.modifiers[index].duration == Duration::Permanent {
            return Err(EngineError::illegal(format!("{id} is permanent")));
        }
        Ok(self.modifiers.remove(index))
    }

    /// Get a modifier.
    #[must_use]
    pub fn get(&self, id: ModifierId) -> Option<&Modifier> {
        self.modifiers.iter().find(|m| m.id == id)
    }

    /// All registered modifiers in registration order.
    #[must_use]
    pub fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }

    /// Number of registered modifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.modifiers.len()
    }

    /// Whether no modifiers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modifiers.is_empty()
    }

    fn is_live(modifier: &Modifier, state: &GameState) -> bool {
        match (modifier.duration, modifier.source) {
            (Duration::WhileSourceInPlay, Some(source)) => state.is_in_play(source),
            _ => true,
        }
    }

    /// Modifiers currently affecting `attribute` of `card`, in fold order.
    #[must_use]
    pub fn affecting<'m>(
        &'m self,
        ctx: &SelectorContext<'_>,
        card: EntityId,
        attribute: &str,
    ) -> Vec<&'m Modifier> {
        self.modifiers
            .iter()
            .filter(|m| m.attribute == attribute && Self::is_live(m, ctx.state))
            .filter(|m| m.selector.matches(&ctx.with_this(m.source), card))
            .collect()
    }

    /// Effective value of `attribute` on `card`.
    ///
    /// Unknown cards compute to 0.
    #[must_use]
    pub fn compute_attribute(&self, ctx: &SelectorContext<'_>, card: EntityId, attribute: &str) -> i64 {
        let Some((_, definition)) = ctx.lookup(card) else {
            return 0;
        };
        self.affecting(ctx, card, attribute)
            .into_iter()
            .fold(definition.base(attribute), |value, modifier| {
                modifier.apply(value, |counted| counted.count_in_play(ctx, card))
            })
    }

    fn expire_where(&mut self, boundary: &str, mut expired: impl FnMut(&Modifier) -> bool) -> usize {
        let before = self.modifiers.len();
        self.modifiers.retain(|m| !expired(m));
        let removed = before - self.modifiers.len();
        if removed > 0 {
            debug!(boundary, removed, "modifiers expired");
        }
        removed
    }

    /// Remove until-end-of-phase modifiers.
    pub fn expire_phase(&mut self) -> usize {
        self.expire_where("phase", |m| m.duration == Duration::UntilEndOfPhase)
    }

    /// Remove until-end-of-round modifiers.
    pub fn expire_round(&mut self) -> usize {
        self.expire_where("round", |m| m.duration == Duration::UntilEndOfRound)
    }

    /// Remove modifiers that last while `source` is in play.
    pub fn expire_source(&mut self, source: EntityId) -> usize {
        self.expire_where("source left play", |m| {
            m.duration == Duration::WhileSourceInPlay && m.source == Some(source)
        })
    }

    /// Remove temporary modifiers that name exactly `card`.
    pub fn expire_target(&mut self, card: EntityId) -> usize {
        self.expire_where("target left play", |m| {
            matches!(m.duration, Duration::UntilEndOfPhase | Duration::UntilEndOfRound)
                && m.targets_only(card)
        })
    }
}
