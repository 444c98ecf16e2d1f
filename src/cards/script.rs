//! Card behaviour binding.
//!
//! A card's behaviour is a `CardScript`: a small object that hands the
//! engine the abilities and persistent effects the card has while it is in
//! play. The engine calls it when the card enters play and drops everything
//! it returned when the card leaves.
//!
//! ```
//! use ccg_resolver::cards::CardScript;
//! use ccg_resolver::cards::attrs;
//! use ccg_resolver::core::EntityId;
//! use ccg_resolver::effects::{CardSelector, ModifierSpec};
//!
//! /// +1 strength for each other Knight its controller has in play.
//! struct Banneret;
//!
//! impl CardScript for Banneret {
//!     fn persistent_effects(&self, _card: EntityId) -> Vec<ModifierSpec> {
//!         vec![ModifierSpec::add_per_card(
//!             attrs::STRENGTH,
//!             1,
//!             CardSelector::all([CardSelector::HasTrait("Knight".into()), CardSelector::SameControllerAsThis]),
//!         )]
//!     }
//! }
//! ```

use crate::core::EntityId;
use crate::effects::ModifierSpec;
use crate::triggers::Ability;

/// Behaviour of one printed card.
pub trait CardScript: Send + Sync {
    /// Abilities registered for `card` when it enters play.
    ///
    /// Event listeners are expressed here too, as forced reactions
    /// (see `Ability::listener`).
    fn abilities(&self, card: EntityId) -> Vec<Ability> {
        let _ = card;
        Vec::new()
    }

    /// Modifiers applied while `card` is in play.
    ///
    /// Each spec is registered with `card` as its source; a spec that keeps
    /// its default selector applies to the card itself. Durations are forced
    /// to "while source in play".
    fn persistent_effects(&self, card: EntityId) -> Vec<ModifierSpec> {
        let _ = card;
        Vec::new()
    }
}
