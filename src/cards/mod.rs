//! Card system: definitions, instances, scripts, and registry.
//!
//! ## Key Types
//!
//! - `CardId`: Identifier for card definitions
//! - `CardTypeId`: Opaque type identifier (content defines types)
//! - `CardDefinition`: Printed card data: faction, traits, base attributes
//! - `CardInstance`: Runtime card state (zone, owner, controller, kneel)
//! - `CardScript`: Abilities and persistent effects of a printed card
//! - `CardRegistry`: Definition and script lookup

pub mod definition;
pub mod instance;
pub mod registry;
pub mod script;

pub use definition::{attrs, CardDefinition, CardId, CardTypeId};
pub use instance::CardInstance;
pub use registry::CardRegistry;
pub use script::CardScript;
