//! Interaction/prompt engine.
//!
//! Prompts are decision points owned by one player. A card asks through
//! `Match::prompt_for_select`, `Match::prompt_with_menu`, or
//! `Match::prompt_for_choice` with a continuation; resolution suspends until
//! the answer arrives and then runs the continuation, which may prompt again.
//!
//! - `schema`: what may be answered and the client-facing view
//! - `engine`: lifecycle of outstanding prompts

pub mod engine;
pub mod schema;

pub use engine::{Prompt, PromptEngine, PromptStatus};
pub use schema::{
    MenuButton, MenuSchema, PromptAnswer, PromptBody, PromptId, PromptKind, PromptView,
    SelectPredicate, SelectSchema,
};
