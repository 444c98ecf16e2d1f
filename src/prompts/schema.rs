//! Prompt schemas, answers, and client views.
//!
//! A schema describes what a player may answer. Schemas are validated
//! against live state when the answer arrives, so a card that left the
//! legal set after the prompt was shown is rejected.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{EntityId, PlayerId, ResponseRejection, WindowId};
use crate::effects::{CardSelector, SelectorContext};

/// Identifier of a prompt, unique within a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PromptId(pub u32);

impl std::fmt::Display for PromptId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Prompt#{}", self.0)
    }
}

/// A player's answer to a prompt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PromptAnswer {
    /// Cards chosen in a select prompt.
    Cards(SmallVec<[EntityId; 4]>),
    /// Index of a menu button.
    Button(usize),
    /// The "Done" option (skip).
    Done,
}

impl PromptAnswer {
    /// Answer with a single card.
    #[must_use]
    pub fn card(card: EntityId) -> Self {
        PromptAnswer::Cards(SmallVec::from_slice(&[card]))
    }

    /// First chosen card, if any.
    #[must_use]
    pub fn first_card(&self) -> Option<EntityId> {
        match self {
            PromptAnswer::Cards(cards) => cards.first().copied(),
            _ => None,
        }
    }
}

/// Extra per-card check for select prompts.
pub type SelectPredicate = Arc<dyn Fn(&SelectorContext<'_>, EntityId) -> bool + Send + Sync>;

/// Choose cards.
#[derive(Clone)]
pub struct SelectSchema {
    pub title: String,
    /// Legal cards, evaluated with the source card as context.
    pub selector: CardSelector,
    pub predicate: Option<SelectPredicate>,
    pub min: usize,
    pub max: usize,
    /// Label of the skip option, if skipping is allowed.
    pub done_text: Option<String>,
    /// The card that issued the prompt.
    pub source: Option<EntityId>,
}

impl std::fmt::Debug for SelectSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectSchema")
            .field("title", &self.title)
            .field("selector", &self.selector)
            .field("predicate", &self.predicate.is_some())
            .field("min", &self.min)
            .field("max", &self.max)
            .field("done_text", &self.done_text)
            .field("source", &self.source)
            .finish()
    }
}

impl SelectSchema {
    /// Choose exactly one card matching `selector`.
    pub fn new(title: impl Into<String>, selector: CardSelector) -> Self {
        Self {
            title: title.into(),
            selector,
            predicate: None,
            min: 1,
            max: 1,
            done_text: None,
            source: None,
        }
    }

    /// Set the number of cards to choose (builder pattern).
    #[must_use]
    pub fn with_range(mut self, min: usize, max: usize) -> Self {
        self.min = min;
        self.max = max.max(min);
        self
    }

    /// Allow skipping (builder pattern).
    #[must_use]
    pub fn with_done(mut self, text: impl Into<String>) -> Self {
        self.done_text = Some(text.into());
        self
    }

    /// Set the issuing card (builder pattern).
    #[must_use]
    pub fn with_source(mut self, source: EntityId) -> Self {
        self.source = Some(source);
        self
    }

    /// Add a per-card predicate (builder pattern).
    #[must_use]
    pub fn with_predicate(
        mut self,
        predicate: impl Fn(&SelectorContext<'_>, EntityId) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.predicate = Some(Arc::new(predicate));
        self
    }

    /// Whether a card may be chosen right now.
    #[must_use]
    pub fn allows(&self, ctx: &SelectorContext<'_>, card: EntityId) -> bool {
        let ctx = ctx.with_this(self.source);
        self.selector.matches(&ctx, card)
            && self.predicate.as_ref().map_or(true, |predicate| predicate(&ctx, card))
    }

    /// All cards that may be chosen right now, in zone order.
    #[must_use]
    pub fn legal_cards(&self, ctx: &SelectorContext<'_>) -> Vec<EntityId> {
        ctx.state
            .zones
            .all_cards()
            .filter(|&card| self.allows(ctx, card))
            .collect()
    }
}

/// One menu button.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuButton {
    pub text: String,
    /// Card shown on the button.
    pub card: Option<EntityId>,
    /// Machine-readable value (icon names and the like).
    pub value: Option<String>,
}

impl MenuButton {
    /// A text button.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            card: None,
            value: None,
        }
    }

    /// A button showing a card.
    pub fn for_card(text: impl Into<String>, card: EntityId) -> Self {
        Self {
            card: Some(card),
            ..Self::new(text)
        }
    }

    /// Attach a value (builder pattern).
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

/// Choose one button.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuSchema {
    pub title: String,
    pub buttons: Vec<MenuButton>,
    pub done_text: Option<String>,
    /// Button picked when the prompt resolves by default and there is no
    /// done option.
    pub default_button: usize,
}

impl MenuSchema {
    /// An empty menu.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            buttons: Vec::new(),
            done_text: None,
            default_button: 0,
        }
    }

    /// Add a button (builder pattern).
    #[must_use]
    pub fn with_button(mut self, button: MenuButton) -> Self {
        self.buttons.push(button);
        self
    }

    /// Allow skipping (builder pattern).
    #[must_use]
    pub fn with_done(mut self, text: impl Into<String>) -> Self {
        self.done_text = Some(text.into());
        self
    }

    /// Set the default button (builder pattern).
    #[must_use]
    pub fn with_default(mut self, index: usize) -> Self {
        self.default_button = index;
        self
    }
}

/// What a prompt asks for.
#[derive(Clone, Debug)]
pub enum PromptKind {
    Select(SelectSchema),
    Menu(MenuSchema),
}

impl PromptKind {
    /// Title shown to the player.
    #[must_use]
    pub fn title(&self) -> &str {
        match self {
            PromptKind::Select(schema) => &schema.title,
            PromptKind::Menu(schema) => &schema.title,
        }
    }

    /// Check an answer against the schema and live state.
    pub fn validate(
        &self,
        answer: &PromptAnswer,
        ctx: &SelectorContext<'_>,
    ) -> Result<(), ResponseRejection> {
        match (self, answer) {
            (PromptKind::Select(schema), PromptAnswer::Done) => {
                schema.done_text.as_ref().map(|_| ()).ok_or(ResponseRejection::DoneNotAllowed)
            }
            (PromptKind::Select(schema), PromptAnswer::Cards(cards)) => {
                if cards.len() < schema.min {
                    return Err(ResponseRejection::TooFew {
                        min: schema.min,
                        got: cards.len(),
                    });
                }
                if cards.len() > schema.max {
                    return Err(ResponseRejection::TooMany {
                        max: schema.max,
                        got: cards.len(),
                    });
                }
                for (index, card) in cards.iter().enumerate() {
                    if cards[..index].contains(card) {
                        return Err(ResponseRejection::DuplicateCard);
                    }
                    if !schema.allows(ctx, *card) {
                        return Err(ResponseRejection::InvalidCard);
                    }
                }
                Ok(())
            }
            (PromptKind::Menu(schema), PromptAnswer::Button(index)) => {
                if *index < schema.buttons.len() {
                    Ok(())
                } else {
                    Err(ResponseRejection::NoSuchButton)
                }
            }
            (PromptKind::Menu(schema), PromptAnswer::Done) => {
                schema.done_text.as_ref().map(|_| ()).ok_or(ResponseRejection::DoneNotAllowed)
            }
            _ => Err(ResponseRejection::WrongKind),
        }
    }

    /// Answer used when the player cannot answer (disconnect, concede,
    /// timeout): skip where possible, otherwise the default button.
    #[must_use]
    pub fn default_answer(&self) -> PromptAnswer {
        match self {
            PromptKind::Select(_) => PromptAnswer::Done,
            PromptKind::Menu(schema) if schema.done_text.is_some() || schema.buttons.is_empty() => {
                PromptAnswer::Done
            }
            PromptKind::Menu(schema) => {
                PromptAnswer::Button(schema.default_button.min(schema.buttons.len() - 1))
            }
        }
    }
}

/// Client-facing description of a prompt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptView {
    pub id: PromptId,
    pub player: PlayerId,
    pub title: String,
    /// Window this prompt belongs to, for window (pass) prompts.
    pub window: Option<WindowId>,
    pub body: PromptBody,
}

/// Kind-specific part of a [`PromptView`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PromptBody {
    Select {
        legal: Vec<EntityId>,
        min: usize,
        max: usize,
        done_text: Option<String>,
    },
    Menu {
        buttons: Vec<MenuButton>,
        done_text: Option<String>,
    },
}

impl PromptBody {
    /// Render a prompt kind against live state.
    #[must_use]
    pub fn render(kind: &PromptKind, ctx: &SelectorContext<'_>) -> Self {
        match kind {
            PromptKind::Select(schema) => PromptBody::Select {
                legal: schema.legal_cards(ctx),
                min: schema.min,
                max: schema.max,
                done_text: schema.done_text.clone(),
            },
            PromptKind::Menu(schema) => PromptBody::Menu {
                buttons: schema.buttons.clone(),
                done_text: schema.done_text.clone(),
            },
        }
    }
}
