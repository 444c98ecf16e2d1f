//! Prompt bookkeeping.
//!
//! The engine tracks every outstanding prompt and which one is active. It
//! does not own continuations: those travel with the prompt step on the
//! resolution pipeline, so a prompt and the code waiting for its answer can
//! never drift apart.
//!
//! ## Lifecycle
//!
//! `Queued` → `Active` → `Answered` → resolved (removed). Only the active
//! prompt accepts answers. Opening a nested prompt demotes the active one
//! back to `Queued`; it becomes active again once everything above it has
//! resolved. Ids are assigned in increasing order, so an issued id that is
//! no longer outstanding has resolved: a late second answer is reported as
//! `AlreadyResolved` rather than unknown, with nothing kept per prompt.

use rustc_hash::FxHashMap;
use tracing::debug;

use super::schema::{PromptAnswer, PromptBody, PromptId, PromptKind, PromptView};
use crate::core::{EngineError, EngineResult, PlayerId, ResponseRejection, WindowId};
use crate::effects::SelectorContext;

/// Where a prompt is in its lifecycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PromptStatus {
    Queued,
    Active,
    Answered(PromptAnswer),
}

/// An outstanding prompt.
#[derive(Clone, Debug)]
pub struct Prompt {
    pub id: PromptId,
    pub player: PlayerId,
    pub kind: PromptKind,
    /// Set for action-window prompts.
    pub window: Option<WindowId>,
    pub status: PromptStatus,
}

impl Prompt {
    /// Client-facing view rendered against live state.
    #[must_use]
    pub fn view(&self, ctx: &SelectorContext<'_>) -> PromptView {
        PromptView {
            id: self.id,
            player: self.player,
            title: self.kind.title().to_string(),
            window: self.window,
            body: PromptBody::render(&self.kind, ctx),
        }
    }
}

/// Outstanding prompts of one match.
#[derive(Clone, Debug, Default)]
pub struct PromptEngine {
    prompts: FxHashMap<PromptId, Prompt>,
    active: Option<PromptId>,
    next_id: u32,
}

impl PromptEngine {
    /// Create an empty engine.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new prompt. It stays queued until its step activates it.
    pub fn open(&mut self, player: PlayerId, kind: PromptKind, window: Option<WindowId>) -> PromptId {
        self.next_id += 1;
        let id = PromptId(self.next_id);
        debug!(prompt = %id, player = %player, title = kind.title(), "prompt opened");
        self.prompts.insert(
            id,
            Prompt {
                id,
                player,
                kind,
                window,
                status: PromptStatus::Queued,
            },
        );
        id
    }

    /// Make a prompt the active one, demoting the previous active prompt.
    pub fn activate(&mut self, id: PromptId) -> EngineResult<&Prompt> {
        if let Some(previous) = self.active.filter(|&previous| previous != id) {
            if let Some(prompt) = self.prompts.get_mut(&previous) {
                if prompt.status == PromptStatus::Active {
                    prompt.status = PromptStatus::Queued;
                }
            }
        }
        let prompt = self
            .prompts
            .get_mut(&id)
            .ok_or_else(|| EngineError::invariant(format!("activating unknown {id}")))?;
        if prompt.status == PromptStatus::Queued {
            prompt.status = PromptStatus::Active;
        }
        self.active = Some(id);
        Ok(&*prompt)
    }

    /// Validate and record an answer. The prompt stays outstanding on error.
    pub fn submit(
        &mut self,
        id: PromptId,
        player: PlayerId,
        answer: PromptAnswer,
        ctx: &SelectorContext<'_>,
    ) -> Result<(), ResponseRejection> {
        let Some(prompt) = self.prompts.get_mut(&id) else {
            return Err(if self.is_resolved(id) {
                ResponseRejection::AlreadyResolved
            } else {
                ResponseRejection::UnknownPrompt
            });
        };
        if prompt.player != player {
            return Err(ResponseRejection::NotOwner);
        }
        match prompt.status {
            PromptStatus::Answered(_) => return Err(ResponseRejection::AlreadyResolved),
            PromptStatus::Queued => return Err(ResponseRejection::NotActive),
            PromptStatus::Active => {}
        }
        prompt.kind.validate(&answer, ctx)?;
        prompt.status = PromptStatus::Answered(answer);
        Ok(())
    }

    /// Answer a prompt with its default, bypassing validation.
    pub fn answer_default(&mut self, id: PromptId) -> Option<PromptAnswer> {
        let prompt = self.prompts.get_mut(&id)?;
        if let PromptStatus::Answered(answer) = &prompt.status {
            return Some(answer.clone());
        }
        let answer = prompt.kind.default_answer();
        debug!(prompt = %id, player = %prompt.player, ?answer, "prompt resolved by default");
        prompt.status = PromptStatus::Answered(answer.clone());
        Some(answer)
    }

    /// Remove an answered prompt and hand back its answer.
    pub fn take_answer(&mut self, id: PromptId) -> Option<PromptAnswer> {
        let answered = matches!(
            self.prompts.get(&id).map(|p| &p.status),
            Some(PromptStatus::Answered(_))
        );
        if !answered {
            return None;
        }
        let prompt = self.prompts.remove(&id)?;
        if self.active == Some(id) {
            self.active = None;
        }
        match prompt.status {
            PromptStatus::Answered(answer) => Some(answer),
            _ => None,
        }
    }

    /// Drop a prompt whose resolution was abandoned.
    pub fn discard(&mut self, id: PromptId) -> bool {
        if self.prompts.remove(&id).is_none() {
            return false;
        }
        if self.active == Some(id) {
            self.active = None;
        }
        true
    }

    /// Get a prompt.
    #[must_use]
    pub fn get(&self, id: PromptId) -> Option<&Prompt> {
        self.prompts.get(&id)
    }

    /// The prompt currently accepting answers.
    #[must_use]
    pub fn active(&self) -> Option<&Prompt> {
        self.active
            .and_then(|id| self.prompts.get(&id))
            .filter(|p| p.status == PromptStatus::Active)
    }

    /// Whether a prompt was answered and resolved.
    #[must_use]
    pub fn is_resolved(&self, id: PromptId) -> bool {
        id.0 != 0 && id.0 <= self.next_id && !self.prompts.contains_key(&id)
    }

    /// Outstanding prompts of a player, oldest first.
    #[must_use]
    pub fn pending_for(&self, player: PlayerId) -> Vec<PromptId> {
        let mut ids: Vec<_> = self
            .prompts
            .values()
            .filter(|p| p.player == player)
            .map(|p| p.id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Number of outstanding prompts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    /// Whether no prompt is outstanding.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }

    /// Drop every outstanding prompt.
    pub fn clear(&mut self) {
        self.prompts.clear();
        self.active = None;
    }
}
