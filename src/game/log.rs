//! Human-readable game log.
//!
//! Cards write lines such as `"{0} uses {1} to look at {2}'s hand"`; each
//! `{n}` placeholder is filled from the argument list with player names and
//! card names at the time the line is written. The log is presentation only:
//! nothing in the engine reads it back.

use serde::{Deserialize, Serialize};

use super::{Match, Outbound};
use crate::core::{EntityId, PlayerId};

/// One placeholder value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogArg {
    Player(PlayerId),
    Card(EntityId),
    Text(String),
    Number(i64),
}

impl From<PlayerId> for LogArg {
    fn from(player: PlayerId) -> Self {
        LogArg::Player(player)
    }
}

impl From<EntityId> for LogArg {
    fn from(card: EntityId) -> Self {
        LogArg::Card(card)
    }
}

impl From<&str> for LogArg {
    fn from(text: &str) -> Self {
        LogArg::Text(text.to_string())
    }
}

impl From<String> for LogArg {
    fn from(text: String) -> Self {
        LogArg::Text(text)
    }
}

impl From<i64> for LogArg {
    fn from(value: i64) -> Self {
        LogArg::Number(value)
    }
}

/// A rendered log line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogMessage {
    pub round: u32,
    pub text: String,
    pub args: Vec<LogArg>,
}

/// Replace `{n}` placeholders using `name`. Unknown indexes and malformed
/// placeholders are copied through unchanged.
pub fn render(template: &str, args: &[LogArg], name: impl Fn(&LogArg) -> String) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let arg = after.find('}').and_then(|close| {
            let index: usize = after[..close].parse().ok()?;
            args.get(index).map(|arg| (close, arg))
        });
        match arg {
            Some((close, arg)) => {
                out.push_str(&name(arg));
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

impl Match {
    /// Append a line to the game log and send it to every player.
    pub fn add_message(&mut self, template: &str, args: &[LogArg]) {
        let text = render(template, args, |arg| self.display_name(arg));
        let message = LogMessage {
            round: self.state.public.round,
            text,
            args: args.to_vec(),
        };
        self.log.push_back(message.clone());
        self.emit(Outbound::Message(message));
    }

    fn display_name(&self, arg: &LogArg) -> String {
        match arg {
            LogArg::Player(player) => self.config.settings_for(*player).name,
            LogArg::Card(card) => self
                .state
                .card(*card)
                .and_then(|instance| self.cards.get(instance.card_id))
                .map_or_else(|| card.to_string(), |definition| definition.name.clone()),
            LogArg::Text(text) => text.clone(),
            LogArg::Number(value) => value.to_string(),
        }
    }

    /// The game log so far.
    pub fn log(&self) -> impl Iterator<Item = &LogMessage> {
        self.log.iter()
    }
}
