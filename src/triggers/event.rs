//! Game event types.
//!
//! Events represent things that happen during a match. Each logical
//! occurrence is one `GameEvent` with one `EventId`; the event window that
//! resolves it shares the same `Arc<GameEvent>` with every handler, so all
//! of them observe the same payload.
//!
//! The engine raises the event types in [`events`] itself. Content may
//! define more with ids from [`events::FIRST_CUSTOM`] upwards.

use serde::{Deserialize, Serialize};

use crate::core::{EntityId, PlayerId, ZoneId};

/// Event type identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventTypeId(pub u32);

impl EventTypeId {
    /// Create a new event type ID.
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

impl std::fmt::Display for EventTypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EventType({})", self.0)
    }
}

/// Event types raised by the engine.
pub mod events {
    use super::EventTypeId;

    /// `target` is entering play. `player` is its controller, `zones` = [from, to],
    /// tagged with the playing type. Cancelable.
    pub const CARD_ENTERS_PLAY: EventTypeId = EventTypeId::new(1);
    /// `target` left play. `zones` = [from, to].
    pub const CARD_LEFT_PLAY: EventTypeId = EventTypeId::new(2);
    pub const CARD_KNEELED: EventTypeId = EventTypeId::new(3);
    pub const CARD_STOOD: EventTypeId = EventTypeId::new(4);
    /// `target` discarded from hand.
    pub const CARD_DISCARDED: EventTypeId = EventTypeId::new(5);
    /// `player` draws `values[0]` cards.
    pub const CARDS_DRAWN: EventTypeId = EventTypeId::new(6);
    /// `target` changes control from `other_player` to `player`.
    pub const CONTROL_CHANGED: EventTypeId = EventTypeId::new(7);
    /// `values[0]` = phase id.
    pub const PHASE_STARTED: EventTypeId = EventTypeId::new(8);
    pub const PHASE_ENDED: EventTypeId = EventTypeId::new(9);
    /// `values[0]` = round number.
    pub const ROUND_ENDED: EventTypeId = EventTypeId::new(10);
    /// A challenge was decided. `player` won, `other_player` lost,
    /// `others` are the participating cards, the tag is the challenge type.
    pub const AFTER_CHALLENGE: EventTypeId = EventTypeId::new(11);

    /// First id free for content-defined events.
    pub const FIRST_CUSTOM: u32 = 1000;
}

/// Tags carried by enters-play events.
pub mod playing_types {
    /// Played from hand during the marshaling phase.
    pub const MARSHAL: &str = "marshal";
    /// Put into play by an effect.
    pub const PUT: &str = "put";
}

/// Identity of one event occurrence. 0 means "not yet raised".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventId(pub u64);

impl EventId {
    /// Whether the id was assigned by the engine.
    #[must_use]
    pub fn is_assigned(self) -> bool {
        self.0 != 0
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Event#{}", self.0)
    }
}

/// A game event with contextual data.
///
/// ## Event Data
///
/// - `source`: the card that caused the event (if any)
/// - `target`: the card affected by the event (if any)
/// - `player` / `other_player`: players involved (meaning per event type)
/// - `others`: further cards involved
/// - `values`, `zones`, `tags`: event-type specific detail
/// - `cancelable`: whether interrupts may cancel the default effect
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    pub id: EventId,
    pub event_type: EventTypeId,
    pub source: Option<EntityId>,
    pub target: Option<EntityId>,
    pub player: Option<PlayerId>,
    pub other_player: Option<PlayerId>,
    pub others: Vec<EntityId>,
    pub values: Vec<i64>,
    pub zones: Vec<ZoneId>,
    pub tags: Vec<String>,
    pub cancelable: bool,
}

impl GameEvent {
    /// Create a new event with just a type.
    pub fn new(event_type: EventTypeId) -> Self {
        Self {
            id: EventId::default(),
            event_type,
            source: None,
            target: None,
            player: None,
            other_player: None,
            others: Vec::new(),
            values: Vec::new(),
            zones: Vec::new(),
            tags: Vec::new(),
            cancelable: false,
        }
    }

    /// Create a player-centric event (like a draw).
    pub fn for_player(event_type: EventTypeId, player: PlayerId) -> Self {
        Self::new(event_type).with_player(player)
    }

    /// Create a card-centric event (like a kneel).
    pub fn for_card(event_type: EventTypeId, card: EntityId, controller: PlayerId) -> Self {
        Self::new(event_type).with_target(card).with_player(controller)
    }

    /// Set the id (builder pattern). Normally assigned when raised.
    #[must_use]
    pub fn with_id(mut self, id: EventId) -> Self {
        self.id = id;
        self
    }

    /// Set the source entity (builder pattern).
    #[must_use]
    pub fn with_source(mut self, source: EntityId) -> Self {
        self.source = Some(source);
        self
    }

    /// Set the target entity (builder pattern).
    #[must_use]
    pub fn with_target(mut self, target: EntityId) -> Self {
        self.target = Some(target);
        self
    }

    /// Set the associated player (builder pattern).
    #[must_use]
    pub fn with_player(mut self, player: PlayerId) -> Self {
        self.player = Some(player);
        self
    }

    /// Set the second player (builder pattern).
    #[must_use]
    pub fn with_other_player(mut self, player: PlayerId) -> Self {
        self.other_player = Some(player);
        self
    }

    /// Add another entity (builder pattern).
    #[must_use]
    pub fn with_entity(mut self, entity: EntityId) -> Self {
        self.others.push(entity);
        self
    }

    /// Add a numeric value (builder pattern).
    #[must_use]
    pub fn with_value(mut self, value: i64) -> Self {
        self.values.push(value);
        self
    }

    /// Add zone information (builder pattern).
    #[must_use]
    pub fn with_zone(mut self, zone: ZoneId) -> Self {
        self.zones.push(zone);
        self
    }

    /// Add a tag (builder pattern).
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Let interrupts cancel this event (builder pattern).
    #[must_use]
    pub fn cancelable(mut self) -> Self {
        self.cancelable = true;
        self
    }

    /// Get a value, or a default.
    #[must_use]
    pub fn value(&self, index: usize, default: i64) -> i64 {
        self.values.get(index).copied().unwrap_or(default)
    }

    /// Get a zone, or None.
    #[must_use]
    pub fn zone(&self, index: usize) -> Option<ZoneId> {
        self.zones.get(index).copied()
    }

    /// Check if event has a specific tag.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Whether `card` is the target, source, or among the other cards.
    #[must_use]
    pub fn involves(&self, card: EntityId) -> bool {
        self.target == Some(card) || self.source == Some(card) || self.others.contains(&card)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_id() {
        let id = EventTypeId::new(5);
        assert_eq!(id.raw(), 5);
        assert_eq!(format!("{}", id), "EventType(5)");
    }

    #[test]
    fn test_game_event_builder() {
        let event = GameEvent::new(events::AFTER_CHALLENGE)
            .with_player(PlayerId::new(0))
            .with_other_player(PlayerId::new(1))
            .with_entity(EntityId(10))
            .with_value(5)
            .with_zone(ZoneId::new(0))
            .with_tag("military");

        assert_eq!(event.player, Some(PlayerId::new(0)));
        assert_eq!(event.other_player, Some(PlayerId::new(1)));
        assert_eq!(event.value(0, 0), 5);
        assert_eq!(event.value(1, -1), -1);
        assert_eq!(event.zone(0), Some(ZoneId::new(0)));
        assert!(event.has_tag("military"));
        assert!(event.involves(EntityId(10)));
        assert!(!event.involves(EntityId(11)));
        assert!(!event.cancelable);
        assert!(!event.id.is_assigned());
    }

    #[test]
    fn test_card_event() {
        let event = GameEvent::for_card(events::CARD_KNEELED, EntityId(15), PlayerId::new(1))
            .cancelable();

        assert_eq!(event.target, Some(EntityId(15)));
        assert_eq!(event.player, Some(PlayerId::new(1)));
        assert!(event.cancelable);
    }

    #[test]
    fn test_event_serialization() {
        let event = GameEvent::for_card(events::CARD_ENTERS_PLAY, EntityId(10), PlayerId::new(0))
            .with_tag(playing_types::MARSHAL)
            .with_id(EventId(3));
        let json = serde_json::to_string(&event).unwrap();
        let deserialized: GameEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, deserialized);
    }
}
