//! Player identification, seat order, and per-player storage.
//!
//! ## PlayerId
//!
//! Seat index of a player, 0-based. Seat order drives APNAP precedence:
//! the active (first) player acts first, then the remaining players in seat
//! order starting after the active player.
//!
//! ## PlayerMap
//!
//! Per-player data backed by a `Vec` with O(1) access by `PlayerId`.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// Seat index of a player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// Create a new player ID.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Get the raw seat index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Iterate over all seats of a match with `player_count` players.
    pub fn all(player_count: usize) -> impl Iterator<Item = PlayerId> {
        (0..player_count as u8).map(PlayerId)
    }

    /// Seats in APNAP order: the active player, then everyone else in
    /// seat order wrapping around the table.
    ///
    /// ```
    /// use ccg_resolver::core::PlayerId;
    ///
    /// let order: Vec<_> = PlayerId::apnap(PlayerId::new(2), 4).collect();
    /// assert_eq!(order, vec![
    ///     PlayerId::new(2), PlayerId::new(3), PlayerId::new(0), PlayerId::new(1),
    /// ]);
    /// ```
    pub fn apnap(active: PlayerId, player_count: usize) -> impl Iterator<Item = PlayerId> {
        let start = active.index();
        (0..player_count).map(move |offset| PlayerId(((start + offset) % player_count) as u8))
    }

    /// Position of this player in APNAP order (0 = active player).
    #[must_use]
    pub fn apnap_rank(self, active: PlayerId, player_count: usize) -> usize {
        (self.index() + player_count - active.index() % player_count) % player_count
    }

    /// The next seat clockwise from this one.
    #[must_use]
    pub fn next_seat(self, player_count: usize) -> PlayerId {
        PlayerId(((self.index() + 1) % player_count) as u8)
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {}", self.0)
    }
}

/// Per-player data storage with O(1) access.
///
/// ```
/// use ccg_resolver::core::{PlayerId, PlayerMap};
///
/// let mut power: PlayerMap<i64> = PlayerMap::with_value(2, 0);
/// power[PlayerId::new(1)] += 3;
/// assert_eq!(power[PlayerId::new(1)], 3);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerMap<T> {
    data: Vec<T>,
}

impl<T> PlayerMap<T> {
    /// Create a new PlayerMap with values from a factory function.
    pub fn new(player_count: usize, factory: impl Fn(PlayerId) -> T) -> Self {
        assert!(player_count > 0, "Must have at least 1 player");
        assert!(player_count <= 255, "At most 255 players supported");

        let data = (0..player_count as u8)
            .map(|i| factory(PlayerId(i)))
            .collect();

        Self { data }
    }

    /// Create a new PlayerMap with all entries set to the same value.
    pub fn with_value(player_count: usize, value: T) -> Self
    where
        T: Clone,
    {
        Self::new(player_count, |_| value.clone())
    }

    /// Create a new PlayerMap with default values.
    pub fn with_default(player_count: usize) -> Self
    where
        T: Default,
    {
        Self::new(player_count, |_| T::default())
    }

    /// Build from one value per seat. Returns `None` for an empty list.
    pub fn from_vec(data: Vec<T>) -> Option<Self> {
        if data.is_empty() || data.len() > 255 {
            return None;
        }
        Some(Self { data })
    }

    /// Get the number of players.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.data.len()
    }

    /// Get a reference to a player's data, or `None` for an unknown seat.
    #[must_use]
    pub fn get(&self, player: PlayerId) -> Option<&T> {
        self.data.get(player.index())
    }

    /// Get a mutable reference to a player's data.
    pub fn get_mut(&mut self, player: PlayerId) -> Option<&mut T> {
        self.data.get_mut(player.index())
    }

    /// Whether `player` is a seat of this map.
    #[must_use]
    pub fn contains(&self, player: PlayerId) -> bool {
        player.index() < self.data.len()
    }

    /// Iterate over (PlayerId, &T) pairs in seat order.
    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, &T)> {
        self.data
            .iter()
            .enumerate()
            .map(|(i, v)| (PlayerId(i as u8), v))
    }

    /// Iterate over all player IDs.
    pub fn player_ids(&self) -> impl Iterator<Item = PlayerId> {
        (0..self.data.len() as u8).map(PlayerId)
    }
}

impl<T> Index<PlayerId> for PlayerMap<T> {
    type Output = T;

    fn index(&self, player: PlayerId) -> &Self::Output {
        &self.data[player.index()]
    }
}

impl<T> IndexMut<PlayerId> for PlayerMap<T> {
    fn index_mut(&mut self, player: PlayerId) -> &mut Self::Output {
        &mut self.data[player.index()]
    }
}
