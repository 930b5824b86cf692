//! Player identification, roles, and the match roster.
//!
//! ## PlayerId
//!
//! Index into the roster. A 2-player match has ids 0 and 1, a 4-player
//! match 0 through 3. The chaser is always the last roster entry, matching
//! the seating order the classroom board uses.
//!
//! ## PlayerMap
//!
//! Per-player storage backed by a `Vec` for O(1) access by `PlayerId`.
//!
//! ## Roster
//!
//! The fixed cast of a match: which roles take part, where their pieces
//! stand, and whether a human or the AI drives them.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

use crate::board::{Cell, Grid};
use crate::core::error::MatchError;

/// Player identifier (0-based roster index).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// Create a new player ID.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Get the raw roster index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Iterate over all player IDs for a match with `player_count` players.
    ///
    /// ```
    /// use run_run_rabbit::core::PlayerId;
    ///
    /// let players: Vec<_> = PlayerId::all(3).collect();
    /// assert_eq!(players, vec![PlayerId::new(0), PlayerId::new(1), PlayerId::new(2)]);
    /// ```
    pub fn all(player_count: usize) -> impl Iterator<Item = PlayerId> {
        (0..player_count as u8).map(PlayerId)
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
/// use run_run_rabbit::core::{PlayerId, PlayerMap};
///
/// let mut scores: PlayerMap<u32> = PlayerMap::with_value(2, 0);
/// scores[PlayerId::new(1)] += 1;
/// assert_eq!(scores[PlayerId::new(1)], 1);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerMap<T> {
    data: Vec<T>,
}

impl<T> PlayerMap<T> {
    /// Create a new PlayerMap with values from a factory function.
    pub fn new(player_count: usize, factory: impl Fn(PlayerId) -> T) -> Self {
        assert!(player_count > 0, "Must have at least 1 player");

        let data = (0..player_count as u8).map(|i| factory(PlayerId(i))).collect();
        Self { data }
    }

    /// Create a new PlayerMap with all entries set to the same value.
    pub fn with_value(player_count: usize, value: T) -> Self
    where
        T: Clone,
    {
        Self::new(player_count, |_| value.clone())
    }

    /// Get the number of players.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.data.len()
    }

    /// Get a player's entry, if the id is in range.
    #[must_use]
    pub fn get(&self, player: PlayerId) -> Option<&T> {
        self.data.get(player.index())
    }

    /// Get a mutable entry, if the id is in range.
    pub fn get_mut(&mut self, player: PlayerId) -> Option<&mut T> {
        self.data.get_mut(player.index())
    }

    /// Iterate over (PlayerId, &T) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, &T)> {
        self.data.iter().enumerate().map(|(i, v)| (PlayerId(i as u8), v))
    }

    /// Reset every entry to the same value.
    pub fn fill(&mut self, value: T)
    where
        T: Clone,
    {
        for slot in &mut self.data {
            *slot = value.clone();
        }
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

/// Rabbit colour. Only used to tell evaders apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Coat {
    /// The single rabbit of a 2-player match.
    Plain,
    Red,
    Blue,
    Black,
}

/// What a piece is trying to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The wolf. Scores by landing on an evader.
    Chaser,
    /// A rabbit. Scores by reaching the safety zone or collecting a bonus.
    Evader(Coat),
}

impl Role {
    #[must_use]
    pub const fn is_chaser(self) -> bool {
        matches!(self, Role::Chaser)
    }

    #[must_use]
    pub const fn is_evader(self) -> bool {
        matches!(self, Role::Evader(_))
    }

    /// Display name used in messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Role::Chaser => "Wolf",
            Role::Evader(Coat::Plain) => "Rabbit",
            Role::Evader(Coat::Red) => "Red Rabbit",
            Role::Evader(Coat::Blue) => "Blue Rabbit",
            Role::Evader(Coat::Black) => "Black Rabbit",
        }
    }

    /// Roles taking part in a match of the given size, in seating order.
    ///
    /// Returns `None` for unsupported sizes.
    #[must_use]
    pub fn lineup(player_count: usize) -> Option<&'static [Role]> {
        const TWO: [Role; 2] = [Role::Evader(Coat::Plain), Role::Chaser];
        const THREE: [Role; 3] = [Role::Evader(Coat::Red), Role::Evader(Coat::Blue), Role::Chaser];
        const FOUR: [Role; 4] = [
            Role::Evader(Coat::Red),
            Role::Evader(Coat::Blue),
            Role::Evader(Coat::Black),
            Role::Chaser,
        ];
        match player_count {
            2 => Some(&TWO),
            3 => Some(&THREE),
            4 => Some(&FOUR),
            _ => None,
        }
    }

    /// Starting cell on a grid.
    #[must_use]
    pub fn start_cell(self, grid: &Grid) -> Cell {
        let last = grid.size() - 1;
        match self {
            Role::Chaser => Cell::new(last, last),
            Role::Evader(Coat::Plain | Coat::Blue) => Cell::new(0, 0),
            Role::Evader(Coat::Red) => Cell::new(last, 0),
            Role::Evader(Coat::Black) => Cell::new(0, last),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One seat at the table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub role: Role,
    pub position: Cell,
    pub is_human: bool,
}

/// The players of one match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    players: Vec<Player>,
}

impl Roster {
    /// Seat the lineup for `player_count` players on `grid`.
    ///
    /// Roles listed in `humans` are driven by clicks; everyone else is AI.
    pub fn seat(player_count: usize, humans: &[Role], grid: &Grid) -> Result<Self, MatchError> {
        let lineup = Role::lineup(player_count).ok_or_else(|| {
            MatchError::InvalidConfig(format!("player count must be 2-4, got {player_count}"))
        })?;

        let players = lineup
            .iter()
            .enumerate()
            .map(|(i, &role)| Player {
                id: PlayerId::new(i as u8),
                role,
                position: role.start_cell(grid),
                is_human: humans.contains(&role),
            })
            .collect();

        Ok(Self { players })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.players.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: PlayerId) -> bool {
        id.index() < self.players.len()
    }

    #[must_use]
    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id.index())
    }

    pub fn get_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(id.index())
    }

    /// Look a player up, failing with `UnknownPlayer`.
    pub fn require(&self, id: PlayerId) -> Result<&Player, MatchError> {
        self.get(id).ok_or(MatchError::UnknownPlayer(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.iter()
    }

    /// The chaser's id.
    #[must_use]
    pub fn chaser(&self) -> PlayerId {
        self.players
            .iter()
            .find(|p| p.role.is_chaser())
            .map_or(PlayerId::new(self.players.len().saturating_sub(1) as u8), |p| p.id)
    }

    /// Evaders in seating order.
    pub fn evaders(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.role.is_evader())
    }

    #[must_use]
    pub fn evader_count(&self) -> usize {
        self.evaders().count()
    }

    #[must_use]
    pub fn role(&self, id: PlayerId) -> Option<Role> {
        self.get(id).map(|p| p.role)
    }

    #[must_use]
    pub fn position(&self, id: PlayerId) -> Option<Cell> {
        self.get(id).map(|p| p.position)
    }

    #[must_use]
    pub fn is_human(&self, id: PlayerId) -> bool {
        self.get(id).is_some_and(|p| p.is_human)
    }

    #[must_use]
    pub fn has_human(&self) -> bool {
        self.players.iter().any(|p| p.is_human)
    }

    /// Move every piece back to its starting cell.
    pub fn reset_positions(&mut self, grid: &Grid) {
        for player in &mut self.players {
            player.position = player.role.start_cell(grid);
        }
    }

    /// Player standing on `cell`, if any.
    #[must_use]
    pub fn occupant(&self, cell: Cell) -> Option<PlayerId> {
        self.players.iter().find(|p| p.position == cell).map(|p| p.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_id_basics() {
        let p0 = PlayerId::new(0);
        assert_eq!(p0.index(), 0);
        assert_eq!(format!("{}", p0), "Player 0");
        assert_eq!(PlayerId::all(4).count(), 4);
    }

    #[test]
    fn test_player_map_access() {
        let mut map: PlayerMap<u32> = PlayerMap::new(3, |p| p.index() as u32 * 10);
        assert_eq!(map[PlayerId::new(2)], 20);
        map[PlayerId::new(0)] = 7;
        assert_eq!(map.get(PlayerId::new(0)), Some(&7));
        assert_eq!(map.get(PlayerId::new(9)), None);

        map.fill(1);
        assert!(map.iter().all(|(_, v)| *v == 1));
    }

    #[test]
    #[should_panic(expected = "Must have at least 1 player")]
    fn test_player_map_zero_players() {
        let _: PlayerMap<u32> = PlayerMap::with_value(0, 0);
    }

    #[test]
    fn test_lineups() {
        assert_eq!(Role::lineup(2).map(<[Role]>::len), Some(2));
        assert_eq!(Role::lineup(4).map(<[Role]>::len), Some(4));
        assert!(Role::lineup(1).is_none());
        assert!(Role::lineup(5).is_none());

        for count in 2..=4 {
            let lineup = Role::lineup(count).unwrap_or_default();
            assert_eq!(lineup.iter().filter(|r| r.is_chaser()).count(), 1);
            assert_eq!(lineup.last(), Some(&Role::Chaser));
        }
    }

    #[test]
    fn test_roster_seating() {
        let grid = Grid::new(8);
        let roster = Roster::seat(4, &[Role::Evader(Coat::Blue)], &grid).unwrap();

        assert_eq!(roster.len(), 4);
        assert_eq!(roster.chaser(), PlayerId::new(3));
        assert_eq!(roster.evader_count(), 3);
        assert_eq!(roster.position(PlayerId::new(3)), Some(Cell::new(7, 7)));
        assert_eq!(roster.position(PlayerId::new(0)), Some(Cell::new(7, 0)));
        assert_eq!(roster.position(PlayerId::new(2)), Some(Cell::new(0, 7)));
        assert!(roster.is_human(PlayerId::new(1)));
        assert!(!roster.is_human(PlayerId::new(0)));
        assert!(roster.has_human());
    }

    #[test]
    fn test_roster_rejects_bad_size() {
        let grid = Grid::new(8);
        assert!(matches!(
            Roster::seat(5, &[], &grid),
            Err(MatchError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_occupant_lookup() {
        let grid = Grid::new(8);
        let roster = Roster::seat(2, &[], &grid).unwrap();
        assert_eq!(roster.occupant(Cell::new(0, 0)), Some(PlayerId::new(0)));
        assert_eq!(roster.occupant(Cell::new(3, 3)), None);
    }
}
