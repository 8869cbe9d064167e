//! # Game Module
//!
//! Runtime side of the dungeon: the room graph the game loop queries, rooms
//! and their lifecycle hooks, and the run state that wraps a dungeon.
//!
//! - Grid coordinates and cardinal directions
//! - Rooms, doors, tiles and roles
//! - The dungeon query/move API
//! - Run state and statistics

pub mod room;
pub mod state;
pub mod world;

pub use room::*;
pub use state::*;
pub use world::*;

use serde::{Deserialize, Serialize};

/// A cell in the dungeon's room grid.
///
/// Grid positions are the identity of rooms: no two rooms share one.
///
/// # Examples
///
/// ```
/// use undercroft::{Direction, GridPos};
///
/// let pos = GridPos::new(3, 3);
/// assert_eq!(pos.offset(Direction::North), GridPos::new(3, 2));
/// assert!(pos.in_bounds(7, 7));
/// assert!(!GridPos::new(7, 0).in_bounds(7, 7));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    /// Creates a new grid position.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Center cell of a `width x height` grid.
    pub fn center_of(width: i32, height: i32) -> Self {
        Self::new(width / 2, height / 2)
    }

    /// The neighboring cell one step in `direction`.
    pub fn offset(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self::new(self.x + dx, self.y + dy)
    }

    /// Whether this cell lies inside a `width x height` grid.
    pub fn in_bounds(self, width: i32, height: i32) -> bool {
        self.x >= 0 && self.y >= 0 && self.x < width && self.y < height
    }

    /// The four cardinal neighbors, in [`Direction::ALL`] order.
    pub fn neighbors(self) -> [GridPos; 4] {
        Direction::ALL.map(|direction| self.offset(direction))
    }

    /// Direction from this cell to an orthogonally adjacent one.
    pub fn direction_to(self, other: GridPos) -> Option<Direction> {
        Direction::ALL
            .into_iter()
            .find(|&direction| self.offset(direction) == other)
    }

    /// Manhattan distance in grid cells.
    pub fn manhattan_distance(self, other: GridPos) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl std::fmt::Display for GridPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Cardinal directions between rooms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// All four directions in a fixed order.
    ///
    /// The order matters: shuffles and neighbor scans start from it, so it is
    /// part of the seed-determinism contract.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Converts a direction to a grid delta. North is `-y`.
    ///
    /// # Examples
    ///
    /// ```
    /// use undercroft::Direction;
    ///
    /// assert_eq!(Direction::North.delta(), (0, -1));
    /// assert_eq!(Direction::East.delta(), (1, 0));
    /// ```
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
        }
    }

    /// The reverse direction.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    /// Short lowercase name used by the CLI.
    pub fn name(self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::East => "east",
            Direction::South => "south",
            Direction::West => "west",
        }
    }
}
