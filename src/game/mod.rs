//! # Game Module
//!
//! Core game-world state: levels, players, visibility, movement, and combat.
//!
//! This module contains the fundamental building blocks of the Delved world:
//! - Dungeon levels owning their tile grids and entity collections
//! - Player state with per-depth exploration memory and run statistics
//! - The raycast field-of-view approximation
//! - The authoritative [`GameWorld`] store and its operations

pub mod fov;
pub mod level;
pub mod player;
pub mod world;

pub use fov::*;
pub use level::*;
pub use player::*;
pub use world::*;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for players (human and AI alike).
pub type PlayerId = Uuid;

/// Unique identifier for level-owned entities.
pub type EntityId = Uuid;

/// Represents a 2D coordinate in the game world.
///
/// # Examples
///
/// ```
/// use delved::Position;
///
/// let pos = Position::new(10, 5);
/// assert_eq!(pos.x, 10);
/// assert_eq!(pos.y, 5);
/// assert_eq!(pos.manhattan_distance(Position::new(13, 9)), 7);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Creates a new position with the given coordinates.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Calculates the Manhattan distance to another position.
    pub fn manhattan_distance(self, other: Position) -> u32 {
        ((self.x - other.x).abs() + (self.y - other.y).abs()) as u32
    }

    /// Calculates the Chebyshev distance to another position.
    ///
    /// Two positions are 8-neighbors exactly when this is 1.
    pub fn chebyshev_distance(self, other: Position) -> u32 {
        (self.x - other.x).abs().max((self.y - other.y).abs()) as u32
    }

    /// Returns all 8 adjacent positions (including diagonals).
    pub fn adjacent_positions(self) -> Vec<Position> {
        vec![
            Position::new(self.x - 1, self.y - 1),
            Position::new(self.x, self.y - 1),
            Position::new(self.x + 1, self.y - 1),
            Position::new(self.x - 1, self.y),
            Position::new(self.x + 1, self.y),
            Position::new(self.x - 1, self.y + 1),
            Position::new(self.x, self.y + 1),
            Position::new(self.x + 1, self.y + 1),
        ]
    }

    /// Returns the unit delta pointing from `self` toward `other`.
    pub fn step_toward(self, other: Position) -> (i32, i32) {
        ((other.x - self.x).signum(), (other.y - self.y).signum())
    }

    /// Checks whether this position lies inside the fixed map bounds.
    pub fn in_bounds(self) -> bool {
        self.x >= 0
            && self.x < crate::config::MAP_WIDTH
            && self.y >= 0
            && self.y < crate::config::MAP_HEIGHT
    }
}

impl std::ops::Add for Position {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl std::ops::Sub for Position {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_creation() {
        let pos = Position::new(5, 10);
        assert_eq!(pos.x, 5);
        assert_eq!(pos.y, 10);
    }

    #[test]
    fn test_position_manhattan_distance() {
        let pos1 = Position::new(0, 0);
        let pos2 = Position::new(3, 4);
        assert_eq!(pos1.manhattan_distance(pos2), 7);
    }

    #[test]
    fn test_position_chebyshev_distance() {
        let pos = Position::new(5, 5);
        assert_eq!(pos.chebyshev_distance(Position::new(6, 4)), 1);
        assert_eq!(pos.chebyshev_distance(Position::new(8, 6)), 3);
    }

    #[test]
    fn test_position_adjacent() {
        let pos = Position::new(5, 5);
        let adjacent = pos.adjacent_positions();
        assert_eq!(adjacent.len(), 8);
        assert!(adjacent.contains(&Position::new(4, 4)));
        assert!(adjacent.contains(&Position::new(6, 6)));
        assert!(!adjacent.contains(&pos));
    }

    #[test]
    fn test_step_toward() {
        let from = Position::new(5, 5);
        assert_eq!(from.step_toward(Position::new(9, 5)), (1, 0));
        assert_eq!(from.step_toward(Position::new(2, 8)), (-1, 1));
        assert_eq!(from.step_toward(from), (0, 0));
    }

    #[test]
    fn test_in_bounds() {
        assert!(Position::new(0, 0).in_bounds());
        assert!(Position::new(79, 39).in_bounds());
        assert!(!Position::new(80, 0).in_bounds());
        assert!(!Position::new(0, -1).in_bounds());
    }
}
