//! # Generation Module
//!
//! Procedural dungeon layout generation and entity population.
//!
//! Levels are generated once per depth with a room-and-corridor algorithm:
//! random rectangle sampling with margin-based rejection, then L-shaped
//! corridors carved between consecutively placed rooms. The resulting chain
//! connects each room to its placement-order neighbors but deliberately does
//! not guarantee full graph connectivity; downstream consumers (AI explore
//! and pathfinding) tolerate unreachable regions.

pub mod dungeon;

pub use dungeon::*;

use crate::game::Position;

/// Static definition of an enemy archetype.
#[derive(Debug, Clone, Copy)]
pub struct EnemyDef {
    pub glyph: char,
    pub name: &'static str,
    pub color: &'static str,
    pub hp: i32,
}

/// Static definition of an item archetype.
#[derive(Debug, Clone, Copy)]
pub struct ItemDef {
    pub glyph: char,
    pub name: &'static str,
    pub color: &'static str,
}

/// The enemy roster levels draw from; hp scales with depth at spawn time.
pub const DEFAULT_ENEMIES: [EnemyDef; 8] = [
    EnemyDef { glyph: 'g', name: "Goblin", color: "text-enemy", hp: 8 },
    EnemyDef { glyph: 'o', name: "Orc", color: "text-enemy", hp: 12 },
    EnemyDef { glyph: 'T', name: "Troll", color: "text-enemy", hp: 18 },
    EnemyDef { glyph: 'D', name: "Dragon", color: "text-enemy", hp: 30 },
    EnemyDef { glyph: 'r', name: "Rat", color: "text-enemy", hp: 4 },
    EnemyDef { glyph: 'S', name: "Skeleton", color: "text-enemy", hp: 10 },
    EnemyDef { glyph: 'Z', name: "Zombie", color: "text-enemy", hp: 14 },
    EnemyDef { glyph: 'w', name: "Wolf", color: "text-enemy", hp: 6 },
];

/// The item roster; only the Health Potion has a mechanical effect.
pub const DEFAULT_ITEMS: [ItemDef; 7] = [
    ItemDef { glyph: '!', name: "Health Potion", color: "text-item" },
    ItemDef { glyph: '?', name: "Magic Scroll", color: "text-item" },
    ItemDef { glyph: '$', name: "Gold", color: "text-player" },
    ItemDef { glyph: ')', name: "Sword", color: "text-secondary" },
    ItemDef { glyph: '[', name: "Shield", color: "text-secondary" },
    ItemDef { glyph: '/', name: "Wand", color: "text-item" },
    ItemDef { glyph: '%', name: "Food", color: "text-item" },
];

/// A rectangular room placed during generation.
///
/// # Examples
///
/// ```
/// use delved::{Position, Room};
///
/// let room = Room::new(Position::new(5, 5), 10, 8);
/// assert_eq!(room.center(), Position::new(10, 9));
/// assert!(room.near_overlaps(&Room::new(Position::new(14, 10), 6, 6)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Room {
    /// Top-left corner of the room.
    pub top_left: Position,
    pub width: i32,
    pub height: i32,
}

impl Room {
    /// Creates a new room with the given geometry.
    pub fn new(top_left: Position, width: i32, height: i32) -> Self {
        Self {
            top_left,
            width,
            height,
        }
    }

    /// Gets the center position of the room.
    pub fn center(&self) -> Position {
        Position::new(
            self.top_left.x + self.width / 2,
            self.top_left.y + self.height / 2,
        )
    }

    /// Checks whether this room comes within a 1-tile margin of another.
    ///
    /// Candidates that near-overlap an existing room are rejected so rooms
    /// always keep at least one wall tile between them.
    pub fn near_overlaps(&self, other: &Room) -> bool {
        self.top_left.x <= other.top_left.x + other.width + 1
            && self.top_left.x + self.width + 1 >= other.top_left.x
            && self.top_left.y <= other.top_left.y + other.height + 1
            && self.top_left.y + self.height + 1 >= other.top_left.y
    }

    /// Gets all floor positions covered by this room.
    pub fn floor_positions(&self) -> Vec<Position> {
        let mut positions = Vec::new();
        for y in self.top_left.y..self.top_left.y + self.height {
            for x in self.top_left.x..self.top_left.x + self.width {
                positions.push(Position::new(x, y));
            }
        }
        positions
    }
}
