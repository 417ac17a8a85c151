//! # Dungeon Level
//!
//! One depth's tile grid and entity population.
//!
//! A [`DungeonLevel`] exclusively owns its tiles and entities. Tiles are
//! immutable once generation finishes; entities are removed on enemy death or
//! item pickup, while stairs entities persist for the level's lifetime.

use crate::config::{MAP_HEIGHT, MAP_WIDTH};
use crate::game::{EntityId, Position};
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A single map cell. Immutable once a level has been generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    /// Display character sent to clients.
    #[serde(rename = "char")]
    pub glyph: char,
    /// Whether players and entities can occupy this cell.
    pub walkable: bool,
    /// Whether stepping here descends to the next depth.
    pub stairs: bool,
}

impl Tile {
    /// A solid wall cell.
    pub fn wall() -> Self {
        Self {
            glyph: '#',
            walkable: false,
            stairs: false,
        }
    }

    /// An open floor cell.
    pub fn floor() -> Self {
        Self {
            glyph: '.',
            walkable: true,
            stairs: false,
        }
    }

    /// The stairs-down cell; walkable and flagged.
    pub fn stairs_down() -> Self {
        Self {
            glyph: '>',
            walkable: true,
            stairs: true,
        }
    }
}

/// The three kinds of level-owned entities.
///
/// Movement resolution matches on this exhaustively; there is deliberately no
/// open-ended hierarchy here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Enemy,
    Item,
    StairsDown,
}

/// A level-owned game object: an enemy, an item, or the stairs marker.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub id: EntityId,
    #[serde(rename = "type")]
    pub kind: EntityKind,
    pub pos: Position,
    #[serde(rename = "char")]
    pub glyph: char,
    pub color: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hp: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_hp: Option<i32>,
}

/// One depth of the dungeon: a fixed-size tile grid plus its entities.
///
/// Levels are created lazily on first visit to a depth and retained for the
/// lifetime of the process.
#[derive(Debug, Clone)]
pub struct DungeonLevel {
    pub depth: u32,
    pub tiles: Vec<Vec<Tile>>,
    pub entities: Vec<Entity>,
}

impl DungeonLevel {
    /// Creates an all-wall level with no entities.
    ///
    /// Used as the canvas for generation and directly by tests that carve
    /// their own layouts.
    pub fn blank(depth: u32) -> Self {
        let tiles =
            vec![vec![Tile::wall(); MAP_WIDTH as usize]; MAP_HEIGHT as usize];
        Self {
            depth,
            tiles,
            entities: Vec::new(),
        }
    }

    /// Gets the tile at a position, if it is in bounds.
    pub fn tile(&self, pos: Position) -> Option<&Tile> {
        if pos.in_bounds() {
            Some(&self.tiles[pos.y as usize][pos.x as usize])
        } else {
            None
        }
    }

    /// Replaces the tile at an in-bounds position. No-op out of bounds.
    pub fn set_tile(&mut self, pos: Position, tile: Tile) {
        if pos.in_bounds() {
            self.tiles[pos.y as usize][pos.x as usize] = tile;
        }
    }

    /// Whether the cell at `pos` is in bounds and walkable.
    pub fn is_walkable(&self, pos: Position) -> bool {
        self.tile(pos).map(|t| t.walkable).unwrap_or(false)
    }

    /// Finds the entity occupying `pos`, if any.
    pub fn entity_at(&self, pos: Position) -> Option<&Entity> {
        self.entities.iter().find(|e| e.pos == pos)
    }

    /// Counts how many of the 8 neighbors of `pos` are walkable.
    pub fn open_neighbors(&self, pos: Position) -> u32 {
        pos.adjacent_positions()
            .into_iter()
            .filter(|&p| self.is_walkable(p))
            .count() as u32
    }

    fn is_spawnable(&self, pos: Position) -> bool {
        match self.tile(pos) {
            Some(tile) => {
                tile.walkable && !tile.stairs && self.entity_at(pos).is_none()
            }
            None => false,
        }
    }

    /// Uniform-random empty-position search.
    ///
    /// Samples walkable, non-stairs, unoccupied cells for a bounded number of
    /// attempts, falling back to a fixed corner when the level is saturated.
    pub fn random_empty_pos(&self, rng: &mut StdRng) -> Position {
        for _ in 0..10_000 {
            let pos = Position::new(
                rng.gen_range(0..MAP_WIDTH),
                rng.gen_range(0..MAP_HEIGHT),
            );
            if self.is_spawnable(pos) {
                return pos;
            }
        }
        Position::new(1, 1)
    }

    /// Expanding concentric-ring search outward from the map center.
    pub fn central_empty_pos(&self, rng: &mut StdRng) -> Position {
        let cx = MAP_WIDTH / 2;
        let cy = MAP_HEIGHT / 2;

        for radius in 0..MAP_WIDTH.max(MAP_HEIGHT) {
            for dy in -radius..=radius {
                for dx in -radius..=radius {
                    // Only the ring boundary; the interior was covered by
                    // smaller radii.
                    if dx.abs() != radius && dy.abs() != radius {
                        continue;
                    }
                    let pos = Position::new(cx + dx, cy + dy);
                    if self.is_spawnable(pos) {
                        return pos;
                    }
                }
            }
        }
        self.random_empty_pos(rng)
    }

    /// Empty-position search preferring open ground, used for spawn placement.
    ///
    /// Draws up to 200 random candidates and keeps the one with the most
    /// walkable neighbors, returning early once a candidate has at least 6 of
    /// its 8 neighbors open.
    pub fn open_empty_pos(&self, rng: &mut StdRng) -> Position {
        let mut best: Option<Position> = None;
        let mut best_open = 0;

        for _ in 0..200 {
            let pos = self.random_empty_pos(rng);
            let open = self.open_neighbors(pos);
            if open > best_open {
                best_open = open;
                best = Some(pos);
            }
            if open >= 6 {
                return pos;
            }
        }
        best.unwrap_or_else(|| self.central_empty_pos(rng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn open_level() -> DungeonLevel {
        let mut level = DungeonLevel::blank(1);
        for y in 1..MAP_HEIGHT - 1 {
            for x in 1..MAP_WIDTH - 1 {
                level.set_tile(Position::new(x, y), Tile::floor());
            }
        }
        level
    }

    #[test]
    fn test_blank_level_dimensions() {
        let level = DungeonLevel::blank(3);
        assert_eq!(level.depth, 3);
        assert_eq!(level.tiles.len(), MAP_HEIGHT as usize);
        assert_eq!(level.tiles[0].len(), MAP_WIDTH as usize);
        assert!(level.entities.is_empty());
    }

    #[test]
    fn test_tile_out_of_bounds() {
        let level = DungeonLevel::blank(1);
        assert!(level.tile(Position::new(-1, 0)).is_none());
        assert!(level.tile(Position::new(MAP_WIDTH, 0)).is_none());
        assert!(!level.is_walkable(Position::new(0, MAP_HEIGHT)));
    }

    #[test]
    fn test_random_empty_pos_avoids_walls_and_stairs() {
        let mut level = open_level();
        level.set_tile(Position::new(10, 10), Tile::stairs_down());
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..50 {
            let pos = level.random_empty_pos(&mut rng);
            let tile = level.tile(pos).unwrap();
            assert!(tile.walkable);
            assert!(!tile.stairs);
        }
    }

    #[test]
    fn test_random_empty_pos_fallback_corner() {
        // Nothing walkable anywhere: the bounded retry gives up.
        let level = DungeonLevel::blank(1);
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(level.random_empty_pos(&mut rng), Position::new(1, 1));
    }

    #[test]
    fn test_central_empty_pos_prefers_center() {
        let level = open_level();
        let mut rng = StdRng::seed_from_u64(7);
        let pos = level.central_empty_pos(&mut rng);
        assert_eq!(pos, Position::new(MAP_WIDTH / 2, MAP_HEIGHT / 2));
    }

    #[test]
    fn test_open_empty_pos_is_open_ground() {
        let level = open_level();
        let mut rng = StdRng::seed_from_u64(7);
        let pos = level.open_empty_pos(&mut rng);
        assert!(level.open_neighbors(pos) >= 6);
    }

    #[test]
    fn test_open_neighbors_count() {
        let mut level = DungeonLevel::blank(1);
        let center = Position::new(5, 5);
        level.set_tile(Position::new(4, 5), Tile::floor());
        level.set_tile(Position::new(6, 5), Tile::floor());
        level.set_tile(Position::new(5, 4), Tile::floor());
        assert_eq!(level.open_neighbors(center), 3);
    }
}
