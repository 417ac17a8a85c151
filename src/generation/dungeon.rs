//! # Dungeon Generation
//!
//! Room placement, corridor carving, stairs, and entity population for one
//! [`DungeonLevel`].

use crate::config::{MAP_HEIGHT, MAP_WIDTH};
use crate::game::{DungeonLevel, Entity, EntityKind, Position, Tile};
use crate::generation::{Room, DEFAULT_ENEMIES, DEFAULT_ITEMS};
use rand::rngs::StdRng;
use rand::Rng;
use uuid::Uuid;

impl DungeonLevel {
    /// Generates the level for a given depth.
    ///
    /// Carves rooms and corridors, places exactly one stairs-down tile, and
    /// populates enemies and items with depth-scaled counts and hit points.
    pub fn generate(depth: u32, rng: &mut StdRng) -> Self {
        let mut level = DungeonLevel::blank(depth);

        let rooms = level.place_rooms(rng);
        level.connect_rooms(&rooms);
        level.place_stairs(rng);
        level.spawn_entities(depth, rng);

        level
    }

    /// Places rooms by repeated random rectangle sampling.
    ///
    /// Attempts up to three times the target count and stops early once the
    /// target is reached. Candidates within a 1-tile margin of an existing
    /// room are rejected.
    fn place_rooms(&mut self, rng: &mut StdRng) -> Vec<Room> {
        let mut rooms: Vec<Room> = Vec::new();
        let target: usize = rng.gen_range(8..=13);

        for _ in 0..target * 3 {
            if rooms.len() >= target {
                break;
            }

            let width = rng.gen_range(5..=12);
            let height = rng.gen_range(4..=9);
            let x = rng.gen_range(1..MAP_WIDTH - width - 1);
            let y = rng.gen_range(1..MAP_HEIGHT - height - 1);
            let candidate = Room::new(Position::new(x, y), width, height);

            if rooms.iter().any(|r| candidate.near_overlaps(r)) {
                continue;
            }

            for pos in candidate.floor_positions() {
                self.set_tile(pos, Tile::floor());
            }
            rooms.push(candidate);
        }

        rooms
    }

    /// Connects rooms in placement order with L-shaped corridors.
    ///
    /// Each corridor runs horizontally from one room's center to the next
    /// room's center x, then vertically to its center y. This yields a
    /// connected chain of consecutively placed rooms but not full graph
    /// connectivity, and that property is intentional.
    fn connect_rooms(&mut self, rooms: &[Room]) {
        for pair in rooms.windows(2) {
            let a = pair[0].center();
            let b = pair[1].center();

            for x in a.x.min(b.x)..=a.x.max(b.x) {
                self.set_tile(Position::new(x, a.y), Tile::floor());
            }
            for y in a.y.min(b.y)..=a.y.max(b.y) {
                self.set_tile(Position::new(b.x, y), Tile::floor());
            }
        }
    }

    /// Places the single stairs-down tile and its persistent marker entity.
    fn place_stairs(&mut self, rng: &mut StdRng) {
        let pos = self.random_empty_pos(rng);
        self.set_tile(pos, Tile::stairs_down());
        self.entities.push(Entity {
            id: Uuid::new_v4(),
            kind: EntityKind::StairsDown,
            pos,
            glyph: '>',
            color: "text-primary".to_string(),
            name: "Stairs Down".to_string(),
            hp: None,
            max_hp: None,
        });
    }

    /// Populates enemies and items for the given depth.
    ///
    /// Enemy count is `10 + 3 * depth` and item count `12 + 2 * depth`;
    /// enemy hit points scale by `1 + 0.3 * (depth - 1)`, rounded down.
    fn spawn_entities(&mut self, depth: u32, rng: &mut StdRng) {
        let enemy_count = 10 + 3 * depth;
        let item_count = 12 + 2 * depth;

        for _ in 0..enemy_count {
            let def = DEFAULT_ENEMIES[rng.gen_range(0..DEFAULT_ENEMIES.len())];
            let scaled_hp =
                (def.hp as f64 * (1.0 + (depth as f64 - 1.0) * 0.3)).floor() as i32;
            let pos = self.random_empty_pos(rng);
            self.entities.push(Entity {
                id: Uuid::new_v4(),
                kind: EntityKind::Enemy,
                pos,
                glyph: def.glyph,
                color: def.color.to_string(),
                name: def.name.to_string(),
                hp: Some(scaled_hp),
                max_hp: Some(scaled_hp),
            });
        }

        for _ in 0..item_count {
            let def = DEFAULT_ITEMS[rng.gen_range(0..DEFAULT_ITEMS.len())];
            let pos = self.random_empty_pos(rng);
            self.entities.push(Entity {
                id: Uuid::new_v4(),
                kind: EntityKind::Item,
                pos,
                glyph: def.glyph,
                color: def.color.to_string(),
                name: def.name.to_string(),
                hp: None,
                max_hp: None,
            });
        }
    }
}
