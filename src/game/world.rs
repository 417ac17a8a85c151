//! # Game World
//!
//! The single authoritative store for the whole simulation.
//!
//! Owns every dungeon level, every player, and every per-player message log.
//! All mutation goes through the public operations here; sessions and AI
//! controllers alike call the same entry points. Callers are responsible for
//! serializing access (the server wraps the world in one lock), which makes
//! each operation atomic.

use crate::config::MESSAGE_LOG_CAP;
use crate::game::{
    cast_rays, compute_visible, DungeonLevel, EntityKind, PlayerId, PlayerState, PlayerStats,
    Position,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{HashMap, VecDeque};

/// The authoritative world: depth-keyed levels, id-keyed players, and their
/// message logs.
///
/// Invariant: every id present in `players` has a corresponding entry in
/// `depths` and in `message_logs`.
#[derive(Debug)]
pub struct GameWorld {
    pub levels: HashMap<u32, DungeonLevel>,
    pub players: HashMap<PlayerId, PlayerState>,
    pub depths: HashMap<PlayerId, u32>,
    pub message_logs: HashMap<PlayerId, VecDeque<String>>,
    rng: StdRng,
}

impl GameWorld {
    /// Creates a world with the first depth pre-generated.
    pub fn new(seed: u64) -> Self {
        let mut world = Self {
            levels: HashMap::new(),
            players: HashMap::new(),
            depths: HashMap::new(),
            message_logs: HashMap::new(),
            rng: StdRng::seed_from_u64(seed),
        };
        world.get_or_create_level(1);
        log::info!("game world initialized (seed {seed})");
        world
    }

    /// Returns the level at `depth`, generating it on first visit.
    ///
    /// Levels are never evicted once created.
    pub fn get_or_create_level(&mut self, depth: u32) -> &DungeonLevel {
        let rng = &mut self.rng;
        self.levels.entry(depth).or_insert_with(|| {
            log::info!("generated dungeon level {depth}");
            DungeonLevel::generate(depth, rng)
        })
    }

    /// Replaces the level at a depth. Intended for tests that need a
    /// hand-carved layout.
    pub fn insert_level(&mut self, level: DungeonLevel) {
        self.levels.insert(level.depth, level);
    }

    /// Number of players currently in the world (human and AI).
    pub fn online_count(&self) -> usize {
        self.players.len()
    }

    /// The depth a player is currently on.
    pub fn depth_of(&self, id: PlayerId) -> Option<u32> {
        self.depths.get(&id).copied()
    }

    /// Registers a new player at depth 1 and announces the arrival.
    ///
    /// AI controllers pass `open_spawn` to prefer open ground; human joins
    /// use the plain uniform-random spawn.
    pub fn add_player(&mut self, id: PlayerId, name: String, open_spawn: bool) -> &PlayerState {
        let depth = 1;
        self.get_or_create_level(depth);
        let rng = &mut self.rng;
        let level = self.levels.get(&depth).expect("level 1 exists");
        let pos = if open_spawn {
            level.open_empty_pos(rng)
        } else {
            level.random_empty_pos(rng)
        };

        self.players.insert(id, PlayerState::new(id, name.clone(), pos));
        self.depths.insert(id, depth);
        self.message_logs.insert(
            id,
            VecDeque::from([
                "Welcome to the Dungeons of Doom.".to_string(),
                "Use arrow keys or WASD to move.".to_string(),
                "Find the > stairs to descend deeper.".to_string(),
            ]),
        );

        self.update_player_fov(id);
        self.broadcast_to_depth(depth, format!("{name} has entered the dungeon."), Some(id));
        log::info!("player {name} ({id}) joined at depth {depth}");

        self.players.get(&id).expect("just inserted")
    }

    /// Resets a dead player for a fresh run, preserving identity and earned
    /// max hp. Unknown ids no-op.
    pub fn respawn_player(&mut self, id: PlayerId) {
        if !self.players.contains_key(&id) {
            return;
        }

        let depth = 1;
        self.depths.insert(id, depth);
        self.get_or_create_level(depth);
        let rng = &mut self.rng;
        let level = self.levels.get(&depth).expect("level 1 exists");
        let spawn = level.random_empty_pos(rng);

        let player = self.players.get_mut(&id).expect("checked above");
        player.dead = false;
        player.hp = player.max_hp;
        player.stats = PlayerStats::fresh();
        player.pos = spawn;
        player.reset_explored();
        let name = player.name.clone();

        self.message_logs.insert(
            id,
            VecDeque::from([
                "You awaken at the dungeon entrance...".to_string(),
                "A new journey begins.".to_string(),
            ]),
        );
        log::info!("player {name} ({id}) respawned");
    }

    /// Removes a player from all three maps and announces the departure.
    /// Unknown ids no-op.
    pub fn remove_player(&mut self, id: PlayerId) {
        if let (Some(player), Some(&depth)) = (self.players.get(&id), self.depths.get(&id)) {
            let name = player.name.clone();
            self.broadcast_to_depth(depth, format!("{name} has left the dungeon."), Some(id));
            log::info!("player {name} ({id}) left");
        }
        self.players.remove(&id);
        self.depths.remove(&id);
        self.message_logs.remove(&id);
    }

    /// Appends a message to one player's bounded log.
    pub fn push_message(&mut self, id: PlayerId, msg: String) {
        Self::log_to(&mut self.message_logs, id, msg);
    }

    fn log_to(logs: &mut HashMap<PlayerId, VecDeque<String>>, id: PlayerId, msg: String) {
        let Some(log) = logs.get_mut(&id) else {
            return;
        };
        log.push_back(msg);
        while log.len() > MESSAGE_LOG_CAP {
            log.pop_front();
        }
    }

    /// Appends a message to every player on `depth` except `exclude`.
    pub fn broadcast_to_depth(&mut self, depth: u32, msg: String, exclude: Option<PlayerId>) {
        let recipients: Vec<PlayerId> = self
            .depths
            .iter()
            .filter(|(pid, d)| **d == depth && Some(**pid) != exclude)
            .map(|(pid, _)| *pid)
            .collect();
        for pid in recipients {
            Self::log_to(&mut self.message_logs, pid, msg.clone());
        }
    }

    /// The message log for one player, oldest first.
    pub fn messages(&self, id: PlayerId) -> Vec<String> {
        self.message_logs
            .get(&id)
            .map(|log| log.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Computes the current visible mask for a player. Never cached.
    pub fn visible_for(&self, id: PlayerId) -> Option<Vec<Vec<bool>>> {
        let player = self.players.get(&id)?;
        let depth = self.depths.get(&id)?;
        let level = self.levels.get(depth)?;
        Some(compute_visible(player.pos, level))
    }

    /// Re-marks the player's explored grid from their current position.
    ///
    /// Exploration only ever grows here; resets happen on depth change and
    /// respawn.
    pub fn update_player_fov(&mut self, id: PlayerId) {
        let Some(&depth) = self.depths.get(&id) else {
            return;
        };
        let Some(level) = self.levels.get(&depth) else {
            return;
        };
        let Some(player) = self.players.get_mut(&id) else {
            return;
        };
        let pos = player.pos;
        cast_rays(pos, level, |p| player.mark_explored(p));
    }

    /// The world's central operation: one unit step of movement, resolved
    /// against players, enemies, items, and stairs on the destination cell.
    ///
    /// Returns `false` with zero side effects when the player is dead, the
    /// destination is out of bounds, or the destination tile is not walkable.
    /// A combat exchange or a descent consumes the move without changing the
    /// mover's tile and still reports success.
    pub fn move_player(&mut self, id: PlayerId, dx: i32, dy: i32) -> bool {
        let Some(&depth) = self.depths.get(&id) else {
            return false;
        };
        let Some(player) = self.players.get(&id) else {
            return false;
        };
        if player.dead {
            return false;
        }
        let dest = Position::new(player.pos.x + dx, player.pos.y + dy);
        if !dest.in_bounds() {
            return false;
        }
        let Some(level) = self.levels.get(&depth) else {
            return false;
        };
        if !level.is_walkable(dest) {
            return false;
        }
        let mover_name = player.name.clone();

        // Bumping a live player never displaces the mover, but resolution
        // still continues against whatever entity shares the cell.
        let bumped = self
            .players
            .iter()
            .find(|(pid, p)| {
                **pid != id && !p.dead && self.depths.get(*pid) == Some(&depth) && p.pos == dest
            })
            .map(|(pid, p)| (*pid, p.name.clone()));
        if let Some((other_id, other_name)) = &bumped {
            Self::log_to(
                &mut self.message_logs,
                id,
                format!("You pass by {other_name}."),
            );
            Self::log_to(
                &mut self.message_logs,
                *other_id,
                format!("{mover_name} passes by you."),
            );
        }
        let blocked_by_player = bumped.is_some();

        let hit = self.levels[&depth]
            .entities
            .iter()
            .enumerate()
            .find(|(_, e)| e.pos == dest)
            .map(|(idx, e)| (idx, e.kind));

        match hit {
            Some((idx, EntityKind::Enemy)) => {
                self.attack_enemy(id, depth, idx);
                self.update_player_fov(id);
                true
            }
            Some((idx, EntityKind::Item)) => {
                self.pick_up_item(id, depth, idx, dest, blocked_by_player);
                self.update_player_fov(id);
                true
            }
            Some((_, EntityKind::StairsDown)) => {
                self.descend(id, depth, mover_name);
                true
            }
            None => {
                let player = self.players.get_mut(&id).expect("checked above");
                if !blocked_by_player {
                    player.pos = dest;
                }
                player.stats.steps_walked += 1;
                self.update_player_fov(id);
                true
            }
        }
    }

    /// One combat exchange against the enemy at `entities[idx]`.
    ///
    /// The mover's tile never changes. A kill grants +1 kill, +2 permanent
    /// max hp (healing the same 2, clamped), and removes the enemy; a
    /// survivor retaliates and may end the run.
    fn attack_enemy(&mut self, id: PlayerId, depth: u32, idx: usize) {
        let dmg = self.rng.gen_range(1..=5) + depth as i32 / 2;

        let level = self.levels.get_mut(&depth).expect("level exists");
        let enemy_name = level.entities[idx].name.clone();
        let enemy_hp = level.entities[idx].hp.get_or_insert(0);
        *enemy_hp -= dmg;
        let slain = *enemy_hp <= 0;

        let player = self.players.get_mut(&id).expect("checked by caller");
        player.stats.damage_dealt += dmg as u32;
        Self::log_to(
            &mut self.message_logs,
            id,
            format!("You hit the {enemy_name} for {dmg} damage!"),
        );

        if slain {
            player.stats.kills += 1;
            player.max_hp += 2;
            player.hp = (player.hp + 2).min(player.max_hp);
            Self::log_to(
                &mut self.message_logs,
                id,
                format!("You killed the {enemy_name}. [+2 Max HP]"),
            );
            level.entities.remove(idx);
        } else {
            let enemy_dmg = self.rng.gen_range(1..=3) + (depth as i32 * 3) / 10;
            player.hp -= enemy_dmg;
            player.stats.damage_taken += enemy_dmg as u32;
            Self::log_to(
                &mut self.message_logs,
                id,
                format!("The {enemy_name} hits you for {enemy_dmg}!"),
            );

            if player.hp <= 0 {
                player.hp = 0;
                player.dead = true;
                player.stats.killed_by = enemy_name.clone();
                Self::log_to(
                    &mut self.message_logs,
                    id,
                    format!("You have been slain by the {enemy_name}..."),
                );
            }
        }
    }

    /// Collects the item at `entities[idx]`; unlike combat, the mover
    /// occupies the item's tile (unless a player bump suppressed movement).
    fn pick_up_item(
        &mut self,
        id: PlayerId,
        depth: u32,
        idx: usize,
        dest: Position,
        blocked_by_player: bool,
    ) {
        let level = self.levels.get_mut(&depth).expect("level exists");
        let item = level.entities.remove(idx);

        Self::log_to(
            &mut self.message_logs,
            id,
            format!("You picked up a {}.", item.name),
        );
        let player = self.players.get_mut(&id).expect("checked by caller");
        player.stats.items_collected += 1;

        if item.name == "Health Potion" {
            let heal = 5.min(player.max_hp - player.hp);
            if heal > 0 {
                player.hp += heal;
                Self::log_to(&mut self.message_logs, id, format!("Restored {heal} HP."));
            }
        }

        let player = self.players.get_mut(&id).expect("checked by caller");
        if !blocked_by_player {
            player.pos = dest;
        }
        player.stats.steps_walked += 1;
    }

    /// Moves a player one depth down: lazily creates the target level,
    /// relocates them, resets exploration, and notifies both depths.
    fn descend(&mut self, id: PlayerId, depth: u32, mover_name: String) {
        let new_depth = depth + 1;
        self.push_message(id, format!("You descend to depth {new_depth}..."));
        self.broadcast_to_depth(depth, format!("{mover_name} descended deeper."), Some(id));

        self.depths.insert(id, new_depth);
        self.get_or_create_level(new_depth);
        let rng = &mut self.rng;
        let level = self.levels.get(&new_depth).expect("just created");
        let spawn = level.random_empty_pos(rng);

        let player = self.players.get_mut(&id).expect("checked by caller");
        player.pos = spawn;
        if new_depth > player.stats.deepest_depth {
            player.stats.deepest_depth = new_depth;
        }
        // Exploration stays entirely blank until the first step on the new
        // depth; the next movement re-marks it.
        player.reset_explored();

        self.broadcast_to_depth(new_depth, format!("{mover_name} arrived from above."), Some(id));
    }
}

impl Default for GameWorld {
    fn default() -> Self {
        Self::new(rand::random())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MAP_HEIGHT, MAP_WIDTH, PLAYER_START_HP};
    use crate::game::Tile;
    use uuid::Uuid;

    fn open_world() -> GameWorld {
        let mut world = GameWorld::new(1);
        let mut level = DungeonLevel::blank(1);
        for y in 1..MAP_HEIGHT - 1 {
            for x in 1..MAP_WIDTH - 1 {
                level.set_tile(Position::new(x, y), Tile::floor());
            }
        }
        world.insert_level(level);
        world
    }

    #[test]
    fn test_world_invariant_on_join_and_leave() {
        let mut world = GameWorld::new(7);
        let id = Uuid::new_v4();
        world.add_player(id, "Hero".to_string(), false);

        assert!(world.players.contains_key(&id));
        assert!(world.depths.contains_key(&id));
        assert!(world.message_logs.contains_key(&id));
        assert_eq!(world.online_count(), 1);

        world.remove_player(id);
        assert!(!world.players.contains_key(&id));
        assert!(!world.depths.contains_key(&id));
        assert!(!world.message_logs.contains_key(&id));
    }

    #[test]
    fn test_remove_unknown_player_noops() {
        let mut world = GameWorld::new(7);
        world.remove_player(Uuid::new_v4());
        world.respawn_player(Uuid::new_v4());
        assert!(!world.move_player(Uuid::new_v4(), 1, 0));
    }

    #[test]
    fn test_message_log_capped_at_50_oldest_first_dropped() {
        let mut world = GameWorld::new(7);
        let id = Uuid::new_v4();
        world.add_player(id, "Hero".to_string(), false);

        for i in 0..80 {
            world.push_message(id, format!("msg {i}"));
        }
        let messages = world.messages(id);
        assert_eq!(messages.len(), 50);
        assert_eq!(messages.last().unwrap(), "msg 79");
        assert_eq!(messages.first().unwrap(), "msg 30");
    }

    #[test]
    fn test_move_into_wall_rejected_without_side_effects() {
        let mut world = open_world();
        let id = Uuid::new_v4();
        world.add_player(id, "Hero".to_string(), false);

        let player = world.players.get_mut(&id).unwrap();
        player.pos = Position::new(1, 1);
        let before = world.players.get(&id).unwrap().clone();

        // (0, -1) walks into the border wall.
        assert!(!world.move_player(id, 0, -1));

        let after = world.players.get(&id).unwrap();
        assert_eq!(after.pos, before.pos);
        assert_eq!(after.hp, before.hp);
        assert_eq!(after.stats, before.stats);
    }

    #[test]
    fn test_dead_player_cannot_move() {
        let mut world = open_world();
        let id = Uuid::new_v4();
        world.add_player(id, "Hero".to_string(), false);
        let player = world.players.get_mut(&id).unwrap();
        player.pos = Position::new(10, 10);
        player.dead = true;
        player.hp = 0;

        assert!(!world.move_player(id, 1, 0));
        assert_eq!(world.players[&id].pos, Position::new(10, 10));
    }

    #[test]
    fn test_plain_move_walks_and_counts_steps() {
        let mut world = open_world();
        let id = Uuid::new_v4();
        world.add_player(id, "Hero".to_string(), false);
        world.players.get_mut(&id).unwrap().pos = Position::new(10, 10);

        assert!(world.move_player(id, 1, 0));
        let player = &world.players[&id];
        assert_eq!(player.pos, Position::new(11, 10));
        assert_eq!(player.stats.steps_walked, 1);
    }

    #[test]
    fn test_bumping_player_leaves_both_in_place() {
        let mut world = open_world();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        world.add_player(a, "Alice".to_string(), false);
        world.add_player(b, "Bob".to_string(), false);
        world.players.get_mut(&a).unwrap().pos = Position::new(10, 10);
        world.players.get_mut(&b).unwrap().pos = Position::new(11, 10);

        assert!(world.move_player(a, 1, 0));
        assert_eq!(world.players[&a].pos, Position::new(10, 10));
        assert_eq!(world.players[&b].pos, Position::new(11, 10));
        assert!(world
            .messages(a)
            .iter()
            .any(|m| m == "You pass by Bob."));
        assert!(world
            .messages(b)
            .iter()
            .any(|m| m == "Alice passes by you."));
    }

    #[test]
    fn test_respawn_resets_run_but_keeps_identity() {
        let mut world = open_world();
        let id = Uuid::new_v4();
        world.add_player(id, "Hero".to_string(), false);
        {
            let player = world.players.get_mut(&id).unwrap();
            player.dead = true;
            player.hp = 0;
            player.stats.kills = 3;
            player.stats.steps_walked = 120;
            player.stats.killed_by = "Troll".to_string();
            player.mark_explored(Position::new(5, 5));
        }
        world.depths.insert(id, 4);

        world.respawn_player(id);

        let player = &world.players[&id];
        assert!(!player.dead);
        assert_eq!(player.hp, player.max_hp);
        assert_eq!(player.stats, PlayerStats::fresh());
        assert_eq!(world.depth_of(id), Some(1));
        assert_eq!(player.name, "Hero");
        assert_eq!(player.hp, PLAYER_START_HP);
        assert!(player
            .explored
            .iter()
            .all(|row| row.iter().all(|&seen| !seen)));
    }

    #[test]
    fn test_broadcast_excludes_sender_and_other_depths() {
        let mut world = GameWorld::new(7);
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        world.add_player(a, "Alice".to_string(), false);
        world.add_player(b, "Bob".to_string(), false);
        world.add_player(c, "Cara".to_string(), false);
        world.depths.insert(c, 2);

        world.broadcast_to_depth(1, "hello".to_string(), Some(a));
        assert!(!world.messages(a).iter().any(|m| m == "hello"));
        assert!(world.messages(b).iter().any(|m| m == "hello"));
        assert!(!world.messages(c).iter().any(|m| m == "hello"));
    }
}
