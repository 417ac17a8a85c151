//! # Player State
//!
//! Per-player authoritative state and run statistics.
//!
//! Human and AI-controlled players are stored identically; whether a player
//! is bot-driven lives only in its controller, never here.

use crate::config::{MAP_HEIGHT, MAP_WIDTH, PLAYER_START_HP};
use crate::game::{PlayerId, Position};
use serde::{Deserialize, Serialize};

/// Cumulative statistics for one run; reset on respawn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    pub kills: u32,
    pub damage_dealt: u32,
    pub damage_taken: u32,
    pub items_collected: u32,
    pub steps_walked: u32,
    pub deepest_depth: u32,
    /// Name of the enemy that ended the run; empty while alive.
    pub killed_by: String,
}

impl PlayerStats {
    /// Stats for a freshly joined or respawned player.
    pub fn fresh() -> Self {
        Self {
            deepest_depth: 1,
            ..Self::default()
        }
    }
}

/// Authoritative state of one player, keyed by id in the world.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    pub id: PlayerId,
    pub name: String,
    pub pos: Position,
    pub hp: i32,
    pub max_hp: i32,
    /// Every tile ever revealed to this player on the current depth.
    /// Monotonic non-decreasing until a depth change or respawn resets it.
    #[serde(skip)]
    pub explored: Vec<Vec<bool>>,
    pub stats: PlayerStats,
    pub dead: bool,
}

impl PlayerState {
    /// Creates a live player at the given spawn position.
    pub fn new(id: PlayerId, name: String, pos: Position) -> Self {
        Self {
            id,
            name,
            pos,
            hp: PLAYER_START_HP,
            max_hp: PLAYER_START_HP,
            explored: blank_explored(),
            stats: PlayerStats::fresh(),
            dead: false,
        }
    }

    /// Forgets all exploration, e.g. after descending to a new depth.
    pub fn reset_explored(&mut self) {
        self.explored = blank_explored();
    }

    /// Marks one tile as permanently explored on the current depth.
    pub fn mark_explored(&mut self, pos: Position) {
        if pos.in_bounds() {
            self.explored[pos.y as usize][pos.x as usize] = true;
        }
    }
}

/// An all-false explored grid matching the fixed map dimensions.
pub fn blank_explored() -> Vec<Vec<bool>> {
    vec![vec![false; MAP_WIDTH as usize]; MAP_HEIGHT as usize]
}
