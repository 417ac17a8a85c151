//! # Delved
//!
//! Authoritative game-world core for a multiplayer roguelike dungeon crawler.
//!
//! ## Architecture Overview
//!
//! The server is built from four layers, leaves first:
//!
//! - **Generation**: procedural room-and-corridor dungeon layouts with
//!   depth-scaled enemy and item population
//! - **Game World**: the single authoritative store of levels, players,
//!   message logs, movement, combat, and fog-of-war visibility
//! - **AI**: autonomous bot controllers that register synthetic players and
//!   drive them through the same public world operations as human sessions
//! - **Server**: WebSocket sessions translating inbound commands into world
//!   calls and pushing per-viewer snapshots back out
//!
//! Every world mutation runs to completion behind a single lock, which makes
//! each operation atomic without per-structure synchronization.

pub mod ai;
pub mod game;
pub mod generation;
pub mod server;

pub use ai::{AiBot, Goal, GoalKind};
pub use game::{
    compute_visible, DungeonLevel, Entity, EntityKind, GameWorld, PlayerState, PlayerStats,
    Position, Tile,
};
pub use generation::{EnemyDef, ItemDef, Room, DEFAULT_ENEMIES, DEFAULT_ITEMS};

/// Core error type for the Delved server.
#[derive(thiserror::Error, Debug)]
pub enum DelveError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Game state is invalid
    #[error("Invalid game state: {0}")]
    InvalidState(String),
}

/// Result type used throughout the Delved codebase.
pub type DelveResult<T> = Result<T, DelveError>;

/// Version information for the server.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Game configuration constants.
pub mod config {
    /// Dungeon width in tiles
    pub const MAP_WIDTH: i32 = 80;

    /// Dungeon height in tiles
    pub const MAP_HEIGHT: i32 = 40;

    /// Field-of-view radius in tiles
    pub const FOV_RADIUS: i32 = 8;

    /// Angular step of the visibility raycast, in degrees
    pub const FOV_STEP_DEGREES: i32 = 3;

    /// Starting (and respawn) player hit points
    pub const PLAYER_START_HP: i32 = 20;

    /// Per-player message log capacity; oldest entries are dropped first
    pub const MESSAGE_LOG_CAP: usize = 50;

    /// Maximum accepted length of a player name
    pub const NAME_MAX_LEN: usize = 20;

    /// Default period of an AI bot's turn timer, in milliseconds
    pub const AI_TICK_MS: u64 = 400;

    /// Refresh period of observe-mode snapshots, in milliseconds
    pub const OBSERVER_BROADCAST_MS: u64 = 400;
}
