//! # Wire Protocol
//!
//! JSON messages exchanged over a session's WebSocket, and the snapshot
//! the server pushes after every state change.
//!
//! Snapshots are complete rather than incremental: each one carries the
//! full per-viewer view of the world, so a client can render any snapshot
//! in isolation and a dropped frame costs nothing.

use crate::game::{Entity, GameWorld, PlayerId, PlayerStats, Position};
use serde::{Deserialize, Serialize};

/// Commands a client may send.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
    /// Enter the world. A missing or blank name gets a generated one.
    Join { name: Option<String> },
    /// Step one tile. Deltas outside [-1, 1] are clamped.
    Move { dx: i32, dy: i32 },
    /// Start a fresh run after death.
    Respawn,
    /// Toggle spectator mode: snapshots follow an AI bot instead.
    Observe { enabled: bool },
}

/// Frames the server pushes.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerMessage {
    State { data: Snapshot },
}

/// One tile as the viewer sees it.
#[derive(Debug, Clone, Serialize)]
pub struct TileView {
    #[serde(rename = "char")]
    pub glyph: char,
    pub walkable: bool,
    pub visible: bool,
    pub explored: bool,
}

/// The viewer's own avatar.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub name: String,
    pub pos: Position,
    pub hp: i32,
    pub max_hp: i32,
}

/// Another player currently in the viewer's field of view.
#[derive(Debug, Clone, Serialize)]
pub struct OtherPlayerView {
    pub name: String,
    pub pos: Position,
    #[serde(rename = "char")]
    pub glyph: char,
    pub color: String,
    pub visible: bool,
}

/// Roster entry shown to observers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiBotView {
    pub name: String,
    pub hp: i32,
    pub max_hp: i32,
    pub depth: u32,
}

/// The complete per-viewer state frame.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub map: Vec<Vec<TileView>>,
    pub player: PlayerView,
    /// Entities inside the viewer's current field of view.
    pub entities: Vec<Entity>,
    /// Other same-depth players inside the viewer's current field of view.
    pub other_players: Vec<OtherPlayerView>,
    pub dead: bool,
    pub stats: PlayerStats,
    pub messages: Vec<String>,
    pub depth: u32,
    pub online_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observing: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_bots: Option<Vec<AiBotView>>,
}

impl Snapshot {
    /// Builds the frame a player's own session receives. `None` when the
    /// id is no longer in the world.
    pub fn for_player(world: &GameWorld, id: PlayerId) -> Option<Self> {
        let player = world.players.get(&id)?;
        let depth = world.depth_of(id)?;
        let level = world.levels.get(&depth)?;
        let visible = world.visible_for(id)?;

        let map = level
            .tiles
            .iter()
            .enumerate()
            .map(|(y, row)| {
                row.iter()
                    .enumerate()
                    .map(|(x, tile)| TileView {
                        glyph: tile.glyph,
                        walkable: tile.walkable,
                        visible: visible[y][x],
                        explored: player.explored[y][x],
                    })
                    .collect()
            })
            .collect();

        let sees = |pos: Position| visible[pos.y as usize][pos.x as usize];

        let entities = level
            .entities
            .iter()
            .filter(|e| sees(e.pos))
            .cloned()
            .collect();

        let other_players = world
            .players
            .iter()
            .filter(|(pid, p)| {
                **pid != id && world.depth_of(**pid) == Some(depth) && !p.dead && sees(p.pos)
            })
            .map(|(_, p)| OtherPlayerView {
                name: p.name.clone(),
                pos: p.pos,
                glyph: '@',
                color: "text-secondary".to_string(),
                visible: true,
            })
            .collect();

        Some(Self {
            map,
            player: PlayerView {
                name: player.name.clone(),
                pos: player.pos,
                hp: player.hp,
                max_hp: player.max_hp,
            },
            entities,
            other_players,
            dead: player.dead,
            stats: player.stats.clone(),
            messages: world.messages(id),
            depth,
            online_count: world.online_count(),
            observing: None,
            ai_bots: None,
        })
    }

    /// Builds an observer frame: the world through `primary`'s eyes plus
    /// the roster of bots on the primary's depth.
    pub fn for_observer(world: &GameWorld, primary: PlayerId, bots: &[PlayerId]) -> Option<Self> {
        let depth = world.depth_of(primary)?;
        let mut snapshot = Self::for_player(world, primary)?;
        snapshot.observing = Some(true);
        snapshot.ai_bots = Some(
            bots.iter()
                .filter_map(|&bid| {
                    let bot = world.players.get(&bid)?;
                    if world.depth_of(bid)? != depth {
                        return None;
                    }
                    Some(AiBotView {
                        name: bot.name.clone(),
                        hp: bot.hp,
                        max_hp: bot.max_hp,
                        depth,
                    })
                })
                .collect(),
        );
        Some(snapshot)
    }
}
