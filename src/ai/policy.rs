//! # AI Decision Policy
//!
//! The ordered rule table a bot evaluates every tick.
//!
//! The policy is data ([`POLICY`]) plus one pure evaluation function per
//! rule, so priorities can be inspected and each rule tested on its own,
//! independent of pathfinding and movement.

use crate::ai::pathfind::nearest_unexplored;
use crate::game::{DungeonLevel, EntityKind, PlayerState, Position};

/// Hp fraction below which a bot seeks a visible Health Potion.
pub const HEAL_BELOW_FRACTION: f64 = 0.4;
/// Hp fraction a bot must exceed before it picks fights.
pub const FIGHT_MIN_FRACTION: f64 = 0.3;
/// Maximum Manhattan distance at which a visible enemy is worth fighting.
pub const FIGHT_RANGE: u32 = 6;
/// Maximum Manhattan distance at which a visible item is worth looting.
pub const LOOT_RANGE: u32 = 10;
/// Node-expansion cap of the unexplored-frontier search.
pub const EXPLORE_EXPANSION_CAP: usize = 300;
/// Node-expansion cap of route planning.
pub const ROUTE_EXPANSION_CAP: usize = 200;
/// Ticks a cached route may age before it is recomputed.
pub const REPLAN_AFTER_TICKS: u32 = 5;

/// The kinds of goal a bot can pursue, in priority order in [`POLICY`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalKind {
    Heal,
    Fight,
    Loot,
    Explore,
    Descend,
    Idle,
}

/// The fixed priority order of the decision policy.
pub const POLICY: [GoalKind; 6] = [
    GoalKind::Heal,
    GoalKind::Fight,
    GoalKind::Loot,
    GoalKind::Explore,
    GoalKind::Descend,
    GoalKind::Idle,
];

/// A chosen goal: what to do and, for every kind but Idle, where.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Goal {
    pub kind: GoalKind,
    pub target: Option<Position>,
}

impl Goal {
    pub fn idle() -> Self {
        Self {
            kind: GoalKind::Idle,
            target: None,
        }
    }
}

/// Everything a rule may consult when deciding.
pub struct DecisionCtx<'a> {
    pub player: &'a PlayerState,
    pub level: &'a DungeonLevel,
    /// Visible mask computed for the bot's current position this tick.
    pub visible: &'a [Vec<bool>],
}

impl DecisionCtx<'_> {
    fn sees(&self, pos: Position) -> bool {
        pos.in_bounds() && self.visible[pos.y as usize][pos.x as usize]
    }

    /// Nearest visible entity matching `keep`, by Manhattan distance.
    fn nearest_visible(
        &self,
        keep: impl Fn(&crate::game::Entity) -> bool,
    ) -> Option<Position> {
        self.level
            .entities
            .iter()
            .filter(|e| keep(e) && self.sees(e.pos))
            .min_by_key(|e| self.player.pos.manhattan_distance(e.pos))
            .map(|e| e.pos)
    }
}

/// Picks the first rule in [`POLICY`] that currently applies.
pub fn decide(ctx: &DecisionCtx) -> Goal {
    POLICY
        .iter()
        .find_map(|&kind| evaluate(kind, ctx))
        .unwrap_or_else(Goal::idle)
}

/// Evaluates one rule against the context. Returns the concrete goal when
/// the rule applies.
pub fn evaluate(kind: GoalKind, ctx: &DecisionCtx) -> Option<Goal> {
    let player = ctx.player;
    match kind {
        GoalKind::Heal => {
            if (player.hp as f64) >= player.max_hp as f64 * HEAL_BELOW_FRACTION {
                return None;
            }
            ctx.nearest_visible(|e| e.kind == EntityKind::Item && e.name == "Health Potion")
                .map(|pos| Goal {
                    kind,
                    target: Some(pos),
                })
        }
        GoalKind::Fight => {
            if (player.hp as f64) <= player.max_hp as f64 * FIGHT_MIN_FRACTION {
                return None;
            }
            ctx.nearest_visible(|e| e.kind == EntityKind::Enemy)
                .filter(|&pos| player.pos.manhattan_distance(pos) <= FIGHT_RANGE)
                .map(|pos| Goal {
                    kind,
                    target: Some(pos),
                })
        }
        GoalKind::Loot => ctx
            .nearest_visible(|e| e.kind == EntityKind::Item)
            .filter(|&pos| player.pos.manhattan_distance(pos) <= LOOT_RANGE)
            .map(|pos| Goal {
                kind,
                target: Some(pos),
            }),
        GoalKind::Explore => nearest_unexplored(
            ctx.level,
            &player.explored,
            player.pos,
            EXPLORE_EXPANSION_CAP,
        )
        .map(|pos| Goal {
            kind,
            target: Some(pos),
        }),
        GoalKind::Descend => ctx
            .nearest_visible(|e| e.kind == EntityKind::StairsDown)
            .map(|pos| Goal {
                kind,
                target: Some(pos),
            }),
        GoalKind::Idle => Some(Goal::idle()),
    }
}
