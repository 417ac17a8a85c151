//! # AI Bot Controller
//!
//! Drives one AI-controlled player through the same world operations a
//! human session uses.
//!
//! A bot holds no private game state beyond its plan: a current [`Goal`]
//! and a cached route toward it. Everything it knows about the world it
//! re-reads each tick, so bots and humans can never disagree about the
//! level they share.

use crate::ai::pathfind::{bfs_route, RouteGoal};
use crate::ai::policy::{decide, DecisionCtx, Goal, GoalKind, REPLAN_AFTER_TICKS, ROUTE_EXPANSION_CAP};
use crate::game::{GameWorld, PlayerId, Position};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use uuid::Uuid;

/// The adventurer name pool bots draw from.
pub const AI_NAMES: [&str; 8] = [
    "Gandalf_AI",
    "Conan_AI",
    "Elric_AI",
    "Bilbo_AI",
    "Aragorn_AI",
    "Merlin_AI",
    "Drizzt_AI",
    "Raistlin_AI",
];

/// One autonomous player: its world identity plus its current plan.
#[derive(Debug)]
pub struct AiBot {
    pub id: PlayerId,
    pub name: String,
    goal: Option<Goal>,
    route: VecDeque<Position>,
    ticks_since_plan: u32,
    rng: StdRng,
}

impl AiBot {
    /// Joins the world as a new AI player on open ground.
    pub fn spawn(world: &mut GameWorld) -> Self {
        let mut rng = StdRng::from_entropy();
        let name = AI_NAMES[rng.gen_range(0..AI_NAMES.len())].to_string();
        let id = Uuid::new_v4();
        world.add_player(id, name.clone(), true);
        log::info!("ai bot {name} ({id}) spawned");
        Self {
            id,
            name,
            goal: None,
            route: VecDeque::new(),
            ticks_since_plan: 0,
            rng,
        }
    }

    /// Removes the bot's player from the world.
    pub fn despawn(&self, world: &mut GameWorld) {
        world.remove_player(self.id);
    }

    /// The bot's current goal kind, for observer snapshots and tests.
    pub fn goal_kind(&self) -> Option<GoalKind> {
        self.goal.map(|g| g.kind)
    }

    /// Runs one decision-and-act cycle. At most one world action per tick:
    /// a single step, a single attack, or a respawn.
    pub fn take_turn(&mut self, world: &mut GameWorld) {
        let Some(player) = world.players.get(&self.id) else {
            return;
        };
        if player.dead {
            world.respawn_player(self.id);
            self.goal = None;
            self.route.clear();
            self.ticks_since_plan = 0;
            return;
        }

        let pos = player.pos;
        let Some(&depth) = world.depths.get(&self.id) else {
            return;
        };
        let Some(visible) = world.visible_for(self.id) else {
            return;
        };
        let level = world.levels.get(&depth).expect("player depth exists");
        let player = world.players.get(&self.id).expect("checked above");

        let goal = decide(&DecisionCtx {
            player,
            level,
            visible: &visible,
        });

        self.ticks_since_plan += 1;
        let stale = self.ticks_since_plan > REPLAN_AFTER_TICKS;
        if self.goal != Some(goal) || stale {
            self.goal = Some(goal);
            self.ticks_since_plan = 0;
            self.route = goal
                .target
                .and_then(|target| {
                    let route_goal = if goal.kind == GoalKind::Fight {
                        RouteGoal::AdjacentTo(target)
                    } else {
                        RouteGoal::Cell(target)
                    };
                    bfs_route(level, pos, route_goal, ROUTE_EXPANSION_CAP)
                })
                .map(VecDeque::from)
                .unwrap_or_default();
        }

        // Adjacent fight target: the attack is a bump, no route needed.
        if goal.kind == GoalKind::Fight {
            if let Some(target) = goal.target {
                if pos.chebyshev_distance(target) == 1 {
                    let (dx, dy) = pos.step_toward(target);
                    world.move_player(self.id, dx, dy);
                    self.route.clear();
                    return;
                }
            }
        }

        if let Some(&waypoint) = self.route.front() {
            let (dx, dy) = pos.step_toward(waypoint);
            let moved = world.move_player(self.id, dx, dy);
            let new_pos = world.players.get(&self.id).map(|p| p.pos);
            if moved && new_pos == Some(waypoint) {
                self.route.pop_front();
            } else {
                // Blocked, fought, or descended mid-route: the plan no
                // longer matches the world.
                self.route.clear();
            }
            return;
        }

        self.random_step(world, pos, depth);
    }

    /// Uniform random step onto a walkable neighbor; stands still when
    /// walled in.
    fn random_step(&mut self, world: &mut GameWorld, pos: Position, depth: u32) {
        let level = world.levels.get(&depth).expect("player depth exists");
        let open: Vec<Position> = pos
            .adjacent_positions()
            .into_iter()
            .filter(|&p| level.is_walkable(p))
            .collect();
        if open.is_empty() {
            return;
        }
        let next = open[self.rng.gen_range(0..open.len())];
        let (dx, dy) = pos.step_toward(next);
        world.move_player(self.id, dx, dy);
    }
}
