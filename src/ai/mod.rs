//! # AI Module
//!
//! Autonomous adventurers built from three layers:
//! - A decision policy: an ordered rule table picking a [`Goal`] each tick
//! - Capped breadth-first pathfinding toward the chosen goal
//! - A bot controller that acts through the same world operations as a
//!   human session
//!
//! Bots cheat at nothing: they see through the same field of view, fight
//! with the same combat rolls, and die the same deaths.

pub mod bot;
pub mod pathfind;
pub mod policy;

pub use bot::{AiBot, AI_NAMES};
pub use pathfind::{bfs_route, nearest_unexplored, RouteGoal};
pub use policy::{decide, evaluate, DecisionCtx, Goal, GoalKind, POLICY};
