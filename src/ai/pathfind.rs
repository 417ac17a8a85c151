//! # Pathfinding
//!
//! Capped breadth-first search over walkable tiles.
//!
//! All searches are bounded by an expansion cap so a bot tick stays
//! bounded-time even on degenerate layouts. Failing to find a path is a
//! normal outcome, not an error; callers fall back to random movement.

use crate::game::{DungeonLevel, EntityKind, Position};
use std::collections::{HashMap, HashSet, VecDeque};

/// What a route is trying to reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteGoal {
    /// Stand on this exact cell.
    Cell(Position),
    /// Stand on any of the 8 neighbors of this cell (used for fighting:
    /// the attack itself is a bump into the target, not a step onto it).
    AdjacentTo(Position),
}

impl RouteGoal {
    fn satisfied_by(self, pos: Position) -> bool {
        match self {
            RouteGoal::Cell(target) => pos == target,
            RouteGoal::AdjacentTo(target) => pos.chebyshev_distance(target) == 1,
        }
    }
}

/// Whether a live enemy currently occupies `pos`.
fn enemy_at(level: &DungeonLevel, pos: Position) -> bool {
    level
        .entities
        .iter()
        .any(|e| e.kind == EntityKind::Enemy && e.hp.unwrap_or(0) > 0 && e.pos == pos)
}

/// Breadth-first route from `start` to `goal`, capped at `max_expansions`
/// dequeued nodes.
///
/// Cells occupied by live enemies are obstacles, except a cell that itself
/// satisfies the goal. The returned route excludes `start` and ends on the
/// goal-satisfying cell; an already-satisfied goal yields an empty route.
pub fn bfs_route(
    level: &DungeonLevel,
    start: Position,
    goal: RouteGoal,
    max_expansions: usize,
) -> Option<Vec<Position>> {
    if goal.satisfied_by(start) {
        return Some(Vec::new());
    }

    let mut came_from: HashMap<Position, Position> = HashMap::new();
    let mut queue = VecDeque::new();
    queue.push_back(start);
    came_from.insert(start, start);

    let mut expansions = 0;
    while let Some(current) = queue.pop_front() {
        expansions += 1;
        if expansions > max_expansions {
            return None;
        }

        for neighbor in current.adjacent_positions() {
            if came_from.contains_key(&neighbor) || !level.is_walkable(neighbor) {
                continue;
            }
            if goal.satisfied_by(neighbor) {
                came_from.insert(neighbor, current);
                return Some(reconstruct(&came_from, start, neighbor));
            }
            if enemy_at(level, neighbor) {
                continue;
            }
            came_from.insert(neighbor, current);
            queue.push_back(neighbor);
        }
    }

    None
}

fn reconstruct(
    came_from: &HashMap<Position, Position>,
    start: Position,
    end: Position,
) -> Vec<Position> {
    let mut route = vec![end];
    let mut current = end;
    while let Some(&prev) = came_from.get(&current) {
        if prev == start {
            break;
        }
        route.push(prev);
        current = prev;
    }
    route.reverse();
    route
}

/// Finds the nearest (by breadth-first distance) walkable cell the player has
/// not yet explored, capped at `max_expansions` dequeued nodes.
pub fn nearest_unexplored(
    level: &DungeonLevel,
    explored: &[Vec<bool>],
    start: Position,
    max_expansions: usize,
) -> Option<Position> {
    let mut seen: HashSet<Position> = HashSet::new();
    let mut queue = VecDeque::new();
    queue.push_back(start);
    seen.insert(start);

    let mut expansions = 0;
    while let Some(current) = queue.pop_front() {
        expansions += 1;
        if expansions > max_expansions {
            return None;
        }

        for neighbor in current.adjacent_positions() {
            if seen.contains(&neighbor) || !level.is_walkable(neighbor) {
                continue;
            }
            if !explored[neighbor.y as usize][neighbor.x as usize] {
                return Some(neighbor);
            }
            seen.insert(neighbor);
            queue.push_back(neighbor);
        }
    }

    None
}
