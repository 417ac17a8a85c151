//! # Field of View
//!
//! Raycast visibility approximation.
//!
//! Rays are cast at a fixed angular step out to a fixed radius, marching in
//! unit-vector increments and rounding each sample to the nearest tile. A ray
//! terminates at, and includes, the first non-walkable tile it reaches. This
//! over-reveals at grazing angles and can leak through diagonal single-tile
//! walls; movement speed and the radius were tuned against exactly this
//! behavior, so it must not be replaced with true shadow-casting.

use crate::config::{FOV_RADIUS, FOV_STEP_DEGREES, MAP_HEIGHT, MAP_WIDTH};
use crate::game::{DungeonLevel, Position};

/// Computes the visible mask for a viewer standing at `pos`.
///
/// The mask is recomputed from scratch on every call; entities and other
/// players move every tick, so caching would serve stale reveals.
pub fn compute_visible(pos: Position, level: &DungeonLevel) -> Vec<Vec<bool>> {
    let mut visible = vec![vec![false; MAP_WIDTH as usize]; MAP_HEIGHT as usize];
    cast_rays(pos, level, |p| {
        visible[p.y as usize][p.x as usize] = true;
    });
    visible
}

/// Marches every ray from `pos` and invokes `mark` for each revealed tile.
///
/// Shared by the per-request visible mask and the player's cumulative
/// explored grid so the two can never disagree about what a ray reaches.
pub fn cast_rays<F: FnMut(Position)>(pos: Position, level: &DungeonLevel, mut mark: F) {
    let mut angle = 0;
    while angle < 360 {
        let rad = (angle as f64).to_radians();
        let dx = rad.cos();
        let dy = rad.sin();

        let mut cx = pos.x as f64;
        let mut cy = pos.y as f64;

        for _ in 0..FOV_RADIUS {
            let sample = Position::new(cx.round() as i32, cy.round() as i32);
            if !sample.in_bounds() {
                break;
            }
            mark(sample);
            if !level.is_walkable(sample) {
                break;
            }
            cx += dx;
            cy += dy;
        }

        angle += FOV_STEP_DEGREES;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Tile;

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
    fn test_viewer_tile_is_visible() {
        let level = open_level();
        let pos = Position::new(40, 20);
        let visible = compute_visible(pos, &level);
        assert!(visible[20][40]);
    }

    #[test]
    fn test_visibility_bounded_by_radius() {
        let level = open_level();
        let pos = Position::new(40, 20);
        let visible = compute_visible(pos, &level);

        // A tile well beyond the 8-tile radius is never revealed.
        assert!(!visible[20][55]);
        assert!(!visible[35][40]);
        // A near tile on an axis-aligned ray is.
        assert!(visible[20][44]);
    }

    #[test]
    fn test_ray_includes_first_wall_then_stops() {
        let mut level = open_level();
        // Solid vertical wall two tiles east of the viewer.
        for y in 0..MAP_HEIGHT {
            level.set_tile(Position::new(42, y), Tile::wall());
        }
        let visible = compute_visible(Position::new(40, 20), &level);

        assert!(visible[20][41]);
        // The wall itself is revealed...
        assert!(visible[20][42]);
        // ...but nothing behind it on that row.
        assert!(!visible[20][43]);
        assert!(!visible[20][44]);
    }

    #[test]
    fn test_mask_dimensions() {
        let level = open_level();
        let visible = compute_visible(Position::new(1, 1), &level);
        assert_eq!(visible.len(), MAP_HEIGHT as usize);
        assert!(visible.iter().all(|row| row.len() == MAP_WIDTH as usize));
    }
}
