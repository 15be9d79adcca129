//! Terrain-aware grid A*, 8-directional movement.
//!
//! Grounded on the teacher's `structures::generation::roads::find_road_path`
//! and `PathNode`: a binary-heap open set keyed by a reversed `Ord` so
//! `BinaryHeap` (a max-heap) behaves like the min-heap the algorithm needs,
//! with stale entries skipped on pop rather than supporting decrease-key.
//! `compute_road_cost` generalizes the teacher's cost function (water
//! crossing, underwater crossing, slope, road-reuse discount) to this
//! grid's flag set.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::config::RoadsConfig;
use crate::grid::{CellFlags, Grid};

#[derive(Debug, Clone, Copy, PartialEq)]
struct OpenEntry {
    cost: f32,
    x: usize,
    y: usize,
}

impl Eq for OpenEntry {}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so BinaryHeap (a max-heap) pops the lowest cost first.
        other.cost.partial_cmp(&self.cost).unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn heuristic(ax: usize, ay: usize, bx: usize, by: usize) -> f32 {
    let dx = (ax as f32 - bx as f32).abs();
    let dy = (ay as f32 - by as f32).abs();
    // Octile distance: exact for 8-directional movement with diagonal cost
    // sqrt(2), so it stays admissible.
    let (dmin, dmax) = if dx < dy { (dx, dy) } else { (dy, dx) };
    dmax - dmin + dmin * std::f32::consts::SQRT_2
}

/// Movement cost from `(fx, fy)` into `(tx, ty)`: a base unit cost (√2 for
/// diagonals), penalized for water/underwater crossings, steep slope, and
/// level crossings (spec.md §4.6 step 2 — ×3 for any level change, an
/// additional ×10 for a jump of more than one level unless the target is
/// already a ramp cell), discounted for cells a road already occupies (so
/// paths that converge tend to merge rather than run in parallel).
///
/// "The current path's working level" (§4.6) is approximated here as the
/// level of the cell being stepped from, consistent with this function
/// otherwise only looking at the two cells either side of the step.
fn step_cost(grid: &Grid, fx: usize, fy: usize, tx: usize, ty: usize, cfg: &RoadsConfig) -> f32 {
    let flags = grid.flags_at(tx, ty);
    if flags.has(CellFlags::BLOCKED) {
        return f32::INFINITY;
    }

    let diagonal = fx != tx && fy != ty;
    let mut cost = if diagonal { std::f32::consts::SQRT_2 } else { 1.0 };

    if flags.has(CellFlags::UNDERWATER) {
        cost += cfg.underwater_crossing_penalty;
    } else if flags.has(CellFlags::WATER) {
        cost += cfg.water_crossing_penalty;
    }

    let slope = (grid.height_at(tx, ty) - grid.height_at(fx, fy)).abs();
    cost += slope * cfg.slope_penalty_weight;

    let level_diff = (grid.level_at(tx, ty) as i16 - grid.level_at(fx, fy) as i16).unsigned_abs();
    if level_diff >= 1 {
        cost *= cfg.level_crossing_multiplier;
    }
    if level_diff > 1 && !flags.has(CellFlags::RAMP) {
        cost *= cfg.forbidden_level_jump_multiplier;
    }

    if flags.has(CellFlags::ROAD) {
        cost *= cfg.reuse_discount.max(0.01);
    }

    cost
}

/// Cell-visitation interval at which [`find_path_with_progress`] yields a
/// tick, per the specification's "every 4096 expansions" default.
pub const DEFAULT_PROGRESS_INTERVAL: usize = 4096;

/// Finds the lowest-cost path from `start` to `goal`, returning cell
/// coordinates from start to goal inclusive, or `None` if the goal is
/// unreachable (disconnected by water or grid bounds).
pub fn find_path(
    grid: &Grid,
    cfg: &RoadsConfig,
    start: (usize, usize),
    goal: (usize, usize),
) -> Option<Vec<(usize, usize)>> {
    find_path_with_progress(grid, cfg, start, goal, DEFAULT_PROGRESS_INTERVAL, || true)
}

/// Same search as [`find_path`], but calls `on_tick` every
/// `progress_interval` expansions so a long-running search on a large grid
/// can report progress or observe cancellation; returning `false` from
/// `on_tick` aborts the search early (treated the same as "no path found").
pub fn find_path_with_progress(
    grid: &Grid,
    cfg: &RoadsConfig,
    start: (usize, usize),
    goal: (usize, usize),
    progress_interval: usize,
    mut on_tick: impl FnMut() -> bool,
) -> Option<Vec<(usize, usize)>> {
    let mut open = BinaryHeap::new();
    let mut best_cost: HashMap<(usize, usize), f32> = HashMap::new();
    let mut came_from: HashMap<(usize, usize), (usize, usize)> = HashMap::new();
    let mut expansions = 0usize;

    open.push(OpenEntry { cost: heuristic(start.0, start.1, goal.0, goal.1), x: start.0, y: start.1 });
    best_cost.insert(start, 0.0);

    while let Some(OpenEntry { x, y, .. }) = open.pop() {
        if (x, y) == goal {
            return Some(reconstruct(&came_from, start, goal));
        }

        expansions += 1;
        if progress_interval > 0 && expansions % progress_interval == 0 && !on_tick() {
            return None;
        }

        let g = *best_cost.get(&(x, y)).unwrap_or(&f32::MAX);

        for (nx, ny) in grid.neighbors8(x, y) {
            let tentative = g + step_cost(grid, x, y, nx, ny, cfg);
            if tentative < *best_cost.get(&(nx, ny)).unwrap_or(&f32::MAX) {
                best_cost.insert((nx, ny), tentative);
                came_from.insert((nx, ny), (x, y));
                let priority = tentative + heuristic(nx, ny, goal.0, goal.1);
                open.push(OpenEntry { cost: priority, x: nx, y: ny });
            }
        }
    }

    None
}

fn reconstruct(
    came_from: &HashMap<(usize, usize), (usize, usize)>,
    start: (usize, usize),
    goal: (usize, usize),
) -> Vec<(usize, usize)> {
    let mut path = vec![goal];
    let mut current = goal;
    while current != start {
        current = came_from[&current];
        path.push(current);
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_a_path_across_flat_terrain() {
        let g = Grid::new(16, 16);
        let cfg = RoadsConfig::default();
        let path = find_path(&g, &cfg, (0, 0), (15, 15)).expect("path");
        assert_eq!(*path.first().unwrap(), (0, 0));
        assert_eq!(*path.last().unwrap(), (15, 15));
    }

    #[test]
    fn blocked_cells_are_impassable() {
        let mut g = Grid::new(5, 3);
        for x in 0..5 {
            g.flags_at_mut(x, 1).set(CellFlags::BLOCKED);
        }
        let cfg = RoadsConfig::default();
        assert!(find_path(&g, &cfg, (2, 0), (2, 2)).is_none());
    }

    #[test]
    fn path_avoids_underwater_when_land_route_exists() {
        let mut g = Grid::new(10, 3);
        for x in 0..10 {
            g.flags_at_mut(x, 1).set(CellFlags::UNDERWATER);
        }
        let cfg = RoadsConfig::default();
        let path = find_path(&g, &cfg, (0, 0), (9, 0)).expect("path");
        assert!(path.iter().all(|&(_, y)| y != 1));
    }

    #[test]
    fn progress_callback_is_invoked_on_a_large_search() {
        let g = Grid::new(80, 80);
        let cfg = RoadsConfig::default();
        let mut ticks = 0u32;
        let path = find_path_with_progress(&g, &cfg, (0, 0), (79, 79), 16, || {
            ticks += 1;
            true
        });
        assert!(path.is_some());
        assert!(ticks > 0);
    }

    #[test]
    fn aborting_via_progress_callback_stops_the_search() {
        let g = Grid::new(80, 80);
        let cfg = RoadsConfig::default();
        let path = find_path_with_progress(&g, &cfg, (0, 0), (79, 79), 1, || false);
        assert!(path.is_none());
    }

    #[test]
    fn step_cost_penalizes_any_level_crossing() {
        let mut g = Grid::new(2, 1);
        g.level_id[0] = 0;
        g.level_id[1] = 1;
        let cfg = RoadsConfig::default();
        let flat = step_cost(&g, 0, 0, 0, 0, &cfg);
        let crossing = step_cost(&g, 0, 0, 1, 0, &cfg);
        assert!(crossing > flat * cfg.level_crossing_multiplier - 1e-3);
    }

    #[test]
    fn step_cost_stacks_the_forbidden_jump_multiplier_for_a_two_level_step() {
        let mut g = Grid::new(2, 1);
        g.level_id[0] = 0;
        g.level_id[1] = 2;
        let cfg = RoadsConfig::default();
        let one_level = {
            let mut g1 = g.clone();
            g1.level_id[1] = 1;
            step_cost(&g1, 0, 0, 1, 0, &cfg)
        };
        let two_level = step_cost(&g, 0, 0, 1, 0, &cfg);
        assert!(two_level > one_level * cfg.forbidden_level_jump_multiplier - 1e-3);
    }

    #[test]
    fn step_cost_exempts_ramp_cells_from_the_forbidden_jump_multiplier() {
        let mut g = Grid::new(2, 1);
        g.level_id[0] = 0;
        g.level_id[1] = 2;
        g.flags_at_mut(1, 0).set(CellFlags::RAMP);
        let cfg = RoadsConfig::default();
        let ramped = step_cost(&g, 0, 0, 1, 0, &cfg);

        let mut plain = g.clone();
        plain.flags_at_mut(1, 0).clear(CellFlags::RAMP);
        let not_ramped = step_cost(&plain, 0, 0, 1, 0, &cfg);

        assert!(ramped < not_ramped);
    }

    #[test]
    fn path_routes_around_a_multi_level_jump_when_a_flat_detour_exists() {
        let mut g = Grid::new(5, 5);
        // A two-level ridge blocking the middle columns of the middle row,
        // but column 0 stays flat the whole way down.
        for x in 1..4 {
            g.level_id[g.idx(x, 2)] = 2;
        }
        let cfg = RoadsConfig::default();
        let path = find_path(&g, &cfg, (2, 0), (2, 4)).expect("path");
        // The ×10 forbidden-jump multiplier should push the path around via
        // column 0 or 4 rather than straight through the ridge.
        assert!(!path.iter().any(|&(x, y)| y == 2 && (1..4).contains(&x)));
    }

    #[test]
    fn reusing_an_existing_road_is_cheaper() {
        let mut g = Grid::new(10, 3);
        for x in 0..10 {
            g.flags_at_mut(x, 1).set(CellFlags::ROAD);
        }
        let cfg = RoadsConfig::default();
        let path = find_path(&g, &cfg, (0, 1), (9, 1)).expect("path");
        // With the whole row already a road, the cheapest path stays on it.
        assert!(path.iter().all(|&(_, y)| y == 1));
    }
}
