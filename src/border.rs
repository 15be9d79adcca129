//! Map border construction: a raised or depressed band around the playable
//! area with carved exit gaps, so the map edge reads as an intentional wall
//! rather than an abrupt cutoff.
//!
//! The distance-to-edge field is a breadth-first fill exactly like the
//! teacher's `heightmap::compute_continental_distance`/`compute_coast_distance`
//! (seed the frontier, relax outward one ring at a time with a `VecDeque`)
//! with the frontier seeded from the grid's outer ring instead of a plate
//! boundary.

use std::collections::VecDeque;

use crate::config::{BorderConfig, BorderType, LevelsConfig};
use crate::grid::{BoundaryType, CellFlags, Grid};

/// BFS distance in cells from the outer ring of the map, 8-connected, same
/// traversal as the teacher's plate-distance fields.
fn distance_from_edge(grid: &Grid) -> Vec<f32> {
    let mut distance = vec![f32::MAX; grid.height.len()];
    let mut queue: VecDeque<(usize, usize, f32)> = VecDeque::new();

    for y in 0..grid.rows {
        for x in 0..grid.cols {
            if x == 0 || y == 0 || x == grid.cols - 1 || y == grid.rows - 1 {
                let i = grid.idx(x, y);
                distance[i] = 0.0;
                queue.push_back((x, y, 0.0));
            }
        }
    }

    while let Some((x, y, dist)) = queue.pop_front() {
        for (nx, ny) in grid.neighbors8(x, y) {
            let new_dist = dist + 1.0;
            let i = grid.idx(nx, ny);
            if new_dist < distance[i] {
                distance[i] = new_dist;
                queue.push_back((nx, ny, new_dist));
            }
        }
    }

    distance
}

/// The positions of the exit gaps, evenly spaced around the perimeter.
/// Returned so `poi.rs` can pin an exit-flavored POI at each one.
pub fn exit_positions(grid: &Grid, cfg: &BorderConfig) -> Vec<(usize, usize)> {
    let perimeter_cells: Vec<(usize, usize)> = {
        let mut cells = Vec::new();
        for x in 0..grid.cols {
            cells.push((x, 0));
        }
        for y in 1..grid.rows {
            cells.push((grid.cols - 1, y));
        }
        for x in (0..grid.cols.saturating_sub(1)).rev() {
            cells.push((x, grid.rows - 1));
        }
        for y in (1..grid.rows.saturating_sub(1)).rev() {
            cells.push((0, y));
        }
        cells
    };

    if perimeter_cells.is_empty() {
        return Vec::new();
    }

    let n = cfg.exit_count as usize;
    let step = perimeter_cells.len() / n.max(1);
    (0..n).map(|i| perimeter_cells[(i * step).min(perimeter_cells.len() - 1)]).collect()
}

/// Raises (mountain/cliff) or lowers (water) the outer band of the map by
/// an amount that falls off linearly from the edge to the band's inner
/// boundary, then carves flat gaps through it at the exit positions so
/// roads have somewhere to leave the map. `border_type == None` skips the
/// elevation change and the `BLOCKED` flag entirely but still records
/// `boundary_type` so downstream masks can see where the band is.
///
/// Every band cell outside an exit gap is marked `BLOCKED`; `type == cliff`
/// additionally marks the band's inner edge `CLIFF` so the interior-facing
/// step reads as an impassable wall rather than a climbable slope.
///
/// Runs after `levels::quantize`/`assign_flags`, so a `Water` border
/// re-quantizes and re-flags the band cells it lowers: without this, the
/// ocean ring keeps the level/flags the interior pass assigned it before the
/// band was dropped, and S4's underwater ring never appears.
pub fn build(grid: &mut Grid, cfg: &BorderConfig, levels_cfg: &LevelsConfig) {
    if !cfg.enabled {
        return;
    }

    let distance = distance_from_edge(grid);
    let band_width = cfg.band_width as f32;
    let exits = exit_positions(grid, cfg);
    let gap_radius = (cfg.exit_gap_width as f32) / 2.0;
    let signed_elevation = match cfg.border_type {
        BorderType::Water => -cfg.elevation.abs(),
        BorderType::None => 0.0,
        BorderType::Mountain | BorderType::Cliff => cfg.elevation.abs(),
    };

    for y in 0..grid.rows {
        for x in 0..grid.cols {
            let i = grid.idx(x, y);
            let d = distance[i];
            if d >= band_width {
                continue;
            }

            let near_exit = exits.iter().any(|&(ex, ey)| {
                let dx = x as f32 - ex as f32;
                let dy = y as f32 - ey as f32;
                (dx * dx + dy * dy).sqrt() <= gap_radius
            });

            grid.flags[i].set(CellFlags::BOUNDARY);
            grid.boundary_type[i] = if matches!(cfg.border_type, BorderType::Water) {
                BoundaryType::Ocean
            } else if x == 0 || y == 0 || x == grid.cols - 1 || y == grid.rows - 1 {
                BoundaryType::Edge
            } else {
                BoundaryType::Interior
            };

            if near_exit {
                grid.boundary_type[i] = BoundaryType::Edge;
                continue;
            }

            grid.flags[i].set(CellFlags::BLOCKED);

            if cfg.border_type == BorderType::Cliff && d >= band_width - 1.0 {
                grid.flags[i].set(CellFlags::CLIFF);
            }

            let t = 1.0 - (d / band_width); // 1.0 at the outer edge, 0.0 at the band's inner boundary
            grid.height[i] += signed_elevation * t;

            if cfg.border_type == BorderType::Water {
                let max_step = levels_cfg.max_step();
                let raw_level = (grid.height[i] / max_step).floor();
                let level = raw_level.clamp(i8::MIN as f32, i8::MAX as f32) as i8;
                grid.level_id[i] = level;
                grid.height[i] = level as f32 * max_step;

                let is_water = level <= 0;
                grid.flags[i].assign(CellFlags::WATER, is_water);
                grid.flags[i].assign(CellFlags::UNDERWATER, level < 0);
                grid.flags[i].assign(CellFlags::PLAYABLE, false);
                grid.flags[i].assign(CellFlags::VISUAL_ONLY, false);
            }
        }
    }
}
