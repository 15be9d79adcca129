//! Road width dilation and banded smoothing.
//!
//! Dilation mirrors the teacher's `structures::generation::roads::render_road`
//! (mark every cell within the configured width of the spine). Smoothing
//! reuses the weighted-kernel blur idiom from `heightmap::smooth_heightmap`,
//! restricted to a band around the spine so it levels out the seam between
//! road and terrain without disturbing height elsewhere.

use crate::grid::{CellFlags, Grid};

/// Marks every cell within `width / 2` of any spine cell as a road, tagged
/// with `road_id`.
pub fn dilate(grid: &mut Grid, spine: &[(usize, usize)], width: f32, road_id: u32) {
    let radius = (width / 2.0).ceil() as i64;

    for &(sx, sy) in spine {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if (dx * dx + dy * dy) as f32 > (width / 2.0).powi(2) {
                    continue;
                }
                let nx = sx as i64 + dx;
                let ny = sy as i64 + dy;
                if !grid.in_bounds(nx, ny) {
                    continue;
                }
                let (nx, ny) = (nx as usize, ny as usize);
                let i = grid.idx(nx, ny);
                grid.flags[i].set(CellFlags::ROAD);
                grid.road_id[i] = Some(road_id);
            }
        }
    }
}

/// Weighted-kernel blur of the height field restricted to cells within
/// `band` of any spine cell, so the road bed and its shoulders settle into
/// a smooth grade instead of a jagged one cell wide.
pub fn smooth_band(grid: &mut Grid, spine: &[(usize, usize)], band: u32) {
    let band = band as i64;
    let mut touched = vec![false; grid.height.len()];
    for &(sx, sy) in spine {
        for dy in -band..=band {
            for dx in -band..=band {
                let nx = sx as i64 + dx;
                let ny = sy as i64 + dy;
                if grid.in_bounds(nx, ny) {
                    touched[grid.idx(nx as usize, ny as usize)] = true;
                }
            }
        }
    }

    let mut smoothed = grid.height.clone();
    for y in 0..grid.rows {
        for x in 0..grid.cols {
            let i = grid.idx(x, y);
            if !touched[i] {
                continue;
            }
            let mut sum = 0.0;
            let mut weight_sum = 0.0;
            for (nx, ny) in grid.neighbors8(x, y) {
                let w = 1.0;
                sum += grid.height_at(nx, ny) * w;
                weight_sum += w;
            }
            sum += grid.height_at(x, y) * 2.0;
            weight_sum += 2.0;
            smoothed[i] = sum / weight_sum;
        }
    }

    grid.height = smoothed;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dilate_marks_cells_within_radius() {
        let mut g = Grid::new(10, 10);
        dilate(&mut g, &[(5, 5)], 4.0, 1);
        assert!(g.flags_at(5, 5).has(CellFlags::ROAD));
        assert!(g.flags_at(6, 5).has(CellFlags::ROAD));
        assert_eq!(g.road_id[g.idx(5, 5)], Some(1));
    }

    #[test]
    fn dilate_does_not_touch_far_cells() {
        let mut g = Grid::new(20, 20);
        dilate(&mut g, &[(10, 10)], 2.0, 1);
        assert!(!g.flags_at(0, 0).has(CellFlags::ROAD));
    }

    #[test]
    fn smoothing_reduces_a_spike_near_the_spine() {
        let mut g = Grid::new(10, 10);
        g.set_height(5, 5, 100.0);
        smooth_band(&mut g, &[(5, 5)], 2);
        assert!(g.height_at(5, 5) < 100.0);
    }

    #[test]
    fn smoothing_leaves_distant_cells_untouched() {
        let mut g = Grid::new(20, 20);
        g.set_height(0, 0, 42.0);
        smooth_band(&mut g, &[(19, 19)], 1);
        assert_eq!(g.height_at(0, 0), 42.0);
    }
}
