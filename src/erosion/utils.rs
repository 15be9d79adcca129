//! Bilinear sampling, gradients, and brush helpers for the erosion passes.
//!
//! Adapted from the teacher's `erosion::utils`: the teacher wraps the x axis
//! because its `Tilemap` represents an equirectangular planet strip. This
//! grid is a flat bounded region, so every axis here clamps instead of
//! wrapping, same as [`crate::grid::Grid`] itself.

use crate::grid::Grid;

/// Bilinearly sample height at a floating-point position, clamped to the
/// grid bounds on both axes.
pub fn height_at(grid: &Grid, x: f32, y: f32) -> f32 {
    let (x0, y0, x1, y1, fx, fy) = sample_corners(grid, x, y);

    let h00 = grid.height[grid.idx(x0, y0)];
    let h10 = grid.height[grid.idx(x1, y0)];
    let h01 = grid.height[grid.idx(x0, y1)];
    let h11 = grid.height[grid.idx(x1, y1)];

    let h0 = h00 * (1.0 - fx) + h10 * fx;
    let h1 = h01 * (1.0 - fx) + h11 * fx;
    h0 * (1.0 - fy) + h1 * fy
}

/// Bilinearly interpolated gradient pointing toward steepest ascent.
pub fn gradient_at(grid: &Grid, x: f32, y: f32) -> (f32, f32) {
    let (x0, y0, x1, y1, fx, fy) = sample_corners(grid, x, y);

    let h00 = grid.height[grid.idx(x0, y0)];
    let h10 = grid.height[grid.idx(x1, y0)];
    let h01 = grid.height[grid.idx(x0, y1)];
    let h11 = grid.height[grid.idx(x1, y1)];

    let gx0 = h10 - h00;
    let gx1 = h11 - h01;
    let grad_x = gx0 * (1.0 - fy) + gx1 * fy;

    let gy0 = h01 - h00;
    let gy1 = h11 - h10;
    let grad_y = gy0 * (1.0 - fx) + gy1 * fx;

    (grad_x, grad_y)
}

fn sample_corners(grid: &Grid, x: f32, y: f32) -> (usize, usize, usize, usize, f32, f32) {
    let max_x = (grid.cols - 1) as f32;
    let max_y = (grid.rows - 1) as f32;
    let x = x.clamp(0.0, max_x);
    let y = y.clamp(0.0, max_y);

    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;
    let x1 = (x0 + 1).min(grid.cols - 1);
    let y1 = (y0 + 1).min(grid.rows - 1);

    (x0, y0, x1, y1, x.fract(), y.fract())
}

/// Central-difference gradient at an integer cell, clamped at the edges.
pub fn gradient_at_cell(grid: &Grid, x: usize, y: usize) -> (f32, f32) {
    let left = if x == 0 { 0 } else { x - 1 };
    let right = (x + 1).min(grid.cols - 1);
    let grad_x = (grid.height_at(right, y) - grid.height_at(left, y)) / 2.0;

    let down = if y == 0 { 0 } else { y - 1 };
    let up = (y + 1).min(grid.rows - 1);
    let grad_y = (grid.height_at(x, up) - grid.height_at(x, down)) / 2.0;

    (grad_x, grad_y)
}

/// A circular brush with Gaussian-like falloff, weights normalized to sum to
/// one. Matches `erosion::utils::create_erosion_brush`.
pub fn create_erosion_brush(radius: usize) -> Vec<(i32, i32, f32)> {
    let mut brush = Vec::new();
    let r = radius as i32;
    let r_sq = (r * r).max(1) as f32;
    let mut total_weight = 0.0;

    for dy in -r..=r {
        for dx in -r..=r {
            let dist_sq = (dx * dx + dy * dy) as f32;
            if dist_sq <= r_sq {
                let weight = (1.0 - dist_sq / r_sq).max(0.0);
                brush.push((dx, dy, weight));
                total_weight += weight;
            }
        }
    }

    if total_weight > 0.0 {
        for (_, _, w) in brush.iter_mut() {
            *w /= total_weight;
        }
    }

    brush
}

/// Box blur over the height field, clamped at the edges. Used for the
/// post-erosion detail smoothing pass.
pub fn smooth_heights(grid: &Grid, radius: usize) -> Vec<f32> {
    let r = radius as i32;
    let mut result = vec![0.0f32; grid.height.len()];

    for y in 0..grid.rows {
        for x in 0..grid.cols {
            let mut sum = 0.0;
            let mut count = 0.0;
            for dy in -r..=r {
                for dx in -r..=r {
                    let nx = (x as i32 + dx).clamp(0, grid.cols as i32 - 1) as usize;
                    let ny = (y as i32 + dy).clamp(0, grid.rows as i32 - 1) as usize;
                    sum += grid.height_at(nx, ny);
                    count += 1.0;
                }
            }
            result[grid.idx(x, y)] = sum / count;
        }
    }

    result
}
