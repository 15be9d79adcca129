//! Talus-angle thermal erosion: loose material slides from a cell to its
//! lowest neighbor whenever the slope between them exceeds the configured
//! talus angle, until the terrain settles below that angle everywhere.
//!
//! Not present in the teacher (whose thermal-like behavior lives inside
//! `erosion::glacial`, out of scope here); grounded instead on the same
//! neighbor/gradient idiom as `erosion::utils::gradient_at_cell`, generalized
//! to the steepest-descent talus rule described in the specification.

use crate::config::ErosionConfig;
use crate::grid::Grid;

#[derive(Debug, Default, Clone, Copy)]
pub struct ThermalStats {
    pub total_moved: f64,
    pub iterations_run: u32,
}

pub fn simulate(
    grid: &mut Grid,
    cfg: &ErosionConfig,
    protected: &dyn Fn(usize, usize) -> bool,
) -> ThermalStats {
    let mut stats = ThermalStats::default();
    let talus = cfg.talus_angle;

    for _ in 0..cfg.thermal_iterations {
        let mut delta = vec![0.0f32; grid.height.len()];
        let mut moved_any = false;

        for y in 0..grid.rows {
            for x in 0..grid.cols {
                if protected(x, y) {
                    continue;
                }
                let h = grid.height_at(x, y);

                let mut lowest: Option<(usize, usize, f32)> = None;
                for (nx, ny) in grid.neighbors8(x, y) {
                    if protected(nx, ny) {
                        continue;
                    }
                    let nh = grid.height_at(nx, ny);
                    let drop = h - nh;
                    if drop > talus {
                        if lowest.map_or(true, |(_, _, best_drop)| drop > best_drop) {
                            lowest = Some((nx, ny, drop));
                        }
                    }
                }

                if let Some((nx, ny, drop)) = lowest {
                    let transfer = (drop - talus) * cfg.thermal_rate * 0.5;
                    if transfer > 0.0 {
                        let i = grid.idx(x, y);
                        let j = grid.idx(nx, ny);
                        delta[i] -= transfer;
                        delta[j] += transfer;
                        stats.total_moved += transfer as f64;
                        moved_any = true;
                    }
                }
            }
        }

        for (h, d) in grid.height.iter_mut().zip(delta.iter()) {
            *h += d;
        }
        stats.iterations_run += 1;

        if !moved_any {
            break;
        }
    }

    stats
}
