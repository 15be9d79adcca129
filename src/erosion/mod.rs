//! Erosion stage orchestration: hydraulic and thermal passes plus
//! multi-scale surface detail, all respecting a protection mask so the
//! border band never gets carved into and future level/ramp construction
//! has a stable base to work from.
//!
//! Mirrors the way the teacher's `erosion::mod` wires `hydraulic::simulate`
//! and the thermal/glacial passes behind one `ErosionStats` summary, and the
//! way `erosion::params::ErosionParams` groups every pass's knobs under one
//! struct that the caller constructs once per run.

pub mod hydraulic;
pub mod thermal;
mod utils;

use noise::{NoiseFn, Perlin, Seedable};
use rand_chacha::ChaCha8Rng;

use crate::config::{Config, ErosionConfig};
use crate::grid::Grid;
use crate::prng::rng_for;

pub use hydraulic::HydraulicStats;
pub use thermal::ThermalStats;

#[derive(Debug, Default, Clone, Copy)]
pub struct ErosionStats {
    pub hydraulic: HydraulicStats,
    pub thermal: ThermalStats,
}

/// A mask of cells the erosion stage may not modify: the border band
/// (border.rs runs after erosion and needs a flat, predictable base) plus
/// any cell already flagged `BOUNDARY`. Passed down to both passes so
/// neither can quietly erase work another stage depends on.
pub fn protection_mask(grid: &Grid, band_width: u32) -> Vec<bool> {
    let band = band_width as i64;
    let mut mask = vec![false; grid.height.len()];
    for y in 0..grid.rows {
        for x in 0..grid.cols {
            let near_edge = (x as i64) < band
                || (y as i64) < band
                || (grid.cols as i64 - 1 - x as i64) < band
                || (grid.rows as i64 - 1 - y as i64) < band;
            if near_edge {
                mask[grid.idx(x, y)] = true;
            }
        }
    }
    mask
}

/// Adds macro/meso/micro fractal layers on top of the eroded field, scaled
/// by [`crate::config::DetailConfig`]'s per-band strengths. Generalizes the
/// teacher's `heightmap::smooth_heightmap` detail pass (there, a single
/// fixed-strength high-frequency layer) into three independently weighted
/// bands.
///
/// Each layer is modulated by `protection_mask` (protected cells get no
/// detail at all, per spec.md §4.2) and the combined delta on any
/// unprotected cell is clamped to ±0.5% of `max_step_height` so detail never
/// moves a cell enough to change its quantized level.
pub fn apply_detail(grid: &mut Grid, master_seed: u64, cfg: &Config, protection_mask: &[bool]) {
    let macro_noise = Perlin::new(1).set_seed(crate::prng::derive_seed(master_seed, "detail:macro") as u32);
    let meso_noise = Perlin::new(1).set_seed(crate::prng::derive_seed(master_seed, "detail:meso") as u32);
    let micro_noise = Perlin::new(1).set_seed(crate::prng::derive_seed(master_seed, "detail:micro") as u32);

    let freq = cfg.noise.base_frequency;
    let max_delta = 0.005 * cfg.levels.max_step();

    for y in 0..grid.rows {
        for x in 0..grid.cols {
            let i = grid.idx(x, y);
            if protection_mask[i] {
                continue;
            }

            let fx = x as f64;
            let fy = y as f64;
            let macro_v = macro_noise.get([fx * freq * 0.5, fy * freq * 0.5]) as f32;
            let meso_v = meso_noise.get([fx * freq * 3.0, fy * freq * 3.0]) as f32;
            let micro_v = micro_noise.get([fx * freq * 12.0, fy * freq * 12.0]) as f32;

            let delta = (macro_v * cfg.detail.macro_strength
                + meso_v * cfg.detail.meso_strength
                + micro_v * cfg.detail.micro_strength)
                .clamp(-max_delta, max_delta);
            grid.height[i] += delta;
        }
    }
}

/// Runs the hydraulic pass followed by the thermal pass, both honoring the
/// protection mask, then layers in surface detail.
pub fn run(grid: &mut Grid, master_seed: u64, cfg: &Config) -> ErosionStats {
    let mask = protection_mask(grid, cfg.border.band_width);
    let cols = grid.cols;
    let protected = |x: usize, y: usize| mask[y * cols + x];

    let mut stats = ErosionStats::default();

    if cfg.erosion.hydraulic_enabled {
        let mut rng: ChaCha8Rng = rng_for(master_seed, "erosion:hydraulic");
        stats.hydraulic = hydraulic::simulate(grid, &cfg.erosion, &mut rng, &protected);
    }

    if cfg.erosion.thermal_enabled {
        stats.thermal = thermal::simulate(grid, &cfg.erosion, &protected);
    }

    apply_detail(grid, master_seed, cfg, &mask);

    stats
}
