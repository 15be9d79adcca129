//! Quantizes the continuous height field into discrete walkable levels and
//! assigns the water/underwater/playable/visual_only flags that depend on
//! that quantization.
//!
//! Not present in the teacher in this form — its closest analogue is
//! `zlevel.rs`'s z-level stacking for structure placement — but the
//! level/base-height relationship and the playable-vs-decorative split are
//! grounded on that module's idea of a fixed step height per level.

use crate::config::LevelsConfig;
use crate::grid::{CellFlags, Grid};

#[derive(Debug, Default, Clone, Copy)]
pub struct LevelStats {
    pub level_counts: [u64; 16],
    pub inaccessible_fraction: f32,
}

/// Quantizes every cell's height into `level_id = floor(height / max_step)`,
/// clamped to a representable `i8` range, then snaps the stored height to
/// that level's base height so later stages (ramps, cliffs) see a clean
/// step function rather than the noisy continuous field.
pub fn quantize(grid: &mut Grid, cfg: &LevelsConfig) {
    let max_step = cfg.max_step();

    for i in 0..grid.height.len() {
        let raw_level = (grid.height[i] / max_step).floor();
        let level = raw_level.clamp(i8::MIN as f32, i8::MAX as f32) as i8;
        grid.level_id[i] = level;
        grid.height[i] = level as f32 * max_step;
    }
}

/// Assigns WATER/UNDERWATER/PLAYABLE/VISUAL_ONLY flags from the now
/// quantized levels. Water is level <= 0 (sea level or below); underwater
/// additionally requires the level be strictly below sea level so the
/// shoreline itself is walkable. Visual-only is everything above
/// `max_walkable_level`; playable is everything else that is not water.
pub fn assign_flags(grid: &mut Grid, cfg: &LevelsConfig) -> LevelStats {
    let mut stats = LevelStats::default();
    let mut inaccessible = 0u64;
    let mut land = 0u64;

    for i in 0..grid.flags.len() {
        let level = grid.level_id[i];
        let flags = &mut grid.flags[i];

        let is_water = level <= 0;
        flags.assign(CellFlags::WATER, is_water);
        flags.assign(CellFlags::UNDERWATER, level < 0);

        let visual_only = level > cfg.max_walkable_level;
        flags.assign(CellFlags::VISUAL_ONLY, visual_only);
        flags.assign(CellFlags::PLAYABLE, !is_water && !visual_only);

        let bucket = (level.clamp(0, 15)) as usize;
        stats.level_counts[bucket] += 1;

        if !is_water {
            land += 1;
            if level >= cfg.inaccessible_min_level {
                inaccessible += 1;
            }
        }
    }

    stats.inaccessible_fraction = if land > 0 { inaccessible as f32 / land as f32 } else { 0.0 };
    stats
}

/// Marks `CLIFF` on every cell that sits on a 4-neighbour level jump not
/// already bridged by a ramp, so invariant I3 and property P3 hold without
/// relying on roads to have crossed every boundary. Must run after road
/// planning so ramp cells are already flagged and excluded.
pub fn mark_cliffs(grid: &mut Grid) {
    let mut to_flag = Vec::new();

    for y in 0..grid.rows {
        for x in 0..grid.cols {
            if grid.flags_at(x, y).has(CellFlags::RAMP) {
                continue;
            }
            let level = grid.level_at(x, y);
            for (nx, ny) in grid.neighbors4(x, y) {
                if grid.flags_at(nx, ny).has(CellFlags::RAMP) {
                    continue;
                }
                let nlevel = grid.level_at(nx, ny);
                if (level as i16 - nlevel as i16).abs() >= 1 {
                    to_flag.push((x, y));
                    break;
                }
            }
        }
    }

    for (x, y) in to_flag {
        grid.flags_at_mut(x, y).set(CellFlags::CLIFF);
    }
}
