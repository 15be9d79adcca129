//! Point-of-interest placement: Bridson's Poisson-disk sampling over
//! playable cells, falling back to a jittered grid when the disk sampler
//! can't place enough points (a very constrained or mostly-water map).
//!
//! Not present in the teacher; grounded on the spawn-point rejection
//! sampling idiom already used in `erosion::hydraulic::spawn_at_high_elevation`
//! (try-N-candidates-then-fall-back), generalized from 1D elevation bias to
//! 2D minimum-spacing.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::config::DensityConfig;
use crate::grid::{CellFlags, Grid};
use crate::prng::rng_for;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoiKind {
    Settlement,
    Resource,
    Landmark,
    Exit,
}

#[derive(Debug, Clone, Copy)]
pub struct Poi {
    pub id: u32,
    pub x: usize,
    pub y: usize,
    pub level_id: i8,
    pub kind: PoiKind,
}

const BRIDSON_CANDIDATES_PER_POINT: u32 = 30;

/// Bridson's algorithm: maintain an active list of accepted points, and for
/// each, try several candidate points in the annulus `[r, 2r]` around it;
/// accept a candidate if it is at least `r` from every existing point.
fn poisson_disk(grid: &Grid, min_spacing: f32, target: usize, rng: &mut ChaCha8Rng) -> Vec<(usize, usize)> {
    let is_playable = |x: usize, y: usize| grid.flags_at(x, y).has(CellFlags::PLAYABLE);

    let mut points: Vec<(f32, f32)> = Vec::new();
    let mut active: Vec<usize> = Vec::new();

    for _ in 0..200 {
        let x = rng.gen_range(0.0..grid.cols as f32);
        let y = rng.gen_range(0.0..grid.rows as f32);
        if is_playable(x as usize, y as usize) {
            points.push((x, y));
            active.push(0);
            break;
        }
    }

    while !active.is_empty() && points.len() < target {
        let idx = rng.gen_range(0..active.len());
        let origin = points[active[idx]];
        let mut placed = false;

        for _ in 0..BRIDSON_CANDIDATES_PER_POINT {
            let angle = rng.gen_range(0.0..std::f32::consts::TAU);
            let radius = rng.gen_range(min_spacing..(min_spacing * 2.0));
            let cx = origin.0 + angle.cos() * radius;
            let cy = origin.1 + angle.sin() * radius;

            if cx < 0.0 || cy < 0.0 || cx >= grid.cols as f32 || cy >= grid.rows as f32 {
                continue;
            }
            if !is_playable(cx as usize, cy as usize) {
                continue;
            }
            if points.iter().all(|&(px, py)| {
                let dx = px - cx;
                let dy = py - cy;
                (dx * dx + dy * dy).sqrt() >= min_spacing
            }) {
                points.push((cx, cy));
                active.push(points.len() - 1);
                placed = true;
                break;
            }
        }

        if !placed {
            active.remove(idx);
        }
    }

    points.into_iter().map(|(x, y)| (x as usize, y as usize)).collect()
}

/// A jittered regular grid, used when Poisson-disk sampling alone cannot
/// reach the requested count (e.g. target spacing too large for the
/// playable area, or too little playable land).
fn jittered_grid(grid: &Grid, target: usize, rng: &mut ChaCha8Rng) -> Vec<(usize, usize)> {
    let is_playable = |x: usize, y: usize| grid.flags_at(x, y).has(CellFlags::PLAYABLE);
    let cells_per_side = (target as f32).sqrt().ceil().max(1.0) as usize;
    let step_x = (grid.cols / cells_per_side.max(1)).max(1);
    let step_y = (grid.rows / cells_per_side.max(1)).max(1);

    let mut points = Vec::new();
    let mut y = step_y / 2;
    while y < grid.rows && points.len() < target {
        let mut x = step_x / 2;
        while x < grid.cols && points.len() < target {
            let jx = (x as i64 + rng.gen_range(-(step_x as i64 / 2)..=(step_x as i64 / 2)))
                .clamp(0, grid.cols as i64 - 1) as usize;
            let jy = (y as i64 + rng.gen_range(-(step_y as i64 / 2)..=(step_y as i64 / 2)))
                .clamp(0, grid.rows as i64 - 1) as usize;
            if is_playable(jx, jy) {
                points.push((jx, jy));
            }
            x += step_x;
        }
        y += step_y;
    }

    points
}

/// Places POIs across the playable area and assigns each a kind per the
/// configured settlement/resource/landmark fractions. `forced_exits` are
/// positions the border builder has already carved gaps at; they are
/// always included as `PoiKind::Exit` ahead of the sampled interior points,
/// per the specification's "exit POIs are always included" constraint.
pub fn place(grid: &Grid, master_seed: u64, cfg: &DensityConfig, forced_exits: &[(usize, usize)]) -> Vec<Poi> {
    let mut rng: ChaCha8Rng = rng_for(master_seed, "poi:placement");

    let interior_target = cfg.poi_count as usize;
    let mut positions = poisson_disk(grid, cfg.poi_min_spacing, interior_target, &mut rng);
    if positions.len() < interior_target {
        let mut fallback = jittered_grid(grid, interior_target, &mut rng);
        positions.append(&mut fallback);
        positions.truncate(interior_target);
    }
    // Drop any interior sample that landed on (or too near) a forced exit so
    // the two sets stay disjoint.
    positions.retain(|&(x, y)| {
        forced_exits.iter().all(|&(ex, ey)| {
            let dx = x as f32 - ex as f32;
            let dy = y as f32 - ey as f32;
            (dx * dx + dy * dy).sqrt() >= cfg.poi_min_spacing
        })
    });

    let mut kind_rng: ChaCha8Rng = rng_for(master_seed, "poi:kind");
    // Ids are assigned in enumeration order (exits first, then interior
    // points) so they stay stable for the same seed, per the specification's
    // "POI enumeration order is sorted by id for determinism" ordering
    // guarantee.
    let mut next_id = 0u32;
    let mut pois: Vec<Poi> = forced_exits
        .iter()
        .map(|&(x, y)| {
            let id = next_id;
            next_id += 1;
            Poi { id, x, y, level_id: grid.level_at(x, y), kind: PoiKind::Exit }
        })
        .collect();

    pois.extend(positions.into_iter().map(|(x, y)| {
        let roll: f32 = kind_rng.gen();
        let kind = if roll < cfg.settlement_fraction {
            PoiKind::Settlement
        } else if roll < cfg.settlement_fraction + cfg.resource_fraction {
            PoiKind::Resource
        } else {
            PoiKind::Landmark
        };
        let id = next_id;
        next_id += 1;
        Poi { id, x, y, level_id: grid.level_at(x, y), kind }
    }));

    pois
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_playable_grid(n: usize) -> Grid {
        let mut g = Grid::new(n, n);
        for f in g.flags.iter_mut() {
            f.set(CellFlags::PLAYABLE);
        }
        g
    }

    #[test]
    fn places_pois_with_minimum_spacing() {
        let g = all_playable_grid(64);
        let cfg = DensityConfig { poi_count: 10, poi_min_spacing: 6.0, ..Default::default() };
        let pois = place(&g, 1, &cfg, &[]);
        for i in 0..pois.len() {
            for j in (i + 1)..pois.len() {
                let dx = pois[i].x as f32 - pois[j].x as f32;
                let dy = pois[i].y as f32 - pois[j].y as f32;
                assert!((dx * dx + dy * dy).sqrt() >= cfg.poi_min_spacing - 1e-3);
            }
        }
    }

    #[test]
    fn falls_back_to_jittered_grid_on_sparse_land() {
        let mut g = Grid::new(64, 64);
        for f in g.flags[..10].iter_mut() {
            f.set(CellFlags::PLAYABLE);
        }
        let cfg = DensityConfig { poi_count: 8, poi_min_spacing: 4.0, ..Default::default() };
        let pois = place(&g, 2, &cfg, &[]);
        assert!(pois.len() <= 8);
    }

    #[test]
    fn placement_is_deterministic() {
        let g = all_playable_grid(48);
        let cfg = DensityConfig::default();
        let a = place(&g, 77, &cfg, &[]);
        let b = place(&g, 77, &cfg, &[]);
        let a_pos: Vec<_> = a.iter().map(|p| (p.x, p.y)).collect();
        let b_pos: Vec<_> = b.iter().map(|p| (p.x, p.y)).collect();
        assert_eq!(a_pos, b_pos);
    }

    #[test]
    fn forced_exits_are_always_included_as_exit_pois() {
        let g = all_playable_grid(40);
        let cfg = DensityConfig { poi_count: 4, ..Default::default() };
        let exits = vec![(0, 20), (39, 20)];
        let pois = place(&g, 3, &cfg, &exits);
        let exit_pois: Vec<_> = pois.iter().filter(|p| p.kind == PoiKind::Exit).collect();
        assert_eq!(exit_pois.len(), 2);
        assert!(exit_pois.iter().any(|p| (p.x, p.y) == (0, 20)));
        assert!(exit_pois.iter().any(|p| (p.x, p.y) == (39, 20)));
    }
}
