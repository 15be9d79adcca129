//! Base heightfield synthesis: fractal Brownian motion, ridged and billow
//! variants, domain warping, and an optional Voronoi component, blended per
//! the active [`BiomeProfile`].
//!
//! Grounded on the teacher's `heightmap::fbm`, `heightmap::generate_ridges`
//! and `heightmap::apply_domain_warp`, generalized from a single hardcoded
//! `TerrainParams` into a function of [`NoiseConfig`] and [`BiomeProfile`],
//! and parallelized row-wise with `rayon` the same way
//! `erosion::hydraulic::simulate` parallelizes its droplet batches.

use noise::{NoiseFn, Perlin, Seedable};
use rayon::prelude::*;

use crate::biome::BiomeProfile;
use crate::config::NoiseConfig;
use crate::grid::Grid;
use crate::prng::derive_seed;

/// Fractal Brownian motion at a single point, matching the teacher's
/// `fbm()`: successive octaves of Perlin noise at doubling (× lacunarity)
/// frequency and halving (× persistence) amplitude, normalized by the
/// maximum possible amplitude sum so the result stays in roughly [-1, 1].
fn fbm(perlin: &Perlin, x: f64, y: f64, octaves: u32, persistence: f64, lacunarity: f64) -> f64 {
    let mut total = 0.0;
    let mut frequency = 1.0;
    let mut amplitude = 1.0;
    let mut max_amplitude = 0.0;

    for _ in 0..octaves {
        total += perlin.get([x * frequency, y * frequency]) * amplitude;
        max_amplitude += amplitude;
        amplitude *= persistence;
        frequency *= lacunarity;
    }

    if max_amplitude > 0.0 {
        total / max_amplitude
    } else {
        0.0
    }
}

/// Ridged noise: fold each octave's raw value around zero so valleys become
/// sharp ridges. Mirrors `heightmap::generate_ridges`.
fn ridged(perlin: &Perlin, x: f64, y: f64, octaves: u32, persistence: f64, lacunarity: f64) -> f64 {
    let mut total = 0.0;
    let mut frequency = 1.0;
    let mut amplitude = 1.0;
    let mut max_amplitude = 0.0;

    for _ in 0..octaves {
        let sample = perlin.get([x * frequency, y * frequency]);
        let ridge = 1.0 - sample.abs();
        total += ridge * ridge * amplitude;
        max_amplitude += amplitude;
        amplitude *= persistence;
        frequency *= lacunarity;
    }

    if max_amplitude > 0.0 {
        (total / max_amplitude) * 2.0 - 1.0
    } else {
        0.0
    }
}

/// Billow noise: like fbm but each octave is rectified, producing rounded
/// bumps instead of smooth rolling hills.
fn billow(perlin: &Perlin, x: f64, y: f64, octaves: u32, persistence: f64, lacunarity: f64) -> f64 {
    let mut total = 0.0;
    let mut frequency = 1.0;
    let mut amplitude = 1.0;
    let mut max_amplitude = 0.0;

    for _ in 0..octaves {
        let sample = perlin.get([x * frequency, y * frequency]).abs();
        total += sample * amplitude;
        max_amplitude += amplitude;
        amplitude *= persistence;
        frequency *= lacunarity;
    }

    if max_amplitude > 0.0 {
        (total / max_amplitude) * 2.0 - 1.0
    } else {
        0.0
    }
}

/// A coarse Voronoi cell-distance field used sparingly as an accent layer
/// (canyon walls, volcanic caldera rims). Not part of the teacher's
/// `heightmap.rs`; this one is grounded on the worldgen Voronoi scatter
/// pattern from `other_examples/` (jittered lattice, nearest of the 9
/// candidate cell centers).
fn voronoi(seed: u64, x: f64, y: f64, cell_size: f64) -> f64 {
    let cx = (x / cell_size).floor() as i64;
    let cy = (y / cell_size).floor() as i64;
    let mut best = f64::MAX;

    for dy in -1..=1 {
        for dx in -1..=1 {
            let gx = cx + dx;
            let gy = cy + dy;
            let jitter_x = hash01(seed, gx, gy, 0) * cell_size;
            let jitter_y = hash01(seed, gx, gy, 1) * cell_size;
            let px = gx as f64 * cell_size + jitter_x;
            let py = gy as f64 * cell_size + jitter_y;
            let d = ((px - x).powi(2) + (py - y).powi(2)).sqrt();
            if d < best {
                best = d;
            }
        }
    }

    (best / cell_size).min(1.0)
}

fn hash01(seed: u64, x: i64, y: i64, salt: u64) -> f64 {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};
    let mut hasher = DefaultHasher::new();
    (seed, x, y, salt).hash(&mut hasher);
    (hasher.finish() as f64 / u64::MAX as f64).fract()
}

/// Domain warping: displaces each sample coordinate by a separate low
/// frequency noise field before the main synthesis, matching
/// `heightmap::apply_domain_warp`. Breaks up the axis-aligned look a raw
/// fbm field tends to have.
fn warp_offset(warp_perlin: &Perlin, x: f64, y: f64, strength: f64) -> (f64, f64) {
    let wx = warp_perlin.get([x * 0.5, y * 0.5]) * strength;
    let wy = warp_perlin.get([x * 0.5 + 31.7, y * 0.5 + 31.7]) * strength;
    (wx, wy)
}

/// Synthesizes the base heightfield into `grid.height`, combining fbm,
/// optional ridged/billow/voronoi components per the noise config and the
/// active biome's blend weights. Row-parallel: each row depends only on its
/// own `(x, y)` coordinates, so there is no cross-row state to serialize.
pub fn synthesize(grid: &mut Grid, master_seed: u64, noise: &NoiseConfig, biome: &BiomeProfile) {
    let base_seed = derive_seed(master_seed, "noise:base") as u32;
    let warp_seed = derive_seed(master_seed, "noise:warp") as u32;
    let ridge_seed = derive_seed(master_seed, "noise:ridge") as u32;
    let billow_seed = derive_seed(master_seed, "noise:billow") as u32;
    let voronoi_seed = derive_seed(master_seed, "noise:voronoi");

    let base = Perlin::new(0).set_seed(base_seed);
    let warp = Perlin::new(0).set_seed(warp_seed);
    let ridge = Perlin::new(0).set_seed(ridge_seed);
    let bill = Perlin::new(0).set_seed(billow_seed);

    let cols = grid.cols;

    grid.height
        .par_chunks_mut(cols)
        .enumerate()
        .for_each(|(y, row)| {
            for x in 0..cols {
                let (wx, wy) = if noise.warp_enabled {
                    warp_offset(&warp, x as f64 * noise.base_frequency, y as f64 * noise.base_frequency, noise.warp_strength)
                } else {
                    (0.0, 0.0)
                };

                let sx = x as f64 * noise.base_frequency + wx;
                let sy = y as f64 * noise.base_frequency + wy;

                let mut h = fbm(&base, sx, sy, noise.octaves, noise.persistence, noise.lacunarity) as f32;

                if noise.ridged_enabled && biome.ridge_strength > 0.0 {
                    let r = ridged(&ridge, sx, sy, noise.octaves, noise.persistence, noise.lacunarity) as f32;
                    h = h * (1.0 - biome.ridge_strength) + r * biome.ridge_strength;
                }

                if noise.billow_enabled && biome.billow_strength > 0.0 {
                    let b = billow(&bill, sx * 1.7, sy * 1.7, noise.octaves.min(4), noise.persistence, noise.lacunarity) as f32;
                    h = h * (1.0 - biome.billow_strength) + b * biome.billow_strength;
                }

                if noise.voronoi_enabled && biome.voronoi_strength > 0.0 {
                    let v = voronoi(voronoi_seed, x as f64, y as f64, 1.0 / noise.base_frequency.max(1e-6) * 0.25) as f32;
                    h = h * (1.0 - biome.voronoi_strength) + (v * 2.0 - 1.0) * biome.voronoi_strength;
                }

                row[x] = h;
            }
        });

    normalize(grid, biome);
}

/// Rescale the raw [-1, 1]-ish field into world-space elevation using the
/// biome's height scale, and flatten values near the center toward the
/// biome's plains fraction, matching `heightmap::normalize_heightmap`'s
/// two-pass rescale-then-flatten shape.
fn normalize(grid: &mut Grid, biome: &BiomeProfile) {
    let (mut min, mut max) = (f32::MAX, f32::MIN);
    for &h in &grid.height {
        min = min.min(h);
        max = max.max(h);
    }
    let range = (max - min).max(1e-6);

    for h in grid.height.iter_mut() {
        let mut t = (*h - min) / range; // 0..1
        if biome.plains_flat > 0.0 {
            let center = 0.5;
            let pulled = center + (t - center) * (1.0 - biome.plains_flat);
            t = t * (1.0 - biome.plains_flat * 0.5) + pulled * (biome.plains_flat * 0.5);
        }
        *h = (t * 2.0 - 1.0) * biome.height_scale;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome::Biome;
    use crate::config::NoiseConfig;

    #[test]
    fn synthesis_is_deterministic_for_same_seed() {
        let noise = NoiseConfig::default();
        let biome = BiomeProfile::for_biome(Biome::Hills);

        let mut a = Grid::new(32, 32);
        synthesize(&mut a, 123, &noise, &biome);
        let mut b = Grid::new(32, 32);
        synthesize(&mut b, 123, &noise, &biome);

        assert_eq!(a.height, b.height);
    }

    #[test]
    fn different_seeds_diverge() {
        let noise = NoiseConfig::default();
        let biome = BiomeProfile::for_biome(Biome::Hills);

        let mut a = Grid::new(32, 32);
        synthesize(&mut a, 1, &noise, &biome);
        let mut b = Grid::new(32, 32);
        synthesize(&mut b, 2, &noise, &biome);

        assert_ne!(a.height, b.height);
    }

    #[test]
    fn output_respects_biome_height_scale() {
        let noise = NoiseConfig::default();
        let biome = BiomeProfile::for_biome(Biome::Mountain);

        let mut grid = Grid::new(48, 48);
        synthesize(&mut grid, 7, &noise, &biome);

        for &h in &grid.height {
            assert!(h.abs() <= biome.height_scale + 1e-3);
        }
    }

    #[test]
    fn mountain_profile_has_more_relief_than_plains() {
        let noise = NoiseConfig::default();
        let mountain_biome = BiomeProfile::for_biome(Biome::Mountain);
        let plains_biome = BiomeProfile::for_biome(Biome::Plains);

        let mut mountain = Grid::new(64, 64);
        synthesize(&mut mountain, 42, &noise, &mountain_biome);
        let mut plains = Grid::new(64, 64);
        synthesize(&mut plains, 42, &noise, &plains_biome);

        let std_dev = |g: &Grid| {
            let mean: f32 = g.height.iter().sum::<f32>() / g.height.len() as f32;
            let var: f32 = g.height.iter().map(|h| (h - mean).powi(2)).sum::<f32>() / g.height.len() as f32;
            var.sqrt()
        };

        assert!(std_dev(&mountain) > std_dev(&plains));
    }
}
