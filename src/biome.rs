//! Biome profile table.
//!
//! Generalizes the teacher's `TerrainParams` (`heightmap.rs`, a single
//! hand-picked parameter set) into one profile per supported biome, the way
//! `erosion::ErosionPreset` (`erosion/params.rs`) supplies several named
//! presets over one parameter struct.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Biome {
    Plains,
    Hills,
    Mountain,
    Desert,
    Canyon,
    Island,
    Coastal,
    Volcanic,
    Tundra,
    Forest,
    Custom,
}

impl Default for Biome {
    fn default() -> Self {
        Biome::Plains
    }
}

/// Per-biome fractal and composition parameters feeding the base heightfield
/// synthesizer (`noise_field.rs`).
#[derive(Clone, Debug, PartialEq)]
pub struct BiomeProfile {
    pub noise_scale: f64,
    pub octaves: u32,
    pub persistence: f64,
    pub lacunarity: f64,
    pub ridge_strength: f32,
    pub warp_strength: f64,
    pub billow_strength: f32,
    pub voronoi_strength: f32,
    pub sea_level_fraction: f32,
    pub height_scale: f32,
    pub plains_flat: f32,
    pub mountain_density: f32,
    pub cluster_size: f32,
}

impl BiomeProfile {
    pub fn for_biome(biome: Biome) -> Self {
        match biome {
            Biome::Plains => Self {
                noise_scale: 0.01,
                octaves: 4,
                persistence: 0.45,
                lacunarity: 2.0,
                ridge_strength: 0.05,
                warp_strength: 0.1,
                billow_strength: 0.0,
                voronoi_strength: 0.0,
                sea_level_fraction: 0.3,
                height_scale: 6.0,
                plains_flat: 0.6,
                mountain_density: 0.05,
                cluster_size: 0.2,
            },
            Biome::Hills => Self {
                noise_scale: 0.015,
                octaves: 5,
                persistence: 0.5,
                lacunarity: 2.0,
                ridge_strength: 0.25,
                warp_strength: 0.2,
                billow_strength: 0.1,
                voronoi_strength: 0.0,
                sea_level_fraction: 0.25,
                height_scale: 10.0,
                plains_flat: 0.25,
                mountain_density: 0.2,
                cluster_size: 0.3,
            },
            Biome::Mountain => Self {
                noise_scale: 0.02,
                octaves: 6,
                persistence: 0.55,
                lacunarity: 2.1,
                ridge_strength: 0.75,
                warp_strength: 0.3,
                billow_strength: 0.05,
                voronoi_strength: 0.0,
                sea_level_fraction: 0.15,
                height_scale: 18.0,
                plains_flat: 0.05,
                mountain_density: 0.6,
                cluster_size: 0.4,
            },
            Biome::Desert => Self {
                noise_scale: 0.012,
                octaves: 4,
                persistence: 0.4,
                lacunarity: 2.0,
                ridge_strength: 0.1,
                warp_strength: 0.35,
                billow_strength: 0.4,
                voronoi_strength: 0.0,
                sea_level_fraction: 0.1,
                height_scale: 7.0,
                plains_flat: 0.4,
                mountain_density: 0.1,
                cluster_size: 0.25,
            },
            Biome::Canyon => Self {
                noise_scale: 0.018,
                octaves: 5,
                persistence: 0.5,
                lacunarity: 2.2,
                ridge_strength: 0.6,
                warp_strength: 0.15,
                billow_strength: 0.0,
                voronoi_strength: 0.5,
                sea_level_fraction: 0.2,
                height_scale: 14.0,
                plains_flat: 0.1,
                mountain_density: 0.3,
                cluster_size: 0.15,
            },
            Biome::Island => Self {
                noise_scale: 0.014,
                octaves: 5,
                persistence: 0.48,
                lacunarity: 2.0,
                ridge_strength: 0.2,
                warp_strength: 0.25,
                billow_strength: 0.2,
                voronoi_strength: 0.3,
                sea_level_fraction: 0.55,
                height_scale: 9.0,
                plains_flat: 0.3,
                mountain_density: 0.2,
                cluster_size: 0.35,
            },
            Biome::Coastal => Self {
                noise_scale: 0.013,
                octaves: 4,
                persistence: 0.45,
                lacunarity: 2.0,
                ridge_strength: 0.1,
                warp_strength: 0.2,
                billow_strength: 0.1,
                voronoi_strength: 0.0,
                sea_level_fraction: 0.4,
                height_scale: 6.5,
                plains_flat: 0.45,
                mountain_density: 0.08,
                cluster_size: 0.2,
            },
            Biome::Volcanic => Self {
                noise_scale: 0.016,
                octaves: 5,
                persistence: 0.5,
                lacunarity: 2.1,
                ridge_strength: 0.5,
                warp_strength: 0.2,
                billow_strength: 0.5,
                voronoi_strength: 0.4,
                sea_level_fraction: 0.3,
                height_scale: 16.0,
                plains_flat: 0.1,
                mountain_density: 0.45,
                cluster_size: 0.15,
            },
            Biome::Tundra => Self {
                noise_scale: 0.011,
                octaves: 4,
                persistence: 0.4,
                lacunarity: 2.0,
                ridge_strength: 0.15,
                warp_strength: 0.1,
                billow_strength: 0.0,
                voronoi_strength: 0.0,
                sea_level_fraction: 0.2,
                height_scale: 5.5,
                plains_flat: 0.5,
                mountain_density: 0.1,
                cluster_size: 0.2,
            },
            Biome::Forest => Self {
                noise_scale: 0.013,
                octaves: 5,
                persistence: 0.48,
                lacunarity: 2.0,
                ridge_strength: 0.2,
                warp_strength: 0.15,
                billow_strength: 0.1,
                voronoi_strength: 0.0,
                sea_level_fraction: 0.25,
                height_scale: 8.0,
                plains_flat: 0.35,
                mountain_density: 0.15,
                cluster_size: 0.25,
            },
            Biome::Custom => Self::for_biome(Biome::Plains),
        }
    }
}
