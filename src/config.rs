//! Configuration tree for a generation run.
//!
//! Plays the role the teacher's `erosion::ErosionParams`/`TerrainParams`
//! pair plays for a single stage, but collects every stage's knobs under one
//! root so `Pipeline::run` takes a single argument. `Config::validate`
//! centralizes the range/consistency checks the teacher scatters as
//! `assert!`s through `main.rs`; here they become a single `Result` pass
//! returned before anything is allocated, per the specification's error
//! taxonomy.

use serde::{Deserialize, Serialize};

use crate::biome::Biome;
use crate::error::GenError;
use crate::roads::ramps::RampCurve;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    pub width: u32,
    pub height: u32,
    pub cell_size: f32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self { width: 512, height: 512, cell_size: 1.0 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoiseConfig {
    pub base_frequency: f64,
    pub octaves: u32,
    pub persistence: f64,
    pub lacunarity: f64,
    pub warp_enabled: bool,
    pub warp_strength: f64,
    pub ridged_enabled: bool,
    pub billow_enabled: bool,
    pub voronoi_enabled: bool,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            base_frequency: 0.01,
            octaves: 5,
            persistence: 0.5,
            lacunarity: 2.0,
            warp_enabled: true,
            warp_strength: 0.2,
            ridged_enabled: true,
            billow_enabled: false,
            voronoi_enabled: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErosionConfig {
    pub hydraulic_enabled: bool,
    pub hydraulic_iterations: u32,
    pub droplet_lifetime: u32,
    pub inertia: f32,
    pub erosion_rate: f32,
    pub deposition_rate: f32,
    pub evaporation_rate: f32,
    pub thermal_enabled: bool,
    pub thermal_iterations: u32,
    pub talus_angle: f32,
    pub thermal_rate: f32,
}

impl Default for ErosionConfig {
    fn default() -> Self {
        Self {
            hydraulic_enabled: true,
            hydraulic_iterations: 40_000,
            droplet_lifetime: 30,
            inertia: 0.05,
            erosion_rate: 0.3,
            deposition_rate: 0.3,
            evaporation_rate: 0.02,
            thermal_enabled: true,
            thermal_iterations: 25,
            talus_angle: 0.6,
            thermal_rate: 0.5,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetailConfig {
    pub macro_strength: f32,
    pub meso_strength: f32,
    pub micro_strength: f32,
}

impl Default for DetailConfig {
    fn default() -> Self {
        Self { macro_strength: 0.6, meso_strength: 0.3, micro_strength: 0.1 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelsConfig {
    pub default_character_height: f32,
    pub max_walkable_level: i8,
    pub inaccessible_min_level: i8,
    pub max_inaccessible_fraction: f32,
}

impl LevelsConfig {
    pub fn max_step(&self) -> f32 {
        1.5 * self.default_character_height
    }
}

impl Default for LevelsConfig {
    fn default() -> Self {
        Self {
            default_character_height: 2.0,
            max_walkable_level: 6,
            inaccessible_min_level: 8,
            max_inaccessible_fraction: 0.15,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BorderType {
    Mountain,
    Cliff,
    Water,
    None,
}

impl Default for BorderType {
    fn default() -> Self {
        BorderType::Mountain
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BorderConfig {
    pub enabled: bool,
    pub border_type: BorderType,
    pub band_width: u32,
    pub elevation: f32,
    pub exit_count: u32,
    pub exit_gap_width: u32,
    /// Reserved for a future external tiling tool that stitches several
    /// generated maps edge-to-edge; unused by this crate's own pipeline. See
    /// DESIGN.md, Open Question 3.
    pub stitch_kernel_width: Option<u32>,
}

impl Default for BorderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            border_type: BorderType::Mountain,
            band_width: 8,
            elevation: 3.0,
            exit_count: 2,
            exit_gap_width: 6,
            stitch_kernel_width: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DensityConfig {
    pub poi_min_spacing: f32,
    pub poi_count: u32,
    pub settlement_fraction: f32,
    pub resource_fraction: f32,
    pub landmark_fraction: f32,
}

impl Default for DensityConfig {
    fn default() -> Self {
        Self {
            poi_min_spacing: 24.0,
            poi_count: 24,
            settlement_fraction: 0.3,
            resource_fraction: 0.5,
            landmark_fraction: 0.2,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RampsConfig {
    pub width: f32,
    pub max_grade: f32,
    pub curve_samples: u32,
    /// Which of spec.md §4.7's five curves grades the strip. Defaults to
    /// `EaseIn`, whose slope grows toward `t = 1`, so the steep portion
    /// concentrates at the ramp's high end per the progressive contract
    /// (shallow first ~30%, steep final ~20%) rather than the symmetric
    /// `EaseInOut`, whose final 20% is shallow again.
    pub curve: RampCurve,
}

impl Default for RampsConfig {
    fn default() -> Self {
        Self { width: 3.0, max_grade: 0.5, curve_samples: 16, curve: RampCurve::EaseIn }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoadsConfig {
    pub enabled: bool,
    pub road_width: f32,
    pub water_crossing_penalty: f32,
    pub underwater_crossing_penalty: f32,
    pub slope_penalty_weight: f32,
    /// A* step-cost multiplier (spec.md §4.6 step 2) applied whenever the
    /// target cell's level differs at all from the level the path is
    /// currently on — discourages crossing a level boundary casually.
    pub level_crossing_multiplier: f32,
    /// Additional step-cost multiplier stacked on top of
    /// `level_crossing_multiplier` when the jump exceeds one level; a ramp
    /// cell is exempt since that is exactly the transition ramps are built
    /// to carry.
    pub forbidden_level_jump_multiplier: f32,
    pub reuse_discount: f32,
    pub max_extra_edges_fraction: f32,
    pub simplify_tolerance: f32,
    pub smoothing_band: u32,
    /// Weight folded into MST edge cost per level of difference between two
    /// POIs, per spec.md §4.6 step 1: `w(i,j) = euclid(i,j) + level_penalty *
    /// |level_i - level_j|`. Also the per-level-difference A* step multiplier
    /// described in the same section.
    pub level_penalty: f32,
    pub ramps: RampsConfig,
}

impl Default for RoadsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            road_width: 2.0,
            water_crossing_penalty: 10.0,
            underwater_crossing_penalty: 50.0,
            slope_penalty_weight: 4.0,
            level_crossing_multiplier: 3.0,
            forbidden_level_jump_multiplier: 10.0,
            reuse_discount: 0.3,
            max_extra_edges_fraction: 0.2,
            simplify_tolerance: 0.75,
            smoothing_band: 3,
            level_penalty: 10.0,
            ramps: RampsConfig::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BiomeConfig {
    pub biome: Biome,
}

impl Default for BiomeConfig {
    fn default() -> Self {
        Self { biome: Biome::Plains }
    }
}

/// Root configuration for one generation run. Implements `Default` the way
/// `ErosionParams::default` does in the teacher: every field has a value
/// that alone produces a playable map, so a caller can override only the
/// fields it cares about.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub seed: u64,
    pub map: MapConfig,
    pub biome: BiomeConfig,
    pub noise: NoiseConfig,
    pub erosion: ErosionConfig,
    pub detail: DetailConfig,
    pub levels: LevelsConfig,
    pub border: BorderConfig,
    pub density: DensityConfig,
    pub roads: RoadsConfig,
    /// Catch-all for JSON fields a future schema version adds that this
    /// build doesn't recognize. `project.rs` flattens `Config` into the
    /// project file's top level, so this is what actually gives §6's
    /// "unknown fields must be preserved on round-trip" its teeth: without
    /// it, any key this struct doesn't declare is silently dropped by
    /// `#[serde(flatten)]`, not merely rejected.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed: 0,
            map: MapConfig::default(),
            biome: BiomeConfig::default(),
            noise: NoiseConfig::default(),
            erosion: ErosionConfig::default(),
            detail: DetailConfig::default(),
            levels: LevelsConfig::default(),
            border: BorderConfig::default(),
            density: DensityConfig::default(),
            roads: RoadsConfig::default(),
            extra: serde_json::Map::new(),
        }
    }
}

impl Config {
    /// Every range/consistency check the pipeline depends on, run once up
    /// front so later stages can assume a sane configuration.
    pub fn validate(&self) -> Result<(), GenError> {
        if self.map.width == 0 || self.map.height == 0 {
            return Err(GenError::config("map.width/height", "must be nonzero"));
        }
        if self.map.cell_size <= 0.0 {
            return Err(GenError::config("map.cell_size", "must be positive"));
        }

        let cells = self.map.width as u64 * self.map.height as u64;
        const MAX_CELLS: u64 = 64_000_000;
        if cells > MAX_CELLS {
            return Err(GenError::CapacityExceeded { requested_cells: cells, max_cells: MAX_CELLS });
        }

        if self.noise.octaves == 0 {
            return Err(GenError::config("noise.octaves", "must be at least 1"));
        }
        if !(self.noise.persistence > 0.0 && self.noise.persistence < 1.0) {
            return Err(GenError::config("noise.persistence", "must be in (0, 1)"));
        }
        if self.noise.lacunarity <= 1.0 {
            return Err(GenError::config("noise.lacunarity", "must be greater than 1"));
        }

        if self.levels.default_character_height <= 0.0 {
            return Err(GenError::config("levels.default_character_height", "must be positive"));
        }
        if self.levels.max_walkable_level < 0 {
            return Err(GenError::config("levels.max_walkable_level", "must be non-negative"));
        }
        if self.levels.inaccessible_min_level <= self.levels.max_walkable_level {
            return Err(GenError::config(
                "levels.inaccessible_min_level",
                "must be greater than max_walkable_level",
            ));
        }
        if !(0.0..=1.0).contains(&self.levels.max_inaccessible_fraction) {
            return Err(GenError::config("levels.max_inaccessible_fraction", "must be in [0, 1]"));
        }

        if self.erosion.evaporation_rate <= 0.0 || self.erosion.evaporation_rate >= 1.0 {
            return Err(GenError::config("erosion.evaporation_rate", "must be in (0, 1)"));
        }
        if self.erosion.talus_angle <= 0.0 {
            return Err(GenError::config("erosion.talus_angle", "must be positive"));
        }

        if self.border.band_width as u64 * 2 >= self.map.width.min(self.map.height) as u64 {
            return Err(GenError::config("border.band_width", "too large for the map dimensions"));
        }
        if self.border.exit_count == 0 {
            return Err(GenError::config("border.exit_count", "must be at least 1"));
        }

        let fractions = self.density.settlement_fraction
            + self.density.resource_fraction
            + self.density.landmark_fraction;
        if (fractions - 1.0).abs() > 0.01 {
            return Err(GenError::config(
                "density.*_fraction",
                "settlement/resource/landmark fractions must sum to 1.0",
            ));
        }
        if self.density.poi_min_spacing <= 0.0 {
            return Err(GenError::config("density.poi_min_spacing", "must be positive"));
        }

        if self.roads.road_width <= 0.0 {
            return Err(GenError::config("roads.road_width", "must be positive"));
        }
        if !(0.0..=1.0).contains(&self.roads.max_extra_edges_fraction) {
            return Err(GenError::config("roads.max_extra_edges_fraction", "must be in [0, 1]"));
        }
        if self.roads.ramps.max_grade <= 0.0 || self.roads.ramps.max_grade >= 1.0 {
            return Err(GenError::config("roads.ramps.max_grade", "must be in (0, 1)"));
        }

        Ok(())
    }
}
