//! Orchestrates the full generation pipeline end to end: noise synthesis,
//! erosion, level quantization, border construction, POI placement, road
//! planning, and navmesh extraction.
//!
//! The cooperative cancellation and progress-callback shape mirrors how the
//! teacher's `main.rs` drives its own pipeline with `println!` progress
//! lines at each stage boundary; here that becomes a caller-supplied
//! callback instead of a hardcoded print so a GUI or a test harness can
//! observe progress without scraping stdout.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::biome::{Biome, BiomeProfile};
use crate::config::Config;
use crate::error::GenError;
use crate::grid::Grid;
use crate::levels::LevelStats;
use crate::navmesh::NavMesh;
use crate::poi::Poi;
use crate::roads::RoadSegment;
use crate::{border, erosion, levels, navmesh, noise_field, poi, roads};

/// A shared flag the caller can flip from another thread to ask a running
/// generation to stop at the next stage boundary.
#[derive(Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Noise,
    Erosion,
    Levels,
    Border,
    Poi,
    Roads,
    NavMesh,
}

pub struct Progress {
    pub stage: Stage,
    pub fraction_complete: f32,
}

pub type ProgressCallback<'a> = dyn FnMut(Progress) + 'a;

pub struct GenerationResult {
    pub grid: Grid,
    pub pois: Vec<Poi>,
    pub roads: Vec<RoadSegment>,
    pub navmesh: NavMesh,
    pub biome: Biome,
    pub level_stats: LevelStats,
}

const STAGE_ORDER: [Stage; 7] =
    [Stage::Noise, Stage::Erosion, Stage::Levels, Stage::Border, Stage::Poi, Stage::Roads, Stage::NavMesh];

fn report(callback: &mut ProgressCallback, stage: Stage, stage_index: usize) {
    callback(Progress { stage, fraction_complete: stage_index as f32 / STAGE_ORDER.len() as f32 });
}

/// Runs every stage in order, checking `cancel` at each boundary.
/// `Config::validate` is assumed to have already been called; this function
/// does not re-check configuration validity, only cancellation and the
/// per-stage work itself.
/// Cell-grid dimensions implied by a map config: `cols = width / cell_size`,
/// `rows = height / cell_size`, per the data model's grid sizing rule.
fn grid_dims(map: &crate::config::MapConfig) -> (usize, usize) {
    let cols = (map.width as f32 / map.cell_size).round().max(1.0) as usize;
    let rows = (map.height as f32 / map.cell_size).round().max(1.0) as usize;
    (cols, rows)
}

pub fn run(
    cfg: &Config,
    cancel: &CancelToken,
    mut progress: impl FnMut(Progress),
) -> Result<GenerationResult, GenError> {
    let (cols, rows) = grid_dims(&cfg.map);
    let mut grid = Grid::new(cols, rows);
    let biome = BiomeProfile::for_biome(cfg.biome.biome);
    let mut level_stats = LevelStats::default();

    for (i, &stage) in STAGE_ORDER.iter().enumerate() {
        if cancel.is_cancelled() {
            return Err(GenError::Cancelled);
        }
        report(&mut progress, stage, i);

        match stage {
            Stage::Noise => {
                noise_field::synthesize(&mut grid, cfg.seed, &cfg.noise, &biome);
            }
            Stage::Erosion => {
                erosion::run(&mut grid, cfg.seed, cfg);
            }
            Stage::Levels => {
                levels::quantize(&mut grid, &cfg.levels);
                level_stats = levels::assign_flags(&mut grid, &cfg.levels);
            }
            Stage::Border => {
                border::build(&mut grid, &cfg.border, &cfg.levels);
            }
            Stage::Poi | Stage::Roads | Stage::NavMesh => {
                // handled below once POIs exist
            }
        }
    }

    if cancel.is_cancelled() {
        return Err(GenError::Cancelled);
    }

    let exits = if cfg.border.enabled {
        border::exit_positions(&grid, &cfg.border)
    } else {
        Vec::new()
    };
    let pois = poi::place(&grid, cfg.seed, &cfg.density, &exits);

    if cancel.is_cancelled() {
        return Err(GenError::Cancelled);
    }

    let road_segments = if cfg.roads.enabled {
        let segments = roads::plan_and_apply(&mut grid, &pois, &cfg.roads, cfg.levels.max_step())?;
        roads::refine_playable_reachability(&mut grid, &pois);
        segments
    } else {
        Vec::new()
    };
    levels::mark_cliffs(&mut grid);

    if cancel.is_cancelled() {
        return Err(GenError::Cancelled);
    }

    let navmesh = navmesh::build(&grid, cfg.map.cell_size, navmesh::DEFAULT_RESOLUTION, cfg.levels.max_step());

    Ok(GenerationResult {
        grid,
        pois,
        roads: road_segments,
        navmesh,
        biome: cfg.biome.biome,
        level_stats,
    })
}
