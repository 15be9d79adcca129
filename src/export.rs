//! Export stage: writes the generated grid out as a 16-bit heightmap PNG,
//! one 8-bit mask PNG per channel the specification calls for, a structured
//! boundary description, and a JSON metadata sidecar.
//!
//! Grounded on the teacher's `export.rs`, which builds an `ImageBuffer`,
//! fills it pixel by pixel, and calls `.save(path)` returning
//! `image::ImageError` for every exported layer; generalized here from
//! `RgbImage` to `ImageBuffer<Luma<u16>, _>`/`GrayImage` since these are
//! single-channel masks, not false-color visualizations, and driven by a
//! fixed file list (the exact set in spec.md §6) rather than the teacher's
//! ad hoc comparison-grid variants. Writes go through a temp-file-then-rename
//! so a crash mid-export never leaves a half-written PNG where a caller
//! might read it, and a failure partway through `export_all` cleans up
//! every file it already wrote so no partial output set survives it.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use image::{GrayImage, ImageBuffer, Luma};
use serde::Serialize;

use crate::biome::Biome;
use crate::border;
use crate::config::Config;
use crate::error::GenError;
use crate::grid::{BoundaryType, CellFlags, Grid};
use crate::levels::LevelStats;

fn atomic_write(path: &Path, write: impl FnOnce(&Path) -> Result<(), image::ImageError>) -> Result<(), GenError> {
    let tmp_path = path.with_extension(format!(
        "{}.tmp",
        path.extension().and_then(|e| e.to_str()).unwrap_or("out")
    ));

    write(&tmp_path).map_err(|e| GenError::IoFailure {
        path: tmp_path.clone(),
        source: std::io::Error::new(std::io::ErrorKind::Other, e.to_string()),
    })?;

    fs::rename(&tmp_path, path).map_err(|e| GenError::IoFailure { path: path.to_path_buf(), source: e })
}

fn height_range(grid: &Grid) -> (f32, f32) {
    let mut min = f32::MAX;
    let mut max = f32::MIN;
    for &h in &grid.height {
        min = min.min(h);
        max = max.max(h);
    }
    if min > max {
        (0.0, 0.0)
    } else {
        (min, max)
    }
}

/// The 16-bit heightmap, remapped from the grid's signed float range into
/// `[0, 65535]` linearly: `u16 = round(65535 * (h - minH) / (maxH - minH))`.
pub fn export_heightmap(grid: &Grid, path: &Path) -> Result<(), GenError> {
    let (min, max) = height_range(grid);
    let range = (max - min).max(1e-6);

    atomic_write(path, |tmp| {
        let mut img: ImageBuffer<Luma<u16>, Vec<u16>> = ImageBuffer::new(grid.cols as u32, grid.rows as u32);
        for y in 0..grid.rows {
            for x in 0..grid.cols {
                let t = (grid.height_at(x, y) - min) / range;
                let v = (t.clamp(0.0, 1.0) * 65535.0).round() as u16;
                img.put_pixel(x as u32, y as u32, Luma([v]));
            }
        }
        img.save(tmp)
    })
}

fn export_mask(grid: &Grid, path: &Path, value_at: impl Fn(usize, usize) -> u8) -> Result<(), GenError> {
    atomic_write(path, |tmp| {
        let mut img: GrayImage = ImageBuffer::new(grid.cols as u32, grid.rows as u32);
        for y in 0..grid.rows {
            for x in 0..grid.cols {
                img.put_pixel(x as u32, y as u32, Luma([value_at(x, y)]));
            }
        }
        img.save(tmp)
    })
}

fn export_bool_mask(grid: &Grid, path: &Path, predicate: impl Fn(CellFlags) -> bool) -> Result<(), GenError> {
    export_mask(grid, path, |x, y| if predicate(grid.flags_at(x, y)) { 255 } else { 0 })
}

/// Band encoding: `level_id` mapped to a band of 32, offset so level `-2`
/// lands on `0`, `-1` on `32`, `0` (sea level) on `64`, `1` on `96`, and so
/// on, clamped to `u8` range.
fn level_band(level: i8) -> u8 {
    let band = (level as i32 + 2) * 32;
    band.clamp(0, 255) as u8
}

fn biome_band(biome: Biome) -> u8 {
    let index = match biome {
        Biome::Plains => 0,
        Biome::Hills => 1,
        Biome::Mountain => 2,
        Biome::Desert => 3,
        Biome::Canyon => 4,
        Biome::Island => 5,
        Biome::Coastal => 6,
        Biome::Volcanic => 7,
        Biome::Tundra => 8,
        Biome::Forest => 9,
        Biome::Custom => 10,
    };
    (index * 23).min(255) as u8
}

fn is_walkable(f: CellFlags) -> bool {
    f.has(CellFlags::PLAYABLE) && !f.has(CellFlags::WATER) && !f.has(CellFlags::VISUAL_ONLY)
}

fn is_swimable(f: CellFlags) -> bool {
    f.has(CellFlags::WATER) || f.has(CellFlags::UNDERWATER)
}

fn is_flyable(f: CellFlags) -> bool {
    !f.has(CellFlags::BLOCKED)
}

/// Priority walkable > swimable > flyable > none, per spec.md §4.10.
fn navigation_combined_band(f: CellFlags) -> u8 {
    if is_walkable(f) {
        255
    } else if is_swimable(f) {
        170
    } else if is_flyable(f) {
        85
    } else {
        0
    }
}

/// `{none, walkable, water, transition, blocked}`, where `transition` is a
/// ramp or cliff cell — a step that is neither flatly walkable nor simply
/// blocked.
fn collision_band(f: CellFlags) -> u8 {
    if f.has(CellFlags::RAMP) || f.has(CellFlags::CLIFF) {
        192
    } else if f.has(CellFlags::BLOCKED) {
        255
    } else if f.has(CellFlags::WATER) {
        128
    } else if f.has(CellFlags::PLAYABLE) {
        64
    } else {
        0
    }
}

fn boundary_band(boundary_type: BoundaryType) -> u8 {
    match boundary_type {
        BoundaryType::Edge => 255,
        BoundaryType::Interior => 200,
        BoundaryType::Ocean => 150,
        BoundaryType::Custom => 100,
        BoundaryType::None => 0,
    }
}

/// Writes every mask PNG the specification's export stage calls for, using
/// the exact filenames from spec.md §6.
pub fn export_all_masks(grid: &Grid, biome: Biome, dir: &Path) -> Result<(), GenError> {
    export_bool_mask(grid, &dir.join("roads_mask.png"), |f| f.has(CellFlags::ROAD))?;
    export_bool_mask(grid, &dir.join("water_mask.png"), |f| f.has(CellFlags::WATER))?;
    export_bool_mask(grid, &dir.join("underwater_mask.png"), |f| f.has(CellFlags::UNDERWATER))?;
    export_bool_mask(grid, &dir.join("cliffs_mask.png"), |f| f.has(CellFlags::CLIFF))?;
    export_bool_mask(grid, &dir.join("playable_mask.png"), |f| f.has(CellFlags::PLAYABLE))?;
    export_bool_mask(grid, &dir.join("visual_only_mask.png"), |f| f.has(CellFlags::VISUAL_ONLY))?;
    export_mask(grid, &dir.join("level_mask.png"), |x, y| level_band(grid.level_at(x, y)))?;
    export_mask(grid, &dir.join("biome_mask.png"), |_, _| biome_band(biome))?;
    export_bool_mask(grid, &dir.join("navigation_walkable_mask.png"), is_walkable)?;
    export_bool_mask(grid, &dir.join("navigation_swimable_mask.png"), is_swimable)?;
    export_bool_mask(grid, &dir.join("navigation_flyable_mask.png"), is_flyable)?;
    export_mask(grid, &dir.join("navigation_combined_mask.png"), |x, y| {
        navigation_combined_band(grid.flags_at(x, y))
    })?;
    export_mask(grid, &dir.join("collision_map.png"), |x, y| collision_band(grid.flags_at(x, y)))?;
    export_mask(grid, &dir.join("boundary_mask.png"), |x, y| boundary_band(grid.boundary_type[grid.idx(x, y)]))?;

    Ok(())
}

#[derive(Serialize)]
struct ExportStats {
    level_counts: Vec<(i8, u64)>,
    road_cells: u64,
    ramp_cells: u64,
    cliff_cells: u64,
    playable_cells: u64,
    water_cells: u64,
    inaccessible_fraction: f32,
}

fn collect_stats(grid: &Grid, level_stats: &LevelStats) -> ExportStats {
    let level_counts = level_stats
        .level_counts
        .iter()
        .enumerate()
        .filter(|&(_, &count)| count > 0)
        .map(|(bucket, &count)| (bucket as i8, count))
        .collect();

    let mut road_cells = 0u64;
    let mut ramp_cells = 0u64;
    let mut cliff_cells = 0u64;
    let mut playable_cells = 0u64;
    let mut water_cells = 0u64;
    for &f in &grid.flags {
        road_cells += f.has(CellFlags::ROAD) as u64;
        ramp_cells += f.has(CellFlags::RAMP) as u64;
        cliff_cells += f.has(CellFlags::CLIFF) as u64;
        playable_cells += f.has(CellFlags::PLAYABLE) as u64;
        water_cells += f.has(CellFlags::WATER) as u64;
    }

    ExportStats {
        level_counts,
        road_cells,
        ramp_cells,
        cliff_cells,
        playable_cells,
        water_cells,
        inaccessible_fraction: level_stats.inaccessible_fraction,
    }
}

#[derive(Serialize)]
struct ExportMetadata<'a> {
    version: &'static str,
    generated_at: String,
    cols: usize,
    rows: usize,
    min_height: f32,
    max_height: f32,
    scale_factor: f32,
    recommended_landscape_width: usize,
    recommended_landscape_height: usize,
    stats: ExportStats,
    config: &'a Config,
}

/// Writes the JSON metadata sidecar: version, timestamp, full config,
/// per-level/per-flag statistics, and the export height-range parameters a
/// landscape importer needs to invert the 16-bit quantization.
pub fn export_metadata(grid: &Grid, level_stats: &LevelStats, cfg: &Config, path: &Path) -> Result<(), GenError> {
    let (min, max) = height_range(grid);
    let meta = ExportMetadata {
        version: env!("CARGO_PKG_VERSION"),
        generated_at: Utc::now().to_rfc3339(),
        cols: grid.cols,
        rows: grid.rows,
        min_height: min,
        max_height: max,
        scale_factor: (max - min).max(1e-6) / 65535.0,
        // Landscape components tile in powers-of-two-plus-one quads; round
        // the grid dimensions up to the nearest section size a 3D engine's
        // terrain tool typically expects.
        recommended_landscape_width: next_section_size(grid.cols),
        recommended_landscape_height: next_section_size(grid.rows),
        stats: collect_stats(grid, level_stats),
        config: cfg,
    };

    let json = serde_json::to_string_pretty(&meta)
        .map_err(|e| GenError::generation("export:metadata", e.to_string()))?;

    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, json).map_err(|e| GenError::IoFailure { path: tmp_path.clone(), source: e })?;
    fs::rename(&tmp_path, path).map_err(|e| GenError::IoFailure { path: path.to_path_buf(), source: e })
}

fn next_section_size(n: usize) -> usize {
    const SECTIONS: [usize; 6] = [63, 127, 255, 511, 1023, 2047];
    SECTIONS.into_iter().find(|&s| s + 1 >= n).unwrap_or(2047) + 1
}

#[derive(Serialize)]
struct BoundaryExit {
    x: usize,
    y: usize,
    width: u32,
}

#[derive(Serialize)]
struct BoundaryDoc {
    version: u32,
    ring: Vec<(usize, usize)>,
    exits: Vec<BoundaryExit>,
    /// Cross-zone teleport links for seamless multi-zone stitching; this
    /// crate generates single zones, so the list is always empty (see
    /// DESIGN.md, Open Question 3).
    teleport_links: Vec<()>,
}

/// Writes `boundaries.json`: the ordered perimeter ring plus the carved
/// exit gaps, for a caller that wants boundary shapes without decoding
/// `boundary_mask.png`.
pub fn export_boundaries(grid: &Grid, cfg: &Config, path: &Path) -> Result<(), GenError> {
    let ring: Vec<(usize, usize)> = (0..grid.flags.len())
        .filter(|&i| grid.flags[i].has(CellFlags::BOUNDARY))
        .map(|i| (i % grid.cols, i / grid.cols))
        .collect();

    let exits = if cfg.border.enabled {
        border::exit_positions(grid, &cfg.border)
            .into_iter()
            .map(|(x, y)| BoundaryExit { x, y, width: cfg.border.exit_gap_width })
            .collect()
    } else {
        Vec::new()
    };

    let doc = BoundaryDoc { version: 1, ring, exits, teleport_links: Vec::new() };
    let json = serde_json::to_string_pretty(&doc)
        .map_err(|e| GenError::generation("export:boundaries", e.to_string()))?;

    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, json).map_err(|e| GenError::IoFailure { path: tmp_path.clone(), source: e })?;
    fs::rename(&tmp_path, path).map_err(|e| GenError::IoFailure { path: path.to_path_buf(), source: e })
}

/// Writes the full output set from spec.md §6 into `dir`, creating it if
/// necessary. If any file fails partway through, every file this call
/// already wrote is removed before the error is returned, so a failed
/// export never leaves a partial output directory behind.
pub fn export_all(
    grid: &Grid,
    biome: Biome,
    level_stats: &LevelStats,
    cfg: &Config,
    dir: &Path,
) -> Result<(), GenError> {
    fs::create_dir_all(dir).map_err(|e| GenError::IoFailure { path: dir.to_path_buf(), source: e })?;

    let mut written: Vec<PathBuf> = Vec::new();
    let result = (|| -> Result<(), GenError> {
        let heightmap_path = dir.join("heightmap.png");
        export_heightmap(grid, &heightmap_path)?;
        written.push(heightmap_path);

        export_all_masks(grid, biome, dir)?;
        for name in MASK_FILE_NAMES {
            written.push(dir.join(name));
        }

        let boundaries_path = dir.join("boundaries.json");
        export_boundaries(grid, cfg, &boundaries_path)?;
        written.push(boundaries_path);

        let metadata_path = dir.join("metadata.json");
        export_metadata(grid, level_stats, cfg, &metadata_path)?;
        written.push(metadata_path);

        Ok(())
    })();

    if let Err(err) = result {
        for path in &written {
            let _ = fs::remove_file(path);
        }
        return Err(err);
    }

    Ok(())
}

const MASK_FILE_NAMES: [&str; 14] = [
    "roads_mask.png",
    "water_mask.png",
    "underwater_mask.png",
    "cliffs_mask.png",
    "playable_mask.png",
    "visual_only_mask.png",
    "level_mask.png",
    "biome_mask.png",
    "navigation_walkable_mask.png",
    "navigation_swimable_mask.png",
    "navigation_flyable_mask.png",
    "navigation_combined_mask.png",
    "collision_map.png",
    "boundary_mask.png",
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::CellFlags;

    #[test]
    fn heightmap_export_produces_a_readable_png() {
        let mut g = Grid::new(8, 8);
        for i in 0..g.height.len() {
            g.height[i] = i as f32;
        }
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("heightmap.png");
        export_heightmap(&g, &path).unwrap();

        let img = image::open(&path).unwrap();
        assert_eq!(img.width(), 8);
        assert_eq!(img.height(), 8);
    }

    #[test]
    fn flat_grid_heightmap_does_not_divide_by_zero() {
        let g = Grid::new(4, 4);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("heightmap.png");
        export_heightmap(&g, &path).unwrap();
        let img = image::open(&path).unwrap().into_luma16();
        assert_eq!(img.get_pixel(0, 0).0[0], 0);
    }

    #[test]
    fn mask_export_marks_flagged_cells_white() {
        let mut g = Grid::new(4, 4);
        g.flags_at_mut(1, 1).set(CellFlags::ROAD);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roads_mask.png");
        export_bool_mask(&g, &path, |f| f.has(CellFlags::ROAD)).unwrap();

        let img = image::open(&path).unwrap().into_luma8();
        assert_eq!(img.get_pixel(1, 1).0[0], 255);
        assert_eq!(img.get_pixel(0, 0).0[0], 0);
    }

    #[test]
    fn level_band_offsets_sea_level_to_64() {
        assert_eq!(level_band(0), 64);
        assert_eq!(level_band(-2), 0);
        assert_eq!(level_band(-1), 32);
        assert_eq!(level_band(1), 96);
    }

    #[test]
    fn navigation_combined_prioritizes_walkable_over_swimable() {
        let mut f = CellFlags::default();
        f.set(CellFlags::PLAYABLE);
        f.set(CellFlags::WATER);
        // Walkable excludes water, so this cell is only swimable.
        assert_eq!(navigation_combined_band(f), 170);

        let mut walkable = CellFlags::default();
        walkable.set(CellFlags::PLAYABLE);
        assert_eq!(navigation_combined_band(walkable), 255);
    }

    #[test]
    fn export_all_masks_writes_every_spec_filename() {
        let g = Grid::new(4, 4);
        let dir = tempfile::tempdir().unwrap();
        export_all_masks(&g, Biome::Plains, dir.path()).unwrap();
        for name in MASK_FILE_NAMES {
            assert!(dir.path().join(name).exists(), "missing {name}");
        }
    }

    #[test]
    fn metadata_includes_seed_and_stats() {
        let g = Grid::new(4, 4);
        let cfg = Config::default();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.json");
        export_metadata(&g, &LevelStats::default(), &cfg, &path).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(parsed["config"]["seed"], cfg.seed);
        assert!(parsed["stats"].is_object());
    }

    #[test]
    fn export_all_produces_the_full_spec_file_set() {
        let mut g = Grid::new(16, 16);
        g.flags_at_mut(2, 2).set(CellFlags::BOUNDARY);
        let cfg = Config::default();
        let dir = tempfile::tempdir().unwrap();

        export_all(&g, Biome::Plains, &LevelStats::default(), &cfg, dir.path()).unwrap();

        assert!(dir.path().join("heightmap.png").exists());
        assert!(dir.path().join("metadata.json").exists());
        assert!(dir.path().join("boundaries.json").exists());
        for name in MASK_FILE_NAMES {
            assert!(dir.path().join(name).exists());
        }
    }

    #[test]
    fn failed_export_leaves_no_partial_files() {
        let g = Grid::new(4, 4);
        let cfg = Config::default();
        // A path component that is actually a file, not a directory, makes
        // `create_dir_all` fail before any export writes start.
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"x").unwrap();
        let bad_dir = blocker.join("output");

        let result = export_all(&g, Biome::Plains, &LevelStats::default(), &cfg, &bad_dir);
        assert!(result.is_err());
        assert!(!bad_dir.exists());
    }
}
