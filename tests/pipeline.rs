//! End-to-end coverage of the full generation pipeline: one test per
//! scenario/property the crate's design commits to but no unit module
//! exercises on its own, since each of these only shows up once every stage
//! runs together.

use heightgen::biome::Biome;
use heightgen::config::{BorderConfig, BorderType, Config};
use heightgen::grid::{CellFlags, Grid};
use heightgen::layers::{BlendMode, Layer, LayerStack};
use heightgen::pipeline::{self, CancelToken};
use heightgen::project::ProjectFile;
use heightgen::{error::GenError, export};

fn small_plains_config() -> Config {
    let mut cfg = Config::default();
    cfg.seed = 42;
    cfg.map.width = 256;
    cfg.map.height = 256;
    cfg.map.cell_size = 1.0;
    cfg.biome.biome = Biome::Plains;
    cfg.erosion.hydraulic_iterations = 500;
    cfg.erosion.thermal_iterations = 5;
    cfg
}

/// S1: a minimal, deterministic run over a 256x256 plains map with roads,
/// erosion and the border all disabled still produces a fully-populated
/// grid of the right size.
#[test]
fn s1_minimal_run_produces_a_correctly_sized_grid() {
    let mut cfg = small_plains_config();
    cfg.erosion.hydraulic_enabled = false;
    cfg.erosion.thermal_enabled = false;
    cfg.border.enabled = false;
    cfg.roads.enabled = false;

    let result = pipeline::run(&cfg, &CancelToken::new(), |_| {}).expect("pipeline run");

    assert_eq!(result.grid.cols, 256);
    assert_eq!(result.grid.rows, 256);
    assert_eq!(result.grid.height.len(), 256 * 256);
    assert!(result.roads.is_empty());
}

/// S2: a plains map with roads enabled and 4 perimeter exits ends up with a
/// road network connecting every non-exit POI, and every exit has a road
/// touching it.
#[test]
fn s2_plains_with_roads_connects_every_exit() {
    let mut cfg = small_plains_config();
    cfg.map.width = 1024;
    cfg.map.height = 1024;
    cfg.map.cell_size = 4.0; // 256x256 cells
    cfg.border.exit_count = 4;
    cfg.roads.enabled = true;

    let result = pipeline::run(&cfg, &CancelToken::new(), |_| {}).expect("pipeline run");

    assert!(!result.roads.is_empty());
    let exits: Vec<_> = result.pois.iter().filter(|p| p.kind == heightgen::poi::PoiKind::Exit).collect();
    assert_eq!(exits.len(), 4);
    for exit in &exits {
        let exit_index = result.pois.iter().position(|p| p.id == exit.id).unwrap();
        let touches_road =
            result.roads.iter().any(|seg| seg.from_poi == exit_index || seg.to_poi == exit_index);
        assert!(touches_road, "exit {:?} has no connecting road segment", (exit.x, exit.y));
    }
}

/// S3: a mountain biome with a tall enough height scale produces at least
/// one level transition bridged by a graded ramp rather than an unramped
/// cliff jump, once roads have run.
#[test]
fn s3_mountain_produces_ramps_between_levels() {
    let mut cfg = small_plains_config();
    cfg.biome.biome = Biome::Mountain;
    cfg.levels.default_character_height = 1.0;
    cfg.roads.enabled = true;

    let result = pipeline::run(&cfg, &CancelToken::new(), |_| {}).expect("pipeline run");

    let ramp_cells = result.grid.flags.iter().filter(|f| f.has(CellFlags::RAMP)).count();
    assert!(ramp_cells > 0, "expected at least one ramp cell in a mountain biome run");
}

/// S4: an island biome with a water border produces a connected underwater
/// ring enclosing the interior, and every underwater cell is also counted
/// water (water_mask >= underwater_mask).
#[test]
fn s4_island_with_water_border_produces_an_underwater_ring() {
    let mut cfg = small_plains_config();
    cfg.biome.biome = Biome::Island;
    cfg.border = BorderConfig {
        border_type: BorderType::Water,
        band_width: 10,
        elevation: 6.0,
        exit_count: 2,
        exit_gap_width: 6,
        ..Default::default()
    };

    let result = pipeline::run(&cfg, &CancelToken::new(), |_| {}).expect("pipeline run");
    let g = &result.grid;

    let underwater_count = g.flags.iter().filter(|f| f.has(CellFlags::UNDERWATER)).count();
    assert!(underwater_count > 0, "expected underwater cells around the island border");

    for f in &g.flags {
        if f.has(CellFlags::UNDERWATER) {
            assert!(f.has(CellFlags::WATER), "underwater cell must also be water");
        }
    }

    // With only 2 narrow exit gaps carved, the band at each edge's midpoint is
    // never near one, so the ring should read water on all four sides.
    let (mid_x, mid_y) = (g.cols / 2, g.rows / 2);
    for &(x, y) in &[(mid_x, 0), (mid_x, g.rows - 1), (0, mid_y), (g.cols - 1, mid_y)] {
        assert!(g.flags_at(x, y).has(CellFlags::WATER), "edge midpoint ({x}, {y}) should be water");
    }
}

/// S5: cancelling the token before the run starts aborts before any stage
/// completes.
#[test]
fn s5_cancellation_aborts_before_any_stage_runs() {
    let mut cfg = small_plains_config();
    cfg.map.width = 512;
    cfg.map.height = 512;

    let cancel = CancelToken::new();
    cancel.cancel();

    let mut stages_seen = Vec::new();
    let result = pipeline::run(&cfg, &cancel, |p| stages_seen.push(p.stage));

    assert!(matches!(result, Err(GenError::Cancelled)));
}

/// S6: two visible layers, a flat base and a half-opacity additive overlay,
/// compose to the expected blended value, and flattening twice in a row is
/// idempotent (flatten doesn't mutate the stack).
#[test]
fn s6_layer_composition_matches_the_blend_formula_and_is_idempotent() {
    let mut stack = LayerStack::default();
    let mut base = Layer::new("base", 2, 1);
    base.values = vec![100.0, 100.0];
    let mut overlay = Layer::new("overlay", 2, 1);
    overlay.blend_mode = BlendMode::Add;
    overlay.opacity = 0.5;
    overlay.values = vec![50.0, 50.0];
    stack.add(base);
    stack.add(overlay);

    let first = stack.flatten();
    let second = stack.flatten();
    assert_eq!(first, second);
    // base(100) * (1 - 0.5) + (100 + 50) * 0.5 = 50 + 75 = 125
    assert_eq!(first, vec![125.0, 125.0]);
}

/// P5: exporting the heightmap from two independent runs with the same seed
/// and config produces byte-identical PNGs.
#[test]
fn p5_heightmap_export_is_bit_identical_across_independent_runs() {
    let cfg = small_plains_config();

    let a = pipeline::run(&cfg, &CancelToken::new(), |_| {}).expect("run a");
    let b = pipeline::run(&cfg, &CancelToken::new(), |_| {}).expect("run b");

    let dir = tempfile::tempdir().unwrap();
    let path_a = dir.path().join("a.png");
    let path_b = dir.path().join("b.png");
    export::export_heightmap(&a.grid, &path_a).unwrap();
    export::export_heightmap(&b.grid, &path_b).unwrap();

    let bytes_a = std::fs::read(&path_a).unwrap();
    let bytes_b = std::fs::read(&path_b).unwrap();
    assert_eq!(bytes_a, bytes_b);
}

/// P7: the road mask PNG's 255-valued pixel count equals `stats.road_cells`
/// in the metadata JSON sidecar, since both are derived from the same ROAD
/// flag.
#[test]
fn p7_road_mask_pixel_count_matches_metadata_road_cells() {
    let mut cfg = small_plains_config();
    cfg.roads.enabled = true;

    let result = pipeline::run(&cfg, &CancelToken::new(), |_| {}).expect("pipeline run");

    let dir = tempfile::tempdir().unwrap();
    export::export_all(&result.grid, result.biome, &result.level_stats, &cfg, dir.path()).unwrap();

    let mask = image::open(dir.path().join("roads_mask.png")).unwrap().into_luma8();
    let mask_road_pixels = mask.pixels().filter(|p| p.0[0] == 255).count() as u64;

    let metadata = std::fs::read_to_string(dir.path().join("metadata.json")).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&metadata).unwrap();
    let stats_road_cells = parsed["stats"]["road_cells"].as_u64().unwrap();

    assert_eq!(mask_road_pixels, stats_road_cells);
}

/// R1: a project file survives save -> load -> save byte-identical, aside
/// from the `last_saved` timestamp the re-save is expected to bump.
#[test]
fn r1_project_round_trip_is_stable_modulo_last_saved() {
    let cfg = small_plains_config();
    let result = pipeline::run(&cfg, &CancelToken::new(), |_| {}).expect("pipeline run");

    let project = ProjectFile::new("r1-test", result.grid, LayerStack::default(), cfg, "2026-01-01T00:00:00Z");
    let saved = project.to_json().unwrap();

    let loaded = ProjectFile::from_json(&saved).unwrap();
    let resaved = loaded.to_json().unwrap();

    let mut saved_value: serde_json::Value = serde_json::from_str(&saved).unwrap();
    let mut resaved_value: serde_json::Value = serde_json::from_str(&resaved).unwrap();
    saved_value["metadata"]["last_saved"] = serde_json::json!(null);
    resaved_value["metadata"]["last_saved"] = serde_json::json!(null);

    assert_eq!(saved_value, resaved_value);
}

/// R3: the 16-bit heightmap PNG round-trips every cell's height within 1
/// LSB of the quantization's own scale factor.
#[test]
fn r3_heightmap_png_round_trips_within_one_lsb() {
    let mut cfg = small_plains_config();
    cfg.map.width = 64;
    cfg.map.height = 64;

    let result = pipeline::run(&cfg, &CancelToken::new(), |_| {}).expect("pipeline run");
    let grid: &Grid = &result.grid;

    let (min, max) = {
        let mut min = f32::MAX;
        let mut max = f32::MIN;
        for &h in &grid.height {
            min = min.min(h);
            max = max.max(h);
        }
        (min, max)
    };
    let range = (max - min).max(1e-6);
    let scale = range / 65535.0;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("heightmap.png");
    export::export_heightmap(grid, &path).unwrap();
    let img = image::open(&path).unwrap().into_luma16();

    for y in 0..grid.rows {
        for x in 0..grid.cols {
            let original = grid.height_at(x, y);
            let encoded = img.get_pixel(x as u32, y as u32).0[0];
            let decoded = min + encoded as f32 * scale;
            assert!((decoded - original).abs() <= scale + 1e-4);
        }
    }
}
