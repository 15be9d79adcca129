//! Command-line front end for the heightmap generation core.
//!
//! Grounded on the teacher's `main.rs`: a `clap::Parser` struct for the
//! batch-mode knobs, a headless path that runs the pipeline and exports
//! straight to disk with progress printed to stderr, and `eprintln!` +
//! `std::process::exit(1)` on failure rather than unwinding. The teacher's
//! interactive-menu fallback and its EXR/comparison-grid export variants
//! are dropped: this crate has no viewer and exactly one output format per
//! spec.md §6, so there is nothing for those paths to select between.

use std::path::PathBuf;

use clap::Parser;

use heightgen::biome::Biome;
use heightgen::config::Config;
use heightgen::pipeline::{self, CancelToken, Progress, Stage};

#[derive(Parser, Debug)]
#[command(name = "heightgen")]
#[command(about = "Generate an MMORPG-style heightmap plus navigation/material masks")]
struct Args {
    /// Map width in world units.
    #[arg(short = 'W', long, default_value_t = 512)]
    width: u32,

    /// Map height in world units.
    #[arg(short = 'H', long, default_value_t = 512)]
    height: u32,

    /// World units per grid cell.
    #[arg(long, default_value_t = 1.0)]
    cell_size: f32,

    /// Master seed driving every sub-stage's derived PRNG.
    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    /// Biome preset: plains, hills, mountain, desert, canyon, island,
    /// coastal, volcanic, tundra, forest, custom.
    #[arg(short = 'b', long, default_value = "plains")]
    biome: String,

    /// Output directory for the exported heightmap, masks, and metadata.
    #[arg(short = 'o', long, default_value = "output")]
    output: PathBuf,

    /// Disable road planning and ramp insertion.
    #[arg(long)]
    no_roads: bool,

    /// Disable hydraulic and thermal erosion.
    #[arg(long)]
    no_erosion: bool,

    /// Disable the map border.
    #[arg(long)]
    no_border: bool,

    /// Number of points of interest to place.
    #[arg(long)]
    poi_count: Option<u32>,
}

fn parse_biome(name: &str) -> Option<Biome> {
    Some(match name.to_ascii_lowercase().as_str() {
        "plains" => Biome::Plains,
        "hills" => Biome::Hills,
        "mountain" => Biome::Mountain,
        "desert" => Biome::Desert,
        "canyon" => Biome::Canyon,
        "island" => Biome::Island,
        "coastal" => Biome::Coastal,
        "volcanic" => Biome::Volcanic,
        "tundra" => Biome::Tundra,
        "forest" => Biome::Forest,
        "custom" => Biome::Custom,
        _ => return None,
    })
}

fn build_config(args: &Args) -> Result<Config, String> {
    let mut cfg = Config::default();
    cfg.seed = args.seed;
    cfg.map.width = args.width;
    cfg.map.height = args.height;
    cfg.map.cell_size = args.cell_size;
    cfg.biome.biome = parse_biome(&args.biome).ok_or_else(|| {
        format!(
            "unknown biome '{}'; expected one of: plains, hills, mountain, desert, canyon, \
             island, coastal, volcanic, tundra, forest, custom",
            args.biome
        )
    })?;
    cfg.border.enabled = !args.no_border;
    cfg.erosion.hydraulic_enabled = !args.no_erosion;
    cfg.erosion.thermal_enabled = !args.no_erosion;
    cfg.roads.enabled = !args.no_roads;
    if let Some(count) = args.poi_count {
        cfg.density.poi_count = count;
    }
    Ok(cfg)
}

fn stage_name(stage: Stage) -> &'static str {
    match stage {
        Stage::Noise => "base heightfield synthesis",
        Stage::Erosion => "erosion & detail",
        Stage::Levels => "level quantization",
        Stage::Border => "border construction",
        Stage::Poi => "POI selection",
        Stage::Roads => "road planning",
        Stage::NavMesh => "navmesh extraction",
    }
}

fn main() {
    let args = Args::parse();

    let cfg = match build_config(&args) {
        Ok(cfg) => cfg,
        Err(message) => {
            eprintln!("config error: {message}");
            std::process::exit(1);
        }
    };

    if let Err(e) = cfg.validate() {
        eprintln!("config error: {e}");
        std::process::exit(1);
    }

    let cancel = CancelToken::new();
    let result = pipeline::run(&cfg, &cancel, |p: Progress| {
        eprintln!("[{:>5.1}%] {}", p.fraction_complete * 100.0, stage_name(p.stage));
    });

    let generated = match result {
        Ok(g) => g,
        Err(e) => {
            eprintln!("generation failed: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = heightgen::export::export_all(
        &generated.grid,
        generated.biome,
        &generated.level_stats,
        &cfg,
        &args.output,
    ) {
        eprintln!("export failed: {e}");
        std::process::exit(1);
    }

    eprintln!(
        "wrote {} cols x {} rows, {} POIs, {} road segments, {} navmesh triangles to {}",
        generated.grid.cols,
        generated.grid.rows,
        generated.pois.len(),
        generated.roads.len(),
        generated.navmesh.triangle_count(),
        args.output.display()
    );
}
