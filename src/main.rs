//! Terragen CLI - procedural terrain and vegetation generator.
//!
//! Synthesizes a heightmap from fractal noise, mountains and slope
//! shaping, grows a forest over it, and exports the scene for a
//! downstream engine consumer.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Instant;

use terragen::export::{
    export_heightmap_csv, export_heightmap_png, PngExportOptions, SceneParams, TerrainExport,
};
use terragen::forest::{ForestConfig, ForestGrid, PruneMode, Termination, VegetationCell};
use terragen::noise::NoiseConfig;
use terragen::pipeline::{HeightmapStage, Pipeline, VegetationStage};
use terragen::terrain::{Mountain, TerrainMode, TerrainScene, TerrainTransform};

/// Procedural terrain and vegetation generator.
#[derive(Parser)]
#[command(name = "terragen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a terrain scene and export it.
    Generate(GenerateArgs),

    /// Display information about a scene configuration.
    Info {
        /// Grid width in cells.
        #[arg(long, default_value = "256")]
        width: u32,

        /// Grid height in cells.
        #[arg(long, default_value = "256")]
        height: u32,
    },
}

#[derive(Args)]
struct GenerateArgs {
    /// Grid width in cells.
    #[arg(long, default_value = "256")]
    width: u32,

    /// Grid height in cells.
    #[arg(long, default_value = "256")]
    height: u32,

    /// Random seed for reproducible generation.
    #[arg(short, long)]
    seed: Option<u64>,

    /// Output directory for generated files.
    #[arg(short, long, default_value = "./output")]
    output: PathBuf,

    /// Base name for output files.
    #[arg(short, long, default_value = "terrain")]
    name: String,

    /// Export format.
    #[arg(short, long, default_value = "json")]
    format: ExportFormat,

    // Noise options
    /// Feature size of the noise (2-500).
    #[arg(long, default_value = "50.0")]
    scale: f32,

    /// Number of noise octaves (1-10).
    #[arg(long, default_value = "4")]
    octaves: u8,

    /// Amplitude decay per octave (persistence).
    #[arg(long, default_value = "0.5")]
    persistence: f32,

    /// Frequency multiplier per octave (lacunarity).
    #[arg(long, default_value = "2.0")]
    lacunarity: f32,

    /// Tiling period along x (0 disables tiling).
    #[arg(long, default_value = "1024.0")]
    repeat_x: f32,

    /// Tiling period along y (0 disables tiling).
    #[arg(long, default_value = "1024.0")]
    repeat_y: f32,

    /// Noise base offset; varies the texture at a fixed repeat interval.
    #[arg(long, default_value = "0")]
    base: i32,

    /// Mountain as "x,y,sigma,amplitude[,hole]"; repeatable.
    #[arg(long = "mountain", value_parser = parse_mountain)]
    mountains: Vec<Mountain>,

    /// Base factor of the mountain modulation.
    #[arg(long, default_value = "0.5")]
    terrain_amplifier: f32,

    // Shaping options
    /// Enable the slope/clamp/flatten transform.
    #[arg(long)]
    shaped: bool,

    /// Lower clamp bound after normalization.
    #[arg(long, default_value = "0.0")]
    min_height: f32,

    /// Upper clamp bound after normalization.
    #[arg(long, default_value = "1.0")]
    max_height: f32,

    /// Divisor applied after clamping.
    #[arg(long, default_value = "1.0")]
    flatness: f32,

    /// Slope bias at the first column.
    #[arg(long, default_value = "0.0")]
    slope_x_begin: f32,

    /// Slope bias at the last column.
    #[arg(long, default_value = "0.0")]
    slope_x_end: f32,

    /// Slope bias at the first row.
    #[arg(long, default_value = "0.0")]
    slope_y_begin: f32,

    /// Slope bias at the last row.
    #[arg(long, default_value = "0.0")]
    slope_y_end: f32,

    // Forest options
    /// Skip forest growth entirely.
    #[arg(long)]
    skip_forest: bool,

    /// Number of initial trees.
    #[arg(long, default_value = "5")]
    trees: u32,

    /// Maximum cell distance around a tree where seeds spawn.
    #[arg(long, default_value = "15")]
    seed_radius: u32,

    /// Initial probability of a seed growing into a tree.
    #[arg(long, default_value = "0.05")]
    seed_strength: f64,

    /// Fraction of seed strength lost per iteration.
    #[arg(long, default_value = "0.2")]
    seed_decay: f64,

    /// Number of seed-grow-decay iterations.
    #[arg(long, default_value = "3", conflicts_with = "coverage")]
    iterations: u32,

    /// Grow until this tree coverage fraction instead of a fixed
    /// iteration count.
    #[arg(long)]
    coverage: Option<f64>,

    /// Minimum distance between tree centers.
    #[arg(long, default_value = "5")]
    spacing: u32,

    /// Trees below this normalized height are pruned.
    #[arg(long, default_value = "0.0")]
    prune_min_height: f32,

    /// Trees above this normalized height are pruned.
    #[arg(long, default_value = "1.0")]
    prune_max_height: f32,

    /// Trees on normalized slope steeper than this are pruned.
    #[arg(long, default_value = "1.0")]
    max_slope: f32,

    /// Mark pruned cells unplantable instead of clearing them.
    #[arg(long)]
    exclude_pruned: bool,

    // Scene options
    /// World units per grid cell in the exported bundle.
    #[arg(long, default_value = "100.0")]
    world_scale: f32,

    /// Elevation multiplier in the exported bundle.
    #[arg(long, default_value = "100.0")]
    z_multiplier: f32,

    /// Texture coordinate scale in the exported bundle.
    #[arg(long, default_value = "1.0")]
    uv_scale: f32,

    /// Water plane level.
    #[arg(long)]
    water_level: Option<f32>,

    /// Fog density.
    #[arg(long)]
    fog_density: Option<f32>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    /// Flat JSON bundle (heightmap + vegetation + scene parameters).
    Json,
    /// Heightmap as comma-separated rows.
    Csv,
    /// 16-bit grayscale PNG heightmap.
    Png,
}

fn parse_mountain(s: &str) -> Result<Mountain, String> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 4 && parts.len() != 5 {
        return Err("expected x,y,sigma,amplitude[,hole]".to_string());
    }

    let x = parts[0].trim().parse().map_err(|_| "invalid x".to_string())?;
    let y = parts[1].trim().parse().map_err(|_| "invalid y".to_string())?;
    let sigma = parts[2].trim().parse().map_err(|_| "invalid sigma".to_string())?;
    let amplitude = parts[3]
        .trim()
        .parse()
        .map_err(|_| "invalid amplitude".to_string())?;
    let hole = match parts.get(4).map(|p| p.trim()) {
        None => false,
        Some("hole") | Some("true") => true,
        Some("peak") | Some("false") => false,
        Some(other) => return Err(format!("invalid hole flag '{}'", other)),
    };

    Ok(Mountain {
        x,
        y,
        sigma,
        amplitude,
        hole,
    })
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => run_generate(args),
        Commands::Info { width, height } => run_info(width, height),
    }
}

fn run_generate(args: GenerateArgs) {
    if args.width == 0 || args.height == 0 {
        eprintln!("Error: Grid dimensions must be positive");
        std::process::exit(1);
    }

    if args.octaves < 1 {
        eprintln!("Error: Octaves must be at least 1");
        std::process::exit(1);
    }

    // Generate seed if not provided
    let seed = args.seed.unwrap_or_else(|| {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos() as u64
    });

    println!("Terragen - Procedural Terrain Generator");
    println!("=======================================");
    println!("Grid: {}x{}", args.width, args.height);
    println!("Seed: {}", seed);
    println!("Output: {}", args.output.display());

    let start = Instant::now();

    // Create noise configuration
    let noise_config = NoiseConfig {
        height: args.height,
        width: args.width,
        scale: args.scale,
        octaves: args.octaves,
        persistence: args.persistence,
        lacunarity: args.lacunarity,
        repeat_x: args.repeat_x,
        repeat_y: args.repeat_y,
        base: args.base,
    };

    let mode = if args.shaped {
        TerrainMode::Shaped(TerrainTransform {
            min_height: args.min_height,
            max_height: args.max_height,
            flatness: args.flatness,
            slope_x_begin: args.slope_x_begin,
            slope_x_end: args.slope_x_end,
            slope_y_begin: args.slope_y_begin,
            slope_y_end: args.slope_y_end,
        })
    } else {
        TerrainMode::NoiseOnly
    };

    if !args.mountains.is_empty() {
        println!("Mountains: {}", args.mountains.len());
    }

    // Create and run pipeline
    println!("\nRunning generation pipeline...");
    let mut pipeline = Pipeline::new();
    pipeline.add_stage(HeightmapStage {
        noise: noise_config,
        mountains: args.mountains.clone(),
        mode,
        terrain_amplifier: args.terrain_amplifier,
    });

    if !args.skip_forest {
        let forest_config = ForestConfig {
            height: args.height,
            width: args.width,
            initial_trees: args.trees,
            seed_radius: args.seed_radius,
            seed_strength: args.seed_strength,
            seed_decay_rate: args.seed_decay,
            termination: match args.coverage {
                Some(target) => Termination::Coverage(target),
                None => Termination::Iterations(args.iterations),
            },
            space_between_trees: args.spacing,
            min_height: args.prune_min_height,
            max_height: args.prune_max_height,
            max_slope: args.max_slope,
            prune_mode: if args.exclude_pruned {
                PruneMode::Exclude
            } else {
                PruneMode::Clear
            },
            ..Default::default()
        };
        pipeline.add_stage(VegetationStage::new(forest_config));
    } else {
        println!("Forest growth: SKIPPED");
    }

    let mut scene = TerrainScene::new(args.height, args.width, seed);
    scene.water_level = args.water_level;
    scene.fog_density = args.fog_density;

    pipeline
        .run_with_callbacks(
            &mut scene,
            |name, i, total| {
                println!("  [{}/{}] Starting: {}", i + 1, total, name);
            },
            |name, i, total| {
                println!("  [{}/{}] Completed: {}", i + 1, total, name);
            },
        )
        .unwrap_or_else(|e| {
            eprintln!("Error during generation: {}", e);
            std::process::exit(1);
        });

    let gen_time = start.elapsed();
    println!("Generation completed in {:.2?}", gen_time);

    let heightmap = scene.heightmap.as_ref().expect("pipeline produced no heightmap");
    let (min_h, max_h) = heightmap.value_range();
    println!("Height range: [{:.4}, {:.4}]", min_h, max_h);

    if let Some(vegetation) = &scene.vegetation {
        let tree_cells = vegetation.count(VegetationCell::Tree);
        println!(
            "Trees: {} ({:.2}% coverage)",
            tree_cells,
            100.0 * tree_cells as f64 / vegetation.len() as f64
        );
    }

    // Export
    println!("\nExporting...");
    let export_start = Instant::now();

    std::fs::create_dir_all(&args.output).unwrap_or_else(|e| {
        eprintln!("Error creating output directory: {}", e);
        std::process::exit(1);
    });

    match args.format {
        ExportFormat::Json => {
            let params = SceneParams {
                scale: args.world_scale,
                z_multiplier: args.z_multiplier,
                uv_scale: args.uv_scale,
                water_level: scene.water_level,
                fog_density: scene.fog_density,
            };
            // A skipped forest exports an all-empty vegetation grid.
            let empty;
            let vegetation = match &scene.vegetation {
                Some(grid) => grid,
                None => {
                    empty = ForestGrid::new(args.height, args.width);
                    &empty
                }
            };
            let bundle = TerrainExport::new(heightmap, vegetation, &params)
                .unwrap_or_else(|e| {
                    eprintln!("Error building bundle: {}", e);
                    std::process::exit(1);
                });
            let path = args.output.join(format!("{}.json", args.name));
            bundle.write_json(&path).unwrap_or_else(|e| {
                eprintln!("Error exporting JSON: {}", e);
                std::process::exit(1);
            });
            println!("  Exported bundle: {}", path.display());
        }
        ExportFormat::Csv => {
            let path = args.output.join(format!("{}.csv", args.name));
            export_heightmap_csv(heightmap, &path).unwrap_or_else(|e| {
                eprintln!("Error exporting CSV: {}", e);
                std::process::exit(1);
            });
            println!("  Exported heightmap: {}", path.display());
        }
        ExportFormat::Png => {
            let options = PngExportOptions::auto_range(heightmap);
            let path = args.output.join(format!("{}.png", args.name));
            export_heightmap_png(heightmap, &path, &options).unwrap_or_else(|e| {
                eprintln!("Error exporting PNG: {}", e);
                std::process::exit(1);
            });
            println!("  Exported heightmap: {}", path.display());
        }
    }

    let export_time = export_start.elapsed();
    println!("Export completed in {:.2?}", export_time);
    println!("\nTotal time: {:.2?}", start.elapsed());
    println!("Done!");
}

fn run_info(width: u32, height: u32) {
    let cells = (width as u64) * (height as u64);

    let bytes_heights = cells * 4; // f32
    let bytes_vegetation = cells; // i8 codes
    let bytes_strengths = cells * 8; // f64 seed strengths
    let bytes_png = cells * 2; // 16-bit

    println!("Terragen - Scene Configuration Info");
    println!("===================================");
    println!();
    println!("Grid: {}x{} ({} cells)", width, height, cells);
    println!();
    println!("Memory usage (in-memory):");
    println!(
        "  Heightmap:      {:>12} bytes ({:.2} MB)",
        bytes_heights,
        bytes_heights as f64 / 1024.0 / 1024.0
    );
    println!(
        "  Vegetation:     {:>12} bytes ({:.2} MB)",
        bytes_vegetation,
        bytes_vegetation as f64 / 1024.0 / 1024.0
    );
    println!(
        "  Seed strengths: {:>12} bytes ({:.2} MB)",
        bytes_strengths,
        bytes_strengths as f64 / 1024.0 / 1024.0
    );
    println!();
    println!("Export file sizes (approximate):");
    println!(
        "  PNG (16-bit):   {:>12} bytes ({:.2} MB)",
        bytes_png,
        bytes_png as f64 / 1024.0 / 1024.0
    );
    let bytes_json = cells * 10; // ~10 chars per height value
    println!(
        "  JSON bundle:    {:>12} bytes ({:.2} MB)",
        bytes_json,
        bytes_json as f64 / 1024.0 / 1024.0
    );
}
