use clap::Parser;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use roomfill::critical::identify_critical_paths;
use roomfill::generator::{generate_level_with_config, GeneratorConfig, Level};
use roomfill::pathfinding::{door_adjacent_empty, find_all_reachable_positions};
use roomfill::utils::{describe_level, render_grid};
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Generate a room layout from a seed", long_about = None)]
struct Args {
    /// Complexity from 0.0 (small open room) to 1.0 (large, partitioned room)
    #[clap(short, long)]
    complexity: f64,

    /// Level number used in the generated name
    #[clap(short, long, default_value_t = 1)]
    level: u32,

    /// Seed for the random number generator
    #[clap(short, long, default_value_t = 0)]
    seed: u64,

    /// Write the level as JSON to this path
    #[clap(short, long)]
    out: Option<PathBuf>,

    /// JSON file with generator settings (`max_attempts`, `complexity_step`)
    #[clap(long)]
    config: Option<PathBuf>,
}

fn read_config(path: &PathBuf) -> Result<GeneratorConfig, String> {
    let content = fs::read_to_string(path).map_err(|e| format!("Failed to read config: {}", e))?;
    serde_json::from_str(&content).map_err(|e| format!("Invalid config format: {}", e))
}

fn write_level(path: &PathBuf, level: &Level) -> Result<(), String> {
    let json = serde_json::to_string_pretty(level).map_err(|e| format!("Failed to encode level: {}", e))?;
    fs::write(path, json).map_err(|e| format!("Failed to write {}: {}", path.display(), e))
}

fn run(args: &Args) -> Result<(), String> {
    let config = match &args.config {
        Some(path) => read_config(path)?,
        None => GeneratorConfig::default(),
    };

    let mut rng = SmallRng::seed_from_u64(args.seed);
    let level = generate_level_with_config(args.complexity, args.level, &config, &mut rng);
    println!("{}\n", describe_level(&level).map_err(|e| e.to_string())?);

    let grid = level.to_grid().map_err(|e| e.to_string())?;
    let reachable = door_adjacent_empty(&grid, level.door)
        .map(|start| find_all_reachable_positions(start, &grid).len())
        .unwrap_or(0);
    println!("Reachable floor: {} cells", reachable);

    let critical = identify_critical_paths(&grid, level.door);
    println!("Critical cells in the empty room: {}", critical.len());
    if !critical.is_empty() {
        println!("{}", render_grid(&grid, &critical));
    }

    if let Some(path) = &args.out {
        write_level(path, &level)?;
        println!("\nSaved level to {}", path.display());
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    if let Err(e) = run(&args) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
