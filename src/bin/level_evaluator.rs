use clap::Parser;
use roomfill::critical::identify_critical_paths;
use roomfill::generator::{generate_level_with_seed, Level};
use roomfill::pathfinding::{door_adjacent_empty, find_all_reachable_positions};

const COMPLEXITY_STEPS: u32 = 10;
const START_SEED: u64 = 0;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Report level statistics across the complexity range", long_about = None)]
struct Args {
    /// Number of seeds generated per complexity step
    #[clap(short, long, default_value_t = 20)]
    seeds: u64,
}

/// Measurements of one generated level.
#[derive(Debug, Default, Clone, Copy)]
struct LevelStats {
    size: f64,
    complexity: f64,
    reachable: f64,
    pieces: f64,
    critical: f64,
}

impl LevelStats {
    fn measure(level: &Level) -> Option<LevelStats> {
        let grid = level.to_grid().ok()?;
        let reachable = door_adjacent_empty(&grid, level.door)
            .map(|start| find_all_reachable_positions(start, &grid).len())
            .unwrap_or(0);
        Some(LevelStats {
            size: level.width as f64,
            complexity: level.complexity,
            reachable: reachable as f64,
            pieces: level.inventory.total() as f64,
            critical: identify_critical_paths(&grid, level.door).len() as f64,
        })
    }

    fn add(&mut self, other: &LevelStats) {
        self.size += other.size;
        self.complexity += other.complexity;
        self.reachable += other.reachable;
        self.pieces += other.pieces;
        self.critical += other.critical;
    }

    fn averaged(&self, n: usize) -> LevelStats {
        let n = n.max(1) as f64;
        LevelStats {
            size: self.size / n,
            complexity: self.complexity / n,
            reachable: self.reachable / n,
            pieces: self.pieces / n,
            critical: self.critical / n,
        }
    }
}

fn main() {
    let args = Args::parse();

    println!(
        "Evaluating {} levels per complexity step ({} steps)...",
        args.seeds,
        COMPLEXITY_STEPS + 1
    );
    println!(
        "\n{:<10} {:>6} {:>10} {:>10} {:>8} {:>9}",
        "Requested", "Size", "Effective", "Reachable", "Pieces", "Critical"
    );

    for step in 0..=COMPLEXITY_STEPS {
        let requested = step as f64 / COMPLEXITY_STEPS as f64;
        let mut total = LevelStats::default();
        let mut measured = 0;

        for seed in START_SEED..START_SEED + args.seeds {
            let level = generate_level_with_seed(requested, step, seed);
            match LevelStats::measure(&level) {
                Some(stats) => {
                    total.add(&stats);
                    measured += 1;
                }
                None => eprintln!(
                    "Warning: level '{}' (seed {}) has walls outside its bounds.",
                    level.name, seed
                ),
            }
        }

        let avg = total.averaged(measured);
        println!(
            "{:<10.1} {:>6.1} {:>10.2} {:>10.1} {:>8.1} {:>9.1}",
            requested, avg.size, avg.complexity, avg.reachable, avg.pieces, avg.critical
        );
    }
}
