use clap::Parser;
use roomfill::engine::{PieceKind, Position, Room, Rotation};
use roomfill::generator::{generate_level_with_seed, Level};
use roomfill::utils::render_grid;
use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Fill a room with furniture without blocking the door", long_about = None)]
struct Args {
    /// Complexity of the generated room, from 0.0 to 1.0
    #[clap(short, long, default_value_t = 0.3)]
    complexity: f64,

    /// Level number shown in the room's name
    #[clap(short, long, default_value_t = 1)]
    level: u32,

    /// Seed for level generation; random when omitted
    #[clap(short, long)]
    seed: Option<u64>,

    /// Play a level saved by `level_gen --out` instead of generating one
    #[clap(long)]
    level_file: Option<PathBuf>,
}

#[derive(Debug, PartialEq)]
enum Command {
    Place(PieceKind, Position, Rotation),
    Remove(Position),
    Undo,
    Hint,
    Quit,
}

const USAGE: &str = "Commands: 'p <s|r|l> <x> <y> [0|90|180|270]' place, 'r <x> <y>' remove, 'u' undo, 'h' hint, 'q' quit";

fn parse_kind(s: &str) -> Option<PieceKind> {
    match s {
        "s" => Some(PieceKind::Single),
        "r" => Some(PieceKind::Rectangular),
        "l" => Some(PieceKind::LShaped),
        _ => None,
    }
}

fn parse_position(x: &str, y: &str) -> Result<Position, String> {
    match (x.parse::<i32>(), y.parse::<i32>()) {
        (Ok(x), Ok(y)) => Ok(Position::new(x, y)),
        _ => Err(format!("Invalid coordinates '{} {}': expected two integers.", x, y)),
    }
}

fn parse_command(input: &str) -> Result<Command, String> {
    let parts: Vec<&str> = input.split_whitespace().collect();
    match parts.as_slice() {
        ["q"] => Ok(Command::Quit),
        ["u"] => Ok(Command::Undo),
        ["h"] => Ok(Command::Hint),
        ["r", x, y] => Ok(Command::Remove(parse_position(x, y)?)),
        ["p", kind, x, y, rest @ ..] => {
            let kind = parse_kind(kind).ok_or_else(|| format!("Unknown piece '{}': use s, r or l.", kind))?;
            let anchor = parse_position(x, y)?;
            let rotation = match rest {
                [] => Rotation::default(),
                [deg] => deg
                    .parse::<u32>()
                    .ok()
                    .and_then(Rotation::from_degrees)
                    .ok_or_else(|| format!("Invalid rotation '{}': use 0, 90, 180 or 270.", deg))?,
                _ => return Err(USAGE.to_string()),
            };
            Ok(Command::Place(kind, anchor, rotation))
        }
        _ => Err(USAGE.to_string()),
    }
}

fn load_level(args: &Args) -> Result<Level, String> {
    match &args.level_file {
        Some(path) => {
            let content = fs::read_to_string(path)
                .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
            serde_json::from_str(&content).map_err(|e| format!("Invalid level file: {}", e))
        }
        None => {
            let seed = args.seed.unwrap_or_else(rand::random);
            println!("Seed: {}", seed);
            Ok(generate_level_with_seed(args.complexity, args.level, seed))
        }
    }
}

fn main() {
    let args = Args::parse();

    let level = match load_level(&args) {
        Ok(level) => level,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    let mut room = match Room::from_level(&level) {
        Ok(room) => room,
        Err(e) => {
            eprintln!("Level is not playable: {}", e);
            std::process::exit(1);
        }
    };

    println!("Welcome to {}!", level.name);
    println!("{}", USAGE);
    let mut highlights: HashSet<Position> = HashSet::new();

    loop {
        let inv = room.inventory();
        println!("---------------------");
        println!(
            "Pieces left: {} single, {} rectangular, {} l-shaped. Filled: {:.0}%",
            inv.single,
            inv.rectangular,
            inv.l_shaped,
            room.fill_ratio() * 100.0
        );
        println!("{}", render_grid(room.grid(), &highlights));
        highlights.clear();

        if room.is_complete() {
            println!();
            println!("---------------------");
            if room.inventory().is_empty() {
                println!("Room furnished!");
            } else {
                println!("No remaining piece fits anywhere.");
            }
            println!("Pieces placed: {}", room.placed_pieces().len());
            println!("Floor covered: {} cells ({:.0}%)", room.filled_cells(), room.fill_ratio() * 100.0);
            println!("---------------------");
            break;
        }

        print!("> ");
        if io::stdout().flush().is_err() {
            break;
        }

        let mut input = String::new();
        match io::stdin().read_line(&mut input) {
            Ok(0) => break,
            Ok(_) => {}
            Err(_) => {
                println!("Error reading input. Please try again.");
                continue;
            }
        }

        match parse_command(input.trim()) {
            Ok(Command::Quit) => {
                println!("Thanks for playing!");
                break;
            }
            Ok(Command::Undo) => {
                if room.undo_last_move() {
                    println!("Move undone.");
                } else {
                    println!("Nothing to undo.");
                }
            }
            Ok(Command::Hint) => {
                highlights = room.critical_cells();
                println!("Keep the {} cells marked '*' clear.", highlights.len());
            }
            Ok(Command::Remove(pos)) => {
                if room.remove_piece_at(pos) {
                    println!("Piece removed.");
                } else {
                    println!("No piece covers {}.", pos);
                }
            }
            Ok(Command::Place(kind, anchor, rotation)) => match room.place_piece(kind, anchor, rotation) {
                Ok(()) => println!("Placed {} piece at {}.", kind, anchor),
                Err(e) => println!("Cannot place: {}.", e),
            },
            Err(message) => println!("{}", message),
        }
    }
}
