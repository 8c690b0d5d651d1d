//! Procedural level generation with playability validation.
//!
//! A level is built in layers: a walled square room sized by the complexity
//! factor, optional interior partitions, scattered wall cells, and a door on
//! the outer ring. The result is accepted only if enough floor is reachable
//! from the door; otherwise generation retries at a lower complexity. After a
//! bounded number of attempts the generator falls back to a plain room that
//! is valid by construction, so callers always receive a playable `Level`.
use crate::engine::{Cell, Grid, PieceKind, Position};
use crate::error::GridError;
use crate::pathfinding::{door_adjacent_empty, find_all_reachable_positions};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Side length of the room at complexity 0.
pub const MIN_ROOM_SIZE: usize = 6;
/// Side length of the room at complexity 1.
pub const MAX_ROOM_SIZE: usize = 12;

const ROOM_TYPES: [&str; 8] = [
    "Bedroom", "Study", "Kitchen", "Lounge", "Office", "Studio", "Library", "Workshop",
];

/// Pieces available to place in a level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    pub single: u32,
    pub rectangular: u32,
    #[serde(rename = "l-shaped")]
    pub l_shaped: u32,
}

impl Inventory {
    /// Derives the starting stock for a `width × height` room.
    ///
    /// Counts scale with the estimated floor area (60% of the room) and shrink as
    /// complexity rises, with at least two singles and one of each other kind.
    ///
    /// # Examples
    /// ```
    /// use roomfill::generator::Inventory;
    /// let inventory = Inventory::for_room(6, 6, 0.0);
    /// assert_eq!((inventory.single, inventory.rectangular, inventory.l_shaped), (2, 1, 1));
    /// ```
    pub fn for_room(width: usize, height: usize, complexity: f64) -> Self {
        let area = (width * height) as f64 * 0.6;
        let scale = 1.0 - 0.3 * complexity;
        let scaled = |divisor: f64, minimum: u32| ((area / divisor * scale).floor() as u32).max(minimum);
        Inventory {
            single: scaled(10.0, 2),
            rectangular: scaled(15.0, 1),
            l_shaped: scaled(20.0, 1),
        }
    }

    pub fn count(&self, kind: PieceKind) -> u32 {
        match kind {
            PieceKind::Single => self.single,
            PieceKind::Rectangular => self.rectangular,
            PieceKind::LShaped => self.l_shaped,
        }
    }

    fn slot(&mut self, kind: PieceKind) -> &mut u32 {
        match kind {
            PieceKind::Single => &mut self.single,
            PieceKind::Rectangular => &mut self.rectangular,
            PieceKind::LShaped => &mut self.l_shaped,
        }
    }

    /// Removes one piece of `kind`. Returns `false` if none are left.
    pub fn take(&mut self, kind: PieceKind) -> bool {
        let slot = self.slot(kind);
        if *slot == 0 {
            return false;
        }
        *slot -= 1;
        true
    }

    /// Returns one piece of `kind` to the stock.
    pub fn give_back(&mut self, kind: PieceKind) {
        *self.slot(kind) += 1;
    }

    pub fn total(&self) -> u32 {
        self.single + self.rectangular + self.l_shaped
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// A generated room. Immutable once produced; play sessions build their own grid from it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub name: String,
    pub level_number: u32,
    pub width: usize,
    pub height: usize,
    /// Complexity the accepted layout was generated at, after any retries.
    pub complexity: f64,
    /// Wall cells in row-major order.
    pub walls: Vec<Position>,
    pub door: Position,
    pub inventory: Inventory,
}

impl Level {
    /// Builds the level's grid: floor everywhere, then walls, then the door.
    ///
    /// # Returns
    /// `Err(GridError::OutOfBounds)` if a wall or the door lies outside the level's
    /// dimensions, which can only happen for hand-edited level files.
    pub fn to_grid(&self) -> Result<Grid, GridError> {
        let mut grid = Grid::new(self.width, self.height);
        for &wall in &self.walls {
            grid.set(wall, Cell::Wall)?;
        }
        grid.set(self.door, Cell::Door)?;
        Ok(grid)
    }
}

/// Tuning knobs for the retry loop.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Layouts tried before falling back to the plain room.
    pub max_attempts: u32,
    /// How much complexity drops after each rejected layout.
    pub complexity_step: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            max_attempts: 32,
            complexity_step: 0.1,
        }
    }
}

/// Why a candidate layout was thrown away.
#[derive(Error, Debug)]
enum Rejection {
    #[error("door has no free floor next to it")]
    DoorBlocked,
    #[error("only {reachable} floor cells reachable, need {required}")]
    TooSmall { reachable: usize, required: usize },
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Side length of the (square) room for a complexity factor.
pub fn room_size(complexity: f64) -> usize {
    let span = (MAX_ROOM_SIZE - MIN_ROOM_SIZE) as f64;
    MIN_ROOM_SIZE + (complexity * span).floor() as usize
}

/// Minimum floor cells that must be reachable from the door for a layout to be accepted.
pub fn min_reachable_cells(complexity: f64) -> usize {
    (10.0 + 20.0 * complexity).floor() as usize
}

fn clamp_complexity(complexity: f64) -> f64 {
    if complexity.is_nan() {
        0.0
    } else {
        complexity.clamp(0.0, 1.0)
    }
}

/// Generates a level with the default retry settings.
///
/// # Arguments
/// * `complexity`: Difficulty in `[0, 1]`; values outside are clamped.
/// * `level_number`: Ordinal used only in the level's display name.
/// * `rng`: Source of randomness for walls, door placement, and naming.
pub fn generate_level<R: Rng + ?Sized>(complexity: f64, level_number: u32, rng: &mut R) -> Level {
    generate_level_with_config(complexity, level_number, &GeneratorConfig::default(), rng)
}

/// Generates a level reproducibly from `seed`.
///
/// # Examples
/// ```
/// use roomfill::generator::generate_level_with_seed;
/// let a = generate_level_with_seed(0.5, 3, 42);
/// let b = generate_level_with_seed(0.5, 3, 42);
/// assert_eq!(a, b);
/// ```
pub fn generate_level_with_seed(complexity: f64, level_number: u32, seed: u64) -> Level {
    let mut rng = SmallRng::seed_from_u64(seed);
    generate_level(complexity, level_number, &mut rng)
}

/// Generates a level, retrying at lower complexity until a layout validates.
///
/// Each rejected layout lowers the complexity by `config.complexity_step` (never below
/// zero). When `config.max_attempts` layouts have been rejected the plain fallback
/// room is returned.
pub fn generate_level_with_config<R: Rng + ?Sized>(
    complexity: f64,
    level_number: u32,
    config: &GeneratorConfig,
    rng: &mut R,
) -> Level {
    let mut complexity = clamp_complexity(complexity);

    for attempt in 1..=config.max_attempts {
        let size = room_size(complexity);
        let candidate = build_layout(size, size, complexity, rng).map_err(Rejection::from);
        let outcome = candidate.and_then(|(grid, door)| {
            validate(&grid, door, complexity).map(|reachable| (grid, door, reachable))
        });

        match outcome {
            Ok((grid, door, reachable)) => {
                let level = finish_level(&grid, door, complexity, level_number, rng);
                log::info!(
                    "generated '{}' ({}x{}, complexity {:.2}, {} reachable cells) after {} attempt(s)",
                    level.name,
                    level.width,
                    level.height,
                    level.complexity,
                    reachable,
                    attempt
                );
                return level;
            }
            Err(reason) => {
                log::debug!(
                    "attempt {} at complexity {:.2} rejected: {}",
                    attempt,
                    complexity,
                    reason
                );
                complexity = lower_complexity(complexity, config.complexity_step);
            }
        }
    }

    log::warn!(
        "no layout accepted after {} attempts, using the plain room",
        config.max_attempts
    );
    fallback_level(level_number, rng)
}

/// Steps complexity down for a retry, never below zero.
///
/// The result is rounded to six decimals so repeated steps land on the intended
/// values (0.4 - 0.1 gives exactly 0.3) instead of drifting past a layout threshold.
fn lower_complexity(complexity: f64, step: f64) -> f64 {
    let lowered = (complexity - step).max(0.0);
    (lowered * 1e6).round() / 1e6
}

/// Builds a candidate grid and returns it with its door position.
fn build_layout<R: Rng + ?Sized>(
    width: usize,
    height: usize,
    complexity: f64,
    rng: &mut R,
) -> Result<(Grid, Position), GridError> {
    let mut grid = walled_room(width, height)?;

    if complexity > 0.3 {
        if complexity <= 0.7 {
            carve_partition(&mut grid, rng)?;
        } else {
            carve_sections(&mut grid, rng)?;
        }
    }

    scatter_walls(&mut grid, 0.1 + 0.2 * complexity, rng)?;
    let door = place_door(&mut grid, rng)?;
    Ok((grid, door))
}

fn walled_room(width: usize, height: usize) -> Result<Grid, GridError> {
    let mut grid = Grid::new(width, height);
    for pos in ring_positions(&grid) {
        grid.set(pos, Cell::Wall)?;
    }
    Ok(grid)
}

fn ring_positions(grid: &Grid) -> Vec<Position> {
    let (w, h) = (grid.width() as i32, grid.height() as i32);
    grid.positions()
        .filter(|p| p.x == 0 || p.y == 0 || p.x == w - 1 || p.y == h - 1)
        .collect()
}

/// Turns `pos` into a wall if it is currently floor.
fn wall_if_empty(grid: &mut Grid, pos: Position) -> Result<(), GridError> {
    if grid.is_empty_at(pos) {
        grid.set(pos, Cell::Wall)?;
    }
    Ok(())
}

/// Carves an L- or U-shaped partition.
///
/// A vertical arm hangs from the top or bottom wall and stops at least two rows short
/// of the opposite wall. Half the time a horizontal foot extends from its free end
/// (never touching a side wall), and given a foot there is a chance of a second,
/// shorter arm rising from the foot's end that leaves a one-cell opening at the wall.
fn carve_partition<R: Rng + ?Sized>(grid: &mut Grid, rng: &mut R) -> Result<(), GridError> {
    let (w, h) = (grid.width() as i32, grid.height() as i32);
    if w < 7 || h < 7 {
        return Ok(());
    }

    // Keep the arm off the side walls so floor stays open on both sides of it.
    let arm_x = rng.gen_range(2..=w - 3);
    let arm_len = rng.gen_range((h - 2) / 2..=h - 4);
    let from_top = rng.gen_bool(0.5);
    // Rows run from the wall the arm hangs on toward its free end.
    let (wall_row, toward) = if from_top { (0, 1) } else { (h - 1, -1) };
    for i in 1..=arm_len {
        wall_if_empty(grid, Position::new(arm_x, wall_row + toward * i))?;
    }

    if !rng.gen_bool(0.5) {
        return Ok(());
    }
    // The foot runs sideways from the arm's free end.
    let tip_row = wall_row + toward * arm_len;
    let dir = if rng.gen_bool(0.5) { 1 } else { -1 };
    let room_left = if dir > 0 { w - 3 - arm_x } else { arm_x - 2 };
    if room_left < 1 {
        return Ok(());
    }
    let foot_len = rng.gen_range(1..=room_left);
    for i in 1..=foot_len {
        wall_if_empty(grid, Position::new(arm_x + dir * i, tip_row))?;
    }

    if rng.gen_bool(0.4) {
        let second_x = arm_x + dir * foot_len;
        // Stop one row short of the wall so the U stays open.
        for i in 1..arm_len - 1 {
            wall_if_empty(grid, Position::new(second_x, tip_row - toward * i))?;
        }
    }
    Ok(())
}

/// Splits the room with 2–5 straight dividers, each with exactly one gap.
///
/// A divider is skipped when its line is already used or when walling it would split
/// the floor. Earlier gaps are never walled over.
///
/// # Returns
/// The gap cell of every divider that was drawn.
fn carve_sections<R: Rng + ?Sized>(grid: &mut Grid, rng: &mut R) -> Result<HashSet<Position>, GridError> {
    let (w, h) = (grid.width() as i32, grid.height() as i32);
    let mut gaps = HashSet::new();
    if w < 5 || h < 5 {
        return Ok(gaps);
    }

    let mut used_rows = HashSet::new();
    let mut used_cols = HashSet::new();
    let dividers = rng.gen_range(2..=5);
    for _ in 0..dividers {
        let horizontal = rng.gen_bool(0.5);
        // The divider spans the whole interior along one row or column.
        let line: Vec<Position> = if horizontal {
            let y = rng.gen_range(2..=h - 3);
            if used_rows.contains(&y) {
                continue;
            }
            (1..=w - 2).map(|x| Position::new(x, y)).collect()
        } else {
            let x = rng.gen_range(2..=w - 3);
            if used_cols.contains(&x) {
                continue;
            }
            (1..=h - 2).map(|y| Position::new(x, y)).collect()
        };

        // The gap must be open floor.
        let open: Vec<Position> = line.iter().copied().filter(|&p| grid.is_empty_at(p)).collect();
        let Some(&gap) = open.choose(rng) else {
            continue;
        };

        // Wall the line on a copy so a divider that seals off a section can be dropped.
        let mut trial = grid.clone();
        for &pos in line.iter().filter(|&&p| p != gap && !gaps.contains(&p)) {
            wall_if_empty(&mut trial, pos)?;
        }
        if !floor_connected(&trial) {
            log::debug!("divider through {} would split the room, skipped", gap);
            continue;
        }

        *grid = trial;
        gaps.insert(gap);
        if horizontal {
            used_rows.insert(gap.y);
        } else {
            used_cols.insert(gap.x);
        }
    }
    Ok(gaps)
}

/// Returns `true` if every floor cell can reach every other one.
fn floor_connected(grid: &Grid) -> bool {
    let floor = grid.positions_where(|c| c == Cell::Empty);
    match floor.first() {
        Some(&start) => find_all_reachable_positions(start, grid).len() == floor.len(),
        None => true,
    }
}

fn scatter_walls<R: Rng + ?Sized>(grid: &mut Grid, density: f64, rng: &mut R) -> Result<(), GridError> {
    let density = density.clamp(0.0, 1.0);
    let floor = grid.positions_where(|c| c == Cell::Empty);
    for pos in floor {
        if rng.gen_bool(density) {
            grid.set(pos, Cell::Wall)?;
        }
    }
    Ok(())
}

/// The cell just inside the room from a ring position.
fn interior_neighbor(grid: &Grid, pos: Position) -> Position {
    let (w, h) = (grid.width() as i32, grid.height() as i32);
    if pos.x == 0 {
        pos.offset(1, 0)
    } else if pos.x == w - 1 {
        pos.offset(-1, 0)
    } else if pos.y == 0 {
        pos.offset(0, 1)
    } else if pos.y == h - 1 {
        pos.offset(0, -1)
    } else {
        pos
    }
}

/// Puts the door on a random non-corner ring cell that opens onto floor.
///
/// Falls back to the middle of the left wall when no ring cell qualifies; validation
/// then decides whether that layout is usable.
fn place_door<R: Rng + ?Sized>(grid: &mut Grid, rng: &mut R) -> Result<Position, GridError> {
    let (w, h) = (grid.width() as i32, grid.height() as i32);
    let is_corner = |p: &Position| (p.x == 0 || p.x == w - 1) && (p.y == 0 || p.y == h - 1);

    let mut candidates: Vec<Position> = ring_positions(grid)
        .into_iter()
        .filter(|p| !is_corner(p))
        .collect();
    candidates.shuffle(rng);

    // Ring cells in random order; the first with floor behind it becomes the door.
    let room: &Grid = grid;
    let door = candidates
        .into_iter()
        .find(|&p| room.is_empty_at(interior_neighbor(room, p)))
        .unwrap_or(Position::new(0, h / 2));
    grid.set(door, Cell::Door)?;
    Ok(door)
}

/// Checks the layout is playable and returns how much floor the door reaches.
fn validate(grid: &Grid, door: Position, complexity: f64) -> Result<usize, Rejection> {
    let seed = door_adjacent_empty(grid, door).ok_or(Rejection::DoorBlocked)?;
    let reachable = find_all_reachable_positions(seed, grid).len();
    let required = min_reachable_cells(complexity);
    if reachable < required {
        return Err(Rejection::TooSmall {
            reachable,
            required,
        });
    }
    Ok(reachable)
}

fn finish_level<R: Rng + ?Sized>(
    grid: &Grid,
    door: Position,
    complexity: f64,
    level_number: u32,
    rng: &mut R,
) -> Level {
    Level {
        name: level_name(level_number, grid.width(), complexity, rng),
        level_number,
        width: grid.width(),
        height: grid.height(),
        complexity,
        walls: grid.positions_where(|c| c == Cell::Wall),
        door,
        inventory: Inventory::for_room(grid.width(), grid.height(), complexity),
    }
}

/// A walled room of the minimum size with the door in the middle of the left wall.
/// Its 16 floor cells all connect to the door, so it always passes validation.
fn fallback_level<R: Rng + ?Sized>(level_number: u32, rng: &mut R) -> Level {
    let size = MIN_ROOM_SIZE;
    let door = Position::new(0, (size / 2) as i32);
    let walls = (0..size as i32)
        .flat_map(|y| (0..size as i32).map(move |x| Position::new(x, y)))
        .filter(|p| p.x == 0 || p.y == 0 || p.x == size as i32 - 1 || p.y == size as i32 - 1)
        .filter(|&p| p != door)
        .collect();
    Level {
        name: level_name(level_number, size, 0.0, rng),
        level_number,
        width: size,
        height: size,
        complexity: 0.0,
        walls,
        door,
        inventory: Inventory::for_room(size, size, 0.0),
    }
}

/// Cosmetic display name, e.g. `"Level 4: Medium Tricky Study"`.
fn level_name<R: Rng + ?Sized>(level_number: u32, size: usize, complexity: f64, rng: &mut R) -> String {
    let size_tier = match size {
        0..=7 => "Small",
        8..=10 => "Medium",
        _ => "Large",
    };
    let complexity_tier = if complexity <= 0.3 {
        "Cozy"
    } else if complexity <= 0.7 {
        "Tricky"
    } else {
        "Cramped"
    };
    let room = ROOM_TYPES.choose(rng).copied().unwrap_or("Room");
    format!("Level {}: {} {} {}", level_number, size_tier, complexity_tier, room)
}
