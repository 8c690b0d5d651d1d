//! Grid model and play session for the room-filling puzzle.
//!
//! This module defines the values every other module works on:
//! - `Cell`: the tag stored at each grid position (floor, wall, door, or a piece).
//! - `Position` and `Direction`: integer coordinates and the four orthogonal moves.
//! - `Grid`: a rectangular, row-major matrix of `Cell`s with bounds-checked access.
//! - `PieceKind`, `Rotation`, and `footprint`: the shared footprint table that maps
//!   a piece and its rotation to the cells it covers.
//! - `Room`: a play session over a generated `Level`, handling placement, removal,
//!   inventory bookkeeping, and undo history.
use crate::critical::identify_critical_paths;
use crate::error::{GridError, PlacementError};
use crate::generator::{Inventory, Level};
use crate::pathfinding::all_pieces_reachable;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;

/// The tag stored in a single grid cell.
///
/// Exactly one tag occupies each cell at any time. The seven piece variants
/// record which footprint (and for rectangles and L-shapes, which rotation)
/// covers the cell, so a renderer can draw pieces without extra state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    /// Free floor; the only tag that paths may cross.
    Empty,
    Wall,
    /// The room's single entry point. Never traversable as floor.
    Door,
    Single,
    RectHorizontal,
    RectVertical,
    LShape0,
    LShape90,
    LShape180,
    LShape270,
}

impl Cell {
    /// Converts the cell to its character representation.
    ///
    /// # Examples
    ///
    /// ```
    /// use roomfill::engine::Cell;
    /// assert_eq!(Cell::Wall.to_char(), '#');
    /// assert_eq!(Cell::Empty.to_char(), '.');
    /// ```
    pub fn to_char(&self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::Wall => '#',
            Cell::Door => 'D',
            Cell::Single => 'S',
            Cell::RectHorizontal => 'H',
            Cell::RectVertical => 'V',
            Cell::LShape0 => 'L',
            Cell::LShape90 => 'F',
            Cell::LShape180 => '7',
            Cell::LShape270 => 'J',
        }
    }

    /// Parses a character produced by [`Cell::to_char`].
    ///
    /// Returns `None` for characters that do not name a cell.
    pub fn from_char(ch: char) -> Option<Cell> {
        let cell = match ch {
            '.' => Cell::Empty,
            '#' => Cell::Wall,
            'D' => Cell::Door,
            'S' => Cell::Single,
            'H' => Cell::RectHorizontal,
            'V' => Cell::RectVertical,
            'L' => Cell::LShape0,
            'F' => Cell::LShape90,
            '7' => Cell::LShape180,
            'J' => Cell::LShape270,
            _ => return None,
        };
        Some(cell)
    }

    /// Returns `true` if the cell is free floor.
    pub fn is_empty(&self) -> bool {
        *self == Cell::Empty
    }

    /// Returns `true` if the cell is covered by a placed piece.
    pub fn is_piece(&self) -> bool {
        self.piece_kind().is_some()
    }

    /// The kind of piece covering this cell, if any.
    pub fn piece_kind(&self) -> Option<PieceKind> {
        match self {
            Cell::Single => Some(PieceKind::Single),
            Cell::RectHorizontal | Cell::RectVertical => Some(PieceKind::Rectangular),
            Cell::LShape0 | Cell::LShape90 | Cell::LShape180 | Cell::LShape270 => {
                Some(PieceKind::LShaped)
            }
            Cell::Empty | Cell::Wall | Cell::Door => None,
        }
    }
}

/// A grid coordinate. `x` is the column and `y` the row; `(0, 0)` is the top-left cell.
///
/// Coordinates are signed so that neighbors of edge cells can be expressed and then
/// rejected by bounds checks instead of wrapping around.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Position { x, y }
    }

    /// Returns the position shifted by `(dx, dy)`.
    pub fn offset(&self, dx: i32, dy: i32) -> Position {
        Position::new(self.x + dx, self.y + dy)
    }

    /// Returns the neighboring position one step in `direction`.
    pub fn step(&self, direction: Direction) -> Position {
        let (dx, dy) = direction.delta();
        self.offset(dx, dy)
    }

    /// Manhattan distance, the admissible heuristic for 4-connected movement.
    pub fn manhattan(&self, other: &Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

// Row-major: sorting positions walks the grid the way it is printed.
impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.y.cmp(&other.y).then(self.x.cmp(&other.x))
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// One of the four orthogonal moves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Right,
    Left,
    Down,
    Up,
}

impl Direction {
    /// All directions in the order searches visit neighbors.
    pub const ALL: [Direction; 4] = [
        Direction::Right,
        Direction::Left,
        Direction::Down,
        Direction::Up,
    ];

    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::Right => (1, 0),
            Direction::Left => (-1, 0),
            Direction::Down => (0, 1),
            Direction::Up => (0, -1),
        }
    }
}

/// A rectangular room stored as a row-major matrix of `Cell`s.
///
/// Every read is bounds-checked: out-of-range positions read as `None` and are never
/// traversable. Writes outside the grid are rejected with [`GridError::OutOfBounds`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Creates a `width × height` grid where every cell is `Cell::Empty`.
    ///
    /// # Examples
    /// ```
    /// use roomfill::engine::{Cell, Grid, Position};
    /// let grid = Grid::new(3, 2);
    /// assert_eq!(grid.get(Position::new(2, 1)), Some(Cell::Empty));
    /// assert_eq!(grid.get(Position::new(3, 0)), None);
    /// ```
    pub fn new(width: usize, height: usize) -> Self {
        Grid {
            width,
            height,
            cells: vec![Cell::Empty; width * height],
        }
    }

    /// Builds a grid from rows of cells, top row first.
    ///
    /// # Returns
    /// * `Ok(Grid)` when every row has the same, non-zero length.
    /// * `Err(GridError::Empty)` if there are no rows or the rows are empty.
    /// * `Err(GridError::RaggedRows)` naming the first row whose length differs from row 0.
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Result<Self, GridError> {
        let width = rows.first().map_or(0, Vec::len);
        if width == 0 {
            return Err(GridError::Empty);
        }
        let height = rows.len();
        let mut cells = Vec::with_capacity(width * height);
        for (row, row_cells) in rows.into_iter().enumerate() {
            if row_cells.len() != width {
                return Err(GridError::RaggedRows {
                    row,
                    expected: width,
                    found: row_cells.len(),
                });
            }
            cells.extend(row_cells);
        }
        Ok(Grid {
            width,
            height,
            cells,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns `true` if `pos` lies within `[0, width) × [0, height)`.
    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if self.in_bounds(pos) {
            Some(pos.y as usize * self.width + pos.x as usize)
        } else {
            None
        }
    }

    /// Returns the cell at `pos`, or `None` if `pos` is outside the grid.
    pub fn get(&self, pos: Position) -> Option<Cell> {
        self.index(pos).map(|i| self.cells[i])
    }

    /// Sets the cell at `pos`.
    ///
    /// # Returns
    /// `Err(GridError::OutOfBounds)` if `pos` is outside the grid; the grid is unchanged.
    pub fn set(&mut self, pos: Position, cell: Cell) -> Result<(), GridError> {
        let i = self.index(pos).ok_or(GridError::OutOfBounds(pos))?;
        self.cells[i] = cell;
        Ok(())
    }

    /// Returns `true` if `pos` is inside the grid and holds `Cell::Empty`.
    pub fn is_empty_at(&self, pos: Position) -> bool {
        self.get(pos) == Some(Cell::Empty)
    }

    /// The in-bounds orthogonal neighbors of `pos`, in [`Direction::ALL`] order.
    pub fn neighbors(&self, pos: Position) -> impl Iterator<Item = Position> + '_ {
        Direction::ALL
            .into_iter()
            .map(move |d| pos.step(d))
            .filter(move |&p| self.in_bounds(p))
    }

    /// Every position of the grid in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> {
        let (width, height) = (self.width as i32, self.height as i32);
        (0..height).flat_map(move |y| (0..width).map(move |x| Position::new(x, y)))
    }

    /// Positions whose cell satisfies `predicate`, row-major.
    pub fn positions_where<F>(&self, predicate: F) -> Vec<Position>
    where
        F: Fn(Cell) -> bool,
    {
        self.positions()
            .filter(|&p| self.get(p).map_or(false, &predicate))
            .collect()
    }

    /// Counts cells satisfying `predicate`.
    pub fn count<F>(&self, predicate: F) -> usize
    where
        F: Fn(Cell) -> bool,
    {
        self.cells.iter().filter(|&&c| predicate(c)).count()
    }

    /// Locates the single door cell.
    ///
    /// # Returns
    /// * `Ok(Position)` when exactly one cell is `Cell::Door`.
    /// * `Err(GridError::MissingDoor)` or `Err(GridError::MultipleDoors)` otherwise.
    pub fn find_door(&self) -> Result<Position, GridError> {
        let doors = self.positions_where(|c| c == Cell::Door);
        match doors.as_slice() {
            [] => Err(GridError::MissingDoor),
            [door] => Ok(*door),
            _ => Err(GridError::MultipleDoors(doors.len())),
        }
    }

    /// Iterates the grid row by row, top first.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.width.max(1))
    }
}

impl fmt::Display for Grid {
    /// One line per row using [`Cell::to_char`], without a trailing newline.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (y, row) in self.rows().enumerate() {
            if y > 0 {
                writeln!(f)?;
            }
            for cell in row {
                write!(f, "{}", cell.to_char())?;
            }
        }
        Ok(())
    }
}

/// The three furniture shapes a room can be filled with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    Single,
    Rectangular,
    LShaped,
}

impl PieceKind {
    pub const ALL: [PieceKind; 3] = [PieceKind::Single, PieceKind::Rectangular, PieceKind::LShaped];

    /// The cell tag stamped onto the grid for this kind at `rotation`.
    pub fn cell(&self, rotation: Rotation) -> Cell {
        match (self, rotation) {
            (PieceKind::Single, _) => Cell::Single,
            (PieceKind::Rectangular, Rotation::R0 | Rotation::R180) => Cell::RectHorizontal,
            (PieceKind::Rectangular, Rotation::R90 | Rotation::R270) => Cell::RectVertical,
            (PieceKind::LShaped, Rotation::R0) => Cell::LShape0,
            (PieceKind::LShaped, Rotation::R90) => Cell::LShape90,
            (PieceKind::LShaped, Rotation::R180) => Cell::LShape180,
            (PieceKind::LShaped, Rotation::R270) => Cell::LShape270,
        }
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PieceKind::Single => "single",
            PieceKind::Rectangular => "rectangular",
            PieceKind::LShaped => "l-shaped",
        };
        f.write_str(name)
    }
}

/// Clockwise rotation of a piece. Only meaningful for rectangular and L-shaped pieces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    R0,
    R90,
    R180,
    R270,
}

impl Rotation {
    pub const ALL: [Rotation; 4] = [Rotation::R0, Rotation::R90, Rotation::R180, Rotation::R270];

    /// Parses 0, 90, 180, or 270 degrees.
    pub fn from_degrees(degrees: u32) -> Option<Rotation> {
        match degrees {
            0 => Some(Rotation::R0),
            90 => Some(Rotation::R90),
            180 => Some(Rotation::R180),
            270 => Some(Rotation::R270),
            _ => None,
        }
    }

    pub fn degrees(&self) -> u32 {
        match self {
            Rotation::R0 => 0,
            Rotation::R90 => 90,
            Rotation::R180 => 180,
            Rotation::R270 => 270,
        }
    }
}

/// Cell offsets `(dx, dy)` covered by a piece anchored at `(0, 0)`.
///
/// This table is the contract between the engine and any renderer: the tag returned by
/// [`PieceKind::cell`] for the same rotation is written to each covered cell.
///
/// # Examples
/// ```
/// use roomfill::engine::{footprint, PieceKind, Rotation};
/// assert_eq!(footprint(PieceKind::Rectangular, Rotation::R90), &[(0, 0), (0, 1)]);
/// assert_eq!(footprint(PieceKind::LShaped, Rotation::R0).len(), 3);
/// ```
pub fn footprint(kind: PieceKind, rotation: Rotation) -> &'static [(i32, i32)] {
    match (kind, rotation) {
        (PieceKind::Single, _) => &[(0, 0)],
        (PieceKind::Rectangular, Rotation::R0 | Rotation::R180) => &[(0, 0), (1, 0)],
        (PieceKind::Rectangular, Rotation::R90 | Rotation::R270) => &[(0, 0), (0, 1)],
        (PieceKind::LShaped, Rotation::R0) => &[(0, 0), (0, 1), (1, 1)],
        (PieceKind::LShaped, Rotation::R90) => &[(0, 0), (1, 0), (0, 1)],
        (PieceKind::LShaped, Rotation::R180) => &[(0, 0), (1, 0), (1, 1)],
        (PieceKind::LShaped, Rotation::R270) => &[(1, 0), (0, 1), (1, 1)],
    }
}

/// A piece that has been placed in a `Room`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedPiece {
    pub kind: PieceKind,
    pub anchor: Position,
    pub rotation: Rotation,
    /// Absolute positions covered, in footprint order.
    pub cells: Vec<Position>,
}

#[derive(Clone, Debug)]
struct Snapshot {
    grid: Grid,
    inventory: Inventory,
    placed: Vec<PlacedPiece>,
}

/// A play session over one generated level.
///
/// A `Room` owns the mutable grid derived from a `Level`, the remaining inventory, and
/// the list of placed pieces. Every successful placement or removal records a snapshot
/// so moves can be undone back to the initial layout.
///
/// # Examples
/// ```
/// use roomfill::engine::{PieceKind, Position, Room, Rotation};
/// use roomfill::generator::generate_level_with_seed;
///
/// let level = generate_level_with_seed(0.0, 1, 7);
/// let room = Room::from_level(&level).expect("generated levels are well formed");
/// let before = room.inventory().count(PieceKind::Single);
///
/// // Try each interior cell until a single piece fits.
/// let placed = room
///     .grid()
///     .positions()
///     .any(|p| room.clone().place_piece(PieceKind::Single, p, Rotation::R0).is_ok());
/// assert!(placed);
/// assert_eq!(room.inventory().count(PieceKind::Single), before);
/// ```
#[derive(Clone, Debug)]
pub struct Room {
    grid: Grid,
    door: Position,
    inventory: Inventory,
    placed: Vec<PlacedPiece>,
    floor_cells: usize,
    history: Vec<Snapshot>,
}

impl Room {
    /// Starts a session on `grid` with the given stock of pieces.
    ///
    /// # Returns
    /// `Err` if the grid does not contain exactly one door.
    pub fn new(grid: Grid, inventory: Inventory) -> Result<Self, GridError> {
        let door = grid.find_door()?;
        let floor_cells = grid.count(|c| c.is_empty());
        let initial = Snapshot {
            grid: grid.clone(),
            inventory,
            placed: Vec::new(),
        };
        Ok(Room {
            grid,
            door,
            inventory,
            placed: Vec::new(),
            floor_cells,
            history: vec![initial],
        })
    }

    /// Starts a session on a freshly built grid for `level`.
    pub fn from_level(level: &Level) -> Result<Self, GridError> {
        Room::new(level.to_grid()?, level.inventory)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn door(&self) -> Position {
        self.door
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn placed_pieces(&self) -> &[PlacedPiece] {
        &self.placed
    }

    /// Checks whether a piece could be placed without changing the room.
    ///
    /// A placement is legal when a piece of that kind is still in stock, every covered
    /// cell is inside the room and free floor, and afterwards every piece group on the
    /// grid can still be reached from the door.
    ///
    /// # Returns
    /// The absolute cells the piece would cover, or the first reason it cannot go there.
    pub fn check_placement(
        &self,
        kind: PieceKind,
        anchor: Position,
        rotation: Rotation,
    ) -> Result<Vec<Position>, PlacementError> {
        if self.inventory.count(kind) == 0 {
            return Err(PlacementError::OutOfStock(kind));
        }

        let cells: Vec<Position> = footprint(kind, rotation)
            .iter()
            .map(|&(dx, dy)| anchor.offset(dx, dy))
            .collect();

        for &cell in &cells {
            match self.grid.get(cell) {
                None => return Err(PlacementError::OutOfBounds(cell)),
                Some(Cell::Empty) => {}
                Some(_) => return Err(PlacementError::Occupied(cell)),
            }
        }

        let mut trial = self.grid.clone();
        stamp(&mut trial, &cells, kind.cell(rotation))?;
        if !all_pieces_reachable(&trial, self.door) {
            return Err(PlacementError::DisconnectsPieces);
        }
        Ok(cells)
    }

    /// Places a piece, taking it from the inventory.
    ///
    /// On success the new state is pushed onto the undo history. On failure the room is
    /// unchanged and the error says why the placement was rejected.
    pub fn place_piece(
        &mut self,
        kind: PieceKind,
        anchor: Position,
        rotation: Rotation,
    ) -> Result<(), PlacementError> {
        let cells = match self.check_placement(kind, anchor, rotation) {
            Ok(cells) => cells,
            Err(err) => {
                log::debug!("rejected {} at {}: {}", kind, anchor, err);
                return Err(err);
            }
        };

        stamp(&mut self.grid, &cells, kind.cell(rotation))?;
        self.inventory.take(kind);
        self.placed.push(PlacedPiece {
            kind,
            anchor,
            rotation,
            cells,
        });
        self.record();
        Ok(())
    }

    /// Removes the piece covering `pos` and returns it to the inventory.
    ///
    /// Freeing cells can only enlarge the reachable floor, so removal never needs a
    /// reachability check.
    ///
    /// # Returns
    /// `false` if no placed piece covers `pos`.
    pub fn remove_piece_at(&mut self, pos: Position) -> bool {
        let Some(index) = self.placed.iter().position(|p| p.cells.contains(&pos)) else {
            return false;
        };
        // Clear the footprint first so a failed write leaves the piece in place.
        if let Err(err) = stamp(&mut self.grid, &self.placed[index].cells, Cell::Empty) {
            log::warn!("could not clear piece at {}: {}", pos, err);
            return false;
        }
        let piece = self.placed.remove(index);
        self.inventory.give_back(piece.kind);
        self.record();
        true
    }

    fn record(&mut self) {
        self.history.push(Snapshot {
            grid: self.grid.clone(),
            inventory: self.inventory,
            placed: self.placed.clone(),
        });
    }

    /// Reverts the last placement or removal.
    ///
    /// # Returns
    /// `false` if the room is already at its initial layout.
    pub fn undo_last_move(&mut self) -> bool {
        if self.history.len() <= 1 {
            return false;
        }
        self.history.pop();
        if let Some(previous) = self.history.last() {
            self.grid = previous.grid.clone();
            self.inventory = previous.inventory;
            self.placed = previous.placed.clone();
        }
        true
    }

    /// Empty cells the player should keep clear, for hinting.
    pub fn critical_cells(&self) -> HashSet<Position> {
        identify_critical_paths(&self.grid, self.door)
    }

    /// Number of cells currently covered by pieces.
    pub fn filled_cells(&self) -> usize {
        self.grid.count(|c| c.is_piece())
    }

    /// Fraction of the room's original floor now covered by pieces, in `[0, 1]`.
    pub fn fill_ratio(&self) -> f64 {
        if self.floor_cells == 0 {
            return 0.0;
        }
        self.filled_cells() as f64 / self.floor_cells as f64
    }

    /// Returns `true` when the inventory is exhausted or no legal placement remains.
    pub fn is_complete(&self) -> bool {
        if self.inventory.is_empty() {
            return true;
        }
        let anchors: Vec<Position> = self.grid.positions().collect();
        !PieceKind::ALL
            .into_iter()
            .filter(|&kind| self.inventory.count(kind) > 0)
            .any(|kind| {
                Rotation::ALL.into_iter().any(|rotation| {
                    anchors
                        .iter()
                        .any(|&anchor| self.check_placement(kind, anchor, rotation).is_ok())
                })
            })
    }
}

fn stamp(grid: &mut Grid, cells: &[Position], tag: Cell) -> Result<(), PlacementError> {
    for &cell in cells {
        grid.set(cell, tag)
            .map_err(|_| PlacementError::OutOfBounds(cell))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::grid_from_str_array;

    fn small_level() -> Level {
        // ######
        // #....#
        // D....#
        // #....#
        // #....#
        // ######
        let grid = grid_from_str_array(&[
            "######", "#....#", "D....#", "#....#", "#....#", "######",
        ])
        .unwrap();
        Level {
            name: "test".to_string(),
            level_number: 1,
            width: 6,
            height: 6,
            complexity: 0.0,
            walls: grid.positions_where(|c| c == Cell::Wall),
            door: Position::new(0, 2),
            inventory: Inventory {
                single: 2,
                rectangular: 1,
                l_shaped: 1,
            },
        }
    }

    #[test]
    fn test_cell_char_round_trip() {
        let all = [
            Cell::Empty,
            Cell::Wall,
            Cell::Door,
            Cell::Single,
            Cell::RectHorizontal,
            Cell::RectVertical,
            Cell::LShape0,
            Cell::LShape90,
            Cell::LShape180,
            Cell::LShape270,
        ];
        for cell in all {
            assert_eq!(Cell::from_char(cell.to_char()), Some(cell));
        }
        assert_eq!(Cell::from_char('x'), None);
    }

    #[test]
    fn test_piece_cells() {
        assert!(Cell::Single.is_piece());
        assert!(Cell::LShape270.is_piece());
        assert!(!Cell::Door.is_piece());
        assert!(!Cell::Empty.is_piece());
        assert_eq!(Cell::RectVertical.piece_kind(), Some(PieceKind::Rectangular));
    }

    #[test]
    fn test_grid_bounds() {
        let mut grid = Grid::new(4, 3);
        assert!(grid.in_bounds(Position::new(3, 2)));
        assert!(!grid.in_bounds(Position::new(4, 2)));
        assert!(!grid.in_bounds(Position::new(-1, 0)));
        assert_eq!(grid.get(Position::new(0, 3)), None);
        assert_eq!(
            grid.set(Position::new(0, -1), Cell::Wall),
            Err(GridError::OutOfBounds(Position::new(0, -1)))
        );
        assert!(grid.set(Position::new(1, 1), Cell::Wall).is_ok());
        assert_eq!(grid.get(Position::new(1, 1)), Some(Cell::Wall));
    }

    #[test]
    fn test_grid_from_rows_ragged() {
        let rows = vec![vec![Cell::Empty; 3], vec![Cell::Empty; 2]];
        assert_eq!(
            Grid::from_rows(rows),
            Err(GridError::RaggedRows {
                row: 1,
                expected: 3,
                found: 2
            })
        );
        assert_eq!(Grid::from_rows(Vec::new()), Err(GridError::Empty));
    }

    #[test]
    fn test_neighbors_are_bounds_checked() {
        let grid = Grid::new(3, 3);
        let corner: Vec<Position> = grid.neighbors(Position::new(0, 0)).collect();
        assert_eq!(corner, vec![Position::new(1, 0), Position::new(0, 1)]);
        assert_eq!(grid.neighbors(Position::new(1, 1)).count(), 4);
    }

    #[test]
    fn test_positions_sort_row_major() {
        let mut positions = vec![Position::new(2, 0), Position::new(0, 1), Position::new(1, 0)];
        positions.sort();
        assert_eq!(
            positions,
            vec![Position::new(1, 0), Position::new(2, 0), Position::new(0, 1)]
        );
    }

    #[test]
    fn test_display_grid() {
        let grid = grid_from_str_array(&["#D#", "#.#"]).unwrap();
        assert_eq!(grid.to_string(), "#D#\n#.#");
    }

    #[test]
    fn test_find_door() {
        let grid = grid_from_str_array(&["#D#", "#.#"]).unwrap();
        assert_eq!(grid.find_door(), Ok(Position::new(1, 0)));
        let none = grid_from_str_array(&["###"]).unwrap();
        assert_eq!(none.find_door(), Err(GridError::MissingDoor));
        let two = grid_from_str_array(&["DD#"]).unwrap();
        assert_eq!(two.find_door(), Err(GridError::MultipleDoors(2)));
    }

    #[test]
    fn test_footprints_match_tags() {
        for kind in PieceKind::ALL {
            for rotation in Rotation::ALL {
                let cells = footprint(kind, rotation);
                let expected = match kind {
                    PieceKind::Single => 1,
                    PieceKind::Rectangular => 2,
                    PieceKind::LShaped => 3,
                };
                assert_eq!(cells.len(), expected);
                assert_eq!(kind.cell(rotation).piece_kind(), Some(kind));
            }
        }
        assert_eq!(
            PieceKind::Rectangular.cell(Rotation::R180),
            Cell::RectHorizontal
        );
    }

    #[test]
    fn test_rotation_degrees() {
        for rotation in Rotation::ALL {
            assert_eq!(Rotation::from_degrees(rotation.degrees()), Some(rotation));
        }
        assert_eq!(Rotation::from_degrees(45), None);
    }

    #[test]
    fn test_room_place_and_remove() {
        let mut room = Room::from_level(&small_level()).unwrap();
        assert_eq!(room.door(), Position::new(0, 2));

        room.place_piece(PieceKind::Rectangular, Position::new(3, 1), Rotation::R90)
            .unwrap();
        assert_eq!(room.grid().get(Position::new(3, 1)), Some(Cell::RectVertical));
        assert_eq!(room.grid().get(Position::new(3, 2)), Some(Cell::RectVertical));
        assert_eq!(room.inventory().count(PieceKind::Rectangular), 0);
        assert_eq!(room.filled_cells(), 2);

        assert!(room.remove_piece_at(Position::new(3, 2)));
        assert_eq!(room.grid().get(Position::new(3, 1)), Some(Cell::Empty));
        assert_eq!(room.inventory().count(PieceKind::Rectangular), 1);
        assert!(!room.remove_piece_at(Position::new(3, 2)));
    }

    #[test]
    fn test_room_remove_clears_whole_footprint() {
        let mut room = Room::from_level(&small_level()).unwrap();
        room.place_piece(PieceKind::LShaped, Position::new(2, 2), Rotation::R0)
            .unwrap();
        assert_eq!(room.filled_cells(), 3);

        // Removing by any covered cell frees all three.
        assert!(room.remove_piece_at(Position::new(3, 3)));
        for cell in [Position::new(2, 2), Position::new(2, 3), Position::new(3, 3)] {
            assert_eq!(room.grid().get(cell), Some(Cell::Empty));
        }
        assert_eq!(room.filled_cells(), 0);
        assert!(room.placed_pieces().is_empty());
        assert_eq!(room.inventory().count(PieceKind::LShaped), 1);
    }

    #[test]
    fn test_room_rejects_bad_placements() {
        let mut room = Room::from_level(&small_level()).unwrap();
        assert_eq!(
            room.check_placement(PieceKind::Single, Position::new(0, 0), Rotation::R0),
            Err(PlacementError::Occupied(Position::new(0, 0)))
        );
        assert_eq!(
            room.check_placement(PieceKind::Rectangular, Position::new(5, 5), Rotation::R0),
            Err(PlacementError::Occupied(Position::new(5, 5)))
        );
        assert_eq!(
            room.check_placement(PieceKind::Rectangular, Position::new(5, 6), Rotation::R0),
            Err(PlacementError::OutOfBounds(Position::new(5, 6)))
        );
        // Covering the only floor cell next to the door blocks every piece.
        room.place_piece(PieceKind::Single, Position::new(4, 4), Rotation::R0)
            .unwrap();
        assert_eq!(
            room.check_placement(PieceKind::Single, Position::new(1, 2), Rotation::R0),
            Err(PlacementError::DisconnectsPieces)
        );
    }

    #[test]
    fn test_room_rejects_cutting_off_a_group() {
        // The right-hand pocket connects to the door only through (2,2).
        let grid = grid_from_str_array(&[
            "######", "######", "D....#", "#.##.#", "#.##.#", "######",
        ])
        .unwrap();
        let inventory = Inventory {
            single: 3,
            rectangular: 0,
            l_shaped: 0,
        };
        let mut room = Room::new(grid, inventory).unwrap();
        room.place_piece(PieceKind::Single, Position::new(4, 4), Rotation::R0)
            .unwrap();
        assert_eq!(
            room.check_placement(PieceKind::Single, Position::new(2, 2), Rotation::R0),
            Err(PlacementError::DisconnectsPieces)
        );
        // A piece touching the first one joins its group instead of sealing it.
        assert!(room
            .place_piece(PieceKind::Single, Position::new(4, 3), Rotation::R0)
            .is_ok());
    }

    #[test]
    fn test_room_out_of_stock() {
        let mut room = Room::from_level(&small_level()).unwrap();
        room.place_piece(PieceKind::LShaped, Position::new(1, 3), Rotation::R0)
            .unwrap();
        assert_eq!(
            room.place_piece(PieceKind::LShaped, Position::new(3, 1), Rotation::R90),
            Err(PlacementError::OutOfStock(PieceKind::LShaped))
        );
    }

    #[test]
    fn test_room_undo() {
        let mut room = Room::from_level(&small_level()).unwrap();
        let initial = room.grid().clone();
        assert!(!room.undo_last_move());

        room.place_piece(PieceKind::Single, Position::new(4, 4), Rotation::R0)
            .unwrap();
        room.place_piece(PieceKind::Single, Position::new(4, 3), Rotation::R0)
            .unwrap();
        assert!(room.remove_piece_at(Position::new(4, 4)));
        assert_eq!(room.placed_pieces().len(), 1);

        assert!(room.undo_last_move());
        assert_eq!(room.placed_pieces().len(), 2);
        assert_eq!(room.inventory().count(PieceKind::Single), 0);

        assert!(room.undo_last_move());
        assert!(room.undo_last_move());
        assert_eq!(room.grid(), &initial);
        assert_eq!(room.inventory().count(PieceKind::Single), 2);
        assert!(!room.undo_last_move());
    }

    #[test]
    fn test_room_fill_ratio_and_completion() {
        let mut room = Room::from_level(&small_level()).unwrap();
        assert_eq!(room.fill_ratio(), 0.0);
        assert!(!room.is_complete());

        room.place_piece(PieceKind::Single, Position::new(4, 4), Rotation::R0)
            .unwrap();
        room.place_piece(PieceKind::Single, Position::new(4, 1), Rotation::R0)
            .unwrap();
        room.place_piece(PieceKind::Rectangular, Position::new(1, 4), Rotation::R0)
            .unwrap();
        assert_eq!(room.filled_cells(), 4);
        assert_eq!(room.fill_ratio(), 0.25);
        // An L-shaped piece is still in stock and fits at (2,1).
        assert!(!room.is_complete());
    }

    #[test]
    fn test_room_complete_when_inventory_empty() {
        let mut level = small_level();
        level.inventory = Inventory {
            single: 1,
            rectangular: 0,
            l_shaped: 0,
        };
        let mut room = Room::from_level(&level).unwrap();
        assert!(!room.is_complete());
        room.place_piece(PieceKind::Single, Position::new(4, 4), Rotation::R0)
            .unwrap();
        assert!(room.is_complete());
        assert_eq!(room.fill_ratio(), 1.0 / 16.0);
    }
}
