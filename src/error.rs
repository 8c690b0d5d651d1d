//! Error types for grid construction and piece placement.
//!
//! Missing paths and unreachable cells are not errors; the engine reports
//! them as `None`, empty sets, or `false`. These types cover malformed
//! input and rejected placement attempts.

use crate::engine::{PieceKind, Position};
use thiserror::Error;

/// Raised when a grid is built from malformed input or addressed outside
/// its bounds.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    /// The input had no rows, or its first row had no cells.
    #[error("grid must have at least one row and one column")]
    Empty,

    /// A row's length differs from the first row's.
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// A character in a text grid does not name any cell.
    #[error("unrecognized character '{ch}' in row {row} col {col}")]
    UnrecognizedCell { ch: char, row: usize, col: usize },

    #[error("position {0} is outside the grid")]
    OutOfBounds(Position),

    #[error("grid has no door cell")]
    MissingDoor,

    #[error("grid has {0} door cells, expected exactly one")]
    MultipleDoors(usize),
}

/// Why a piece could not be placed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlacementError {
    #[error("no {0} pieces left in the inventory")]
    OutOfStock(PieceKind),

    #[error("piece would extend outside the room at {0}")]
    OutOfBounds(Position),

    #[error("cell {0} is not free floor")]
    Occupied(Position),

    /// Placing the piece would leave some piece group without a route to
    /// the door.
    #[error("placement would cut a piece off from the door")]
    DisconnectsPieces,
}
