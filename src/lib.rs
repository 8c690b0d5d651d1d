//! # Roomfill Library
//!
//! This library provides the grid model, pathfinding, and level generation for a
//! furniture-placement puzzle: the player fills a walled room with single, rectangular,
//! and L-shaped pieces while keeping every piece reachable from the door.
//!
//! It is used by three binaries:
//! - `room_player`: Plays a generated (or saved) level interactively on the command line.
//! - `level_gen`: Generates a level for a complexity and seed, and prints or saves it as JSON.
//! - `level_evaluator`: Generates many levels across the complexity range and reports averages.
//!
//! ## Modules
//! - `engine`: Cell tags (`Cell`), coordinates (`Position`), the room grid (`Grid`), piece
//!   footprints, and the play session (`Room`) with placement rules and undo.
//! - `pathfinding`: A* shortest paths, BFS reachability, and piece group detection.
//! - `critical`: Finds the empty cells that must stay clear so every piece stays reachable.
//! - `generator`: Procedural level generation (`generate_level`) and piece inventories.
//! - `error`: Error types for malformed grids and rejected placements.
//! - `utils`: Parsing grids from strings and rendering them for the terminal.

pub mod critical;
pub mod engine;
pub mod error;
pub mod generator;
pub mod pathfinding;
pub mod utils;
