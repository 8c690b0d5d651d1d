//! Shortest paths and reachability over the room grid.
//!
//! All functions here are stateless: they read a caller-supplied `Grid` and
//! recompute their answer from scratch on every call. Only `Cell::Empty`
//! cells are traversable; walls, the door, and pieces all block movement.
use crate::engine::{Grid, Position};
use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};

/// An entry in the A* open set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenNode {
    estimate: u32,
    steps: u32,
    position: Position,
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap, so invert the estimate to pop the lowest first.
        // Among equal estimates prefer the node furthest from the start, which
        // reaches the target with fewer expansions; position keeps it deterministic.
        Reverse(self.estimate)
            .cmp(&Reverse(other.estimate))
            .then_with(|| self.steps.cmp(&other.steps))
            .then_with(|| other.position.cmp(&self.position))
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Finds a shortest path from `start` to `target` through empty cells using A*.
///
/// Movement is 4-directional with unit cost and the Manhattan distance as the
/// heuristic, so the returned path always has the minimum number of steps.
/// The occupancy of `start` is not checked, which lets callers search outward
/// from a blocked cell; every other cell on the path is `Cell::Empty`.
///
/// # Arguments
/// * `start`: The first position of the path.
/// * `target`: The position to reach. Must be an empty cell.
/// * `grid`: The grid snapshot to search.
///
/// # Returns
/// * `Some(path)` listing positions from `start` to `target` inclusive.
/// * `None` if either endpoint is outside the grid, `target` is not empty, or
///   no route exists.
///
/// # Examples
/// ```
/// use roomfill::engine::Position;
/// use roomfill::pathfinding::find_path;
/// use roomfill::utils::grid_from_str_array;
///
/// let grid = grid_from_str_array(&["...", ".#.", "..."]).unwrap();
/// let path = find_path(Position::new(0, 0), Position::new(2, 2), &grid).unwrap();
/// assert_eq!(path.len(), 5);
/// ```
pub fn find_path(start: Position, target: Position, grid: &Grid) -> Option<Vec<Position>> {
    if !grid.in_bounds(start) || !grid.is_empty_at(target) {
        return None;
    }

    let mut open = BinaryHeap::new();
    let mut came_from: HashMap<Position, Position> = HashMap::new();
    let mut best_steps: HashMap<Position, u32> = HashMap::new();
    let mut closed: HashSet<Position> = HashSet::new();

    best_steps.insert(start, 0);
    open.push(OpenNode {
        estimate: start.manhattan(&target),
        steps: 0,
        position: start,
    });

    while let Some(OpenNode {
        steps, position, ..
    }) = open.pop()
    {
        if position == target {
            return Some(reconstruct_path(&came_from, target));
        }
        if !closed.insert(position) {
            continue; // stale heap entry
        }

        for next in grid.neighbors(position) {
            if closed.contains(&next) || !grid.is_empty_at(next) {
                continue;
            }
            let next_steps = steps + 1;
            if best_steps.get(&next).map_or(true, |&known| next_steps < known) {
                best_steps.insert(next, next_steps);
                came_from.insert(next, position);
                open.push(OpenNode {
                    estimate: next_steps + next.manhattan(&target),
                    steps: next_steps,
                    position: next,
                });
            }
        }
    }

    None
}

fn reconstruct_path(came_from: &HashMap<Position, Position>, target: Position) -> Vec<Position> {
    let mut path = vec![target];
    let mut current = target;
    while let Some(&previous) = came_from.get(&current) {
        path.push(previous);
        current = previous;
    }
    path.reverse();
    path
}

/// Collects every empty cell reachable from `start` by a breadth-first flood fill.
///
/// `start` itself is always part of the result (whatever its cell), so the set can be
/// seeded from a door-adjacent cell and reused for many adjacency checks instead of
/// running a separate search per piece.
///
/// # Returns
/// The reachable positions including `start`, or an empty set if `start` is outside
/// the grid.
pub fn find_all_reachable_positions(start: Position, grid: &Grid) -> HashSet<Position> {
    let mut reachable = HashSet::new();
    if !grid.in_bounds(start) {
        return reachable;
    }

    let mut queue = VecDeque::new();
    reachable.insert(start);
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        for next in grid.neighbors(current) {
            if grid.is_empty_at(next) && reachable.insert(next) {
                queue.push_back(next);
            }
        }
    }

    reachable
}

/// Returns `true` if any in-bounds orthogonal neighbor of `position` is in `reachable`.
pub fn is_adjacent_to_reachable(
    position: Position,
    reachable: &HashSet<Position>,
    grid: &Grid,
) -> bool {
    grid.neighbors(position).any(|p| reachable.contains(&p))
}

/// Finds every maximal 4-connected cluster of piece cells.
///
/// Adjacent pieces merge into one group regardless of their kind. Groups are returned
/// sorted by their first cell and each group's cells are sorted row-major, giving a
/// canonical order for hints and tests.
pub fn find_piece_groups(grid: &Grid) -> Vec<Vec<Position>> {
    let mut groups = Vec::new();
    let mut visited: HashSet<Position> = HashSet::new();

    for origin in grid.positions() {
        if visited.contains(&origin) || !grid.get(origin).map_or(false, |c| c.is_piece()) {
            continue;
        }

        let mut group = Vec::new();
        let mut queue = VecDeque::new();
        visited.insert(origin);
        queue.push_back(origin);

        while let Some(current) = queue.pop_front() {
            group.push(current);
            for next in grid.neighbors(current) {
                if grid.get(next).map_or(false, |c| c.is_piece()) && visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }

        group.sort_unstable();
        groups.push(group);
    }

    groups.sort_unstable_by_key(|g| g[0]);
    groups
}

/// The distinct empty cells orthogonally touching `group`, row-major.
pub fn empty_neighbors(group: &[Position], grid: &Grid) -> Vec<Position> {
    let mut cells: Vec<Position> = group
        .iter()
        .flat_map(|&p| grid.neighbors(p))
        .filter(|&p| grid.is_empty_at(p))
        .collect();
    cells.sort_unstable();
    cells.dedup();
    cells
}

/// The first empty cell next to the door, in right, left, down, up order.
///
/// This is the canonical origin for every search, since the door itself is not floor.
pub fn door_adjacent_empty(grid: &Grid, door: Position) -> Option<Position> {
    grid.neighbors(door).find(|&p| grid.is_empty_at(p))
}

/// Returns `true` if every piece group touches the floor reachable from the door.
///
/// A grid without pieces is trivially valid. If pieces exist but the door has no empty
/// neighbor, nothing can be reached and the result is `false`.
pub fn all_pieces_reachable(grid: &Grid, door: Position) -> bool {
    let groups = find_piece_groups(grid);
    if groups.is_empty() {
        return true;
    }
    let Some(seed) = door_adjacent_empty(grid, door) else {
        return false;
    };
    let reachable = find_all_reachable_positions(seed, grid);
    groups.iter().all(|group| {
        group
            .iter()
            .any(|&cell| is_adjacent_to_reachable(cell, &reachable, grid))
    })
}
