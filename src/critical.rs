//! Critical cell analysis used for placement hints.
//!
//! A critical cell is an empty cell the player should keep clear because
//! covering it would (or very likely would) cut some piece group off from the
//! door. The analysis layers three approximations:
//!
//! 1. cells on a shortest route from the door to each group's free neighbors,
//! 2. cells whose conversion to wall provably disconnects a group, and
//! 3. cells shared by every sampled route to a group (bottlenecks).
//!
//! This is a hinting heuristic, not a minimum vertex cut. Everything is
//! recomputed from the grid on each call.
use crate::engine::{Cell, Direction, Grid, Position};
use crate::pathfinding::{
    door_adjacent_empty, empty_neighbors, find_all_reachable_positions, find_path,
    find_piece_groups, is_adjacent_to_reachable,
};
use std::collections::HashSet;

/// Number of distinct routes sampled per target in the bottleneck pass.
pub const MAX_SAMPLED_PATHS: usize = 5;

/// Sampled routes may be at most this many times longer than the shortest one.
pub const PATH_LENGTH_FACTOR: usize = 2;

/// Identifies the empty cells that keep every piece group connected to the door.
///
/// The search origin is the first empty cell next to the door. If the door has no
/// empty neighbor there is nothing to protect and the result is empty. The origin
/// itself is always critical.
///
/// # Arguments
/// * `grid`: The current room layout. It is never modified; hypothetical walls are
///   tried on private copies.
/// * `door`: Position of the door cell.
///
/// # Returns
/// The union of the three passes described in the module documentation.
///
/// # Examples
/// ```
/// use roomfill::critical::identify_critical_paths;
/// use roomfill::engine::Position;
/// use roomfill::utils::grid_from_str_array;
///
/// let grid = grid_from_str_array(&["#####", "D..S#", "#####"]).unwrap();
/// let critical = identify_critical_paths(&grid, Position::new(0, 1));
/// assert!(critical.contains(&Position::new(1, 1)));
/// assert!(critical.contains(&Position::new(2, 1)));
/// ```
pub fn identify_critical_paths(grid: &Grid, door: Position) -> HashSet<Position> {
    let mut critical = HashSet::new();
    let Some(seed) = door_adjacent_empty(grid, door) else {
        return critical;
    };
    critical.insert(seed);

    let groups = find_piece_groups(grid);
    let targets: Vec<Vec<Position>> = groups
        .iter()
        .map(|group| empty_neighbors(group, grid))
        .collect();

    mark_shortest_routes(grid, seed, &targets, &mut critical);
    mark_disconnecting_cells(grid, seed, &groups, &mut critical);
    mark_bottlenecks(grid, seed, &targets, &mut critical);

    critical
}

/// Pass 1: every cell on a shortest route from `seed` to any group's free neighbor.
fn mark_shortest_routes(
    grid: &Grid,
    seed: Position,
    targets: &[Vec<Position>],
    critical: &mut HashSet<Position>,
) {
    for &target in targets.iter().flatten() {
        if let Some(path) = find_path(seed, target, grid) {
            critical.extend(path);
        }
    }
}

/// Pass 2: tries each remaining empty cell as a wall and keeps those that strand a group.
///
/// Only groups reachable on the unmodified grid are considered; a group that is already
/// cut off cannot be disconnected further.
fn mark_disconnecting_cells(
    grid: &Grid,
    seed: Position,
    groups: &[Vec<Position>],
    critical: &mut HashSet<Position>,
) {
    let reachable = find_all_reachable_positions(seed, grid);
    let connected: Vec<&Vec<Position>> = groups
        .iter()
        .filter(|group| group_touches(group, &reachable, grid))
        .collect();
    if connected.is_empty() {
        return;
    }

    let candidates = grid.positions_where(|c| c == Cell::Empty);
    for candidate in candidates {
        if critical.contains(&candidate) {
            continue;
        }
        // Wall off the candidate on a copy and see which groups lose the door.
        let mut trial = grid.clone();
        if trial.set(candidate, Cell::Wall).is_err() {
            continue;
        }
        let still_reachable = find_all_reachable_positions(seed, &trial);
        if connected
            .iter()
            .any(|group| !group_touches(group, &still_reachable, &trial))
        {
            critical.insert(candidate);
        }
    }
}

fn group_touches(group: &[Position], reachable: &HashSet<Position>, grid: &Grid) -> bool {
    group
        .iter()
        .any(|&cell| is_adjacent_to_reachable(cell, reachable, grid))
}

/// Pass 3: cells common to every sampled route from `seed` to a group's free neighbor.
fn mark_bottlenecks(
    grid: &Grid,
    seed: Position,
    targets: &[Vec<Position>],
    critical: &mut HashSet<Position>,
) {
    for &target in targets.iter().flatten() {
        let Some(shortest) = find_path(seed, target, grid) else {
            continue;
        };
        let limit = shortest.len() * PATH_LENGTH_FACTOR;
        let paths = sample_simple_paths(grid, seed, target, limit, MAX_SAMPLED_PATHS);

        match paths.as_slice() {
            [] => {}
            [only] => critical.extend(only.iter().copied()),
            [first, rest @ ..] => {
                let common = first
                    .iter()
                    .filter(|p| rest.iter().all(|path| path.contains(p)));
                critical.extend(common.copied());
            }
        }
    }
}

/// Enumerates up to `max_paths` simple paths from `start` to `target` of at most
/// `max_len` cells, depth first.
///
/// Uses an explicit stack of direction cursors and one on-path set that is updated
/// as the search advances and backtracks, so no per-branch copies are made.
pub fn sample_simple_paths(
    grid: &Grid,
    start: Position,
    target: Position,
    max_len: usize,
    max_paths: usize,
) -> Vec<Vec<Position>> {
    let mut found = Vec::new();
    if max_len == 0 || max_paths == 0 || !grid.in_bounds(start) {
        return found;
    }

    let mut path = vec![start];
    let mut on_path: HashSet<Position> = HashSet::from([start]);
    // cursors[i] is the next direction to try from path[i].
    let mut cursors: Vec<usize> = vec![0];

    while let Some(&cursor) = cursors.last() {
        let current = path[path.len() - 1];

        // Record a completed route and back off to look for the next one.
        if current == target {
            found.push(path.clone());
            if found.len() >= max_paths {
                break;
            }
            backtrack(&mut path, &mut on_path, &mut cursors);
            continue;
        }

        // All four directions tried, or the path is as long as allowed.
        if cursor >= Direction::ALL.len() || path.len() >= max_len {
            backtrack(&mut path, &mut on_path, &mut cursors);
            continue;
        }

        // Advance this cell's cursor before descending so the step is not retried.
        if let Some(top) = cursors.last_mut() {
            *top += 1;
        }
        let next = current.step(Direction::ALL[cursor]);
        if grid.is_empty_at(next) && !on_path.contains(&next) {
            path.push(next);
            on_path.insert(next);
            cursors.push(0);
        }
    }

    found
}

fn backtrack(path: &mut Vec<Position>, on_path: &mut HashSet<Position>, cursors: &mut Vec<usize>) {
    cursors.pop();
    if let Some(last) = path.pop() {
        on_path.remove(&last);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::grid_from_str_array;

    fn positions(cells: &[(i32, i32)]) -> HashSet<Position> {
        cells.iter().map(|&(x, y)| Position::new(x, y)).collect()
    }

    #[test]
    fn test_door_blocked_yields_nothing() {
        let grid = grid_from_str_array(&["#####", "DS..#", "#####"]).unwrap();
        assert!(identify_critical_paths(&grid, Position::new(0, 1)).is_empty());
    }

    #[test]
    fn test_empty_room_only_marks_seed() {
        let grid = grid_from_str_array(&["#####", "#...#", "D...#", "#...#", "#####"]).unwrap();
        let critical = identify_critical_paths(&grid, Position::new(0, 2));
        assert_eq!(critical, positions(&[(1, 2)]));
    }

    #[test]
    fn test_single_entry_cell_is_critical() {
        // The door's only free neighbor (1,2) is the sole way into the room.
        let grid = grid_from_str_array(&[
            "######", //
            "##...#", //
            "D..S.#", //
            "##...#", //
            "######",
        ])
        .unwrap();
        let critical = identify_critical_paths(&grid, Position::new(0, 2));
        assert!(critical.contains(&Position::new(1, 2)));
        assert!(critical.contains(&Position::new(2, 2)));
    }

    #[test]
    fn test_corridor_is_fully_critical() {
        let grid = grid_from_str_array(&["#######", "D....S#", "#######"]).unwrap();
        let critical = identify_critical_paths(&grid, Position::new(0, 1));
        assert_eq!(critical, positions(&[(1, 1), (2, 1), (3, 1), (4, 1)]));
    }

    #[test]
    fn test_alternative_routes_are_not_all_critical() {
        // The piece's only free neighbor (3,2) is reached by two equal lanes.
        let grid = grid_from_str_array(&[
            "######", //
            "#...##", //
            "D.#.S#", //
            "#...##", //
            "######",
        ])
        .unwrap();
        let critical = identify_critical_paths(&grid, Position::new(0, 2));
        let top_lane = positions(&[(1, 1), (2, 1), (3, 1)]);
        let bottom_lane = positions(&[(1, 3), (2, 3), (3, 3)]);

        assert!(critical.contains(&Position::new(1, 2)));
        assert!(critical.contains(&Position::new(3, 2)));
        // One lane is marked as the shortest route; the spare lane stays free.
        assert_eq!(critical.len(), 5);
        let top_marked = top_lane.is_subset(&critical) && bottom_lane.is_disjoint(&critical);
        let bottom_marked = bottom_lane.is_subset(&critical) && top_lane.is_disjoint(&critical);
        assert!(top_marked ^ bottom_marked);
    }

    #[test]
    fn test_cut_cell_is_critical() {
        // The piece at (4,3) is only reachable through (2,2) and (3,2).
        let grid = grid_from_str_array(&[
            "######", //
            "#..#.#", //
            "D....#", //
            "#..#S#", //
            "######",
        ])
        .unwrap();
        let critical = identify_critical_paths(&grid, Position::new(0, 2));
        assert_eq!(critical, positions(&[(1, 2), (2, 2), (3, 2), (4, 2)]));
    }

    #[test]
    fn test_unreachable_group_does_not_mark_everything() {
        let grid = grid_from_str_array(&[
            "######", //
            "#...##", //
            "D...#S", //
            "#...##", //
            "######",
        ])
        .unwrap();
        let critical = identify_critical_paths(&grid, Position::new(0, 2));
        assert_eq!(critical, positions(&[(1, 2)]));
    }

    #[test]
    fn test_identify_critical_paths_is_idempotent() {
        let grid = grid_from_str_array(&[
            "########", //
            "#..S...#", //
            "D...#..#", //
            "#.#..L.#", //
            "#....LL#", //
            "########",
        ])
        .unwrap();
        let first = identify_critical_paths(&grid, Position::new(0, 2));
        let second = identify_critical_paths(&grid, Position::new(0, 2));
        assert_eq!(first, second);
        for p in &first {
            assert!(grid.is_empty_at(*p), "{} is not empty", p);
        }
    }

    #[test]
    fn test_sample_simple_paths_limits() {
        let grid = grid_from_str_array(&["...", "...", "..."]).unwrap();
        let start = Position::new(0, 0);
        let target = Position::new(2, 2);

        let shortest_only = sample_simple_paths(&grid, start, target, 5, 10);
        assert_eq!(shortest_only.len(), 6);
        for path in &shortest_only {
            assert_eq!(path.len(), 5);
            assert_eq!(path[0], start);
            assert_eq!(path[4], target);
        }

        let capped = sample_simple_paths(&grid, start, target, 9, 5);
        assert_eq!(capped.len(), 5);
        for path in &capped {
            let unique: HashSet<&Position> = path.iter().collect();
            assert_eq!(unique.len(), path.len());
        }
    }

    #[test]
    fn test_sample_simple_paths_start_is_target() {
        let grid = grid_from_str_array(&["..."]).unwrap();
        let paths = sample_simple_paths(&grid, Position::new(1, 0), Position::new(1, 0), 2, 5);
        assert_eq!(paths, vec![vec![Position::new(1, 0)]]);
    }
}
