//! Text helpers: parsing grids from strings and rendering rooms for the terminal.
use crate::engine::{Cell, Grid, Position};
use crate::error::GridError;
use crate::generator::Level;
use std::collections::HashSet;

/// Parses an array of string slices into a `Grid`, one string per row, top row first.
///
/// Characters follow [`Cell::to_char`]:
/// - '.': `Cell::Empty`
/// - '#': `Cell::Wall`
/// - 'D': `Cell::Door`
/// - 'S', 'H', 'V': single, horizontal and vertical rectangle pieces
/// - 'L', 'F', '7', 'J': the four L-shape rotations
///
/// # Returns
/// * `Ok(Grid)` if every row has the same length and only known characters.
/// * `Err(GridError::Empty)` for no rows or empty rows.
/// * `Err(GridError::RaggedRows)` if a row's length differs from the first row's.
/// * `Err(GridError::UnrecognizedCell)` naming the first unknown character.
///
/// # Examples
/// ```
/// use roomfill::engine::{Cell, Position};
/// use roomfill::utils::grid_from_str_array;
///
/// let grid = grid_from_str_array(&["#D#", "#.#"]).unwrap();
/// assert_eq!(grid.get(Position::new(1, 0)), Some(Cell::Door));
/// assert_eq!(grid.get(Position::new(1, 1)), Some(Cell::Empty));
///
/// assert!(grid_from_str_array(&["#X#"]).is_err());
/// assert!(grid_from_str_array(&["###", "#"]).is_err());
/// ```
pub fn grid_from_str_array(s: &[&str]) -> Result<Grid, GridError> {
    let mut rows = Vec::with_capacity(s.len());
    for (row, row_str) in s.iter().enumerate() {
        let cells = row_str
            .chars()
            .enumerate()
            .map(|(col, ch)| Cell::from_char(ch).ok_or(GridError::UnrecognizedCell { ch, row, col }))
            .collect::<Result<Vec<Cell>, GridError>>()?;
        rows.push(cells);
    }
    Grid::from_rows(rows)
}

/// Renders the grid with column and row numbers, marking `highlights` on empty cells with `*`.
///
/// Used by the player to show hint cells. Highlights on non-empty cells are ignored so the
/// piece or wall underneath stays visible.
pub fn render_grid(grid: &Grid, highlights: &HashSet<Position>) -> String {
    let mut output = String::from("   ");
    for x in 0..grid.width() {
        output.push_str(&format!("{:<2}", x % 100));
    }

    for (y, row) in grid.rows().enumerate() {
        output.push('\n');
        output.push_str(&format!("{:<3}", y));
        for (x, cell) in row.iter().enumerate() {
            let pos = Position::new(x as i32, y as i32);
            let ch = if cell.is_empty() && highlights.contains(&pos) {
                '*'
            } else {
                cell.to_char()
            };
            output.push(ch);
            output.push(' ');
        }
    }
    output
}

/// Multi-line summary of a level: name, size, complexity, inventory, and layout.
pub fn describe_level(level: &Level) -> Result<String, GridError> {
    let grid = level.to_grid()?;
    let inv = &level.inventory;
    Ok(format!(
        "{}\nSize: {}x{}  Complexity: {:.2}  Door: {}\nPieces: {} single, {} rectangular, {} l-shaped\n{}",
        level.name,
        level.width,
        level.height,
        level.complexity,
        level.door,
        inv.single,
        inv.rectangular,
        inv.l_shaped,
        render_grid(&grid, &HashSet::new())
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::generate_level_with_seed;

    #[test]
    fn test_grid_from_str_array_valid() {
        let grid = grid_from_str_array(&["#####", "D.SH#", "#LV7#", "#FJ.#", "#####"]).unwrap();
        assert_eq!(grid.width(), 5);
        assert_eq!(grid.height(), 5);
        assert_eq!(grid.get(Position::new(0, 1)), Some(Cell::Door));
        assert_eq!(grid.get(Position::new(2, 1)), Some(Cell::Single));
        assert_eq!(grid.get(Position::new(3, 1)), Some(Cell::RectHorizontal));
        assert_eq!(grid.get(Position::new(1, 2)), Some(Cell::LShape0));
        assert_eq!(grid.get(Position::new(2, 2)), Some(Cell::RectVertical));
        assert_eq!(grid.get(Position::new(3, 2)), Some(Cell::LShape180));
        assert_eq!(grid.get(Position::new(1, 3)), Some(Cell::LShape90));
        assert_eq!(grid.get(Position::new(2, 3)), Some(Cell::LShape270));
    }

    #[test]
    fn test_grid_from_str_array_invalid_char() {
        let result = grid_from_str_array(&["..", ".x"]);
        assert_eq!(
            result,
            Err(GridError::UnrecognizedCell {
                ch: 'x',
                row: 1,
                col: 1
            })
        );
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("unrecognized character 'x'"));
    }

    #[test]
    fn test_grid_from_str_array_with_spaces() {
        let result = grid_from_str_array(&["# #"]);
        assert!(result.unwrap_err().to_string().contains("character ' '"));
    }

    #[test]
    fn test_grid_from_str_array_ragged() {
        let result = grid_from_str_array(&["....", "..."]);
        assert_eq!(
            result,
            Err(GridError::RaggedRows {
                row: 1,
                expected: 4,
                found: 3
            })
        );
    }

    #[test]
    fn test_grid_from_str_array_empty_input() {
        let rows: [&str; 0] = [];
        assert_eq!(grid_from_str_array(&rows), Err(GridError::Empty));
        assert_eq!(grid_from_str_array(&[""]), Err(GridError::Empty));
    }

    #[test]
    fn test_display_matches_input() {
        let rows = ["#####", "D..S#", "#####"];
        let grid = grid_from_str_array(&rows).unwrap();
        assert_eq!(grid.to_string(), rows.join("\n"));
    }

    #[test]
    fn test_render_grid_highlights_empty_cells_only() {
        let grid = grid_from_str_array(&["###", "D.S", "###"]).unwrap();
        let highlights: HashSet<Position> =
            [Position::new(1, 1), Position::new(2, 1)].into_iter().collect();
        let rendered = render_grid(&grid, &highlights);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0].trim_end(), "   0 1 2");
        assert_eq!(lines[2].trim_end(), "1  D * S");
    }

    #[test]
    fn test_describe_level() {
        let level = generate_level_with_seed(0.0, 3, 11);
        let text = describe_level(&level).unwrap();
        assert!(text.starts_with("Level 3:"));
        assert!(text.contains("Size: 6x6"));
        assert_eq!(text.lines().count(), 3 + 1 + 6);
    }
}
