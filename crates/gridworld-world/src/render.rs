//! Text renderings of a grid for oracle contexts.

use gridworld_types::Grid;

/// Rendering used when no cell has content.
pub const EMPTY_WORLD: &str = "The world is empty.";

/// One `(row,col): content` line per non-blank cell, row-major.
pub fn describe_world(grid: &Grid) -> String {
    let lines: Vec<String> = grid
        .cells()
        .filter(|(_, cell)| !cell.trim().is_empty())
        .map(|(location, cell)| format!("{location}: {cell}"))
        .collect();
    if lines.is_empty() {
        EMPTY_WORLD.to_owned()
    } else {
        lines.join("\n")
    }
}

/// Every cell as `(row,col): content`, empty cells as `empty`. Cells are
/// joined by ` | `, rows by newlines.
pub fn describe_full_grid(grid: &Grid) -> String {
    grid.as_rows()
        .iter()
        .enumerate()
        .map(|(r, row)| {
            row.iter()
                .enumerate()
                .map(|(c, cell)| {
                    let content = if cell.is_empty() { "empty" } else { cell };
                    format!("({r},{c}): {content}")
                })
                .collect::<Vec<_>>()
                .join(" | ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[&str]]) -> Grid {
        Grid::from_rows(
            rows.iter()
                .map(|r| r.iter().map(|c| (*c).to_owned()).collect())
                .collect(),
        )
    }

    #[test]
    fn empty_world_has_fixed_text() {
        assert_eq!(describe_world(&Grid::empty(3, 3)), EMPTY_WORLD);
        assert_eq!(describe_world(&grid(&[&["  ", ""]])), EMPTY_WORLD);
    }

    #[test]
    fn lists_non_empty_cells() {
        let g = grid(&[&["", "<Knight> guards"], &["oak", ""]]);
        assert_eq!(describe_world(&g), "(0,1): <Knight> guards\n(1,0): oak");
    }

    #[test]
    fn full_grid_marks_empty_cells() {
        let g = grid(&[&["", "oak"], &["<Fox>", ""]]);
        assert_eq!(
            describe_full_grid(&g),
            "(0,0): empty | (0,1): oak\n(1,0): <Fox> | (1,1): empty"
        );
    }
}
