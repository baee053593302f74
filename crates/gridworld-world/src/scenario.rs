//! Scenario validation, session setup and the built-in forest start.

use gridworld_types::{DEFAULT_COLS, DEFAULT_ROWS, GameState, Grid, TurnState};

use crate::agents::derive_agents;
use crate::error::WorldError;

/// Description of the first turn of every session.
pub const INITIAL_TURN_DESCRIPTION: &str = "Initial scenario setup";

/// Check that `grid` is non-empty, rectangular and exactly `rows`x`cols`.
pub fn validate_shape(grid: &Grid, rows: usize, cols: usize) -> Result<(), WorldError> {
    if grid.rows() == 0 || grid.cols() == 0 {
        return Err(WorldError::EmptyGrid);
    }
    let expected = grid.cols();
    if let Some((row, found)) = grid
        .as_rows()
        .iter()
        .map(Vec::len)
        .enumerate()
        .find(|(_, len)| *len != expected)
    {
        return Err(WorldError::RaggedRow {
            row,
            expected,
            found,
        });
    }
    if grid.dimensions() != (rows, cols) {
        return Err(WorldError::WrongDimensions {
            expected_rows: rows,
            expected_cols: cols,
            rows: grid.rows(),
            cols: grid.cols(),
        });
    }
    Ok(())
}

/// Start a session from a grid: one setup turn, agents derived from it.
pub fn new_session(world_description: &str, grid: Grid) -> GameState {
    let agents = derive_agents(&grid, &[]);
    GameState {
        world_description: world_description.to_owned(),
        history: vec![TurnState {
            world: grid,
            description: INITIAL_TURN_DESCRIPTION.to_owned(),
        }],
        agents,
    }
}

const FOREST_DESCRIPTION: &str = "An old forest at dusk. A river cuts north to south \
through the trees and a single stone bridge crosses it. A knight guards the bridge, \
a druid tends a grove to the west, a fox hunts in the undergrowth and a merchant's \
cart has broken an axle on the eastern road. Agents are tagged like <Name>; every \
other cell is terrain or objects.";

/// Cells of the forest start as `(row, col, content)`.
const FOREST_CELLS: &[(usize, usize, &str)] = &[
    (0, 2, "ancient oak"),
    (0, 3, "ancient oak"),
    (0, 7, "river"),
    (0, 12, "pine"),
    (1, 1, "pine"),
    (1, 7, "river"),
    (1, 13, "pine"),
    (2, 2, "<Druid> kneels in the grove, whispering to the roots"),
    (2, 3, "mossy standing stone"),
    (2, 7, "river"),
    (3, 1, "berry bush"),
    (3, 7, "river"),
    (3, 10, "pine"),
    (4, 7, "river"),
    (4, 11, "<Fox> crouches low, watching for rabbits"),
    (5, 4, "fallen log"),
    (5, 7, "river"),
    (6, 7, "stone bridge"),
    (6, 8, "<Knight> stands guard at the bridge, sword drawn"),
    (6, 9, "dirt road"),
    (6, 10, "dirt road"),
    (6, 11, "dirt road"),
    (6, 12, "dirt road"),
    (6, 13, "<Merchant> curses at a broken cart wheel"),
    (6, 14, "merchant's cart, one wheel snapped"),
    (7, 7, "river"),
    (8, 2, "rabbit burrow"),
    (8, 7, "river"),
    (9, 7, "river"),
    (9, 12, "pine"),
    (10, 3, "pine"),
    (10, 7, "river"),
    (11, 7, "river"),
    (11, 10, "campfire ashes"),
    (12, 5, "ancient oak"),
    (12, 7, "river"),
    (13, 7, "river"),
    (13, 13, "pine"),
    (14, 1, "pine"),
    (14, 7, "river"),
];

/// The built-in 15x15 forest session.
pub fn starting_scenario() -> GameState {
    let mut grid = Grid::empty(DEFAULT_ROWS, DEFAULT_COLS);
    for &(row, col, content) in FOREST_CELLS {
        if let (Ok(r), Ok(c)) = (i32::try_from(row), i32::try_from(col)) {
            grid.set(r, c, content);
        }
    }
    new_session(FOREST_DESCRIPTION, grid)
}
