//! The read-only world snapshot every oracle call site works from.

use gridworld_types::Grid;
use gridworld_world::describe_world;

/// The prior grid plus its renderings, built once per turn.
#[derive(Debug, Clone)]
pub struct WorldView<'a> {
    /// The grid the turn starts from.
    pub grid: &'a Grid,
    /// The session's setting.
    pub world_description: &'a str,
    /// Non-empty cells as `(row,col): content` lines.
    pub rendered: String,
}

impl<'a> WorldView<'a> {
    /// Snapshot `grid` for this turn.
    pub fn new(grid: &'a Grid, world_description: &'a str) -> Self {
        Self {
            grid,
            world_description,
            rendered: describe_world(grid),
        }
    }
}
