//! Applying change lists to a grid.

use gridworld_types::{Change, Grid};
use tracing::debug;

/// The grid produced by [`apply_changes`] and how many changes missed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    /// The new grid. Same dimensions as the input.
    pub grid: Grid,
    /// Changes dropped because their coordinate was out of range.
    pub dropped: usize,
}

/// Apply `changes` to a copy of `grid`, in order.
///
/// Later changes overwrite earlier ones at the same coordinate. Changes
/// outside the grid are dropped without error. The input grid is never
/// touched and the output always has the same shape.
pub fn apply_changes(grid: &Grid, changes: &[Change]) -> Applied {
    let mut next = grid.clone();
    let mut dropped: usize = 0;
    for change in changes {
        if !next.set(change.row, change.col, &change.new_content) {
            debug!(
                row = change.row,
                col = change.col,
                "dropping out-of-range change"
            );
            dropped = dropped.saturating_add(1);
        }
    }
    Applied {
        grid: next,
        dropped,
    }
}
