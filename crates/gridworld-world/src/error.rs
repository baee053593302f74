//! Error types for the `gridworld-world` crate.

/// Errors raised when a grid does not have the shape a session requires.
///
/// Turn processing never raises these: out-of-range changes are dropped
/// silently. They surface only when a scenario is first accepted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    /// The grid has no rows or no columns.
    #[error("grid is empty")]
    EmptyGrid,

    /// A row differs in length from the first row.
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        /// Offending row index.
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of the offending row.
        found: usize,
    },

    /// The grid is rectangular but not the configured size.
    #[error("grid is {rows}x{cols}, expected {expected_rows}x{expected_cols}")]
    WrongDimensions {
        /// Configured row count.
        expected_rows: usize,
        /// Configured column count.
        expected_cols: usize,
        /// Actual row count.
        rows: usize,
        /// Actual column count.
        cols: usize,
    },
}
