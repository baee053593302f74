//! The shared world grid and single-cell mutations.
//!
//! A [`Grid`] is a rectangular matrix of free-text cells. An empty string is
//! an empty cell. Dimensions are fixed for the life of a session; nothing in
//! the workspace ever adds or removes rows or columns.

use core::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Canonical number of rows in a session grid.
pub const DEFAULT_ROWS: usize = 15;

/// Canonical number of columns in a session grid.
pub const DEFAULT_COLS: usize = 15;

/// Stand-in for a coordinate that names no cell (fractional, NaN, not a
/// number). Always out of range, so the change is dropped at apply time.
const NO_CELL: i32 = -1;

/// A position on the grid.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub struct Location {
    /// Zero-based row index.
    pub row: usize,
    /// Zero-based column index.
    pub col: usize,
}

impl Location {
    /// Create a location from a row and column.
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl core::fmt::Display for Location {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

/// A single-cell mutation proposal.
///
/// Coordinates are signed because they come from the oracle and may be
/// nonsense (negative or past the edge). Out-of-range changes are dropped
/// when applied, never rejected at parse time: integral floats (`1.0`) and
/// numeric strings are read as integers, huge values saturate, and anything
/// else becomes an out-of-range coordinate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Change {
    /// Target row.
    #[serde(deserialize_with = "lenient_coordinate")]
    pub row: i32,
    /// Target column.
    #[serde(deserialize_with = "lenient_coordinate")]
    pub col: i32,
    /// Replacement cell text. Empty string clears the cell.
    pub new_content: String,
}

impl Change {
    /// Create a change targeting `(row, col)`.
    pub fn new(row: i32, col: i32, new_content: impl Into<String>) -> Self {
        Self {
            row,
            col,
            new_content: new_content.into(),
        }
    }

    /// The raw target coordinate, used as the conflict bucket key.
    pub const fn target(&self) -> (i32, i32) {
        (self.row, self.col)
    }

    /// The target as a [`Location`], or `None` when either coordinate is
    /// negative.
    pub fn location(&self) -> Option<Location> {
        let row = usize::try_from(self.row).ok()?;
        let col = usize::try_from(self.col).ok()?;
        Some(Location::new(row, col))
    }
}

fn lenient_coordinate<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
    deserializer.deserialize_any(CoordinateVisitor)
}

struct CoordinateVisitor;

impl Visitor<'_> for CoordinateVisitor {
    type Value = i32;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a grid coordinate")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<i32, E> {
        Ok(i32::try_from(v).unwrap_or(if v < 0 { i32::MIN } else { i32::MAX }))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<i32, E> {
        Ok(i32::try_from(v).unwrap_or(i32::MAX))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<i32, E> {
        Ok(float_coordinate(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<i32, E> {
        Ok(v.trim().parse::<f64>().map_or(NO_CELL, float_coordinate))
    }
}

/// Integral floats convert (saturating); the rest name no cell.
#[allow(clippy::cast_possible_truncation)]
fn float_coordinate(v: f64) -> i32 {
    if v.is_finite() && v.fract() == 0.0 {
        v as i32
    } else {
        NO_CELL
    }
}

/// The world grid for one turn.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Grid(pub Vec<Vec<String>>);

impl Grid {
    /// Create a grid of empty cells.
    pub fn empty(rows: usize, cols: usize) -> Self {
        Self(vec![vec![String::new(); cols]; rows])
    }

    /// Wrap an existing row-major matrix.
    pub const fn from_rows(rows: Vec<Vec<String>>) -> Self {
        Self(rows)
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.0.len()
    }

    /// Number of columns, taken from the first row.
    pub fn cols(&self) -> usize {
        self.0.first().map_or(0, Vec::len)
    }

    /// `(rows, cols)`.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.rows(), self.cols())
    }

    /// Whether every row has the same length.
    pub fn is_rectangular(&self) -> bool {
        let cols = self.cols();
        self.0.iter().all(|row| row.len() == cols)
    }

    /// Borrow the underlying rows.
    pub fn as_rows(&self) -> &[Vec<String>] {
        &self.0
    }

    /// The text at `location`, or `None` when out of range.
    pub fn cell(&self, location: Location) -> Option<&str> {
        self.0
            .get(location.row)
            .and_then(|row| row.get(location.col))
            .map(String::as_str)
    }

    /// Iterate every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (Location, &str)> {
        self.0.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .map(move |(c, cell)| (Location::new(r, c), cell.as_str()))
        })
    }

    /// Overwrite one cell if `(row, col)` is in range.
    ///
    /// The column bound is the grid width (first row), so a short row in a
    /// ragged grid never grows. Returns whether the write happened.
    pub fn set(&mut self, row: i32, col: i32, content: &str) -> bool {
        let (Ok(r), Ok(c)) = (usize::try_from(row), usize::try_from(col)) else {
            return false;
        };
        if c >= self.cols() {
            return false;
        }
        match self.0.get_mut(r).and_then(|cells| cells.get_mut(c)) {
            Some(cell) => {
                content.clone_into(cell);
                true
            }
            None => false,
        }
    }
}

impl From<Vec<Vec<String>>> for Grid {
    fn from(rows: Vec<Vec<String>>) -> Self {
        Self(rows)
    }
}
