//! Sparse placement grid.
//!
//! The lattice stores every confirmed word keyed by its `(row, col)` position,
//! keeps a parallel log in placement order (the order the prompt is built in),
//! and tracks a bounding box that only ever grows.

use crate::error::LatticeError;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A non-empty, normalized word token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Word(String);

impl Word {
    /// Normalize `raw` (NFC, trimmed). Returns `None` when nothing is left.
    pub fn new(raw: &str) -> Option<Self> {
        let normalized = crate::utils::normalize(raw);
        if normalized.is_empty() {
            None
        } else {
            Some(Self(normalized))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Word {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Grid coordinate. Row grows downward, column grows rightward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const ORIGIN: Position = Position { row: 0, col: 0 };

    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Position reached by stepping `offset` away from `self`.
    pub fn offset(self, offset: Offset) -> Self {
        Self {
            row: self.row + offset.rows,
            col: self.col + offset.cols,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Step from an anchor to a candidate slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Offset {
    pub rows: usize,
    pub cols: usize,
}

impl Offset {
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// A usable offset moves at most one step per axis and never stays put.
    pub fn is_unit_step(&self) -> bool {
        self.rows <= 1 && self.cols <= 1 && (self.rows, self.cols) != (0, 0)
    }
}

/// Right, down, diagonal: rank 0, 1 and 2 of a suggestion.
pub const DEFAULT_OFFSETS: [Offset; 3] = [Offset::new(0, 1), Offset::new(1, 0), Offset::new(1, 1)];

/// A confirmed word at its position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedCell {
    pub position: Position,
    pub word: Word,
    /// Zero-based placement order.
    pub index: usize,
}

/// Extent of every position touched so far, as a row/column count.
///
/// An empty box (`0 x 0`) means nothing was ever placed or proposed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    rows: usize,
    cols: usize,
}

impl BoundingBox {
    /// Number of rows (`max_row + 1`, or 0 when empty).
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns (`max_col + 1`, or 0 when empty).
    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn max_row(&self) -> Option<usize> {
        self.rows.checked_sub(1)
    }

    pub fn max_col(&self) -> Option<usize> {
        self.cols.checked_sub(1)
    }

    pub fn contains(&self, position: Position) -> bool {
        position.row < self.rows && position.col < self.cols
    }

    /// Whether every extent of `self` is at least that of `other`.
    pub fn covers(&self, other: &BoundingBox) -> bool {
        self.rows >= other.rows && self.cols >= other.cols
    }

    fn extend(&mut self, position: Position) {
        self.rows = self.rows.max(position.row + 1);
        self.cols = self.cols.max(position.col + 1);
    }
}

/// Append-only sparse grid of placed words.
#[derive(Debug, Clone, Default)]
pub struct PlacementLattice {
    /// Position -> index into `log`
    by_position: AHashMap<Position, usize>,
    /// Cells in placement order
    log: Vec<PlacedCell>,
    bbox: BoundingBox,
}

impl PlacementLattice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place `word` at `position`, growing the bounding box in the same step.
    ///
    /// Placing onto an occupied position is a logic defect and leaves the
    /// lattice untouched.
    pub fn place(&mut self, position: Position, word: Word) -> Result<&PlacedCell, LatticeError> {
        if let Some(&idx) = self.by_position.get(&position) {
            return Err(LatticeError::Occupied {
                position,
                existing: self.log[idx].word.as_str().to_string(),
            });
        }

        let index = self.log.len();
        self.by_position.insert(position, index);
        self.log.push(PlacedCell {
            position,
            word,
            index,
        });
        self.bbox.extend(position);
        Ok(&self.log[index])
    }

    /// Grow the bounding box to cover a proposed (not placed) position.
    pub fn touch(&mut self, position: Position) {
        self.bbox.extend(position);
    }

    pub fn get(&self, position: Position) -> Option<&PlacedCell> {
        self.by_position.get(&position).map(|&idx| &self.log[idx])
    }

    pub fn is_occupied(&self, position: Position) -> bool {
        self.by_position.contains_key(&position)
    }

    /// All cells in placement order.
    pub fn cells(&self) -> &[PlacedCell] {
        &self.log
    }

    /// Placed words in placement order.
    pub fn words(&self) -> impl Iterator<Item = &Word> + '_ {
        self.log.iter().map(|c| &c.word)
    }

    /// Most recently placed cell.
    pub fn last(&self) -> Option<&PlacedCell> {
        self.log.last()
    }

    pub fn bounding_box(&self) -> BoundingBox {
        self.bbox
    }

    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }
}
