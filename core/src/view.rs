//! Grid snapshot for front ends.
//!
//! `GridView` is a plain data container: after each session action a front
//! end takes a snapshot and draws it however it likes. No callbacks, no
//! traits.

use crate::candidate::Candidate;
use crate::lattice::{PlacedCell, Position};
use crate::session::{SessionController, SessionState};

/// Empty cells kept beyond the bounding box on each axis so the next
/// suggestions always have room on the canvas.
pub const CANVAS_MARGIN: usize = 2;

/// What a front end should draw at one grid position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewCell<'a> {
    Empty,
    Placed(&'a str),
    Candidate { rank: usize, word: &'a str },
}

/// Snapshot of a session's drawable state.
#[derive(Debug, Clone, Default)]
pub struct GridView {
    pub state: SessionState,
    /// Confirmed cells in placement order
    pub cells: Vec<PlacedCell>,
    /// Live candidates, rank order
    pub candidates: Vec<Candidate>,
    /// Most recent placement
    pub anchor: Option<Position>,
    /// Canvas size in cells (bounding box plus margin)
    pub canvas_rows: usize,
    pub canvas_cols: usize,
    pub fetch_pending: bool,
    pub fetch_failed: bool,
}

impl GridView {
    pub fn from_session(session: &SessionController) -> Self {
        let bbox = session.bounding_box();
        Self {
            state: session.state(),
            cells: session.lattice().cells().to_vec(),
            candidates: session
                .candidates()
                .map(|set| set.candidates().to_vec())
                .unwrap_or_default(),
            anchor: session.anchor(),
            canvas_rows: bbox.rows() + CANVAS_MARGIN,
            canvas_cols: bbox.cols() + CANVAS_MARGIN,
            fetch_pending: session.is_fetch_pending(),
            fetch_failed: session.has_failed_fetch(),
        }
    }

    pub fn cell_at(&self, position: Position) -> ViewCell<'_> {
        if let Some(cell) = self.cells.iter().find(|c| c.position == position) {
            return ViewCell::Placed(cell.word.as_str());
        }
        if let Some(c) = self.candidates.iter().find(|c| c.position == position) {
            return ViewCell::Candidate {
                rank: c.rank,
                word: c.word.as_str(),
            };
        }
        ViewCell::Empty
    }
}
