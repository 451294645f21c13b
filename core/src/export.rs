//! Lattice export.
//!
//! `LatticeExporter` densifies the sparse lattice into a rectangle sized by
//! its bounding box and writes it as CSV: every field quoted, quotes doubled,
//! CRLF between rows. `GridPayload` is the JSON document sent to a submit
//! endpoint.

use crate::error::ExportError;
use crate::lattice::{PlacementLattice, Position};
use serde::{Deserialize, Serialize};
use std::io;

/// Dense CSV writer for a [`PlacementLattice`].
pub struct LatticeExporter;

impl LatticeExporter {
    /// Dense `rows x cols` table. Unoccupied cells are empty strings.
    pub fn to_table(lattice: &PlacementLattice) -> Vec<Vec<String>> {
        let bbox = lattice.bounding_box();
        let mut table = vec![vec![String::new(); bbox.cols()]; bbox.rows()];
        for cell in lattice.cells() {
            table[cell.position.row][cell.position.col] = cell.word.as_str().to_string();
        }
        table
    }

    /// Write the table to `writer`. An empty lattice writes nothing.
    pub fn write_to<W: io::Write>(lattice: &PlacementLattice, writer: W) -> Result<W, ExportError> {
        let mut csv_writer = csv::WriterBuilder::new()
            .has_headers(false)
            .quote_style(csv::QuoteStyle::Always)
            .terminator(csv::Terminator::CRLF)
            .from_writer(writer);

        for row in Self::to_table(lattice) {
            csv_writer.write_record(&row)?;
        }

        csv_writer
            .into_inner()
            .map_err(|e| ExportError::Flush(e.into_error()))
    }

    /// Serialize to an in-memory byte buffer.
    pub fn serialize(lattice: &PlacementLattice) -> Result<Vec<u8>, ExportError> {
        Self::write_to(lattice, Vec::new())
    }

    /// Parse an exported table back into `(position, word)` pairs for every
    /// non-empty field, row-major.
    pub fn parse(bytes: &[u8]) -> Result<Vec<(Position, String)>, ExportError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(bytes);

        let mut cells = Vec::new();
        for (row, record) in reader.records().enumerate() {
            let record = record?;
            for (col, field) in record.iter().enumerate() {
                if !field.is_empty() {
                    cells.push((Position::new(row, col), field.to_string()));
                }
            }
        }
        Ok(cells)
    }
}

/// One placed cell in a submitted grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadCell {
    pub row: usize,
    pub col: usize,
    pub word: String,
}

/// `{"grid": [{"row", "col", "word"}, ...]}` in placement order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridPayload {
    pub grid: Vec<PayloadCell>,
}

impl GridPayload {
    pub fn from_lattice(lattice: &PlacementLattice) -> Self {
        let grid = lattice
            .cells()
            .iter()
            .map(|cell| PayloadCell {
                row: cell.position.row,
                col: cell.position.col,
                word: cell.word.as_str().to_string(),
            })
            .collect();
        Self { grid }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::Word;

    fn lattice_of(cells: &[((usize, usize), &str)]) -> PlacementLattice {
        let mut lattice = PlacementLattice::new();
        for ((row, col), word) in cells {
            lattice
                .place(Position::new(*row, *col), Word::new(word).unwrap())
                .unwrap();
        }
        lattice
    }

    #[test]
    fn test_single_row_export() {
        let lattice = lattice_of(&[((0, 0), "a"), ((0, 1), "b")]);
        let bytes = LatticeExporter::serialize(&lattice).unwrap();
        assert_eq!(bytes, b"\"a\",\"b\"\r\n");
    }

    #[test]
    fn test_empty_lattice_exports_nothing() {
        let bytes = LatticeExporter::serialize(&PlacementLattice::new()).unwrap();
        assert!(bytes.is_empty());
        assert!(LatticeExporter::parse(&bytes).unwrap().is_empty());
    }

    #[test]
    fn test_gaps_are_empty_fields() {
        let lattice = lattice_of(&[((0, 0), "dawn"), ((1, 1), "glow")]);
        let text = String::from_utf8(LatticeExporter::serialize(&lattice).unwrap()).unwrap();
        assert_eq!(text, "\"dawn\",\"\"\r\n\"\",\"glow\"\r\n");
    }

    #[test]
    fn test_touched_extent_adds_empty_rows() {
        let mut lattice = lattice_of(&[((0, 0), "a")]);
        lattice.touch(Position::new(1, 1));
        let table = LatticeExporter::to_table(&lattice);
        assert_eq!(table.len(), 2);
        assert_eq!(table[0], vec!["a", ""]);
        assert_eq!(table[1], vec!["", ""]);
    }

    #[test]
    fn test_quotes_and_commas_escaped() {
        let lattice = lattice_of(&[((0, 0), "say \"hi\""), ((0, 1), "a,b")]);
        let bytes = LatticeExporter::serialize(&lattice).unwrap();
        assert_eq!(bytes, b"\"say \"\"hi\"\"\",\"a,b\"\r\n");

        let parsed = LatticeExporter::parse(&bytes).unwrap();
        assert_eq!(
            parsed,
            vec![
                (Position::new(0, 0), "say \"hi\"".to_string()),
                (Position::new(0, 1), "a,b".to_string()),
            ]
        );
    }

    #[test]
    fn test_export_is_repeatable() {
        let lattice = lattice_of(&[((0, 0), "a"), ((1, 0), "b"), ((2, 1), "c")]);
        let first = LatticeExporter::serialize(&lattice).unwrap();
        let second = LatticeExporter::serialize(&lattice).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_payload_in_placement_order() {
        let lattice = lattice_of(&[((0, 0), "dawn"), ((1, 1), "glow")]);
        let payload = GridPayload::from_lattice(&lattice);
        assert_eq!(
            payload.to_json().unwrap(),
            r#"{"grid":[{"row":0,"col":0,"word":"dawn"},{"row":1,"col":1,"word":"glow"}]}"#
        );
    }
}
