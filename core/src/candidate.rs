//! Candidate continuations proposed around an anchor.
//!
//! This module provides:
//! - `Candidate`: a suggested word bound to the slot it would occupy
//! - `CandidateSet`: the live, ranked set for one anchor

use crate::lattice::{Offset, Position, Word};
use serde::{Deserialize, Serialize};

/// A provider suggestion bound to a grid slot.
///
/// `generation` identifies the fetch that produced it, so a candidate kept
/// from an older set never matches the live one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub word: Word,
    pub position: Position,
    /// 0 = right, 1 = down, 2 = diagonal with the default offsets
    pub rank: usize,
    pub generation: u64,
}

/// Ranked candidates for a single anchor. Replaced wholesale on every fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateSet {
    anchor: Position,
    generation: u64,
    candidates: Vec<Candidate>,
}

impl CandidateSet {
    /// Bind ranked provider output to the slots around `anchor`.
    ///
    /// Blank suggestions are dropped before ranking; anything beyond the
    /// number of offsets is ignored.
    pub fn from_ranked<S: AsRef<str>>(
        anchor: Position,
        generation: u64,
        words: &[S],
        offsets: &[Offset],
    ) -> Self {
        let candidates = words
            .iter()
            .filter_map(|raw| Word::new(raw.as_ref()))
            .zip(offsets.iter())
            .enumerate()
            .map(|(rank, (word, offset))| Candidate {
                word,
                position: anchor.offset(*offset),
                rank,
                generation,
            })
            .collect();

        Self {
            anchor,
            generation,
            candidates,
        }
    }

    pub fn anchor(&self) -> Position {
        self.anchor
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Candidate> {
        self.candidates.iter()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Candidate by rank.
    pub fn get(&self, rank: usize) -> Option<&Candidate> {
        self.candidates.get(rank)
    }

    /// Candidate proposed for `position`, if any.
    pub fn at(&self, position: Position) -> Option<&Candidate> {
        self.candidates.iter().find(|c| c.position == position)
    }

    /// Exact membership: same generation, slot and word.
    pub fn contains(&self, candidate: &Candidate) -> bool {
        candidate.generation == self.generation && self.candidates.iter().any(|c| c == candidate)
    }
}

impl<'a> IntoIterator for &'a CandidateSet {
    type Item = &'a Candidate;
    type IntoIter = std::slice::Iter<'a, Candidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.candidates.iter()
    }
}
