//! Prompt derivation from the placement log.
//!
//! `PromptAccumulator` carries only the configured preamble and separator.
//! The prompt itself is always recomputed from the lattice, so it can never
//! trail behind the last placement.

use crate::lattice::{PlacementLattice, Word};

/// Builds the provider prompt: `preamble` followed by the placed words in
/// placement order, joined by `separator`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptAccumulator {
    preamble: String,
    separator: String,
}

impl PromptAccumulator {
    pub fn new(preamble: impl Into<String>, separator: impl Into<String>) -> Self {
        Self {
            preamble: preamble.into(),
            separator: separator.into(),
        }
    }

    pub fn from_config(config: &crate::Config) -> Self {
        Self::new(config.preamble.clone(), config.word_separator.clone())
    }

    pub fn preamble(&self) -> &str {
        &self.preamble
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Prompt for the lattice as it stands.
    pub fn current_prompt(&self, lattice: &PlacementLattice) -> String {
        let mut prompt = self.preamble.clone();
        for (i, word) in lattice.words().enumerate() {
            if i > 0 {
                prompt.push_str(&self.separator);
            }
            prompt.push_str(word.as_str());
        }
        prompt
    }

    /// Prompt the lattice would produce once `word` is placed. Does not mutate.
    pub fn appended(&self, lattice: &PlacementLattice, word: &Word) -> String {
        let mut prompt = self.current_prompt(lattice);
        if !lattice.is_empty() {
            prompt.push_str(&self.separator);
        }
        prompt.push_str(word.as_str());
        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::Position;

    fn w(s: &str) -> Word {
        Word::new(s).unwrap()
    }

    #[test]
    fn test_empty_lattice_yields_preamble() {
        let acc = PromptAccumulator::new("Continue: ", " ");
        assert_eq!(acc.current_prompt(&PlacementLattice::new()), "Continue: ");
    }

    #[test]
    fn test_words_in_placement_order() {
        let acc = PromptAccumulator::new(">", " ");
        let mut lattice = PlacementLattice::new();
        lattice.place(Position::ORIGIN, w("dawn")).unwrap();
        lattice.place(Position::new(1, 1), w("glow")).unwrap();
        lattice.place(Position::new(1, 2), w("fades")).unwrap();

        assert_eq!(acc.current_prompt(&lattice), ">dawn glow fades");
    }

    #[test]
    fn test_appended_matches_read_back() {
        let acc = PromptAccumulator::new("P: ", "_");
        let mut lattice = PlacementLattice::new();

        let first = w("dawn");
        let expected = acc.appended(&lattice, &first);
        assert_eq!(expected, "P: dawn");
        // Pure: nothing changed yet
        assert_eq!(acc.current_prompt(&lattice), "P: ");

        lattice.place(Position::ORIGIN, first).unwrap();
        assert_eq!(acc.current_prompt(&lattice), expected);

        let second = w("light");
        let expected = acc.appended(&lattice, &second);
        lattice.place(Position::new(0, 1), second).unwrap();
        assert_eq!(acc.current_prompt(&lattice), expected);
        assert_eq!(expected, "P: dawn_light");
    }

    #[test]
    fn test_empty_separator_concatenates() {
        let acc = PromptAccumulator::new("", "");
        let mut lattice = PlacementLattice::new();
        lattice.place(Position::ORIGIN, w("ab")).unwrap();
        lattice.place(Position::new(0, 1), w("cd")).unwrap();
        assert_eq!(acc.current_prompt(&lattice), "abcd");
    }
}
