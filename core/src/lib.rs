//! wordgrid-core
//!
//! Session state machine, placement lattice, prompt derivation and CSV export
//! shared by wordgrid front ends. Network access lives behind the
//! `SuggestionProvider` trait; this crate never performs I/O on its own.
//!
//! Public API:
//! - `SessionController` - the {Empty, Collecting} state machine
//! - `PlacementLattice` - sparse, append-only grid of placed words
//! - `PromptAccumulator` - preamble + placed words, recomputed on demand
//! - `CandidateSet` - ranked suggestions bound to grid slots
//! - `LatticeExporter` - dense CSV export
//! - `Config` - preamble, separator and anchor offsets
use serde::{Deserialize, Serialize};

pub mod error;
pub use error::{ConfigError, ExportError, LatticeError, ProviderError, SessionError};

pub mod lattice;
pub use lattice::{BoundingBox, Offset, PlacedCell, PlacementLattice, Position, Word, DEFAULT_OFFSETS};

pub mod prompt;
pub use prompt::PromptAccumulator;

pub mod candidate;
pub use candidate::{Candidate, CandidateSet};

pub mod provider;
pub use provider::{ScriptedProvider, StaticProvider, SuggestionProvider};

pub mod session;
pub use session::{FetchOutcome, FetchTicket, SessionController, SessionState};

pub mod export;
pub use export::{GridPayload, LatticeExporter, PayloadCell};

pub mod view;
pub use view::{GridView, ViewCell};

/// Instruction text the default fine-tuned model expects.
pub const DEFAULT_PREAMBLE: &str = "Write me an Avant-Garde manifesto.\n\n";

/// Session configuration.
///
/// Front ends flatten this into their own config (see the `wordgrid` crate).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Text placed before the first word of every prompt
    pub preamble: String,

    /// Inserted between consecutive placed words in the prompt
    pub word_separator: String,

    /// Slot for suggestion rank 0, 1, 2 relative to the anchor
    pub offsets: [Offset; 3],
}

impl Default for Config {
    fn default() -> Self {
        Self {
            preamble: DEFAULT_PREAMBLE.to_string(),
            word_separator: " ".to_string(),
            offsets: DEFAULT_OFFSETS,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = self.to_toml_string()?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize configuration to TOML string.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Offsets must be distinct single steps right, down or diagonally.
    ///
    /// Anything else could propose a slot that is already occupied.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for offset in &self.offsets {
            if !offset.is_unit_step() {
                return Err(ConfigError::Invalid(format!(
                    "offset ({}, {}) must move at most one row and one column",
                    offset.rows, offset.cols
                )));
            }
        }
        let [a, b, c] = self.offsets;
        if a == b || b == c || a == c {
            return Err(ConfigError::Invalid("offsets must be distinct".into()));
        }
        Ok(())
    }
}

/// Utility helpers.
pub mod utils {
    /// Normalize input strings (NFC) and trim whitespace.
    pub fn normalize(s: &str) -> String {
        use unicode_normalization::UnicodeNormalization;
        s.nfc().collect::<String>().trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.offsets, DEFAULT_OFFSETS);
        assert_eq!(config.word_separator, " ");
    }

    #[test]
    fn test_toml_round_trip_and_partial() {
        let config = Config {
            preamble: "Go:\n".into(),
            ..Config::default()
        };
        let text = config.to_toml_string().unwrap();
        assert_eq!(Config::from_toml_str(&text).unwrap(), config);

        // Missing fields fall back to defaults
        let partial = Config::from_toml_str("word_separator = \"-\"").unwrap();
        assert_eq!(partial.word_separator, "-");
        assert_eq!(partial.preamble, DEFAULT_PREAMBLE);
    }

    #[test]
    fn test_validate_rejects_bad_offsets() {
        let mut config = Config::default();
        config.offsets[0] = Offset::new(0, 0);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = Config::default();
        config.offsets[2] = Offset::new(0, 1);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = Config::default();
        config.offsets[1] = Offset::new(2, 2);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load_file() {
        let path = std::env::temp_dir().join(format!("wordgrid_config_{}.toml", std::process::id()));
        let config = Config {
            word_separator: "/".into(),
            ..Config::default()
        };
        config.save_toml(&path).unwrap();
        let loaded = Config::load_toml(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_normalize() {
        assert_eq!(utils::normalize("  word\n"), "word");
    }
}
