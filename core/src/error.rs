//! Error types shared by the lattice, the provider boundary and the session.

use crate::lattice::Position;
use thiserror::Error;

/// Errors raised by [`crate::PlacementLattice`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LatticeError {
    /// A placement targeted a position that already holds a word.
    #[error("position {position} is already occupied by '{existing}'")]
    Occupied { position: Position, existing: String },
}

/// Failure reported by a suggestion provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// Transport-level failure (connect, timeout, TLS).
    #[error("network error: {0}")]
    Network(String),

    /// The provider answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The response body could not be understood.
    #[error("malformed response: {0}")]
    Parse(String),

    /// Provider is not usable as configured (missing key, bad endpoint).
    #[error("provider not configured: {0}")]
    NotConfigured(String),
}

/// Errors returned by [`crate::SessionController`] operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Rejected request; the session is unchanged.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The suggestion fetch failed. The anchor is kept and `retry()` is allowed.
    #[error("suggestion provider failed: {0}")]
    ProviderFailure(#[from] ProviderError),

    /// Internal placement defect. Never recovered from.
    #[error("lattice invariant violated: {0}")]
    InvariantViolation(#[from] LatticeError),

    /// Writing the export table failed.
    #[error("export failed: {0}")]
    Export(#[from] ExportError),
}

/// Failure while writing the delimited-text table.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("flush: {0}")]
    Flush(#[from] std::io::Error),
}

impl SessionError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Whether the caller can recover by retrying the same anchor.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ProviderFailure(_))
    }
}

/// Errors raised while loading or validating [`crate::Config`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
