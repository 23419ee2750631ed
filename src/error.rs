//! Error types for the ring analyzer.

use std::io;
use thiserror::Error;

/// Result type alias for ring analysis operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the ring analyzer.
#[derive(Error, Debug)]
pub enum Error {
    /// Input that cannot be analyzed (empty ring, zero nodes, unknown node).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A snapshot index outside the recorded history.
    #[error("snapshot index {index} out of range (have {len} snapshots)")]
    SnapshotIndexOutOfRange { index: usize, len: usize },

    /// Ring listing parse errors.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// JSON export error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for an [`Error::InvalidInput`].
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }
}

/// Errors raised while reading a ring listing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// No `Address` header line, so no data rows can be located.
    #[error("could not find 'Address' header in ring listing")]
    MissingHeader,

    /// The listing had a header but no usable token rows.
    #[error("no valid tokens found in ring listing")]
    NoTokens,

    /// No `Datacenter:` sections were found.
    #[error("no datacenters found in ring listing")]
    NoDatacenters,
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}
