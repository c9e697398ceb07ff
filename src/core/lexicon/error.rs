//! Lexicon Error Types

use std::path::PathBuf;

use thiserror::Error;

/// Oracle build, snapshot and markup errors
#[derive(Error, Debug)]
pub enum LexiconError {
    /// The corpus directory is missing, unreadable or holds no volumes.
    /// Fatal for a build; any existing snapshot is left untouched.
    #[error("Corpus unavailable at {path}: {reason}")]
    CorpusUnavailable { path: PathBuf, reason: String },

    #[error("Markup error: {0}")]
    Markup(String),

    #[error("Snapshot error: {0}")]
    Snapshot(String),

    #[error("Unsupported snapshot format version {found} (expected {expected})")]
    SnapshotVersion { found: u32, expected: u32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for lexicon operations
pub type LexiconResult<T> = std::result::Result<T, LexiconError>;
