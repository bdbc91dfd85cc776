//! Error types for tree_snapshot

use thiserror::Error;

/// Result type alias for tree_snapshot operations
pub type Result<T> = std::result::Result<T, Error>;

/// Malformed encoded snapshot bytes
///
/// Cloneable so a failed forcing of a lazily decoded child map can be cached
/// and handed to every later reader.
#[derive(Error, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ParseError {
    #[error("truncated input: needed {needed} bytes, {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },

    #[error("{0} trailing bytes after last child record")]
    TrailingBytes(usize),

    #[error("negative child count: {0}")]
    NegativeCount(i32),

    #[error("duplicate child identity: {0}")]
    DuplicateIdentity(String),

    #[error("unknown node kind tag: {0}")]
    UnknownKindTag(u8),

    #[error("invalid node identity: {0}")]
    InvalidIdentity(String),

    #[error("tree nests deeper than {0} levels")]
    TooDeep(usize),
}

/// Errors that can occur in tree_snapshot operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid snapshot file: {0}")]
    InvalidFile(String),

    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },

    #[error("Checksum mismatch: expected {expected}, found {found}")]
    ChecksumMismatch { expected: String, found: String },

    #[error("Duplicate child identity under one parent: {0}")]
    DuplicateChild(String),

    #[error("Invalid tree view: {0}")]
    InvalidView(String),
}
