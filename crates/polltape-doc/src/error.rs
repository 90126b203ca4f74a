//! Error types for path resolution.

use crate::Path;
use thiserror::Error;

/// Errors raised when a path does not address a location in a document.
///
/// The `path` carried by each variant is the prefix that failed, so
/// `$.contests[7]` is reported for `contests.7.name` when there are only
/// seven contests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// The path has no segments.
    #[error("path is empty")]
    Empty,

    /// Textual path could not be parsed.
    #[error("malformed path {input:?}: {reason}")]
    Malformed {
        /// The text as supplied.
        input: String,
        /// What was wrong with it.
        reason: &'static str,
    },

    /// A non-final key does not exist in its mapping.
    #[error("path not found: {path}")]
    KeyNotFound {
        /// The path up to and including the missing key.
        path: Path,
    },

    /// Sequence index is out of bounds.
    #[error("index {index} out of bounds (len: {len}) at path {path}")]
    IndexOutOfBounds {
        /// The path up to and including the index.
        path: Path,
        /// The index that was accessed.
        index: usize,
        /// The actual length of the sequence.
        len: usize,
    },

    /// A sequence was addressed with a token that is not a non-negative integer.
    #[error("invalid sequence index {token:?} at path {path}")]
    InvalidIndex {
        /// The path up to and including the bad token.
        path: Path,
        /// The offending token.
        token: String,
    },

    /// The path tries to descend through a leaf value.
    #[error("cannot descend into {found} at path {path}")]
    NotAContainer {
        /// The path of the leaf.
        path: Path,
        /// Type name of the leaf.
        found: &'static str,
    },
}

impl PathError {
    /// Create a malformed path error.
    #[inline]
    pub fn malformed(input: impl Into<String>, reason: &'static str) -> Self {
        PathError::Malformed {
            input: input.into(),
            reason,
        }
    }

    /// Create a key-not-found error.
    #[inline]
    pub fn key_not_found(path: Path) -> Self {
        PathError::KeyNotFound { path }
    }

    /// Create an index out of bounds error.
    #[inline]
    pub fn index_out_of_bounds(path: Path, index: usize, len: usize) -> Self {
        PathError::IndexOutOfBounds { path, index, len }
    }

    /// Create an invalid index error.
    #[inline]
    pub fn invalid_index(path: Path, token: impl Into<String>) -> Self {
        PathError::InvalidIndex {
            path,
            token: token.into(),
        }
    }

    /// Create a not-a-container error.
    #[inline]
    pub fn not_a_container(path: Path, found: &'static str) -> Self {
        PathError::NotAContainer { path, found }
    }
}
