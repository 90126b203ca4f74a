use polltape_codec::FormatError;
use polltape_doc::PathError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from committing a field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    /// The path does not address a location in the document.
    #[error(transparent)]
    Path(#[from] PathError),

    /// The entered text does not fit the field.
    #[error(transparent)]
    Format(#[from] FormatError),
}

/// Errors reported by a save collaborator.
#[derive(Debug, Error)]
pub enum SaveError {
    /// The collaborator refused or failed to store the document.
    #[error("save rejected: {0}")]
    Rejected(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Errors loading review configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The config is not valid JSON for [`crate::ReviewConfig`].
    #[error("failed to parse config (JSON): {0}")]
    Parse(#[from] serde_json::Error),

    /// A field declaration has an unparseable path pattern.
    #[error("invalid field pattern {pattern:?}: {source}")]
    InvalidField {
        /// The pattern as written.
        pattern: String,
        /// Why it did not parse.
        source: PathError,
    },
}

/// Out-of-order review workflow transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WorkflowError {
    /// Review needs a scanned poll tape.
    #[error("scan the poll tape before reviewing it")]
    ScanRequired,

    /// Publishing needs an acknowledged review.
    #[error("review the poll tape before publishing it")]
    ReviewRequired,

    /// Publishing needs every edit saved.
    #[error("save edits before publishing")]
    Unsaved,

    /// Nothing can change after publishing.
    #[error("poll tape already published")]
    AlreadyPublished,
}
