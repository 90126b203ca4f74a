//! Error type for field codecs.

use polltape_doc::Path;
use thiserror::Error;

/// Entered text (or a stored value) does not fit the field's codec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// Text does not have the required shape.
    #[error("{field} {input:?} does not match {expected}")]
    Pattern {
        /// Which field family rejected it (`date`, `time`, `calendar date`).
        field: &'static str,
        /// The text as entered.
        input: String,
        /// Human-readable shape that was expected.
        expected: &'static str,
    },

    /// Text has the right shape but a component is out of range.
    #[error("{field} {input:?} is out of range: {reason}")]
    OutOfRange {
        /// Which field family rejected it.
        field: &'static str,
        /// The text as entered.
        input: String,
        /// Which component was out of range.
        reason: &'static str,
    },

    /// Month and day are in range but the date does not exist.
    #[error("{input:?} is not a real calendar date")]
    NonexistentDate {
        /// The text as entered.
        input: String,
    },

    /// The stored value a component should merge into is not an instant.
    #[error("stored value {stored:?} is not a recognizable instant")]
    InvalidInstant {
        /// The stored text, empty when nothing was stored.
        stored: String,
    },

    /// A text leaf was required.
    #[error("expected a text value, found {found}")]
    NotText {
        /// Type name of what was found.
        found: &'static str,
    },

    /// A timestamp field was committed as a whole instead of by component.
    #[error("{path} is a timestamp; commit its date or time component")]
    ComponentRequired {
        /// The timestamp field.
        path: Path,
    },

    /// A component commit was aimed at a field declared with another kind.
    #[error("{path} is declared as {declared}, not {requested}")]
    KindMismatch {
        /// The field.
        path: Path,
        /// Declared kind.
        declared: &'static str,
        /// Kind implied by the commit.
        requested: &'static str,
    },
}

impl FormatError {
    /// Create a pattern mismatch error.
    #[inline]
    pub fn pattern(field: &'static str, input: impl Into<String>, expected: &'static str) -> Self {
        FormatError::Pattern {
            field,
            input: input.into(),
            expected,
        }
    }

    /// Create an out-of-range error.
    #[inline]
    pub fn out_of_range(field: &'static str, input: impl Into<String>, reason: &'static str) -> Self {
        FormatError::OutOfRange {
            field,
            input: input.into(),
            reason,
        }
    }

    /// Create a nonexistent-date error.
    #[inline]
    pub fn nonexistent_date(input: impl Into<String>) -> Self {
        FormatError::NonexistentDate {
            input: input.into(),
        }
    }

    /// Create an invalid-instant error.
    #[inline]
    pub fn invalid_instant(stored: impl Into<String>) -> Self {
        FormatError::InvalidInstant {
            stored: stored.into(),
        }
    }

    /// Create a component-required error.
    #[inline]
    pub fn component_required(path: Path) -> Self {
        FormatError::ComponentRequired { path }
    }

    /// Create a kind mismatch error.
    #[inline]
    pub fn kind_mismatch(path: Path, declared: &'static str, requested: &'static str) -> Self {
        FormatError::KindMismatch {
            path,
            declared,
            requested,
        }
    }
}
