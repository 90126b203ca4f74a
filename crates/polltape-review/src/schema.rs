//! Declared field kinds.
//!
//! The engine itself is schema-agnostic; the schema only decides which codec a
//! commit goes through. Undeclared paths are plain text.

use polltape_doc::{parse_path, Path, PathError, Seg};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a field is edited and displayed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Stored verbatim.
    #[default]
    Text,
    /// `YYYY-MM-DD`.
    CalendarDate,
    /// One instant, edited by date and time component.
    Timestamp,
}

impl FieldKind {
    /// Name used in messages and config.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::CalendarDate => "calendar_date",
            FieldKind::Timestamp => "timestamp",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PatternSeg {
    Any,
    Exact(Seg),
}

impl PatternSeg {
    fn matches(&self, seg: &Seg) -> bool {
        match self {
            PatternSeg::Any => true,
            // numeric segments compare by value, so `00` and `[0]` are one index
            PatternSeg::Exact(expected) => {
                match (expected.as_sequence_index(), seg.as_sequence_index()) {
                    (Some(a), Some(b)) => a == b,
                    _ => expected.as_mapping_key() == seg.as_mapping_key(),
                }
            }
        }
    }
}

/// A path pattern where `*` matches any single segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPattern(Vec<PatternSeg>);

impl FieldPattern {
    /// Parse `contests.*.metadata.date`-style text.
    pub fn parse(text: &str) -> Result<Self, PathError> {
        if text.trim().is_empty() {
            return Err(PathError::Empty);
        }
        let mut segs = Vec::new();
        for token in text.trim().split('.') {
            if token == "*" {
                segs.push(PatternSeg::Any);
            } else {
                let parsed =
                    parse_path(token).map_err(|_| PathError::malformed(text, "bad pattern segment"))?;
                segs.extend(parsed.iter().cloned().map(PatternSeg::Exact));
            }
        }
        Ok(Self(segs))
    }

    /// A pattern of literal keys.
    pub fn keys(keys: &[&str]) -> Self {
        Self(
            keys.iter()
                .map(|k| PatternSeg::Exact(Seg::from_token(k)))
                .collect(),
        )
    }

    /// Whether `path` matches segment for segment.
    pub fn matches(&self, path: &Path) -> bool {
        self.0.len() == path.len() && self.0.iter().zip(path.iter()).all(|(p, s)| p.matches(s))
    }

    fn wildcards(&self) -> usize {
        self.0.iter().filter(|s| matches!(s, PatternSeg::Any)).count()
    }
}

/// Field kinds by path pattern.
///
/// When several patterns match, the one with the fewest wildcards wins, and
/// among equals the one declared last.
#[derive(Debug, Clone, Default)]
pub struct FieldSchema {
    entries: Vec<(FieldPattern, FieldKind)>,
}

impl FieldSchema {
    /// A schema with no declarations; every field is text.
    pub fn new() -> Self {
        Self::default()
    }

    /// The poll tape layout: the election date and the three report
    /// timestamps.
    pub fn poll_tape() -> Self {
        Self::new()
            .with(FieldPattern::keys(&["election_header", "date"]), FieldKind::CalendarDate)
            .with(FieldPattern::keys(&["open_poll_report", "timestamp"]), FieldKind::Timestamp)
            .with(FieldPattern::keys(&["close_poll_report", "timestamp"]), FieldKind::Timestamp)
            .with(FieldPattern::keys(&["tally_report", "timestamp"]), FieldKind::Timestamp)
    }

    /// Add a declaration (builder pattern).
    pub fn with(mut self, pattern: FieldPattern, kind: FieldKind) -> Self {
        self.entries.push((pattern, kind));
        self
    }

    /// Parse and add a declaration.
    pub fn declare(&mut self, pattern: &str, kind: FieldKind) -> Result<(), PathError> {
        self.entries.push((FieldPattern::parse(pattern)?, kind));
        Ok(())
    }

    /// The declared kind of `path`.
    pub fn kind_of(&self, path: &Path) -> FieldKind {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, (pattern, _))| pattern.matches(path))
            .min_by_key(|(order, (pattern, _))| (pattern.wildcards(), std::cmp::Reverse(*order)))
            .map(|(_, (_, kind))| *kind)
            .unwrap_or_default()
    }
}
