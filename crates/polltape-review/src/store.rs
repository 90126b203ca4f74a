//! DocumentStore holds the current snapshot and the dirty flag.
//!
//! Every accepted edit replaces the current snapshot with a new one; nothing
//! is ever written into an existing snapshot. A rejected edit leaves both the
//! snapshot and the dirty flag exactly as they were.

use crate::EditError;
use polltape_codec::{
    CalendarDateCodec, FieldCodec, IdentityCodec, Parsed, TimestampCodec, TimestampComponent,
};
use polltape_doc::{resolve, Document, Node, Path};
use tracing::debug;

/// Which codec a commit goes through, with the entered text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecInput<'a> {
    /// Plain text, stored verbatim.
    Plain(&'a str),
    /// A `YYYY-MM-DD` date.
    CalendarDate(&'a str),
    /// One component of a timestamp.
    Timestamp {
        /// Which component.
        component: TimestampComponent,
        /// The entered text.
        text: &'a str,
    },
}

impl CodecInput<'_> {
    fn parse(&self, previous: Option<&Node>) -> Result<Parsed, polltape_codec::FormatError> {
        match *self {
            CodecInput::Plain(text) => IdentityCodec.parse(text, previous),
            CodecInput::CalendarDate(text) => CalendarDateCodec.parse(text, previous),
            CodecInput::Timestamp { component, text } => {
                TimestampCodec::new(component).parse(text, previous)
            }
        }
    }
}

/// Result of a successful [`DocumentStore::apply`].
#[derive(Debug, Clone, PartialEq)]
pub enum ApplyOutcome {
    /// A new snapshot was produced.
    Updated {
        /// The value now stored at the path.
        value: Node,
        /// Revision of the new snapshot.
        revision: u64,
    },
    /// The codec kept the previous value; no snapshot was produced.
    Unchanged {
        /// The value still stored at the path.
        value: Option<Node>,
    },
}

/// Holds the current snapshot of one review session.
///
/// # Example
///
/// ```
/// use polltape_doc::{parse_path, Document};
/// use polltape_review::{CodecInput, DocumentStore};
/// use serde_json::json;
///
/// let mut store = DocumentStore::new(Document::from_value(json!({
///     "ballot_counts": {"total_ballots": "318"}
/// })));
/// assert!(!store.is_dirty());
///
/// let path = parse_path("ballot_counts.total_ballots").unwrap();
/// store.apply(&path, CodecInput::Plain("319")).unwrap();
/// assert!(store.is_dirty());
/// assert_eq!(store.current().to_value()["ballot_counts"]["total_ballots"], "319");
/// ```
#[derive(Debug, Clone)]
pub struct DocumentStore {
    seed: Document,
    current: Document,
    dirty: bool,
    revision: u64,
}

impl DocumentStore {
    /// Seed the store. The seed is the current snapshot and the store is clean.
    pub fn new(seed: Document) -> Self {
        Self {
            current: seed.clone(),
            seed,
            dirty: false,
            revision: 0,
        }
    }

    /// The current snapshot.
    pub fn current(&self) -> Document {
        self.current.clone()
    }

    /// The snapshot the store was seeded with.
    pub fn seed(&self) -> &Document {
        &self.seed
    }

    /// Whether accepted edits are unsaved.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Number of accepted edits since seeding.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Apply one field commit.
    ///
    /// Resolves `path`, runs the codec against the stored value and, when it
    /// produces a replacement, swaps in the new snapshot and raises the dirty
    /// flag. On any error nothing changes.
    pub fn apply(&mut self, path: &Path, input: CodecInput<'_>) -> Result<ApplyOutcome, EditError> {
        let location = resolve(&self.current, path)?;
        let previous = location.get();

        let leaf = match input.parse(previous)? {
            Parsed::Replace(leaf) => leaf,
            Parsed::Keep => {
                return Ok(ApplyOutcome::Unchanged {
                    value: previous.cloned(),
                })
            }
        };

        let value = Node::Leaf(leaf);
        let next = location.with_value(value.clone());
        self.current = next;
        self.dirty = true;
        self.revision += 1;

        debug!(path = %path, revision = self.revision, "field updated");
        Ok(ApplyOutcome::Updated {
            value,
            revision: self.revision,
        })
    }

    /// Clear the dirty flag without touching the document.
    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    /// Clear the dirty flag only if `saved` is still the current snapshot.
    ///
    /// Returns whether the flag was cleared. An edit accepted after `saved`
    /// was captured keeps the store dirty.
    pub fn mark_saved_if_current(&mut self, saved: &Document) -> bool {
        if Document::ptr_eq(saved, &self.current) {
            self.dirty = false;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polltape_codec::FormatError;
    use polltape_doc::{path, PathError};
    use serde_json::json;

    fn store() -> DocumentStore {
        DocumentStore::new(Document::from_value(json!({
            "election_header": {"type": "General", "date": "2024-11-05"},
            "open_poll_report": {"timestamp": "2024-11-05T07:00:00"},
            "contests": [{"name": "Mayor"}]
        })))
    }

    #[test]
    fn test_new_is_clean_and_seeded() {
        let store = store();
        assert!(!store.is_dirty());
        assert_eq!(store.revision(), 0);
        assert!(Document::ptr_eq(&store.current(), store.seed()));
    }

    #[test]
    fn test_apply_plain() {
        let mut store = store();
        let outcome = store
            .apply(&path!("contests", 0, "name"), CodecInput::Plain("Governor"))
            .unwrap();
        assert_eq!(
            outcome,
            ApplyOutcome::Updated {
                value: Node::text("Governor"),
                revision: 1
            }
        );
        assert!(store.is_dirty());
        assert!(!Document::ptr_eq(&store.current(), store.seed()));
        assert_eq!(store.seed().to_value()["contests"][0]["name"], "Mayor");
    }

    #[test]
    fn test_apply_invalid_path_changes_nothing() {
        let mut store = store();
        let before = store.current();

        let err = store
            .apply(&path!("contests", 4, "name"), CodecInput::Plain("x"))
            .unwrap_err();
        assert!(matches!(
            err,
            EditError::Path(PathError::IndexOutOfBounds { .. })
        ));
        assert!(Document::ptr_eq(&store.current(), &before));
        assert!(!store.is_dirty());
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn test_apply_rejected_text_changes_nothing() {
        let mut store = store();
        store
            .apply(&path!("contests", 0, "name"), CodecInput::Plain("Governor"))
            .unwrap();
        store.mark_saved();
        let before = store.current();

        let err = store
            .apply(
                &path!("open_poll_report", "timestamp"),
                CodecInput::Timestamp {
                    component: TimestampComponent::Date,
                    text: "02/30/2024",
                },
            )
            .unwrap_err();
        assert!(matches!(
            err,
            EditError::Format(FormatError::NonexistentDate { .. })
        ));
        assert!(Document::ptr_eq(&store.current(), &before));
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_blank_component_keeps_snapshot() {
        let mut store = store();
        let before = store.current();
        let outcome = store
            .apply(
                &path!("open_poll_report", "timestamp"),
                CodecInput::Timestamp {
                    component: TimestampComponent::Time,
                    text: "",
                },
            )
            .unwrap();
        assert_eq!(
            outcome,
            ApplyOutcome::Unchanged {
                value: Some(Node::text("2024-11-05T07:00:00"))
            }
        );
        assert!(Document::ptr_eq(&store.current(), &before));
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_calendar_date_normalized() {
        let mut store = store();
        store
            .apply(
                &path!("election_header", "date"),
                CodecInput::CalendarDate(" 2024-11-06 "),
            )
            .unwrap();
        assert_eq!(
            store.current().to_value()["election_header"]["date"],
            "2024-11-06"
        );
    }

    #[test]
    fn test_mark_saved_if_current() {
        let mut store = store();
        store
            .apply(&path!("contests", 0, "name"), CodecInput::Plain("A"))
            .unwrap();
        let captured = store.current();
        store
            .apply(&path!("contests", 0, "name"), CodecInput::Plain("B"))
            .unwrap();

        assert!(!store.mark_saved_if_current(&captured));
        assert!(store.is_dirty());

        let latest = store.current();
        assert!(store.mark_saved_if_current(&latest));
        assert!(!store.is_dirty());
        assert_eq!(store.revision(), 2);
    }
}
