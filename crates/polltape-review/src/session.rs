//! EditSession: the per-review lifecycle over a [`DocumentStore`].

use crate::{
    ApplyOutcome, CodecInput, ConfigError, DocumentStore, EditError, FieldKind, FieldSchema,
    MalformedInputPolicy, ReviewConfig, SaveCollaborator, SaveError,
};
use polltape_codec::{
    FieldCodec, FormatError, IdentityCodec, TimestampCodec, TimestampComponent, TimestampDisplay,
};
use polltape_doc::{get_at_path, parse_path, Document, Node, Path};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// What a field commit did.
#[derive(Debug, Clone, PartialEq)]
pub enum CommitOutcome {
    /// The document now holds `value` at the path.
    Applied {
        /// Stored value after the commit.
        value: Node,
    },
    /// The input was a no-op; the stored value is unchanged.
    Unchanged {
        /// Stored value, `None` for a key not present yet.
        value: Option<Node>,
    },
    /// The input was malformed and dropped under
    /// [`MalformedInputPolicy::Ignore`].
    Rejected {
        /// Why the input was dropped.
        error: FormatError,
    },
}

impl CommitOutcome {
    /// Whether the commit produced a new snapshot.
    pub fn is_applied(&self) -> bool {
        matches!(self, CommitOutcome::Applied { .. })
    }
}

/// What [`EditSession::save`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Nothing to save; the collaborator was not called.
    Skipped,
    /// The collaborator accepted the snapshot.
    Saved {
        /// An edit landed while the save was outstanding.
        still_dirty: bool,
    },
}

/// One review session over a poll tape document.
///
/// Clones share the same store, so a handle can be passed to a save task while
/// the screen keeps committing fields.
///
/// # Example
///
/// ```
/// use polltape_review::{EditSession, MemorySaveSink, SaveOutcome};
/// use polltape_doc::Document;
/// use serde_json::json;
/// use std::sync::Arc;
///
/// # tokio_test_block_on(async {
/// let sink = Arc::new(MemorySaveSink::new());
/// let session = EditSession::new(
///     Document::from_value(json!({"election_header": {"type": "Primary"}})),
///     sink.clone(),
/// );
///
/// session.commit_field("election_header.type", "General").unwrap();
/// assert!(session.is_dirty());
///
/// assert_eq!(session.save().await.unwrap(), SaveOutcome::Saved { still_dirty: false });
/// assert_eq!(sink.save_count().await, 1);
/// # });
/// # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
/// # }
/// ```
#[derive(Clone)]
pub struct EditSession {
    store: Arc<Mutex<DocumentStore>>,
    schema: Arc<FieldSchema>,
    policy: MalformedInputPolicy,
    saver: Arc<dyn SaveCollaborator>,
}

impl EditSession {
    /// Seed a session with the poll tape schema and the default policy.
    pub fn new(initial: Document, saver: Arc<dyn SaveCollaborator>) -> Self {
        Self {
            store: Arc::new(Mutex::new(DocumentStore::new(initial))),
            schema: Arc::new(FieldSchema::poll_tape()),
            policy: MalformedInputPolicy::default(),
            saver,
        }
    }

    /// Seed a session configured from `config`.
    pub fn from_config(
        initial: Document,
        saver: Arc<dyn SaveCollaborator>,
        config: &ReviewConfig,
    ) -> Result<Self, ConfigError> {
        Ok(Self::new(initial, saver)
            .with_schema(config.field_schema()?)
            .with_policy(config.malformed_input))
    }

    /// Replace the field schema (builder pattern).
    #[must_use]
    pub fn with_schema(mut self, schema: FieldSchema) -> Self {
        self.schema = Arc::new(schema);
        self
    }

    /// Replace the malformed-input policy (builder pattern).
    #[must_use]
    pub fn with_policy(mut self, policy: MalformedInputPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Field kinds used to route commits.
    pub fn schema(&self) -> &FieldSchema {
        &self.schema
    }

    /// What a malformed commit does.
    pub fn policy(&self) -> MalformedInputPolicy {
        self.policy
    }

    // A panic while holding the lock cannot leave the store half-written:
    // `apply` only assigns after every fallible step.
    fn lock(&self) -> MutexGuard<'_, DocumentStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The current snapshot.
    pub fn current(&self) -> Document {
        self.lock().current()
    }

    /// Whether accepted edits are unsaved.
    pub fn is_dirty(&self) -> bool {
        self.lock().is_dirty()
    }

    /// Number of accepted edits.
    pub fn revision(&self) -> u64 {
        self.lock().revision()
    }

    /// Commit text to a plain or calendar-date field.
    ///
    /// The codec is chosen from the declared kind of `path`. Timestamp fields
    /// must go through [`commit_timestamp_component`](Self::commit_timestamp_component).
    pub fn commit_field(&self, path: &str, text: &str) -> Result<CommitOutcome, EditError> {
        let path = parse_path(path)?;
        let input = match self.schema.kind_of(&path) {
            FieldKind::Text => CodecInput::Plain(text),
            FieldKind::CalendarDate => CodecInput::CalendarDate(text),
            FieldKind::Timestamp => {
                return self.reject(&path, FormatError::component_required(path.clone()))
            }
        };
        self.commit(&path, input)
    }

    /// Commit the date or time component of a timestamp field.
    pub fn commit_timestamp_component(
        &self,
        path: &str,
        component: TimestampComponent,
        text: &str,
    ) -> Result<CommitOutcome, EditError> {
        let path = parse_path(path)?;
        let declared = self.schema.kind_of(&path);
        if declared != FieldKind::Timestamp {
            let error = FormatError::kind_mismatch(
                path.clone(),
                declared.as_str(),
                FieldKind::Timestamp.as_str(),
            );
            return self.reject(&path, error);
        }
        self.commit(&path, CodecInput::Timestamp { component, text })
    }

    fn commit(&self, path: &Path, input: CodecInput<'_>) -> Result<CommitOutcome, EditError> {
        let result = self.lock().apply(path, input);
        match result {
            Ok(ApplyOutcome::Updated { value, .. }) => Ok(CommitOutcome::Applied { value }),
            Ok(ApplyOutcome::Unchanged { value }) => Ok(CommitOutcome::Unchanged { value }),
            Err(EditError::Format(error)) => self.reject(path, error),
            Err(err) => {
                debug!(path = %path, error = %err, "edit dropped");
                Err(err)
            }
        }
    }

    fn reject(&self, path: &Path, error: FormatError) -> Result<CommitOutcome, EditError> {
        match self.policy {
            MalformedInputPolicy::Report => {
                debug!(path = %path, error = %error, "edit rejected");
                Err(error.into())
            }
            MalformedInputPolicy::Ignore => {
                warn!(path = %path, error = %error, "ignoring malformed input");
                Ok(CommitOutcome::Rejected { error })
            }
        }
    }

    /// Display text of a plain field; empty when nothing is stored there.
    pub fn display_field(&self, path: &str) -> Result<String, EditError> {
        let path = parse_path(path)?;
        let doc = self.current();
        match get_at_path(&doc, &path) {
            Some(node) => Ok(IdentityCodec.format(node)?),
            None => Ok(String::new()),
        }
    }

    /// Date and time display text of a timestamp field.
    pub fn display_timestamp(&self, path: &str) -> Result<TimestampDisplay, EditError> {
        let path = parse_path(path)?;
        let doc = self.current();
        let stored = get_at_path(&doc, &path).ok_or_else(|| FormatError::invalid_instant(""))?;
        Ok(TimestampCodec::new(TimestampComponent::Date).format(stored)?)
    }

    /// Hand the current snapshot to the save collaborator.
    ///
    /// Does nothing when the session is clean. The snapshot is captured
    /// before awaiting; commits made while the save is outstanding keep the
    /// session dirty. On failure the session stays dirty so the save can be
    /// retried.
    pub async fn save(&self) -> Result<SaveOutcome, SaveError> {
        let (snapshot, revision) = {
            let store = self.lock();
            if !store.is_dirty() {
                debug!("save skipped, no changes");
                return Ok(SaveOutcome::Skipped);
            }
            (store.current(), store.revision())
        };

        info!(revision, "saving poll tape");
        if let Err(e) = self.saver.save(&snapshot).await {
            warn!(revision, error = %e, "save failed");
            return Err(e);
        }

        let cleared = self.lock().mark_saved_if_current(&snapshot);
        if cleared {
            info!(revision, "poll tape saved");
        } else {
            info!(revision, "poll tape saved, newer edits pending");
        }
        Ok(SaveOutcome::Saved {
            still_dirty: !cleared,
        })
    }
}

impl std::fmt::Debug for EditSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let store = self.lock();
        f.debug_struct("EditSession")
            .field("revision", &store.revision())
            .field("dirty", &store.is_dirty())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
