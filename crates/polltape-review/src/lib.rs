//! Review and correction of scanned poll tapes.
//!
//! An [`EditSession`] seeds a [`DocumentStore`] with the OCR result, applies
//! field commits by path through the codec the [`FieldSchema`] declares for
//! that path, and hands the final snapshot to a [`SaveCollaborator`].
//!
//! ```text
//! commit_field(path, text)
//!     -> parse_path -> FieldSchema::kind_of -> DocumentStore::apply
//!     -> resolve -> FieldCodec::parse -> Location::with_value
//!     -> new snapshot, dirty = true
//!
//! save()
//!     -> snapshot (lock released) -> SaveCollaborator::save().await
//!     -> mark_saved_if_current
//! ```

mod config;
mod error;
mod model;
mod save;
mod schema;
mod session;
mod store;
mod summary;
mod workflow;

pub use config::{FieldDeclaration, MalformedInputPolicy, ReviewConfig};
pub use error::{ConfigError, EditError, SaveError, WorkflowError};
pub use model::{
    BallotCounts, Candidate, Contest, ContestMetadata, ElectionHeader, Location, PollReport,
    PollTape, Precinct, TallyReport, VotingSystem,
};
pub use save::{MemorySaveSink, SaveCollaborator};
pub use schema::{FieldKind, FieldPattern, FieldSchema};
pub use session::{CommitOutcome, EditSession, SaveOutcome};
pub use store::{ApplyOutcome, CodecInput, DocumentStore};
pub use summary::ReviewSummary;
pub use workflow::{ReviewStage, ReviewWorkflow};

pub use polltape_codec::{TimestampComponent, TimestampDisplay};
