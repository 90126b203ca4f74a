//! Save collaborator contract and an in-memory implementation.

use crate::SaveError;
use async_trait::async_trait;
use polltape_doc::Document;
use std::sync::atomic::{AtomicBool, Ordering};

/// Receives the edited document when a session saves.
///
/// Implementations decide where the document goes (a publish endpoint, a
/// file, a test buffer). A returned error leaves the session dirty so the
/// save can be retried.
#[async_trait]
pub trait SaveCollaborator: Send + Sync {
    /// Store `document`.
    async fn save(&self, document: &Document) -> Result<(), SaveError>;
}

/// In-memory save sink for testing and local development.
///
/// Records every snapshot it is handed, in order.
#[derive(Default)]
pub struct MemorySaveSink {
    saved: tokio::sync::RwLock<Vec<Document>>,
    failing: AtomicBool,
}

impl MemorySaveSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that rejects every save until [`set_failing`](Self::set_failing)
    /// turns it back on.
    pub fn failing() -> Self {
        let sink = Self::new();
        sink.set_failing(true);
        sink
    }

    /// Make later saves fail, or succeed again.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Every snapshot saved so far.
    pub async fn saved(&self) -> Vec<Document> {
        self.saved.read().await.clone()
    }

    /// Number of successful saves.
    pub async fn save_count(&self) -> usize {
        self.saved.read().await.len()
    }

    /// The most recently saved snapshot.
    pub async fn last(&self) -> Option<Document> {
        self.saved.read().await.last().cloned()
    }
}

#[async_trait]
impl SaveCollaborator for MemorySaveSink {
    async fn save(&self, document: &Document) -> Result<(), SaveError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(SaveError::Rejected("memory sink is failing".to_string()));
        }
        self.saved.write().await.push(document.clone());
        Ok(())
    }
}
