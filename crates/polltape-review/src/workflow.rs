//! Scan, review and publish gating.

use crate::{EditSession, WorkflowError};
use serde::{Deserialize, Serialize};

/// Where a poll tape is in its review.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStage {
    /// No scan has finished yet.
    #[default]
    AwaitingScan,
    /// OCR output is loaded and can be reviewed.
    Scanned,
    /// A reviewer signed off on the values.
    Reviewed,
    /// Results went out; no further changes.
    Published,
}

/// Tracks one poll tape from scan to publish.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewWorkflow {
    stage: ReviewStage,
}

impl ReviewWorkflow {
    /// A workflow awaiting its first scan.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current stage.
    pub fn stage(&self) -> ReviewStage {
        self.stage
    }

    /// A scan has finished at some point.
    pub fn scan_complete(&self) -> bool {
        self.stage >= ReviewStage::Scanned
    }

    /// A review has been signed off.
    pub fn review_complete(&self) -> bool {
        self.stage >= ReviewStage::Reviewed
    }

    /// Edits are allowed between scan and publish.
    pub fn can_review(&self) -> bool {
        self.stage == ReviewStage::Scanned || self.stage == ReviewStage::Reviewed
    }

    /// Only a reviewed tape can be published.
    pub fn can_publish(&self) -> bool {
        self.stage == ReviewStage::Reviewed
    }

    /// A scan finished. Rescanning drops an earlier review.
    pub fn record_scan(&mut self) -> Result<(), WorkflowError> {
        if self.stage == ReviewStage::Published {
            return Err(WorkflowError::AlreadyPublished);
        }
        self.stage = ReviewStage::Scanned;
        Ok(())
    }

    /// The operator looked over the scanned tape.
    pub fn acknowledge_review(&mut self) -> Result<(), WorkflowError> {
        match self.stage {
            ReviewStage::AwaitingScan => Err(WorkflowError::ScanRequired),
            ReviewStage::Published => Err(WorkflowError::AlreadyPublished),
            ReviewStage::Scanned | ReviewStage::Reviewed => {
                self.stage = ReviewStage::Reviewed;
                Ok(())
            }
        }
    }

    /// Publish the reviewed tape. Every edit in `session` must be saved.
    pub fn publish(&mut self, session: &EditSession) -> Result<(), WorkflowError> {
        match self.stage {
            ReviewStage::AwaitingScan => Err(WorkflowError::ScanRequired),
            ReviewStage::Scanned => Err(WorkflowError::ReviewRequired),
            ReviewStage::Published => Err(WorkflowError::AlreadyPublished),
            ReviewStage::Reviewed if session.is_dirty() => Err(WorkflowError::Unsaved),
            ReviewStage::Reviewed => {
                self.stage = ReviewStage::Published;
                tracing::info!(revision = session.revision(), "poll tape published");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemorySaveSink;
    use polltape_doc::Document;
    use serde_json::json;
    use std::sync::Arc;

    fn session() -> EditSession {
        EditSession::new(
            Document::from_value(json!({"election_header": {"type": "General"}})),
            Arc::new(MemorySaveSink::new()),
        )
    }

    #[test]
    fn test_out_of_order_steps() {
        let session = session();
        let mut workflow = ReviewWorkflow::new();

        assert_eq!(workflow.acknowledge_review(), Err(WorkflowError::ScanRequired));
        assert_eq!(workflow.publish(&session), Err(WorkflowError::ScanRequired));

        workflow.record_scan().unwrap();
        assert!(workflow.can_review());
        assert_eq!(workflow.publish(&session), Err(WorkflowError::ReviewRequired));
    }

    #[test]
    fn test_rescan_resets_review() {
        let mut workflow = ReviewWorkflow::new();
        workflow.record_scan().unwrap();
        workflow.acknowledge_review().unwrap();
        assert!(workflow.review_complete());

        workflow.record_scan().unwrap();
        assert!(workflow.scan_complete());
        assert!(!workflow.review_complete());
    }

    #[tokio::test]
    async fn test_publish_requires_saved_session() {
        let session = session();
        let mut workflow = ReviewWorkflow::new();
        workflow.record_scan().unwrap();
        workflow.acknowledge_review().unwrap();

        session.commit_field("election_header.type", "Primary").unwrap();
        assert_eq!(workflow.publish(&session), Err(WorkflowError::Unsaved));
        assert!(workflow.can_publish());

        session.save().await.unwrap();
        workflow.publish(&session).unwrap();
        assert_eq!(workflow.stage(), ReviewStage::Published);

        assert_eq!(workflow.record_scan(), Err(WorkflowError::AlreadyPublished));
        assert_eq!(workflow.acknowledge_review(), Err(WorkflowError::AlreadyPublished));
        assert_eq!(workflow.publish(&session), Err(WorkflowError::AlreadyPublished));
    }
}
