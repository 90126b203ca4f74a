use async_trait::async_trait;
use polltape_doc::Document;
use polltape_review::{SaveCollaborator, SaveError};
use std::path::PathBuf;

/// Writes saved documents to a JSON file.
///
/// Each save writes a sibling temp file and renames it over the target, so a
/// failed save never leaves a truncated document behind.
#[derive(Debug, Clone)]
pub struct FileSaveSink {
    path: PathBuf,
}

impl FileSaveSink {
    /// A sink that saves to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "polltape.json".to_string());
        self.path.with_file_name(format!(".{name}.tmp"))
    }
}

#[async_trait]
impl SaveCollaborator for FileSaveSink {
    async fn save(&self, document: &Document) -> Result<(), SaveError> {
        let mut bytes = serde_json::to_vec_pretty(document)
            .map_err(|e| SaveError::Serialization(e.to_string()))?;
        bytes.push(b'\n');

        let tmp = self.temp_path();
        tokio::fs::write(&tmp, &bytes).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }
}
