//! Review configuration.
//!
//! Read from a JSON file by the command-line front end:
//!
//! ```json
//! {
//!   "malformed_input": "ignore",
//!   "fields": [
//!     {"path": "contests.*.certified_at", "kind": "timestamp"}
//!   ]
//! }
//! ```

use crate::{ConfigError, FieldKind, FieldSchema};
use serde::{Deserialize, Serialize};
use std::path::Path as FsPath;

/// What a commit does with text its codec rejects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedInputPolicy {
    /// Return the format error to the caller.
    #[default]
    Report,
    /// Log it and report a rejected outcome; the document is untouched either
    /// way.
    Ignore,
}

/// One extra field declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDeclaration {
    /// Path pattern, `*` matching one segment.
    pub path: String,
    /// Declared kind.
    pub kind: FieldKind,
}

/// Settings for an edit session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    /// Handling of rejected text.
    pub malformed_input: MalformedInputPolicy,
    /// Declarations layered over [`FieldSchema::poll_tape`].
    pub fields: Vec<FieldDeclaration>,
}

impl ReviewConfig {
    /// Parse a JSON config.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Read and parse a JSON config file.
    pub fn load(path: &FsPath) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// The poll tape schema plus this config's declarations.
    pub fn field_schema(&self) -> Result<FieldSchema, ConfigError> {
        let mut schema = FieldSchema::poll_tape();
        for field in &self.fields {
            schema
                .declare(&field.path, field.kind)
                .map_err(|source| ConfigError::InvalidField {
                    pattern: field.path.clone(),
                    source,
                })?;
        }
        Ok(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polltape_doc::path;

    #[test]
    fn test_defaults() {
        let config = ReviewConfig::from_json("{}").unwrap();
        assert_eq!(config.malformed_input, MalformedInputPolicy::Report);
        assert!(config.fields.is_empty());
    }

    #[test]
    fn test_parse_full() {
        let config = ReviewConfig::from_json(
            r#"{
                "malformed_input": "ignore",
                "fields": [{"path": "contests.*.certified_at", "kind": "timestamp"}]
            }"#,
        )
        .unwrap();
        assert_eq!(config.malformed_input, MalformedInputPolicy::Ignore);

        let schema = config.field_schema().unwrap();
        assert_eq!(
            schema.kind_of(&path!("contests", 2, "certified_at")),
            FieldKind::Timestamp
        );
        assert_eq!(
            schema.kind_of(&path!("election_header", "date")),
            FieldKind::CalendarDate
        );
    }

    #[test]
    fn test_unknown_policy_rejected() {
        assert!(matches!(
            ReviewConfig::from_json(r#"{"malformed_input": "shout"}"#),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_invalid_field_pattern() {
        let config = ReviewConfig {
            fields: vec![FieldDeclaration {
                path: "contests..name".into(),
                kind: FieldKind::Text,
            }],
            ..Default::default()
        };
        assert!(matches!(
            config.field_schema(),
            Err(ConfigError::InvalidField { .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = ReviewConfig::load(FsPath::new("/nonexistent/polltape.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
