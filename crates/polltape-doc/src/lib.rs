//! Immutable document tree with path-addressed edits.
//!
//! `polltape-doc` holds the review screen's election report as a tree of
//! mappings, sequences and leaves, and lets a single node be replaced by a
//! path without the caller knowing the document's shape.
//!
//! # Core Concepts
//!
//! - **Document**: an immutable snapshot; cloning it is cheap and yields the
//!   same snapshot
//! - **Path**: a sequence of key/index segments, parsed from dotted text
//! - **Location**: a path checked against one snapshot, ready to read or write
//!
//! # Edits produce new snapshots
//!
//! ```text
//! Document' = resolve(Document, Path)?.with_value(Node)
//! ```
//!
//! - `Document` is never mutated
//! - `Document'` shares every sub-tree off the edited path with `Document`
//! - an unresolvable path is an error and yields no snapshot at all
//!
//! # Quick Start
//!
//! ```
//! use polltape_doc::{parse_path, resolve, Document, Node};
//! use serde_json::json;
//!
//! let doc = Document::from_value(json!({
//!     "contests": [{"name": "Mayor", "candidates": [{"name": "A", "votes": "10"}]}]
//! }));
//!
//! let path = parse_path("contests[0].candidates.0.votes").unwrap();
//! let edited = resolve(&doc, &path).unwrap().with_value(Node::text("12"));
//!
//! assert_eq!(edited.to_value()["contests"][0]["candidates"][0]["votes"], "12");
//! assert_eq!(doc.to_value()["contests"][0]["candidates"][0]["votes"], "10");
//! ```

mod error;
mod node;
mod path;
mod resolve;

pub use error::PathError;
pub use node::{Document, Leaf, Mapping, Node};
pub use path::{parse_path, Path, Seg};
pub use resolve::{get_at_path, resolve, Location};

// Re-export serde_json::Value for convenience
pub use serde_json::Value;
