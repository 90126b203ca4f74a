//! Path resolution and single-leaf replacement.
//!
//! [`resolve`] checks a path against one snapshot and returns a [`Location`].
//! A location can be read, or turned into a new snapshot with the addressed
//! node replaced. Replacement copies only the ancestors along the path; every
//! sibling sub-tree is shared with the original snapshot.

use crate::{Document, Node, Path, PathError, Seg};
use std::sync::Arc;

/// A resolved step, specialised to the container it addresses.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Step {
    Key(String),
    Index(usize),
}

/// A location inside one particular snapshot.
///
/// A `Location` borrows the snapshot it was resolved against, so it cannot
/// outlive it or be applied to a different one.
#[derive(Debug)]
pub struct Location<'a> {
    doc: &'a Document,
    path: Path,
    steps: Vec<Step>,
    target: Option<&'a Node>,
}

impl<'a> Location<'a> {
    /// The path this location was resolved from.
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The node currently at this location.
    ///
    /// `None` when the final key names a mapping entry that does not exist
    /// yet; writing to such a location inserts it.
    #[inline]
    pub fn get(&self) -> Option<&'a Node> {
        self.target
    }

    /// Produce a new snapshot with this location set to `value`.
    ///
    /// The source snapshot is left untouched.
    pub fn with_value(&self, value: Node) -> Document {
        let mut root = self.doc.root().clone();
        write_at(&mut root, &self.steps, value);
        Document::new(root)
    }
}

/// Resolve `path` inside `doc`.
///
/// Every segment but the last must address an existing mapping entry or an
/// in-bounds sequence element. The last segment may name a new mapping entry,
/// but may not point past the end of a sequence.
///
/// # Examples
///
/// ```
/// use polltape_doc::{path, resolve, Document, PathError};
/// use serde_json::json;
///
/// let doc = Document::from_value(json!({"contests": [{"name": "Mayor"}]}));
///
/// let loc = resolve(&doc, &path!("contests", 0, "name")).unwrap();
/// assert_eq!(loc.get().and_then(|n| n.as_str()), Some("Mayor"));
///
/// let err = resolve(&doc, &path!("contests", 1, "name")).unwrap_err();
/// assert!(matches!(err, PathError::IndexOutOfBounds { index: 1, len: 1, .. }));
/// ```
pub fn resolve<'a>(doc: &'a Document, path: &Path) -> Result<Location<'a>, PathError> {
    if path.is_empty() {
        return Err(PathError::Empty);
    }

    let segments = path.segments();
    let last = segments.len() - 1;
    let mut steps = Vec::with_capacity(segments.len());
    let mut current = Some(doc.root());

    for (depth, seg) in segments.iter().enumerate() {
        // Only the final segment may address a missing mapping entry, so a
        // missing parent here means an earlier key was absent.
        let Some(node) = current else {
            return Err(PathError::key_not_found(path.prefix(depth)));
        };
        let at = || path.prefix(depth + 1);

        current = match node {
            Node::Mapping(map) => {
                let key = seg.as_mapping_key().into_owned();
                let child = map.get(&key);
                if child.is_none() && depth != last {
                    return Err(PathError::key_not_found(at()));
                }
                steps.push(Step::Key(key));
                child
            }
            Node::Sequence(items) => {
                let index = seg
                    .as_sequence_index()
                    .ok_or_else(|| PathError::invalid_index(at(), token_of(seg)))?;
                let child = items
                    .get(index)
                    .ok_or_else(|| PathError::index_out_of_bounds(at(), index, items.len()))?;
                steps.push(Step::Index(index));
                Some(child)
            }
            Node::Leaf(leaf) => {
                return Err(PathError::not_a_container(
                    path.prefix(depth),
                    leaf.type_name(),
                ));
            }
        };
    }

    Ok(Location {
        doc,
        path: path.clone(),
        steps,
        target: current,
    })
}

fn token_of(seg: &Seg) -> String {
    match seg {
        Seg::Key(k) => k.clone(),
        Seg::Index(i) => i.to_string(),
    }
}

/// Replace the node addressed by `steps`, copying each ancestor on the way.
///
/// `Arc::make_mut` clones a container only when it is shared, which it always
/// is here: the root was cloned from a live snapshot. Siblings are carried
/// over as `Arc` clones.
fn write_at(node: &mut Node, steps: &[Step], value: Node) {
    let Some((step, rest)) = steps.split_first() else {
        *node = value;
        return;
    };

    // Steps were resolved against this exact tree, so the shapes line up.
    match (node, step) {
        (Node::Mapping(map), Step::Key(key)) => {
            let map = Arc::make_mut(map);
            if rest.is_empty() {
                map.insert(key.clone(), value);
            } else if let Some(child) = map.get_mut(key) {
                write_at(child, rest, value);
            }
        }
        (Node::Sequence(items), Step::Index(index)) => {
            if let Some(child) = Arc::make_mut(items).get_mut(*index) {
                write_at(child, rest, value);
            }
        }
        _ => debug_assert!(false, "resolved step does not match node shape"),
    }
}

/// Look up the node at `path` without validating it.
///
/// Unlike [`resolve`], this never fails: anything that does not resolve
/// yields `None`. The empty path addresses the root.
pub fn get_at_path<'a>(doc: &'a Document, path: &Path) -> Option<&'a Node> {
    path.iter().try_fold(doc.root(), |node, seg| match node {
        Node::Mapping(map) => map.get(seg.as_mapping_key().as_ref()),
        Node::Sequence(items) => seg.as_sequence_index().and_then(|i| items.get(i)),
        Node::Leaf(_) => None,
    })
}

impl Document {
    /// Resolve `path` and return a new snapshot with it set to `value`.
    pub fn with_value(&self, path: &Path, value: Node) -> Result<Document, PathError> {
        Ok(resolve(self, path)?.with_value(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path;
    use serde_json::json;

    fn sample() -> Document {
        Document::from_value(json!({
            "election_header": {
                "type": "General",
                "location": {"county": "Dane", "state": "WI"}
            },
            "contests": [
                {"name": "Mayor", "candidates": [{"name": "A", "votes": "10"}]},
                {"name": "Clerk", "candidates": []}
            ]
        }))
    }

    #[test]
    fn test_resolve_existing_leaf() {
        let doc = sample();
        let loc = resolve(&doc, &path!("election_header", "location", "county")).unwrap();
        assert_eq!(loc.get().and_then(Node::as_str), Some("Dane"));
    }

    #[test]
    fn test_resolve_subtree() {
        let doc = sample();
        let loc = resolve(&doc, &path!("contests", 1)).unwrap();
        assert!(loc.get().unwrap().as_mapping().is_some());
    }

    #[test]
    fn test_resolve_new_final_key() {
        let doc = sample();
        let loc = resolve(&doc, &path!("election_header", "date")).unwrap();
        assert!(loc.get().is_none());

        let edited = loc.with_value(Node::text("2024-11-05"));
        assert_eq!(
            edited
                .get(&path!("election_header", "date"))
                .and_then(Node::as_str),
            Some("2024-11-05")
        );
        assert!(doc.get(&path!("election_header", "date")).is_none());
    }

    #[test]
    fn test_missing_intermediate_key() {
        let doc = sample();
        let err = resolve(&doc, &path!("election_header", "precinct", "number")).unwrap_err();
        assert_eq!(
            err,
            PathError::key_not_found(path!("election_header", "precinct"))
        );
    }

    #[test]
    fn test_final_index_out_of_bounds() {
        let doc = sample();
        let err = resolve(&doc, &path!("contests", 2)).unwrap_err();
        assert_eq!(err, PathError::index_out_of_bounds(path!("contests", 2), 2, 2));
    }

    #[test]
    fn test_key_token_on_sequence() {
        let doc = sample();
        let err = resolve(&doc, &path!("contests", "first", "name")).unwrap_err();
        assert_eq!(err, PathError::invalid_index(path!("contests", "first"), "first"));
    }

    #[test]
    fn test_digit_key_on_sequence_is_index() {
        let doc = sample();
        let loc = resolve(&doc, &path!("contests", "01", "name")).unwrap();
        assert_eq!(loc.get().and_then(Node::as_str), Some("Clerk"));
    }

    #[test]
    fn test_index_on_mapping_uses_spelling() {
        let doc = Document::from_value(json!({"tallies": {"3": "x"}}));
        let loc = resolve(&doc, &path!("tallies", 3)).unwrap();
        assert_eq!(loc.get().and_then(Node::as_str), Some("x"));
    }

    #[test]
    fn test_descend_through_leaf() {
        let doc = sample();
        let err = resolve(&doc, &path!("election_header", "type", "code")).unwrap_err();
        assert_eq!(
            err,
            PathError::not_a_container(path!("election_header", "type"), "text")
        );
    }

    #[test]
    fn test_empty_path() {
        let doc = sample();
        assert_eq!(resolve(&doc, &Path::root()).unwrap_err(), PathError::Empty);
    }

    #[test]
    fn test_with_value_shares_siblings() {
        let doc = sample();
        let edited = doc
            .with_value(&path!("contests", 0, "name"), Node::text("Governor"))
            .unwrap();

        let old_root = doc.root().as_mapping().unwrap();
        let new_root = edited.root().as_mapping().unwrap();

        // Untouched top-level sibling is the same allocation.
        match (&old_root["election_header"], &new_root["election_header"]) {
            (Node::Mapping(a), Node::Mapping(b)) => assert!(Arc::ptr_eq(a, b)),
            _ => panic!("expected mappings"),
        }
        // The edited branch was copied.
        match (&old_root["contests"], &new_root["contests"]) {
            (Node::Sequence(a), Node::Sequence(b)) => {
                assert!(!Arc::ptr_eq(a, b));
                // Second contest is shared.
                match (&a[1], &b[1]) {
                    (Node::Mapping(x), Node::Mapping(y)) => assert!(Arc::ptr_eq(x, y)),
                    _ => panic!("expected mappings"),
                }
            }
            _ => panic!("expected sequences"),
        }
    }

    #[test]
    fn test_get_at_path_lenient() {
        let doc = sample();
        assert!(get_at_path(&doc, &path!("nope", "deeper")).is_none());
        assert!(get_at_path(&doc, &path!("contests", 9)).is_none());
        assert!(Document::ptr_eq(&doc, &doc));
        assert_eq!(get_at_path(&doc, &Path::root()), Some(doc.root()));
    }
}
