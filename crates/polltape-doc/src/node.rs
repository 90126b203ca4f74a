//! The document tree.
//!
//! A document is a recursive tagged union of mappings, sequences and leaves.
//! Containers sit behind `Arc` so that an edited snapshot shares every
//! untouched sub-tree with the snapshot it was derived from.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::{get_at_path, Path};

/// Mapping contents.
pub type Mapping = BTreeMap<String, Node>;

/// A scalar value.
#[derive(Clone, Debug, PartialEq)]
pub enum Leaf {
    /// JSON `null`.
    Null,
    /// A boolean.
    Bool(bool),
    /// A number as it arrived from JSON.
    Number(serde_json::Number),
    /// Text. Most poll tape fields are text, including counters and dates.
    Text(Arc<str>),
}

impl Leaf {
    /// Create a text leaf.
    #[inline]
    pub fn text(s: impl Into<Arc<str>>) -> Self {
        Leaf::Text(s.into())
    }

    /// Borrow the text if this is a text leaf.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Leaf::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Type name for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Leaf::Null => "null",
            Leaf::Bool(_) => "boolean",
            Leaf::Number(_) => "number",
            Leaf::Text(_) => "text",
        }
    }

    /// Render the leaf as the text a reviewer would see.
    ///
    /// `null` renders as the empty string.
    pub fn to_display_string(&self) -> String {
        match self {
            Leaf::Null => String::new(),
            Leaf::Bool(b) => b.to_string(),
            Leaf::Number(n) => n.to_string(),
            Leaf::Text(s) => s.to_string(),
        }
    }
}

impl From<&str> for Leaf {
    fn from(s: &str) -> Self {
        Leaf::Text(s.into())
    }
}

impl From<String> for Leaf {
    fn from(s: String) -> Self {
        Leaf::Text(s.into())
    }
}

impl From<bool> for Leaf {
    fn from(b: bool) -> Self {
        Leaf::Bool(b)
    }
}

impl From<i64> for Leaf {
    fn from(v: i64) -> Self {
        Leaf::Number(v.into())
    }
}

impl Serialize for Leaf {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Leaf::Null => serializer.serialize_unit(),
            Leaf::Bool(b) => serializer.serialize_bool(*b),
            Leaf::Number(n) => n.serialize(serializer),
            Leaf::Text(s) => serializer.serialize_str(s),
        }
    }
}

/// One node of a document tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    /// String-keyed mapping.
    Mapping(Arc<Mapping>),
    /// Ordered sequence, used for repeated groups such as contests.
    Sequence(Arc<Vec<Node>>),
    /// Scalar value.
    Leaf(Leaf),
}

impl Node {
    /// Create a mapping node.
    pub fn mapping(entries: impl IntoIterator<Item = (String, Node)>) -> Self {
        Node::Mapping(Arc::new(entries.into_iter().collect()))
    }

    /// Create a sequence node.
    pub fn sequence(items: impl IntoIterator<Item = Node>) -> Self {
        Node::Sequence(Arc::new(items.into_iter().collect()))
    }

    /// Create a text leaf node.
    #[inline]
    pub fn text(s: impl Into<Arc<str>>) -> Self {
        Node::Leaf(Leaf::text(s))
    }

    /// Type name for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Node::Mapping(_) => "mapping",
            Node::Sequence(_) => "sequence",
            Node::Leaf(leaf) => leaf.type_name(),
        }
    }

    /// Borrow the leaf, if this node is one.
    #[inline]
    pub fn as_leaf(&self) -> Option<&Leaf> {
        match self {
            Node::Leaf(leaf) => Some(leaf),
            _ => None,
        }
    }

    /// Borrow the text, if this node is a text leaf.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        self.as_leaf().and_then(Leaf::as_str)
    }

    /// Borrow the mapping, if this node is one.
    #[inline]
    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Node::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Borrow the sequence, if this node is one.
    #[inline]
    pub fn as_sequence(&self) -> Option<&[Node]> {
        match self {
            Node::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Convert to a `serde_json::Value`.
    pub fn to_value(&self) -> Value {
        match self {
            Node::Mapping(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_value()))
                    .collect(),
            ),
            Node::Sequence(items) => Value::Array(items.iter().map(Node::to_value).collect()),
            Node::Leaf(Leaf::Null) => Value::Null,
            Node::Leaf(Leaf::Bool(b)) => Value::Bool(*b),
            Node::Leaf(Leaf::Number(n)) => Value::Number(n.clone()),
            Node::Leaf(Leaf::Text(s)) => Value::String(s.to_string()),
        }
    }
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Node::mapping(map.into_iter().map(|(k, v)| (k, Node::from(v)))),
            Value::Array(items) => Node::sequence(items.into_iter().map(Node::from)),
            Value::Null => Node::Leaf(Leaf::Null),
            Value::Bool(b) => Node::Leaf(Leaf::Bool(b)),
            Value::Number(n) => Node::Leaf(Leaf::Number(n)),
            Value::String(s) => Node::Leaf(Leaf::Text(s.into())),
        }
    }
}

impl From<Leaf> for Node {
    fn from(leaf: Leaf) -> Self {
        Node::Leaf(leaf)
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::text(s)
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Node::text(s)
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Mapping(map) => serializer.collect_map(map.iter()),
            Node::Sequence(items) => serializer.collect_seq(items.iter()),
            Node::Leaf(leaf) => leaf.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Node::from)
    }
}

/// An immutable document snapshot.
///
/// Cloning a `Document` is a reference-count bump; two clones are the *same*
/// snapshot (see [`Document::ptr_eq`]). Edits never touch an existing
/// snapshot, they produce a new one (see [`crate::resolve`]).
///
/// # Examples
///
/// ```
/// use polltape_doc::{parse_path, Document};
/// use serde_json::json;
///
/// let doc = Document::from_value(json!({"election_header": {"type": "General"}}));
/// let path = parse_path("election_header.type").unwrap();
///
/// let edited = doc.with_value(&path, "Primary".into()).unwrap();
/// assert_eq!(edited.get(&path).and_then(|n| n.as_str()), Some("Primary"));
/// assert_eq!(doc.get(&path).and_then(|n| n.as_str()), Some("General"));
/// ```
#[derive(Clone, PartialEq)]
pub struct Document(Arc<Node>);

impl Document {
    /// Wrap a root node.
    pub fn new(root: Node) -> Self {
        Self(Arc::new(root))
    }

    /// Build a document from JSON.
    pub fn from_value(value: Value) -> Self {
        Self::new(Node::from(value))
    }

    /// Build a document from any serializable model.
    pub fn from_model<T: Serialize>(model: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(model).map(Self::from_value)
    }

    /// Deserialize the document into a typed model.
    pub fn to_model<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.to_value())
    }

    /// Convert to JSON.
    pub fn to_value(&self) -> Value {
        self.0.to_value()
    }

    /// The root node.
    #[inline]
    pub fn root(&self) -> &Node {
        &self.0
    }

    /// Look up the node at `path`, if any. Never fails.
    pub fn get(&self, path: &Path) -> Option<&Node> {
        get_at_path(self, path)
    }

    /// Whether two handles refer to the very same snapshot.
    #[inline]
    pub fn ptr_eq(a: &Document, b: &Document) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new(Node::mapping([]))
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Document").field(&self.0).finish()
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Node::deserialize(deserializer).map(Document::new)
    }
}
