//! Path representation for addressing a location inside a document.
//!
//! Paths are sequences of segments. Each segment is either a key (for
//! mappings) or an index (for sequences). The textual form used by the review
//! screen is dot-separated (`contests.0.candidates.1.votes`), with `[n]`
//! accepted as an alternative spelling of an index (`contests[0].name`).

use crate::PathError;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// A single segment in a path.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Seg {
    /// Mapping key access.
    Key(String),
    /// Sequence index access.
    Index(usize),
}

impl Seg {
    /// Create a key segment.
    #[inline]
    pub fn key(k: impl Into<String>) -> Self {
        Seg::Key(k.into())
    }

    /// Create an index segment.
    #[inline]
    pub fn index(i: usize) -> Self {
        Seg::Index(i)
    }

    /// Classify a bare textual token.
    ///
    /// Canonical non-negative integers (`0`, `12`, but not `012` or `+1`)
    /// become indices; everything else is a key.
    pub fn from_token(token: &str) -> Self {
        if is_canonical_index(token) {
            if let Ok(i) = token.parse::<usize>() {
                return Seg::Index(i);
            }
        }
        Seg::Key(token.to_owned())
    }

    /// The segment spelled as a mapping key.
    ///
    /// An index addressing a mapping is looked up under its decimal spelling.
    pub fn as_mapping_key(&self) -> Cow<'_, str> {
        match self {
            Seg::Key(k) => Cow::Borrowed(k),
            Seg::Index(i) => Cow::Owned(i.to_string()),
        }
    }

    /// The segment read as a sequence index.
    ///
    /// Returns `None` for a key that is not a non-negative integer.
    pub fn as_sequence_index(&self) -> Option<usize> {
        match self {
            Seg::Index(i) => Some(*i),
            Seg::Key(k) if !k.is_empty() && k.bytes().all(|b| b.is_ascii_digit()) => k.parse().ok(),
            Seg::Key(_) => None,
        }
    }
}

fn is_canonical_index(token: &str) -> bool {
    match token.as_bytes() {
        [] => false,
        [b'0'] => true,
        [first, rest @ ..] => {
            (b'1'..=b'9').contains(first) && rest.iter().all(|b| b.is_ascii_digit())
        }
    }
}

impl fmt::Display for Seg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Seg::Key(k) => write!(f, ".{}", k),
            Seg::Index(i) => write!(f, "[{}]", i),
        }
    }
}

impl From<String> for Seg {
    fn from(s: String) -> Self {
        Seg::Key(s)
    }
}

impl From<&str> for Seg {
    fn from(s: &str) -> Self {
        Seg::Key(s.to_owned())
    }
}

impl From<usize> for Seg {
    fn from(i: usize) -> Self {
        Seg::Index(i)
    }
}

/// A complete path into a document.
///
/// Two paths are equal iff their segment sequences are equal element-wise.
///
/// # Examples
///
/// ```
/// use polltape_doc::Path;
///
/// let path = Path::root().key("contests").index(0).key("name");
/// assert_eq!(path.len(), 3);
/// assert_eq!(path.to_string(), "$.contests[0].name");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Path(Vec<Seg>);

impl Path {
    /// Create an empty path (root).
    #[inline]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Append a key segment and return self (builder pattern).
    #[inline]
    pub fn key(mut self, k: impl Into<String>) -> Self {
        self.0.push(Seg::Key(k.into()));
        self
    }

    /// Append an index segment and return self (builder pattern).
    #[inline]
    pub fn index(mut self, i: usize) -> Self {
        self.0.push(Seg::Index(i));
        self
    }

    /// Push a segment onto the path (mutating).
    #[inline]
    pub fn push(&mut self, seg: Seg) {
        self.0.push(seg);
    }

    /// Get the segments of this path.
    #[inline]
    pub fn segments(&self) -> &[Seg] {
        &self.0
    }

    /// Check if this path is empty (root).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the number of segments in this path.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// The first `len` segments as a new path.
    pub fn prefix(&self, len: usize) -> Path {
        Path(self.0[..len.min(self.0.len())].to_vec())
    }

    /// Iterate over the segments.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Seg> {
        self.0.iter()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$")?;
        for seg in &self.0 {
            write!(f, "{}", seg)?;
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_path(s)
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a Seg;
    type IntoIter = std::slice::Iter<'a, Seg>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl std::ops::Index<usize> for Path {
    type Output = Seg;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

/// Parse a textual path.
///
/// Tokens are separated by `.`; a token may carry one or more `[n]` index
/// suffixes. Empty tokens, unbalanced brackets and non-numeric bracket contents
/// are rejected.
///
/// ```
/// use polltape_doc::{parse_path, Seg};
///
/// let p = parse_path("contests[0].candidates.1.votes").unwrap();
/// assert_eq!(p.len(), 5);
/// assert_eq!(p[1], Seg::Index(0));
/// assert_eq!(p[3], Seg::Index(1));
/// ```
pub fn parse_path(input: &str) -> Result<Path, PathError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(PathError::Empty);
    }

    let mut path = Path::root();
    for token in trimmed.split('.') {
        parse_token(token, &mut path).map_err(|reason| PathError::malformed(input, reason))?;
    }
    Ok(path)
}

fn parse_token(token: &str, path: &mut Path) -> Result<(), &'static str> {
    let (head, mut rest) = match token.find('[') {
        Some(at) => token.split_at(at),
        None => (token, ""),
    };

    if head.is_empty() && rest.is_empty() {
        return Err("empty segment");
    }
    if head.contains(']') {
        return Err("unbalanced bracket");
    }
    if !head.is_empty() {
        path.push(Seg::from_token(head));
    }

    while !rest.is_empty() {
        let inner = rest
            .strip_prefix('[')
            .ok_or("unexpected text after index")?;
        let close = inner.find(']').ok_or("unclosed bracket")?;
        let digits = &inner[..close];
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err("bracket index is not a non-negative integer");
        }
        let index = digits
            .parse::<usize>()
            .map_err(|_| "bracket index is too large")?;
        path.push(Seg::Index(index));
        rest = &inner[close + 1..];
    }
    Ok(())
}

/// Construct a `Path` from a sequence of segments.
///
/// ```
/// use polltape_doc::path;
///
/// // String literals become Key segments, numbers become Index segments.
/// let p = path!("contests", 0, "candidates", 2, "votes");
/// assert_eq!(p.len(), 5);
/// ```
#[macro_export]
macro_rules! path {
    () => {
        $crate::Path::root()
    };
    ($($seg:expr),+ $(,)?) => {{
        let mut p = $crate::Path::root();
        $(
            p.push($crate::Seg::from($seg));
        )+
        p
    }};
}
