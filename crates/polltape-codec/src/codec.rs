//! The codec capability set and the identity codec.

use crate::FormatError;
use polltape_doc::{Leaf, Node};

/// Result of parsing entered text against the previously stored value.
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed {
    /// Store this leaf in place of the previous value.
    Replace(Leaf),
    /// Keep the previous value; the input was a transient blank.
    Keep,
}

/// Converts between review-screen text and a stored field value.
///
/// `parse` sees the previously stored node so that codecs which edit only part
/// of a value (a timestamp's date or time) can merge into it. `format` is a
/// pure function of the stored node; display strings are never cached.
pub trait FieldCodec {
    /// What `format` renders.
    type Display;

    /// Parse entered `text`, given the node currently stored at the field.
    fn parse(&self, text: &str, previous: Option<&Node>) -> Result<Parsed, FormatError>;

    /// Render a stored node for display.
    fn format(&self, stored: &Node) -> Result<Self::Display, FormatError>;
}

/// Plain strings and numbers-as-strings.
///
/// Any text is accepted verbatim, including the empty string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdentityCodec;

impl FieldCodec for IdentityCodec {
    type Display = String;

    fn parse(&self, text: &str, _previous: Option<&Node>) -> Result<Parsed, FormatError> {
        Ok(Parsed::Replace(Leaf::text(text)))
    }

    fn format(&self, stored: &Node) -> Result<String, FormatError> {
        stored
            .as_leaf()
            .map(Leaf::to_display_string)
            .ok_or(FormatError::NotText {
                found: stored.type_name(),
            })
    }
}

/// Borrow the text of a stored node, or report what was there instead.
pub(crate) fn stored_text(node: &Node) -> Result<&str, FormatError> {
    node.as_str().ok_or(FormatError::NotText {
        found: node.type_name(),
    })
}
