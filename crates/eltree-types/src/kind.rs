use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// The kind of a persisted node.
///
/// The set is closed: every decision that depends on the kind (rendering,
/// whether children or attributes are allowed) matches on all four variants.
/// Persisted as its one-byte [`code`](NodeKind::code).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum NodeKind {
    /// Document (or fragment) root. Exactly one per document, no parent.
    Root,
    /// An element such as `<element>`.
    Element,
    /// Text content of an element.
    Text,
    /// A comment such as `<!-- note -->`.
    Comment,
}

impl NodeKind {
    /// Returns `true` if nodes of this kind may own child nodes.
    pub fn can_have_children(self) -> bool {
        match self {
            Self::Root | Self::Element => true,
            Self::Text | Self::Comment => false,
        }
    }

    /// Returns `true` if nodes of this kind may own attributes.
    pub fn can_have_attributes(self) -> bool {
        match self {
            Self::Element => true,
            Self::Root | Self::Text | Self::Comment => false,
        }
    }

    /// Stable numeric code.
    pub fn code(self) -> u8 {
        match self {
            Self::Root => 0,
            Self::Element => 1,
            Self::Text => 2,
            Self::Comment => 3,
        }
    }
}

impl From<NodeKind> for u8 {
    fn from(kind: NodeKind) -> Self {
        kind.code()
    }
}

impl TryFrom<u8> for NodeKind {
    type Error = TypeError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Root),
            1 => Ok(Self::Element),
            2 => Ok(Self::Text),
            3 => Ok(Self::Comment),
            other => Err(TypeError::UnknownKind(other)),
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => write!(f, "root"),
            Self::Element => write!(f, "element"),
            Self::Text => write!(f, "text"),
            Self::Comment => write!(f, "comment"),
        }
    }
}
