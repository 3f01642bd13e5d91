//! The [`Navigator`] contract.

use std::fmt;

use eltree_types::NodeKind;

/// Node type as seen through a navigator.
///
/// Unlike [`NodeKind`], this includes attributes, which a navigator can be
/// positioned on but which are not stored as nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeType {
    Root,
    Element,
    Attribute,
    Text,
    Comment,
}

impl NodeType {
    /// The stored node kind, or `None` for attributes.
    pub fn to_kind(self) -> Option<NodeKind> {
        match self {
            Self::Root => Some(NodeKind::Root),
            Self::Element => Some(NodeKind::Element),
            Self::Text => Some(NodeKind::Text),
            Self::Comment => Some(NodeKind::Comment),
            Self::Attribute => None,
        }
    }
}

impl From<NodeKind> for NodeType {
    fn from(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Root => Self::Root,
            NodeKind::Element => Self::Element,
            NodeKind::Text => Self::Text,
            NodeKind::Comment => Self::Comment,
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => write!(f, "root"),
            Self::Element => write!(f, "element"),
            Self::Attribute => write!(f, "attribute"),
            Self::Text => write!(f, "text"),
            Self::Comment => write!(f, "comment"),
        }
    }
}

/// A movable cursor over a tree.
///
/// Every `move_to_*` method returns `Ok(false)` and leaves the position
/// untouched when the target does not exist. Saved positions are plain
/// clones: moving a clone never affects the original.
pub trait Navigator: Clone {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Type of the node or attribute under the cursor.
    fn node_type(&self) -> NodeType;

    /// Local name of the current element or attribute; empty otherwise.
    fn local_name(&self) -> &str;

    /// Namespace prefix of the current element or attribute; empty otherwise.
    fn prefix(&self) -> &str;

    /// String value of the current position. Attributes report their value
    /// and text nodes their content; roots and elements report the
    /// concatenated text below them. Comments are implementation defined.
    fn value(&self) -> Result<String, Self::Error>;

    /// Snapshot the current position.
    fn copy(&self) -> Self {
        self.clone()
    }

    fn move_to_root(&mut self);

    /// Move to the parent node. From an attribute this returns to the
    /// element that owns it.
    fn move_to_parent(&mut self) -> Result<bool, Self::Error>;

    /// Move to the next attribute of the current element, or to its first
    /// attribute if none is selected yet.
    fn move_to_next_attribute(&mut self) -> Result<bool, Self::Error>;

    fn move_to_child(&mut self) -> Result<bool, Self::Error>;

    fn move_to_next(&mut self) -> Result<bool, Self::Error>;

    fn move_to_previous(&mut self) -> Result<bool, Self::Error>;

    fn move_to_first(&mut self) -> Result<bool, Self::Error>;

    /// Restore a position previously saved with [`copy`](Self::copy).
    fn move_to(&mut self, other: &Self) -> bool {
        *self = other.clone();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_both_ways() {
        for kind in [NodeKind::Root, NodeKind::Element, NodeKind::Text, NodeKind::Comment] {
            assert_eq!(NodeType::from(kind).to_kind(), Some(kind));
        }
        assert_eq!(NodeType::Attribute.to_kind(), None);
    }

    #[test]
    fn display_names() {
        assert_eq!(NodeType::Attribute.to_string(), "attribute");
        assert_eq!(NodeType::Root.to_string(), "root");
    }
}
