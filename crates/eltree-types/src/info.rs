use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::kind::NodeKind;

/// Static metadata of a node, persisted once under the info key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeInfo {
    /// The node's kind. Fixed at creation.
    pub kind: NodeKind,
    /// Local part of the element name. Empty for non-elements.
    pub local_name: String,
    /// Namespace prefix, or empty.
    pub prefix: String,
}

impl NodeInfo {
    /// Metadata for a document root.
    pub fn root() -> Self {
        Self::new(NodeKind::Root, "", "")
    }

    /// Metadata for an unprefixed element.
    pub fn element(local_name: impl Into<String>) -> Self {
        Self::new(NodeKind::Element, local_name, "")
    }

    /// Metadata for a text node.
    pub fn text() -> Self {
        Self::new(NodeKind::Text, "", "")
    }

    /// Metadata for a comment node.
    pub fn comment() -> Self {
        Self::new(NodeKind::Comment, "", "")
    }

    pub fn new(kind: NodeKind, local_name: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            kind,
            local_name: local_name.into(),
            prefix: prefix.into(),
        }
    }

    /// Set the namespace prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// The qualified name: `prefix:local_name`, or just `local_name`.
    pub fn qualified_name(&self) -> String {
        if self.prefix.is_empty() {
            self.local_name.clone()
        } else {
            format!("{}:{}", self.prefix, self.local_name)
        }
    }

    /// Encode for storage.
    pub fn to_bytes(&self) -> Result<Vec<u8>, TypeError> {
        bincode::serialize(self).map_err(|e| TypeError::Codec(e.to_string()))
    }

    /// Decode from storage.
    pub fn from_bytes(data: &[u8]) -> Result<Self, TypeError> {
        bincode::deserialize(data).map_err(|e| TypeError::Codec(e.to_string()))
    }
}

/// A single attribute of an element.
///
/// `name` is the qualified attribute name as it appears in markup
/// (`xml:lang`, `href`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attr {
    pub name: String,
    pub value: String,
}

impl Attr {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Split the qualified name into `(prefix, local_name)`.
    ///
    /// The prefix is empty when the name carries no colon.
    pub fn split_name(&self) -> (&str, &str) {
        match self.name.split_once(':') {
            Some((prefix, local)) => (prefix, local),
            None => ("", &self.name),
        }
    }

    /// Encode for storage.
    pub fn to_bytes(&self) -> Result<Vec<u8>, TypeError> {
        bincode::serialize(self).map_err(|e| TypeError::Codec(e.to_string()))
    }

    /// Decode from storage.
    pub fn from_bytes(data: &[u8]) -> Result<Self, TypeError> {
        bincode::deserialize(data).map_err(|e| TypeError::Codec(e.to_string()))
    }
}
