//! Node and attribute creation.
//!
//! Every check runs before the first write, so a rejected call leaves the
//! tree exactly as it was.

use eltree_store::WriteTxn;
use eltree_types::{
    attribute_key, child_key, decode_key, Attr, KeyTag, NodeInfo, NodeKind, ATTRIBUTE_SEEK_CEILING,
    INFO_KEY, MAX_ATTRIBUTE_INDEX, VALUE_KEY,
};
use tracing::trace;

use crate::error::{TreeError, TreeResult};
use crate::node::Node;

impl Node {
    /// Append a child node.
    ///
    /// The child is stored under the next value of this container's
    /// sequence, so sibling indices grow in call order and are never reused.
    pub fn append_node<T: WriteTxn + ?Sized>(&self, txn: &mut T, info: NodeInfo) -> TreeResult<Node> {
        if info.kind == NodeKind::Root {
            return Err(TreeError::InvalidArgument(
                "a root node cannot be appended as a child".into(),
            ));
        }
        if !self.kind().can_have_children() {
            return Err(TreeError::Structural {
                kind: self.kind(),
                operation: "have children",
            });
        }
        let meta = info.to_bytes()?;
        let index = txn.next_sequence(self.container())?;
        let container = txn.create_container(self.container(), &child_key(index))?;
        txn.put(&container, INFO_KEY, &meta)?;
        trace!(parent = %self.container(), index, kind = %info.kind, "node appended");
        Ok(Node::from_parts(info, container, index))
    }

    /// Append an unprefixed element.
    pub fn append_element<T: WriteTxn + ?Sized>(&self, txn: &mut T, local_name: &str) -> TreeResult<Node> {
        self.append_node(txn, NodeInfo::element(local_name))
    }

    /// Append a text node holding `value`.
    pub fn append_text<T: WriteTxn + ?Sized>(&self, txn: &mut T, value: &[u8]) -> TreeResult<Node> {
        let node = self.append_node(txn, NodeInfo::text())?;
        node.set_value(txn, value)?;
        Ok(node)
    }

    /// Append a comment node holding `value`.
    pub fn append_comment<T: WriteTxn + ?Sized>(&self, txn: &mut T, value: &[u8]) -> TreeResult<Node> {
        let node = self.append_node(txn, NodeInfo::comment())?;
        node.set_value(txn, value)?;
        Ok(node)
    }

    /// Append an attribute and return the index it was stored under.
    ///
    /// The index is one past the highest attribute in use, found by seeking
    /// just beyond the largest legal index and stepping back.
    pub fn append_attribute<T: WriteTxn + ?Sized>(&self, txn: &mut T, attr: &Attr) -> TreeResult<u64> {
        if !self.kind().can_have_attributes() {
            return Err(TreeError::Structural {
                kind: self.kind(),
                operation: "have attributes",
            });
        }
        let data = attr.to_bytes()?;

        let last = {
            let mut cursor = txn.cursor(self.container());
            match cursor.seek(&attribute_key(ATTRIBUTE_SEEK_CEILING))? {
                Some(_) => cursor.prev()?,
                None => cursor.last()?,
            }
        };
        let index = match last.and_then(|entry| decode_key(&entry.key)) {
            Some((KeyTag::Attribute, highest)) => highest
                .checked_add(1)
                .filter(|next| *next <= MAX_ATTRIBUTE_INDEX)
                .ok_or_else(|| TreeError::Overflow(self.container().clone()))?,
            _ => 0,
        };

        txn.put(self.container(), &attribute_key(index), &data)?;
        trace!(element = %self.container(), index, name = %attr.name, "attribute appended");
        Ok(index)
    }

    /// Overwrite the node's value.
    ///
    /// Accepted for every kind; only text and comment values are read back
    /// by the serializers.
    pub fn set_value<T: WriteTxn + ?Sized>(&self, txn: &mut T, value: &[u8]) -> TreeResult<()> {
        txn.put(self.container(), VALUE_KEY, value)?;
        Ok(())
    }
}
