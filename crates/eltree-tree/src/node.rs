//! The [`Node`] handle and document-level entry points.

use eltree_store::{ContainerId, ReadTxn, WriteTxn};
use eltree_types::{decode_key, KeyTag, NodeInfo, NodeKind, INFO_KEY};
use tracing::debug;

use crate::error::{TreeError, TreeResult};

/// Handle onto one persisted node.
///
/// A `Node` is a view, not an owner: it carries the node's metadata, the
/// address of its container and the sibling index it was reached through.
/// The parent is not stored; it is the enclosing container and is loaded on
/// demand by [`Node::parent`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    info: NodeInfo,
    container: ContainerId,
    index: u64,
}

impl Node {
    /// Create a new document root in the top-level namespace.
    ///
    /// Fails with the store's container-exists error if `name` is taken.
    pub fn create_root<T: WriteTxn + ?Sized>(txn: &mut T, name: &[u8]) -> TreeResult<Self> {
        let info = NodeInfo::root();
        let meta = info.to_bytes()?;
        let container = txn.create_container(&ContainerId::top(), name)?;
        txn.put(&container, INFO_KEY, &meta)?;
        debug!(document = %container, "document root created");
        Ok(Self {
            info,
            container,
            index: 0,
        })
    }

    /// Open the root of an existing document.
    pub fn open_root<T: ReadTxn + ?Sized>(txn: &T, name: &[u8]) -> TreeResult<Self> {
        let container = ContainerId::top().child(name);
        if !txn.contains_container(&container)? {
            return Err(TreeError::DocumentNotFound(
                String::from_utf8_lossy(name).into_owned(),
            ));
        }
        let node = Self::load(txn, container, 0)?;
        if node.kind() != NodeKind::Root {
            return Err(TreeError::Corrupt {
                container: node.container,
                reason: format!("top-level node is a {} node", node.info.kind),
            });
        }
        Ok(node)
    }

    /// Rebuild a handle from a container address and the sibling index used
    /// to reach it.
    pub fn load<T: ReadTxn + ?Sized>(
        txn: &T,
        container: ContainerId,
        index: u64,
    ) -> TreeResult<Self> {
        let meta = txn
            .get(&container, INFO_KEY)?
            .ok_or_else(|| TreeError::MissingInfo(container.clone()))?;
        let info = NodeInfo::from_bytes(&meta)?;
        Ok(Self {
            info,
            container,
            index,
        })
    }

    pub(crate) fn from_parts(info: NodeInfo, container: ContainerId, index: u64) -> Self {
        Self {
            info,
            container,
            index,
        }
    }

    pub fn info(&self) -> &NodeInfo {
        &self.info
    }

    pub fn kind(&self) -> NodeKind {
        self.info.kind
    }

    pub fn local_name(&self) -> &str {
        &self.info.local_name
    }

    pub fn prefix(&self) -> &str {
        &self.info.prefix
    }

    /// Address of this node's container.
    pub fn container(&self) -> &ContainerId {
        &self.container
    }

    /// Sibling index within the parent. Always 0 for a document root.
    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn is_root(&self) -> bool {
        self.info.kind == NodeKind::Root
    }

    /// Address of the parent's container, or `None` for a root.
    pub fn parent_container(&self) -> Option<ContainerId> {
        if self.is_root() {
            return None;
        }
        self.container.parent().filter(|parent| !parent.is_top())
    }

    /// Load the parent node.
    pub fn parent<T: ReadTxn + ?Sized>(&self, txn: &T) -> TreeResult<Option<Self>> {
        let Some(parent) = self.parent_container() else {
            return Ok(None);
        };
        let is_document = parent.parent().is_some_and(|above| above.is_top());
        let index = match parent.last_key().and_then(decode_key) {
            Some((KeyTag::Child, index)) if !is_document => index,
            _ => 0,
        };
        Self::load(txn, parent, index).map(Some)
    }
}

/// Names of every document in the store, in key order.
pub fn document_names<T: ReadTxn + ?Sized>(txn: &T) -> TreeResult<Vec<Vec<u8>>> {
    Ok(txn.keys(&ContainerId::top())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use eltree_store::{Database, StoreError};

    #[test]
    fn create_and_open_root() {
        let db = Database::in_memory();
        let mut txn = db.begin_write().unwrap();
        let root = Node::create_root(&mut txn, b"doc").unwrap();
        assert!(root.is_root());
        assert_eq!(root.index(), 0);
        assert_eq!(root.parent_container(), None);
        txn.commit().unwrap();

        let read = db.begin_read().unwrap();
        let opened = Node::open_root(&read, b"doc").unwrap();
        assert_eq!(opened, root);
    }

    #[test]
    fn duplicate_root_fails_with_store_error() {
        let db = Database::in_memory();
        let mut txn = db.begin_write().unwrap();
        Node::create_root(&mut txn, b"doc").unwrap();
        let err = Node::create_root(&mut txn, b"doc").unwrap_err();
        assert!(matches!(err, TreeError::Store(StoreError::ContainerExists(_))));
    }

    #[test]
    fn open_missing_document() {
        let db = Database::in_memory();
        let txn = db.begin_read().unwrap();
        let err = Node::open_root(&txn, b"nope").unwrap_err();
        assert!(matches!(err, TreeError::DocumentNotFound(ref name) if name == "nope"));
    }

    #[test]
    fn load_without_info_fails() {
        let db = Database::in_memory();
        let mut txn = db.begin_write().unwrap();
        let bare = txn.create_container(&ContainerId::top(), b"bare").unwrap();
        let err = Node::load(&txn, bare, 0).unwrap_err();
        assert!(matches!(err, TreeError::MissingInfo(_)));
    }

    #[test]
    fn open_root_rejects_non_root_info() {
        let db = Database::in_memory();
        let mut txn = db.begin_write().unwrap();
        let odd = txn.create_container(&ContainerId::top(), b"odd").unwrap();
        let meta = NodeInfo::element("x").to_bytes().unwrap();
        txn.put(&odd, INFO_KEY, &meta).unwrap();
        let err = Node::open_root(&txn, b"odd").unwrap_err();
        assert!(matches!(err, TreeError::Corrupt { .. }));
    }

    #[test]
    fn lists_documents_in_order() {
        let db = Database::in_memory();
        let mut txn = db.begin_write().unwrap();
        Node::create_root(&mut txn, b"b").unwrap();
        Node::create_root(&mut txn, b"a").unwrap();
        assert_eq!(document_names(&txn).unwrap(), vec![b"a".to_vec(), b"b".to_vec()]);
    }

    #[test]
    fn parent_is_reloaded_from_container() {
        let db = Database::in_memory();
        let mut txn = db.begin_write().unwrap();
        let root = Node::create_root(&mut txn, b"doc").unwrap();
        let a = root.append_node(&mut txn, NodeInfo::element("a")).unwrap();
        let b = a.append_node(&mut txn, NodeInfo::element("b")).unwrap();

        let up = b.parent(&txn).unwrap().unwrap();
        assert_eq!(up, a);
        let top = up.parent(&txn).unwrap().unwrap();
        assert_eq!(top, root);
        assert_eq!(top.parent(&txn).unwrap(), None);
    }

    #[test]
    fn document_named_like_a_child_key_keeps_root_index() {
        let db = Database::in_memory();
        let mut txn = db.begin_write().unwrap();
        let name = eltree_types::child_key(5);
        let root = Node::create_root(&mut txn, &name).unwrap();
        let a = root.append_element(&mut txn, "a").unwrap();

        let up = a.parent(&txn).unwrap().unwrap();
        assert_eq!(up.index(), 0);
        assert_eq!(up, root);
        assert_eq!(up, Node::open_root(&txn, &name).unwrap());
    }
}
