//! [`Navigator`] over a persisted tree.

use std::fmt;

use eltree_store::ReadTxn;
use eltree_tree::{Direction, Node, TreeError};
use eltree_types::{Attr, NodeKind};

use crate::navigator::{Navigator, NodeType};

/// Navigator over a persisted tree.
///
/// Holds the navigation root, the current node, and the attribute the
/// cursor is on (`attr_index == -1` when it is on the node itself). Every
/// move resolves against `txn`, so the navigator is only usable while that
/// transaction is alive.
pub struct TreeNavigator<'t, T: ReadTxn + ?Sized> {
    txn: &'t T,
    root: Node,
    current: Node,
    attr_index: i64,
    attr: Option<Attr>,
}

impl<'t, T: ReadTxn + ?Sized> TreeNavigator<'t, T> {
    /// Start a navigator positioned on `root`.
    pub fn new(txn: &'t T, root: Node) -> Self {
        Self {
            txn,
            current: root.clone(),
            root,
            attr_index: -1,
            attr: None,
        }
    }

    /// The node under the cursor, or the element owning the current attribute.
    pub fn current(&self) -> &Node {
        &self.current
    }

    /// The transaction every move reads from.
    pub fn txn(&self) -> &'t T {
        self.txn
    }

    /// The node the navigator was started on.
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Index of the attribute under the cursor.
    pub fn attribute_index(&self) -> Option<u64> {
        u64::try_from(self.attr_index).ok()
    }

    fn on_attribute(&self) -> bool {
        self.attr_index >= 0
    }

    fn clear_attribute(&mut self) {
        self.attr_index = -1;
        self.attr = None;
    }

    fn step(&mut self, direction: Direction) -> Result<bool, TreeError> {
        if self.on_attribute() {
            return Ok(false);
        }
        match self.current.step(self.txn, direction)? {
            Some(node) => {
                self.current = node;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl<T: ReadTxn + ?Sized> Clone for TreeNavigator<'_, T> {
    fn clone(&self) -> Self {
        Self {
            txn: self.txn,
            root: self.root.clone(),
            current: self.current.clone(),
            attr_index: self.attr_index,
            attr: self.attr.clone(),
        }
    }
}

impl<T: ReadTxn + ?Sized> fmt::Debug for TreeNavigator<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeNavigator")
            .field("root", self.root.container())
            .field("current", self.current.container())
            .field("attr_index", &self.attr_index)
            .finish()
    }
}

impl<T: ReadTxn + ?Sized> Navigator for TreeNavigator<'_, T> {
    type Error = TreeError;

    fn node_type(&self) -> NodeType {
        if self.on_attribute() {
            NodeType::Attribute
        } else {
            self.current.kind().into()
        }
    }

    fn local_name(&self) -> &str {
        match &self.attr {
            Some(attr) => attr.split_name().1,
            None => self.current.local_name(),
        }
    }

    fn prefix(&self) -> &str {
        match &self.attr {
            Some(attr) => attr.split_name().0,
            None => self.current.prefix(),
        }
    }

    fn value(&self) -> Result<String, TreeError> {
        if let Some(attr) = &self.attr {
            return Ok(attr.value.clone());
        }
        let raw = match self.current.kind() {
            NodeKind::Text => self.current.value(self.txn)?,
            _ => self.current.text_content(self.txn)?,
        };
        Ok(String::from_utf8_lossy(&raw).into_owned())
    }

    fn move_to_root(&mut self) {
        self.current = self.root.clone();
        self.clear_attribute();
    }

    fn move_to_parent(&mut self) -> Result<bool, TreeError> {
        if self.on_attribute() {
            self.clear_attribute();
            return Ok(true);
        }
        match self.current.parent(self.txn)? {
            Some(parent) => {
                self.current = parent;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn move_to_next_attribute(&mut self) -> Result<bool, TreeError> {
        if self.current.kind() != NodeKind::Element {
            return Ok(false);
        }
        let Some(wanted) = self
            .attr_index
            .checked_add(1)
            .and_then(|next| u64::try_from(next).ok())
        else {
            return Ok(false);
        };
        let Some(found) = self.current.attribute(self.txn, wanted)? else {
            return Ok(false);
        };
        let Ok(index) = i64::try_from(found.index) else {
            return Ok(false);
        };
        self.attr_index = index;
        self.attr = Some(found.attr);
        Ok(true)
    }

    fn move_to_child(&mut self) -> Result<bool, TreeError> {
        if self.on_attribute() {
            return Ok(false);
        }
        match self.current.child(self.txn)? {
            Some(child) => {
                self.current = child;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn move_to_next(&mut self) -> Result<bool, TreeError> {
        self.step(Direction::Next)
    }

    fn move_to_previous(&mut self) -> Result<bool, TreeError> {
        self.step(Direction::Previous)
    }

    fn move_to_first(&mut self) -> Result<bool, TreeError> {
        self.step(Direction::First)
    }
}
