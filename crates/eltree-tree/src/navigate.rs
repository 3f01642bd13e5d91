//! Sibling, child and attribute moves.
//!
//! Every move is an ordered seek in a container followed by a tag check on
//! the key it lands on. A key outside the expected tag range means "no such
//! neighbour" and yields `Ok(None)`.

use eltree_store::{ContainerId, Entry, ReadTxn};
use eltree_types::{attribute_key, child_key, decode_key, Attr, KeyTag, NodeKind, VALUE_KEY};

use crate::error::{TreeError, TreeResult};
use crate::node::Node;

/// Which sibling [`Node::step`] moves to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
    First,
}

/// An attribute together with the index it is stored under.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributeRef {
    pub index: u64,
    pub attr: Attr,
}

/// Turn a landed entry into a child handle if it is one.
fn child_from_entry<T: ReadTxn + ?Sized>(
    txn: &T,
    parent: &ContainerId,
    entry: Option<Entry>,
) -> TreeResult<Option<Node>> {
    let Some(entry) = entry else {
        return Ok(None);
    };
    match decode_key(&entry.key) {
        Some((KeyTag::Child, index)) if entry.is_container() => {
            Node::load(txn, parent.child(&entry.key), index).map(Some)
        }
        _ => Ok(None),
    }
}

impl Node {
    /// Move to a sibling.
    ///
    /// Roots have no siblings. `Previous` from the first child is terminal:
    /// it seeks backwards from the current key, so it can neither wrap
    /// around nor land on the node itself.
    pub fn step<T: ReadTxn + ?Sized>(&self, txn: &T, direction: Direction) -> TreeResult<Option<Node>> {
        let Some(parent) = self.parent_container() else {
            return Ok(None);
        };
        let entry = match direction {
            Direction::Next => match self.index().checked_add(1) {
                Some(next) => txn.seek(&parent, &child_key(next))?,
                None => None,
            },
            Direction::Previous => {
                if self.index() == 0 {
                    return Ok(None);
                }
                txn.seek_before(&parent, &child_key(self.index()))?
            }
            Direction::First => txn.seek(&parent, &child_key(0))?,
        };
        child_from_entry(txn, &parent, entry)
    }

    pub fn next<T: ReadTxn + ?Sized>(&self, txn: &T) -> TreeResult<Option<Node>> {
        self.step(txn, Direction::Next)
    }

    pub fn previous<T: ReadTxn + ?Sized>(&self, txn: &T) -> TreeResult<Option<Node>> {
        self.step(txn, Direction::Previous)
    }

    pub fn first<T: ReadTxn + ?Sized>(&self, txn: &T) -> TreeResult<Option<Node>> {
        self.step(txn, Direction::First)
    }

    /// First child, for roots and elements.
    pub fn child<T: ReadTxn + ?Sized>(&self, txn: &T) -> TreeResult<Option<Node>> {
        if !self.kind().can_have_children() {
            return Ok(None);
        }
        let entry = txn.seek(self.container(), &child_key(0))?;
        child_from_entry(txn, self.container(), entry)
    }

    /// All children in document order.
    pub fn children<T: ReadTxn + ?Sized>(&self, txn: &T) -> TreeResult<Vec<Node>> {
        let mut out = Vec::new();
        let mut next = self.child(txn)?;
        while let Some(node) = next {
            next = node.next(txn)?;
            out.push(node);
        }
        Ok(out)
    }

    /// The first attribute stored at or after `index`.
    ///
    /// The returned [`AttributeRef`] carries the index the attribute was
    /// actually found under. With append-only indices that is `index`
    /// itself; after a gap it is the next index in use.
    pub fn attribute<T: ReadTxn + ?Sized>(
        &self,
        txn: &T,
        index: u64,
    ) -> TreeResult<Option<AttributeRef>> {
        if self.kind() != NodeKind::Element {
            return Ok(None);
        }
        let Some(entry) = txn.seek(self.container(), &attribute_key(index))? else {
            return Ok(None);
        };
        let Some((KeyTag::Attribute, found)) = decode_key(&entry.key) else {
            return Ok(None);
        };
        let data = entry.value.ok_or_else(|| TreeError::Corrupt {
            container: self.container().clone(),
            reason: format!("attribute {found} is a container"),
        })?;
        Ok(Some(AttributeRef {
            index: found,
            attr: Attr::from_bytes(&data)?,
        }))
    }

    /// All attributes in creation order.
    pub fn attributes<T: ReadTxn + ?Sized>(&self, txn: &T) -> TreeResult<Vec<Attr>> {
        let mut out = Vec::new();
        let mut index = 0;
        while let Some(found) = self.attribute(txn, index)? {
            out.push(found.attr);
            match found.index.checked_add(1) {
                Some(next) => index = next,
                None => break,
            }
        }
        Ok(out)
    }

    /// The stored value. Empty for nodes that never had one set.
    pub fn value<T: ReadTxn + ?Sized>(&self, txn: &T) -> TreeResult<Vec<u8>> {
        Ok(txn.get(self.container(), VALUE_KEY)?.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eltree_store::{Database, WriteTxn};
    use eltree_types::{NodeInfo, INFO_KEY, MAX_ATTRIBUTE_INDEX};

    /// root -> [a, b, c], a -> [text]
    fn sample(txn: &mut eltree_store::WriteTransaction<'_>) -> (Node, Vec<Node>) {
        let root = Node::create_root(txn, b"doc").unwrap();
        let kids: Vec<Node> = ["a", "b", "c"]
            .iter()
            .map(|name| root.append_node(txn, NodeInfo::element(*name)).unwrap())
            .collect();
        kids[0].append_text(txn, b"hello").unwrap();
        (root, kids)
    }

    // -----------------------------------------------------------------------
    // Siblings
    // -----------------------------------------------------------------------

    #[test]
    fn next_walks_in_creation_order() {
        let db = Database::in_memory();
        let mut txn = db.begin_write().unwrap();
        let (_, kids) = sample(&mut txn);
        assert_eq!(kids[0].next(&txn).unwrap().as_ref(), Some(&kids[1]));
        assert_eq!(kids[1].next(&txn).unwrap().as_ref(), Some(&kids[2]));
        assert_eq!(kids[2].next(&txn).unwrap(), None);
    }

    #[test]
    fn previous_inverts_next() {
        let db = Database::in_memory();
        let mut txn = db.begin_write().unwrap();
        let (_, kids) = sample(&mut txn);
        let there = kids[1].next(&txn).unwrap().unwrap();
        let back = there.previous(&txn).unwrap().unwrap();
        assert_eq!(back, kids[1]);
    }

    #[test]
    fn previous_on_first_child_is_terminal() {
        let db = Database::in_memory();
        let mut txn = db.begin_write().unwrap();
        let (_, kids) = sample(&mut txn);
        assert_eq!(kids[0].previous(&txn).unwrap(), None);
        // Repeated calls stay silent.
        assert_eq!(kids[0].previous(&txn).unwrap(), None);
    }

    #[test]
    fn previous_at_index_zero_does_not_wrap() {
        let db = Database::in_memory();
        let mut txn = db.begin_write().unwrap();
        let root = Node::create_root(&mut txn, b"doc").unwrap();
        // Sequences start at 1, so place a child at index 0 by hand.
        let zero = txn.create_container(root.container(), &child_key(0)).unwrap();
        txn.put(&zero, INFO_KEY, &NodeInfo::element("z").to_bytes().unwrap())
            .unwrap();
        root.append_node(&mut txn, NodeInfo::element("later")).unwrap();

        let first = root.child(&txn).unwrap().unwrap();
        assert_eq!(first.index(), 0);
        assert_eq!(first.previous(&txn).unwrap(), None);
        assert_eq!(first.next(&txn).unwrap().unwrap().local_name(), "later");
    }

    #[test]
    fn first_returns_first_sibling() {
        let db = Database::in_memory();
        let mut txn = db.begin_write().unwrap();
        let (_, kids) = sample(&mut txn);
        assert_eq!(kids[2].first(&txn).unwrap().unwrap(), kids[0]);
        assert_eq!(kids[0].first(&txn).unwrap().unwrap(), kids[0]);
    }

    #[test]
    fn root_has_no_siblings() {
        let db = Database::in_memory();
        let mut txn = db.begin_write().unwrap();
        let (root, _) = sample(&mut txn);
        for direction in [Direction::Next, Direction::Previous, Direction::First] {
            assert_eq!(root.step(&txn, direction).unwrap(), None);
        }
    }

    #[test]
    fn last_child_next_does_not_read_attributes() {
        let db = Database::in_memory();
        let mut txn = db.begin_write().unwrap();
        let root = Node::create_root(&mut txn, b"doc").unwrap();
        let el = root.append_element(&mut txn, "el").unwrap();
        let only = el.append_text(&mut txn, b"x").unwrap();
        el.append_attribute(&mut txn, &Attr::new("k", "v")).unwrap();
        assert_eq!(only.next(&txn).unwrap(), None);
    }

    // -----------------------------------------------------------------------
    // Children
    // -----------------------------------------------------------------------

    #[test]
    fn child_of_root_and_element() {
        let db = Database::in_memory();
        let mut txn = db.begin_write().unwrap();
        let (root, kids) = sample(&mut txn);
        assert_eq!(root.child(&txn).unwrap().unwrap(), kids[0]);
        let text = kids[0].child(&txn).unwrap().unwrap();
        assert_eq!(text.kind(), NodeKind::Text);
        assert_eq!(kids[1].child(&txn).unwrap(), None);
    }

    #[test]
    fn text_nodes_have_no_children() {
        let db = Database::in_memory();
        let mut txn = db.begin_write().unwrap();
        let (_, kids) = sample(&mut txn);
        let text = kids[0].child(&txn).unwrap().unwrap();
        assert_eq!(text.child(&txn).unwrap(), None);
    }

    #[test]
    fn children_lists_every_child() {
        let db = Database::in_memory();
        let mut txn = db.begin_write().unwrap();
        let (root, kids) = sample(&mut txn);
        assert_eq!(root.children(&txn).unwrap(), kids);
    }

    // -----------------------------------------------------------------------
    // Attributes
    // -----------------------------------------------------------------------

    #[test]
    fn attributes_in_creation_order() {
        let db = Database::in_memory();
        let mut txn = db.begin_write().unwrap();
        let root = Node::create_root(&mut txn, b"doc").unwrap();
        let el = root.append_element(&mut txn, "el").unwrap();
        let attrs = [Attr::new("z", "1"), Attr::new("a", "2"), Attr::new("m", "3")];
        for attr in &attrs {
            el.append_attribute(&mut txn, attr).unwrap();
        }
        for (i, attr) in attrs.iter().enumerate() {
            let found = el.attribute(&txn, i as u64).unwrap().unwrap();
            assert_eq!(found.index, i as u64);
            assert_eq!(&found.attr, attr);
        }
        assert_eq!(el.attribute(&txn, 3).unwrap(), None);
        assert_eq!(el.attributes(&txn).unwrap(), attrs.to_vec());
    }

    #[test]
    fn attribute_reports_index_found_after_gap() {
        let db = Database::in_memory();
        let mut txn = db.begin_write().unwrap();
        let root = Node::create_root(&mut txn, b"doc").unwrap();
        let el = root.append_element(&mut txn, "el").unwrap();
        let attr = Attr::new("late", "v");
        txn.put(el.container(), &attribute_key(5), &attr.to_bytes().unwrap())
            .unwrap();

        let found = el.attribute(&txn, 0).unwrap().unwrap();
        assert_eq!(found.index, 5);
        assert_eq!(found.attr, attr);
    }

    #[test]
    fn attribute_at_max_index_is_readable() {
        let db = Database::in_memory();
        let mut txn = db.begin_write().unwrap();
        let root = Node::create_root(&mut txn, b"doc").unwrap();
        let el = root.append_element(&mut txn, "el").unwrap();
        let attr = Attr::new("edge", "v");
        txn.put(
            el.container(),
            &attribute_key(MAX_ATTRIBUTE_INDEX),
            &attr.to_bytes().unwrap(),
        )
        .unwrap();
        assert_eq!(el.attributes(&txn).unwrap(), vec![attr]);
    }

    #[test]
    fn non_elements_have_no_attributes() {
        let db = Database::in_memory();
        let mut txn = db.begin_write().unwrap();
        let (root, _) = sample(&mut txn);
        assert_eq!(root.attribute(&txn, 0).unwrap(), None);
        assert!(root.attributes(&txn).unwrap().is_empty());
    }

    // -----------------------------------------------------------------------
    // Values
    // -----------------------------------------------------------------------

    #[test]
    fn value_defaults_to_empty() {
        let db = Database::in_memory();
        let mut txn = db.begin_write().unwrap();
        let (root, kids) = sample(&mut txn);
        assert!(root.value(&txn).unwrap().is_empty());
        let text = kids[0].child(&txn).unwrap().unwrap();
        assert_eq!(text.value(&txn).unwrap(), b"hello");
    }
}
