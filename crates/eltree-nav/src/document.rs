//! In-memory markup documents.
//!
//! [`MemoryDocument`] is an arena of [`DocNode`]s indexed by position, with
//! node 0 as the root. It is the usual source for [`import_subtree`]: parse
//! markup text, hand out a [`MemoryNavigator`], replay it into a store.
//!
//! [`import_subtree`]: crate::import_subtree

use std::convert::Infallible;

use eltree_types::{Attr, NodeKind};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::ParseError;
use crate::navigator::{Navigator, NodeType};

/// One node of a [`MemoryDocument`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocNode {
    pub kind: NodeKind,
    pub local_name: String,
    pub prefix: String,
    /// Content of text and comment nodes; empty otherwise.
    pub value: String,
    /// Attributes with qualified names, in document order.
    pub attributes: Vec<Attr>,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    /// Position among the parent's children.
    pub position: usize,
}

impl DocNode {
    fn new(kind: NodeKind, parent: Option<usize>, position: usize) -> Self {
        Self {
            kind,
            local_name: String::new(),
            prefix: String::new(),
            value: String::new(),
            attributes: Vec::new(),
            parent,
            children: Vec::new(),
            position,
        }
    }
}

/// Arena-allocated document tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemoryDocument {
    nodes: Vec<DocNode>,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    /// Index of the root node.
    pub const ROOT: usize = 0;

    /// An empty document holding only its root.
    pub fn new() -> Self {
        Self {
            nodes: vec![DocNode::new(NodeKind::Root, None, 0)],
        }
    }

    /// Parse markup text.
    ///
    /// Character data sections become text nodes. Declarations, processing
    /// instructions and doctype declarations are skipped.
    pub fn parse(markup: &str) -> Result<Self, ParseError> {
        let mut reader = Reader::from_str(markup);
        let mut doc = Self::new();
        let mut open = vec![Self::ROOT];

        loop {
            let position = reader.buffer_position() as u64;
            let event = reader.read_event().map_err(|e| ParseError::Syntax {
                position,
                message: e.to_string(),
            })?;
            let parent = open.last().copied().unwrap_or(Self::ROOT);
            match event {
                Event::Start(ref e) => {
                    let id = doc.append_start(parent, e, position)?;
                    open.push(id);
                }
                Event::Empty(ref e) => {
                    doc.append_start(parent, e, position)?;
                }
                Event::End(_) => {
                    if open.len() <= 1 {
                        return Err(ParseError::UnexpectedClose(position));
                    }
                    open.pop();
                }
                Event::Text(ref e) => {
                    let text = e.unescape().map_err(|e| ParseError::Syntax {
                        position,
                        message: e.to_string(),
                    })?;
                    if !text.is_empty() {
                        let mut node = DocNode::new(NodeKind::Text, None, 0);
                        node.value = text.into_owned();
                        doc.push(parent, node);
                    }
                }
                Event::CData(ref e) => {
                    let mut node = DocNode::new(NodeKind::Text, None, 0);
                    node.value = String::from_utf8_lossy(e).into_owned();
                    doc.push(parent, node);
                }
                Event::Comment(ref e) => {
                    let mut node = DocNode::new(NodeKind::Comment, None, 0);
                    node.value = String::from_utf8_lossy(e).into_owned();
                    doc.push(parent, node);
                }
                Event::Eof => break,
                Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
            }
        }

        if open.len() > 1 {
            return Err(ParseError::Unclosed(open.len() - 1));
        }
        Ok(doc)
    }

    fn append_start(
        &mut self,
        parent: usize,
        start: &BytesStart<'_>,
        position: u64,
    ) -> Result<usize, ParseError> {
        let qname = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let (prefix, local) = split_qname(&qname);
        let mut node = DocNode::new(NodeKind::Element, None, 0);
        node.local_name = local.to_owned();
        node.prefix = prefix.to_owned();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| ParseError::Syntax {
                position,
                message: e.to_string(),
            })?;
            let name = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value().map_err(|e| ParseError::Syntax {
                position,
                message: e.to_string(),
            })?;
            node.attributes.push(Attr::new(name, value.into_owned()));
        }
        Ok(self.push(parent, node))
    }

    /// Link `node` under `parent`, which must be an open root or element.
    fn push(&mut self, parent: usize, mut node: DocNode) -> usize {
        let id = self.nodes.len();
        let siblings = &mut self.nodes[parent].children;
        node.parent = Some(parent);
        node.position = siblings.len();
        siblings.push(id);
        self.nodes.push(node);
        id
    }

    /// Append `node` under `parent`.
    ///
    /// Returns `None` if `parent` is not a node of this document or cannot
    /// hold children.
    fn append(&mut self, parent: usize, node: DocNode) -> Option<usize> {
        if !self.nodes.get(parent)?.kind.can_have_children() {
            return None;
        }
        Some(self.push(parent, node))
    }

    pub fn append_element(&mut self, parent: usize, local_name: &str, prefix: &str) -> Option<usize> {
        let mut node = DocNode::new(NodeKind::Element, None, 0);
        node.local_name = local_name.to_owned();
        node.prefix = prefix.to_owned();
        self.append(parent, node)
    }

    pub fn append_text(&mut self, parent: usize, value: impl Into<String>) -> Option<usize> {
        let mut node = DocNode::new(NodeKind::Text, None, 0);
        node.value = value.into();
        self.append(parent, node)
    }

    pub fn append_comment(&mut self, parent: usize, value: impl Into<String>) -> Option<usize> {
        let mut node = DocNode::new(NodeKind::Comment, None, 0);
        node.value = value.into();
        self.append(parent, node)
    }

    /// Add an attribute to an element. Returns `false` if `element` is not
    /// an element of this document.
    pub fn add_attribute(&mut self, element: usize, attr: Attr) -> bool {
        match self.nodes.get_mut(element) {
            Some(node) if node.kind == NodeKind::Element => {
                node.attributes.push(attr);
                true
            }
            _ => false,
        }
    }

    pub fn node(&self, id: usize) -> Option<&DocNode> {
        self.nodes.get(id)
    }

    pub fn root(&self) -> &DocNode {
        &self.nodes[Self::ROOT]
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// A navigator positioned on the root.
    pub fn navigator(&self) -> MemoryNavigator<'_> {
        MemoryNavigator {
            doc: self,
            current: Self::ROOT,
            attr: None,
        }
    }

    /// Concatenated text below `id` in document order.
    pub fn text_of(&self, id: usize) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: usize, out: &mut String) {
        let node = &self.nodes[id];
        match node.kind {
            NodeKind::Text => out.push_str(&node.value),
            NodeKind::Root | NodeKind::Element => {
                for &child in &node.children {
                    self.collect_text(child, out);
                }
            }
            NodeKind::Comment => {}
        }
    }
}

fn split_qname(qname: &str) -> (&str, &str) {
    match qname.split_once(':') {
        Some((prefix, local)) => (prefix, local),
        None => ("", qname),
    }
}

/// Navigator over a [`MemoryDocument`].
#[derive(Clone, Copy, Debug)]
pub struct MemoryNavigator<'d> {
    doc: &'d MemoryDocument,
    current: usize,
    attr: Option<usize>,
}

impl<'d> MemoryNavigator<'d> {
    /// Index of the node under the cursor.
    pub fn position(&self) -> usize {
        self.current
    }

    fn node(&self) -> &'d DocNode {
        &self.doc.nodes[self.current]
    }

    fn attribute(&self) -> Option<&'d Attr> {
        self.attr.and_then(|i| self.node().attributes.get(i))
    }

    fn sibling(&self, offset: isize) -> Option<usize> {
        if self.attr.is_some() {
            return None;
        }
        let node = self.node();
        let parent = &self.doc.nodes[node.parent?];
        let target = node.position.checked_add_signed(offset)?;
        parent.children.get(target).copied()
    }

    fn go(&mut self, target: Option<usize>) -> bool {
        match target {
            Some(id) => {
                self.current = id;
                true
            }
            None => false,
        }
    }
}

impl Navigator for MemoryNavigator<'_> {
    type Error = Infallible;

    fn node_type(&self) -> NodeType {
        match self.attr {
            Some(_) => NodeType::Attribute,
            None => self.node().kind.into(),
        }
    }

    fn local_name(&self) -> &str {
        match self.attribute() {
            Some(attr) => attr.split_name().1,
            None => &self.node().local_name,
        }
    }

    fn prefix(&self) -> &str {
        match self.attribute() {
            Some(attr) => attr.split_name().0,
            None => &self.node().prefix,
        }
    }

    /// Comments report their own content here so that importing a parsed
    /// document keeps comment bodies.
    fn value(&self) -> Result<String, Infallible> {
        if let Some(attr) = self.attribute() {
            return Ok(attr.value.clone());
        }
        let node = self.node();
        Ok(match node.kind {
            NodeKind::Text | NodeKind::Comment => node.value.clone(),
            NodeKind::Root | NodeKind::Element => self.doc.text_of(self.current),
        })
    }

    fn move_to_root(&mut self) {
        self.current = MemoryDocument::ROOT;
        self.attr = None;
    }

    fn move_to_parent(&mut self) -> Result<bool, Infallible> {
        if self.attr.take().is_some() {
            return Ok(true);
        }
        let parent = self.node().parent;
        Ok(self.go(parent))
    }

    fn move_to_next_attribute(&mut self) -> Result<bool, Infallible> {
        let next = self.attr.map_or(0, |i| i + 1);
        if next < self.node().attributes.len() {
            self.attr = Some(next);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn move_to_child(&mut self) -> Result<bool, Infallible> {
        if self.attr.is_some() {
            return Ok(false);
        }
        let child = self.node().children.first().copied();
        Ok(self.go(child))
    }

    fn move_to_next(&mut self) -> Result<bool, Infallible> {
        let target = self.sibling(1);
        Ok(self.go(target))
    }

    fn move_to_previous(&mut self) -> Result<bool, Infallible> {
        let target = self.sibling(-1);
        Ok(self.go(target))
    }

    fn move_to_first(&mut self) -> Result<bool, Infallible> {
        let target = self.sibling(-(self.node().position as isize));
        Ok(self.go(target))
    }
}
