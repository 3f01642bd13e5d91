//! Text extraction and markup rendering.
//!
//! Both serializers are pre-order walks over [`Node::child`] and
//! [`Node::next`], streaming into any [`Write`].

use std::io::{self, Write};

use eltree_store::ReadTxn;
use eltree_types::NodeKind;

use crate::error::TreeResult;
use crate::node::Node;

/// Write `raw` with markup-significant characters replaced by entity
/// references. Bytes that are not valid UTF-8 are written as U+FFFD.
pub fn escape<W: Write + ?Sized>(out: &mut W, raw: &[u8]) -> io::Result<()> {
    let text = String::from_utf8_lossy(raw);
    out.write_all(quick_xml::escape::escape(text.as_ref()).as_bytes())
}

impl Node {
    /// Write the concatenated value of every text node below this one, in
    /// document order. Comments and attributes contribute nothing.
    pub fn collect_text<T, W>(&self, txn: &T, out: &mut W) -> TreeResult<()>
    where
        T: ReadTxn + ?Sized,
        W: Write + ?Sized,
    {
        match self.kind() {
            NodeKind::Text => out.write_all(&self.value(txn)?)?,
            NodeKind::Root | NodeKind::Element => {
                let mut next = self.child(txn)?;
                while let Some(child) = next {
                    child.collect_text(txn, out)?;
                    next = child.next(txn)?;
                }
            }
            NodeKind::Comment => {}
        }
        Ok(())
    }

    /// Write this subtree as markup.
    ///
    /// Roots render only their children. Elements always get an explicit
    /// closing tag, even when empty.
    pub fn render_markup<T, W>(&self, txn: &T, out: &mut W) -> TreeResult<()>
    where
        T: ReadTxn + ?Sized,
        W: Write + ?Sized,
    {
        match self.kind() {
            NodeKind::Text => escape(out, &self.value(txn)?)?,
            NodeKind::Comment => {
                out.write_all(b"<!--")?;
                escape(out, &self.value(txn)?)?;
                out.write_all(b"-->")?;
            }
            NodeKind::Root => self.render_children(txn, out)?,
            NodeKind::Element => {
                let name = self.info().qualified_name();
                write!(out, "<{name}")?;
                for attr in self.attributes(txn)? {
                    write!(out, " {}=\"", attr.name)?;
                    escape(out, attr.value.as_bytes())?;
                    out.write_all(b"\"")?;
                }
                out.write_all(b">")?;
                self.render_children(txn, out)?;
                write!(out, "</{name}>")?;
            }
        }
        Ok(())
    }

    fn render_children<T, W>(&self, txn: &T, out: &mut W) -> TreeResult<()>
    where
        T: ReadTxn + ?Sized,
        W: Write + ?Sized,
    {
        let mut next = self.child(txn)?;
        while let Some(child) = next {
            child.render_markup(txn, out)?;
            next = child.next(txn)?;
        }
        Ok(())
    }

    /// [`collect_text`](Self::collect_text) into a fresh buffer.
    pub fn text_content<T: ReadTxn + ?Sized>(&self, txn: &T) -> TreeResult<Vec<u8>> {
        let mut out = Vec::new();
        self.collect_text(txn, &mut out)?;
        Ok(out)
    }

    /// [`render_markup`](Self::render_markup) into a fresh buffer.
    pub fn markup<T: ReadTxn + ?Sized>(&self, txn: &T) -> TreeResult<Vec<u8>> {
        let mut out = Vec::new();
        self.render_markup(txn, &mut out)?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eltree_store::{Database, WriteTransaction};
    use eltree_types::{Attr, NodeInfo};

    fn escaped(raw: &str) -> String {
        let mut out = Vec::new();
        escape(&mut out, raw.as_bytes()).unwrap();
        String::from_utf8(out).unwrap()
    }

    /// doc: <a>hello</a><b></b>
    fn scenario(txn: &mut WriteTransaction<'_>) -> Node {
        let root = Node::create_root(txn, b"doc").unwrap();
        let a = root.append_element(txn, "a").unwrap();
        a.append_text(txn, b"hello").unwrap();
        root.append_element(txn, "b").unwrap();
        root
    }

    // -----------------------------------------------------------------------
    // Escaping
    // -----------------------------------------------------------------------

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(escaped(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&apos;");
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(escaped("plain text, ünïcode"), "plain text, ünïcode");
        assert_eq!(escaped(""), "");
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let mut out = Vec::new();
        escape(&mut out, b"a\xff<").unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "a\u{fffd}&lt;");
    }

    // -----------------------------------------------------------------------
    // Scenario
    // -----------------------------------------------------------------------

    #[test]
    fn renders_scenario_markup() {
        let db = Database::in_memory();
        let mut txn = db.begin_write().unwrap();
        let root = scenario(&mut txn);
        assert_eq!(root.markup(&txn).unwrap(), b"<a>hello</a><b></b>");
        assert_eq!(root.text_content(&txn).unwrap(), b"hello");
    }

    #[test]
    fn scenario_survives_commit() {
        let db = Database::in_memory();
        let mut txn = db.begin_write().unwrap();
        scenario(&mut txn);
        txn.commit().unwrap();

        let read = db.begin_read().unwrap();
        let root = Node::open_root(&read, b"doc").unwrap();
        assert_eq!(root.markup(&read).unwrap(), b"<a>hello</a><b></b>");
    }

    // -----------------------------------------------------------------------
    // Markup
    // -----------------------------------------------------------------------

    #[test]
    fn renders_prefix_attributes_and_comments() {
        let db = Database::in_memory();
        let mut txn = db.begin_write().unwrap();
        let root = Node::create_root(&mut txn, b"doc").unwrap();
        let el = root
            .append_node(&mut txn, NodeInfo::element("item").with_prefix("ns"))
            .unwrap();
        el.append_attribute(&mut txn, &Attr::new("id", "1")).unwrap();
        el.append_attribute(&mut txn, &Attr::new("title", "a \"b\" & c"))
            .unwrap();
        el.append_comment(&mut txn, b"note <x>").unwrap();
        el.append_text(&mut txn, b"1 < 2").unwrap();

        let markup = String::from_utf8(root.markup(&txn).unwrap()).unwrap();
        assert_eq!(
            markup,
            "<ns:item id=\"1\" title=\"a &quot;b&quot; &amp; c\">\
             <!--note &lt;x&gt;-->1 &lt; 2</ns:item>"
        );
    }

    #[test]
    fn element_renders_its_own_subtree() {
        let db = Database::in_memory();
        let mut txn = db.begin_write().unwrap();
        let root = Node::create_root(&mut txn, b"doc").unwrap();
        let outer = root.append_element(&mut txn, "outer").unwrap();
        let inner = outer.append_element(&mut txn, "inner").unwrap();
        inner.append_text(&mut txn, b"x").unwrap();
        assert_eq!(inner.markup(&txn).unwrap(), b"<inner>x</inner>");
        assert_eq!(outer.markup(&txn).unwrap(), b"<outer><inner>x</inner></outer>");
    }

    #[test]
    fn empty_root_renders_nothing() {
        let db = Database::in_memory();
        let mut txn = db.begin_write().unwrap();
        let root = Node::create_root(&mut txn, b"doc").unwrap();
        assert!(root.markup(&txn).unwrap().is_empty());
        assert!(root.text_content(&txn).unwrap().is_empty());
    }

    // -----------------------------------------------------------------------
    // Text
    // -----------------------------------------------------------------------

    #[test]
    fn text_skips_comments_and_attributes() {
        let db = Database::in_memory();
        let mut txn = db.begin_write().unwrap();
        let root = Node::create_root(&mut txn, b"doc").unwrap();
        let el = root.append_element(&mut txn, "p").unwrap();
        el.append_attribute(&mut txn, &Attr::new("lang", "en")).unwrap();
        el.append_text(&mut txn, b"one ").unwrap();
        el.append_comment(&mut txn, b"hidden").unwrap();
        let nested = el.append_element(&mut txn, "b").unwrap();
        nested.append_text(&mut txn, b"two").unwrap();
        el.append_text(&mut txn, b" three").unwrap();

        assert_eq!(root.text_content(&txn).unwrap(), b"one two three");
        assert_eq!(nested.text_content(&txn).unwrap(), b"two");
    }

    #[test]
    fn text_is_raw_not_escaped() {
        let db = Database::in_memory();
        let mut txn = db.begin_write().unwrap();
        let root = Node::create_root(&mut txn, b"doc").unwrap();
        root.append_text(&mut txn, b"a < b & c").unwrap();
        assert_eq!(root.text_content(&txn).unwrap(), b"a < b & c");
    }

    #[test]
    fn comment_text_content_is_empty() {
        let db = Database::in_memory();
        let mut txn = db.begin_write().unwrap();
        let root = Node::create_root(&mut txn, b"doc").unwrap();
        let comment = root.append_comment(&mut txn, b"c").unwrap();
        assert!(comment.text_content(&txn).unwrap().is_empty());
    }
}
