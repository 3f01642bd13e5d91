//! Replaying a foreign tree into a persisted one.
//!
//! The importer walks any [`Navigator`] in document order and recreates
//! each node under a destination [`Node`] through the mutation API. It must
//! run inside one write transaction: on error nothing is undone here, the
//! caller rolls the transaction back.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use eltree_store::WriteTxn;
use eltree_tree::Node;
use eltree_types::{Attr, NodeInfo, NodeKind};
use tracing::debug;

use crate::error::ImportError;
use crate::navigator::{Navigator, NodeType};

/// Counts of what an import wrote.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImportStats {
    pub nodes: u64,
    pub attributes: u64,
}

/// Import the whole tree behind `source` under `dest`.
///
/// `source` is moved to its root first. A source root is not recreated;
/// its children are appended to `dest` directly.
pub fn import_subtree<T, N>(txn: &mut T, dest: &Node, source: &mut N) -> Result<ImportStats, ImportError>
where
    T: WriteTxn + ?Sized,
    N: Navigator,
{
    source.move_to_root();
    import_current(txn, dest, source)
}

/// Import the subtree at the current position of `source` under `dest`.
pub fn import_current<T, N>(txn: &mut T, dest: &Node, source: &mut N) -> Result<ImportStats, ImportError>
where
    T: WriteTxn + ?Sized,
    N: Navigator,
{
    debug!(dest = %dest.container(), from = %source.node_type(), "import started");
    let mut importer = Importer {
        txn,
        stats: ImportStats::default(),
    };
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| importer.node(dest, source)));
    match outcome {
        Ok(Ok(())) => {
            let stats = importer.stats;
            debug!(
                dest = %dest.container(),
                nodes = stats.nodes,
                attributes = stats.attributes,
                "import finished"
            );
            Ok(stats)
        }
        Ok(Err(err)) => Err(err),
        Err(payload) => Err(ImportError::Panicked(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_owned()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_owned()
    }
}

fn source_error<E>(err: E) -> ImportError
where
    E: std::error::Error + Send + Sync + 'static,
{
    ImportError::Source(Box::new(err))
}

struct Importer<'a, T: ?Sized> {
    txn: &'a mut T,
    stats: ImportStats,
}

impl<T: WriteTxn + ?Sized> Importer<'_, T> {
    fn node<N: Navigator>(&mut self, dest: &Node, source: &mut N) -> Result<(), ImportError> {
        let node_type = source.node_type();
        let kind = match node_type {
            NodeType::Root => return self.children(dest, source),
            NodeType::Attribute => return Err(ImportError::UnsupportedNodeType(node_type)),
            other => other
                .to_kind()
                .ok_or(ImportError::UnsupportedNodeType(other))?,
        };

        let info = NodeInfo::new(kind, source.local_name(), source.prefix());
        let node = dest.append_node(self.txn, info)?;
        self.stats.nodes += 1;

        match kind {
            NodeKind::Element => {
                self.attributes(&node, source)?;
                self.children(&node, source)
            }
            NodeKind::Text | NodeKind::Comment => {
                let value = source.value().map_err(source_error)?;
                node.set_value(self.txn, value.as_bytes())?;
                Ok(())
            }
            NodeKind::Root => Err(ImportError::UnsupportedNodeType(node_type)),
        }
    }

    fn attributes<N: Navigator>(&mut self, element: &Node, source: &mut N) -> Result<(), ImportError> {
        let mut visited = false;
        while source.move_to_next_attribute().map_err(source_error)? {
            visited = true;
            let name = match source.prefix() {
                "" => source.local_name().to_owned(),
                prefix => format!("{prefix}:{}", source.local_name()),
            };
            let value = source.value().map_err(source_error)?;
            element.append_attribute(self.txn, &Attr::new(name, value))?;
            self.stats.attributes += 1;
        }
        if visited {
            source.move_to_parent().map_err(source_error)?;
        }
        Ok(())
    }

    fn children<N: Navigator>(&mut self, parent: &Node, source: &mut N) -> Result<(), ImportError> {
        if !source.move_to_child().map_err(source_error)? {
            return Ok(());
        }
        loop {
            self.node(parent, source)?;
            if !source.move_to_next().map_err(source_error)? {
                break;
            }
        }
        source.move_to_parent().map_err(source_error)?;
        Ok(())
    }
}
