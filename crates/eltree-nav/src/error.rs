//! Error types for parsing and import.

use eltree_tree::TreeError;
use thiserror::Error;

use crate::navigator::NodeType;

/// Errors raised while parsing markup into a [`MemoryDocument`](crate::MemoryDocument).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The markup is not well formed.
    #[error("markup error at byte {position}: {message}")]
    Syntax { position: u64, message: String },

    /// A closing tag appeared with no element open.
    #[error("unexpected closing tag at byte {0}")]
    UnexpectedClose(u64),

    /// Input ended inside one or more elements.
    #[error("{0} element(s) left unclosed at end of input")]
    Unclosed(usize),
}

/// Errors that abort a subtree import.
#[derive(Debug, Error)]
pub enum ImportError {
    /// Writing the destination tree failed.
    #[error(transparent)]
    Tree(#[from] TreeError),

    /// The source navigator reported an error.
    #[error("source navigator failed: {0}")]
    Source(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The source reported a node type that cannot be stored as a node.
    #[error("unsupported node type in source: {0}")]
    UnsupportedNodeType(NodeType),

    /// The walk panicked. Writes made before the panic remain in the
    /// transaction, which the caller should roll back.
    #[error("import aborted by panic: {0}")]
    Panicked(String),
}
