//! Error types for tree operations.

use eltree_store::{ContainerId, StoreError};
use eltree_types::{NodeKind, TypeError};
use thiserror::Error;

/// Errors that can occur during tree operations.
#[derive(Debug, Error)]
pub enum TreeError {
    /// The request is invalid regardless of tree state.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The node's kind forbids the operation.
    #[error("{kind} node cannot {operation}")]
    Structural {
        kind: NodeKind,
        operation: &'static str,
    },

    /// No attribute index is left in the signed 64-bit range.
    #[error("attribute index overflow in {0}")]
    Overflow(ContainerId),

    /// No document is stored under the requested name.
    #[error("document not found: {0}")]
    DocumentNotFound(String),

    /// A container has no node info.
    #[error("node info missing in {0}")]
    MissingInfo(ContainerId),

    /// A container holds data this crate never writes.
    #[error("corrupt node {container}: {reason}")]
    Corrupt {
        container: ContainerId,
        reason: String,
    },

    /// Node info or an attribute failed to encode or decode.
    #[error(transparent)]
    Codec(#[from] TypeError),

    /// Failure reported by the store, passed through unchanged.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Failure writing serializer output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for tree operations.
pub type TreeResult<T> = std::result::Result<T, TreeError>;
