use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("codec error: {0}")]
    Codec(String),

    #[error("unknown node kind: {0}")]
    UnknownKind(u8),
}
