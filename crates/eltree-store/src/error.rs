use crate::container::ContainerId;

/// Errors from store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A container already exists under the requested key.
    #[error("container already exists: {0}")]
    ContainerExists(ContainerId),

    /// The addressed container does not exist.
    #[error("container not found: {0}")]
    ContainerNotFound(ContainerId),

    /// A path segment addresses a plain value, not a container.
    #[error("not a container: {0}")]
    NotAContainer(ContainerId),

    /// Attempted to overwrite a nested container with a plain value.
    #[error("key holds a container: {0}")]
    IsAContainer(ContainerId),

    /// Keys must be non-empty.
    #[error("empty key")]
    EmptyKey,

    /// The container's sequence counter is exhausted.
    #[error("sequence overflow in {0}")]
    SequenceOverflow(ContainerId),

    /// The snapshot file is truncated, tampered with, or from another format.
    #[error("corrupt snapshot: {0}")]
    CorruptSnapshot(String),

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the snapshot file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A lock guarding the committed state was poisoned by a panicking thread.
    #[error("lock poisoned: {0}")]
    LockPoisoned(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
