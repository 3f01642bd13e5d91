//! The [`ReadTxn`] and [`WriteTxn`] traits defining the storage contract.
//!
//! Any backend that offers nested ordered containers with per-container
//! sequences can host an eltree document by implementing these traits.

use crate::container::{ContainerId, Entry};
use crate::cursor::Cursor;
use crate::error::StoreResult;

/// Read access to a consistent snapshot of the store.
///
/// All lookups are scoped to one container. Keys are compared as raw bytes.
/// Addressing a container that does not exist is an error; looking up a key
/// that does not exist is not.
pub trait ReadTxn {
    /// Read the value stored under `key`.
    ///
    /// Returns `Ok(None)` if the key is absent or holds a nested container.
    fn get(&self, container: &ContainerId, key: &[u8]) -> StoreResult<Option<Vec<u8>>>;

    /// Check whether `container` exists.
    fn contains_container(&self, container: &ContainerId) -> StoreResult<bool>;

    /// First entry whose key is `>= key`.
    fn seek(&self, container: &ContainerId, key: &[u8]) -> StoreResult<Option<Entry>>;

    /// First entry whose key is `> key`.
    fn seek_after(&self, container: &ContainerId, key: &[u8]) -> StoreResult<Option<Entry>>;

    /// Last entry whose key is `< key`.
    fn seek_before(&self, container: &ContainerId, key: &[u8]) -> StoreResult<Option<Entry>>;

    /// Last entry of the container.
    fn last(&self, container: &ContainerId) -> StoreResult<Option<Entry>>;

    /// All keys of the container in order.
    fn keys(&self, container: &ContainerId) -> StoreResult<Vec<Vec<u8>>>;

    /// First entry of the container.
    fn first(&self, container: &ContainerId) -> StoreResult<Option<Entry>> {
        self.seek(container, &[])
    }

    /// Open an ordered cursor over `container`.
    fn cursor(&self, container: &ContainerId) -> Cursor<'_, Self> {
        Cursor::new(self, container.clone())
    }
}

/// Write access. Writers also read their own uncommitted changes.
pub trait WriteTxn: ReadTxn {
    /// Store `value` under `key`, replacing any previous value.
    ///
    /// Fails if `key` currently holds a nested container.
    fn put(&mut self, container: &ContainerId, key: &[u8], value: &[u8]) -> StoreResult<()>;

    /// Create an empty container nested under `key` in `parent`.
    ///
    /// Fails with `ContainerExists` if `key` is already taken.
    fn create_container(&mut self, parent: &ContainerId, key: &[u8]) -> StoreResult<ContainerId>;

    /// Allocate the next value of the container's sequence.
    ///
    /// The first call on a fresh container returns 1.
    fn next_sequence(&mut self, container: &ContainerId) -> StoreResult<u64>;

    /// Move the container's sequence forward to `value`.
    ///
    /// Values at or below the current sequence are ignored, so allocated
    /// numbers are never handed out twice.
    fn set_sequence(&mut self, container: &ContainerId, value: u64) -> StoreResult<()>;
}
