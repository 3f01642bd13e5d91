use crate::container::{ContainerId, Entry};
use crate::error::StoreResult;
use crate::traits::ReadTxn;

/// Ordered cursor over one container.
///
/// A fresh cursor is unpositioned. Positioning calls (`seek`, `first`,
/// `last`) place it on an entry; `next` and `prev` step from there. Stepping
/// off either end leaves the cursor unpositioned, after which `next` and
/// `prev` keep returning `None` until it is positioned again.
pub struct Cursor<'t, T: ReadTxn + ?Sized> {
    txn: &'t T,
    container: ContainerId,
    current: Option<Entry>,
}

#[allow(clippy::should_implement_trait)]
impl<'t, T: ReadTxn + ?Sized> Cursor<'t, T> {
    pub fn new(txn: &'t T, container: ContainerId) -> Self {
        Self {
            txn,
            container,
            current: None,
        }
    }

    /// The container this cursor walks.
    pub fn container(&self) -> &ContainerId {
        &self.container
    }

    /// The entry the cursor is positioned on.
    pub fn current(&self) -> Option<&Entry> {
        self.current.as_ref()
    }

    /// Position on the first entry whose key is `>= key`.
    pub fn seek(&mut self, key: &[u8]) -> StoreResult<Option<Entry>> {
        let found = self.txn.seek(&self.container, key)?;
        Ok(self.land(found))
    }

    /// Position on the first entry.
    pub fn first(&mut self) -> StoreResult<Option<Entry>> {
        let found = self.txn.first(&self.container)?;
        Ok(self.land(found))
    }

    /// Position on the last entry.
    pub fn last(&mut self) -> StoreResult<Option<Entry>> {
        let found = self.txn.last(&self.container)?;
        Ok(self.land(found))
    }

    /// Step to the entry after the current one.
    pub fn next(&mut self) -> StoreResult<Option<Entry>> {
        let found = match &self.current {
            Some(entry) => self.txn.seek_after(&self.container, &entry.key)?,
            None => None,
        };
        Ok(self.land(found))
    }

    /// Step to the entry before the current one.
    pub fn prev(&mut self) -> StoreResult<Option<Entry>> {
        let found = match &self.current {
            Some(entry) => self.txn.seek_before(&self.container, &entry.key)?,
            None => None,
        };
        Ok(self.land(found))
    }

    fn land(&mut self, found: Option<Entry>) -> Option<Entry> {
        self.current = found.clone();
        found
    }
}
