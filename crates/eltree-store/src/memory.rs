//! In-memory, copy-on-write store backend.
//!
//! The committed state is an immutable tree of [`Bucket`]s behind an `Arc`.
//! Readers clone the `Arc` and keep a stable snapshot. The single writer
//! clones the root `Arc` too and copies each container it touches on first
//! write (`Arc::make_mut`), so untouched subtrees stay shared. `commit`
//! swaps the writer's root in as the new committed state.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::StoreConfig;
use crate::container::{ContainerId, Entry};
use crate::error::{StoreError, StoreResult};
use crate::snapshot;
use crate::traits::{ReadTxn, WriteTxn};

/// What a key in a container holds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) enum Slot {
    Value(Vec<u8>),
    Bucket(Arc<Bucket>),
}

/// One ordered container.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Bucket {
    sequence: u64,
    entries: BTreeMap<Vec<u8>, Slot>,
}

fn to_entry(key: &[u8], slot: &Slot) -> Entry {
    Entry {
        key: key.to_vec(),
        value: match slot {
            Slot::Value(v) => Some(v.clone()),
            Slot::Bucket(_) => None,
        },
    }
}

impl Bucket {
    /// Walk `id` from this bucket downwards.
    fn resolve(&self, id: &ContainerId) -> StoreResult<&Bucket> {
        let mut bucket = self;
        for segment in id.segments() {
            bucket = match bucket.entries.get(segment.as_slice()) {
                Some(Slot::Bucket(child)) => child.as_ref(),
                Some(Slot::Value(_)) => return Err(StoreError::NotAContainer(id.clone())),
                None => return Err(StoreError::ContainerNotFound(id.clone())),
            };
        }
        Ok(bucket)
    }

    /// Walk `id` downwards, unsharing every bucket on the way.
    fn resolve_mut(&mut self, id: &ContainerId) -> StoreResult<&mut Bucket> {
        let mut bucket = self;
        for segment in id.segments() {
            bucket = match bucket.entries.get_mut(segment.as_slice()) {
                Some(Slot::Bucket(child)) => Arc::make_mut(child),
                Some(Slot::Value(_)) => return Err(StoreError::NotAContainer(id.clone())),
                None => return Err(StoreError::ContainerNotFound(id.clone())),
            };
        }
        Ok(bucket)
    }

    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        match self.entries.get(key)? {
            Slot::Value(v) => Some(v.clone()),
            Slot::Bucket(_) => None,
        }
    }

    fn seek(&self, key: &[u8]) -> Option<Entry> {
        self.entries
            .range::<[u8], _>((Bound::Included(key), Bound::Unbounded))
            .next()
            .map(|(k, s)| to_entry(k, s))
    }

    fn seek_after(&self, key: &[u8]) -> Option<Entry> {
        self.entries
            .range::<[u8], _>((Bound::Excluded(key), Bound::Unbounded))
            .next()
            .map(|(k, s)| to_entry(k, s))
    }

    fn seek_before(&self, key: &[u8]) -> Option<Entry> {
        self.entries
            .range::<[u8], _>((Bound::Unbounded, Bound::Excluded(key)))
            .next_back()
            .map(|(k, s)| to_entry(k, s))
    }

    fn last(&self) -> Option<Entry> {
        self.entries.iter().next_back().map(|(k, s)| to_entry(k, s))
    }

    fn keys(&self) -> Vec<Vec<u8>> {
        self.entries.keys().cloned().collect()
    }

    /// Total number of containers below and including this one.
    fn container_count(&self) -> usize {
        1 + self
            .entries
            .values()
            .map(|slot| match slot {
                Slot::Bucket(child) => child.container_count(),
                Slot::Value(_) => 0,
            })
            .sum::<usize>()
    }
}

// ---------------------------------------------------------------------------
// Database
// ---------------------------------------------------------------------------

/// Single-writer, multi-reader store.
///
/// With a snapshot path configured, the whole container tree is written to
/// disk on every commit before it becomes visible to new readers.
pub struct Database {
    config: StoreConfig,
    committed: RwLock<Arc<Bucket>>,
    writer: Mutex<()>,
}

impl Database {
    /// Create an empty database that lives only in memory.
    pub fn in_memory() -> Self {
        Self::with_root(StoreConfig::in_memory(), Bucket::default())
    }

    /// Open a database, loading the snapshot file if the config names one
    /// that already exists.
    pub fn open(config: StoreConfig) -> StoreResult<Self> {
        let root = match &config.path {
            Some(path) => snapshot::load(path)?.unwrap_or_default(),
            None => Bucket::default(),
        };
        Ok(Self::with_root(config, root))
    }

    fn with_root(config: StoreConfig, root: Bucket) -> Self {
        Self {
            config,
            committed: RwLock::new(Arc::new(root)),
            writer: Mutex::new(()),
        }
    }

    /// The configuration this database was opened with.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Start a read-only transaction on the latest committed state.
    pub fn begin_read(&self) -> StoreResult<ReadTransaction> {
        Ok(ReadTransaction {
            root: self.snapshot()?,
        })
    }

    /// Start the write transaction. Blocks while another writer is active.
    pub fn begin_write(&self) -> StoreResult<WriteTransaction<'_>> {
        let guard = self
            .writer
            .lock()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
        Ok(WriteTransaction {
            db: self,
            _guard: guard,
            root: self.snapshot()?,
        })
    }

    /// Run `f` inside a read transaction.
    pub fn view<R, E, F>(&self, f: F) -> Result<R, E>
    where
        F: FnOnce(&ReadTransaction) -> Result<R, E>,
        E: From<StoreError>,
    {
        let txn = self.begin_read()?;
        f(&txn)
    }

    /// Run `f` inside a write transaction, committing if it returns `Ok` and
    /// rolling back otherwise.
    pub fn update<R, E, F>(&self, f: F) -> Result<R, E>
    where
        F: FnOnce(&mut WriteTransaction<'_>) -> Result<R, E>,
        E: From<StoreError>,
    {
        let mut txn = self.begin_write()?;
        match f(&mut txn) {
            Ok(value) => {
                txn.commit()?;
                Ok(value)
            }
            Err(e) => {
                txn.rollback();
                Err(e)
            }
        }
    }

    /// Total number of containers, including the top-level namespace.
    pub fn container_count(&self) -> StoreResult<usize> {
        Ok(self.snapshot()?.container_count())
    }

    fn snapshot(&self) -> StoreResult<Arc<Bucket>> {
        let committed = self
            .committed
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
        Ok(Arc::clone(&committed))
    }

    fn publish(&self, root: Arc<Bucket>) -> StoreResult<()> {
        if let Some(path) = &self.config.path {
            snapshot::write(path, &root, self.config.sync_on_commit)?;
        }
        let mut committed = self
            .committed
            .write()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
        *committed = root;
        Ok(())
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("path", &self.config.path)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

/// A read-only view of one committed state.
///
/// Holds its snapshot alive; later commits are not visible through it.
#[derive(Clone, Debug)]
pub struct ReadTransaction {
    root: Arc<Bucket>,
}

/// The single active write transaction.
///
/// Changes are private to this transaction until [`commit`](Self::commit).
pub struct WriteTransaction<'db> {
    db: &'db Database,
    _guard: MutexGuard<'db, ()>,
    root: Arc<Bucket>,
}

impl WriteTransaction<'_> {
    /// Publish every change made in this transaction.
    ///
    /// With a snapshot path configured the snapshot is written first; if
    /// that fails nothing is published.
    pub fn commit(self) -> StoreResult<()> {
        self.db.publish(self.root)?;
        debug!("write transaction committed");
        Ok(())
    }

    /// Discard every change made in this transaction.
    pub fn rollback(self) {
        debug!("write transaction rolled back");
    }

    fn bucket_mut(&mut self, id: &ContainerId) -> StoreResult<&mut Bucket> {
        Arc::make_mut(&mut self.root).resolve_mut(id)
    }
}

impl std::fmt::Debug for WriteTransaction<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriteTransaction").finish_non_exhaustive()
    }
}

/// Shared read implementation over a root bucket.
macro_rules! impl_read_txn {
    ($ty:ty) => {
        impl ReadTxn for $ty {
            fn get(&self, container: &ContainerId, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
                Ok(self.root.resolve(container)?.get(key))
            }

            fn contains_container(&self, container: &ContainerId) -> StoreResult<bool> {
                match self.root.resolve(container) {
                    Ok(_) => Ok(true),
                    Err(StoreError::ContainerNotFound(_)) | Err(StoreError::NotAContainer(_)) => {
                        Ok(false)
                    }
                    Err(e) => Err(e),
                }
            }

            fn seek(&self, container: &ContainerId, key: &[u8]) -> StoreResult<Option<Entry>> {
                Ok(self.root.resolve(container)?.seek(key))
            }

            fn seek_after(&self, container: &ContainerId, key: &[u8]) -> StoreResult<Option<Entry>> {
                Ok(self.root.resolve(container)?.seek_after(key))
            }

            fn seek_before(&self, container: &ContainerId, key: &[u8]) -> StoreResult<Option<Entry>> {
                Ok(self.root.resolve(container)?.seek_before(key))
            }

            fn last(&self, container: &ContainerId) -> StoreResult<Option<Entry>> {
                Ok(self.root.resolve(container)?.last())
            }

            fn keys(&self, container: &ContainerId) -> StoreResult<Vec<Vec<u8>>> {
                Ok(self.root.resolve(container)?.keys())
            }
        }
    };
}

impl_read_txn!(ReadTransaction);
impl_read_txn!(WriteTransaction<'_>);

impl WriteTxn for WriteTransaction<'_> {
    fn put(&mut self, container: &ContainerId, key: &[u8], value: &[u8]) -> StoreResult<()> {
        if key.is_empty() {
            return Err(StoreError::EmptyKey);
        }
        let bucket = self.bucket_mut(container)?;
        if let Some(Slot::Bucket(_)) = bucket.entries.get(key) {
            return Err(StoreError::IsAContainer(container.child(key)));
        }
        bucket.entries.insert(key.to_vec(), Slot::Value(value.to_vec()));
        Ok(())
    }

    fn create_container(&mut self, parent: &ContainerId, key: &[u8]) -> StoreResult<ContainerId> {
        if key.is_empty() {
            return Err(StoreError::EmptyKey);
        }
        let id = parent.child(key);
        let bucket = self.bucket_mut(parent)?;
        if bucket.entries.contains_key(key) {
            return Err(StoreError::ContainerExists(id));
        }
        bucket
            .entries
            .insert(key.to_vec(), Slot::Bucket(Arc::new(Bucket::default())));
        Ok(id)
    }

    fn next_sequence(&mut self, container: &ContainerId) -> StoreResult<u64> {
        let bucket = self.bucket_mut(container)?;
        bucket.sequence = bucket
            .sequence
            .checked_add(1)
            .ok_or_else(|| StoreError::SequenceOverflow(container.clone()))?;
        Ok(bucket.sequence)
    }

    fn set_sequence(&mut self, container: &ContainerId, value: u64) -> StoreResult<()> {
        let bucket = self.bucket_mut(container)?;
        bucket.sequence = bucket.sequence.max(value);
        Ok(())
    }
}
