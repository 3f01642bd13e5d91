//! Transactional key-value storage for eltree.
//!
//! The store is a tree of ordered containers. Every container maps byte-string
//! keys either to a value or to a nested container, keeps its keys in byte
//! order, and carries a monotonic sequence counter. Readers and writers go
//! through transactions.
//!
//! # Contract
//!
//! The tree layer only talks to the store through two traits:
//!
//! - [`ReadTxn`] -- point reads and ordered seeks within one container
//! - [`WriteTxn`] -- puts, nested container creation, sequence allocation
//!
//! [`Cursor`] layers a stateful forward/backward iterator on top of the
//! seek primitives.
//!
//! # Backend
//!
//! [`Database`] is the bundled backend: a copy-on-write container tree held
//! in memory, optionally persisted as a checksummed snapshot file on every
//! commit.
//!
//! # Design Rules
//!
//! 1. A single writer at a time; readers never block the writer.
//! 2. A read transaction sees one committed snapshot for its whole life.
//! 3. A write transaction publishes nothing until `commit`. Dropping it
//!    discards every change.
//! 4. Sequence numbers start at 1 and are never reused within a container.
//! 5. All I/O errors are propagated, never silently ignored.

pub mod config;
pub mod container;
pub mod cursor;
pub mod error;
pub mod memory;
mod snapshot;
pub mod traits;

pub use config::StoreConfig;
pub use container::{ContainerId, Entry};
pub use cursor::Cursor;
pub use error::{StoreError, StoreResult};
pub use memory::{Database, ReadTransaction, WriteTransaction};
pub use traits::{ReadTxn, WriteTxn};
