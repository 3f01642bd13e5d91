//! Persisted node tree for eltree.
//!
//! A document is a tree of containers in the store. [`Node`] is a
//! lightweight handle onto one of them: its metadata, its container address,
//! and the sibling index it was reached through. Handles are rebuilt from
//! the store on every move instead of being held as an object graph, and the
//! parent of a node is found again from its container address, so there is
//! no ownership between handles at all.
//!
//! # Operations
//!
//! - Navigation: [`Node::next`], [`Node::previous`], [`Node::first`],
//!   [`Node::child`], [`Node::parent`], [`Node::attribute`]
//! - Mutation: [`Node::create_root`], [`Node::append_node`],
//!   [`Node::append_attribute`], [`Node::set_value`]
//! - Serialization: [`Node::collect_text`], [`Node::render_markup`]
//!
//! Navigation that finds no neighbour returns `Ok(None)`; errors are
//! reserved for invalid requests and store failures.
//!
//! # Transactions
//!
//! Every operation takes the transaction explicitly. A handle is only
//! meaningful for transactions that can see the container it points to.
//! Callers should run a whole logical mutation (for example an import)
//! inside one write transaction so a failure can be rolled back as a unit.

pub mod error;
pub mod mutate;
pub mod navigate;
pub mod node;
pub mod serialize;

pub use error::{TreeError, TreeResult};
pub use navigate::{AttributeRef, Direction};
pub use node::{document_names, Node};
pub use serialize::escape;
