//! Pull-based navigation over eltree documents.
//!
//! Path-query engines walk trees through a small cursor contract: report the
//! current node's type, name and value, move to a parent, child, sibling or
//! attribute, and save or restore a position by copying the cursor. This
//! crate defines that contract as the [`Navigator`] trait and provides:
//!
//! - [`TreeNavigator`] -- a navigator over a persisted tree, resolving
//!   every move against the store so no document is materialized in memory
//! - [`MemoryDocument`] / [`MemoryNavigator`] -- an arena tree parsed from
//!   markup, used as a foreign source for import
//! - [`import_subtree`] / [`import_current`] -- replay any navigator into a
//!   persisted tree

pub mod adapter;
pub mod document;
pub mod error;
pub mod import;
pub mod navigator;

pub use adapter::TreeNavigator;
pub use document::{DocNode, MemoryDocument, MemoryNavigator};
pub use error::{ImportError, ParseError};
pub use import::{import_current, import_subtree, ImportStats};
pub use navigator::{Navigator, NodeType};
