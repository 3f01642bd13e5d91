//! Foundation types for eltree.
//!
//! eltree persists an XML-like node tree inside a transactional key-value
//! store. Every node owns one container; this crate defines what lives in
//! that container and how its keys are laid out. Every other eltree crate
//! depends on `eltree-types`.
//!
//! # Key Types
//!
//! - [`NodeKind`] — Closed set of node kinds (root, element, text, comment)
//! - [`NodeInfo`] — Per-node metadata persisted under the info key
//! - [`Attr`] — A single element attribute
//! - [`KeyTag`] — Leading byte that partitions a container's key space
//!
//! # Container Layout
//!
//! ```text
//! .info          -> bincode(NodeInfo)
//! .value         -> raw value bytes (text and comment nodes)
//! '/' + u64 BE   -> nested container of child node N
//! '@' + u64 BE   -> bincode(Attr) for attribute N
//! ```

pub mod error;
pub mod info;
pub mod key;
pub mod kind;

pub use error::TypeError;
pub use info::{Attr, NodeInfo};
pub use key::{
    attribute_key, child_key, decode_key, KeyTag, ATTRIBUTE_SEEK_CEILING, INFO_KEY, KEY_LEN,
    MAX_ATTRIBUTE_INDEX, VALUE_KEY,
};
pub use kind::NodeKind;
