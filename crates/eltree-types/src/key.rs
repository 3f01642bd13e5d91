//! Container key codec.
//!
//! Child and attribute keys are a tag byte followed by a big-endian `u64`,
//! so byte order matches numeric order within each tag. The reserved info
//! and value keys start with `.`, which sorts before both numeric tags:
//! a seek to the start of the child range never lands on them.

/// Reserved key holding the encoded [`NodeInfo`](crate::NodeInfo).
pub const INFO_KEY: &[u8] = b".info";

/// Reserved key holding the raw value of text and comment nodes.
pub const VALUE_KEY: &[u8] = b".value";

/// Length of an encoded child or attribute key.
pub const KEY_LEN: usize = 9;

/// Largest attribute index. Indices live in the signed 64-bit range so an
/// increment past the end is detectable.
pub const MAX_ATTRIBUTE_INDEX: u64 = i64::MAX as u64;

/// First index past [`MAX_ATTRIBUTE_INDEX`]. Seeking here and stepping back
/// lands on the highest attribute in use.
pub const ATTRIBUTE_SEEK_CEILING: u64 = MAX_ATTRIBUTE_INDEX + 1;

/// Leading byte of a container key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum KeyTag {
    /// Reserved metadata and value keys.
    Reserved = b'.',
    /// Child node containers.
    Child = b'/',
    /// Element attributes.
    Attribute = b'@',
}

impl KeyTag {
    /// The raw tag byte.
    #[inline]
    pub fn byte(self) -> u8 {
        self as u8
    }

    /// Classify a key by its leading byte.
    ///
    /// Returns `None` for empty keys and unknown tags.
    #[inline]
    pub fn of(key: &[u8]) -> Option<Self> {
        match key.first()? {
            b'.' => Some(Self::Reserved),
            b'/' => Some(Self::Child),
            b'@' => Some(Self::Attribute),
            _ => None,
        }
    }

    /// Returns `true` if `key` starts with this tag.
    #[inline]
    pub fn matches(self, key: &[u8]) -> bool {
        key.first() == Some(&self.byte())
    }

    /// Encode `index` under this tag.
    #[inline]
    pub fn encode(self, index: u64) -> [u8; KEY_LEN] {
        let mut key = [0u8; KEY_LEN];
        key[0] = self.byte();
        key[1..].copy_from_slice(&index.to_be_bytes());
        key
    }
}

/// Key of child `index`.
#[inline]
pub fn child_key(index: u64) -> [u8; KEY_LEN] {
    KeyTag::Child.encode(index)
}

/// Key of attribute `index`.
#[inline]
pub fn attribute_key(index: u64) -> [u8; KEY_LEN] {
    KeyTag::Attribute.encode(index)
}

/// Decode a child or attribute key into its tag and index.
///
/// Returns `None` for reserved keys and anything this codec did not produce.
pub fn decode_key(key: &[u8]) -> Option<(KeyTag, u64)> {
    if key.len() != KEY_LEN {
        return None;
    }
    let tag = match KeyTag::of(key)? {
        KeyTag::Reserved => return None,
        tag => tag,
    };
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&key[1..]);
    Some((tag, u64::from_be_bytes(raw)))
}
