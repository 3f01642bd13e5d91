use std::fmt;

/// Address of a container: the chain of keys leading to it from the
/// top-level namespace.
///
/// Handles are plain values. They never borrow from a transaction, so they
/// can be cloned freely and resolved again by any transaction that can see
/// the container.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerId(Vec<Vec<u8>>);

impl ContainerId {
    /// The top-level namespace that holds every document container.
    pub fn top() -> Self {
        Self(Vec::new())
    }

    /// Returns `true` for the top-level namespace.
    pub fn is_top(&self) -> bool {
        self.0.is_empty()
    }

    /// Address of the container nested under `key`.
    pub fn child(&self, key: &[u8]) -> Self {
        let mut path = self.0.clone();
        path.push(key.to_vec());
        Self(path)
    }

    /// Address of the enclosing container, or `None` for the top level.
    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.0.split_last()?;
        Some(Self(rest.to_vec()))
    }

    /// The key this container is stored under in its parent.
    pub fn last_key(&self) -> Option<&[u8]> {
        self.0.last().map(Vec::as_slice)
    }

    /// Number of keys between the top level and this container.
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// The full key chain.
    pub fn segments(&self) -> &[Vec<u8>] {
        &self.0
    }
}

fn write_segment(f: &mut fmt::Formatter<'_>, segment: &[u8]) -> fmt::Result {
    match std::str::from_utf8(segment) {
        Ok(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_graphic()) => write!(f, "{s}"),
        _ => write!(f, "0x{}", hex::encode(segment)),
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "/");
        }
        for segment in &self.0 {
            write!(f, "/")?;
            write_segment(f, segment)?;
        }
        Ok(())
    }
}

impl fmt::Debug for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContainerId({self})")
    }
}

/// A key found by an ordered lookup.
///
/// `value` is `None` when the key holds a nested container.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub key: Vec<u8>,
    pub value: Option<Vec<u8>>,
}

impl Entry {
    /// Returns `true` if the key holds a nested container.
    pub fn is_container(&self) -> bool {
        self.value.is_none()
    }
}
