//! Snapshot file persistence.
//!
//! On-disk format:
//! ```text
//! [4 bytes: magic "ELTR"]
//! [4 bytes: format version (little-endian u32)]
//! [4 bytes: CRC32 of payload (little-endian u32)]
//! [8 bytes: payload length (little-endian u64)]
//! [N bytes: payload (bincode-serialized container tree)]
//! ```
//!
//! Writes go to a temporary file in the target directory which is then
//! renamed over the old snapshot, so a crash leaves either the old or the
//! new snapshot in place.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::memory::Bucket;

const MAGIC: &[u8; 4] = b"ELTR";
const FORMAT_VERSION: u32 = 1;
const HEADER_SIZE: usize = 20;

/// Load the container tree from `path`.
///
/// Returns `Ok(None)` if the file does not exist.
pub(crate) fn load(path: &Path) -> StoreResult<Option<Bucket>> {
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let root = decode(&data)?;
    debug!(path = %path.display(), bytes = data.len(), "snapshot loaded");
    Ok(Some(root))
}

/// Atomically replace the snapshot at `path` with `root`.
pub(crate) fn write(path: &Path, root: &Bucket, sync: bool) -> StoreResult<()> {
    let data = encode(root)?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(&data)?;
    if sync {
        tmp.as_file().sync_all()?;
    }
    tmp.persist(path).map_err(|e| StoreError::Io(e.error))?;
    debug!(path = %path.display(), bytes = data.len(), "snapshot written");
    Ok(())
}

fn encode(root: &Bucket) -> StoreResult<Vec<u8>> {
    let payload = bincode::serialize(root).map_err(|e| StoreError::Serialization(e.to_string()))?;
    let mut data = Vec::with_capacity(HEADER_SIZE + payload.len());
    data.extend_from_slice(MAGIC);
    data.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    data.extend_from_slice(&crc32fast::hash(&payload).to_le_bytes());
    data.extend_from_slice(&(payload.len() as u64).to_le_bytes());
    data.extend_from_slice(&payload);
    Ok(data)
}

fn le_u32(bytes: &[u8]) -> u32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(bytes);
    u32::from_le_bytes(raw)
}

fn decode(data: &[u8]) -> StoreResult<Bucket> {
    if data.len() < HEADER_SIZE {
        return Err(StoreError::CorruptSnapshot(format!(
            "file too short: {} bytes",
            data.len()
        )));
    }
    if &data[0..4] != MAGIC {
        return Err(StoreError::CorruptSnapshot("bad magic".into()));
    }
    let version = le_u32(&data[4..8]);
    if version != FORMAT_VERSION {
        return Err(StoreError::CorruptSnapshot(format!(
            "unsupported format version {version}"
        )));
    }
    let crc = le_u32(&data[8..12]);
    let mut raw_len = [0u8; 8];
    raw_len.copy_from_slice(&data[12..20]);
    let len = u64::from_le_bytes(raw_len);
    let payload = &data[HEADER_SIZE..];
    if payload.len() as u64 != len {
        return Err(StoreError::CorruptSnapshot(format!(
            "payload length {} does not match header {len}",
            payload.len()
        )));
    }
    if crc32fast::hash(payload) != crc {
        return Err(StoreError::CorruptSnapshot("checksum mismatch".into()));
    }
    bincode::deserialize(payload).map_err(|e| StoreError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use crate::container::ContainerId;
    use crate::memory::Database;
    use crate::traits::{ReadTxn, WriteTxn};

    fn seeded(config: StoreConfig) -> Database {
        let db = Database::open(config).unwrap();
        db.update(|txn| {
            let doc = txn.create_container(&ContainerId::top(), b"doc")?;
            txn.put(&doc, b"k", b"v")?;
            txn.next_sequence(&doc)?;
            Ok::<_, StoreError>(())
        })
        .unwrap();
        db
    }

    #[test]
    fn missing_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(StoreConfig::at(dir.path().join("none.eltree"))).unwrap();
        assert!(db.begin_read().unwrap().keys(&ContainerId::top()).unwrap().is_empty());
    }

    #[test]
    fn commit_persists_and_reopens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.eltree");
        drop(seeded(StoreConfig::at(&path)));
        assert!(path.exists());

        let db = Database::open(StoreConfig::at(&path)).unwrap();
        let doc = ContainerId::top().child(b"doc");
        assert_eq!(db.begin_read().unwrap().get(&doc, b"k").unwrap(), Some(b"v".to_vec()));
        // The sequence counter is part of the snapshot.
        let mut txn = db.begin_write().unwrap();
        assert_eq!(txn.next_sequence(&doc).unwrap(), 2);
    }

    #[test]
    fn rollback_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.eltree");
        let db = Database::open(StoreConfig::at(&path)).unwrap();
        let mut txn = db.begin_write().unwrap();
        txn.create_container(&ContainerId::top(), b"doc").unwrap();
        txn.rollback();
        assert!(!path.exists());
    }

    #[test]
    fn creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("db.eltree");
        drop(seeded(StoreConfig::at(&path)));
        assert!(path.exists());
    }

    #[test]
    fn flipped_payload_byte_fails_checksum() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.eltree");
        drop(seeded(StoreConfig::at(&path)));

        let mut data = fs::read(&path).unwrap();
        let last = data.len() - 1;
        data[last] ^= 0xff;
        fs::write(&path, &data).unwrap();

        let err = Database::open(StoreConfig::at(&path)).unwrap_err();
        assert!(matches!(err, StoreError::CorruptSnapshot(_)));
    }

    #[test]
    fn bad_magic_is_rejected() {
        let mut data = encode(&Bucket::default()).unwrap();
        data[0] = b'X';
        assert!(matches!(decode(&data).unwrap_err(), StoreError::CorruptSnapshot(_)));
    }

    #[test]
    fn truncated_file_is_rejected() {
        let data = encode(&Bucket::default()).unwrap();
        assert!(matches!(
            decode(&data[..10]).unwrap_err(),
            StoreError::CorruptSnapshot(_)
        ));
    }

    #[test]
    fn unknown_version_is_rejected() {
        let mut data = encode(&Bucket::default()).unwrap();
        data[4] = 9;
        assert!(matches!(decode(&data).unwrap_err(), StoreError::CorruptSnapshot(_)));
    }

    #[test]
    fn empty_tree_roundtrips() {
        let data = encode(&Bucket::default()).unwrap();
        assert_eq!(decode(&data).unwrap(), Bucket::default());
    }
}
