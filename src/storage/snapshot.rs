//! Snapshot Persistence
//!
//! This module serializes the store's key to value-list mapping to a single
//! file and reads it back. Snapshots persist values only: expiry state is
//! neither written nor restored, so loaded items carry no TTL.
//!
//! ## File Format
//!
//! One line per key, hex-armored so keys and values stay binary-safe:
//!
//! ```text
//! <value-count> <hex(key)> <hex(v1)>,<hex(v2)>,...,<hex(vn)>
//! ```
//!
//! Keys with an empty value list write only the count and the key. Values
//! are comma-separated so empty values survive the round trip.
//!
//! ## Blocking Behavior
//!
//! Both save and load hold the store's mutex for the entire file pass: all
//! other store traffic stalls for the duration of a snapshot. Snapshotting
//! is an infrequent, operator-triggered action, so this is accepted rather
//! than complicating the store with an incremental design.
//!
//! Saves write to a `<path>.tmp` sibling and atomically rename it over the
//! target, so a crash mid-save never clobbers the previous snapshot. A
//! failed load leaves the store exactly as it was: the file is decoded into
//! a fresh mapping which replaces the live one only once decoding succeeds.

use crate::storage::Store;
use bytes::Bytes;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{error, info};

/// Errors produced while encoding or decoding a snapshot file.
///
/// These never escape the store API: `save_snapshot` and `load_snapshot` log
/// them and report plain booleans to the caller.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// The file could not be created, written, read, or renamed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A line of the snapshot file did not match the expected format.
    #[error("malformed snapshot data at line {line}")]
    Corrupt { line: usize },
}

impl Store {
    /// Writes the full item mapping to `path`.
    ///
    /// Holds the store's mutex for the entire serialization, so the snapshot
    /// is a consistent point-in-time view. The store is never modified.
    ///
    /// # Returns
    ///
    /// Returns `false` if the file cannot be written; the error is logged.
    pub fn save_snapshot(&self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        let inner = self.lock();
        match write_snapshot(path, &inner.items) {
            Ok(()) => {
                info!(path = %path.display(), keys = inner.items.len(), "Snapshot saved");
                true
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "Snapshot save failed");
                false
            }
        }
    }

    /// Replaces the entire item mapping with the contents of `path`.
    ///
    /// Existing items are discarded on success, and all expiry entries are
    /// dropped: a loaded store starts with no TTL state. On failure the
    /// store keeps its prior contents untouched.
    ///
    /// # Returns
    ///
    /// Returns `false` if the file cannot be read or decoded; the error is
    /// logged.
    pub fn load_snapshot(&self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        let mut inner = self.lock();
        match read_snapshot(path) {
            Ok(items) => {
                info!(path = %path.display(), keys = items.len(), "Snapshot loaded");
                inner.items = items;
                inner.expiries.clear();
                true
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "Snapshot load failed");
                false
            }
        }
    }
}

/// Serializes the mapping to a temp file and renames it into place.
fn write_snapshot(path: &Path, items: &HashMap<String, Vec<Bytes>>) -> Result<(), SnapshotError> {
    let tmp = path.with_extension("tmp");
    let file = File::create(&tmp)?;
    let mut writer = BufWriter::new(file);

    for (key, values) in items {
        write!(writer, "{} {}", values.len(), hex::encode(key))?;
        for (i, value) in values.iter().enumerate() {
            let sep = if i == 0 { ' ' } else { ',' };
            write!(writer, "{}{}", sep, hex::encode(value))?;
        }
        writeln!(writer)?;
    }

    writer.flush()?;
    writer.into_inner().map_err(|e| e.into_error())?.sync_all()?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// Reads and decodes a snapshot file into a fresh mapping.
fn read_snapshot(path: &Path) -> Result<HashMap<String, Vec<Bytes>>, SnapshotError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut items = HashMap::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let lineno = idx + 1;
        if line.is_empty() {
            continue;
        }
        let (count, key, values) = decode_line(&line).ok_or(SnapshotError::Corrupt { line: lineno })?;
        if values.len() != count {
            return Err(SnapshotError::Corrupt { line: lineno });
        }
        items.insert(key, values);
    }

    Ok(items)
}

/// Decodes one `<count> <hex key> <csv hex values>` line.
fn decode_line(line: &str) -> Option<(usize, String, Vec<Bytes>)> {
    let mut fields = line.splitn(3, ' ');

    let count: usize = fields.next()?.parse().ok()?;
    let key = String::from_utf8(hex::decode(fields.next()?).ok()?).ok()?;

    let values = match fields.next() {
        Some(csv) => csv
            .split(',')
            .map(|tok| hex::decode(tok).ok().map(Bytes::from))
            .collect::<Option<Vec<_>>>()?,
        None => Vec::new(),
    };

    Some((count, key, values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dump.stash");

        let store = Store::new();
        store.set("alpha", Bytes::from("one"));
        store.append("alpha", vec![Bytes::from("two"), Bytes::from("three")]);
        store.set("beta", Bytes::from_static(&[0x00, 0xff, b'\n', b' ']));
        store.append("empty-value", vec![Bytes::new()]);

        assert!(store.save_snapshot(&path));

        let restored = Store::new();
        assert!(restored.load_snapshot(&path));

        assert_eq!(
            restored.get("alpha"),
            vec![Bytes::from("one"), Bytes::from("two"), Bytes::from("three")]
        );
        assert_eq!(
            restored.get("beta"),
            vec![Bytes::from_static(&[0x00, 0xff, b'\n', b' '])]
        );
        assert_eq!(restored.get("empty-value"), vec![Bytes::new()]);
        assert_eq!(restored.len(), 3);
    }

    #[test]
    fn test_load_replaces_existing_items() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dump.stash");

        let store = Store::new();
        store.set("saved", Bytes::from("value"));
        assert!(store.save_snapshot(&path));

        store.set("unsaved", Bytes::from("value"));
        assert!(store.load_snapshot(&path));

        assert!(store.has_key("saved"));
        assert!(!store.has_key("unsaved"));
    }

    #[test]
    fn test_load_drops_ttl_state() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dump.stash");

        let store = Store::new();
        store.set("key", Bytes::from("value"));
        store.expire("key", 100);
        assert!(store.save_snapshot(&path));

        assert!(store.load_snapshot(&path));

        // Values round-trip, TTL does not.
        assert!(store.has_key("key"));
        assert_eq!(store.time_to_live("key"), 0);
        assert_eq!(store.expiry_count(), 0);
    }

    #[test]
    fn test_load_missing_file_preserves_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("no-such-file");

        let store = Store::new();
        store.set("key", Bytes::from("value"));

        assert!(!store.load_snapshot(&path));
        assert_eq!(store.get("key"), vec![Bytes::from("value")]);
    }

    #[test]
    fn test_load_corrupt_file_preserves_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("corrupt.stash");
        std::fs::write(&path, "1 6b6579 zz-not-hex\n").unwrap();

        let store = Store::new();
        store.set("key", Bytes::from("value"));

        assert!(!store.load_snapshot(&path));
        assert!(store.has_key("key"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_load_count_mismatch_is_corrupt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mismatch.stash");
        // Claims two values, carries one.
        std::fs::write(&path, format!("2 {} {}\n", hex::encode("key"), hex::encode("v1"))).unwrap();

        let store = Store::new();
        assert!(!store.load_snapshot(&path));
    }

    #[test]
    fn test_save_to_unwritable_path() {
        let store = Store::new();
        store.set("key", Bytes::from("value"));

        assert!(!store.save_snapshot("/no/such/directory/dump.stash"));

        // Store is untouched on failure.
        assert!(store.has_key("key"));
    }

    #[test]
    fn test_save_empty_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.stash");

        let store = Store::new();
        assert!(store.save_snapshot(&path));

        let restored = Store::new();
        restored.set("junk", Bytes::from("x"));
        assert!(restored.load_snapshot(&path));
        assert!(restored.is_empty());
    }
}
