//! Tree snapshots
//!
//! ## Format (version 1)
//!
//! ```text
//! [Magic: "CFGX"]
//! [Version: u8]
//! [Root node record]
//! [CRC32 of everything above: u32 LE]
//!
//! Node record:
//!   [Name length: u32 BE] [Name: UTF-8]
//!   [Value: tagged value | 'N' for a namespace]
//!   [Child count: u32 BE]
//!   [Child node records]*count
//! ```
//!
//! The root record has an empty name and is always a namespace. Leaves carry
//! a child count of zero; anything else is corruption.
//!
//! ## Crash Safety
//!
//! [`SnapshotFile::save_bytes`] writes to a temporary sibling, fsyncs it,
//! renames it over the target and fsyncs the directory, so readers see
//! either the old snapshot or the new one.

use crate::codec::{self, ValueReader};
use crate::tree::{Children, ConfigTree, Node};
use byteorder::{BigEndian, WriteBytesExt};
use configx_core::{Error, Result, MAX_NESTING_DEPTH, MAX_PATH_LENGTH};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Magic bytes at the start of every snapshot
pub const SNAPSHOT_MAGIC: [u8; 4] = *b"CFGX";

/// Current snapshot format version
pub const SNAPSHOT_FORMAT_VERSION: u8 = 1;

/// Marker in place of a value for namespace records
pub const TAG_NAMESPACE: u8 = b'N';

/// Magic + version
const HEADER_SIZE: usize = 5;
/// CRC32 footer
const FOOTER_SIZE: usize = 4;
/// Empty name, namespace marker, zero child count
const MIN_NODE_RECORD: usize = 9;

// ============================================================================
// Encoding
// ============================================================================

/// Serialize the whole tree into a framed snapshot
pub fn encode_tree(tree: &ConfigTree) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(64);
    out.extend_from_slice(&SNAPSHOT_MAGIC);
    out.push(SNAPSHOT_FORMAT_VERSION);
    write_namespace(&mut out, "", tree.root())?;

    let crc = crc32fast::hash(&out);
    out.extend_from_slice(&crc.to_le_bytes());
    Ok(out)
}

fn write_namespace(out: &mut Vec<u8>, name: &str, children: &Children) -> Result<()> {
    codec::write_bytes(out, name.as_bytes())?;
    out.push(TAG_NAMESPACE);
    out.write_u32::<BigEndian>(children.len() as u32)?;
    for (child_name, child) in children {
        match child {
            Node::Namespace(grandchildren) => write_namespace(out, child_name, grandchildren)?,
            Node::Leaf(value) => {
                codec::write_bytes(out, child_name.as_bytes())?;
                codec::write_value(out, value)?;
                out.write_u32::<BigEndian>(0)?;
            }
        }
    }
    Ok(())
}

// ============================================================================
// Decoding
// ============================================================================

/// Parse a framed snapshot back into a tree
pub fn decode_tree(bytes: &[u8]) -> Result<ConfigTree> {
    decode_tree_with_depth(bytes, MAX_NESTING_DEPTH)
}

/// Parse a framed snapshot, rejecting lists nested deeper than `max_depth`
pub fn decode_tree_with_depth(bytes: &[u8], max_depth: usize) -> Result<ConfigTree> {
    if bytes.len() < HEADER_SIZE + MIN_NODE_RECORD + FOOTER_SIZE {
        return Err(Error::corrupt(format!(
            "snapshot too small: {} bytes",
            bytes.len()
        )));
    }
    if bytes[..4] != SNAPSHOT_MAGIC {
        return Err(Error::corrupt("bad magic"));
    }
    if bytes[4] != SNAPSHOT_FORMAT_VERSION {
        return Err(Error::corrupt(format!(
            "unsupported format version {}",
            bytes[4]
        )));
    }

    let (body, footer) = bytes.split_at(bytes.len() - FOOTER_SIZE);
    let stored_crc = u32::from_le_bytes([footer[0], footer[1], footer[2], footer[3]]);
    let computed_crc = crc32fast::hash(body);
    if stored_crc != computed_crc {
        return Err(Error::corrupt(format!(
            "checksum mismatch: stored {:08x}, computed {:08x}",
            stored_crc, computed_crc
        )));
    }

    let mut reader = ValueReader::new(&body[HEADER_SIZE..], max_depth);
    let (name, root) = read_node(&mut reader, 0)?;
    if !name.is_empty() {
        return Err(Error::corrupt("root record must have an empty name"));
    }
    if reader.remaining() != 0 {
        return Err(Error::corrupt(format!(
            "{} trailing bytes after root record",
            reader.remaining()
        )));
    }
    match root {
        Node::Namespace(children) => Ok(ConfigTree::from_root(children)),
        Node::Leaf(_) => Err(Error::corrupt("root record must be a namespace")),
    }
}

fn read_node(reader: &mut ValueReader<'_>, depth: usize) -> Result<(String, Node)> {
    if depth > MAX_PATH_LENGTH {
        return Err(Error::corrupt(format!(
            "namespace nesting exceeds {} levels",
            MAX_PATH_LENGTH
        )));
    }
    let name = reader.read_string("node name")?;
    let node = if reader.peek_u8() == Some(TAG_NAMESPACE) {
        reader.read_u8("namespace marker")?;
        Node::namespace()
    } else {
        Node::Leaf(reader.read_value()?)
    };

    let count = reader.read_u32("child count")? as usize;
    match node {
        Node::Leaf(_) if count != 0 => Err(Error::corrupt(format!(
            "leaf '{}' declares {} children",
            name, count
        ))),
        Node::Leaf(_) => Ok((name, node)),
        Node::Namespace(mut children) => {
            if count > reader.remaining() / MIN_NODE_RECORD {
                return Err(Error::corrupt(format!(
                    "namespace '{}' declares {} children but only {} bytes remain",
                    name,
                    count,
                    reader.remaining()
                )));
            }
            for _ in 0..count {
                let (child_name, child) = read_node(reader, depth + 1)?;
                if child_name.is_empty() {
                    return Err(Error::corrupt(format!("empty child name under '{}'", name)));
                }
                if children.insert(child_name.clone(), child).is_some() {
                    return Err(Error::corrupt(format!(
                        "duplicate child '{}' under '{}'",
                        child_name, name
                    )));
                }
            }
            Ok((name, Node::Namespace(children)))
        }
    }
}

// ============================================================================
// Files
// ============================================================================

/// A snapshot file on disk
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    /// Refer to a snapshot at `path`; nothing is touched until save/load
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SnapshotFile { path: path.into() }
    }

    /// Location of the snapshot
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if a snapshot has been written
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "snapshot".to_string());
        self.path.with_file_name(format!(".{}.tmp", name))
    }

    /// Encode and persist `tree`; returns the number of bytes written
    pub fn save(&self, tree: &ConfigTree) -> Result<usize> {
        let bytes = encode_tree(tree)?;
        self.save_bytes(&bytes)?;
        Ok(bytes.len())
    }

    /// Persist an already-encoded snapshot with write-fsync-rename
    pub fn save_bytes(&self, bytes: &[u8]) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let temp_path = self.temp_path();
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&temp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&temp_path, &self.path)?;
        File::open(&dir)?.sync_all()?;

        info!(
            target: "configx::snapshot",
            path = %self.path.display(),
            bytes = bytes.len(),
            "Snapshot written"
        );
        Ok(())
    }

    /// Read and decode the snapshot.
    ///
    /// A missing file is `PathNotFound`; anything unreadable as a snapshot is
    /// `CorruptSnapshot`.
    pub fn load(&self) -> Result<ConfigTree> {
        self.load_with_depth(MAX_NESTING_DEPTH)
    }

    /// Like [`load`](Self::load) with a custom list nesting limit
    pub fn load_with_depth(&self, max_depth: usize) -> Result<ConfigTree> {
        if !self.exists() {
            return Err(Error::path_not_found(self.path.display().to_string()));
        }
        let bytes = fs::read(&self.path)?;
        let tree = decode_tree_with_depth(&bytes, max_depth)?;
        debug!(
            target: "configx::snapshot",
            path = %self.path.display(),
            bytes = bytes.len(),
            "Snapshot loaded"
        );
        Ok(tree)
    }

    /// Remove a temporary file left behind by an interrupted save
    pub fn cleanup_temp_file(&self) -> Result<bool> {
        let temp_path = self.temp_path();
        if temp_path.exists() {
            fs::remove_file(&temp_path)?;
            return Ok(true);
        }
        Ok(false)
    }
}
